//! Subcommand implementations.

use anyhow::{Context, Result};
use miniapp_application::{AppConfig, HostEnvironment, RenderContext, Root, Services};
use miniapp_boundary::{RenderError, View};
use serde_json::json;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

pub async fn serve(bind: SocketAddr) -> Result<()> {
    miniapp_logging::serve(bind, shutdown_signal())
        .await
        .with_context(|| format!("log endpoint on {bind} failed"))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

/// Stand-in page tree: a greeting plus whatever the providers expose.
fn preview_page(ctx: &RenderContext<'_>) -> Result<View, RenderError> {
    Ok(View::page(
        "Preview",
        json!({
            "verdict": ctx.verdict,
            "user": ctx.user,
            "greeting": format!("Hi, {}", ctx.user.display_name()),
            "host": ctx.host,
            "quiz": ctx.quiz.snapshot(),
            "manifest_url": ctx.connection.manifest_url().as_str(),
        }),
    ))
}

pub async fn preview(config: &AppConfig, host: Option<&Path>, timeout: Duration) -> Result<()> {
    let mut env = HostEnvironment::simulated();
    if let Some(path) = host {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read host snapshot {}", path.display()))?;
        let value: serde_json::Value = serde_json::from_str(&text)
            .with_context(|| format!("host snapshot {} is not JSON", path.display()))?;
        env = env.with_object_value(&value);
    }

    let services = Services::from_config(config)?;
    let mut root = Root::mount(config, env, preview_page, services)?;

    tokio::time::timeout(timeout, root.wait_until_ready())
        .await
        .context("app did not become ready in time")?;

    let view = root.render();
    let output = json!({
        "detection": root.detection(),
        "session": root.user().state(),
        "view": view,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    root.unmount().await;
    Ok(())
}

pub fn print_config(config: &AppConfig) -> Result<()> {
    print!("{}", config.to_toml_string()?);
    Ok(())
}
