//! Log ingestion endpoint.
//!
//! Accepts client log lines on `POST /api/log` and re-emits them through
//! `tracing`. Any POST is acknowledged, even one whose body cannot be
//! parsed, so clients never retry on our account.

use axum::body::{to_bytes, Body};
use axum::http::{Method, StatusCode};
use axum::routing::any;
use axum::{Json, Router};
use miniapp_events::{LogEntry, LogLevel};
use serde_json::{json, Value};
use std::future::Future;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;

/// Path the client posts to.
pub const LOG_ROUTE: &str = "/api/log";

/// Largest body read by the endpoint. Longer bodies are acknowledged and
/// dropped.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Where an ingested entry is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogChannel {
    /// `miniapp::client_error`, reserved for `level=error`.
    Error,
    /// `miniapp::client`, everything else.
    Standard,
}

pub fn channel_for(entry: &LogEntry) -> LogChannel {
    if entry.level.is_error() {
        LogChannel::Error
    } else {
        LogChannel::Standard
    }
}

/// Re-emit a client entry through `tracing`.
pub fn record(entry: &LogEntry) -> LogChannel {
    let channel = channel_for(entry);
    let user_id = entry.user_id.as_deref().unwrap_or("-");
    let url = entry.url.as_deref().unwrap_or("-");
    let timestamp = entry.timestamp.as_deref().unwrap_or("-");
    let data = entry
        .data
        .as_ref()
        .map(Value::to_string)
        .unwrap_or_default();
    let message = entry.message.as_str();

    match entry.level {
        LogLevel::Error => tracing::error!(
            target: "miniapp::client_error",
            user_id, url, timestamp, data = %data, "{message}"
        ),
        LogLevel::Warn => tracing::warn!(
            target: "miniapp::client",
            user_id, url, timestamp, data = %data, "{message}"
        ),
        LogLevel::Info => tracing::info!(
            target: "miniapp::client",
            user_id, url, timestamp, data = %data, "{message}"
        ),
        LogLevel::Debug => tracing::debug!(
            target: "miniapp::client",
            user_id, url, timestamp, data = %data, "{message}"
        ),
    }

    channel
}

async fn ingest(method: Method, body: Body) -> (StatusCode, Json<Value>) {
    if method != Method::POST {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            Json(json!({"success": false, "error": "Method not allowed"})),
        );
    }

    match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => match parse_entry(&bytes) {
            Some(entry) => {
                record(&entry);
            }
            None => {
                tracing::warn!(bytes = bytes.len(), "unparseable client log body");
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, limit = MAX_BODY_BYTES, "client log body dropped");
        }
    }

    (StatusCode::OK, Json(json!({"success": true})))
}

/// Read a client body: the entry shape first, then any JSON object.
pub fn parse_entry(body: &[u8]) -> Option<LogEntry> {
    match serde_json::from_slice::<LogEntry>(body) {
        Ok(entry) => Some(entry),
        Err(e) => {
            tracing::debug!(error = %e, "client log body does not match entry shape");
            serde_json::from_slice::<Value>(body)
                .ok()
                .and_then(LogEntry::from_value_lenient)
        }
    }
}

/// Router serving the ingestion endpoint.
pub fn router() -> Router {
    Router::new()
        .route(LOG_ROUTE, any(ingest))
        .layer(TraceLayer::new_for_http())
}

/// Serve the endpoint on `addr` until `shutdown` resolves.
pub async fn serve<F>(addr: SocketAddr, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, route = LOG_ROUTE, "log endpoint listening");
    axum::serve(listener, router())
        .with_graceful_shutdown(shutdown)
        .await
}
