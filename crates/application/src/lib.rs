//! Composition root of the mini app.
//!
//! [`Root`] wires the environment verdict, user session, quiz state and host
//! adapter together behind an error boundary, and hands pages a
//! [`RenderContext`] once identity and host readiness are both settled.
//!
//! # Example
//!
//! ```ignore
//! use miniapp_application::{AppConfig, HostEnvironment, Root, Services};
//!
//! let config = AppConfig::default();
//! let services = Services::from_config(&config)?;
//! let mut root = Root::mount(&config, HostEnvironment::simulated(), home_page, services)?;
//! root.wait_until_ready().await;
//! let view = root.render();
//! ```

mod config;
mod connection;
mod error;
mod page;
mod root;

pub use config::{AppConfig, HostConfig, LaunchConfig, LogConfig, DEFAULT_MANIFEST_URL};
pub use connection::HostConnection;
pub use error::{AppError, ConfigError, Result};
pub use page::{Page, RenderContext};
pub use root::{HostEnvironment, Root, Services};
