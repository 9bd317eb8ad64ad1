//! Host environment detection for the mini app.
//!
//! The mini app runs either inside a genuine chat client (which injects a host
//! SDK object) or inside a plain development environment where that object is
//! missing or only partially mocked. This crate classifies a host snapshot
//! into an [`EnvironmentVerdict`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  host.rs    - HostObject snapshot and HostField names       │
//! │  verdict.rs - classification policy (pure, never panics)    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use miniapp_detect::{detect, EnvironmentVerdict, HostObject};
//!
//! let host = HostObject {
//!     version: Some("7.10".into()),
//!     platform: Some("ios".into()),
//!     color_scheme: Some("dark".into()),
//!     init_data: None,
//! };
//!
//! // No launch parameters: treated as a mocked host.
//! assert_eq!(detect(Some(&host)), EnvironmentVerdict::SimulatedHost);
//! assert_eq!(detect(None), EnvironmentVerdict::SimulatedHost);
//! ```

mod host;
mod verdict;

pub use host::{HostField, HostObject, UNKNOWN_PLATFORM};
pub use verdict::{
    classify, classify_value, detect, detect_value, Detection, Downgrade, EnvironmentVerdict,
    HostCapabilities,
};
