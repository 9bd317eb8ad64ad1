//! Logging for the mini app.
//!
//! - [`init_tracing`] installs the process subscriber.
//! - [`LogSink`] is how the app reports client-side failures.
//! - [`endpoint`] serves `POST /api/log`, the receiving end of [`HttpLogSink`].

pub mod endpoint;
mod init;
mod sink;

pub use endpoint::{parse_entry, record, router, serve, LogChannel, LOG_ROUTE, MAX_BODY_BYTES};
pub use init::{build_filter, init_tracing, InitError, DEFAULT_FILTER};
pub use sink::{HttpLogSink, LogSink, LogSinkRef, MemoryLogSink, NullLogSink, TracingLogSink};
