//! Client side of the log endpoint.

use miniapp_events::LogEntry;
use std::sync::{Arc, Mutex, PoisonError};
use url::Url;

/// Fire-and-forget destination for client log entries.
pub trait LogSink: Send + Sync {
    fn send(&self, entry: LogEntry);
}

pub type LogSinkRef = Arc<dyn LogSink>;

/// Posts entries to the ingestion endpoint.
///
/// Each entry is sent from its own spawned task; delivery failures are
/// logged at debug level and dropped.
pub struct HttpLogSink {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpLogSink {
    pub fn new(endpoint: Url) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl LogSink for HttpLogSink {
    fn send(&self, entry: LogEntry) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!(message = %entry.message, "no runtime, dropping client log entry");
            return;
        };

        let request = self.client.post(self.endpoint.clone()).json(&entry);
        handle.spawn(async move {
            match request.send().await {
                Ok(response) if response.status().is_success() => {}
                Ok(response) => {
                    tracing::debug!(status = %response.status(), "log endpoint rejected entry");
                }
                Err(e) => {
                    tracing::debug!(error = %e, "failed to deliver client log entry");
                }
            }
        });
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogSink;

impl LogSink for NullLogSink {
    fn send(&self, _entry: LogEntry) {}
}

/// Keeps entries in memory. Used by tests and the preview command.
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LogSink for MemoryLogSink {
    fn send(&self, entry: LogEntry) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }
}

/// Writes entries straight to the local subscriber, as the endpoint would.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn send(&self, entry: LogEntry) {
        crate::endpoint::record(&entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_collects() {
        let sink = MemoryLogSink::new();
        assert!(sink.is_empty());

        sink.send(LogEntry::error("one"));
        sink.send(LogEntry::error("two"));

        let messages: Vec<_> = sink.entries().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["one", "two"]);
    }

    #[test]
    fn test_http_sink_without_runtime_drops() {
        let endpoint = Url::parse("http://127.0.0.1:9/api/log").unwrap();
        let sink = HttpLogSink::new(endpoint);
        sink.send(LogEntry::error("nobody listens"));
    }

    #[test]
    fn test_sinks_are_object_safe() {
        let sinks: Vec<LogSinkRef> = vec![
            Arc::new(NullLogSink),
            Arc::new(TracingLogSink),
            Arc::new(MemoryLogSink::new()),
        ];
        for sink in sinks {
            sink.send(LogEntry::error("x"));
        }
    }
}
