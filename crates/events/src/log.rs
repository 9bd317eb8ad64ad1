//! Body of the log ingestion endpoint.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    #[serde(alias = "warning")]
    Warn,
    Error,
}

impl LogLevel {
    pub fn is_error(&self) -> bool {
        matches!(self, LogLevel::Error)
    }

    /// Lenient parse of a client-supplied level; unknown names are info.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "error" | "err" | "fatal" | "critical" => LogLevel::Error,
            "warn" | "warning" => LogLevel::Warn,
            "debug" | "trace" => LogLevel::Debug,
            _ => LogLevel::Info,
        }
    }
}

/// A client-side log line forwarded to the ingestion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default)]
    pub message: String,
    /// As produced by the client: RFC 3339 or epoch milliseconds.
    #[serde(default, deserialize_with = "string_or_number")]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl LogEntry {
    /// Entry stamped with the current time.
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Some(chrono::Utc::now().to_rfc3339()),
            user_id: None,
            url: None,
            data: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, message)
    }

    pub fn with_user(mut self, user_id: Option<i64>) -> Self {
        self.user_id = user_id.map(|id| id.to_string());
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Best-effort read of a body that does not match the entry shape.
    ///
    /// Returns `None` for anything but a JSON object. The whole object is
    /// kept as `data`.
    pub fn from_value_lenient(value: Value) -> Option<Self> {
        let Value::Object(map) = &value else {
            return None;
        };
        let level = map
            .get("level")
            .and_then(Value::as_str)
            .map(LogLevel::parse)
            .unwrap_or_default();
        let message = match map.get("message") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        let timestamp = map.get("timestamp").and_then(scalar_string);
        let user_id = map.get("userId").and_then(scalar_string);
        let url = map.get("url").and_then(scalar_string);

        Some(Self {
            level,
            message,
            timestamp,
            user_id,
            url,
            data: Some(value),
        })
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_string))
}
