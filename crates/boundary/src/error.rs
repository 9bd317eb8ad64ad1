//! Errors surfaced by a render step.

use serde::{Deserialize, Serialize};
use std::any::Any;
use thiserror::Error;

/// Whatever a render step failed with.
///
/// Mirrors the three shapes a fallback has to cope with: a structured error
/// with a message, a bare string, and anything else.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RenderError {
    #[error("{}", structured_text(.name, .message))]
    Structured {
        #[serde(default)]
        name: Option<String>,
        message: String,
    },

    #[error("{0}")]
    Primitive(String),

    #[error("{}", serialize_other(.0))]
    Other(serde_json::Value),
}

fn structured_text(name: &Option<String>, message: &str) -> String {
    if !message.is_empty() {
        return message.to_string();
    }
    name.clone()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Error".to_string())
}

fn serialize_other(value: &serde_json::Value) -> String {
    let text = serde_json::to_string(value).unwrap_or_default();
    if text.is_empty() {
        "unknown error".to_string()
    } else {
        text
    }
}

impl RenderError {
    /// Structured error carrying `message`.
    pub fn message(message: impl Into<String>) -> Self {
        RenderError::Structured {
            name: None,
            message: message.into(),
        }
    }

    /// Wrap any error type, keeping its display text as the message.
    pub fn from_error<E>(error: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        let name = std::any::type_name::<E>()
            .rsplit("::")
            .next()
            .map(str::to_owned);
        RenderError::Structured {
            name,
            message: error.to_string(),
        }
    }

    /// Classify a thrown JSON value.
    ///
    /// Objects with a string `message` are structured errors, strings and
    /// other scalars are shown verbatim, the rest is serialized.
    pub fn from_value(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => RenderError::Primitive(s),
            serde_json::Value::Number(n) => RenderError::Primitive(n.to_string()),
            serde_json::Value::Bool(b) => RenderError::Primitive(b.to_string()),
            serde_json::Value::Object(map) => {
                let message = map.get("message").and_then(|m| m.as_str()).map(str::to_owned);
                match message {
                    Some(message) => RenderError::Structured {
                        name: map.get("name").and_then(|n| n.as_str()).map(str::to_owned),
                        message,
                    },
                    None => RenderError::Other(serde_json::Value::Object(map)),
                }
            }
            other => RenderError::Other(other),
        }
    }

    /// Recover a render error from a panic payload.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        if let Some(error) = payload.downcast_ref::<RenderError>() {
            return error.clone();
        }
        if let Some(s) = payload.downcast_ref::<&str>() {
            return RenderError::Primitive((*s).to_string());
        }
        if let Some(s) = payload.downcast_ref::<String>() {
            return RenderError::Primitive(s.clone());
        }
        RenderError::Other(serde_json::Value::String("non-string panic payload".into()))
    }

    /// Text shown to the user. Never empty.
    pub fn display_text(&self) -> String {
        let text = self.to_string();
        if text.is_empty() {
            // Only reachable for an empty primitive.
            "\"\"".to_string()
        } else {
            text
        }
    }
}

impl From<&str> for RenderError {
    fn from(value: &str) -> Self {
        RenderError::Primitive(value.to_string())
    }
}

impl From<String> for RenderError {
    fn from(value: String) -> Self {
        RenderError::Primitive(value)
    }
}

impl From<serde_json::Value> for RenderError {
    fn from(value: serde_json::Value) -> Self {
        RenderError::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, thiserror::Error)]
    #[error("quiz {0} not found")]
    struct QuizMissing(u32);

    #[test]
    fn test_structured_shows_message() {
        let error = RenderError::from_error(&QuizMissing(3));
        assert_eq!(error.display_text(), "quiz 3 not found");
        match error {
            RenderError::Structured { name, .. } => assert_eq!(name.as_deref(), Some("QuizMissing")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_primitive_shows_verbatim() {
        assert_eq!(RenderError::from("boom").display_text(), "boom");
        assert_eq!(RenderError::from_value(json!(404)).display_text(), "404");
    }

    #[test]
    fn test_error_like_object_uses_message() {
        let error = RenderError::from_value(json!({"name": "TypeError", "message": "x"}));
        assert_eq!(error.display_text(), "x");
    }

    #[test]
    fn test_arbitrary_object_is_serialized() {
        let error = RenderError::from_value(json!({"code": 7, "retry": false}));
        let text = error.display_text();
        assert!(!text.is_empty());
        assert!(text.contains("\"code\":7"));
    }

    #[test]
    fn test_null_and_empty_are_never_blank() {
        assert_eq!(RenderError::from_value(json!(null)).display_text(), "null");
        assert!(!RenderError::from("").display_text().is_empty());
        assert_eq!(RenderError::message("").display_text(), "Error");
    }

    #[test]
    fn test_from_panic_payloads() {
        let static_str: Box<dyn Any + Send> = Box::new("static boom");
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned boom"));
        let other: Box<dyn Any + Send> = Box::new(17u8);

        assert_eq!(RenderError::from_panic(static_str.as_ref()).display_text(), "static boom");
        assert_eq!(RenderError::from_panic(owned.as_ref()).display_text(), "owned boom");
        assert!(!RenderError::from_panic(other.as_ref()).display_text().is_empty());
    }
}
