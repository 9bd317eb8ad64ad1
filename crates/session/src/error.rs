//! Error types for identity resolution.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Why a set of launch parameters was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaunchError {
    #[error("launch parameters are empty")]
    Empty,

    #[error("launch parameters carry no user")]
    MissingUser,

    #[error("malformed user payload: {0}")]
    MalformedUser(String),

    #[error("auth_date is not a unix timestamp: {0}")]
    InvalidAuthDate(String),

    #[error("launch parameters are not signed")]
    MissingHash,

    #[error("launch parameter signature does not match")]
    SignatureMismatch,

    #[error("launch parameters expired ({age_secs}s old)")]
    Expired { age_secs: i64 },
}

/// Failure while establishing the session. Never fatal: the context falls
/// back to the placeholder identity and keeps the error for inspection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("launch parameters rejected: {0}")]
    Launch(#[from] LaunchError),

    #[error("real host reported without launch parameters")]
    MissingLaunchParams,

    #[error("identity resolution failed: {0}")]
    Resolution(String),
}

impl Serialize for SessionError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
