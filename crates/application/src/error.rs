use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid manifest url {url:?}: {reason}")]
    InvalidManifestUrl { url: String, reason: String },

    #[error("invalid log endpoint {url:?}: {reason}")]
    InvalidLogEndpoint { url: String, reason: String },

    #[error("invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("mounting requires a tokio runtime")]
    NoRuntime,
}

pub type Result<T> = std::result::Result<T, AppError>;
