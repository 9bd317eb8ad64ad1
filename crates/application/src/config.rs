//! Application configuration.
//!
//! Loaded from a TOML file; every section is optional and falls back to
//! its defaults.
//!
//! ```toml
//! manifest_url = "https://quiz.example/tonconnect-manifest.json"
//!
//! [placeholder]
//! id = 1
//! first_name = "Guest"
//!
//! [launch]
//! max_age_secs = 86400
//!
//! [host]
//! viewport_height = 720
//! color_scheme = "dark"
//! ready_timeout_ms = 3000
//!
//! [log]
//! endpoint = "http://127.0.0.1:8787/api/log"
//! ```

use crate::error::ConfigError;
use miniapp_events::{ColorScheme, Theme, Viewport, DEFAULT_VIEWPORT_HEIGHT};
use miniapp_host::HostOptions;
use miniapp_session::{LaunchParamsResolver, PlaceholderIdentity};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_MANIFEST_URL: &str = "http://localhost:3000/tonconnect-manifest.json";

const CONFIG_DIR: &str = "miniapp";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Handed to the host connection unchanged.
    pub manifest_url: String,
    pub placeholder: PlaceholderIdentity,
    pub launch: LaunchConfig,
    pub host: HostConfig,
    pub log: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            manifest_url: DEFAULT_MANIFEST_URL.to_string(),
            placeholder: PlaceholderIdentity::default(),
            launch: LaunchConfig::default(),
            host: HostConfig::default(),
            log: LogConfig::default(),
        }
    }
}

/// Launch parameter verification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// Enables signature checks when set.
    pub bot_token: Option<String>,
    /// Reject launches older than this.
    pub max_age_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub viewport_height: u32,
    pub color_scheme: ColorScheme,
    /// Stop waiting for a real host's ready signal after this long.
    pub ready_timeout_ms: Option<u64>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            color_scheme: ColorScheme::default(),
            ready_timeout_ms: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Ingestion endpoint for client errors. Errors are only traced locally
    /// when unset.
    pub endpoint: Option<String>,
    /// `EnvFilter` directives; `RUST_LOG` takes precedence.
    pub filter: Option<String>,
}

impl AppConfig {
    /// `<config dir>/miniapp/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load `path`, or the default path when `None`. A missing file yields
    /// the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.manifest_url()?;
        self.log_endpoint()?;

        if self.placeholder.first_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "placeholder.first_name",
                reason: "cannot be empty".into(),
            });
        }

        if self.host.viewport_height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "host.viewport_height",
                reason: "cannot be 0".into(),
            });
        }

        if self.host.ready_timeout_ms == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "host.ready_timeout_ms",
                reason: "cannot be 0, omit it to wait indefinitely".into(),
            });
        }

        Ok(())
    }

    pub fn manifest_url(&self) -> Result<Url, ConfigError> {
        Url::parse(self.manifest_url.trim()).map_err(|e| ConfigError::InvalidManifestUrl {
            url: self.manifest_url.clone(),
            reason: e.to_string(),
        })
    }

    pub fn log_endpoint(&self) -> Result<Option<Url>, ConfigError> {
        let Some(endpoint) = self.log.endpoint.as_deref() else {
            return Ok(None);
        };
        Url::parse(endpoint.trim())
            .map(Some)
            .map_err(|e| ConfigError::InvalidLogEndpoint {
                url: endpoint.to_string(),
                reason: e.to_string(),
            })
    }

    pub fn host_options(&self) -> HostOptions {
        let height = self.host.viewport_height;
        HostOptions {
            viewport: Viewport {
                height,
                stable_height: height,
                is_expanded: true,
            },
            theme: Theme {
                color_scheme: self.host.color_scheme,
                params: Default::default(),
            },
            ready_timeout: self.host.ready_timeout_ms.map(Duration::from_millis),
        }
    }

    pub fn resolver(&self) -> LaunchParamsResolver {
        let mut resolver = LaunchParamsResolver::new();
        if let Some(token) = self.launch.bot_token.as_deref().filter(|t| !t.is_empty()) {
            resolver = resolver.with_bot_token(token);
        }
        if let Some(secs) = self.launch.max_age_secs {
            resolver = resolver.with_max_age(Duration::from_secs(secs));
        }
        resolver
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.host_options(), HostOptions::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            manifest_url = "https://quiz.example/tonconnect-manifest.json"

            [host]
            color_scheme = "dark"
            "#,
        )
        .unwrap();

        assert_eq!(config.host.color_scheme, ColorScheme::Dark);
        assert_eq!(config.host.viewport_height, DEFAULT_VIEWPORT_HEIGHT);
        assert_eq!(config.placeholder, PlaceholderIdentity::default());
        assert_eq!(
            config.manifest_url().unwrap().as_str(),
            "https://quiz.example/tonconnect-manifest.json"
        );
    }

    #[test]
    fn test_invalid_manifest_url_rejected() {
        let err = AppConfig::from_toml_str(r#"manifest_url = "not a url""#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidManifestUrl { .. }));
    }

    #[test]
    fn test_invalid_log_endpoint_rejected() {
        let err = AppConfig::from_toml_str("[log]\nendpoint = \"::\"").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogEndpoint { .. }));
    }

    #[test]
    fn test_zero_values_rejected() {
        let err = AppConfig::from_toml_str("[host]\nviewport_height = 0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { field: "host.viewport_height", .. }
        ));

        let err = AppConfig::from_toml_str("[host]\nready_timeout_ms = 0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { field: "host.ready_timeout_ms", .. }
        ));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = AppConfig::default();
        config.launch.bot_token = Some("123:abc".into());
        config.host.ready_timeout_ms = Some(2500);
        config.log.endpoint = Some("http://127.0.0.1:8787/api/log".into());

        let text = config.to_toml_string().unwrap();
        assert_eq!(AppConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_host_options_from_config() {
        let mut config = AppConfig::default();
        config.host.viewport_height = 720;
        config.host.ready_timeout_ms = Some(1500);

        let options = config.host_options();
        assert_eq!(options.viewport.height, 720);
        assert_eq!(options.viewport.stable_height, 720);
        assert_eq!(options.ready_timeout, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[placeholder]\nid = 77\nfirst_name = \"Tester\"\n").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.placeholder.id, 77);
        assert_eq!(config.placeholder.first_name, "Tester");
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, AppConfig::default());
    }
}
