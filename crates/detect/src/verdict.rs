//! Classification of a host snapshot.
//!
//! Pure domain logic - no I/O, no globals. Every path returns a verdict; a
//! missing or malformed field downgrades to the simulated host.

use crate::host::{HostField, HostObject};
use serde::{Deserialize, Serialize};

/// Which kind of host the app is running in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentVerdict {
    /// A genuine chat client with signed launch parameters.
    RealHost,
    /// Development environment or a partially mocked host.
    #[default]
    SimulatedHost,
}

impl EnvironmentVerdict {
    pub fn is_real(&self) -> bool {
        matches!(self, EnvironmentVerdict::RealHost)
    }

    pub fn label(&self) -> &'static str {
        match self {
            EnvironmentVerdict::RealHost => "real",
            EnvironmentVerdict::SimulatedHost => "simulated",
        }
    }
}

impl std::fmt::Display for EnvironmentVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Capabilities read from a host that passed detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostCapabilities {
    pub version: String,
    pub platform: String,
    pub color_scheme: String,
    pub init_data: String,
}

impl HostCapabilities {
    /// All four fields populated, or nothing.
    pub fn from_host(host: &HostObject) -> Result<Self, Downgrade> {
        let field = |field: HostField| {
            host.populated(field)
                .map(str::to_owned)
                .ok_or(Downgrade::MissingField(field))
        };

        Ok(Self {
            version: field(HostField::Version)?,
            platform: field(HostField::Platform)?,
            color_scheme: field(HostField::ColorScheme)?,
            init_data: field(HostField::InitData)?,
        })
    }
}

/// Why a host was classified as simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "field")]
pub enum Downgrade {
    /// No host object was injected at all.
    HostAbsent,
    /// The first field that failed the check.
    MissingField(HostField),
}

impl std::fmt::Display for Downgrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Downgrade::HostAbsent => f.write_str("host object absent"),
            Downgrade::MissingField(field) => write!(f, "host field `{field}` missing or empty"),
        }
    }
}

/// Outcome of a detection pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    pub verdict: EnvironmentVerdict,
    /// Present only for [`EnvironmentVerdict::RealHost`].
    pub capabilities: Option<HostCapabilities>,
    /// Present only for [`EnvironmentVerdict::SimulatedHost`].
    pub downgrade: Option<Downgrade>,
}

impl Detection {
    fn real(capabilities: HostCapabilities) -> Self {
        Self {
            verdict: EnvironmentVerdict::RealHost,
            capabilities: Some(capabilities),
            downgrade: None,
        }
    }

    fn simulated(reason: Downgrade) -> Self {
        Self {
            verdict: EnvironmentVerdict::SimulatedHost,
            capabilities: None,
            downgrade: Some(reason),
        }
    }

    /// Launch parameters, when running inside a real host.
    pub fn init_data(&self) -> Option<&str> {
        self.capabilities.as_ref().map(|c| c.init_data.as_str())
    }
}

/// Classify a host snapshot, keeping the capabilities or the downgrade reason.
pub fn classify(host: Option<&HostObject>) -> Detection {
    let detection = match host {
        None => Detection::simulated(Downgrade::HostAbsent),
        Some(host) => match HostCapabilities::from_host(host) {
            Ok(capabilities) => Detection::real(capabilities),
            Err(reason) => Detection::simulated(reason),
        },
    };

    match (&detection.capabilities, &detection.downgrade) {
        (Some(caps), _) => tracing::debug!(
            version = %caps.version,
            platform = %caps.platform,
            "running inside real host"
        ),
        (None, Some(reason)) => tracing::debug!(%reason, "falling back to simulated host"),
        (None, None) => {}
    }

    detection
}

/// Classify an arbitrarily shaped JSON snapshot of the host object.
pub fn classify_value(value: Option<&serde_json::Value>) -> Detection {
    match value.and_then(HostObject::from_value) {
        Some(host) => classify(Some(&host)),
        None => classify(None),
    }
}

/// Verdict for a host snapshot.
pub fn detect(host: Option<&HostObject>) -> EnvironmentVerdict {
    classify(host).verdict
}

/// Verdict for an arbitrarily shaped JSON snapshot.
pub fn detect_value(value: Option<&serde_json::Value>) -> EnvironmentVerdict {
    classify_value(value).verdict
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_host() -> HostObject {
        HostObject {
            version: Some("7.10".into()),
            platform: Some("tdesktop".into()),
            color_scheme: Some("dark".into()),
            init_data: Some("query_id=AAH&user=%7B%22id%22%3A1%7D&auth_date=1&hash=ab".into()),
        }
    }

    fn without(field: HostField) -> HostObject {
        let mut host = full_host();
        match field {
            HostField::Version => host.version = None,
            HostField::Platform => host.platform = None,
            HostField::ColorScheme => host.color_scheme = None,
            HostField::InitData => host.init_data = None,
        }
        host
    }

    #[test]
    fn test_full_host_is_real() {
        let detection = classify(Some(&full_host()));
        assert_eq!(detection.verdict, EnvironmentVerdict::RealHost);
        assert!(detection.downgrade.is_none());
        assert_eq!(detection.capabilities.unwrap().platform, "tdesktop");
    }

    #[test]
    fn test_absent_host_is_simulated() {
        let detection = classify(None);
        assert_eq!(detection.verdict, EnvironmentVerdict::SimulatedHost);
        assert_eq!(detection.downgrade, Some(Downgrade::HostAbsent));
    }

    #[test]
    fn test_any_single_missing_field_is_simulated() {
        for field in HostField::ALL {
            let detection = classify(Some(&without(field)));
            assert_eq!(detection.verdict, EnvironmentVerdict::SimulatedHost, "{field}");
            assert_eq!(detection.downgrade, Some(Downgrade::MissingField(field)));
        }
    }

    #[test]
    fn test_every_partial_shape_is_simulated() {
        // All 15 non-full subsets of the four fields.
        for mask in 0u8..15 {
            let mut host = HostObject::default();
            for (bit, field) in HostField::ALL.iter().enumerate() {
                if mask & (1 << bit) != 0 {
                    let full = full_host();
                    let value = full.get(*field).map(str::to_owned);
                    match field {
                        HostField::Version => host.version = value,
                        HostField::Platform => host.platform = value,
                        HostField::ColorScheme => host.color_scheme = value,
                        HostField::InitData => host.init_data = value,
                    }
                }
            }
            assert_eq!(detect(Some(&host)), EnvironmentVerdict::SimulatedHost, "mask {mask:04b}");
        }
    }

    #[test]
    fn test_empty_init_data_is_simulated() {
        let mut host = full_host();
        host.init_data = Some(String::new());
        assert_eq!(detect(Some(&host)), EnvironmentVerdict::SimulatedHost);
    }

    #[test]
    fn test_unknown_platform_is_simulated() {
        let mut host = full_host();
        host.platform = Some("unknown".into());
        assert_eq!(
            classify(Some(&host)).downgrade,
            Some(Downgrade::MissingField(HostField::Platform))
        );
    }

    #[test]
    fn test_detect_value_never_panics() {
        let inputs = [
            json!(null),
            json!(42),
            json!("WebApp"),
            json!([]),
            json!({}),
            json!({"version": {"major": 7}}),
            json!({"version": "7", "platform": "ios", "colorScheme": "dark", "initData": 1}),
        ];
        for input in &inputs {
            assert_eq!(detect_value(Some(input)), EnvironmentVerdict::SimulatedHost);
        }
        assert_eq!(detect_value(None), EnvironmentVerdict::SimulatedHost);
    }

    #[test]
    fn test_detect_value_full_object_is_real() {
        let value = json!({
            "version": "7.10",
            "platform": "ios",
            "colorScheme": "light",
            "initData": "user=%7B%22id%22%3A5%7D&hash=00",
            "themeParams": {"bg_color": "#ffffff"},
        });
        assert_eq!(detect_value(Some(&value)), EnvironmentVerdict::RealHost);
    }

    #[test]
    fn test_verdict_serializes_snake_case() {
        let json = serde_json::to_string(&EnvironmentVerdict::RealHost).unwrap();
        assert_eq!(json, "\"real_host\"");
    }
}
