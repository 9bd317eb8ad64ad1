//! Snapshot of the host SDK object.

use serde::{Deserialize, Serialize};

/// Platform reported by the host SDK script when it is loaded outside a real
/// chat client.
pub const UNKNOWN_PLATFORM: &str = "unknown";

/// Fields the detector inspects, in the order they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HostField {
    Version,
    Platform,
    ColorScheme,
    /// Signed launch parameters. Checked last, but the strongest signal.
    InitData,
}

impl HostField {
    pub const ALL: [HostField; 4] = [
        HostField::Version,
        HostField::Platform,
        HostField::ColorScheme,
        HostField::InitData,
    ];

    /// Name of the field on the host object.
    pub fn key(&self) -> &'static str {
        match self {
            HostField::Version => "version",
            HostField::Platform => "platform",
            HostField::ColorScheme => "colorScheme",
            HostField::InitData => "initData",
        }
    }
}

impl std::fmt::Display for HostField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// What the host container exposes, as injected by the embedding layer.
///
/// Every field is optional: a dev environment may mock some of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostObject {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub color_scheme: Option<String>,
    #[serde(default)]
    pub init_data: Option<String>,
}

impl HostObject {
    /// Build a snapshot from an arbitrary JSON value.
    ///
    /// Returns `None` when the value is not an object. Fields that are not
    /// strings read as absent rather than failing the whole snapshot.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        let object = value.as_object()?;
        let field = |field: HostField| {
            object
                .get(field.key())
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned)
        };

        Some(Self {
            version: field(HostField::Version),
            platform: field(HostField::Platform),
            color_scheme: field(HostField::ColorScheme),
            init_data: field(HostField::InitData),
        })
    }

    /// Raw value of a field, if present.
    pub fn get(&self, field: HostField) -> Option<&str> {
        match field {
            HostField::Version => self.version.as_deref(),
            HostField::Platform => self.platform.as_deref(),
            HostField::ColorScheme => self.color_scheme.as_deref(),
            HostField::InitData => self.init_data.as_deref(),
        }
    }

    /// Value of a field if it counts as populated.
    ///
    /// Whitespace-only values are empty, and the placeholder platform the SDK
    /// reports outside a client counts as missing.
    pub fn populated(&self, field: HostField) -> Option<&str> {
        let value = self.get(field)?.trim();
        if value.is_empty() {
            return None;
        }
        if field == HostField::Platform && value.eq_ignore_ascii_case(UNKNOWN_PLATFORM) {
            return None;
        }
        Some(value)
    }
}
