use serde::{Deserialize, Serialize};

pub type UserId = i64;

/// Id of the placeholder identity unless configured otherwise.
pub const DEFAULT_PLACEHOLDER_ID: UserId = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentitySource {
    /// Resolved from the host's launch parameters.
    Host,
    /// Synthesized for simulated hosts and failed resolutions.
    Placeholder,
}

/// The user the session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: UserId,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
    #[serde(default)]
    pub is_premium: bool,
    pub source: IdentitySource,
}

impl UserIdentity {
    pub fn is_placeholder(&self) -> bool {
        self.source == IdentitySource::Placeholder
    }

    /// Full name if known, else the first name.
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }
}

/// Fixed identity used whenever the host cannot provide one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceholderIdentity {
    pub id: UserId,
    pub first_name: String,
    pub username: Option<String>,
    pub language_code: Option<String>,
}

impl Default for PlaceholderIdentity {
    fn default() -> Self {
        Self {
            id: DEFAULT_PLACEHOLDER_ID,
            first_name: "Guest".to_string(),
            username: Some("guest".to_string()),
            language_code: Some("en".to_string()),
        }
    }
}

impl PlaceholderIdentity {
    pub fn identity(&self) -> UserIdentity {
        UserIdentity {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: None,
            username: self.username.clone(),
            language_code: self.language_code.clone(),
            is_premium: false,
            source: IdentitySource::Placeholder,
        }
    }
}
