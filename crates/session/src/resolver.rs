//! Identity resolution from launch parameters.

use crate::error::{LaunchError, Result};
use crate::identity::UserIdentity;
use crate::launch::LaunchParams;
use async_trait::async_trait;
use std::time::Duration;

/// Turns host launch parameters into a user identity.
///
/// Implementations may go remote (e.g. exchange the launch token with a
/// backend); the context only awaits the result.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, init_data: &str) -> Result<UserIdentity>;
}

/// Resolves identity locally by parsing `initData`.
///
/// The signature is only checked when a bot token is configured, since the
/// token is usually not available client-side.
#[derive(Debug, Clone, Default)]
pub struct LaunchParamsResolver {
    bot_token: Option<String>,
    max_age: Option<Duration>,
}

impl LaunchParamsResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bot_token(mut self, token: impl Into<String>) -> Self {
        self.bot_token = Some(token.into());
        self
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    pub fn check(&self, init_data: &str) -> std::result::Result<LaunchParams, LaunchError> {
        let params = LaunchParams::parse(init_data)?;

        if let Some(token) = &self.bot_token {
            params.verify(token)?;
        }

        if let (Some(max_age), Some(age)) = (self.max_age, params.age_secs(chrono::Utc::now())?) {
            if age > max_age.as_secs() as i64 {
                return Err(LaunchError::Expired { age_secs: age });
            }
        }

        Ok(params)
    }
}

#[async_trait]
impl IdentityResolver for LaunchParamsResolver {
    async fn resolve(&self, init_data: &str) -> Result<UserIdentity> {
        let params = self.check(init_data)?;
        tracing::debug!(
            user_id = params.user.id,
            verified = self.bot_token.is_some(),
            "resolved identity from launch parameters"
        );
        Ok(params.identity())
    }
}
