//! Launch parameters (`initData`) issued by the host.
//!
//! The host passes a URL-encoded query string such as
//! `query_id=..&user=%7B%22id%22%3A..%7D&auth_date=..&hash=..`. The `hash` is
//! an HMAC over the remaining pairs keyed by the bot token, so the backend
//! can tell genuine launches from forged ones.

use crate::error::LaunchError;
use crate::identity::{IdentitySource, UserIdentity, UserId};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Key used to derive the secret from the bot token.
const WEB_APP_DATA_KEY: &[u8] = b"WebAppData";

/// `user` field of the launch parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchUser {
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
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl From<&LaunchUser> for UserIdentity {
    fn from(user: &LaunchUser) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            username: user.username.clone(),
            language_code: user.language_code.clone(),
            is_premium: user.is_premium,
            source: IdentitySource::Host,
        }
    }
}

/// Parsed launch parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchParams {
    pub user: LaunchUser,
    pub auth_date: Option<i64>,
    pub hash: Option<String>,
    pub query_id: Option<String>,
    pub start_param: Option<String>,
    pub chat_type: Option<String>,
    pub chat_instance: Option<String>,
    /// Decoded pairs in their original order.
    pairs: Vec<(String, String)>,
}

impl LaunchParams {
    pub fn parse(init_data: &str) -> Result<Self, LaunchError> {
        let init_data = init_data.trim();
        if init_data.is_empty() {
            return Err(LaunchError::Empty);
        }

        let pairs: Vec<(String, String)> = url::form_urlencoded::parse(init_data.as_bytes())
            .into_owned()
            .collect();
        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        };

        let user_json = get("user").ok_or(LaunchError::MissingUser)?;
        let user: LaunchUser = serde_json::from_str(&user_json)
            .map_err(|e| LaunchError::MalformedUser(e.to_string()))?;

        let auth_date = match get("auth_date") {
            Some(raw) => Some(
                raw.parse::<i64>()
                    .map_err(|_| LaunchError::InvalidAuthDate(raw.clone()))?,
            ),
            None => None,
        };

        Ok(Self {
            user,
            auth_date,
            hash: get("hash"),
            query_id: get("query_id"),
            start_param: get("start_param"),
            chat_type: get("chat_type"),
            chat_instance: get("chat_instance"),
            pairs,
        })
    }

    /// Every pair except `hash`, sorted by key, as `key=value` lines.
    pub fn data_check_string(&self) -> String {
        let mut pairs: Vec<&(String, String)> =
            self.pairs.iter().filter(|(k, _)| k != "hash").collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Check the host signature against `bot_token`.
    pub fn verify(&self, bot_token: &str) -> Result<(), LaunchError> {
        let hash = self.hash.as_deref().ok_or(LaunchError::MissingHash)?;
        let expected = hex::decode(hash).map_err(|_| LaunchError::SignatureMismatch)?;

        let mut mac = launch_mac(bot_token)?;
        mac.update(self.data_check_string().as_bytes());
        mac.verify_slice(&expected)
            .map_err(|_| LaunchError::SignatureMismatch)
    }

    /// Seconds since `auth_date`, if present. An `auth_date` too far from
    /// `now` to subtract is rejected.
    pub fn age_secs(&self, now: chrono::DateTime<chrono::Utc>) -> Result<Option<i64>, LaunchError> {
        let Some(auth) = self.auth_date else {
            return Ok(None);
        };
        now.timestamp()
            .checked_sub(auth)
            .map(Some)
            .ok_or_else(|| LaunchError::InvalidAuthDate(auth.to_string()))
    }

    pub fn identity(&self) -> UserIdentity {
        UserIdentity::from(&self.user)
    }
}

fn launch_mac(bot_token: &str) -> Result<HmacSha256, LaunchError> {
    let mut secret = HmacSha256::new_from_slice(WEB_APP_DATA_KEY)
        .map_err(|_| LaunchError::SignatureMismatch)?;
    secret.update(bot_token.as_bytes());
    let secret_key = secret.finalize().into_bytes();

    HmacSha256::new_from_slice(&secret_key).map_err(|_| LaunchError::SignatureMismatch)
}

/// Hex signature the host would attach to `data_check_string`.
pub fn sign_data_check_string(data_check_string: &str, bot_token: &str) -> Result<String, LaunchError> {
    let mut mac = launch_mac(bot_token)?;
    mac.update(data_check_string.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Build a signed `initData` string from raw pairs.
///
/// Used to emulate a real host during development.
pub fn build_signed_init_data(pairs: &[(&str, &str)], bot_token: &str) -> Result<String, LaunchError> {
    let mut sorted = pairs.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let check = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("\n");
    let hash = sign_data_check_string(&check, bot_token)?;

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (k, v) in pairs {
        serializer.append_pair(k, v);
    }
    serializer.append_pair("hash", &hash);
    Ok(serializer.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOT_TOKEN: &str = "123456:TEST-token";
    const USER: &str = r#"{"id":42,"first_name":"Ada","last_name":"Lovelace","username":"ada","language_code":"en"}"#;

    fn signed() -> String {
        build_signed_init_data(
            &[
                ("query_id", "AAHdF6IQAAAAAN0XohDhrOrc"),
                ("user", USER),
                ("auth_date", "1700000000"),
            ],
            BOT_TOKEN,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_user_and_fields() {
        let params = LaunchParams::parse(&signed()).unwrap();
        assert_eq!(params.user.id, 42);
        assert_eq!(params.user.username.as_deref(), Some("ada"));
        assert_eq!(params.auth_date, Some(1_700_000_000));
        assert_eq!(params.query_id.as_deref(), Some("AAHdF6IQAAAAAN0XohDhrOrc"));
        assert!(params.hash.is_some());
    }

    #[test]
    fn test_identity_comes_from_host() {
        let identity = LaunchParams::parse(&signed()).unwrap().identity();
        assert_eq!(identity.source, IdentitySource::Host);
        assert_eq!(identity.display_name(), "Ada Lovelace");
    }

    #[test]
    fn test_signed_params_verify() {
        let params = LaunchParams::parse(&signed()).unwrap();
        assert_eq!(params.verify(BOT_TOKEN), Ok(()));
    }

    #[test]
    fn test_wrong_token_fails_verification() {
        let params = LaunchParams::parse(&signed()).unwrap();
        assert_eq!(params.verify("654321:other"), Err(LaunchError::SignatureMismatch));
    }

    #[test]
    fn test_tampered_params_fail_verification() {
        let tampered = signed().replace("auth_date=1700000000", "auth_date=1700000001");
        let params = LaunchParams::parse(&tampered).unwrap();
        assert_eq!(params.verify(BOT_TOKEN), Err(LaunchError::SignatureMismatch));
    }

    #[test]
    fn test_unsigned_params() {
        let raw = format!("user={}", url::form_urlencoded::byte_serialize(USER.as_bytes()).collect::<String>());
        let params = LaunchParams::parse(&raw).unwrap();
        assert_eq!(params.verify(BOT_TOKEN), Err(LaunchError::MissingHash));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(LaunchParams::parse("   "), Err(LaunchError::Empty));
        assert_eq!(LaunchParams::parse("auth_date=1&hash=ab"), Err(LaunchError::MissingUser));
        assert!(matches!(
            LaunchParams::parse("user=%7Bnot-json"),
            Err(LaunchError::MalformedUser(_))
        ));
        assert!(matches!(
            LaunchParams::parse("user=%7B%22id%22%3A1%2C%22first_name%22%3A%22A%22%7D&auth_date=yesterday"),
            Err(LaunchError::InvalidAuthDate(_))
        ));
    }

    #[test]
    fn test_age_secs_out_of_range_auth_date() {
        let raw = format!(
            "user={}&auth_date={}",
            url::form_urlencoded::byte_serialize(USER.as_bytes()).collect::<String>(),
            i64::MIN
        );
        let params = LaunchParams::parse(&raw).unwrap();
        assert!(matches!(
            params.age_secs(chrono::Utc::now()),
            Err(LaunchError::InvalidAuthDate(_))
        ));
    }

    #[test]
    fn test_age_secs() {
        let params = LaunchParams::parse(&signed()).unwrap();
        let now = chrono::DateTime::from_timestamp(1_700_000_060, 0).unwrap();
        assert_eq!(params.age_secs(now), Ok(Some(60)));
    }

    #[test]
    fn test_data_check_string_is_sorted_without_hash() {
        let params = LaunchParams::parse(&signed()).unwrap();
        let check = params.data_check_string();
        let keys: Vec<&str> = check.lines().map(|l| l.split('=').next().unwrap()).collect();
        assert_eq!(keys, vec!["auth_date", "query_id", "user"]);
    }
}
