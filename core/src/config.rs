//! Client configuration loaded from the environment.
//!
//! | Variable                 | Required | Meaning                          |
//! |--------------------------|----------|----------------------------------|
//! | `TUMBLR_CONSUMER_KEY`    | yes      | OAuth consumer key               |
//! | `TUMBLR_CONSUMER_SECRET` | yes      | OAuth consumer secret            |
//! | `TUMBLR_TOKEN`           | no       | user token (needs the secret)    |
//! | `TUMBLR_TOKEN_SECRET`    | no       | user token secret                |
//! | `TUMBLR_API_BASE`        | no       | override of the API base URL     |

use ::config::{Config, Environment, Map};
use serde::Deserialize;

use crate::auth::Credentials;
use crate::client::API_BASE;
use crate::error::{ApiError, Result};
use crate::http::with_trailing_slash;

const ENV_PREFIX: &str = "TUMBLR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub consumer: Credentials,
    pub token: Option<Credentials>,
    pub base_url: String,
}

/// `TUMBLR_*` variables as the environment source sees them, prefix stripped.
#[derive(Debug, Default, Deserialize)]
struct RawEnv {
    consumer_key: Option<String>,
    consumer_secret: Option<String>,
    token: Option<String>,
    token_secret: Option<String>,
    api_base: Option<String>,
}

impl ClientConfig {
    pub fn new(consumer: Credentials) -> Self {
        Self {
            consumer,
            token: None,
            base_url: API_BASE.to_string(),
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::load(Environment::with_prefix(ENV_PREFIX))
    }

    /// Same as `from_env`, reading variables from `vars` instead of the process.
    pub fn from_source(vars: Map<String, String>) -> Result<Self> {
        Self::load(Environment::with_prefix(ENV_PREFIX).source(Some(vars)))
    }

    fn load(env: Environment) -> Result<Self> {
        let raw: RawEnv = Config::builder()
            .add_source(env)
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .map_err(|e| ApiError::Config(e.to_string()))?;
        Self::from_raw(raw)
    }

    // Blank values count as unset.
    fn from_raw(raw: RawEnv) -> Result<Self> {
        let set = |v: Option<String>| v.filter(|v| !v.trim().is_empty());
        let required = |v: Option<String>, name: &str| {
            set(v).ok_or_else(|| ApiError::Config(format!("{name} is not set")))
        };

        let consumer = Credentials::new(
            required(raw.consumer_key, "TUMBLR_CONSUMER_KEY")?,
            required(raw.consumer_secret, "TUMBLR_CONSUMER_SECRET")?,
        );
        let token = match (set(raw.token), set(raw.token_secret)) {
            (Some(token), Some(secret)) => Some(Credentials::new(token, secret)),
            (None, None) => None,
            _ => {
                return Err(ApiError::Config(
                    "TUMBLR_TOKEN and TUMBLR_TOKEN_SECRET must be set together".to_string(),
                ))
            }
        };
        let base_url = set(raw.api_base)
            .map(|base| with_trailing_slash(&base))
            .unwrap_or_else(|| API_BASE.to_string());

        Ok(Self {
            consumer,
            token,
            base_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Map<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn consumer_only() {
        let config = ClientConfig::from_source(vars(&[
            ("TUMBLR_CONSUMER_KEY", "ck"),
            ("TUMBLR_CONSUMER_SECRET", "cs"),
        ]))
        .unwrap();
        assert_eq!(config.consumer, Credentials::new("ck", "cs"));
        assert!(config.token.is_none());
        assert_eq!(config.base_url, API_BASE);
    }

    #[test]
    fn full_set_with_base_override() {
        let config = ClientConfig::from_source(vars(&[
            ("TUMBLR_CONSUMER_KEY", "ck"),
            ("TUMBLR_CONSUMER_SECRET", "cs"),
            ("TUMBLR_TOKEN", "t"),
            ("TUMBLR_TOKEN_SECRET", "ts"),
            ("TUMBLR_API_BASE", "http://127.0.0.1:3000/v2/"),
        ]))
        .unwrap();
        assert_eq!(config.token, Some(Credentials::new("t", "ts")));
        assert_eq!(config.base_url, "http://127.0.0.1:3000/v2/");
    }

    #[test]
    fn base_override_gains_trailing_slash() {
        let config = ClientConfig::from_source(vars(&[
            ("TUMBLR_CONSUMER_KEY", "ck"),
            ("TUMBLR_CONSUMER_SECRET", "cs"),
            ("TUMBLR_API_BASE", "http://127.0.0.1:3000/v2"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:3000/v2/");
    }

    #[test]
    fn unrelated_variables_are_ignored() {
        let config = ClientConfig::from_source(vars(&[
            ("TUMBLR_CONSUMER_KEY", "ck"),
            ("TUMBLR_CONSUMER_SECRET", "cs"),
            ("TUMBLR_BLOG", "staff"),
            ("HOME", "/root"),
        ]))
        .unwrap();
        assert_eq!(config.consumer, Credentials::new("ck", "cs"));
    }

    #[test]
    fn missing_consumer_secret_is_an_error() {
        let err = ClientConfig::from_source(vars(&[("TUMBLR_CONSUMER_KEY", "ck")])).unwrap_err();
        assert!(matches!(err, ApiError::Config(ref msg) if msg.contains("TUMBLR_CONSUMER_SECRET")));
    }

    #[test]
    fn half_a_token_is_an_error() {
        let err = ClientConfig::from_source(vars(&[
            ("TUMBLR_CONSUMER_KEY", "ck"),
            ("TUMBLR_CONSUMER_SECRET", "cs"),
            ("TUMBLR_TOKEN", "t"),
            ("TUMBLR_TOKEN_SECRET", "  "),
        ]))
        .unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }
}
