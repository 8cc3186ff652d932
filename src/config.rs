use std::{env, fmt::Display, str::FromStr};

use thiserror::Error;
use url::Url;

use crate::constants::{
    DEFAULT_ACCESS_TOKEN_TTL_SECS, DEFAULT_AGENT_USER_ID, DEFAULT_CLIENT_URL,
    DEFAULT_MAX_CONNECTIONS, DEFAULT_PORT, DEFAULT_REFRESH_TOKEN_TTL_SECS,
};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Environment variable {0} is required")]
    Missing(&'static str),

    #[error("Invalid {key} value: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub google_client_id: String,
    pub client_url: String,
    pub cookie_domain: Option<String>,
    pub cookie_secure: bool,
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_secs: i64,
    pub agent_user_id: String,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            port: try_load(&lookup, "PORT", DEFAULT_PORT)?,
            database_url: require(&lookup, "DATABASE_URL")?,
            database_max_connections: try_load(
                &lookup,
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_MAX_CONNECTIONS,
            )?,
            jwt_secret: require(&lookup, "JWT_SECRET")?,
            google_client_id: require(&lookup, "GOOGLE_CLIENT_ID")?,
            client_url: client_origin(
                var(&lookup, "CLIENT_URL").as_deref().unwrap_or(DEFAULT_CLIENT_URL),
            )?,
            cookie_domain: var(&lookup, "COOKIE_DOMAIN"),
            cookie_secure: try_load(&lookup, "COOKIE_SECURE", false)?,
            access_token_ttl_secs: try_load(
                &lookup,
                "ACCESS_TOKEN_TTL_SECS",
                DEFAULT_ACCESS_TOKEN_TTL_SECS,
            )?,
            refresh_token_ttl_secs: try_load(
                &lookup,
                "REFRESH_TOKEN_TTL_SECS",
                DEFAULT_REFRESH_TOKEN_TTL_SECS,
            )?,
            agent_user_id: var(&lookup, "AGENT_USER_ID")
                .unwrap_or_else(|| DEFAULT_AGENT_USER_ID.to_string()),
        };

        if config.access_token_ttl_secs <= 0 {
            return Err(ConfigError::Invalid {
                key: "ACCESS_TOKEN_TTL_SECS",
                reason: String::from("must be positive"),
            });
        }
        if config.refresh_token_ttl_secs < config.access_token_ttl_secs {
            return Err(ConfigError::Invalid {
                key: "REFRESH_TOKEN_TTL_SECS",
                reason: String::from("must not be shorter than the access token lifetime"),
            });
        }

        Ok(config)
    }
}

/// "http://localhost:3000/app" -> "http://localhost:3000"
fn client_origin(value: &str) -> Result<String, ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        key: "CLIENT_URL",
        reason: reason.to_string(),
    };

    let url = Url::parse(value).map_err(|e| invalid(&e.to_string()))?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url.origin().ascii_serialization()),
        _ => Err(invalid("expected an http or https origin")),
    }
}

fn var<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn require<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    var(lookup, key).ok_or(ConfigError::Missing(key))
}

fn try_load<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match var(lookup, key) {
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => {
            log::info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: &[(&str, &str)] = &[
        ("DATABASE_URL", "postgres://localhost/foody"),
        ("JWT_SECRET", "secret"),
        ("GOOGLE_CLIENT_ID", "client.apps.googleusercontent.com"),
    ];

    #[test]
    fn defaults_apply() {
        let config = Config::from_lookup(lookup(REQUIRED)).unwrap();

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.client_url, DEFAULT_CLIENT_URL);
        assert_eq!(config.access_token_ttl_secs, 3600);
        assert_eq!(config.refresh_token_ttl_secs, 1_209_600);
        assert_eq!(config.agent_user_id, "0");
        assert!(!config.cookie_secure);
        assert_eq!(config.cookie_domain, None);
    }

    #[test]
    fn missing_secret_is_reported() {
        let result = Config::from_lookup(lookup(&REQUIRED[..1]));
        assert_eq!(result.unwrap_err(), ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn overrides_are_parsed() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("PORT", "8080"),
            ("COOKIE_SECURE", "true"),
            ("COOKIE_DOMAIN", "foody.example"),
            ("ACCESS_TOKEN_TTL_SECS", "60"),
            ("REFRESH_TOKEN_TTL_SECS", "120"),
        ]);
        let config = Config::from_lookup(lookup(&pairs)).unwrap();

        assert_eq!(config.port, 8080);
        assert!(config.cookie_secure);
        assert_eq!(config.cookie_domain.as_deref(), Some("foody.example"));
        assert_eq!(config.access_token_ttl_secs, 60);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PORT", "eighty"));

        match Config::from_lookup(lookup(&pairs)) {
            Err(ConfigError::Invalid { key, .. }) => assert_eq!(key, "PORT"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn client_url_is_reduced_to_its_origin() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("CLIENT_URL", "https://foody.example/app/"));
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.client_url, "https://foody.example");

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("CLIENT_URL", "localhost"));
        assert!(Config::from_lookup(lookup(&pairs)).is_err());
    }

    #[test]
    fn refresh_must_outlive_access() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([("ACCESS_TOKEN_TTL_SECS", "600"), ("REFRESH_TOKEN_TTL_SECS", "60")]);
        assert!(Config::from_lookup(lookup(&pairs)).is_err());
    }
}
