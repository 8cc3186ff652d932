//! Google ID token verification.
//!
//! Tokens are `RS256` JWTs signed with one of Google's rotating keys. The key
//! set is fetched from Google's JWKS endpoint and held until the response's
//! `Cache-Control: max-age` elapses, after which it is fetched again.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::constants::{GOOGLE_CERTS_URL, GOOGLE_ISSUERS};
use crate::database::error::{Error, HtmlError};

const MIN_KEY_TTL_SECS: i64 = 300;
const DEFAULT_KEY_TTL_SECS: i64 = 3600;

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleClaims {
    pub sub: String,
    pub email: Option<String>,
    pub email_verified: Option<bool>,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub exp: i64,
}

/// The profile a verified Google identity signs in with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

impl TryFrom<GoogleClaims> for GoogleProfile {
    type Error = Error;

    fn try_from(claims: GoogleClaims) -> Result<Self, Self::Error> {
        if claims.email_verified == Some(false) {
            return Err(HtmlError::Unauthorized.new("Google account email is not verified"));
        }

        let email = claims
            .email
            .filter(|email| !email.trim().is_empty())
            .ok_or_else(|| HtmlError::Unauthorized.new("Google token carries no email"))?;

        let name = claims
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| email.to_owned());

        Ok(Self {
            id: claims.sub,
            email,
            name,
            picture: claims.picture,
        })
    }
}

#[derive(Debug, Deserialize)]
struct JsonWebKey {
    kid: String,
    n: String,
    e: String,
}

#[derive(Debug, Deserialize)]
struct JsonWebKeySet {
    keys: Vec<JsonWebKey>,
}

struct CachedKeys {
    keys: HashMap<String, DecodingKey>,
    expires_at: DateTime<Utc>,
}

pub struct GoogleVerifier {
    client_id: String,
    certs_url: String,
    http_client: Client,
    cached_keys: Arc<RwLock<Option<CachedKeys>>>,
}

impl GoogleVerifier {
    pub fn new(client_id: &str) -> Self {
        Self::with_certs_url(client_id, GOOGLE_CERTS_URL)
    }

    pub fn with_certs_url(client_id: &str, certs_url: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            certs_url: certs_url.to_string(),
            http_client: Client::new(),
            cached_keys: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn verify(&self, id_token: &str) -> Result<GoogleProfile, Error> {
        let header = decode_header(id_token).map_err(|e| {
            log::debug!("Failed to decode Google token header: {e}");
            HtmlError::Unauthorized.new("Invalid Google token")
        })?;

        let kid = header
            .kid
            .ok_or_else(|| HtmlError::Unauthorized.new("Google token missing key id"))?;

        let key = self.get_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.client_id.as_str()]);
        validation.set_issuer(GOOGLE_ISSUERS);

        let data = decode::<GoogleClaims>(id_token, &key, &validation).map_err(|e| {
            log::debug!("Google token validation failed: {e}");
            match e.kind() {
                ErrorKind::ExpiredSignature => HtmlError::Unauthorized.new("Google token expired"),
                ErrorKind::InvalidAudience => {
                    HtmlError::Unauthorized.new("Google token issued for another client")
                }
                ErrorKind::InvalidIssuer => HtmlError::Unauthorized.new("Invalid Google token issuer"),
                _ => HtmlError::Unauthorized.new("Invalid Google token"),
            }
        })?;

        log::info!("Google token verified for subject {}", data.claims.sub);
        GoogleProfile::try_from(data.claims)
    }

    async fn get_key(&self, kid: &str) -> Result<DecodingKey, Error> {
        if let Some(key) = self.cached_key(kid).await {
            return Ok(key);
        }

        self.refresh_keys().await?;

        self.cached_key(kid)
            .await
            .ok_or_else(|| HtmlError::Unauthorized.new("Unknown Google signing key"))
    }

    async fn cached_key(&self, kid: &str) -> Option<DecodingKey> {
        let cache = self.cached_keys.read().await;
        cache.as_ref().and_then(|cached| {
            if cached.expires_at > Utc::now() {
                cached.keys.get(kid).cloned()
            } else {
                None
            }
        })
    }

    async fn refresh_keys(&self) -> Result<(), Error> {
        log::info!("Fetching Google signing keys");

        let response = self
            .http_client
            .get(&self.certs_url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| {
                log::warn!("Failed to fetch Google signing keys: {e}");
                HtmlError::InternalServerError.new("Failed to fetch Google signing keys")
            })?;

        let ttl = response
            .headers()
            .get(reqwest::header::CACHE_CONTROL)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_max_age)
            .unwrap_or(DEFAULT_KEY_TTL_SECS)
            .max(MIN_KEY_TTL_SECS);

        let set: JsonWebKeySet = response.json().await.map_err(|e| {
            log::warn!("Failed to parse Google signing keys: {e}");
            HtmlError::InternalServerError.new("Failed to parse Google signing keys")
        })?;

        let keys = decoding_keys(set);
        if keys.is_empty() {
            return Err(HtmlError::InternalServerError.new("No usable Google signing keys"));
        }

        let expires_at = Utc::now() + Duration::seconds(ttl);
        log::info!("Cached {} Google signing keys until {expires_at}", keys.len());

        let mut cache = self.cached_keys.write().await;
        *cache = Some(CachedKeys { keys, expires_at });
        Ok(())
    }
}

fn decoding_keys(set: JsonWebKeySet) -> HashMap<String, DecodingKey> {
    set.keys
        .into_iter()
        .filter_map(|jwk| match DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
            Ok(key) => Some((jwk.kid, key)),
            Err(e) => {
                log::warn!("Skipping Google key {}: {e}", jwk.kid);
                None
            }
        })
        .collect()
}

/// "public, max-age=19845, must-revalidate, no-transform" -> 19845
fn parse_max_age(cache_control: &str) -> Option<i64> {
    cache_control
        .split(',')
        .map(str::trim)
        .find_map(|directive| directive.strip_prefix("max-age="))
        .and_then(|value| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> GoogleClaims {
        GoogleClaims {
            sub: String::from("1098765"),
            email: Some(String::from("cook@example.com")),
            email_verified: Some(true),
            name: Some(String::from("Cook")),
            picture: Some(String::from("https://lh3.googleusercontent.com/a/cook")),
            exp: 0,
        }
    }

    #[test]
    fn max_age_is_read_from_cache_control() {
        assert_eq!(
            parse_max_age("public, max-age=19845, must-revalidate, no-transform"),
            Some(19845)
        );
        assert_eq!(parse_max_age("no-cache"), None);
        assert_eq!(parse_max_age("max-age=soon"), None);
    }

    #[test]
    fn verified_claims_become_a_profile() {
        let profile = GoogleProfile::try_from(claims()).unwrap();
        assert_eq!(profile.id, "1098765");
        assert_eq!(profile.email, "cook@example.com");
        assert_eq!(profile.name, "Cook");
    }

    #[test]
    fn missing_name_falls_back_to_email() {
        let mut claims = claims();
        claims.name = None;
        assert_eq!(GoogleProfile::try_from(claims).unwrap().name, "cook@example.com");
    }

    #[test]
    fn unverified_or_missing_email_is_rejected() {
        let mut unverified = claims();
        unverified.email_verified = Some(false);
        assert_eq!(GoogleProfile::try_from(unverified).unwrap_err().code, 401);

        let mut anonymous = claims();
        anonymous.email = None;
        assert!(GoogleProfile::try_from(anonymous).is_err());
    }

    #[test]
    fn malformed_key_sets_yield_no_keys() {
        let set: JsonWebKeySet = serde_json::from_value(serde_json::json!({
            "keys": [{ "kid": "bad", "n": "***", "e": "AQAB" }]
        }))
        .unwrap();
        assert!(decoding_keys(set).is_empty());
    }

    #[tokio::test]
    async fn garbage_tokens_fail_before_fetching_keys() {
        let verifier = GoogleVerifier::with_certs_url("client", "http://127.0.0.1:9/certs");
        let error = verifier.verify("garbage").await.unwrap_err();
        assert_eq!(error.code, 401);
    }
}
