use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use jwt::SignWithKey;
use jwt::VerifyWithKey;
use serde::Deserialize;
use serde::Serialize;
use sha2::Sha256;

use crate::database::error::{Error, HtmlError};
use crate::schema::User;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JwtSessionData {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    pub kind: TokenKind,
    iat: i64,
    exp: i64,
}

impl JwtSessionData {
    pub fn new(user: &User, kind: TokenKind, lifetime_secs: i64) -> Self {
        let now = Utc::now();
        let iat = now.timestamp();
        let exp = (now + Duration::seconds(lifetime_secs)).timestamp();

        Self {
            sub: user.id.to_owned(),
            email: user.email.to_owned(),
            name: user.name.to_owned(),
            picture: user.profile_image.to_owned(),
            kind,
            iat,
            exp,
        }
    }

    pub fn expires_at(&self) -> i64 {
        self.exp
    }
}

/// Identity claims handed to handlers behind the session guard.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

impl From<JwtSessionData> for SessionData {
    fn from(value: JwtSessionData) -> Self {
        SessionData {
            sub: value.sub,
            email: value.email,
            name: value.name,
            picture: value.picture,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Signs and verifies first-party session tokens.
#[derive(Clone)]
pub struct TokenKeys {
    key: Hmac<Sha256>,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenKeys {
    pub fn new(secret: &[u8], access_ttl_secs: i64, refresh_ttl_secs: i64) -> Result<Self, Error> {
        let key = Hmac::new_from_slice(secret)
            .map_err(|_| HtmlError::InternalServerError.new("Invalid signing key"))?;

        Ok(Self {
            key,
            access_ttl_secs,
            refresh_ttl_secs,
        })
    }

    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl_secs
    }

    pub fn refresh_ttl_secs(&self) -> i64 {
        self.refresh_ttl_secs
    }

    fn sign(&self, claims: JwtSessionData) -> Result<String, Error> {
        claims.sign_with_key(&self.key).map_err(|e| {
            log::error!("Failed to sign session token: {e}");
            HtmlError::InternalServerError.new("Failed to sign session token")
        })
    }

    pub fn generate_access_token(&self, user: &User) -> Result<String, Error> {
        self.sign(JwtSessionData::new(user, TokenKind::Access, self.access_ttl_secs))
    }

    pub fn generate_session(&self, user: &User) -> Result<IssuedTokens, Error> {
        Ok(IssuedTokens {
            access_token: self.generate_access_token(user)?,
            refresh_token: self.sign(JwtSessionData::new(
                user,
                TokenKind::Refresh,
                self.refresh_ttl_secs,
            ))?,
        })
    }

    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<JwtSessionData, Error> {
        let session: JwtSessionData = token
            .verify_with_key(&self.key)
            .map_err(|_| HtmlError::InvalidSession.new("Invalid session; Invalid token"))?;

        if session.kind != kind {
            return Err(HtmlError::InvalidSession.new("Invalid session; Wrong token type"));
        }

        let now = Utc::now().timestamp();
        if (session.exp - now).is_negative() {
            return Err(HtmlError::InvalidSession.new("Invalid session; Token expired"));
        }

        Ok(session)
    }
}
