use std::{convert::Infallible, sync::Arc};

use sqlx::{Pool, Postgres};
use warp::Filter;

use crate::{
    config::Config,
    cookies::CookieOptions,
    error::Error,
    google::GoogleVerifier,
    jwt::TokenKeys,
};

/// Everything a handler needs, shared by every route.
#[derive(Clone)]
pub struct Context {
    pub pool: Pool<Postgres>,
    pub config: Arc<Config>,
    pub keys: TokenKeys,
    pub google: Arc<GoogleVerifier>,
    pub cookies: CookieOptions,
}

impl Context {
    pub fn new(pool: Pool<Postgres>, config: Config) -> Result<Self, Error> {
        let google = GoogleVerifier::new(&config.google_client_id);
        Self::with_verifier(pool, config, google)
    }

    pub fn with_verifier(
        pool: Pool<Postgres>,
        config: Config,
        google: GoogleVerifier,
    ) -> Result<Self, Error> {
        let keys = TokenKeys::new(
            config.jwt_secret.as_bytes(),
            config.access_token_ttl_secs,
            config.refresh_token_ttl_secs,
        )?;

        let cookies = CookieOptions {
            domain: config.cookie_domain.clone(),
            secure: config.cookie_secure,
        };

        Ok(Self {
            pool,
            config: Arc::new(config),
            keys,
            google: Arc::new(google),
            cookies,
        })
    }
}

pub fn with_context(context: Context) -> impl Filter<Extract = (Context,), Error = Infallible> + Clone {
    warp::any().map(move || context.clone())
}
