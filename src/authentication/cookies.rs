use warp::http::header::{HeaderValue, SET_COOKIE};
use warp::Reply;

use crate::constants::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};

#[derive(Debug, Clone, Default)]
pub struct CookieOptions {
    pub domain: Option<String>,
    pub secure: bool,
}

impl CookieOptions {
    fn build(&self, name: &str, value: &str, max_age_secs: i64) -> String {
        let mut cookie =
            format!("{name}={value}; Path=/; Max-Age={max_age_secs}; HttpOnly; SameSite=Lax");
        if let Some(domain) = &self.domain {
            cookie.push_str(&format!("; Domain={domain}"));
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    pub fn access_cookie(&self, token: &str, max_age_secs: i64) -> String {
        self.build(ACCESS_TOKEN_COOKIE, token, max_age_secs)
    }

    pub fn refresh_cookie(&self, token: &str, max_age_secs: i64) -> String {
        self.build(REFRESH_TOKEN_COOKIE, token, max_age_secs)
    }

    pub fn clear_cookies(&self) -> Vec<String> {
        vec![
            self.build(ACCESS_TOKEN_COOKIE, "", 0),
            self.build(REFRESH_TOKEN_COOKIE, "", 0),
        ]
    }
}

/// Appends one `Set-Cookie` header per cookie to `reply`.
pub fn with_cookies(reply: impl Reply, cookies: Vec<String>) -> warp::reply::Response {
    let mut response = reply.into_response();
    for cookie in cookies {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => log::error!("Refusing to send malformed cookie: {e}"),
        }
    }
    response
}
