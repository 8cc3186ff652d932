use warp::{reject::Rejection, Filter};

use crate::constants::ACCESS_TOKEN_COOKIE;
use crate::database::error::HtmlError;

use super::jwt::{SessionData, TokenKeys, TokenKind};

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() {
        Some(token.trim())
    } else {
        None
    }
}

/// Requires a valid access token, read from the `access_token` cookie or an
/// `Authorization: Bearer` header, and extracts its identity claims.
pub fn with_session(
    keys: TokenKeys,
) -> impl Filter<Extract = (SessionData,), Error = Rejection> + Clone {
    warp::cookie::optional::<String>(ACCESS_TOKEN_COOKIE)
        .and(warp::header::optional::<String>("authorization"))
        .and_then(move |cookie: Option<String>, header: Option<String>| {
            let keys = keys.clone();
            async move {
                let token = cookie
                    .filter(|token| !token.is_empty())
                    .or_else(|| header.as_deref().and_then(bearer_token).map(str::to_string))
                    .ok_or_else(|| {
                        warp::reject::custom(HtmlError::Unauthorized.new("Missing access token"))
                    })?;

                keys.verify(&token, TokenKind::Access)
                    .map(SessionData::from)
                    .map_err(warp::reject::custom)
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_tokens_are_extracted() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("bearer  abc"), Some("abc"));
        assert_eq!(bearer_token("Basic dXNlcg=="), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("abc"), None);
    }
}
