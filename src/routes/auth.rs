use serde::Serialize;
use warp::{hyper::body::Bytes, reject::Rejection, reply, Filter, Reply};

use crate::{
    actions,
    constants::{MAX_BODY_BYTES, REFRESH_TOKEN_COOKIE},
    cookies::with_cookies,
    error::HtmlError,
    form::{GoogleSignInForm, RefreshForm},
    jwt::{SessionData, TokenKind},
    middleware::with_session,
    schema::{SimpleResponse, User},
};

use super::context::{with_context, Context};

#[derive(Serialize)]
struct SignInResponse {
    message: String,
    user: User,
}

/// Routes mounted under `/auth`.
pub fn auth_routes(
    context: Context,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    google_sign_in_route(context.clone())
        .or(refresh_route(context.clone()))
        .or(sign_out_route(context.clone()))
        .or(me_route(context))
}

fn google_sign_in_route(
    context: Context,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("auth" / "google" / "signin")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with_context(context))
        .and_then(handle_google_sign_in)
}

fn refresh_route(
    context: Context,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("auth" / "refresh")
        .and(warp::post())
        .and(warp::cookie::optional::<String>(REFRESH_TOKEN_COOKIE))
        .and(optional_refresh_form())
        .and(with_context(context))
        .and_then(handle_refresh)
}

fn sign_out_route(
    context: Context,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("auth" / "signout")
        .and(warp::post())
        .and(with_context(context))
        .map(|context: Context| {
            with_cookies(
                reply::json(&SimpleResponse::ok("Signed out")),
                context.cookies.clear_cookies(),
            )
        })
}

fn me_route(context: Context) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("auth" / "me")
        .and(warp::get())
        .and(with_session(context.keys))
        .map(|session: SessionData| reply::json(&session))
}

/// The refresh body is optional, browsers send the cookie instead. Bodies
/// must declare their length so the size limit holds for chunked uploads.
fn optional_refresh_form() -> impl Filter<Extract = (RefreshForm,), Error = Rejection> + Clone {
    warp::header::optional::<u64>("content-length")
        .and(warp::header::optional::<String>("transfer-encoding"))
        .and_then(|length: Option<u64>, encoding: Option<String>| async move {
            match (length, encoding) {
                (Some(length), _) if length > MAX_BODY_BYTES => Err(warp::reject::custom(
                    HtmlError::PayloadTooLarge.new("Request body is too large"),
                )),
                (None, Some(_)) => Err(warp::reject::custom(
                    HtmlError::LengthRequired.new("A content-length header is required"),
                )),
                _ => Ok(()),
            }
        })
        .untuple_one()
        .and(warp::body::bytes())
        .and_then(|body: Bytes| async move {
            if body.iter().all(u8::is_ascii_whitespace) {
                return Ok(RefreshForm::default());
            }
            serde_json::from_slice::<RefreshForm>(&body).map_err(|e| {
                log::debug!("Malformed refresh body: {e}");
                warp::reject::custom(HtmlError::InvalidRequest.new("Malformed request body"))
            })
        })
}

async fn handle_google_sign_in(
    form: GoogleSignInForm,
    context: Context,
) -> Result<impl Reply, Rejection> {
    let profile = context.google.verify(&form.id_token).await?;
    let user = actions::sign_in_user(&profile, &context.pool).await?;

    if !user.is_active {
        return Err(HtmlError::Unauthorized.new("Account is disabled").into());
    }

    let tokens = context.keys.generate_session(&user)?;
    let cookies = vec![
        context
            .cookies
            .access_cookie(&tokens.access_token, context.keys.access_ttl_secs()),
        context
            .cookies
            .refresh_cookie(&tokens.refresh_token, context.keys.refresh_ttl_secs()),
    ];

    let body = SignInResponse {
        message: String::from("Signed in"),
        user,
    };
    Ok(with_cookies(reply::json(&body), cookies))
}

async fn handle_refresh(
    cookie: Option<String>,
    form: RefreshForm,
    context: Context,
) -> Result<impl Reply, Rejection> {
    let token = cookie
        .filter(|token| !token.is_empty())
        .or(form.refresh_token)
        .ok_or_else(|| HtmlError::Unauthorized.new("Missing refresh token"))?;

    let claims = context.keys.verify(&token, TokenKind::Refresh)?;

    let user = actions::get_user_by_id(&claims.sub, &context.pool)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| HtmlError::InvalidSession.new("User no longer exists"))?;

    let access_token = context.keys.generate_access_token(&user)?;
    log::info!("Reissued access token for user {}", user.id);

    Ok(with_cookies(
        reply::json(&SimpleResponse::ok("Token refreshed")),
        vec![context
            .cookies
            .access_cookie(&access_token, context.keys.access_ttl_secs())],
    ))
}
