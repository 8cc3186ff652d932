mod common;

use common::{access_cookie, offline_context, user};
use foody::{server::api, MAX_BODY_BYTES};
use serde_json::{json, Value};
use warp::{http::StatusCode, test::request};

fn body(response: &warp::http::Response<warp::hyper::body::Bytes>) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}

#[tokio::test]
async fn health_is_served_outside_v1() {
    let response = request()
        .method("GET")
        .path("/health")
        .reply(&api(offline_context()))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(&response)["status"], "ok");
}

#[tokio::test]
async fn unknown_routes_are_not_found() {
    let response = request()
        .method("GET")
        .path("/v1/pantry")
        .reply(&api(offline_context()))
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body(&response)["code"], 404);
}

#[tokio::test]
async fn ingredients_require_an_access_token() {
    let response = request()
        .method("GET")
        .path("/v1/recipes/ingredients")
        .reply(&api(offline_context()))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body(&response);
    assert_eq!(body["code"], 401);
    assert!(body.get("ingredients").is_none());
    assert!(!body.is_array());
}

#[tokio::test]
async fn garbage_cookies_are_unauthorized() {
    let response = request()
        .method("GET")
        .path("/v1/recipes/ingredients")
        .header("cookie", "access_token=not.a.token")
        .reply(&api(offline_context()))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_tokens_do_not_open_protected_routes() {
    let context = offline_context();
    let tokens = context.keys.generate_session(&user("42")).unwrap();

    let response = request()
        .method("GET")
        .path("/v1/auth/me")
        .header("cookie", format!("access_token={}", tokens.refresh_token))
        .reply(&api(context))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_returns_the_session_claims() {
    let context = offline_context();
    let cookie = access_cookie(&context.keys, &user("42"));

    let response = request()
        .method("GET")
        .path("/v1/auth/me")
        .header("cookie", cookie)
        .reply(&api(context))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body(&response);
    assert_eq!(body["sub"], "42");
    assert_eq!(body["email"], "42@example.com");
}

#[tokio::test]
async fn bearer_headers_are_accepted() {
    let context = offline_context();
    let token = context.keys.generate_access_token(&user("7")).unwrap();

    let response = request()
        .method("GET")
        .path("/v1/auth/me")
        .header("authorization", format!("Bearer {token}"))
        .reply(&api(context))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(&response)["sub"], "7");
}

#[tokio::test]
async fn malformed_check_exists_body_is_a_bad_request() {
    let response = request()
        .method("POST")
        .path("/v1/recipes/check-exists")
        .header("content-type", "application/json")
        .body("{\"youtubeUrl\": ")
        .reply(&api(offline_context()))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(&response)["code"], 400);
}

#[tokio::test]
async fn non_youtube_links_do_not_exist() {
    let response = request()
        .method("POST")
        .path("/v1/recipes/check-exists")
        .json(&json!({ "youtubeUrl": "https://vimeo.com/12345" }))
        .reply(&api(offline_context()))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(&response), json!({ "exists": false }));
}

#[tokio::test]
async fn unknown_sort_keys_are_rejected() {
    let context = offline_context();
    let cookie = access_cookie(&context.keys, &user("42"));

    let response = request()
        .method("GET")
        .path("/v1/recipes/recommendations?sort=rating")
        .header("cookie", cookie)
        .reply(&api(context))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_ingredient_batches_are_rejected() {
    let context = offline_context();
    let cookie = access_cookie(&context.keys, &user("42"));

    let response = request()
        .method("POST")
        .path("/v1/recipes/ingredients")
        .header("cookie", cookie)
        .json(&json!([]))
        .reply(&api(context))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn agent_ingestion_validates_before_storing() {
    let response = request()
        .method("POST")
        .path("/v1/recipes/from-agent")
        .json(&json!({
            "youtube_url": "https://vimeo.com/12345",
            "ingredients": [{ "name": "Kimchi", "confidence": 0.9 }],
            "processing_status": "completed"
        }))
        .reply(&api(offline_context()))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn refresh_without_a_token_is_unauthorized() {
    let response = request()
        .method("POST")
        .path("/v1/auth/refresh")
        .reply(&api(offline_context()))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn oversized_refresh_bodies_are_refused() {
    let response = request()
        .method("POST")
        .path("/v1/auth/refresh")
        .body(vec![b' '; MAX_BODY_BYTES as usize + 1])
        .reply(&api(offline_context()))
        .await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body(&response)["code"], 413);
}

#[tokio::test]
async fn refresh_bodies_without_a_length_are_refused() {
    let response = request()
        .method("POST")
        .path("/v1/auth/refresh")
        .header("transfer-encoding", "chunked")
        .reply(&api(offline_context()))
        .await;

    assert_eq!(response.status(), StatusCode::LENGTH_REQUIRED);
    assert_eq!(body(&response)["code"], 411);
}

#[tokio::test]
async fn sign_out_expires_both_cookies() {
    let response = request()
        .method("POST")
        .path("/v1/auth/signout")
        .reply(&api(offline_context()))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookies: Vec<&str> = response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect();
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().all(|cookie| cookie.contains("Max-Age=0")));
}

#[tokio::test]
async fn wrong_methods_are_not_allowed() {
    let response = request()
        .method("PUT")
        .path("/v1/recipes/all-ingredients")
        .reply(&api(offline_context()))
        .await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
