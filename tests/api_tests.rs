use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

use saleboard::{api, config::Config, db, token::TokenService, AppState};

const ADMIN_EMAIL: &str = "admin@example.com";
const ADMIN_PASSWORD: &str = "admin123";

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.auth.token_secret = "integration-test-secret".to_string();
    config.auth.admin_email = ADMIN_EMAIL.to_string();
    config.auth.admin_password = ADMIN_PASSWORD.to_string();

    // Unique shared-cache in-memory database per test so pool connections
    // all see the same data.
    let db_url = format!(
        "sqlite:file:{}?mode=memory&cache=shared",
        uuid::Uuid::new_v4()
    );
    let pool = db::init(&db_url).await.expect("Failed to init database");
    db::ensure_admin(&pool, ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .expect("Failed to seed admin");

    let tokens = TokenService::new(&config.auth.token_secret);
    api::create_router(Arc::new(AppState::new(config, pool, tokens)))
}

fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn bare_request(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Log in and return the `auth_token=...` cookie pair for later requests.
async fn login(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            &format!(r#"{{"email":"{ADMIN_EMAIL}","password":"{ADMIN_PASSWORD}"}}"#),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login sets a session cookie")
        .to_str()
        .unwrap()
        .to_string();

    assert!(set_cookie.starts_with("auth_token="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Path=/"));
    assert!(set_cookie.contains("Max-Age=3600"));

    set_cookie.split(';').next().unwrap().to_string()
}

async fn create_product(app: &Router, cookie: &str, body: &str) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/products", Some(cookie), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
async fn health_is_public() {
    let app = spawn_app().await;
    let response = app
        .oneshot(bare_request("GET", "/health", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn products_require_a_session() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(bare_request("GET", "/api/products", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(bare_request(
            "GET",
            "/api/products",
            Some("auth_token=not-a-real-token"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // A token signed with a different secret is just as invalid.
    let forged = TokenService::new("some-other-secret")
        .issue(1, ADMIN_EMAIL)
        .unwrap();
    let response = app
        .oneshot(bare_request(
            "GET",
            "/api/products",
            Some(&format!("auth_token={forged}")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let app = spawn_app().await;

    for body in [
        format!(r#"{{"email":"{ADMIN_EMAIL}","password":"wrong"}}"#),
        format!(r#"{{"email":"nobody@example.com","password":"{ADMIN_PASSWORD}"}}"#),
    ] {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/auth/login", None, &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "unauthorized");
    }
}

#[tokio::test]
async fn product_crud_cycle() {
    let app = spawn_app().await;
    let cookie = login(&app).await;

    let sale_end = (Utc::now() + Duration::days(3)).to_rfc3339();
    let created = create_product(
        &app,
        &cookie,
        &format!(r#"{{"name":"Desk","price":50.0,"discount":20.0,"sale_end":"{sale_end}"}}"#),
    )
    .await;

    let id = created["id"].as_str().expect("created product has an id");
    assert_eq!(created["name"], "Desk");
    assert_eq!(created["price"], 50.0);
    assert_eq!(created["discount"], 20.0);

    // List contains it
    let response = app
        .clone()
        .oneshot(bare_request("GET", "/api/products", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    // Partial update replaces only the supplied field
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/products/{id}"),
            Some(&cookie),
            r#"{"price":45.0}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["price"], 45.0);
    assert_eq!(updated["name"], "Desk");
    assert_eq!(updated["discount"], 20.0);

    // Delete, then the id is gone
    let response = app
        .clone()
        .oneshot(bare_request(
            "DELETE",
            &format!("/api/products/{id}"),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(bare_request(
            "DELETE",
            &format!("/api/products/{id}"),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_product_id_is_404() {
    let app = spawn_app().await;
    let cookie = login(&app).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/products/no-such-id",
            Some(&cookie),
            r#"{"price":10.0}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn create_validation_reason_codes() {
    let app = spawn_app().await;
    let cookie = login(&app).await;

    let cases = [
        (r#"{"name":"","price":10.0}"#, "name_required"),
        (r#"{"name":"A","price":0.0}"#, "invalid_price"),
        (
            r#"{"name":"A","price":10.0,"discount":150.0}"#,
            "invalid_discount_range",
        ),
        (
            r#"{"name":"A","price":10.0,"discount":50.0,"sale_end":""}"#,
            "sale_end_required",
        ),
    ];

    for (body, code) in cases {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/products", Some(&cookie), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");

        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], code, "body: {body}");
    }
}

#[tokio::test]
async fn update_merge_invariant_is_enforced() {
    let app = spawn_app().await;
    let cookie = login(&app).await;

    // Stored product has no sale window.
    let created = create_product(&app, &cookie, r#"{"name":"Lamp","price":20.0}"#).await;
    let id = created["id"].as_str().unwrap();

    // Raising the discount without supplying sale_end must be rejected.
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/products/{id}"),
            Some(&cookie),
            r#"{"discount":20.0}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "sale_end_required");

    // Supplying both in one patch is fine.
    let sale_end = (Utc::now() + Duration::days(2)).to_rfc3339();
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/products/{id}"),
            Some(&cookie),
            &format!(r#"{{"discount":20.0,"sale_end":"{sale_end}"}}"#),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn list_filters_server_side() {
    let app = spawn_app().await;
    let cookie = login(&app).await;

    let sale_end = (Utc::now() + Duration::days(3)).to_rfc3339();
    create_product(&app, &cookie, r#"{"name":"Plain Mug","price":10.0}"#).await;
    create_product(
        &app,
        &cookie,
        &format!(r#"{{"name":"Sale Mug","price":50.0,"discount":20.0,"sale_end":"{sale_end}"}}"#),
    )
    .await;

    let response = app
        .clone()
        .oneshot(bare_request(
            "GET",
            "/api/products?discount=yes",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Sale Mug"]);

    // Junk price bound is a no-op, not an error.
    let response = app
        .clone()
        .oneshot(bare_request(
            "GET",
            "/api/products?min_price=abc",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 2);

    // So is an out-of-vocabulary enum criterion.
    let response = app
        .clone()
        .oneshot(bare_request(
            "GET",
            "/api/products?discount=maybe&sale_status=someday",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn dashboard_counts_ignore_filters() {
    let app = spawn_app().await;
    let cookie = login(&app).await;

    let sale_end = (Utc::now() + Duration::days(3)).to_rfc3339();
    create_product(&app, &cookie, r#"{"name":"Plain","price":10.0}"#).await;
    create_product(
        &app,
        &cookie,
        &format!(r#"{{"name":"Discounted","price":50.0,"discount":20.0,"sale_end":"{sale_end}"}}"#),
    )
    .await;

    let response = app
        .clone()
        .oneshot(bare_request("GET", "/api/dashboard", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["total_products"], 2);
    assert_eq!(json["products_on_sale"], 1);
    assert_eq!(json["upcoming_expirations"], 1);
}

#[tokio::test]
async fn logout_clears_the_cookie() {
    let app = spawn_app().await;
    let cookie = login(&app).await;

    let response = app
        .clone()
        .oneshot(bare_request("POST", "/api/auth/logout", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("logout resets the cookie")
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("auth_token="));
    assert!(set_cookie.contains("Max-Age=0"));

    // Logout without a session is a 401, same as any protected route.
    let response = app
        .oneshot(bare_request("POST", "/api/auth/logout", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
