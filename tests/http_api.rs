mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use commerce_admin_api::{app::build_app, models::UserRole};
use common::{create_user, test_state};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn send(app: &Router, request: Request<Body>) -> anyhow::Result<(StatusCode, Value)> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, body))
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn bare_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn login(app: &Router, email: &str, password: &str) -> anyhow::Result<String> {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("username={email}&password={password}")))
        .unwrap();
    let (status, body) = send(app, request).await?;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    assert_eq!(body["token_type"], "bearer");
    Ok(body["access_token"].as_str().expect("token").to_string())
}

#[tokio::test]
async fn health_and_unknown_routes() -> anyhow::Result<()> {
    let app = build_app(test_state().await?);

    let (status, body) = send(&app, bare_request(Method::GET, "/health", None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");

    let (status, body) = send(&app, bare_request(Method::GET, "/nowhere", None)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["data"]["path"], "/nowhere");
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() -> anyhow::Result<()> {
    let app = build_app(test_state().await?);

    let (status, body) = send(&app, bare_request(Method::GET, "/api/clients", None)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["data"]["code"], "unauthorized");

    let (status, _) = send(
        &app,
        bare_request(Method::GET, "/api/products", Some("not-a-jwt")),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn register_login_and_test_token() -> anyhow::Result<()> {
    let app = build_app(test_state().await?);

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/auth/register",
            None,
            json!({ "email": "web@example.com", "password": "password1", "full_name": "Web" }),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["role"], "client");
    assert!(body["data"].get("hashed_password").is_none());

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/auth/register",
            None,
            json!({ "email": "web@example.com", "password": "password1" }),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["data"]["code"], "conflict");

    let token = login(&app, "web@example.com", "password1").await?;
    let (status, body) = send(
        &app,
        bare_request(Method::POST, "/api/auth/login/test-token", Some(&token)),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "web@example.com");

    let (status, _) = send(&app, bare_request(Method::GET, "/api/users", Some(&token))).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn order_lifecycle_over_http() -> anyhow::Result<()> {
    let state = test_state().await?;
    create_user(&state, "ops@example.com", "password1", UserRole::Admin).await?;
    let app = build_app(state);
    let token = login(&app, "ops@example.com", "password1").await?;
    let token = Some(token.as_str());

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/clients",
            token,
            json!({ "name": "Nina", "email": "nina@example.com", "cpf": "321" }),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    let client_id = body["data"]["id"].as_str().expect("client id").to_string();

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/products",
            token,
            json!({
                "description": "Butter",
                "sale_price": 799,
                "barcode": "H-1",
                "section": "dairy",
                "initial_stock": 5,
                "images": ["https://cdn.example/butter.png"]
            }),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    let product_id = body["data"]["id"].as_str().expect("product id").to_string();

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/orders",
            token,
            json!({
                "client_id": client_id,
                "items": [{ "product_id": product_id, "quantity": 2, "unit_price": 799 }]
            }),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["total_amount"], 1598);
    assert_eq!(body["data"]["items"][0]["section"], "dairy");
    let order_id = body["data"]["order"]["id"].as_str().expect("order id").to_string();

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/orders",
            token,
            json!({
                "client_id": client_id,
                "items": [{ "product_id": product_id, "quantity": 4, "unit_price": 799 }]
            }),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"]["code"], "insufficient_stock");

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/orders",
            token,
            json!({
                "client_id": client_id,
                "items": [{ "product_id": product_id, "quantity": 0, "unit_price": 799 }]
            }),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["data"]["code"], "validation");

    let (status, body) = send(
        &app,
        bare_request(Method::GET, "/api/orders?section=dairy&limit=5", token),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["meta"]["limit"], 5);

    let (status, body) = send(
        &app,
        bare_request(Method::GET, &format!("/api/products/{product_id}"), token),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["initial_stock"], 3);

    let (status, body) = send(
        &app,
        bare_request(Method::DELETE, &format!("/api/orders/{order_id}"), token),
    )
    .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(
        &app,
        bare_request(Method::GET, &format!("/api/orders/{order_id}"), token),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
