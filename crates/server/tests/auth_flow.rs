use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use migration::MigratorTrait;
use serde_json::json;
use tower::Service;
use uuid::Uuid;

use server::routes::{self, auth};

fn cors() -> tower_http::cors::CorsLayer {
    tower_http::cors::CorsLayer::very_permissive()
}

async fn build_app() -> anyhow::Result<Router> {
    let db = models::db::connect().await?;
    // Migrations may already be applied by another test binary
    if let Err(e) = migration::Migrator::up(&db, None).await {
        let msg = format!("{}", e);
        if msg.contains("duplicate key value violates unique constraint") {
            eprintln!("migrations already applied, continue: {}", msg);
        } else {
            return Err(e.into());
        }
    }
    let uploads_dir = format!("target/test-data/{}", Uuid::new_v4());
    tokio::fs::create_dir_all(&uploads_dir).await?;
    let state = auth::ServerState {
        db,
        auth: auth::ServerAuthConfig { jwt_secret: "test-secret".into(), token_ttl_hours: 12 },
        uploads: configs::UploadsConfig { dir: uploads_dir, max_bytes: 1024 * 1024 },
    };
    Ok(routes::build_router(cors(), state))
}

async fn json_body(resp: axum::response::Response) -> anyhow::Result<serde_json::Value> {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn test_register_login_and_me() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let mut app = build_app().await?;

    let email = format!("user_{}@example.com", Uuid::new_v4());
    let password = "S3curePass!";

    // Register
    let req = Request::builder()
        .method("POST")
        .uri("/api/users/register")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&json!({
            "first_name": "Test", "last_name": "User",
            "email": email, "password": password, "phone": null
        }))?))?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // Login
    let req = Request::builder()
        .method("POST")
        .uri("/api/users/login")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&json!({"email": email, "password": password}))?))?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get("set-cookie").is_some());
    let body = json_body(resp).await?;
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(body["role"], "user");

    // Verified identity via the protected route
    let req = Request::builder()
        .method("GET")
        .uri("/api/users/me")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let me = json_body(resp).await?;
    assert_eq!(me["email"], email.as_str());
    Ok(())
}

#[tokio::test]
async fn test_login_wrong_password() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let mut app = build_app().await?;

    let email = format!("user_{}@example.com", Uuid::new_v4());
    let req = Request::builder()
        .method("POST")
        .uri("/api/users/register")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&json!({
            "first_name": "Test", "last_name": "User",
            "email": email, "password": "StrongPass123", "phone": null
        }))?))?;
    let _ = app.call(req).await?;

    let req = Request::builder()
        .method("POST")
        .uri("/api/users/login")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&json!({"email": email, "password": "wrong"}))?))?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_register_short_password_rejected() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let mut app = build_app().await?;

    let req = Request::builder()
        .method("POST")
        .uri("/api/users/register")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&json!({
            "first_name": "A", "last_name": "B",
            "email": "short@example.com", "password": "abc", "phone": null
        }))?))?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_registration_rejected() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let mut app = build_app().await?;

    let email = format!("dup_{}@example.com", Uuid::new_v4());
    let payload = json!({
        "first_name": "Dup", "last_name": "User",
        "email": email, "password": "secret1", "phone": null
    });
    let req = Request::builder()
        .method("POST")
        .uri("/api/users/register")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&payload)?))?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = Request::builder()
        .method("POST")
        .uri("/api/users/register")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&payload)?))?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_protected_routes_require_token() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let mut app = build_app().await?;

    let req = Request::builder().method("GET").uri("/api/bookings").body(Body::empty())?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .method("GET")
        .uri("/api/admin/dashboard")
        .body(Body::empty())?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
