use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use migration::MigratorTrait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde_json::json;
use tower::Service;
use uuid::Uuid;

use models::user;
use server::routes::{self, auth};

fn cors() -> tower_http::cors::CorsLayer {
    tower_http::cors::CorsLayer::very_permissive()
}

async fn build_app() -> anyhow::Result<(Router, DatabaseConnection)> {
    build_app_with_upload_cap(1024 * 1024).await
}

async fn build_app_with_upload_cap(max_bytes: u64) -> anyhow::Result<(Router, DatabaseConnection)> {
    let db = models::db::connect().await?;
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
        db: db.clone(),
        auth: auth::ServerAuthConfig { jwt_secret: "test-secret".into(), token_ttl_hours: 12 },
        uploads: configs::UploadsConfig { dir: uploads_dir, max_bytes },
    };
    Ok((routes::build_router(cors(), state), db))
}

async fn json_body(resp: axum::response::Response) -> anyhow::Result<serde_json::Value> {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn post_json(uri: &str, body: &serde_json::Value) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body)?))?)
}

/// Register a user, optionally promote to admin, and return (user_id, token).
async fn signup(
    app: &mut Router,
    db: &DatabaseConnection,
    admin: bool,
) -> anyhow::Result<(Uuid, String)> {
    let email = format!("flow_{}@example.com", Uuid::new_v4());
    let password = "FlowPass123";

    let resp = app
        .call(post_json(
            "/api/users/register",
            &json!({
                "first_name": "Flow", "last_name": "Tester",
                "email": email, "password": password, "phone": null
            }),
        )?)
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = json_body(resp).await?;
    let user_id = Uuid::parse_str(body["user_id"].as_str().unwrap())?;

    if admin {
        // Promote directly; the role lands in the token at the next login
        let mut am: user::ActiveModel =
            user::Entity::find_by_id(user_id).one(db).await?.unwrap().into();
        am.role = Set(user::ROLE_ADMIN.to_string());
        am.update(db).await?;
    }

    let resp = app
        .call(post_json("/api/users/login", &json!({"email": email, "password": password}))?)
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await?;
    Ok((user_id, body["token"].as_str().unwrap().to_string()))
}

fn bearer(req: axum::http::request::Builder, token: &str) -> axum::http::request::Builder {
    req.header("authorization", format!("Bearer {}", token))
}

#[tokio::test]
async fn test_catalog_admin_crud_and_public_listing() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let (mut app, db) = build_app().await?;
    let (_admin_id, admin_token) = signup(&mut app, &db, true).await?;
    let (_user_id, user_token) = signup(&mut app, &db, false).await?;

    // Non-admin is rejected from the back office
    let req = bearer(Request::builder().method("GET").uri("/api/admin/services"), &user_token)
        .body(Body::empty())?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Admin creates a service
    let name = format!("Test service {}", Uuid::new_v4().simple());
    let payload = json!({
        "name": name, "description": "Created in a test",
        "image_url": null, "icon": null, "price": "42.00",
        "category": "Testing", "is_active": true
    });
    let req = bearer(Request::builder().method("POST").uri("/api/admin/services"), &admin_token)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&payload)?))?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = json_body(resp).await?;
    let service_id = created["id"].as_str().unwrap().to_string();

    // Publicly visible while active
    let resp = app
        .call(Request::builder().method("GET").uri("/api/services").body(Body::empty())?)
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let listing = json_body(resp).await?;
    assert!(listing.as_array().unwrap().iter().any(|s| s["id"] == created["id"]));

    // Deactivate, disappears from the public listing
    let mut edit = payload.clone();
    edit["is_active"] = json!(false);
    let req = bearer(
        Request::builder().method("PUT").uri(format!("/api/admin/services/{}", service_id)),
        &admin_token,
    )
    .header("content-type", "application/json")
    .body(Body::from(serde_json::to_vec(&edit)?))?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .call(Request::builder().method("GET").uri("/api/services").body(Body::empty())?)
        .await?;
    let listing = json_body(resp).await?;
    assert!(!listing.as_array().unwrap().iter().any(|s| s["id"] == created["id"]));

    // Delete
    let req = bearer(
        Request::builder().method("DELETE").uri(format!("/api/admin/services/{}", service_id)),
        &admin_token,
    )
    .body(Body::empty())?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn test_guest_booking_flow() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let (mut app, db) = build_app().await?;
    let (_admin_id, admin_token) = signup(&mut app, &db, true).await?;

    let req = bearer(Request::builder().method("POST").uri("/api/admin/services"), &admin_token)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&json!({
            "name": format!("Bookable {}", Uuid::new_v4().simple()),
            "description": "Bookable in a test",
            "image_url": null, "icon": null, "price": "10.00",
            "category": null, "is_active": true
        }))?))?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let svc = json_body(resp).await?;

    // Guest booking, no token
    let marker = format!("guest_{}@example.com", Uuid::new_v4().simple());
    let resp = app
        .call(post_json(
            "/api/bookings",
            &json!({
                "user_id": null,
                "service_id": svc["id"],
                "service_date": chrono::Utc::now().to_rfc3339(),
                "number_of_people": 2,
                "payment_method": "cash",
                "notes": null,
                "first_name": "Guest", "last_name": "Visitor",
                "email": marker, "phone": null, "address": null
            }),
        )?)
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let booking = json_body(resp).await?;
    assert_eq!(booking["status"], "pending");
    assert_eq!(booking["total_amount"], "20.00");
    assert!(booking["user_id"].is_null());

    // Back-office search finds it by guest email
    let req = bearer(
        Request::builder()
            .method("GET")
            .uri(format!("/api/admin/bookings?search={}", marker)),
        &admin_token,
    )
    .body(Body::empty())?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = json_body(resp).await?;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["id"], booking["id"]);
    Ok(())
}

#[tokio::test]
async fn test_blog_and_comment_flow() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let (mut app, db) = build_app().await?;
    let (author_id, author_token) = signup(&mut app, &db, false).await?;

    // Authoring requires a token
    let blog_payload = json!({
        "title": format!("Post {}", Uuid::new_v4().simple()),
        "content": "Written by a test",
        "image_url": null, "quote": null
    });
    let resp = app.call(post_json("/api/blogs", &blog_payload)?).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = bearer(Request::builder().method("POST").uri("/api/blogs"), &author_token)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&blog_payload)?))?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let blog = json_body(resp).await?;

    // Public view carries the author name
    let resp = app
        .call(
            Request::builder()
                .method("GET")
                .uri(format!("/api/blogs/{}", blog["id"].as_str().unwrap()))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let shown = json_body(resp).await?;
    assert_eq!(shown["author_name"], "Flow Tester");
    assert_eq!(shown["author"]["id"].as_str().unwrap(), author_id.to_string());
    assert_eq!(shown["author"]["name"], "Flow Tester");
    assert!(shown["author"]["email"].as_str().unwrap().ends_with("@example.com"));

    // Guest comment
    let resp = app
        .call(post_json(
            "/api/comments",
            &json!({
                "content": "Nice post",
                "blog_id": blog["id"],
                "user_id": null,
                "guest_name": "Anon",
                "guest_email": null
            }),
        )?)
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let comment = json_body(resp).await?;

    // Author sees a delete permission on the guest comment
    let uri = format!(
        "/api/comments/blog/{}/with-permissions/{}",
        blog["id"].as_str().unwrap(),
        author_id
    );
    let resp = app
        .call(Request::builder().method("GET").uri(uri).body(Body::empty())?)
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let views = json_body(resp).await?;
    let view = views
        .as_array()
        .unwrap()
        .iter()
        .find(|v| v["id"] == comment["id"])
        .unwrap();
    assert_eq!(view["can_delete"], true);

    // Anonymous delete rejected, author delete allowed
    let uri = format!("/api/comments/{}", comment["id"].as_str().unwrap());
    let resp = app
        .call(Request::builder().method("DELETE").uri(&uri).body(Body::empty())?)
        .await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = app
        .call(
            Request::builder()
                .method("DELETE")
                .uri(format!("{}?user_id={}", uri, author_id))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn test_contact_form_and_admin_listing() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let (mut app, db) = build_app().await?;
    let (_admin_id, admin_token) = signup(&mut app, &db, true).await?;

    let marker = format!("contact_{}", Uuid::new_v4().simple());
    let resp = app
        .call(post_json(
            "/api/contact",
            &json!({"name": marker, "email": "visitor@example.com", "message": "Is breakfast included?"}),
        )?)
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let msg = json_body(resp).await?;

    let req = bearer(
        Request::builder()
            .method("GET")
            .uri(format!("/api/admin/contact-messages?search={}", marker)),
        &admin_token,
    )
    .body(Body::empty())?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = json_body(resp).await?;
    assert_eq!(page["total"], 1);

    let req = bearer(
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/admin/contact-messages/{}", msg["id"].as_str().unwrap())),
        &admin_token,
    )
    .body(Body::empty())?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    Ok(())
}

fn multipart_upload(token: &str, size: usize) -> anyhow::Result<Request<Body>> {
    let boundary = "upload-test-boundary";
    let mut body = Vec::with_capacity(size + 256);
    body.extend_from_slice(
        format!(
            "--{}\r\ncontent-disposition: form-data; name=\"file\"; filename=\"photo.png\"\r\ncontent-type: image/png\r\n\r\n",
            boundary
        )
        .as_bytes(),
    );
    body.resize(body.len() + size, 0u8);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    Ok(bearer(Request::builder().method("POST").uri("/api/uploads/images"), token)
        .header("content-type", format!("multipart/form-data; boundary={}", boundary))
        .body(Body::from(body))?)
}

#[tokio::test]
async fn test_upload_size_cap_comes_from_config() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let (mut app, db) = build_app_with_upload_cap(5 * 1024 * 1024).await?;
    let (_user_id, token) = signup(&mut app, &db, false).await?;

    // Under the configured cap but above axum's built-in default body limit
    let resp = app.call(multipart_upload(&token, 3 * 1024 * 1024)?).await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let out = json_body(resp).await?;
    assert!(out["url"].as_str().unwrap().starts_with("/uploads/images/"));

    // Over the cap is still a client error
    let resp = app.call(multipart_upload(&token, 6 * 1024 * 1024)?).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_dashboard_and_excel_downloads() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let (mut app, db) = build_app().await?;
    let (_admin_id, admin_token) = signup(&mut app, &db, true).await?;

    let req = bearer(Request::builder().method("GET").uri("/api/admin/dashboard"), &admin_token)
        .body(Body::empty())?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let stats = json_body(resp).await?;
    assert!(stats["total_users"].as_u64().unwrap() >= 1);

    for uri in ["/api/admin/services/export", "/api/admin/services/template"] {
        let req = bearer(Request::builder().method("GET").uri(uri), &admin_token)
            .body(Body::empty())?;
        let resp = app.call(req).await?;
        assert_eq!(resp.status(), StatusCode::OK);
        let ct = resp.headers().get("content-type").unwrap().to_str()?.to_string();
        assert!(ct.contains("spreadsheetml"), "unexpected content type: {}", ct);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
        // XLSX files are zip archives
        assert_eq!(&bytes[..2], b"PK");
    }

    // The template's two sample rows import cleanly
    let req = bearer(
        Request::builder().method("GET").uri("/api/admin/services/template"),
        &admin_token,
    )
    .body(Body::empty())?;
    let resp = app.call(req).await?;
    let template = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;

    let boundary = "xlsx-import-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{}\r\ncontent-disposition: form-data; name=\"file\"; filename=\"services.xlsx\"\r\ncontent-type: application/octet-stream\r\n\r\n",
            boundary
        )
        .as_bytes(),
    );
    body.extend_from_slice(&template);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    let req = bearer(
        Request::builder().method("POST").uri("/api/admin/services/import"),
        &admin_token,
    )
    .header("content-type", format!("multipart/form-data; boundary={}", boundary))
    .body(Body::from(body))?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let outcome = json_body(resp).await?;
    assert_eq!(outcome["imported"], 2);
    assert!(outcome["errors"].as_array().unwrap().is_empty());
    Ok(())
}
