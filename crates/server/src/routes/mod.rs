use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

pub mod admin;
pub mod auth;
pub mod blogs;
pub mod bookings;
pub mod catalog;
pub mod comments;
pub mod contact;
pub mod uploads;
pub mod users;

use crate::openapi::ApiDoc;
use auth::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK")))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: public, authenticated, and admin routes.
pub fn build_router(cors: CorsLayer, state: ServerState) -> Router {
    let uploads_dir = ServeDir::new(state.uploads.dir.clone());
    // The configured file cap plus room for multipart framing; without this
    // axum's default body limit rejects large uploads before the handler runs
    let upload_body_limit = DefaultBodyLimit::max(state.uploads.max_bytes as usize + 64 * 1024);

    // Open to everyone: auth entry points, the public site data, guest
    // bookings/comments, and the contact form.
    let public = Router::new()
        .route("/health", get(health))
        .route("/api/users/register", post(auth::register))
        .route("/api/users/login", post(auth::login))
        .route("/api/users/logout", post(auth::logout))
        .route("/api/services", get(catalog::list_services))
        .route("/api/services/:id", get(catalog::get_service))
        .route("/api/blogs", get(blogs::list_blogs))
        .route("/api/blogs/:id", get(blogs::get_blog))
        .route("/api/blogs/author/:id", get(blogs::list_by_author))
        .route("/api/bookings", post(bookings::create_booking))
        .route("/api/comments/blog/:blog_id", get(comments::list_for_blog))
        .route(
            "/api/comments/blog/:blog_id/with-permissions/:user_id",
            get(comments::list_with_permissions),
        )
        .route("/api/comments", post(comments::create_comment))
        .route("/api/comments/:id", delete(comments::delete_comment))
        .route("/api/contact", post(contact::submit));

    // Requires a valid token; handlers apply finer ownership checks.
    let protected = Router::new()
        .route("/api/users/me", get(auth::me))
        .route("/api/users", get(users::list_users))
        .route(
            "/api/users/:id",
            get(users::get_user).put(users::update_user).delete(users::delete_own_account),
        )
        .route("/api/bookings", get(bookings::list_bookings))
        .route(
            "/api/bookings/:id",
            get(bookings::get_booking)
                .put(bookings::update_booking)
                .delete(bookings::delete_booking),
        )
        .route("/api/bookings/user/:user_id", get(bookings::list_by_user))
        .route("/api/blogs", post(blogs::create_blog))
        .route("/api/blogs/:id", put(blogs::update_blog).delete(blogs::delete_blog))
        .route(
            "/api/uploads/images",
            post(uploads::upload_image).layer(upload_body_limit.clone()),
        )
        .route("/api/uploads/images/:name", delete(uploads::delete_image))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer));

    // Back office: token + admin role.
    let admin_routes = Router::new()
        .route("/api/admin/dashboard", get(admin::dashboard))
        .route("/api/admin/users", get(admin::list_users))
        .route("/api/admin/users/:id/role", put(admin::update_role))
        .route("/api/admin/users/:id", delete(admin::delete_user))
        .route("/api/admin/services", get(admin::list_services).post(admin::create_service))
        .route("/api/admin/services/export", get(admin::export_services))
        .route(
            "/api/admin/services/import",
            post(admin::import_services).layer(upload_body_limit),
        )
        .route("/api/admin/services/template", get(admin::import_template))
        .route(
            "/api/admin/services/:id",
            put(admin::update_service).delete(admin::delete_service),
        )
        .route("/api/admin/bookings", get(admin::list_bookings))
        .route("/api/admin/bookings/:id", delete(admin::delete_booking))
        .route("/api/admin/contact-messages", get(admin::list_contact_messages))
        .route("/api/admin/contact-messages/:id", delete(admin::delete_contact_message))
        .route_layer(middleware::from_fn(auth::require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer));

    Router::new()
        .merge(public)
        .merge(protected)
        .merge(admin_routes)
        .nest_service("/uploads/images", uploads_dir)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
