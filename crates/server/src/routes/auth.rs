use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Extension, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use uuid::Uuid;

use crate::errors::ApiError;
use service::auth::domain::{AuthUser, Claims, LoginInput, RegisterInput};
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::service::{decode_claims, AuthConfig, AuthService};

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: ServerAuthConfig,
    pub uploads: configs::UploadsConfig,
}

impl ServerState {
    pub fn auth_service(&self) -> AuthService<SeaOrmAuthRepository> {
        let repo = Arc::new(SeaOrmAuthRepository { db: self.db.clone() });
        AuthService::new(
            repo,
            AuthConfig {
                jwt_secret: Some(self.auth.jwt_secret.clone()),
                token_ttl_hours: self.auth.token_ttl_hours,
            },
        )
    }
}

#[derive(Serialize)]
pub struct RegisterOutput {
    pub user_id: Uuid,
    pub email: String,
    pub full_name: String,
}

#[derive(Serialize)]
pub struct LoginOutput {
    pub user_id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub token: String,
}

#[derive(Serialize)]
pub struct MeOutput {
    pub user_id: Uuid,
    pub email: String,
    pub role: String,
}

#[utoipa::path(post, path = "/api/users/register", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 201, description = "Registered"), (status = 400, description = "Bad Request")))]
pub async fn register(
    State(state): State<ServerState>,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, Json<RegisterOutput>), ApiError> {
    let user: AuthUser = state.auth_service().register(input).await?;
    let out = RegisterOutput { user_id: user.id, email: user.email.clone(), full_name: user.full_name() };
    Ok((StatusCode::CREATED, Json(out)))
}

#[utoipa::path(post, path = "/api/users/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged In"), (status = 401, description = "Unauthorized")))]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> Result<(CookieJar, Json<LoginOutput>), ApiError> {
    let session = state.auth_service().login(input).await?;
    let user = session.user;
    let token = session
        .token
        .ok_or_else(|| ApiError::internal("token generation failed"))?;

    let mut cookie = Cookie::new("auth_token", token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    let jar = jar.add(cookie);

    let out = LoginOutput {
        user_id: user.id,
        email: user.email.clone(),
        full_name: user.full_name(),
        role: user.role,
        token,
    };
    Ok((jar, Json(out)))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar.remove(Cookie::from("auth_token"));
    (jar, StatusCode::NO_CONTENT)
}

/// Identity of the caller, taken from the verified token.
pub async fn me(Extension(claims): Extension<Claims>) -> Result<Json<MeOutput>, ApiError> {
    let user_id = claims
        .user_id()
        .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "invalid token subject"))?;
    Ok(Json(MeOutput { user_id, email: claims.sub, role: claims.role }))
}

fn token_from_request(req: &Request) -> Option<String> {
    let authz = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if let Some(h) = authz {
        return h.strip_prefix("Bearer ").map(|t| t.to_string());
    }

    // Cookie fallback for browser clients
    let cookie_header = req
        .headers()
        .get(axum::http::header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    for part in cookie_header.split(';') {
        if let Some(rest) = part.trim().strip_prefix("auth_token=") {
            if !rest.is_empty() {
                return Some(rest.to_string());
            }
        }
    }
    None
}

/// Middleware: validate `Authorization: Bearer <token>` (or the `auth_token`
/// cookie) and expose the verified claims to downstream handlers.
pub async fn require_bearer(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let path = req.uri().path().to_string();
    let token = match token_from_request(&req) {
        Some(t) => t,
        None => {
            tracing::warn!(path = %path, "missing Authorization header and auth_token cookie");
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    match decode_claims(&token, &state.auth.jwt_secret) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::warn!(path = %path, err = %e, "token validation failed");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

/// Middleware: require the admin role. Must run after [`require_bearer`].
pub async fn require_admin(req: Request, next: Next) -> Result<Response, StatusCode> {
    match req.extensions().get::<Claims>() {
        Some(claims) if claims.is_admin() => Ok(next.run(req).await),
        Some(_) => Err(StatusCode::FORBIDDEN),
        None => Err(StatusCode::UNAUTHORIZED),
    }
}

/// Shared helper: the caller's user id, or 401 when the token subject is
/// malformed.
pub fn caller_id(claims: &Claims) -> Result<Uuid, ApiError> {
    claims
        .user_id()
        .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "invalid token subject"))
}
