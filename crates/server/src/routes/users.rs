use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::routes::auth::{caller_id, ServerState};
use service::auth::domain::Claims;
use service::users::{self, ProfileUpdate};

/// Full user directory; admins only.
pub async fn list_users(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<models::user::Model>>, ApiError> {
    if !claims.is_admin() {
        return Err(ApiError::forbidden("admin role required"));
    }
    let users = users::list_users(&state.db).await?;
    Ok(Json(users))
}

/// A single profile; own account or admin.
pub async fn get_user(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<models::user::Model>, ApiError> {
    if !claims.is_admin() && caller_id(&claims)? != id {
        return Err(ApiError::forbidden("not your account"));
    }
    let user = users::get_user(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;
    Ok(Json(user))
}

/// Update profile fields; own account or admin.
pub async fn update_user(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<models::user::Model>, ApiError> {
    if !claims.is_admin() && caller_id(&claims)? != id {
        return Err(ApiError::forbidden("not your account"));
    }
    let updated = users::update_profile(&state.db, id, update).await?;
    Ok(Json(updated))
}

/// Remove the caller's own account. Admin-initiated deletion of other users
/// lives under the admin routes.
pub async fn delete_own_account(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if caller_id(&claims)? != id {
        return Err(ApiError::forbidden("not your account"));
    }
    service::admin::delete_user(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
