use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::routes::auth::{caller_id, ServerState};
use service::auth::domain::Claims;
use service::auth::service::decode_claims;
use service::bookings::{self, BookingInput, BookingUpdate};

/// A booking joined with the service it reserves.
#[derive(Serialize)]
pub struct BookingOutput {
    #[serde(flatten)]
    pub booking: models::booking::Model,
    pub service: Option<models::service::Model>,
}

fn to_output(items: Vec<(models::booking::Model, Option<models::service::Model>)>) -> Vec<BookingOutput> {
    items
        .into_iter()
        .map(|(booking, service)| BookingOutput { booking, service })
        .collect()
}

/// Best-effort caller identity on a public route: a valid bearer token or
/// `auth_token` cookie yields the user id, anything else means guest.
fn optional_caller(headers: &HeaderMap, secret: &str) -> Option<Uuid> {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer ").map(str::to_string))
        .or_else(|| {
            let cookie_header = headers
                .get(axum::http::header::COOKIE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("");
            cookie_header
                .split(';')
                .find_map(|part| part.trim().strip_prefix("auth_token=").map(str::to_string))
        })?;
    decode_claims(&token, secret).ok().and_then(|c| c.user_id())
}

/// Create a booking. Open to guests; a logged-in caller's identity overrides
/// any client-supplied `user_id`.
#[utoipa::path(post, path = "/api/bookings", tag = "bookings", request_body = crate::openapi::BookingRequest, responses((status = 201, description = "Created"), (status = 400, description = "Bad Request")))]
pub async fn create_booking(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(mut input): Json<BookingInput>,
) -> Result<(StatusCode, Json<models::booking::Model>), ApiError> {
    input.user_id = optional_caller(&headers, &state.auth.jwt_secret);
    let created = bookings::create_booking(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// All bookings for admins, own bookings for everyone else.
pub async fn list_bookings(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<BookingOutput>>, ApiError> {
    let items = if claims.is_admin() {
        bookings::list_all(&state.db).await?
    } else {
        bookings::list_by_user(&state.db, caller_id(&claims)?).await?
    };
    Ok(Json(to_output(items)))
}

pub async fn get_booking(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<models::booking::Model>, ApiError> {
    let found = bookings::get_booking(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("booking not found"))?;
    if !claims.is_admin() && found.user_id != Some(caller_id(&claims)?) {
        return Err(ApiError::forbidden("not your booking"));
    }
    Ok(Json(found))
}

/// Bookings of one user; own history or admin.
pub async fn list_by_user(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<BookingOutput>>, ApiError> {
    if !claims.is_admin() && caller_id(&claims)? != user_id {
        return Err(ApiError::forbidden("not your bookings"));
    }
    let items = bookings::list_by_user(&state.db, user_id).await?;
    Ok(Json(to_output(items)))
}

pub async fn update_booking(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(update): Json<BookingUpdate>,
) -> Result<Json<models::booking::Model>, ApiError> {
    let existing = bookings::get_booking(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("booking not found"))?;
    if !claims.is_admin() && existing.user_id != Some(caller_id(&claims)?) {
        return Err(ApiError::forbidden("not your booking"));
    }
    // Non-admins may only cancel or annotate, not confirm themselves
    if !claims.is_admin() {
        if let Some(status) = update.status.as_deref() {
            if status != models::booking::STATUS_CANCELLED {
                return Err(ApiError::forbidden("only admins can change booking status"));
            }
        }
        if update.payment_status.is_some() {
            return Err(ApiError::forbidden("only admins can change payment status"));
        }
    }
    let updated = bookings::update_booking(&state.db, id, update).await?;
    Ok(Json(updated))
}

pub async fn delete_booking(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let existing = bookings::get_booking(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("booking not found"))?;
    if !claims.is_admin() && existing.user_id != Some(caller_id(&claims)?) {
        return Err(ApiError::forbidden("not your booking"));
    }
    bookings::delete_booking(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
