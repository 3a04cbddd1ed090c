use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::errors::ApiError;
use crate::routes::auth::ServerState;
use service::contact;

#[derive(Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[utoipa::path(post, path = "/api/contact", tag = "contact", request_body = crate::openapi::ContactRequestDoc, responses((status = 201, description = "Created"), (status = 400, description = "Bad Request")))]
pub async fn submit(
    State(state): State<ServerState>,
    Json(input): Json<ContactRequest>,
) -> Result<(StatusCode, Json<models::contact_message::Model>), ApiError> {
    let created = contact::submit(&state.db, &input.name, &input.email, &input.message).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
