use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::routes::auth::ServerState;
use service::catalog;

/// Public catalog: active services only.
#[utoipa::path(get, path = "/api/services", tag = "services", responses((status = 200, description = "OK")))]
pub async fn list_services(
    State(state): State<ServerState>,
) -> Result<Json<Vec<models::service::Model>>, ApiError> {
    let items = catalog::list_active(&state.db).await?;
    Ok(Json(items))
}

#[utoipa::path(get, path = "/api/services/{id}", tag = "services", responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn get_service(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<models::service::Model>, ApiError> {
    let found = catalog::get_service(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("service not found"))?;
    Ok(Json(found))
}
