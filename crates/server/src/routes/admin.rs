use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use sea_orm::{EntityTrait, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::routes::auth::{caller_id, ServerState};
use crate::routes::bookings::BookingOutput;
use service::auth::domain::Claims;
use service::pagination::Pagination;
use service::{admin, catalog, contact, excel};

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub search: Option<String>,
}

impl PageQuery {
    fn pagination(&self) -> Pagination {
        let d = Pagination::default();
        Pagination {
            page: self.page.unwrap_or(d.page),
            page_size: self.page_size.unwrap_or(d.page_size),
        }
    }
}

#[derive(Serialize)]
pub struct PagedResponse<T> {
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub items: Vec<T>,
}

#[utoipa::path(get, path = "/api/admin/dashboard", tag = "admin", responses((status = 200, description = "OK"), (status = 403, description = "Forbidden")))]
pub async fn dashboard(
    State(state): State<ServerState>,
) -> Result<Json<admin::DashboardStats>, ApiError> {
    let stats = admin::dashboard(&state.db).await?;
    Ok(Json(stats))
}

pub async fn list_users(
    State(state): State<ServerState>,
) -> Result<Json<Vec<admin::UserOverview>>, ApiError> {
    let users = admin::list_users_with_counts(&state.db).await?;
    Ok(Json(users))
}

#[derive(Deserialize)]
pub struct RoleUpdate {
    pub role: String,
}

pub async fn update_role(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(update): Json<RoleUpdate>,
) -> Result<Json<models::user::Model>, ApiError> {
    let updated = admin::update_user_role(&state.db, id, &update.role).await?;
    Ok(Json(updated))
}

pub async fn delete_user(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if caller_id(&claims)? == id {
        return Err(ApiError::bad_request("use the account route to delete yourself"));
    }
    admin::delete_user(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- catalog management ----

pub async fn list_services(
    State(state): State<ServerState>,
) -> Result<Json<Vec<models::service::Model>>, ApiError> {
    let items = catalog::list_all(&state.db).await?;
    Ok(Json(items))
}

pub async fn create_service(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<catalog::ServiceInput>,
) -> Result<(StatusCode, Json<models::service::Model>), ApiError> {
    let created = catalog::create_service(&state.db, input, caller_id(&claims)?).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_service(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(input): Json<catalog::ServiceInput>,
) -> Result<Json<models::service::Model>, ApiError> {
    let updated = catalog::update_service(&state.db, id, input).await?;
    Ok(Json(updated))
}

pub async fn delete_service(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    catalog::delete_service(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- paged listings ----

pub async fn list_bookings(
    State(state): State<ServerState>,
    Query(q): Query<PageQuery>,
) -> Result<Json<PagedResponse<BookingOutput>>, ApiError> {
    let page = q.pagination();
    let (total, items) =
        service::bookings::admin_search(&state.db, q.search.as_deref(), page).await?;
    let items = items
        .into_iter()
        .map(|(booking, svc)| BookingOutput { booking, service: svc })
        .collect();
    Ok(Json(PagedResponse { total, page: page.page, page_size: page.page_size, items }))
}

pub async fn delete_booking(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    service::bookings::delete_booking(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_contact_messages(
    State(state): State<ServerState>,
    Query(q): Query<PageQuery>,
) -> Result<Json<PagedResponse<models::contact_message::Model>>, ApiError> {
    let page = q.pagination();
    let (total, items) = contact::admin_search(&state.db, q.search.as_deref(), page).await?;
    Ok(Json(PagedResponse { total, page: page.page, page_size: page.page_size, items }))
}

pub async fn delete_contact_message(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    contact::delete_message(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- Excel import/export ----

fn xlsx_response(filename: &str, bytes: Vec<u8>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, XLSX_MIME.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
}

/// Download the whole catalog as a workbook.
pub async fn export_services(
    State(state): State<ServerState>,
) -> Result<impl IntoResponse, ApiError> {
    let items = models::service::Entity::find()
        .find_also_related(models::user::Entity)
        .order_by_asc(models::service::Column::Name)
        .all(&state.db)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    let rows: Vec<_> = items
        .into_iter()
        .map(|(svc, creator)| (svc, creator.map(|u| u.full_name())))
        .collect();
    let bytes = excel::export_services(&rows)?;
    Ok(xlsx_response("services.xlsx", bytes))
}

/// Download an empty workbook with the expected columns.
pub async fn import_template() -> Result<impl IntoResponse, ApiError> {
    let bytes = excel::template()?;
    Ok(xlsx_response("services-template.xlsx", bytes))
}

#[derive(Serialize)]
pub struct ImportResponse {
    pub imported: usize,
    pub errors: Vec<String>,
}

/// Upload a workbook and create a catalog entry per valid row. Rows the
/// parser or the catalog rejects are reported, not fatal.
pub async fn import_services(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<Json<ImportResponse>, ApiError> {
    let creator = caller_id(&claims)?;

    let mut bytes: Option<Vec<u8>> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?
    {
        if field.name() == Some("file") {
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(e.to_string()))?;
            bytes = Some(data.to_vec());
            break;
        }
    }
    let bytes = bytes.ok_or_else(|| ApiError::bad_request("missing \"file\" field"))?;

    let outcome = excel::import_services(&bytes)?;
    let mut imported = 0usize;
    let mut errors = outcome.skipped;
    for row in outcome.rows {
        let input = catalog::ServiceInput {
            name: row.name.clone(),
            description: row.description,
            image_url: row.image_url,
            icon: row.icon,
            price: row.price,
            category: row.category,
            is_active: row.is_active,
        };
        match catalog::create_service(&state.db, input, creator).await {
            Ok(_) => imported += 1,
            Err(e) => errors.push(format!("{}: {}", row.name, e)),
        }
    }
    info!(imported, errors = errors.len(), "catalog import finished");
    Ok(Json(ImportResponse { imported, errors }))
}
