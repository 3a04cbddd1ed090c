use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::routes::auth::{caller_id, ServerState};
use service::auth::domain::Claims;
use service::blogs::{self, BlogInput};

/// The author's public identity embedded in blog responses.
#[derive(Serialize)]
pub struct BlogAuthor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl BlogAuthor {
    fn from_user(u: &models::user::Model) -> Self {
        Self { id: u.id, name: u.full_name(), email: u.email.clone() }
    }
}

/// A post with its author embedded.
#[derive(Serialize)]
pub struct BlogOutput {
    #[serde(flatten)]
    pub blog: models::blog::Model,
    pub author_name: Option<String>,
    pub author: Option<BlogAuthor>,
}

impl BlogOutput {
    fn new(blog: models::blog::Model, author: Option<models::user::Model>) -> Self {
        let author = author.as_ref().map(BlogAuthor::from_user);
        let author_name = author.as_ref().map(|a| a.name.clone());
        Self { blog, author_name, author }
    }
}

fn to_output(items: Vec<(models::blog::Model, Option<models::user::Model>)>) -> Vec<BlogOutput> {
    items.into_iter().map(|(blog, author)| BlogOutput::new(blog, author)).collect()
}

#[utoipa::path(get, path = "/api/blogs", tag = "blogs", responses((status = 200, description = "OK")))]
pub async fn list_blogs(State(state): State<ServerState>) -> Result<Json<Vec<BlogOutput>>, ApiError> {
    let items = blogs::list_with_authors(&state.db).await?;
    Ok(Json(to_output(items)))
}

pub async fn get_blog(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BlogOutput>, ApiError> {
    let (blog, author) = blogs::get_with_author(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("blog not found"))?;
    Ok(Json(BlogOutput::new(blog, author)))
}

pub async fn list_by_author(
    State(state): State<ServerState>,
    Path(author_id): Path<Uuid>,
) -> Result<Json<Vec<models::blog::Model>>, ApiError> {
    let items = blogs::list_by_author(&state.db, author_id).await?;
    Ok(Json(items))
}

/// Create a post authored by the caller.
pub async fn create_blog(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<BlogInput>,
) -> Result<(StatusCode, Json<models::blog::Model>), ApiError> {
    let author_id = caller_id(&claims)?;
    let created = blogs::create_blog(&state.db, input, author_id).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Edit a post; author or admin.
pub async fn update_blog(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(input): Json<BlogInput>,
) -> Result<Json<models::blog::Model>, ApiError> {
    let (existing, _) = blogs::get_with_author(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("blog not found"))?;
    if !claims.is_admin() && existing.author_id != caller_id(&claims)? {
        return Err(ApiError::forbidden("not your post"));
    }
    let updated = blogs::update_blog(&state.db, id, input).await?;
    Ok(Json(updated))
}

/// Delete a post; author or admin.
pub async fn delete_blog(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let (existing, _) = blogs::get_with_author(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("blog not found"))?;
    if !claims.is_admin() && existing.author_id != caller_id(&claims)? {
        return Err(ApiError::forbidden("not your post"));
    }
    blogs::delete_blog(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
