use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::routes::auth::ServerState;
use service::comments::{self, CommentInput, CommentView};

/// A comment with a display name resolved from the author or guest fields.
#[derive(Serialize)]
pub struct CommentOutput {
    #[serde(flatten)]
    pub comment: models::comment::Model,
    pub author_name: String,
    pub is_guest: bool,
}

fn display_name(author: &Option<models::user::Model>, c: &models::comment::Model) -> String {
    author
        .as_ref()
        .map(|a| a.full_name())
        .or_else(|| c.guest_name.clone())
        .unwrap_or_else(|| "Anonymous".to_string())
}

pub async fn list_for_blog(
    State(state): State<ServerState>,
    Path(blog_id): Path<Uuid>,
) -> Result<Json<Vec<CommentOutput>>, ApiError> {
    let items = comments::list_for_blog(&state.db, blog_id).await?;
    let out = items
        .into_iter()
        .map(|(comment, author)| {
            let author_name = display_name(&author, &comment);
            let is_guest = comment.user_id.is_none();
            CommentOutput { comment, author_name, is_guest }
        })
        .collect();
    Ok(Json(out))
}

#[derive(Serialize)]
pub struct CommentWithPermissions {
    #[serde(flatten)]
    pub comment: models::comment::Model,
    pub author_name: String,
    pub is_guest: bool,
    pub can_delete: bool,
}

/// Listing with per-comment delete permission for the given viewer.
pub async fn list_with_permissions(
    State(state): State<ServerState>,
    Path((blog_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<CommentWithPermissions>>, ApiError> {
    let views = comments::list_with_permissions(&state.db, blog_id, Some(user_id)).await?;
    let out = views
        .into_iter()
        .map(|CommentView { comment, author, can_delete }| {
            let author_name = display_name(&author, &comment);
            let is_guest = comment.user_id.is_none();
            CommentWithPermissions { comment, author_name, is_guest, can_delete }
        })
        .collect();
    Ok(Json(out))
}

/// Post a comment; open to guests.
pub async fn create_comment(
    State(state): State<ServerState>,
    Json(input): Json<CommentInput>,
) -> Result<(StatusCode, Json<models::comment::Model>), ApiError> {
    let created = comments::create_comment(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Deserialize)]
pub struct DeleteCommentQuery {
    pub user_id: Option<Uuid>,
}

/// Delete a comment on behalf of `user_id`; the service enforces who may.
pub async fn delete_comment(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Query(q): Query<DeleteCommentQuery>,
) -> Result<StatusCode, ApiError> {
    comments::delete_comment(&state.db, id, q.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
