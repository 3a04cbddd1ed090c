//! Blog posts written by registered users.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ServiceError;
use models::{blog, user};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogInput {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub quote: Option<String>,
}

/// All posts newest first, each joined with its author.
pub async fn list_with_authors(
    db: &DatabaseConnection,
) -> Result<Vec<(blog::Model, Option<user::Model>)>, ServiceError> {
    let items = blog::Entity::find()
        .find_also_related(user::Entity)
        .order_by_desc(blog::Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(items)
}

pub async fn get_with_author(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<(blog::Model, Option<user::Model>)>, ServiceError> {
    let found = blog::Entity::find_by_id(id)
        .find_also_related(user::Entity)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(found)
}

pub async fn list_by_author(
    db: &DatabaseConnection,
    author_id: Uuid,
) -> Result<Vec<blog::Model>, ServiceError> {
    let items = blog::Entity::find()
        .filter(blog::Column::AuthorId.eq(author_id))
        .order_by_desc(blog::Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(items)
}

pub async fn create_blog(
    db: &DatabaseConnection,
    input: BlogInput,
    author_id: Uuid,
) -> Result<blog::Model, ServiceError> {
    let author = user::Entity::find_by_id(author_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    if author.is_none() {
        return Err(ServiceError::Validation("author does not exist".into()));
    }
    let created = blog::create(db, &input.title, &input.content, input.image_url, input.quote, author_id).await?;
    Ok(created)
}

/// Update a post. Title and content are replaced; an absent image or quote
/// keeps the stored value.
pub async fn update_blog(
    db: &DatabaseConnection,
    id: Uuid,
    input: BlogInput,
) -> Result<blog::Model, ServiceError> {
    blog::validate_title(&input.title)?;
    if input.content.trim().is_empty() {
        return Err(ServiceError::Validation("content required".into()));
    }
    let mut am: blog::ActiveModel = blog::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("blog"))?
        .into();
    am.title = Set(input.title);
    am.content = Set(input.content);
    if let Some(url) = input.image_url {
        am.image_url = Set(Some(url));
    }
    if let Some(quote) = input.quote {
        am.quote = Set(Some(quote));
    }
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(updated)
}

/// Delete a post; its comments go with it.
pub async fn delete_blog(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let existing = blog::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    if existing.is_none() {
        return Err(ServiceError::not_found("blog"));
    }
    blog::hard_delete(db, id).await?;
    Ok(())
}
