//! Comments on blog posts, from registered users and guests.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ServiceError;
use models::{blog, comment, user};

/// Input for posting a comment. `user_id` is `None` for guests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentInput {
    pub content: String,
    pub blog_id: Uuid,
    pub user_id: Option<Uuid>,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
}

/// A comment joined with its author (if registered) and whether the viewer
/// may delete it.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub comment: comment::Model,
    pub author: Option<user::Model>,
    pub can_delete: bool,
}

/// Deletion is allowed for the comment's owner, the blog's author, and admins.
/// Guests can post but never delete.
fn can_delete(c: &comment::Model, blog_author_id: Uuid, viewer: Option<&user::Model>) -> bool {
    match viewer {
        Some(v) => v.is_admin() || c.user_id == Some(v.id) || v.id == blog_author_id,
        None => false,
    }
}

async fn require_blog(db: &DatabaseConnection, blog_id: Uuid) -> Result<blog::Model, ServiceError> {
    blog::Entity::find_by_id(blog_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("blog"))
}

/// Comments on one post, oldest first, each joined with its author.
pub async fn list_for_blog(
    db: &DatabaseConnection,
    blog_id: Uuid,
) -> Result<Vec<(comment::Model, Option<user::Model>)>, ServiceError> {
    require_blog(db, blog_id).await?;
    let items = comment::Entity::find()
        .filter(comment::Column::BlogId.eq(blog_id))
        .find_also_related(user::Entity)
        .order_by_asc(comment::Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(items)
}

/// Same listing, annotated with the viewer's delete permission per comment.
pub async fn list_with_permissions(
    db: &DatabaseConnection,
    blog_id: Uuid,
    viewer_id: Option<Uuid>,
) -> Result<Vec<CommentView>, ServiceError> {
    let blog = require_blog(db, blog_id).await?;
    let viewer = match viewer_id {
        Some(id) => user::Entity::find_by_id(id)
            .one(db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?,
        None => None,
    };
    let items = comment::Entity::find()
        .filter(comment::Column::BlogId.eq(blog_id))
        .find_also_related(user::Entity)
        .order_by_asc(comment::Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    let views = items
        .into_iter()
        .map(|(c, author)| {
            let allowed = can_delete(&c, blog.author_id, viewer.as_ref());
            CommentView { comment: c, author, can_delete: allowed }
        })
        .collect();
    Ok(views)
}

pub async fn create_comment(
    db: &DatabaseConnection,
    input: CommentInput,
) -> Result<comment::Model, ServiceError> {
    comment::validate_content(&input.content)?;
    require_blog(db, input.blog_id).await?;
    if let Some(uid) = input.user_id {
        let known = user::Entity::find_by_id(uid)
            .one(db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        if known.is_none() {
            return Err(ServiceError::Validation("user does not exist".into()));
        }
    }
    let now = Utc::now();
    let am = comment::ActiveModel {
        id: Set(Uuid::new_v4()),
        content: Set(input.content),
        blog_id: Set(input.blog_id),
        user_id: Set(input.user_id),
        guest_name: Set(input.guest_name),
        guest_email: Set(input.guest_email),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };
    let created = am.insert(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(created)
}

/// Delete a comment on behalf of `requester_id`. Anonymous requests and
/// unrelated users are rejected.
pub async fn delete_comment(
    db: &DatabaseConnection,
    id: Uuid,
    requester_id: Option<Uuid>,
) -> Result<(), ServiceError> {
    let (c, parent_blog) = comment::Entity::find_by_id(id)
        .find_also_related(blog::Entity)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("comment"))?;
    let parent_blog = parent_blog.ok_or_else(|| ServiceError::not_found("blog"))?;

    let requester = match requester_id {
        Some(rid) => user::Entity::find_by_id(rid)
            .one(db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?,
        None => None,
    };
    if !can_delete(&c, parent_blog.author_id, requester.as_ref()) {
        return Err(ServiceError::Forbidden("not allowed to delete this comment".into()));
    }

    comment::Entity::delete_by_id(id)
        .exec(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mk_user(id: Uuid, role: &str) -> user::Model {
        user::Model {
            id,
            first_name: "U".into(),
            last_name: "Ser".into(),
            email: format!("{}@example.com", id.simple()),
            password_hash: "hash".into(),
            phone: None,
            role: role.into(),
            created_at: Utc::now().into(),
        }
    }

    fn mk_comment(owner: Option<Uuid>) -> comment::Model {
        let now = Utc::now();
        comment::Model {
            id: Uuid::new_v4(),
            content: "hi".into(),
            blog_id: Uuid::new_v4(),
            user_id: owner,
            guest_name: None,
            guest_email: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn owner_blog_author_and_admin_can_delete() {
        let owner = Uuid::new_v4();
        let blog_author = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let c = mk_comment(Some(owner));

        assert!(can_delete(&c, blog_author, Some(&mk_user(owner, user::ROLE_USER))));
        assert!(can_delete(&c, blog_author, Some(&mk_user(blog_author, user::ROLE_USER))));
        assert!(can_delete(&c, blog_author, Some(&mk_user(stranger, user::ROLE_ADMIN))));
        assert!(!can_delete(&c, blog_author, Some(&mk_user(stranger, user::ROLE_USER))));
    }

    #[test]
    fn anonymous_viewer_cannot_delete() {
        let c = mk_comment(None);
        assert!(!can_delete(&c, Uuid::new_v4(), None));
    }

    mod db_tests {
        use super::*;
        use crate::test_support::get_db;

        #[tokio::test]
        async fn guest_comment_lifecycle() -> Result<(), anyhow::Error> {
            if std::env::var("SKIP_DB_TESTS").is_ok() {
                return Ok(());
            }
            let db = get_db().await?;
            let email = format!("cmt_{}@example.com", Uuid::new_v4());
            let author = user::create(&db, "Post", "Author", &email, "hash", None).await?;
            let b = models::blog::create(&db, "Commented post", "body", None, None, author.id).await?;

            let c = create_comment(
                &db,
                CommentInput {
                    content: "Great read".into(),
                    blog_id: b.id,
                    user_id: None,
                    guest_name: Some("Anon".into()),
                    guest_email: None,
                },
            )
            .await?;

            let listed = list_for_blog(&db, b.id).await?;
            assert!(listed.iter().any(|(m, _)| m.id == c.id));

            // Anonymous delete is rejected, blog author may delete
            assert!(matches!(
                delete_comment(&db, c.id, None).await,
                Err(ServiceError::Forbidden(_))
            ));
            delete_comment(&db, c.id, Some(author.id)).await?;

            models::blog::hard_delete(&db, b.id).await?;
            user::hard_delete(&db, author.id).await?;
            Ok(())
        }

        #[tokio::test]
        async fn permissions_listing_flags_own_comment() -> Result<(), anyhow::Error> {
            if std::env::var("SKIP_DB_TESTS").is_ok() {
                return Ok(());
            }
            let db = get_db().await?;
            let author = user::create(
                &db,
                "Perm",
                "Author",
                &format!("perm_{}@example.com", Uuid::new_v4()),
                "hash",
                None,
            )
            .await?;
            let commenter = user::create(
                &db,
                "Perm",
                "Commenter",
                &format!("perm_{}@example.com", Uuid::new_v4()),
                "hash",
                None,
            )
            .await?;
            let b = models::blog::create(&db, "Perms", "body", None, None, author.id).await?;
            let c = create_comment(
                &db,
                CommentInput {
                    content: "mine".into(),
                    blog_id: b.id,
                    user_id: Some(commenter.id),
                    guest_name: None,
                    guest_email: None,
                },
            )
            .await?;

            let views = list_with_permissions(&db, b.id, Some(commenter.id)).await?;
            let view = views.iter().find(|v| v.comment.id == c.id).unwrap();
            assert!(view.can_delete);
            assert_eq!(view.author.as_ref().map(|u| u.id), Some(commenter.id));

            let anon = list_with_permissions(&db, b.id, None).await?;
            assert!(anon.iter().all(|v| !v.can_delete));

            models::blog::hard_delete(&db, b.id).await?;
            user::hard_delete(&db, commenter.id).await?;
            user::hard_delete(&db, author.id).await?;
            Ok(())
        }
    }
}
