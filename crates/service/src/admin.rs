//! Back-office operations: dashboard stats and user management.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::ServiceError;
use models::{blog, booking, comment, contact_message, service, user};

const RECENT_LIMIT: u64 = 5;

/// Aggregate counts plus the most recent activity for the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_services: u64,
    pub active_services: u64,
    pub total_bookings: u64,
    pub pending_bookings: u64,
    pub total_blogs: u64,
    pub total_comments: u64,
    pub total_contact_messages: u64,
    pub recent_users: Vec<user::Model>,
    pub recent_services: Vec<service::Model>,
    pub recent_bookings: Vec<booking::Model>,
}

/// A user together with how much content they have produced.
#[derive(Debug, Clone, Serialize)]
pub struct UserOverview {
    pub user: user::Model,
    pub blogs: u64,
    pub comments: u64,
    pub bookings: u64,
}

fn db_err(e: sea_orm::DbErr) -> ServiceError {
    ServiceError::Db(e.to_string())
}

pub async fn dashboard(db: &DatabaseConnection) -> Result<DashboardStats, ServiceError> {
    let total_users = user::Entity::find().count(db).await.map_err(db_err)?;
    let total_services = service::Entity::find().count(db).await.map_err(db_err)?;
    let active_services = service::Entity::find()
        .filter(service::Column::IsActive.eq(true))
        .count(db)
        .await
        .map_err(db_err)?;
    let total_bookings = booking::Entity::find().count(db).await.map_err(db_err)?;
    let pending_bookings = booking::Entity::find()
        .filter(booking::Column::Status.eq(booking::STATUS_PENDING))
        .count(db)
        .await
        .map_err(db_err)?;
    let total_blogs = blog::Entity::find().count(db).await.map_err(db_err)?;
    let total_comments = comment::Entity::find().count(db).await.map_err(db_err)?;
    let total_contact_messages = contact_message::Entity::find().count(db).await.map_err(db_err)?;

    let recent_users = user::Entity::find()
        .order_by_desc(user::Column::CreatedAt)
        .limit(RECENT_LIMIT)
        .all(db)
        .await
        .map_err(db_err)?;
    let recent_services = service::Entity::find()
        .order_by_desc(service::Column::CreatedAt)
        .limit(RECENT_LIMIT)
        .all(db)
        .await
        .map_err(db_err)?;
    let recent_bookings = booking::Entity::find()
        .order_by_desc(booking::Column::CreatedAt)
        .limit(RECENT_LIMIT)
        .all(db)
        .await
        .map_err(db_err)?;

    Ok(DashboardStats {
        total_users,
        total_services,
        active_services,
        total_bookings,
        pending_bookings,
        total_blogs,
        total_comments,
        total_contact_messages,
        recent_users,
        recent_services,
        recent_bookings,
    })
}

/// All users newest first, each with blog/comment/booking counts.
pub async fn list_users_with_counts(db: &DatabaseConnection) -> Result<Vec<UserOverview>, ServiceError> {
    let users = user::Entity::find()
        .order_by_desc(user::Column::CreatedAt)
        .all(db)
        .await
        .map_err(db_err)?;
    let mut out = Vec::with_capacity(users.len());
    for u in users {
        let blogs = blog::Entity::find()
            .filter(blog::Column::AuthorId.eq(u.id))
            .count(db)
            .await
            .map_err(db_err)?;
        let comments = comment::Entity::find()
            .filter(comment::Column::UserId.eq(u.id))
            .count(db)
            .await
            .map_err(db_err)?;
        let bookings = booking::Entity::find()
            .filter(booking::Column::UserId.eq(u.id))
            .count(db)
            .await
            .map_err(db_err)?;
        out.push(UserOverview { user: u, blogs, comments, bookings });
    }
    Ok(out)
}

/// Change a user's role between "user" and "admin".
pub async fn update_user_role(
    db: &DatabaseConnection,
    id: Uuid,
    role: &str,
) -> Result<user::Model, ServiceError> {
    user::validate_role(role)?;
    let existing = user::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_err)?
        .ok_or_else(|| ServiceError::not_found("user"))?;

    // Demoting the last admin would lock everyone out of the back office
    if existing.is_admin() && role != user::ROLE_ADMIN {
        let admins = count_admins(db).await?;
        if admins <= 1 {
            return Err(ServiceError::Validation("cannot demote the last admin".into()));
        }
    }

    let mut am: user::ActiveModel = existing.into();
    am.role = Set(role.to_string());
    let updated = am.update(db).await.map_err(db_err)?;
    info!(user_id = %updated.id, role = %updated.role, "user_role_updated");
    Ok(updated)
}

/// Delete a user account. Authored blogs are removed first (comments cascade
/// with them); bookings and comments by the user are kept with the user
/// reference cleared. The last admin and catalog owners cannot be deleted.
pub async fn delete_user(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let existing = user::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_err)?
        .ok_or_else(|| ServiceError::not_found("user"))?;

    if existing.is_admin() {
        let admins = count_admins(db).await?;
        if admins <= 1 {
            return Err(ServiceError::Validation("cannot delete the last admin".into()));
        }
    }

    let owned_services = service::Entity::find()
        .filter(service::Column::CreatedBy.eq(id))
        .count(db)
        .await
        .map_err(db_err)?;
    if owned_services > 0 {
        return Err(ServiceError::Validation(
            "user still owns catalog services; delete or reassign them first".into(),
        ));
    }

    blog::Entity::delete_many()
        .filter(blog::Column::AuthorId.eq(id))
        .exec(db)
        .await
        .map_err(db_err)?;
    user::hard_delete(db, id).await?;
    info!(user_id = %id, "user_deleted");
    Ok(())
}

async fn count_admins(db: &DatabaseConnection) -> Result<u64, ServiceError> {
    user::Entity::find()
        .filter(user::Column::Role.eq(user::ROLE_ADMIN))
        .count(db)
        .await
        .map_err(db_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    async fn mk_admin(db: &DatabaseConnection) -> Result<user::Model, anyhow::Error> {
        let email = format!("adm_{}@example.com", Uuid::new_v4());
        let u = user::create(db, "Ad", "Min", &email, "hash", None).await?;
        let promoted = update_user_role(db, u.id, user::ROLE_ADMIN).await?;
        Ok(promoted)
    }

    #[tokio::test]
    async fn role_update_and_last_admin_guard() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;

        let a1 = mk_admin(&db).await?;
        let a2 = mk_admin(&db).await?;
        assert!(a1.is_admin() && a2.is_admin());

        // Two admins exist, demoting one is fine
        let demoted = update_user_role(&db, a2.id, user::ROLE_USER).await?;
        assert!(!demoted.is_admin());

        assert!(matches!(
            update_user_role(&db, a1.id, "superadmin").await,
            Err(ServiceError::Model(_))
        ));

        user::hard_delete(&db, a1.id).await?;
        user::hard_delete(&db, a2.id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn delete_user_removes_their_blogs() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let email = format!("del_{}@example.com", Uuid::new_v4());
        let u = user::create(&db, "To", "Delete", &email, "hash", None).await?;
        let b = blog::create(&db, "Orphan-to-be", "body", None, None, u.id).await?;

        delete_user(&db, u.id).await?;
        assert!(user::Entity::find_by_id(u.id).one(&db).await?.is_none());
        assert!(blog::Entity::find_by_id(b.id).one(&db).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn dashboard_recent_lists_are_capped() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let stats = dashboard(&db).await?;
        assert!(stats.recent_users.len() <= RECENT_LIMIT as usize);
        assert!(stats.recent_services.len() <= RECENT_LIMIT as usize);
        assert!(stats.recent_bookings.len() <= RECENT_LIMIT as usize);
        assert!(stats.active_services <= stats.total_services);
        Ok(())
    }
}
