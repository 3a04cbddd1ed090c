//! Contact form messages and their back-office listing.

use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::pagination::Pagination;
use models::contact_message;

/// Store a message submitted through the public contact form.
pub async fn submit(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    message: &str,
) -> Result<contact_message::Model, ServiceError> {
    let created = contact_message::create(db, name, email, message).await?;
    Ok(created)
}

/// Paged back-office listing, newest first. `search` matches sender name,
/// email, or message body as a substring.
pub async fn admin_search(
    db: &DatabaseConnection,
    search: Option<&str>,
    page: Pagination,
) -> Result<(u64, Vec<contact_message::Model>), ServiceError> {
    let mut query = contact_message::Entity::find();
    if let Some(q) = search.map(str::trim).filter(|q| !q.is_empty()) {
        query = query.filter(
            Condition::any()
                .add(contact_message::Column::Name.contains(q))
                .add(contact_message::Column::Email.contains(q))
                .add(contact_message::Column::Message.contains(q)),
        );
    }
    let (page_idx, per_page) = page.normalize();
    let paginator = query
        .order_by_desc(contact_message::Column::CreatedAt)
        .paginate(db, per_page);
    let total = paginator.num_items().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let items = paginator
        .fetch_page(page_idx)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok((total, items))
}

pub async fn delete_message(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let res = contact_message::Entity::delete_by_id(id)
        .exec(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("contact message"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[tokio::test]
    async fn submit_search_delete() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;

        let marker = format!("ctc_{}", Uuid::new_v4().simple());
        let m = submit(&db, &marker, "sender@example.com", "Do you allow pets?").await?;

        let (total, items) = admin_search(&db, Some(&marker), Pagination::default()).await?;
        assert_eq!(total, 1);
        assert_eq!(items[0].id, m.id);

        delete_message(&db, m.id).await?;
        assert!(matches!(
            delete_message(&db, m.id).await,
            Err(ServiceError::NotFound(_))
        ));
        Ok(())
    }
}
