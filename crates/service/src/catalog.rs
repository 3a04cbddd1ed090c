//! Hotel service catalog: CRUD over the `service` entity.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ServiceError;
use models::{service, user};

/// Input for creating or replacing a catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInput {
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub icon: Option<String>,
    pub price: Decimal,
    pub category: Option<String>,
    pub is_active: bool,
}

/// Active services for the public listing, ordered by name.
pub async fn list_active(db: &DatabaseConnection) -> Result<Vec<service::Model>, ServiceError> {
    let items = service::Entity::find()
        .filter(service::Column::IsActive.eq(true))
        .order_by_asc(service::Column::Name)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(items)
}

/// All services (including inactive), newest first. Back-office view.
pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<service::Model>, ServiceError> {
    let items = service::Entity::find()
        .order_by_desc(service::Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(items)
}

pub async fn get_service(db: &DatabaseConnection, id: Uuid) -> Result<Option<service::Model>, ServiceError> {
    let found = service::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(found)
}

/// Create a catalog entry owned by `created_by`.
pub async fn create_service(
    db: &DatabaseConnection,
    input: ServiceInput,
    created_by: Uuid,
) -> Result<service::Model, ServiceError> {
    let creator = user::Entity::find_by_id(created_by)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    if creator.is_none() {
        return Err(ServiceError::Validation("creator does not exist".into()));
    }
    let created = service::create(
        db,
        &input.name,
        &input.description,
        input.image_url,
        input.icon,
        input.price,
        input.category,
        input.is_active,
        created_by,
    )
    .await?;
    Ok(created)
}

/// Replace all editable fields of a catalog entry.
pub async fn update_service(
    db: &DatabaseConnection,
    id: Uuid,
    input: ServiceInput,
) -> Result<service::Model, ServiceError> {
    service::validate_name(&input.name)?;
    service::validate_price(input.price)?;
    if input.description.trim().is_empty() {
        return Err(ServiceError::Validation("description required".into()));
    }
    let mut am: service::ActiveModel = service::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("service"))?
        .into();
    am.name = Set(input.name);
    am.description = Set(input.description);
    am.image_url = Set(input.image_url);
    am.icon = Set(input.icon);
    am.price = Set(input.price);
    am.category = Set(input.category);
    am.is_active = Set(input.is_active);
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(updated)
}

/// Delete a catalog entry; its bookings go with it.
pub async fn delete_service(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let existing = get_service(db, id).await?;
    if existing.is_none() {
        return Err(ServiceError::not_found("service"));
    }
    service::hard_delete(db, id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    fn sample_input(name: &str) -> ServiceInput {
        ServiceInput {
            name: name.into(),
            description: "A test service".into(),
            image_url: None,
            icon: Some("ri-hotel-line".into()),
            price: Decimal::new(9900, 2),
            category: Some("Rooms".into()),
            is_active: true,
        }
    }

    #[tokio::test]
    async fn catalog_crud() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let email = format!("catalog_{}@example.com", Uuid::new_v4());
        let creator = user::create(&db, "Cat", "Alog", &email, "hash", None).await?;

        let created = create_service(&db, sample_input("Breakfast"), creator.id).await?;
        assert!(created.is_active);

        let mut input = sample_input("Breakfast deluxe");
        input.is_active = false;
        let updated = update_service(&db, created.id, input).await?;
        assert_eq!(updated.name, "Breakfast deluxe");
        assert!(!updated.is_active);

        // Inactive entries disappear from the public listing
        let active = list_active(&db).await?;
        assert!(!active.iter().any(|s| s.id == created.id));
        let all = list_all(&db).await?;
        assert!(all.iter().any(|s| s.id == created.id));

        delete_service(&db, created.id).await?;
        assert!(get_service(&db, created.id).await?.is_none());
        assert!(matches!(
            delete_service(&db, created.id).await,
            Err(ServiceError::NotFound(_))
        ));

        user::hard_delete(&db, creator.id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn create_requires_existing_creator() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let res = create_service(&db, sample_input("Orphan"), Uuid::new_v4()).await;
        assert!(matches!(res, Err(ServiceError::Validation(_))));
        Ok(())
    }
}
