//! Booking workflows: guests and registered users book catalog services.

use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::pagination::Pagination;
use models::{booking, service, user};

/// Input for creating a booking. `user_id` is `None` for guest bookings; the
/// contact fields then carry the guest identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingInput {
    pub user_id: Option<Uuid>,
    pub service_id: Uuid,
    pub service_date: DateTime<FixedOffset>,
    pub number_of_people: i32,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Partial update applied by owners and the back office.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingUpdate {
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub payment_method: Option<String>,
    pub service_date: Option<DateTime<FixedOffset>>,
    pub number_of_people: Option<i32>,
    pub notes: Option<String>,
}

/// Create a booking. The total is computed from the service price so clients
/// cannot set their own amount.
pub async fn create_booking(
    db: &DatabaseConnection,
    input: BookingInput,
) -> Result<booking::Model, ServiceError> {
    booking::validate_headcount(input.number_of_people)?;
    let svc = service::Entity::find_by_id(input.service_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("service"))?;
    if !svc.is_active {
        return Err(ServiceError::Validation("service is not bookable".into()));
    }
    if let Some(uid) = input.user_id {
        let known = user::Entity::find_by_id(uid)
            .one(db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        if known.is_none() {
            return Err(ServiceError::Validation("user does not exist".into()));
        }
    } else if input.email.as_deref().map_or(true, |e| e.trim().is_empty()) {
        return Err(ServiceError::Validation("guest bookings need a contact email".into()));
    }

    let total = svc.price * Decimal::from(input.number_of_people);
    let now = Utc::now();
    let am = booking::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(input.user_id),
        service_id: Set(input.service_id),
        booking_date: Set(now.into()),
        service_date: Set(input.service_date),
        number_of_people: Set(input.number_of_people),
        total_amount: Set(total),
        status: Set(booking::STATUS_PENDING.to_string()),
        payment_method: Set(input.payment_method),
        payment_status: Set(booking::PAYMENT_UNPAID.to_string()),
        notes: Set(input.notes),
        first_name: Set(input.first_name),
        last_name: Set(input.last_name),
        email: Set(input.email),
        phone: Set(input.phone),
        address: Set(input.address),
        created_at: Set(now.into()),
    };
    let created = am.insert(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(created)
}

pub async fn get_booking(db: &DatabaseConnection, id: Uuid) -> Result<Option<booking::Model>, ServiceError> {
    let found = booking::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(found)
}

/// All bookings newest first, with the booked service joined in.
pub async fn list_all(
    db: &DatabaseConnection,
) -> Result<Vec<(booking::Model, Option<service::Model>)>, ServiceError> {
    let items = booking::Entity::find()
        .find_also_related(service::Entity)
        .order_by_desc(booking::Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(items)
}

/// Bookings placed by one registered user, newest first.
pub async fn list_by_user(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<Vec<(booking::Model, Option<service::Model>)>, ServiceError> {
    let items = booking::Entity::find()
        .filter(booking::Column::UserId.eq(user_id))
        .find_also_related(service::Entity)
        .order_by_desc(booking::Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(items)
}

/// Apply a partial update. Changing the headcount recomputes the total from
/// the current service price.
pub async fn update_booking(
    db: &DatabaseConnection,
    id: Uuid,
    update: BookingUpdate,
) -> Result<booking::Model, ServiceError> {
    let existing = booking::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("booking"))?;

    let mut am: booking::ActiveModel = existing.clone().into();
    if let Some(status) = update.status {
        booking::validate_status(&status)?;
        am.status = Set(status);
    }
    if let Some(ps) = update.payment_status {
        am.payment_status = Set(ps);
    }
    if let Some(pm) = update.payment_method {
        am.payment_method = Set(Some(pm));
    }
    if let Some(date) = update.service_date {
        am.service_date = Set(date);
    }
    if let Some(n) = update.number_of_people {
        booking::validate_headcount(n)?;
        let svc = service::Entity::find_by_id(existing.service_id)
            .one(db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?
            .ok_or_else(|| ServiceError::not_found("service"))?;
        am.number_of_people = Set(n);
        am.total_amount = Set(svc.price * Decimal::from(n));
    }
    if let Some(notes) = update.notes {
        am.notes = Set(Some(notes));
    }
    let updated = am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(updated)
}

pub async fn delete_booking(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let res = booking::Entity::delete_by_id(id)
        .exec(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("booking"));
    }
    Ok(())
}

/// Paged back-office listing. `search` matches the status or payment status
/// exactly, or the contact name/email columns as a substring.
pub async fn admin_search(
    db: &DatabaseConnection,
    search: Option<&str>,
    page: Pagination,
) -> Result<(u64, Vec<(booking::Model, Option<service::Model>)>), ServiceError> {
    let mut query = booking::Entity::find();
    if let Some(q) = search.map(str::trim).filter(|q| !q.is_empty()) {
        query = query.filter(
            Condition::any()
                .add(booking::Column::Status.eq(q))
                .add(booking::Column::PaymentStatus.eq(q))
                .add(booking::Column::FirstName.contains(q))
                .add(booking::Column::LastName.contains(q))
                .add(booking::Column::Email.contains(q)),
        );
    }
    let (page_idx, per_page) = page.normalize();
    let paginator = query
        .find_also_related(service::Entity)
        .order_by_desc(booking::Column::CreatedAt)
        .paginate(db, per_page);
    let total = paginator.num_items().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let items = paginator
        .fetch_page(page_idx)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok((total, items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    async fn seed_service(db: &DatabaseConnection) -> Result<(user::Model, service::Model), anyhow::Error> {
        let email = format!("bk_{}@example.com", Uuid::new_v4());
        let creator = user::create(db, "Book", "Keeper", &email, "hash", None).await?;
        let svc = service::create(
            db,
            "Airport shuttle",
            "Pickup and dropoff",
            None,
            None,
            Decimal::new(2500, 2),
            Some("Transport".into()),
            true,
            creator.id,
        )
        .await?;
        Ok((creator, svc))
    }

    fn guest_input(service_id: Uuid) -> BookingInput {
        BookingInput {
            user_id: None,
            service_id,
            service_date: Utc::now().into(),
            number_of_people: 3,
            payment_method: Some("cash".into()),
            notes: None,
            first_name: Some("Guest".into()),
            last_name: Some("Visitor".into()),
            email: Some("guest@example.com".into()),
            phone: None,
            address: None,
        }
    }

    #[tokio::test]
    async fn booking_total_is_computed_from_service_price() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let (creator, svc) = seed_service(&db).await?;

        let b = create_booking(&db, guest_input(svc.id)).await?;
        assert_eq!(b.total_amount, Decimal::new(7500, 2));
        assert_eq!(b.status, booking::STATUS_PENDING);

        // Headcount change recomputes the total
        let updated = update_booking(
            &db,
            b.id,
            BookingUpdate { number_of_people: Some(2), ..Default::default() },
        )
        .await?;
        assert_eq!(updated.total_amount, Decimal::new(5000, 2));

        delete_booking(&db, b.id).await?;
        service::hard_delete(&db, svc.id).await?;
        user::hard_delete(&db, creator.id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn guest_booking_requires_contact_email() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let (creator, svc) = seed_service(&db).await?;

        let mut input = guest_input(svc.id);
        input.email = None;
        assert!(matches!(create_booking(&db, input).await, Err(ServiceError::Validation(_))));

        service::hard_delete(&db, svc.id).await?;
        user::hard_delete(&db, creator.id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn admin_search_matches_guest_contact() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let (creator, svc) = seed_service(&db).await?;

        let marker = format!("needle_{}", Uuid::new_v4().simple());
        let mut input = guest_input(svc.id);
        input.email = Some(format!("{}@example.com", marker));
        let b = create_booking(&db, input).await?;

        let (total, items) = admin_search(&db, Some(&marker), Pagination::default()).await?;
        assert_eq!(total, 1);
        assert_eq!(items[0].0.id, b.id);
        assert_eq!(items[0].1.as_ref().map(|s| s.id), Some(svc.id));

        let (none_total, _) = admin_search(&db, Some("no-such-booking-xyz"), Pagination::default()).await?;
        assert_eq!(none_total, 0);

        delete_booking(&db, b.id).await?;
        service::hard_delete(&db, svc.id).await?;
        user::hard_delete(&db, creator.id).await?;
        Ok(())
    }
}
