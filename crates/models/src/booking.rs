use sea_orm::entity::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::{service, user};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_CONFIRMED: &str = "confirmed";
pub const STATUS_CANCELLED: &str = "cancelled";
pub const STATUS_COMPLETED: &str = "completed";

pub const PAYMENT_UNPAID: &str = "unpaid";
pub const PAYMENT_PAID: &str = "paid";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "booking")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// NULL for guest bookings; contact columns carry the guest identity.
    pub user_id: Option<Uuid>,
    pub service_id: Uuid,
    pub booking_date: DateTimeWithTimeZone,
    pub service_date: DateTimeWithTimeZone,
    pub number_of_people: i32,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub total_amount: Decimal,
    pub status: String,
    pub payment_method: Option<String>,
    pub payment_status: String,
    pub notes: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
    Service,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
            Relation::Service => Entity::belongs_to(service::Entity)
                .from(Column::ServiceId)
                .to(service::Column::Id)
                .into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_headcount(number_of_people: i32) -> Result<(), ModelError> {
    if number_of_people < 1 {
        return Err(ModelError::Validation("number_of_people must be >= 1".into()));
    }
    Ok(())
}

pub fn validate_status(status: &str) -> Result<(), ModelError> {
    match status {
        STATUS_PENDING | STATUS_CONFIRMED | STATUS_CANCELLED | STATUS_COMPLETED => Ok(()),
        other => Err(ModelError::Validation(format!("unknown booking status: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headcount_must_be_positive() {
        assert!(validate_headcount(0).is_err());
        assert!(validate_headcount(1).is_ok());
    }

    #[test]
    fn status_whitelist() {
        assert!(validate_status("pending").is_ok());
        assert!(validate_status("confirmed").is_ok());
        assert!(validate_status("lost").is_err());
    }
}
