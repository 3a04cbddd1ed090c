//! Create `booking` table.
//!
//! `user_id` is nullable: guest bookings carry the denormalized contact
//! columns instead of an account reference.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Booking::Table)
                    .if_not_exists()
                    .col(uuid(Booking::Id).primary_key())
                    .col(ColumnDef::new(Booking::UserId).uuid().null())
                    .col(uuid(Booking::ServiceId).not_null())
                    .col(timestamp_with_time_zone(Booking::BookingDate).not_null())
                    .col(timestamp_with_time_zone(Booking::ServiceDate).not_null())
                    .col(integer(Booking::NumberOfPeople).not_null())
                    .col(decimal_len(Booking::TotalAmount, 18, 2).not_null())
                    .col(string_len(Booking::Status, 50).not_null().default("pending"))
                    .col(ColumnDef::new(Booking::PaymentMethod).string_len(50).null())
                    .col(string_len(Booking::PaymentStatus, 50).not_null().default("unpaid"))
                    .col(ColumnDef::new(Booking::Notes).string_len(500).null())
                    .col(ColumnDef::new(Booking::FirstName).string_len(50).null())
                    .col(ColumnDef::new(Booking::LastName).string_len(50).null())
                    .col(ColumnDef::new(Booking::Email).string_len(100).null())
                    .col(ColumnDef::new(Booking::Phone).string_len(20).null())
                    .col(ColumnDef::new(Booking::Address).string_len(200).null())
                    .col(timestamp_with_time_zone(Booking::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_user")
                            .from(Booking::Table, Booking::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_service")
                            .from(Booking::Table, Booking::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Booking::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Booking {
    Table,
    Id,
    UserId,
    ServiceId,
    BookingDate,
    ServiceDate,
    NumberOfPeople,
    TotalAmount,
    Status,
    PaymentMethod,
    PaymentStatus,
    Notes,
    FirstName,
    LastName,
    Email,
    Phone,
    Address,
    CreatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }

#[derive(DeriveIden)]
enum Service { Table, Id }
