//! Create `service` table with FK to `user` (creator).
//!
//! Catalog of bookable amenities; inactive rows are hidden from the public
//! listing but kept for the back-office.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Service::Table)
                    .if_not_exists()
                    .col(uuid(Service::Id).primary_key())
                    .col(string_len(Service::Name, 200).not_null())
                    .col(text(Service::Description).not_null())
                    .col(ColumnDef::new(Service::ImageUrl).string_len(500).null())
                    .col(ColumnDef::new(Service::Icon).string_len(100).null())
                    .col(decimal_len(Service::Price, 18, 2).not_null())
                    .col(ColumnDef::new(Service::Category).string_len(50).null())
                    .col(boolean(Service::IsActive).not_null().default(true))
                    .col(uuid(Service::CreatedBy).not_null())
                    .col(timestamp_with_time_zone(Service::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Service::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_created_by")
                            .from(Service::Table, Service::CreatedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Service::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Service { Table, Id, Name, Description, ImageUrl, Icon, Price, Category, IsActive, CreatedBy, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }
