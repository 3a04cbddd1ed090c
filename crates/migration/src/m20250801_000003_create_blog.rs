//! Create `blog` table with FK to `user` (author).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Blog::Table)
                    .if_not_exists()
                    .col(uuid(Blog::Id).primary_key())
                    .col(string_len(Blog::Title, 200).not_null())
                    .col(text(Blog::Content).not_null())
                    .col(ColumnDef::new(Blog::ImageUrl).string_len(500).null())
                    .col(ColumnDef::new(Blog::Quote).string_len(500).null())
                    .col(uuid(Blog::AuthorId).not_null())
                    .col(timestamp_with_time_zone(Blog::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Blog::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_blog_author")
                            .from(Blog::Table, Blog::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Blog::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Blog { Table, Id, Title, Content, ImageUrl, Quote, AuthorId, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }
