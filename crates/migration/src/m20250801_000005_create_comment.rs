//! Create `comment` table.
//!
//! A comment with NULL `user_id` is a guest comment; the guest columns hold
//! whatever the visitor typed.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Comment::Table)
                    .if_not_exists()
                    .col(uuid(Comment::Id).primary_key())
                    .col(string_len(Comment::Content, 1000).not_null())
                    .col(uuid(Comment::BlogId).not_null())
                    .col(ColumnDef::new(Comment::UserId).uuid().null())
                    .col(ColumnDef::new(Comment::GuestName).string_len(100).null())
                    .col(ColumnDef::new(Comment::GuestEmail).string_len(100).null())
                    .col(timestamp_with_time_zone(Comment::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Comment::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_blog")
                            .from(Comment::Table, Comment::BlogId)
                            .to(Blog::Table, Blog::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_user")
                            .from(Comment::Table, Comment::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Comment::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Comment { Table, Id, Content, BlogId, UserId, GuestName, GuestEmail, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Blog { Table, Id }

#[derive(DeriveIden)]
enum User { Table, Id }
