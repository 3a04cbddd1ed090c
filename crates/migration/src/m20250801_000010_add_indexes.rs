//! Secondary indexes for the hot list queries: admin tables sort by
//! `created_at`, comment threads fetch by blog, bookings by user.
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_user_id")
                    .table(Booking::Table)
                    .col(Booking::UserId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_created_at")
                    .table(Booking::Table)
                    .col(Booking::CreatedAt)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_comment_blog_id")
                    .table(Comment::Table)
                    .col(Comment::BlogId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_blog_author_id")
                    .table(Blog::Table)
                    .col(Blog::AuthorId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_service_is_active")
                    .table(Service::Table)
                    .col(Service::IsActive)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_contact_message_created_at")
                    .table(ContactMessage::Table)
                    .col(ContactMessage::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_index(Index::drop().name("idx_booking_user_id").table(Booking::Table).to_owned()).await?;
        manager.drop_index(Index::drop().name("idx_booking_created_at").table(Booking::Table).to_owned()).await?;
        manager.drop_index(Index::drop().name("idx_comment_blog_id").table(Comment::Table).to_owned()).await?;
        manager.drop_index(Index::drop().name("idx_blog_author_id").table(Blog::Table).to_owned()).await?;
        manager.drop_index(Index::drop().name("idx_service_is_active").table(Service::Table).to_owned()).await?;
        manager.drop_index(Index::drop().name("idx_contact_message_created_at").table(ContactMessage::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Booking { Table, UserId, CreatedAt }

#[derive(DeriveIden)]
enum Comment { Table, BlogId }

#[derive(DeriveIden)]
enum Blog { Table, AuthorId }

#[derive(DeriveIden)]
enum Service { Table, IsActive }

#[derive(DeriveIden)]
enum ContactMessage { Table, CreatedAt }
