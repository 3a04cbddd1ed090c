//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20250801_000001_create_user;
mod m20250801_000002_create_service;
mod m20250801_000003_create_blog;
mod m20250801_000004_create_booking;
mod m20250801_000005_create_comment;
mod m20250801_000006_create_contact_message;
mod m20250801_000010_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250801_000001_create_user::Migration),
            Box::new(m20250801_000002_create_service::Migration),
            Box::new(m20250801_000003_create_blog::Migration),
            Box::new(m20250801_000004_create_booking::Migration),
            Box::new(m20250801_000005_create_comment::Migration),
            Box::new(m20250801_000006_create_contact_message::Migration),
            // Indexes should always be applied last
            Box::new(m20250801_000010_add_indexes::Migration),
        ]
    }
}
