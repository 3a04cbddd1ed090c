//! Service layer providing business-oriented operations on top of models.
//! - Separates business logic from data access.
//! - Reuses validation and entity definitions in the `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod pagination;
pub mod auth;
pub mod users;
pub mod catalog;
pub mod bookings;
pub mod blogs;
pub mod comments;
pub mod contact;
pub mod admin;
pub mod excel;
pub mod runtime;
#[cfg(test)]
pub mod test_support;
