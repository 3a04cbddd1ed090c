pub mod errors;
pub mod db;
pub mod user;
pub mod service;
pub mod blog;
pub mod booking;
pub mod comment;
pub mod contact_message;
