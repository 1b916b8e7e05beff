/// API route handlers
///
/// Organized by resource:
///
/// - `health`: Health check endpoint
/// - `account`: Registration, login, confirmation, password flows, profile
/// - `lists`: To-do list CRUD and sharing
/// - `items`: To-do item CRUD, filters, toggle

pub mod account;
pub mod health;
pub mod items;
pub mod lists;
