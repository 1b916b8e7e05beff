/// Database models
///
/// Each model owns its CRUD operations as associated functions taking a
/// `PgPool`, in dependency order:
///
/// - `user`: accounts, lockout counters, profile updates
/// - `role`: FREE/PRO tiers and user-role membership
/// - `todo_list`: to-do lists with ownership
/// - `todo_item`: items within a list (operations live in `crate::repo`)
/// - `sharing`: list-sharing grants

pub mod role;
pub mod sharing;
pub mod todo_item;
pub mod todo_list;
pub mod user;
