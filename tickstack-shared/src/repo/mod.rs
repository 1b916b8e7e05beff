/// Storage-access seams
///
/// - [`todo_items`]: the to-do item repository contract and its Postgres
///   implementation

pub mod todo_items;

pub use todo_items::{PgTodoItemRepo, TodoItemRepo};
