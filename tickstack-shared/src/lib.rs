//! # TickStack Shared Library
//!
//! This crate contains the types and business logic shared by the TickStack
//! API server: database models, authentication primitives, the to-do item
//! repository, and email delivery.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `repo`: The to-do item repository contract and its Postgres implementation
//! - `auth`: Passwords, bearer tokens, one-time codes, sign-in/lockout
//! - `email`: Email sender abstraction (SMTP or tracing-backed)
//! - `quota`: Per-tier resource limits (FREE vs PRO)
//! - `db`: Connection pool and migration helpers

pub mod auth;
pub mod db;
pub mod email;
pub mod models;
pub mod quota;
pub mod repo;

/// Current version of the TickStack shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
