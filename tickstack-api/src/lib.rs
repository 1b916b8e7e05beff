//! # TickStack API Server Library
//!
//! Core functionality for the TickStack API server: a JSON backend for
//! accounts (registration, login, email confirmation, password reset,
//! profiles) and to-do lists/items with sharing and FREE/PRO tiers.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
