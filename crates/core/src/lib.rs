//! Food App Core - Shared types library.
//!
//! This crate provides the value types used by every part of the backend:
//! - `api` - The REST server (axum + `PostgreSQL`)
//! - `cli` - Command-line tools for migrations, seeding and user management
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP clients. Database encoding is opt-in through the
//! `postgres` feature so the types stay usable anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, contact details and roles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
