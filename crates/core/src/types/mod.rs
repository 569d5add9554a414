//! Core types for the food ordering domain.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod contact;
pub mod id;
pub mod price;
pub mod role;

pub use contact::{ContactError, Email, PhoneNumber};
pub use id::*;
pub use price::{Price, PriceError};
pub use role::{Role, RoleParseError};
