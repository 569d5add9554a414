//! Business logic services.

pub mod auth;

pub use auth::{AuthError, AuthService, Claims, IssuedToken, TokenError, TokenIssuer};
