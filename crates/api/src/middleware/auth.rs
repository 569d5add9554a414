//! Authentication extractors.
//!
//! Handlers declare their access rule by taking one of these extractors:
//! [`RequireAuth`] for any signed-in user, [`RequireAdmin`] for the Admin
//! role, [`OptionalAuth`] where a token only changes behavior.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};

use food_app_core::{Role, UserId};

use crate::error::set_sentry_user;
use crate::services::{Claims, TokenError};
use crate::state::AppState;

/// The user a valid bearer token was issued to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    pub username: String,
    pub role: Role,
}

impl AuthUser {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Admins may act on any user; everyone else only on themselves.
    #[must_use]
    pub fn can_act_for(&self, user_id: UserId) -> bool {
        self.is_admin() || self.id == user_id
    }
}

impl TryFrom<Claims> for AuthUser {
    type Error = TokenError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            id: claims.user_id()?,
            username: claims.name,
            role: claims.role,
        })
    }
}

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireAuth(user): RequireAuth) -> String {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub AuthUser);

/// Extractor that requires a valid bearer token for an Admin.
pub struct RequireAdmin(pub AuthUser);

/// Extractor that reads a bearer token if one is present and valid.
///
/// Never rejects: a missing or invalid token yields `None`.
pub struct OptionalAuth(pub Option<AuthUser>);

/// Error returned when a request is not allowed through.
#[derive(Debug)]
pub enum AuthRejection {
    /// No `Authorization: Bearer` header.
    MissingToken,
    /// The token failed verification.
    InvalidToken(TokenError),
    /// Valid token, insufficient role.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::MissingToken => (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Bearer")],
                "Missing bearer token",
            )
                .into_response(),
            Self::InvalidToken(err) => {
                tracing::debug!(error = %err, "Rejected bearer token");
                (
                    StatusCode::UNAUTHORIZED,
                    [(header::WWW_AUTHENTICATE, "Bearer error=\"invalid_token\"")],
                    "Invalid or expired token",
                )
                    .into_response()
            }
            Self::Forbidden => (StatusCode::FORBIDDEN, "Forbidden").into_response(),
        }
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
#[must_use]
pub fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

fn authenticate(parts: &Parts, state: &AppState) -> Result<AuthUser, AuthRejection> {
    let token = bearer_token(parts).ok_or(AuthRejection::MissingToken)?;
    let user = state
        .tokens()
        .verify(token)
        .and_then(AuthUser::try_from)
        .map_err(AuthRejection::InvalidToken)?;

    set_sentry_user(&user.id, Some(&user.username));
    Ok(user)
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).map(Self)
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state)?;
        if !user.is_admin() {
            tracing::info!(user_id = %user.id, path = %parts.uri.path(), "Admin role required");
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(user))
    }
}

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(authenticate(parts, state).ok()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts_with(auth: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/orders");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&parts_with(Some("Bearer abc.def.ghi"))), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&parts_with(Some("bearer  xyz"))), Some("xyz"));
        assert_eq!(bearer_token(&parts_with(Some("Basic dXNlcjpwYXNz"))), None);
        assert_eq!(bearer_token(&parts_with(Some("Bearer "))), None);
        assert_eq!(bearer_token(&parts_with(None)), None);
    }

    #[test]
    fn test_can_act_for() {
        let user = AuthUser {
            id: UserId::new(4),
            username: "minh".to_string(),
            role: Role::User,
        };
        assert!(user.can_act_for(UserId::new(4)));
        assert!(!user.can_act_for(UserId::new(5)));

        let admin = AuthUser {
            role: Role::Admin,
            ..user
        };
        assert!(admin.can_act_for(UserId::new(5)));
    }

    #[test]
    fn test_rejection_statuses() {
        assert_eq!(
            AuthRejection::MissingToken.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthRejection::InvalidToken(TokenError::Expired)
                .into_response()
                .status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthRejection::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
    }
}
