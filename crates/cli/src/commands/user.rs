//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! food-cli user create-admin -u admin -p 'S3cure-pass' -n "Shop Admin" --phone 0901234567
//! ```
//!
//! # Environment Variables
//!
//! - `FOOD_APP_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

use food_app_api::config::{ApiConfig, ConfigError};
use food_app_api::db::{self, RepositoryError, UserRepository};
use food_app_api::models::NewUser;
use food_app_api::services::AuthError;
use food_app_api::services::auth::{hash_password, validate_password};
use food_app_core::{ContactError, Email, PhoneNumber, Role, UserId};
use thiserror::Error;

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Invalid contact details: {0}")]
    Contact(#[from] ContactError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Username already taken.
    #[error("User already exists with username: {0}")]
    UserExists(String),
}

/// Command-line input for a new Admin account.
#[derive(Debug)]
pub struct AdminAccount<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub name: &'a str,
    pub phone: &'a str,
    pub email: Option<&'a str>,
}

impl AdminAccount<'_> {
    /// Validate the input and hash the password.
    ///
    /// # Errors
    ///
    /// Returns `UserError` for a weak password or malformed contact details.
    pub fn to_new_user(&self) -> Result<NewUser, UserError> {
        validate_password(self.password)?;

        Ok(NewUser {
            name: self.name.trim().to_owned(),
            email: self.email.map(Email::parse).transpose()?,
            phone: PhoneNumber::parse(self.phone)?,
            username: self.username.trim().to_owned(),
            password_hash: hash_password(self.password)?,
            role: Role::Admin,
            avatar_url: None,
        })
    }
}

/// Create a new Admin user.
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns `UserError::UserExists` if the username is taken, or another
/// `UserError` if validation or the insert fails.
pub async fn create_admin(account: &AdminAccount<'_>) -> Result<UserId, UserError> {
    let user = account.to_new_user()?;

    let database_url = ApiConfig::database_url_from_env()?;
    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    let users = UserRepository::new(&pool);
    if users.get_by_username(&user.username).await?.is_some() {
        return Err(UserError::UserExists(user.username));
    }

    let created = users.create(&user).await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Username: {}",
        created.id,
        created.username
    );

    Ok(created.id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn account<'a>(password: &'a str, email: Option<&'a str>) -> AdminAccount<'a> {
        AdminAccount {
            username: " admin ",
            password,
            name: "Shop Admin",
            phone: "0901234567",
            email,
        }
    }

    #[test]
    fn test_to_new_user_is_admin() {
        let user = account("S3cure-pass", None).to_new_user().unwrap();
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.username, "admin");
        assert!(user.email.is_none());
        assert_ne!(user.password_hash, "S3cure-pass");
    }

    #[test]
    fn test_to_new_user_rejects_short_password() {
        assert!(matches!(
            account("short", None).to_new_user(),
            Err(UserError::Auth(AuthError::WeakPassword(_)))
        ));
    }

    #[test]
    fn test_to_new_user_rejects_bad_email() {
        assert!(matches!(
            account("S3cure-pass", Some("not-an-email")).to_new_user(),
            Err(UserError::Contact(_))
        ));
    }
}
