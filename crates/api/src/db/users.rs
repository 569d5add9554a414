//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use food_app_core::{Email, PhoneNumber, Role, UserId};

use super::{RepositoryError, SearchKeyword, map_write_error, soft_delete};
use crate::models::user::{NewUser, User, UserChanges};

const USER_COLUMNS: &str =
    "id, name, email, phone, avatar_url, username, role, hidden, registered_at, updated_at";

/// Internal row type for `PostgreSQL` user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    name: String,
    email: Option<String>,
    phone: String,
    avatar_url: Option<String>,
    username: String,
    role: i32,
    hidden: bool,
    registered_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = row
            .email
            .as_deref()
            .map(Email::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
            })?;
        let phone = PhoneNumber::parse(&row.phone).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid phone in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            email,
            phone,
            avatar_url: row.avatar_url,
            username: row.username,
            role: Role::from_code(row.role),
            hidden: row.hidden,
            registered_at: row.registered_at,
            updated_at: row.updated_at,
        })
    }
}

/// User row together with its password hash, for login.
#[derive(Debug, sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all visible users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored contact details are invalid.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM food.app_user WHERE hidden = FALSE ORDER BY id");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a visible user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM food.app_user WHERE id = $1 AND hidden = FALSE");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a visible user by exact username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM food.app_user WHERE username = $1 AND hidden = FALSE"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a visible user and their password hash by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get_credentials(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let sql = format!(
            "SELECT {USER_COLUMNS}, password_hash FROM food.app_user \
             WHERE username = $1 AND hidden = FALSE"
        );
        let row = sqlx::query_as::<_, CredentialRow>(&sql)
            .bind(username)
            .fetch_optional(self.pool)
            .await?;

        match row {
            Some(r) => Ok(Some((User::try_from(r.user)?, r.password_hash))),
            None => Ok(None),
        }
    }

    /// Search by name, email or phone substring, or exact id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, keyword: &SearchKeyword) -> Result<Vec<User>, RepositoryError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM food.app_user \
             WHERE hidden = FALSE \
               AND (name ILIKE $1 OR email ILIKE $1 OR phone ILIKE $1 OR id::text = $2) \
             ORDER BY id"
        );
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(keyword.pattern())
            .bind(keyword.as_str())
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Whether a visible user with this id exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: UserId) -> Result<bool, RepositoryError> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM food.app_user WHERE id = $1 AND hidden = FALSE)",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;

        Ok(row.0)
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username, phone or email is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, user), fields(username = %user.username))]
    pub async fn create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let sql = format!(
            "INSERT INTO food.app_user \
                 (name, email, phone, username, password_hash, role, avatar_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&user.name)
            .bind(user.email.as_ref().map(Email::as_str))
            .bind(user.phone.as_str())
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.role.code())
            .bind(&user.avatar_url)
            .fetch_one(self.pool)
            .await
            .map_err(map_write_error)?;

        row.try_into()
    }

    /// Apply changes to a visible user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Conflict` if a new username, phone or email is taken.
    #[instrument(skip(self, changes))]
    pub async fn update(&self, id: UserId, changes: &UserChanges) -> Result<User, RepositoryError> {
        let sql = format!(
            "UPDATE food.app_user SET \
                 name = COALESCE($2, name), \
                 email = COALESCE($3, email), \
                 phone = COALESCE($4, phone), \
                 username = COALESCE($5, username), \
                 password_hash = COALESCE($6, password_hash), \
                 role = COALESCE($7, role), \
                 avatar_url = COALESCE($8, avatar_url), \
                 updated_at = now() \
             WHERE id = $1 AND hidden = FALSE \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(&changes.name)
            .bind(changes.email.as_ref().map(Email::as_str))
            .bind(changes.phone.as_ref().map(PhoneNumber::as_str))
            .bind(&changes.username)
            .bind(&changes.password_hash)
            .bind(changes.role.map(Role::code))
            .bind(&changes.avatar_url)
            .fetch_optional(self.pool)
            .await
            .map_err(map_write_error)?
            .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Hide a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        soft_delete(self.pool, "food.app_user", id.as_i32()).await
    }
}
