//! User account handlers.
//!
//! Registration and login are public. Reads need a token, changes need the
//! account owner or an Admin, and deletion is Admin only.

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use food_app_core::{Email, PhoneNumber, Role, UserId};

use crate::cloudinary::{ImageFile, USER_IMAGES};
use crate::db::UserRepository;
use crate::error::{AppError, OrNotFound, Result, add_breadcrumb};
use crate::middleware::{OptionalAuth, RequireAdmin, RequireAuth};
use crate::models::user::{NAME_MAX, NewUser, USERNAME_MAX, User, UserChanges};
use crate::routes::extract::{FormData, JsonBody, PathParam, check_length, search_keyword};
use crate::routes::images::{discard_upload, settle_uploads};
use crate::services::auth::{AuthService, IssuedToken, hash_password, validate_password};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Exchange credentials for a bearer token.
#[instrument(skip(state, body), fields(username = %body.username))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Json<IssuedToken>> {
    let auth = AuthService::new(state.pool(), state.tokens());
    let issued = auth.login(&body.username, &body.password).await?;
    Ok(Json(issued))
}

pub async fn list(
    RequireAuth(_): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>> {
    Ok(Json(UserRepository::new(state.pool()).list().await?))
}

pub async fn show(
    RequireAuth(_): RequireAuth,
    State(state): State<AppState>,
    PathParam(id): PathParam<UserId>,
) -> Result<Json<User>> {
    let user = UserRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    Ok(Json(user))
}

pub async fn show_by_username(
    RequireAuth(_): RequireAuth,
    State(state): State<AppState>,
    PathParam(username): PathParam<String>,
) -> Result<Json<User>> {
    let user = UserRepository::new(state.pool())
        .get_by_username(username.trim())
        .await?
        .ok_or(AppError::NotFound("User"))?;
    Ok(Json(user))
}

pub async fn search(
    RequireAuth(_): RequireAuth,
    State(state): State<AppState>,
    PathParam(keyword): PathParam<String>,
) -> Result<Json<Vec<User>>> {
    let keyword = search_keyword(&keyword)?;
    Ok(Json(UserRepository::new(state.pool()).search(&keyword).await?))
}

/// Register an account.
///
/// Anyone may register; only an Admin may pick the role of the new account.
pub async fn create(
    OptionalAuth(caller): OptionalAuth,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<User>)> {
    let mut form = FormData::read(multipart).await?;

    let name = form.required("name")?;
    check_length("name", &name, NAME_MAX)?;
    let email = form.parse::<Email>("email")?;
    let phone: PhoneNumber = form
        .parse("phone")?
        .ok_or_else(|| AppError::bad_request("phone is required"))?;
    let username = form.required("username")?;
    check_length("username", &username, USERNAME_MAX)?;
    let password = form
        .text("password")
        .ok_or_else(|| AppError::bad_request("Password is required"))?;
    validate_password(&password)?;

    let role = match form.parse::<Role>("role")? {
        Some(role) if role != Role::User && !caller.as_ref().is_some_and(|c| c.is_admin()) => {
            return Err(AppError::Forbidden);
        }
        Some(role) => role,
        None => Role::User,
    };

    let password_hash = hash_password(&password)?;
    let avatar_url = upload_avatar(&state, form.take_image()).await?;

    let new_user = NewUser {
        name,
        email,
        phone,
        username,
        password_hash,
        role,
        avatar_url,
    };

    let user = match UserRepository::new(state.pool()).create(&new_user).await {
        Ok(user) => user,
        Err(err) => {
            discard_upload(&state, new_user.avatar_url.as_deref()).await;
            return Err(err.into());
        }
    };

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");
    Ok((StatusCode::CREATED, Json(user)))
}

/// Update an account. A new image replaces the stored avatar, and the old
/// asset is destroyed once the new URL is saved.
pub async fn update(
    RequireAuth(caller): RequireAuth,
    State(state): State<AppState>,
    PathParam(id): PathParam<UserId>,
    multipart: Multipart,
) -> Result<Json<User>> {
    if !caller.can_act_for(id) {
        return Err(AppError::Forbidden);
    }

    let mut form = FormData::read(multipart).await?;

    let name = form.text("name");
    if let Some(name) = &name {
        check_length("name", name, NAME_MAX)?;
    }
    let username = form.text("username");
    if let Some(username) = &username {
        check_length("username", username, USERNAME_MAX)?;
    }
    let email = form.parse::<Email>("email")?;
    let phone = form.parse::<PhoneNumber>("phone")?;
    let role = form.parse::<Role>("role")?;
    if role.is_some() && !caller.is_admin() {
        return Err(AppError::Forbidden);
    }
    let password_hash = match form.text("password") {
        Some(password) => {
            validate_password(&password)?;
            Some(hash_password(&password)?)
        }
        None => None,
    };

    let repo = UserRepository::new(state.pool());
    let current = repo.get_by_id(id).await?.ok_or(AppError::NotFound("User"))?;

    let avatar_url = match form.take_image() {
        Some(image) => Some(state.cloudinary().upload(image, USER_IMAGES).await?),
        None => None,
    };

    let changes = UserChanges {
        name,
        email,
        phone,
        username,
        password_hash,
        role,
        avatar_url,
    };
    let result = repo.update(id, &changes).await;
    if let Some(uploaded) = &changes.avatar_url {
        settle_uploads(
            &state,
            result.is_ok(),
            std::slice::from_ref(uploaded),
            current.avatar_url.as_slice(),
        )
        .await;
    }
    let user = result.or_not_found("User")?;

    tracing::info!(user_id = %user.id, updated_by = %caller.id, "User updated");
    Ok(Json(user))
}

pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    PathParam(id): PathParam<UserId>,
) -> Result<StatusCode> {
    UserRepository::new(state.pool())
        .delete(id)
        .await
        .or_not_found("User")?;

    tracing::info!(user_id = %id, deleted_by = %admin.id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn upload_avatar(state: &AppState, image: Option<ImageFile>) -> Result<Option<String>> {
    let Some(image) = image else {
        return Ok(None);
    };
    add_breadcrumb("upload", "Uploading avatar", Some(&[("file", image.file_name())]));
    Ok(Some(state.cloudinary().upload(image, USER_IMAGES).await?))
}
