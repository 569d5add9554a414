//! Delivery address handlers. Every route needs a token.

use axum::{Json, extract::State, http::StatusCode};

use food_app_core::AddressId;

use crate::db::AddressRepository;
use crate::error::{AppError, OrNotFound, Result};
use crate::middleware::RequireAuth;
use crate::models::address::{Address, AddressUpdate, NewAddress};
use crate::models::{ADDRESS_MAX, NAME_MAX};
use crate::routes::extract::{JsonBody, PathParam, check_optional_length, search_keyword};
use crate::state::AppState;

pub async fn list(
    RequireAuth(_): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Address>>> {
    Ok(Json(AddressRepository::new(state.pool()).list().await?))
}

pub async fn show(
    RequireAuth(_): RequireAuth,
    State(state): State<AppState>,
    PathParam(id): PathParam<AddressId>,
) -> Result<Json<Address>> {
    let address = AddressRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or(AppError::NotFound("Address"))?;
    Ok(Json(address))
}

pub async fn search(
    RequireAuth(_): RequireAuth,
    State(state): State<AppState>,
    PathParam(keyword): PathParam<String>,
) -> Result<Json<Vec<Address>>> {
    let keyword = search_keyword(&keyword)?;
    Ok(Json(
        AddressRepository::new(state.pool()).search(&keyword).await?,
    ))
}

pub async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NewAddress>,
) -> Result<(StatusCode, Json<Address>)> {
    check_address_lengths(body.name.as_deref(), body.address.as_deref())?;
    let address = AddressRepository::new(state.pool()).create(&body).await?;

    tracing::info!(address_id = %address.id, created_by = %user.id, "Address created");
    Ok((StatusCode::CREATED, Json(address)))
}

pub async fn update(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    PathParam(id): PathParam<AddressId>,
    JsonBody(body): JsonBody<AddressUpdate>,
) -> Result<Json<Address>> {
    check_address_lengths(body.name.as_deref(), body.address.as_deref())?;
    let address = AddressRepository::new(state.pool())
        .update(id, &body)
        .await
        .or_not_found("Address")?;

    tracing::info!(address_id = %id, updated_by = %user.id, "Address updated");
    Ok(Json(address))
}

pub async fn delete(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    PathParam(id): PathParam<AddressId>,
) -> Result<StatusCode> {
    AddressRepository::new(state.pool())
        .delete(id)
        .await
        .or_not_found("Address")?;

    tracing::info!(address_id = %id, deleted_by = %user.id, "Address deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn check_address_lengths(name: Option<&str>, address: Option<&str>) -> Result<()> {
    check_optional_length("name", name, NAME_MAX)?;
    check_optional_length("address", address, ADDRESS_MAX)
}
