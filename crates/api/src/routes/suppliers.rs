//! Supplier handlers. Admin only.

use axum::{Json, extract::State, http::StatusCode};

use food_app_core::SupplierId;

use crate::db::SupplierRepository;
use crate::error::{AppError, OrNotFound, Result};
use crate::middleware::RequireAdmin;
use crate::models::ADDRESS_MAX;
use crate::models::catalog::{NewSupplier, Supplier, SupplierUpdate};
use crate::routes::extract::{
    JsonBody, PathParam, check_name_change, check_optional_length, require_name, search_keyword,
};
use crate::state::AppState;

pub async fn list(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Supplier>>> {
    Ok(Json(SupplierRepository::new(state.pool()).list().await?))
}

pub async fn show(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    PathParam(id): PathParam<SupplierId>,
) -> Result<Json<Supplier>> {
    let supplier = SupplierRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or(AppError::NotFound("Supplier"))?;
    Ok(Json(supplier))
}

pub async fn search(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    PathParam(keyword): PathParam<String>,
) -> Result<Json<Vec<Supplier>>> {
    let keyword = search_keyword(&keyword)?;
    Ok(Json(
        SupplierRepository::new(state.pool()).search(&keyword).await?,
    ))
}

pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NewSupplier>,
) -> Result<(StatusCode, Json<Supplier>)> {
    require_name(&body.name)?;
    check_optional_length("address", body.address.as_deref(), ADDRESS_MAX)?;
    let supplier = SupplierRepository::new(state.pool()).create(&body).await?;

    tracing::info!(supplier_id = %supplier.id, created_by = %admin.id, "Supplier created");
    Ok((StatusCode::CREATED, Json(supplier)))
}

pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    PathParam(id): PathParam<SupplierId>,
    JsonBody(body): JsonBody<SupplierUpdate>,
) -> Result<Json<Supplier>> {
    check_name_change(body.name.as_deref())?;
    check_optional_length("address", body.address.as_deref(), ADDRESS_MAX)?;
    let supplier = SupplierRepository::new(state.pool())
        .update(id, &body)
        .await
        .or_not_found("Supplier")?;

    tracing::info!(supplier_id = %id, updated_by = %admin.id, "Supplier updated");
    Ok(Json(supplier))
}

pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    PathParam(id): PathParam<SupplierId>,
) -> Result<StatusCode> {
    SupplierRepository::new(state.pool())
        .delete(id)
        .await
        .or_not_found("Supplier")?;

    tracing::info!(supplier_id = %id, deleted_by = %admin.id, "Supplier deleted");
    Ok(StatusCode::NO_CONTENT)
}
