//! Payment method handlers. Admin only.

use axum::{Json, extract::State, http::StatusCode};

use food_app_core::PaymentMethodId;

use crate::db::PaymentMethodRepository;
use crate::error::{AppError, OrNotFound, Result};
use crate::middleware::RequireAdmin;
use crate::models::catalog::{NewPaymentMethod, PaymentMethod, PaymentMethodUpdate};
use crate::routes::extract::{JsonBody, PathParam, check_name_change, require_name, search_keyword};
use crate::state::AppState;

pub async fn list(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<PaymentMethod>>> {
    Ok(Json(PaymentMethodRepository::new(state.pool()).list().await?))
}

pub async fn show(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    PathParam(id): PathParam<PaymentMethodId>,
) -> Result<Json<PaymentMethod>> {
    let method = PaymentMethodRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or(AppError::NotFound("Payment method"))?;
    Ok(Json(method))
}

pub async fn search(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    PathParam(keyword): PathParam<String>,
) -> Result<Json<Vec<PaymentMethod>>> {
    let keyword = search_keyword(&keyword)?;
    Ok(Json(
        PaymentMethodRepository::new(state.pool())
            .search(&keyword)
            .await?,
    ))
}

pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NewPaymentMethod>,
) -> Result<(StatusCode, Json<PaymentMethod>)> {
    require_name(&body.name)?;
    let method = PaymentMethodRepository::new(state.pool())
        .create(&body)
        .await?;

    tracing::info!(payment_method_id = %method.id, created_by = %admin.id, "Payment method created");
    Ok((StatusCode::CREATED, Json(method)))
}

pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    PathParam(id): PathParam<PaymentMethodId>,
    JsonBody(body): JsonBody<PaymentMethodUpdate>,
) -> Result<Json<PaymentMethod>> {
    check_name_change(body.name.as_deref())?;
    let method = PaymentMethodRepository::new(state.pool())
        .update(id, &body)
        .await
        .or_not_found("Payment method")?;

    tracing::info!(payment_method_id = %id, updated_by = %admin.id, "Payment method updated");
    Ok(Json(method))
}

pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    PathParam(id): PathParam<PaymentMethodId>,
) -> Result<StatusCode> {
    PaymentMethodRepository::new(state.pool())
        .delete(id)
        .await
        .or_not_found("Payment method")?;

    tracing::info!(payment_method_id = %id, deleted_by = %admin.id, "Payment method deleted");
    Ok(StatusCode::NO_CONTENT)
}
