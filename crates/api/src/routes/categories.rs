//! Product category handlers. Admin only.

use axum::{Json, extract::State, http::StatusCode};

use food_app_core::CategoryId;

use crate::db::CategoryRepository;
use crate::error::{AppError, OrNotFound, Result};
use crate::middleware::RequireAdmin;
use crate::models::catalog::{Category, CategoryUpdate, NewCategory};
use crate::routes::extract::{JsonBody, PathParam, check_name_change, require_name, search_keyword};
use crate::state::AppState;

pub async fn list(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>> {
    Ok(Json(CategoryRepository::new(state.pool()).list().await?))
}

pub async fn show(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    PathParam(id): PathParam<CategoryId>,
) -> Result<Json<Category>> {
    let category = CategoryRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or(AppError::NotFound("Category"))?;
    Ok(Json(category))
}

pub async fn search(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    PathParam(keyword): PathParam<String>,
) -> Result<Json<Vec<Category>>> {
    let keyword = search_keyword(&keyword)?;
    Ok(Json(
        CategoryRepository::new(state.pool()).search(&keyword).await?,
    ))
}

pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NewCategory>,
) -> Result<(StatusCode, Json<Category>)> {
    require_name(&body.name)?;
    let category = CategoryRepository::new(state.pool()).create(&body).await?;

    tracing::info!(category_id = %category.id, created_by = %admin.id, "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    PathParam(id): PathParam<CategoryId>,
    JsonBody(body): JsonBody<CategoryUpdate>,
) -> Result<Json<Category>> {
    check_name_change(body.name.as_deref())?;
    let category = CategoryRepository::new(state.pool())
        .update(id, &body)
        .await
        .or_not_found("Category")?;

    tracing::info!(category_id = %id, updated_by = %admin.id, "Category updated");
    Ok(Json(category))
}

pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    PathParam(id): PathParam<CategoryId>,
) -> Result<StatusCode> {
    CategoryRepository::new(state.pool())
        .delete(id)
        .await
        .or_not_found("Category")?;

    tracing::info!(category_id = %id, deleted_by = %admin.id, "Category deleted");
    Ok(StatusCode::NO_CONTENT)
}
