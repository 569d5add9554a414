//! Product handlers.
//!
//! Reads are public. Writes are Admin only and take `multipart/form-data`
//! so images can ride along with the fields.

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};

use food_app_core::{CategoryId, Price, ProductId, SupplierId};

use crate::cloudinary::{ImageFile, PRODUCT_IMAGES};
use crate::db::ProductRepository;
use crate::error::{AppError, OrNotFound, Result};
use crate::middleware::RequireAdmin;
use crate::models::NAME_MAX;
use crate::models::product::{MAX_IMAGES, NewProduct, Product, ProductChanges};
use crate::routes::extract::{FormData, PathParam, check_length, search_keyword};
use crate::routes::images::{discard_upload, settle_uploads};
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(ProductRepository::new(state.pool()).list().await?))
}

pub async fn show(
    State(state): State<AppState>,
    PathParam(id): PathParam<ProductId>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or(AppError::NotFound("Product"))?;
    Ok(Json(product))
}

pub async fn search(
    State(state): State<AppState>,
    PathParam(keyword): PathParam<String>,
) -> Result<Json<Vec<Product>>> {
    let keyword = search_keyword(&keyword)?;
    Ok(Json(
        ProductRepository::new(state.pool()).search(&keyword).await?,
    ))
}

pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Product>)> {
    let mut form = FormData::read(multipart).await?;

    let name = form.required("name")?;
    check_length("name", &name, NAME_MAX)?;
    let price: Price = form
        .parse("price")?
        .ok_or_else(|| AppError::bad_request("price is required"))?;
    let stock_quantity = non_negative("stock_quantity", form.parse("stock_quantity")?)?;
    let images = checked_images(form.take_images())?;

    let mut product = NewProduct {
        category_id: form.parse::<CategoryId>("category_id")?,
        supplier_id: form.parse::<SupplierId>("supplier_id")?,
        name,
        description: form.text("description"),
        price,
        stock_quantity: stock_quantity.unwrap_or(0),
        status: form.parse("status")?.unwrap_or(0),
        images: Vec::new(),
    };
    product.images = upload_all(&state, images).await?;

    let result = ProductRepository::new(state.pool()).create(&product).await;
    settle_uploads(&state, result.is_ok(), &product.images, &[]).await;
    let created = result?;

    tracing::info!(
        product_id = %created.id,
        images = created.images.len(),
        created_by = %admin.id,
        "Product created"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a product. Supplying any image replaces the whole image set, and
/// the replaced images are destroyed once the new set is stored.
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    PathParam(id): PathParam<ProductId>,
    multipart: Multipart,
) -> Result<Json<Product>> {
    let mut form = FormData::read(multipart).await?;

    let name = form.text("name");
    if let Some(name) = &name {
        check_length("name", name, NAME_MAX)?;
    }
    let images = checked_images(form.take_images())?;

    let mut changes = ProductChanges {
        category_id: form.parse("category_id")?,
        supplier_id: form.parse("supplier_id")?,
        name,
        description: form.text("description"),
        price: form.parse("price")?,
        stock_quantity: non_negative("stock_quantity", form.parse("stock_quantity")?)?,
        status: form.parse("status")?,
        images: None,
    };

    let repo = ProductRepository::new(state.pool());
    let current = repo.get(id).await?.ok_or(AppError::NotFound("Product"))?;
    if !images.is_empty() {
        changes.images = Some(upload_all(&state, images).await?);
    }

    let result = repo.update(id, &changes).await;
    if let Some(uploaded) = &changes.images {
        settle_uploads(&state, result.is_ok(), uploaded, &current.images).await;
    }
    let product = result.or_not_found("Product")?;

    tracing::info!(product_id = %id, updated_by = %admin.id, "Product updated");
    Ok(Json(product))
}

pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    PathParam(id): PathParam<ProductId>,
) -> Result<StatusCode> {
    ProductRepository::new(state.pool())
        .delete(id)
        .await
        .or_not_found("Product")?;

    tracing::info!(product_id = %id, deleted_by = %admin.id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn checked_images(images: Vec<ImageFile>) -> Result<Vec<ImageFile>> {
    if images.len() > MAX_IMAGES {
        return Err(AppError::bad_request(format!(
            "A product can have at most {MAX_IMAGES} images"
        )));
    }
    Ok(images)
}

fn non_negative(field: &str, value: Option<i32>) -> Result<Option<i32>> {
    match value {
        Some(v) if v < 0 => Err(AppError::bad_request(format!("{field} cannot be negative"))),
        other => Ok(other),
    }
}

/// Upload in order. If one upload fails the ones before it are removed.
async fn upload_all(state: &AppState, images: Vec<ImageFile>) -> Result<Vec<String>> {
    let mut urls = Vec::with_capacity(images.len());
    for image in images {
        match state.cloudinary().upload(image, PRODUCT_IMAGES).await {
            Ok(url) => urls.push(url),
            Err(err) => {
                for url in &urls {
                    discard_upload(state, Some(url)).await;
                }
                return Err(err.into());
            }
        }
    }
    Ok(urls)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn image(n: usize) -> ImageFile {
        ImageFile::new(format!("dish-{n}.jpg"), "image/jpeg", vec![0xFF, 0xD8]).unwrap()
    }

    #[test]
    fn test_image_limit() {
        assert!(checked_images((0..MAX_IMAGES).map(image).collect()).is_ok());

        let err = checked_images((0..=MAX_IMAGES).map(image).collect()).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_non_negative() {
        assert_eq!(non_negative("stock_quantity", Some(3)).unwrap(), Some(3));
        assert_eq!(non_negative("stock_quantity", None).unwrap(), None);
        assert!(non_negative("stock_quantity", Some(-1)).is_err());
    }
}
