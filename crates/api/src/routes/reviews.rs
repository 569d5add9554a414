//! Review handlers. Every route needs a token.
//!
//! New reviews arrive as `multipart/form-data` with an optional photo;
//! edits are plain JSON and never touch the photo.

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};

use food_app_core::{ProductId, ReviewId, UserId};

use crate::cloudinary::REVIEW_IMAGES;
use crate::db::ReviewRepository;
use crate::error::{AppError, OrNotFound, Result};
use crate::middleware::RequireAuth;
use crate::models::review::{NewReview, Review, ReviewUpdate, STARS};
use crate::routes::extract::{FormData, JsonBody, PathParam, search_keyword};
use crate::routes::images::discard_upload;
use crate::state::AppState;

pub async fn list(
    RequireAuth(_): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Review>>> {
    Ok(Json(ReviewRepository::new(state.pool()).list().await?))
}

pub async fn show(
    RequireAuth(_): RequireAuth,
    State(state): State<AppState>,
    PathParam(id): PathParam<ReviewId>,
) -> Result<Json<Review>> {
    let review = ReviewRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or(AppError::NotFound("Review"))?;
    Ok(Json(review))
}

pub async fn by_product(
    RequireAuth(_): RequireAuth,
    State(state): State<AppState>,
    PathParam(product_id): PathParam<ProductId>,
) -> Result<Json<Vec<Review>>> {
    Ok(Json(
        ReviewRepository::new(state.pool())
            .by_product(product_id)
            .await?,
    ))
}

pub async fn search(
    RequireAuth(_): RequireAuth,
    State(state): State<AppState>,
    PathParam(keyword): PathParam<String>,
) -> Result<Json<Vec<Review>>> {
    let keyword = search_keyword(&keyword)?;
    Ok(Json(ReviewRepository::new(state.pool()).search(&keyword).await?))
}

/// Post a review. `user_id` defaults to the caller; only an Admin may post
/// for someone else.
pub async fn create(
    RequireAuth(caller): RequireAuth,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Review>)> {
    let mut form = FormData::read(multipart).await?;

    let user_id = form.parse::<UserId>("user_id")?.unwrap_or(caller.id);
    if !caller.can_act_for(user_id) {
        return Err(AppError::Forbidden);
    }
    let product_id: ProductId = form
        .parse("product_id")?
        .ok_or_else(|| AppError::bad_request("product_id is required"))?;
    let stars: i32 = form
        .parse("stars")?
        .ok_or_else(|| AppError::bad_request("stars is required"))?;
    check_stars(Some(stars))?;
    let content = form.text("content");

    let image_url = match form.take_image() {
        Some(image) => Some(state.cloudinary().upload(image, REVIEW_IMAGES).await?),
        None => None,
    };

    let review = NewReview {
        user_id,
        product_id,
        stars,
        content,
        image_url,
    };
    let created = match ReviewRepository::new(state.pool()).create(&review).await {
        Ok(created) => created,
        Err(err) => {
            discard_upload(&state, review.image_url.as_deref()).await;
            return Err(err.into());
        }
    };

    tracing::info!(review_id = %created.id, %product_id, stars, "Review posted");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update(
    RequireAuth(caller): RequireAuth,
    State(state): State<AppState>,
    PathParam(id): PathParam<ReviewId>,
    JsonBody(body): JsonBody<ReviewUpdate>,
) -> Result<Json<Review>> {
    check_stars(body.stars)?;
    let review = ReviewRepository::new(state.pool())
        .update(id, &body)
        .await
        .or_not_found("Review")?;

    tracing::info!(review_id = %id, updated_by = %caller.id, "Review updated");
    Ok(Json(review))
}

pub async fn delete(
    RequireAuth(caller): RequireAuth,
    State(state): State<AppState>,
    PathParam(id): PathParam<ReviewId>,
) -> Result<StatusCode> {
    ReviewRepository::new(state.pool())
        .delete(id)
        .await
        .or_not_found("Review")?;

    tracing::info!(review_id = %id, deleted_by = %caller.id, "Review deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn check_stars(stars: Option<i32>) -> Result<()> {
    match stars {
        Some(s) if !STARS.contains(&s) => Err(AppError::bad_request(format!(
            "stars must be between {} and {}",
            STARS.start(),
            STARS.end()
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_check_stars() {
        assert!(check_stars(Some(1)).is_ok());
        assert!(check_stars(Some(5)).is_ok());
        assert!(check_stars(None).is_ok());

        let err = check_stars(Some(6)).unwrap_err();
        assert_eq!(err.to_string(), "stars must be between 1 and 5");
        assert!(check_stars(Some(0)).is_err());
    }
}
