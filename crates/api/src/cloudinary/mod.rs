//! Cloudinary image hosting.
//!
//! Product photos, avatars and review photos are stored on Cloudinary; the
//! database keeps only the delivery URL. This module provides:
//! - [`CloudinaryClient`] for signed upload and destroy calls
//! - [`ImageFile`], an uploaded file already checked to be an image
//! - [`public_id_from_url`] to find the asset behind a stored URL

mod client;
mod error;

pub use client::{
    CloudinaryClient, ImageFile, PRODUCT_IMAGES, REVIEW_IMAGES, USER_IMAGES, UploadPreset,
    public_id_from_url, sign_params,
};
pub use error::CloudinaryError;
