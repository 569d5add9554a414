//! Cloudinary-related errors.

use thiserror::Error;

/// Errors that can occur when talking to Cloudinary.
#[derive(Debug, Error)]
pub enum CloudinaryError {
    /// HTTP request failed.
    #[error("Cloudinary request failed: {0}")]
    Request(String),

    /// Failed to parse response.
    #[error("Cloudinary response error: {0}")]
    Response(String),

    /// Cloudinary rejected the call.
    #[error("Cloudinary API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Upload was not an image.
    #[error("unsupported content type: {0}")]
    NotAnImage(String),
}
