//! Cloudinary upload API client.
//!
//! Calls are authenticated with a signature: the request parameters sorted
//! by name, joined as `k=v&k=v`, followed by the API secret, hashed with
//! SHA-256 and hex encoded.

use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::Client;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, error, instrument};
use url::Url;

use super::error::CloudinaryError;
use crate::config::CloudinaryConfig;

const CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Target folder and bounding box for one kind of image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPreset {
    pub folder: &'static str,
    pub width: u32,
    pub height: u32,
}

impl UploadPreset {
    /// Incoming transformation: scale down to fit the box, never up.
    #[must_use]
    pub fn transformation(&self) -> String {
        format!("c_limit,h_{},w_{}", self.height, self.width)
    }
}

pub const PRODUCT_IMAGES: UploadPreset = UploadPreset {
    folder: "products",
    width: 800,
    height: 800,
};

pub const USER_IMAGES: UploadPreset = UploadPreset {
    folder: "user-images",
    width: 300,
    height: 300,
};

pub const REVIEW_IMAGES: UploadPreset = UploadPreset {
    folder: "vote-images",
    width: 300,
    height: 300,
};

/// An uploaded file whose content type is `image/*`.
#[derive(Debug, Clone)]
pub struct ImageFile {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl ImageFile {
    /// Wrap an uploaded file.
    ///
    /// # Errors
    ///
    /// Returns `CloudinaryError::NotAnImage` for any content type outside
    /// `image/*`.
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, CloudinaryError> {
        let content_type = content_type.into();
        if !content_type.to_ascii_lowercase().starts_with("image/") {
            return Err(CloudinaryError::NotAnImage(content_type));
        }

        Ok(Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        })
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Cloudinary API client for uploading and deleting images.
#[derive(Clone)]
pub struct CloudinaryClient {
    client: Client,
    cloud_name: String,
    api_key: String,
    api_secret: SecretString,
}

impl std::fmt::Debug for CloudinaryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryClient")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl CloudinaryClient {
    /// Create a new Cloudinary client.
    #[must_use]
    pub fn new(config: &CloudinaryConfig) -> Self {
        Self {
            client: Client::new(),
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        }
    }

    /// Upload an image and return its HTTPS delivery URL.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or Cloudinary rejects the upload.
    #[instrument(skip(self, image), fields(folder = preset.folder, bytes = image.len()))]
    pub async fn upload(
        &self,
        image: ImageFile,
        preset: UploadPreset,
    ) -> Result<String, CloudinaryError> {
        let timestamp = unix_timestamp()?;
        let transformation = preset.transformation();

        let signature = sign_params(
            &[
                ("folder", preset.folder),
                ("timestamp", &timestamp),
                ("transformation", &transformation),
            ],
            self.api_secret.expose_secret(),
        );

        let file = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)
            .map_err(|e| CloudinaryError::Request(e.to_string()))?;

        let form = Form::new()
            .part("file", file)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", preset.folder)
            .text("transformation", transformation)
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| CloudinaryError::Request(e.to_string()))?;

        let uploaded: UploadResponse = read_json(response).await?;

        debug!(public_id = %uploaded.public_id, "Image uploaded to Cloudinary");
        Ok(uploaded.secure_url)
    }

    /// Delete an image by public id.
    ///
    /// An already-missing asset is not an error.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or Cloudinary rejects the call.
    #[instrument(skip(self))]
    pub async fn destroy(&self, public_id: &str) -> Result<(), CloudinaryError> {
        let timestamp = unix_timestamp()?;

        let signature = sign_params(
            &[("public_id", public_id), ("timestamp", &timestamp)],
            self.api_secret.expose_secret(),
        );

        let params = [
            ("public_id", public_id),
            ("timestamp", timestamp.as_str()),
            ("api_key", self.api_key.as_str()),
            ("signature_algorithm", "sha256"),
            ("signature", signature.as_str()),
        ];

        let response = self
            .client
            .post(self.endpoint("destroy"))
            .form(&params)
            .send()
            .await
            .map_err(|e| CloudinaryError::Request(e.to_string()))?;

        let destroyed: DestroyResponse = read_json(response).await?;

        match destroyed.result.as_str() {
            "ok" | "not found" => {
                debug!(result = %destroyed.result, "Cloudinary destroy finished");
                Ok(())
            }
            other => Err(CloudinaryError::Api {
                status: 200,
                message: format!("unexpected destroy result: {other}"),
            }),
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{CLOUDINARY_API_BASE}/{}/image/{action}", self.cloud_name)
    }
}

/// Compute a Cloudinary request signature.
///
/// `params` must not include `file`, `api_key`, `resource_type` or the
/// signature itself; order does not matter.
#[must_use]
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, &str)> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Recover an asset's public id from its delivery URL.
///
/// `https://res.cloudinary.com/demo/image/upload/v1712/user-images/abc.jpg`
/// yields `user-images/abc`. Transformation segments before the version
/// are skipped. Returns `None` for URLs that are not Cloudinary delivery
/// URLs.
#[must_use]
pub fn public_id_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segments: Vec<&str> = parsed.path_segments()?.collect();

    let upload = segments.iter().position(|s| *s == "upload")?;
    let after_upload = segments.get(upload + 1..)?;

    let start = after_upload
        .iter()
        .position(|s| is_version_segment(s))
        .map_or(0, |v| v + 1);
    let id_segments = after_upload.get(start..)?;

    let (last, folders) = id_segments.split_last()?;
    let stem = last.rsplit_once('.').map_or(*last, |(stem, _ext)| stem);
    if stem.is_empty() {
        return None;
    }

    let mut public_id = folders.join("/");
    if !public_id.is_empty() {
        public_id.push('/');
    }
    public_id.push_str(stem);
    Some(public_id)
}

/// `v` followed by one or more digits.
fn is_version_segment(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

fn unix_timestamp() -> Result<String, CloudinaryError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .map_err(|e| CloudinaryError::Request(e.to_string()))
}

async fn read_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, CloudinaryError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| CloudinaryError::Response(e.to_string()))?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map_or_else(|_| body.clone(), |env| env.error.message);
        error!(status = status.as_u16(), %message, "Cloudinary API error");
        return Err(CloudinaryError::Api {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|e| CloudinaryError::Response(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_params_sorted_and_hashed() {
        // sha256("public_id=sample&timestamp=1315060510abcd")
        let signature = sign_params(
            &[("timestamp", "1315060510"), ("public_id", "sample")],
            "abcd",
        );

        let mut hasher = Sha256::new();
        hasher.update(b"public_id=sample&timestamp=1315060510abcd");
        assert_eq!(signature, hex::encode(hasher.finalize()));
        assert_eq!(signature.len(), 64);
    }

    #[test]
    fn test_sign_params_skips_empty_values() {
        let with_empty = sign_params(&[("folder", ""), ("timestamp", "1")], "s");
        let without = sign_params(&[("timestamp", "1")], "s");
        assert_eq!(with_empty, without);
    }

    #[test]
    fn test_transformation_string() {
        assert_eq!(PRODUCT_IMAGES.transformation(), "c_limit,h_800,w_800");
        assert_eq!(USER_IMAGES.transformation(), "c_limit,h_300,w_300");
        assert_eq!(REVIEW_IMAGES.folder, "vote-images");
    }

    #[test]
    fn test_public_id_with_version_and_folder() {
        assert_eq!(
            public_id_from_url(
                "https://res.cloudinary.com/demo/image/upload/v1712345678/user-images/abc123.jpg"
            )
            .as_deref(),
            Some("user-images/abc123")
        );
    }

    #[test]
    fn test_public_id_without_version() {
        assert_eq!(
            public_id_from_url("https://res.cloudinary.com/demo/image/upload/sample.png")
                .as_deref(),
            Some("sample")
        );
    }

    #[test]
    fn test_public_id_skips_transformations() {
        assert_eq!(
            public_id_from_url(
                "https://res.cloudinary.com/demo/image/upload/c_limit,h_300,w_300/v17/vote-images/x.webp"
            )
            .as_deref(),
            Some("vote-images/x")
        );
    }

    #[test]
    fn test_public_id_rejects_other_urls() {
        assert!(public_id_from_url("").is_none());
        assert!(public_id_from_url("not a url").is_none());
        assert!(public_id_from_url("https://example.com/images/a.jpg").is_none());
        assert!(public_id_from_url("https://res.cloudinary.com/demo/image/upload/").is_none());
    }

    #[test]
    fn test_image_file_requires_image_type() {
        assert!(ImageFile::new("a.jpg", "image/jpeg", vec![1, 2, 3]).is_ok());
        assert!(ImageFile::new("a.PNG", "IMAGE/PNG", vec![1]).is_ok());
        assert!(matches!(
            ImageFile::new("a.pdf", "application/pdf", vec![1]),
            Err(CloudinaryError::NotAnImage(_))
        ));
    }
}
