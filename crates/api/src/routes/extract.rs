//! Request extractors shared by the handlers.
//!
//! Rejections from these go through [`AppError`], so a bad body or path is a
//! plain-text 400 like every other client error.

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use axum::extract::{FromRequest, FromRequestParts, Multipart};

use crate::cloudinary::ImageFile;
use crate::db::SearchKeyword;
use crate::error::{AppError, Result};
use crate::models::NAME_MAX;

/// JSON request body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Path parameters.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct PathParam<T>(pub T);

/// Validate the `{keyword}` segment of a search route.
///
/// # Errors
///
/// Returns `AppError::BadRequest` when the keyword is blank.
pub fn search_keyword(raw: &str) -> Result<SearchKeyword> {
    SearchKeyword::parse(raw).ok_or_else(|| AppError::bad_request("Keyword cannot be empty"))
}

/// Reject blank required text.
///
/// # Errors
///
/// Returns `AppError::BadRequest` naming the field.
pub fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::bad_request(format!("{field} is required")));
    }
    Ok(())
}

/// Reject text longer than its column.
///
/// # Errors
///
/// Returns `AppError::BadRequest` naming the field.
pub fn check_length(field: &str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(AppError::bad_request(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

/// [`check_length`] for a field the client may leave out.
///
/// # Errors
///
/// Returns `AppError::BadRequest` naming the field.
pub fn check_optional_length(field: &str, value: Option<&str>, max: usize) -> Result<()> {
    value.map_or(Ok(()), |value| check_length(field, value, max))
}

/// A `name` must be present and fit its column.
///
/// # Errors
///
/// Returns `AppError::BadRequest` when the name is blank or too long.
pub fn require_name(name: &str) -> Result<()> {
    require_text("name", name)?;
    check_length("name", name, NAME_MAX)
}

/// [`require_name`] for an update, where a missing name keeps the stored one.
///
/// # Errors
///
/// Returns `AppError::BadRequest` when a supplied name is blank or too long.
pub fn check_name_change(name: Option<&str>) -> Result<()> {
    name.map_or(Ok(()), require_name)
}

/// A `multipart/form-data` body split into text fields and image files.
///
/// Empty file inputs (browsers send one when nothing was picked) are
/// skipped.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    images: Vec<ImageFile>,
}

impl FormData {
    /// Drain a multipart body.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for a malformed body and for file
    /// parts that are not images.
    pub async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            if let Some(file_name) = field.file_name().map(str::to_owned) {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_owned();
                let bytes = field.bytes().await?;
                if bytes.is_empty() {
                    continue;
                }
                form.images
                    .push(ImageFile::new(file_name, content_type, bytes.to_vec())?);
            } else {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// Take a text field, trimmed. Blank counts as absent.
    pub fn text(&mut self, name: &str) -> Option<String> {
        self.fields
            .remove(name)
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
    }

    /// Take a text field that must be present.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` when the field is missing or blank.
    pub fn required(&mut self, name: &str) -> Result<String> {
        self.text(name)
            .ok_or_else(|| AppError::bad_request(format!("{name} is required")))
    }

    /// Take and parse an optional field.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` when the value does not parse.
    pub fn parse<T>(&mut self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.text(name)
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|e| AppError::bad_request(format!("Invalid {name}: {e}")))
            })
            .transpose()
    }

    /// Take every uploaded image, in form order.
    pub fn take_images(&mut self) -> Vec<ImageFile> {
        std::mem::take(&mut self.images)
    }

    /// Take the first uploaded image.
    pub fn take_image(&mut self) -> Option<ImageFile> {
        let mut images = self.take_images();
        (!images.is_empty()).then(|| images.swap_remove(0))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use food_app_core::Price;

    use super::*;

    fn form(pairs: &[(&str, &str)]) -> FormData {
        FormData {
            fields: pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            images: Vec::new(),
        }
    }

    #[test]
    fn test_text_trims_and_drops_blank() {
        let mut f = form(&[("name", "  Bun cha "), ("description", "   ")]);
        assert_eq!(f.text("name").as_deref(), Some("Bun cha"));
        assert_eq!(f.text("description"), None);
        assert_eq!(f.text("missing"), None);
    }

    #[test]
    fn test_required_field() {
        let mut f = form(&[("phone", "")]);
        let err = f.required("phone").unwrap_err();
        assert_eq!(err.to_string(), "phone is required");
    }

    #[test]
    fn test_parse_field() {
        let mut f = form(&[("price", "45000.50"), ("stock_quantity", "ten")]);
        let price: Option<Price> = f.parse("price").unwrap();
        assert_eq!(price.unwrap().to_string(), "45000.50");

        let err = f.parse::<i32>("stock_quantity").unwrap_err();
        assert!(err.to_string().starts_with("Invalid stock_quantity"));

        assert!(f.parse::<i32>("status").unwrap().is_none());
    }

    #[test]
    fn test_take_image_when_none() {
        let mut f = form(&[]);
        assert!(f.take_image().is_none());
    }

    #[test]
    fn test_search_keyword_rejects_blank() {
        let err = search_keyword("  ").unwrap_err();
        assert_eq!(err.to_string(), "Keyword cannot be empty");
        assert_eq!(search_keyword(" ga ").unwrap().as_str(), "ga");
    }

    #[test]
    fn test_check_length() {
        assert!(check_length("username", "minh", 50).is_ok());
        assert!(check_length("username", &"x".repeat(51), 50).is_err());
    }

    #[test]
    fn test_check_length_counts_characters() {
        // 100 two-byte characters fit a VARCHAR(100)
        assert!(check_length("name", &"ă".repeat(100), 100).is_ok());
    }

    #[test]
    fn test_require_name_bounds() {
        assert!(require_name(&"n".repeat(NAME_MAX)).is_ok());
        let err = require_name(&"n".repeat(NAME_MAX + 1)).unwrap_err();
        assert_eq!(err.to_string(), "name must be at most 100 characters");
        assert_eq!(require_name(" ").unwrap_err().to_string(), "name is required");
    }

    #[test]
    fn test_check_name_change() {
        assert!(check_name_change(None).is_ok());
        assert!(check_name_change(Some("Drinks")).is_ok());
        assert_eq!(
            check_name_change(Some("")).unwrap_err().to_string(),
            "name is required"
        );
    }

    #[test]
    fn test_check_optional_length() {
        assert!(check_optional_length("address", None, 255).is_ok());
        assert!(check_optional_length("address", Some(&"a".repeat(256)), 255).is_err());
    }
}
