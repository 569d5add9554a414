//! Seed reference data: categories, payment methods and promotion types.
//!
//! Reads a YAML file, then inserts each entry whose name is not already
//! present. Running it twice is harmless.
//!
//! ```yaml
//! categories:
//!   - name: Noodles
//!     description: Pho, bun and mi
//! payment_methods:
//!   - name: Cash on delivery
//! promotion_types:
//!   - name: Percentage
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use food_app_api::config::ApiConfig;
use food_app_api::db::{
    self, CategoryRepository, PaymentMethodRepository, PromotionTypeRepository, RepositoryError,
};
use food_app_api::models::{NewCategory, NewPaymentMethod, NewPromotionType};

/// A named row with an optional description.
#[derive(Debug, Clone, Deserialize)]
pub struct NamedEntry {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Contents of the reference data file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceData {
    #[serde(default)]
    pub categories: Vec<NamedEntry>,
    #[serde(default)]
    pub payment_methods: Vec<NamedEntry>,
    #[serde(default)]
    pub promotion_types: Vec<NamedEntry>,
}

impl ReferenceData {
    /// Names that are blank or listed twice within one section.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for (section, entries) in [
            ("categories", &self.categories),
            ("payment_methods", &self.payment_methods),
            ("promotion_types", &self.promotion_types),
        ] {
            let mut seen = std::collections::HashSet::new();
            for entry in entries {
                let name = entry.name.trim();
                if name.is_empty() {
                    errors.push(format!("{section}: entry with empty name"));
                } else if !seen.insert(name) {
                    errors.push(format!("{section}: duplicate name '{name}'"));
                }
            }
        }
        errors
    }
}

/// Per-section counts reported at the end of a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedCount {
    pub inserted: usize,
    pub skipped: usize,
}

impl SeedCount {
    const fn record(&mut self, inserted: bool) {
        if inserted {
            self.inserted += 1;
        } else {
            self.skipped += 1;
        }
    }
}

/// Seed reference data from a YAML file.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the file cannot be
/// read or fails validation, or a database operation fails.
pub async fn reference_data(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading reference data from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let data: ReferenceData = serde_yaml::from_str(&content)?;

    let errors = data.validate();
    if !errors.is_empty() {
        for err in &errors {
            tracing::error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    let database_url = ApiConfig::database_url_from_env()?;
    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let categories = seed_categories(&pool, &data.categories).await?;
    let payment_methods = seed_payment_methods(&pool, &data.payment_methods).await?;
    let promotion_types = seed_promotion_types(&pool, &data.promotion_types).await?;

    info!("Seeding complete!");
    for (section, count) in [
        ("Categories", categories),
        ("Payment methods", payment_methods),
        ("Promotion types", promotion_types),
    ] {
        info!(
            "  {section}: {} inserted, {} already present",
            count.inserted, count.skipped
        );
    }

    Ok(())
}

async fn seed_categories(
    pool: &sqlx::PgPool,
    entries: &[NamedEntry],
) -> Result<SeedCount, RepositoryError> {
    let repo = CategoryRepository::new(pool);
    let mut count = SeedCount::default();
    for entry in entries {
        let name = entry.name.trim();
        let missing = !repo.exists_by_name(name).await?;
        if missing {
            repo.create(&NewCategory {
                name: name.to_owned(),
                description: entry.description.clone(),
            })
            .await?;
        }
        count.record(missing);
    }
    Ok(count)
}

async fn seed_payment_methods(
    pool: &sqlx::PgPool,
    entries: &[NamedEntry],
) -> Result<SeedCount, RepositoryError> {
    let repo = PaymentMethodRepository::new(pool);
    let mut count = SeedCount::default();
    for entry in entries {
        let name = entry.name.trim();
        let missing = !repo.exists_by_name(name).await?;
        if missing {
            repo.create(&NewPaymentMethod {
                name: name.to_owned(),
                description: entry.description.clone(),
            })
            .await?;
        }
        count.record(missing);
    }
    Ok(count)
}

async fn seed_promotion_types(
    pool: &sqlx::PgPool,
    entries: &[NamedEntry],
) -> Result<SeedCount, RepositoryError> {
    let repo = PromotionTypeRepository::new(pool);
    let mut count = SeedCount::default();
    for entry in entries {
        let name = entry.name.trim();
        let missing = !repo.exists_by_name(name).await?;
        if missing {
            repo.create(&NewPromotionType {
                name: name.to_owned(),
                description: entry.description.clone(),
            })
            .await?;
        }
        count.record(missing);
    }
    Ok(count)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_file_parses() {
        let data: ReferenceData =
            serde_yaml::from_str(include_str!("../../data/reference-data.yaml")).unwrap();
        assert!(!data.categories.is_empty());
        assert!(!data.payment_methods.is_empty());
        assert!(!data.promotion_types.is_empty());
        assert!(data.validate().is_empty());
    }

    #[test]
    fn test_missing_sections_default_empty() {
        let data: ReferenceData =
            serde_yaml::from_str("categories:\n  - name: Drinks\n").unwrap();
        assert_eq!(data.categories.len(), 1);
        assert!(data.categories[0].description.is_none());
        assert!(data.payment_methods.is_empty());
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert!(serde_yaml::from_str::<ReferenceData>("suppliers: []\n").is_err());
    }

    #[test]
    fn test_validate_reports_blank_and_duplicate() {
        let data: ReferenceData = serde_yaml::from_str(
            "categories:\n  - name: Drinks\n  - name: ' Drinks '\npromotion_types:\n  - name: '  '\n",
        )
        .unwrap();
        let errors = data.validate();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("duplicate name 'Drinks'"));
        assert!(errors[1].starts_with("promotion_types"));
    }

    #[test]
    fn test_seed_count_record() {
        let mut count = SeedCount::default();
        count.record(true);
        count.record(false);
        count.record(false);
        assert_eq!(count, SeedCount { inserted: 1, skipped: 2 });
    }
}
