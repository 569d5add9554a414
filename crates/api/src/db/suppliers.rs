//! Supplier repository.

use std::collections::HashMap;

use sqlx::PgPool;

use food_app_core::{Email, PhoneNumber, SupplierId};

use super::{RepositoryError, SearchKeyword, map_write_error, soft_delete};
use crate::models::catalog::{NewSupplier, ProductSummary, Supplier, SupplierUpdate};

const SUPPLIER_COLUMNS: &str = "id, name, address, phone, email, hidden";

/// Internal row type; contact columns are re-validated on read.
#[derive(Debug, sqlx::FromRow)]
struct SupplierRow {
    id: SupplierId,
    name: String,
    address: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    hidden: bool,
}

impl TryFrom<SupplierRow> for Supplier {
    type Error = RepositoryError;

    fn try_from(row: SupplierRow) -> Result<Self, Self::Error> {
        let phone = row
            .phone
            .as_deref()
            .map(PhoneNumber::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid supplier phone: {e}"))
            })?;
        let email = row
            .email
            .as_deref()
            .map(Email::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid supplier email: {e}"))
            })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            address: row.address,
            phone,
            email,
            hidden: row.hidden,
            products: Vec::new(),
        })
    }
}

#[derive(sqlx::FromRow)]
struct SupplierProductRow {
    supplier_id: SupplierId,
    #[sqlx(flatten)]
    product: ProductSummary,
}

/// Repository for suppliers.
pub struct SupplierRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SupplierRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List visible suppliers with their products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if stored contact details are invalid.
    pub async fn list(&self) -> Result<Vec<Supplier>, RepositoryError> {
        let sql = format!(
            "SELECT {SUPPLIER_COLUMNS} FROM food.supplier WHERE hidden = FALSE ORDER BY id"
        );
        let rows = sqlx::query_as::<_, SupplierRow>(&sql)
            .fetch_all(self.pool)
            .await?;
        let mut suppliers = rows
            .into_iter()
            .map(Supplier::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        self.attach_products(&mut suppliers).await?;
        Ok(suppliers)
    }

    /// Get a visible supplier with its products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: SupplierId) -> Result<Option<Supplier>, RepositoryError> {
        let sql =
            format!("SELECT {SUPPLIER_COLUMNS} FROM food.supplier WHERE id = $1 AND hidden = FALSE");
        let Some(row) = sqlx::query_as::<_, SupplierRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };

        let mut supplier = Supplier::try_from(row)?;
        self.attach_products(std::slice::from_mut(&mut supplier)).await?;
        Ok(Some(supplier))
    }

    /// Search by name, phone or email, or exact id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, keyword: &SearchKeyword) -> Result<Vec<Supplier>, RepositoryError> {
        let sql = format!(
            "SELECT {SUPPLIER_COLUMNS} FROM food.supplier \
             WHERE hidden = FALSE \
               AND (name ILIKE $1 OR phone ILIKE $1 OR email ILIKE $1 OR id::text = $2) \
             ORDER BY id"
        );
        let rows = sqlx::query_as::<_, SupplierRow>(&sql)
            .bind(keyword.pattern())
            .bind(keyword.as_str())
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Create a supplier.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, supplier: &NewSupplier) -> Result<Supplier, RepositoryError> {
        let sql = format!(
            "INSERT INTO food.supplier (name, address, phone, email) VALUES ($1, $2, $3, $4) \
             RETURNING {SUPPLIER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, SupplierRow>(&sql)
            .bind(&supplier.name)
            .bind(&supplier.address)
            .bind(supplier.phone.as_ref().map(PhoneNumber::as_str))
            .bind(supplier.email.as_ref().map(Email::as_str))
            .fetch_one(self.pool)
            .await
            .map_err(map_write_error)?;

        row.try_into()
    }

    /// Apply changes to a visible supplier.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the supplier does not exist.
    pub async fn update(
        &self,
        id: SupplierId,
        changes: &SupplierUpdate,
    ) -> Result<Supplier, RepositoryError> {
        let sql = format!(
            "UPDATE food.supplier SET \
                 name = COALESCE($2, name), \
                 address = COALESCE($3, address), \
                 phone = COALESCE($4, phone), \
                 email = COALESCE($5, email) \
             WHERE id = $1 AND hidden = FALSE \
             RETURNING {SUPPLIER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, SupplierRow>(&sql)
            .bind(id)
            .bind(&changes.name)
            .bind(&changes.address)
            .bind(changes.phone.as_ref().map(PhoneNumber::as_str))
            .bind(changes.email.as_ref().map(Email::as_str))
            .fetch_optional(self.pool)
            .await
            .map_err(map_write_error)?
            .ok_or(RepositoryError::NotFound)?;

        let mut supplier = Supplier::try_from(row)?;
        self.attach_products(std::slice::from_mut(&mut supplier)).await?;
        Ok(supplier)
    }

    /// Hide a supplier.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the supplier does not exist.
    pub async fn delete(&self, id: SupplierId) -> Result<(), RepositoryError> {
        soft_delete(self.pool, "food.supplier", id.as_i32()).await
    }

    async fn attach_products(&self, suppliers: &mut [Supplier]) -> Result<(), RepositoryError> {
        if suppliers.is_empty() {
            return Ok(());
        }

        let ids: Vec<i32> = suppliers.iter().map(|s| s.id.as_i32()).collect();
        let rows = sqlx::query_as::<_, SupplierProductRow>(
            "SELECT supplier_id, id, name, price, status FROM food.product \
             WHERE supplier_id = ANY($1) AND hidden = FALSE \
             ORDER BY id",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_supplier: HashMap<SupplierId, Vec<ProductSummary>> = HashMap::new();
        for row in rows {
            by_supplier.entry(row.supplier_id).or_default().push(row.product);
        }
        for supplier in suppliers {
            supplier.products = by_supplier.remove(&supplier.id).unwrap_or_default();
        }

        Ok(())
    }
}
