//! Repository for the `suppliers` table.

use rfpeval_core::types::DbId;
use sqlx::PgPool;

use crate::models::supplier::{CreateSupplier, Supplier};

const COLUMNS: &str = "id, rfp_id, name, created_at, updated_at";

/// Provides data access for suppliers.
pub struct SupplierRepo;

impl SupplierRepo {
    /// Insert a new supplier, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSupplier) -> Result<Supplier, sqlx::Error> {
        let query = format!(
            "INSERT INTO suppliers (rfp_id, name) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Supplier>(&query)
            .bind(input.rfp_id)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Supplier>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM suppliers WHERE id = $1");
        sqlx::query_as::<_, Supplier>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
