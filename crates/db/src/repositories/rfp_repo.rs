//! Repository for the `rfps` table.

use rfpeval_core::types::DbId;
use sqlx::PgPool;

use crate::models::rfp::{CreateRfp, Rfp};

const COLUMNS: &str = "id, title, created_at, updated_at";

/// Provides data access for RFPs.
pub struct RfpRepo;

impl RfpRepo {
    /// Insert a new RFP, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateRfp) -> Result<Rfp, sqlx::Error> {
        let query = format!("INSERT INTO rfps (title) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Rfp>(&query)
            .bind(&input.title)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Rfp>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rfps WHERE id = $1");
        sqlx::query_as::<_, Rfp>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
