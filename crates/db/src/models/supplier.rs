//! Supplier entity model.

use rfpeval_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `suppliers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Supplier {
    pub id: DbId,
    pub rfp_id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new supplier.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSupplier {
    pub rfp_id: DbId,
    pub name: String,
}
