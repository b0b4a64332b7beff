//! RFP entity model.

use rfpeval_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `rfps` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Rfp {
    pub id: DbId,
    pub title: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new RFP.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRfp {
    pub title: String,
}
