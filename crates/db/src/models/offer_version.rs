//! Financial offer version entity model and DTOs.

use rfpeval_core::financial::comparison::VersionDescriptor;
use rfpeval_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `financial_offer_versions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FinancialOfferVersion {
    pub id: DbId,
    pub supplier_id: DbId,
    pub version_name: String,
    pub version_date: Timestamp,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A version joined with its supplier, for listings and comparisons.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OfferVersionWithSupplier {
    pub id: DbId,
    pub supplier_id: DbId,
    pub supplier_name: Option<String>,
    pub rfp_id: Option<DbId>,
    pub version_name: String,
    pub version_date: Timestamp,
    pub is_active: bool,
}

impl From<&OfferVersionWithSupplier> for VersionDescriptor {
    fn from(row: &OfferVersionWithSupplier) -> Self {
        Self {
            version_id: row.id,
            version_name: Some(row.version_name.clone()),
            supplier_id: row.supplier_id,
            supplier_name: row.supplier_name.clone(),
        }
    }
}

/// DTO for creating a new offer version.
///
/// `version_name` defaults to "Version N" and `version_date` to now.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOfferVersion {
    pub supplier_id: DbId,
    #[validate(length(max = 200))]
    pub version_name: Option<String>,
    pub version_date: Option<Timestamp>,
}
