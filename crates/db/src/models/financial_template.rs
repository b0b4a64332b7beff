//! Financial template entity model and DTOs.

use rfpeval_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `financial_templates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FinancialTemplate {
    pub id: DbId,
    pub rfp_id: DbId,
    pub name: String,
    pub total_period_years: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating the template of an RFP.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFinancialTemplate {
    #[validate(length(max = 200))]
    pub name: String,
    pub total_period_years: Option<i32>,
}

/// DTO for editing template metadata. All fields optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateFinancialTemplate {
    #[validate(length(max = 200))]
    pub name: Option<String>,
    pub total_period_years: Option<i32>,
}
