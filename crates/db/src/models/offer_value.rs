//! Financial offer value entity model and DTOs.

use rfpeval_core::financial::model::OfferEntry;
use rfpeval_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `financial_offer_values` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FinancialOfferValue {
    pub id: DbId,
    pub version_id: DbId,
    pub template_line_id: DbId,
    pub setup_cost: Option<f64>,
    pub recurrent_cost: Option<f64>,
    pub quantity: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&FinancialOfferValue> for OfferEntry {
    fn from(row: &FinancialOfferValue) -> Self {
        Self {
            version_id: row.version_id,
            template_line_id: row.template_line_id,
            setup_cost: row.setup_cost,
            recurrent_cost: row.recurrent_cost,
            quantity: row.quantity,
        }
    }
}

/// One line's costs within a batch upsert.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OfferValueInput {
    pub template_line_id: DbId,
    #[validate(range(min = 0.0))]
    pub setup_cost: Option<f64>,
    #[validate(range(min = 0.0))]
    pub recurrent_cost: Option<f64>,
    #[validate(range(min = 0.0))]
    pub quantity: Option<f64>,
}

/// Batch of values for one version, upserted together.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BatchOfferValues {
    pub version_id: DbId,
    #[validate(length(min = 1, message = "values must not be empty"))]
    #[validate(nested)]
    pub values: Vec<OfferValueInput>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(setup: Option<f64>, quantity: Option<f64>) -> OfferValueInput {
        OfferValueInput {
            template_line_id: 1,
            setup_cost: setup,
            recurrent_cost: None,
            quantity,
        }
    }

    #[test]
    fn negative_costs_fail_validation() {
        assert!(input(Some(10.0), Some(0.0)).validate().is_ok());
        assert!(input(Some(-1.0), None).validate().is_err());
        assert!(input(None, Some(-0.5)).validate().is_err());
    }

    #[test]
    fn empty_batch_fails_validation() {
        let batch = BatchOfferValues { version_id: 1, values: vec![] };
        assert!(batch.validate().is_err());
    }

    #[test]
    fn batch_validates_each_entry() {
        let batch = BatchOfferValues {
            version_id: 1,
            values: vec![input(Some(1.0), None), input(Some(-5.0), None)],
        };
        assert!(batch.validate().is_err());
    }
}
