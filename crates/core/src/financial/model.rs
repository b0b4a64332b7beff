//! Line and offer-value types consumed by the financial engine.
//!
//! These are storage-agnostic: the db crate converts its rows into them.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Line types
// ---------------------------------------------------------------------------

pub const LINE_TYPE_SETUP: &str = "setup";
pub const LINE_TYPE_RECURRENT: &str = "recurrent";

/// All valid `line_type` values.
pub const VALID_LINE_TYPES: &[&str] = &[LINE_TYPE_SETUP, LINE_TYPE_RECURRENT];

pub const RECURRENCE_MONTHLY: &str = "monthly";
pub const RECURRENCE_YEARLY: &str = "yearly";

/// All valid `recurrence_type` values.
pub const VALID_RECURRENCE_TYPES: &[&str] = &[RECURRENCE_MONTHLY, RECURRENCE_YEARLY];

/// Months per year, used to annualize monthly recurrent costs.
pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Whether a line carries a one-time or a repeating cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineType {
    Setup,
    Recurrent,
}

impl LineType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Setup => LINE_TYPE_SETUP,
            Self::Recurrent => LINE_TYPE_RECURRENT,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            LINE_TYPE_SETUP => Some(Self::Setup),
            LINE_TYPE_RECURRENT => Some(Self::Recurrent),
            _ => None,
        }
    }
}

/// The period a recurrent cost is quoted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceType {
    Monthly,
    Yearly,
}

impl RecurrenceType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => RECURRENCE_MONTHLY,
            Self::Yearly => RECURRENCE_YEARLY,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            RECURRENCE_MONTHLY => Some(Self::Monthly),
            RECURRENCE_YEARLY => Some(Self::Yearly),
            _ => None,
        }
    }

    /// Multiplier that turns one period's cost into an annual figure.
    pub fn annualization_factor(self) -> f64 {
        match self {
            Self::Monthly => MONTHS_PER_YEAR,
            Self::Yearly => 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Engine inputs
// ---------------------------------------------------------------------------

/// One template line as the engine sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSpec {
    pub id: DbId,
    pub parent_id: Option<DbId>,
    pub line_code: String,
    pub name: String,
    pub line_type: LineType,
    pub recurrence_type: Option<RecurrenceType>,
    pub custom_formula: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
}

/// The monetary entry a supplier version holds for one line.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferEntry {
    pub version_id: DbId,
    pub template_line_id: DbId,
    pub setup_cost: Option<f64>,
    pub recurrent_cost: Option<f64>,
    pub quantity: Option<f64>,
}

/// An offer entry normalized for aggregation: missing costs are zero and a
/// missing quantity is one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineValue {
    pub setup_cost: f64,
    pub recurrent_cost: f64,
    pub quantity: f64,
}

impl From<&OfferEntry> for LineValue {
    fn from(entry: &OfferEntry) -> Self {
        Self {
            setup_cost: entry.setup_cost.unwrap_or(0.0),
            recurrent_cost: entry.recurrent_cost.unwrap_or(0.0),
            quantity: entry.quantity.unwrap_or(1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_type_round_trips_through_str() {
        for value in VALID_LINE_TYPES {
            assert_eq!(LineType::parse(value).unwrap().as_str(), *value);
        }
        assert_eq!(LineType::parse("Setup"), None);
    }

    #[test]
    fn recurrence_type_parse_rejects_unknown() {
        assert_eq!(RecurrenceType::parse("monthly"), Some(RecurrenceType::Monthly));
        assert_eq!(RecurrenceType::parse("weekly"), None);
        assert_eq!(RecurrenceType::parse(""), None);
    }

    #[test]
    fn monthly_annualizes_by_twelve() {
        assert_eq!(RecurrenceType::Monthly.annualization_factor(), 12.0);
        assert_eq!(RecurrenceType::Yearly.annualization_factor(), 1.0);
    }

    #[test]
    fn line_value_defaults_missing_fields() {
        let entry = OfferEntry {
            version_id: 1,
            template_line_id: 2,
            setup_cost: None,
            recurrent_cost: Some(40.0),
            quantity: None,
        };
        let value = LineValue::from(&entry);
        assert_eq!(value.setup_cost, 0.0);
        assert_eq!(value.recurrent_cost, 40.0);
        assert_eq!(value.quantity, 1.0);
    }

    #[test]
    fn line_value_keeps_explicit_zero_quantity() {
        let entry = OfferEntry {
            version_id: 1,
            template_line_id: 2,
            setup_cost: Some(10.0),
            recurrent_cost: None,
            quantity: Some(0.0),
        };
        assert_eq!(LineValue::from(&entry).quantity, 0.0);
    }
}
