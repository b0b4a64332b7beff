//! Financial template line entity model and DTOs.
//!
//! Lines form a tree through `parent_id`. The row keeps `line_type` and
//! `recurrence_type` as text; [`FinancialTemplateLine::to_line_spec`] turns a
//! row into the typed form the engine works on.

use rfpeval_core::financial::model::{LineSpec, LineType, RecurrenceType};
use rfpeval_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::double_option;

/// A row from the `financial_template_lines` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FinancialTemplateLine {
    pub id: DbId,
    pub template_id: DbId,
    pub parent_id: Option<DbId>,
    pub line_code: String,
    pub name: String,
    pub line_type: String,
    pub recurrence_type: Option<String>,
    pub custom_formula: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl FinancialTemplateLine {
    /// Typed view of this row for the financial engine.
    ///
    /// The table's CHECK constraints restrict both columns to known values,
    /// so an unparseable `line_type` cannot occur for a stored row.
    pub fn to_line_spec(&self) -> LineSpec {
        LineSpec {
            id: self.id,
            parent_id: self.parent_id,
            line_code: self.line_code.clone(),
            name: self.name.clone(),
            line_type: LineType::parse(&self.line_type).unwrap_or(LineType::Setup),
            recurrence_type: self.recurrence_type.as_deref().and_then(RecurrenceType::parse),
            custom_formula: self.custom_formula.clone(),
            sort_order: self.sort_order,
            is_active: self.is_active,
        }
    }
}

/// DTO for adding a line to a template.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTemplateLine {
    pub template_id: DbId,
    pub parent_id: Option<DbId>,
    #[validate(length(max = 50))]
    pub line_code: String,
    #[validate(length(max = 200))]
    pub name: String,
    pub line_type: String,
    pub recurrence_type: Option<String>,
    #[validate(length(max = 500))]
    pub custom_formula: Option<String>,
    pub sort_order: Option<i32>,
}

/// DTO for updating a line. Omitted fields are left unchanged.
///
/// `parent_id`, `recurrence_type` and `custom_formula` accept an explicit
/// `null` to clear the value; a null `parent_id` moves the line to the root.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTemplateLine {
    #[validate(length(max = 50))]
    pub line_code: Option<String>,
    #[validate(length(max = 200))]
    pub name: Option<String>,
    pub line_type: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub recurrence_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub custom_formula: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub parent_id: Option<Option<DbId>>,
    pub sort_order: Option<i32>,
}

/// Fully resolved line fields, written as-is on insert and update.
///
/// Built by the API layer once every rule has been checked.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateLineFields {
    pub parent_id: Option<DbId>,
    pub line_code: String,
    pub name: String,
    pub line_type: LineType,
    pub recurrence_type: Option<RecurrenceType>,
    pub custom_formula: Option<String>,
    pub sort_order: i32,
}

impl TemplateLineFields {
    /// Start from a stored row, for applying a partial update.
    pub fn from_row(row: &FinancialTemplateLine) -> Self {
        let spec = row.to_line_spec();
        Self {
            parent_id: spec.parent_id,
            line_code: spec.line_code,
            name: spec.name,
            line_type: spec.line_type,
            recurrence_type: spec.recurrence_type,
            custom_formula: spec.custom_formula,
            sort_order: spec.sort_order,
        }
    }
}
