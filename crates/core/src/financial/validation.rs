//! Input validation for templates, lines and offer versions.
//!
//! These run at the request boundary, before anything is written and before
//! the pure engine sees the data.

use std::collections::{HashMap, HashSet};

use super::formula::validate_custom_formula;
use super::model::{LineType, RecurrenceType, VALID_LINE_TYPES, VALID_RECURRENCE_TYPES};
use super::totals::VALID_TEMPLATE_PERIOD_YEARS;
use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Maximum length of a template or line name.
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum length of a `line_code`.
pub const MAX_LINE_CODE_LENGTH: usize = 50;

/// Maximum number of version ids accepted in one comparison request.
pub const DEFAULT_MAX_COMPARE_VERSIONS: usize = 20;

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// Trim and validate a required name. Returns the trimmed value.
pub fn validate_name(name: &str, field: &str) -> Result<String, CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "{field} exceeds maximum length of {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// A template's default TCO horizon must be 1, 3 or 5 years.
pub fn validate_period_years(years: i32) -> Result<(), CoreError> {
    if VALID_TEMPLATE_PERIOD_YEARS.contains(&years) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "total_period_years must be 1, 3, or 5 (got {years})"
        )))
    }
}

// ---------------------------------------------------------------------------
// Lines
// ---------------------------------------------------------------------------

/// Trim and validate a line code. Returns the trimmed value.
pub fn validate_line_code(code: &str) -> Result<String, CoreError> {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("line_code is required".to_string()));
    }
    if trimmed.chars().count() > MAX_LINE_CODE_LENGTH {
        return Err(CoreError::Validation(format!(
            "line_code exceeds maximum length of {MAX_LINE_CODE_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

pub fn parse_line_type(value: &str) -> Result<LineType, CoreError> {
    LineType::parse(value).ok_or_else(|| {
        CoreError::Validation(format!(
            "Invalid line_type '{value}'. Must be one of: {}",
            VALID_LINE_TYPES.join(", ")
        ))
    })
}

/// Apply the recurrence pairing rule.
///
/// Recurrent lines need a valid `recurrence_type`. Setup lines never carry
/// one: any value given is dropped.
pub fn resolve_recurrence(
    line_type: LineType,
    recurrence_type: Option<&str>,
) -> Result<Option<RecurrenceType>, CoreError> {
    match line_type {
        LineType::Setup => Ok(None),
        LineType::Recurrent => recurrence_type
            .and_then(RecurrenceType::parse)
            .map(Some)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "recurrence_type must be one of: {} for recurrent lines",
                    VALID_RECURRENCE_TYPES.join(", ")
                ))
            }),
    }
}

/// Normalize an optional formula: blank becomes `None`, anything else must
/// validate.
pub fn normalize_custom_formula(formula: Option<&str>) -> Result<Option<String>, CoreError> {
    match formula.map(str::trim).filter(|f| !f.is_empty()) {
        None => Ok(None),
        Some(f) => {
            validate_custom_formula(f)?;
            Ok(Some(f.to_string()))
        }
    }
}

/// Sort order for a new line placed after its current siblings.
pub fn next_sort_order(max_sibling_sort_order: Option<i32>) -> i32 {
    max_sibling_sort_order.map_or(0, |max| max.saturating_add(1))
}

/// Check that moving `line_id` under `new_parent_id` keeps the tree acyclic.
///
/// `parent_of` maps every line of the template to its current parent.
pub fn validate_parent_assignment(
    line_id: DbId,
    new_parent_id: DbId,
    parent_of: &HashMap<DbId, Option<DbId>>,
) -> Result<(), CoreError> {
    if line_id == new_parent_id {
        return Err(CoreError::Validation(
            "parent_id cannot reference the line itself".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    let mut current = Some(new_parent_id);
    while let Some(id) = current {
        if id == line_id {
            return Err(CoreError::Validation(
                "Cannot set parent_id to a descendant line (would create a cycle)".to_string(),
            ));
        }
        if !seen.insert(id) {
            break;
        }
        current = parent_of.get(&id).copied().flatten();
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Versions
// ---------------------------------------------------------------------------

/// Name given to a version created without one.
pub fn default_version_name(existing_versions: i64) -> String {
    format!("Version {}", existing_versions.max(0) + 1)
}

/// Parse a comma-separated id list, dropping blanks and repeats but keeping
/// first-seen order.
pub fn parse_version_ids(raw: &str, max: usize) -> Result<Vec<DbId>, CoreError> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let id = part
            .parse::<DbId>()
            .map_err(|_| CoreError::Validation(format!("Invalid version id '{part}'")))?;
        if seen.insert(id) {
            ids.push(id);
        }
    }
    if ids.len() > max {
        return Err(CoreError::Validation(format!(
            "At most {max} versions can be compared at once (got {})",
            ids.len()
        )));
    }
    Ok(ids)
}
