//! Builders for engine inputs used across the financial test modules.

use super::model::{LineSpec, LineType, OfferEntry, RecurrenceType};
use crate::types::DbId;

pub fn setup_line(id: DbId, parent_id: Option<DbId>, sort_order: i32) -> LineSpec {
    LineSpec {
        id,
        parent_id,
        line_code: format!("L{id}"),
        name: format!("Line {id}"),
        line_type: LineType::Setup,
        recurrence_type: None,
        custom_formula: None,
        sort_order,
        is_active: true,
    }
}

pub fn recurrent_line(
    id: DbId,
    parent_id: Option<DbId>,
    sort_order: i32,
    recurrence: Option<RecurrenceType>,
) -> LineSpec {
    LineSpec {
        line_type: LineType::Recurrent,
        recurrence_type: recurrence,
        ..setup_line(id, parent_id, sort_order)
    }
}

pub fn entry(
    version_id: DbId,
    line_id: DbId,
    setup_cost: Option<f64>,
    recurrent_cost: Option<f64>,
    quantity: Option<f64>,
) -> OfferEntry {
    OfferEntry {
        version_id,
        template_line_id: line_id,
        setup_cost,
        recurrent_cost,
        quantity,
    }
}
