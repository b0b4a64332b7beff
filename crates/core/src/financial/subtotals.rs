//! Bottom-up subtotal calculation over a built line tree.

use serde::Serialize;

use super::tree::LineNode;

/// Setup and annualized recurrent amounts for one node and its descendants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Subtotals {
    pub subtotal_setup: f64,
    pub subtotal_recurrent: f64,
}

impl std::ops::AddAssign for Subtotals {
    fn add_assign(&mut self, rhs: Self) {
        self.subtotal_setup += rhs.subtotal_setup;
        self.subtotal_recurrent += rhs.subtotal_recurrent;
    }
}

/// The node's own contribution, excluding children.
///
/// Setup is `setup_cost * quantity`. Recurrent is
/// `recurrent_cost * quantity`, times 12 for monthly lines. Duplicate values
/// on one line are summed; a line without values contributes zero.
pub fn own_contribution(node: &LineNode) -> Subtotals {
    let factor = node
        .line
        .recurrence_type
        .map_or(1.0, |r| r.annualization_factor());

    node.values.iter().fold(Subtotals::default(), |mut acc, v| {
        acc.subtotal_setup += v.setup_cost * v.quantity;
        acc.subtotal_recurrent += v.recurrent_cost * v.quantity * factor;
        acc
    })
}

/// Compute subtotals for `node` and every descendant, storing them on each
/// node and returning the node's own.
pub fn calculate_subtotals(node: &mut LineNode) -> Subtotals {
    let mut totals = own_contribution(node);
    for child in &mut node.children {
        totals += calculate_subtotals(child);
    }
    node.subtotal_setup = totals.subtotal_setup;
    node.subtotal_recurrent = totals.subtotal_recurrent;
    totals
}

/// Compute subtotals for every tree in a forest.
pub fn calculate_all_subtotals(roots: &mut [LineNode]) {
    for root in roots {
        calculate_subtotals(root);
    }
}
