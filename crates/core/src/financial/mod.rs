//! Hierarchical financial aggregation engine.
//!
//! A template's cost lines form a forest. Each offer version attaches its
//! own monetary values to that forest; the engine then rolls values up to
//! per-line subtotals, reduces the roots to totals and TCO, and lines
//! several versions up side by side.
//!
//! Pipeline: [`tree::LineIndex`] -> [`subtotals::calculate_all_subtotals`]
//! -> [`totals::calculate_totals`], driven per version by
//! [`comparison::compare_versions`].

pub mod comparison;
pub mod formula;
pub mod model;
pub mod subtotals;
pub mod totals;
pub mod tree;
pub mod validation;

#[cfg(test)]
pub(crate) mod fixtures;
