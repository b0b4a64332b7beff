//! Totals and total-cost-of-ownership.

use serde::Serialize;

use super::tree::LineNode;

/// TCO horizon used when nothing better is known.
pub const DEFAULT_TCO_PERIOD_YEARS: u32 = 3;

/// Horizons a template may declare as its default.
pub const VALID_TEMPLATE_PERIOD_YEARS: &[i32] = &[1, 3, 5];

/// Totals for one version's computed tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FinancialTotals {
    pub total_setup: f64,
    pub total_recurrent_annual: f64,
    pub tco: f64,
}

/// Reduce computed roots to totals.
///
/// Only roots are summed: their subtotals already include every descendant.
/// `tco = total_setup + total_recurrent_annual * period_years`.
pub fn calculate_totals(roots: &[LineNode], period_years: u32) -> FinancialTotals {
    let total_setup: f64 = roots.iter().map(|r| r.subtotal_setup).sum();
    let total_recurrent_annual: f64 = roots.iter().map(|r| r.subtotal_recurrent).sum();

    FinancialTotals {
        total_setup,
        total_recurrent_annual,
        tco: tco(total_setup, total_recurrent_annual, period_years),
    }
}

/// Total cost of ownership over `period_years`.
pub fn tco(total_setup: f64, total_recurrent_annual: f64, period_years: u32) -> f64 {
    total_setup + total_recurrent_annual * f64::from(period_years)
}

/// Resolve the TCO horizon for a request.
///
/// - A positive integer override wins.
/// - A present but invalid or non-positive override falls back to
///   [`DEFAULT_TCO_PERIOD_YEARS`].
/// - With no override, the template's `total_period_years` is used when it is
///   positive, else the default.
pub fn resolve_tco_period(requested: Option<&str>, template_default: Option<i32>) -> u32 {
    match requested.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => raw
            .parse::<i64>()
            .ok()
            .filter(|&years| years > 0)
            .and_then(|years| u32::try_from(years).ok())
            .unwrap_or(DEFAULT_TCO_PERIOD_YEARS),
        None => template_default
            .filter(|&years| years > 0)
            .and_then(|years| u32::try_from(years).ok())
            .unwrap_or(DEFAULT_TCO_PERIOD_YEARS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::financial::fixtures::{entry, recurrent_line, setup_line};
    use crate::financial::model::RecurrenceType;
    use crate::financial::subtotals::calculate_all_subtotals;
    use crate::financial::tree::build_line_tree;

    #[test]
    fn tco_formula() {
        assert_eq!(tco(1000.0, 500.0, 3), 2500.0);
        assert_eq!(tco(0.0, 0.0, 5), 0.0);
    }

    #[test]
    fn totals_sum_roots_without_double_counting() {
        let lines = vec![
            setup_line(1, None, 0),
            setup_line(2, Some(1), 0),
            setup_line(3, None, 1),
        ];
        let values = vec![
            entry(1, 1, Some(100.0), None, None),
            entry(1, 2, Some(50.0), None, None),
            entry(1, 3, Some(25.0), None, None),
        ];
        let mut tree = build_line_tree(&lines, Some(&values));
        calculate_all_subtotals(&mut tree.roots);

        let totals = calculate_totals(&tree.roots, 3);
        assert_eq!(totals.total_setup, 175.0);
    }

    #[test]
    fn scenario_tco_over_three_years() {
        let lines = vec![
            setup_line(1, None, 0),
            recurrent_line(2, Some(1), 0, Some(RecurrenceType::Monthly)),
        ];
        let values = vec![
            entry(1, 1, Some(1000.0), None, Some(1.0)),
            entry(1, 2, None, Some(50.0), Some(3.0)),
        ];
        let mut tree = build_line_tree(&lines, Some(&values));
        calculate_all_subtotals(&mut tree.roots);

        let totals = calculate_totals(&tree.roots, 3);
        assert_eq!(totals.total_setup, 1000.0);
        assert_eq!(totals.total_recurrent_annual, 1800.0);
        assert_eq!(totals.tco, 6400.0);
    }

    #[test]
    fn empty_forest_is_all_zero() {
        assert_eq!(calculate_totals(&[], 3), FinancialTotals::default());
    }

    #[test]
    fn period_override_wins_when_positive() {
        assert_eq!(resolve_tco_period(Some("5"), Some(1)), 5);
        assert_eq!(resolve_tco_period(Some(" 10 "), None), 10);
    }

    #[test]
    fn invalid_override_falls_back_to_default() {
        assert_eq!(resolve_tco_period(Some("0"), Some(5)), DEFAULT_TCO_PERIOD_YEARS);
        assert_eq!(resolve_tco_period(Some("-2"), Some(5)), DEFAULT_TCO_PERIOD_YEARS);
        assert_eq!(resolve_tco_period(Some("abc"), Some(5)), DEFAULT_TCO_PERIOD_YEARS);
    }

    #[test]
    fn missing_override_uses_template_default() {
        assert_eq!(resolve_tco_period(None, Some(5)), 5);
        assert_eq!(resolve_tco_period(Some(""), Some(1)), 1);
        assert_eq!(resolve_tco_period(None, None), DEFAULT_TCO_PERIOD_YEARS);
        assert_eq!(resolve_tco_period(None, Some(0)), DEFAULT_TCO_PERIOD_YEARS);
    }
}
