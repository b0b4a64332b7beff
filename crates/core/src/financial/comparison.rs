//! Multi-version comparison.
//!
//! Runs the build -> subtotal -> totals pipeline once per offer version over
//! a shared line index and assembles one summary row per version.

use std::collections::HashMap;

use serde::Serialize;

use super::model::{LineSpec, OfferEntry};
use super::subtotals::calculate_all_subtotals;
use super::totals::calculate_totals;
use super::tree::{LineIndex, TreeDiagnostic};
use crate::error::CoreError;
use crate::types::DbId;

/// Display name used when a version's supplier could not be resolved.
pub const UNKNOWN_SUPPLIER_NAME: &str = "Unknown";

pub const SORT_REQUESTED: &str = "requested";
pub const SORT_TCO: &str = "tco";
pub const SORT_SETUP: &str = "setup";
pub const SORT_RECURRENT: &str = "recurrent";

/// All accepted `sort` values.
pub const VALID_SORTS: &[&str] = &[SORT_REQUESTED, SORT_TCO, SORT_SETUP, SORT_RECURRENT];

/// The identity of a version taking part in a comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionDescriptor {
    pub version_id: DbId,
    pub version_name: Option<String>,
    pub supplier_id: DbId,
    pub supplier_name: Option<String>,
}

/// One row of the comparison table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionSummary {
    pub supplier_id: DbId,
    pub supplier_name: String,
    pub version_id: DbId,
    pub version_name: Option<String>,
    pub total_setup: f64,
    pub total_recurrent_annual: f64,
    pub tco: f64,
    /// 1 for the lowest TCO; equal TCOs share a rank.
    pub tco_rank: usize,
}

/// Comparison output.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Comparison {
    pub period_years: u32,
    pub summary: Vec<VersionSummary>,
    pub diagnostics: Vec<TreeDiagnostic>,
}

/// Order of the summary rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SummarySort {
    /// Keep the caller's version order.
    #[default]
    Requested,
    Tco,
    Setup,
    Recurrent,
}

impl SummarySort {
    /// Parse a `sort` query value. Absent means [`SummarySort::Requested`].
    pub fn parse(value: Option<&str>) -> Result<Self, CoreError> {
        match value.map(str::trim) {
            None | Some("") | Some(SORT_REQUESTED) => Ok(Self::Requested),
            Some(SORT_TCO) => Ok(Self::Tco),
            Some(SORT_SETUP) => Ok(Self::Setup),
            Some(SORT_RECURRENT) => Ok(Self::Recurrent),
            Some(other) => Err(CoreError::Validation(format!(
                "Invalid sort '{other}'. Must be one of: {}",
                VALID_SORTS.join(", ")
            ))),
        }
    }
}

/// Compare `versions` over the template `lines`.
///
/// `values` may hold entries for every requested version at once; each
/// version only sees its own. A version with no values still gets a row, with
/// all-zero totals.
pub fn compare_versions(
    lines: &[LineSpec],
    versions: &[VersionDescriptor],
    values: &[OfferEntry],
    period_years: u32,
    sort: SummarySort,
) -> Comparison {
    let index = LineIndex::new(lines.iter().cloned());

    let mut by_version: HashMap<DbId, Vec<OfferEntry>> = HashMap::new();
    for entry in values {
        by_version
            .entry(entry.version_id)
            .or_default()
            .push(entry.clone());
    }

    let mut diagnostics = index.diagnostics().to_vec();
    let mut summary: Vec<VersionSummary> = versions
        .iter()
        .map(|version| {
            let own = by_version
                .get(&version.version_id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let mut tree = index.build(own);
            calculate_all_subtotals(&mut tree.roots);
            let totals = calculate_totals(&tree.roots, period_years);
            diagnostics.extend(tree.diagnostics.into_iter().filter(|d| d.is_value_level()));

            VersionSummary {
                supplier_id: version.supplier_id,
                supplier_name: version
                    .supplier_name
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_SUPPLIER_NAME.to_string()),
                version_id: version.version_id,
                version_name: version.version_name.clone(),
                total_setup: totals.total_setup,
                total_recurrent_annual: totals.total_recurrent_annual,
                tco: totals.tco,
                tco_rank: 0,
            }
        })
        .collect();

    assign_tco_ranks(&mut summary);
    sort_summaries(&mut summary, sort);

    Comparison {
        period_years,
        summary,
        diagnostics,
    }
}

fn assign_tco_ranks(summary: &mut [VersionSummary]) {
    let tcos: Vec<f64> = summary.iter().map(|s| s.tco).collect();
    for row in summary.iter_mut() {
        row.tco_rank = 1 + tcos.iter().filter(|&&other| other < row.tco).count();
    }
}

/// Sort ascending by the chosen figure. The sort is stable, so ties keep the
/// requested order.
pub fn sort_summaries(summary: &mut [VersionSummary], sort: SummarySort) {
    match sort {
        SummarySort::Requested => {}
        SummarySort::Tco => summary.sort_by(|a, b| a.tco.total_cmp(&b.tco)),
        SummarySort::Setup => summary.sort_by(|a, b| a.total_setup.total_cmp(&b.total_setup)),
        SummarySort::Recurrent => summary.sort_by(|a, b| {
            a.total_recurrent_annual
                .total_cmp(&b.total_recurrent_annual)
        }),
    }
}
