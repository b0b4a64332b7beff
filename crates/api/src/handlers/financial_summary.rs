//! Financial read views: the multi-version comparison and the single-version
//! tree.
//!
//! Both load the template's active lines and the needed offer values, then
//! hand them to the pure engine in `rfpeval_core::financial`. Data-integrity
//! diagnostics from the engine are logged and returned alongside the figures.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use rfpeval_core::error::CoreError;
use rfpeval_core::financial::comparison::{
    compare_versions, Comparison, SummarySort, VersionDescriptor,
};
use rfpeval_core::financial::model::{LineSpec, OfferEntry};
use rfpeval_core::financial::subtotals::calculate_all_subtotals;
use rfpeval_core::financial::totals::{calculate_totals, resolve_tco_period, FinancialTotals};
use rfpeval_core::financial::tree::{build_line_tree, flatten_line_tree, FlatLine, TreeDiagnostic};
use rfpeval_core::financial::validation::parse_version_ids;
use rfpeval_core::types::DbId;
use rfpeval_db::models::financial_template::FinancialTemplate;
use rfpeval_db::repositories::{
    FinancialTemplateRepo, OfferValueRepo, OfferVersionRepo, TemplateLineRepo,
};
use rfpeval_db::DbPool;
use serde::Serialize;

use super::financial_template::require_rfp;
use super::offer_version::require_version;
use crate::error::{AppError, AppResult};
use crate::query::{SummaryParams, TreeParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// Single-version view: the flattened tree with per-line subtotals.
#[derive(Debug, Serialize)]
pub struct FinancialTree {
    pub template_id: Option<DbId>,
    pub version_id: Option<DbId>,
    pub period_years: u32,
    pub lines: Vec<FlatLine>,
    pub totals: FinancialTotals,
    pub diagnostics: Vec<TreeDiagnostic>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_line_specs(
    pool: &DbPool,
    template: Option<&FinancialTemplate>,
) -> AppResult<Vec<LineSpec>> {
    let Some(template) = template else {
        return Ok(Vec::new());
    };
    let rows = TemplateLineRepo::list_active(pool, template.id).await?;
    Ok(rows.iter().map(|row| row.to_line_spec()).collect())
}

fn log_diagnostics(rfp_id: DbId, diagnostics: &[TreeDiagnostic]) {
    for diagnostic in diagnostics {
        tracing::warn!(rfp_id, diagnostic = ?diagnostic, "{}", diagnostic.message());
    }
}

fn version_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "FinancialOfferVersion",
        id,
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/rfps/{rfp_id}/financial-summary?version_ids=1,2&tco_period=3&sort=tco
///
/// One summary row per requested version, in the requested order unless
/// `sort` says otherwise. Without `version_ids` the summary is empty.
/// Unknown versions, and versions of another RFP's suppliers, are 404.
pub async fn get_summary(
    State(state): State<AppState>,
    Path(rfp_id): Path<DbId>,
    Query(params): Query<SummaryParams>,
) -> AppResult<impl IntoResponse> {
    require_rfp(&state.pool, rfp_id).await?;

    let template = FinancialTemplateRepo::find_by_rfp(&state.pool, rfp_id).await?;
    let period_years = resolve_tco_period(
        params.tco_period.as_deref(),
        template.as_ref().map(|t| t.total_period_years),
    );
    let sort = SummarySort::parse(params.sort.as_deref())?;
    let version_ids = parse_version_ids(
        params.version_ids.as_deref().unwrap_or_default(),
        state.config.max_compare_versions,
    )?;

    if version_ids.is_empty() {
        return Ok(Json(DataResponse {
            data: Comparison {
                period_years,
                ..Comparison::default()
            },
        }));
    }

    let found: HashMap<DbId, VersionDescriptor> =
        OfferVersionRepo::find_with_supplier_by_ids(&state.pool, &version_ids)
            .await?
            .iter()
            .filter(|row| row.rfp_id == Some(rfp_id))
            .map(|row| (row.id, VersionDescriptor::from(row)))
            .collect();
    let versions = version_ids
        .iter()
        .map(|id| found.get(id).cloned().ok_or_else(|| version_not_found(*id)))
        .collect::<AppResult<Vec<_>>>()?;

    let lines = load_line_specs(&state.pool, template.as_ref()).await?;
    let values: Vec<OfferEntry> = OfferValueRepo::list_for_versions(&state.pool, &version_ids)
        .await?
        .iter()
        .map(OfferEntry::from)
        .collect();

    let comparison = compare_versions(&lines, &versions, &values, period_years, sort);
    log_diagnostics(rfp_id, &comparison.diagnostics);

    tracing::debug!(
        rfp_id,
        versions = versions.len(),
        lines = lines.len(),
        period_years,
        "Financial summary computed"
    );
    Ok(Json(DataResponse { data: comparison }))
}

/// GET /api/v1/rfps/{rfp_id}/financial-tree?version_id=4&tco_period=3
///
/// The template as a flattened tree with one version's values and
/// subtotals. Without `version_id` every figure is zero.
pub async fn get_tree(
    State(state): State<AppState>,
    Path(rfp_id): Path<DbId>,
    Query(params): Query<TreeParams>,
) -> AppResult<impl IntoResponse> {
    require_rfp(&state.pool, rfp_id).await?;

    let template = FinancialTemplateRepo::find_by_rfp(&state.pool, rfp_id).await?;
    let period_years = resolve_tco_period(
        params.tco_period.as_deref(),
        template.as_ref().map(|t| t.total_period_years),
    );

    let values: Option<Vec<OfferEntry>> = match params.version_id {
        Some(version_id) => {
            let version = require_version(&state.pool, version_id).await?;
            if version.rfp_id != Some(rfp_id) {
                return Err(version_not_found(version_id));
            }
            let rows = OfferValueRepo::list_for_version(&state.pool, version_id).await?;
            Some(rows.iter().map(OfferEntry::from).collect())
        }
        None => None,
    };

    let lines = load_line_specs(&state.pool, template.as_ref()).await?;
    let mut tree = build_line_tree(&lines, values.as_deref());
    calculate_all_subtotals(&mut tree.roots);
    let totals = calculate_totals(&tree.roots, period_years);
    log_diagnostics(rfp_id, &tree.diagnostics);

    Ok(Json(DataResponse {
        data: FinancialTree {
            template_id: template.map(|t| t.id),
            version_id: params.version_id,
            period_years,
            lines: flatten_line_tree(&tree.roots),
            totals,
            diagnostics: tree.diagnostics,
        },
    }))
}
