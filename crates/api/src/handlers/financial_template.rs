//! Handlers for the financial template of an RFP.
//!
//! One template per RFP, mounted under `/rfps/{rfp_id}/financial-template`.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use rfpeval_core::error::CoreError;
use rfpeval_core::financial::validation::{validate_name, validate_period_years};
use rfpeval_core::types::DbId;
use rfpeval_db::models::financial_template::{
    CreateFinancialTemplate, FinancialTemplate, UpdateFinancialTemplate,
};
use rfpeval_db::models::financial_template_line::FinancialTemplateLine;
use rfpeval_db::models::rfp::Rfp;
use rfpeval_db::repositories::{FinancialTemplateRepo, RfpRepo, TemplateLineRepo};
use rfpeval_db::DbPool;
use serde::Serialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::{created, DataResponse};
use crate::state::AppState;

/// A template with its active lines. `template` is `null` until one exists.
#[derive(Debug, Serialize)]
pub struct TemplateWithLines {
    pub template: Option<FinancialTemplate>,
    pub lines: Vec<FinancialTemplateLine>,
}

// ---------------------------------------------------------------------------
// Shared lookups
// ---------------------------------------------------------------------------

/// Load an RFP or fail with 404.
pub(crate) async fn require_rfp(pool: &DbPool, rfp_id: DbId) -> AppResult<Rfp> {
    RfpRepo::find_by_id(pool, rfp_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Rfp",
            id: rfp_id,
        }))
}

/// Load the template of an RFP or fail with 404.
pub(crate) async fn require_template(pool: &DbPool, rfp_id: DbId) -> AppResult<FinancialTemplate> {
    FinancialTemplateRepo::find_by_rfp(pool, rfp_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "FinancialTemplate for Rfp",
            id: rfp_id,
        }))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/rfps/{rfp_id}/financial-template
///
/// Returns the template and its active lines ordered by `sort_order`.
/// An RFP without a template yields `{ template: null, lines: [] }`.
pub async fn get_template(
    State(state): State<AppState>,
    Path(rfp_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    require_rfp(&state.pool, rfp_id).await?;

    let template = FinancialTemplateRepo::find_by_rfp(&state.pool, rfp_id).await?;
    let lines = match &template {
        Some(t) => TemplateLineRepo::list_active(&state.pool, t.id).await?,
        None => Vec::new(),
    };

    Ok(Json(DataResponse {
        data: TemplateWithLines { template, lines },
    }))
}

/// POST /api/v1/rfps/{rfp_id}/financial-template
///
/// Create the RFP's template. Fails with 409 if one already exists.
pub async fn create_template(
    State(state): State<AppState>,
    Path(rfp_id): Path<DbId>,
    Json(input): Json<CreateFinancialTemplate>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    require_rfp(&state.pool, rfp_id).await?;

    let name = validate_name(&input.name, "Template name")?;
    if let Some(years) = input.total_period_years {
        validate_period_years(years)?;
    }

    if FinancialTemplateRepo::find_by_rfp(&state.pool, rfp_id)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "A financial template already exists for this RFP".to_string(),
        )));
    }

    let template = FinancialTemplateRepo::create(
        &state.pool,
        rfp_id,
        &CreateFinancialTemplate {
            name,
            total_period_years: input.total_period_years,
        },
    )
    .await?;

    tracing::info!(rfp_id, template_id = template.id, "Financial template created");
    Ok(created(template))
}

/// PUT /api/v1/rfps/{rfp_id}/financial-template
///
/// Edit template metadata (`name`, `total_period_years`).
pub async fn update_template(
    State(state): State<AppState>,
    Path(rfp_id): Path<DbId>,
    Json(input): Json<UpdateFinancialTemplate>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let existing = require_template(&state.pool, rfp_id).await?;

    let name = input
        .name
        .as_deref()
        .map(|n| validate_name(n, "Template name"))
        .transpose()?;
    if let Some(years) = input.total_period_years {
        validate_period_years(years)?;
    }

    let template = FinancialTemplateRepo::update(
        &state.pool,
        existing.id,
        &UpdateFinancialTemplate {
            name,
            total_period_years: input.total_period_years,
        },
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "FinancialTemplate",
        id: existing.id,
    }))?;

    tracing::info!(rfp_id, template_id = template.id, "Financial template updated");
    Ok(Json(DataResponse { data: template }))
}
