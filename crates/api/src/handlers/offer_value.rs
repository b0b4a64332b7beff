//! Handlers for offer values.

use std::collections::HashSet;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use rfpeval_core::error::CoreError;
use rfpeval_core::types::DbId;
use rfpeval_db::models::offer_value::{BatchOfferValues, FinancialOfferValue};
use rfpeval_db::repositories::{FinancialTemplateRepo, OfferValueRepo, TemplateLineRepo};
use serde::Serialize;
use validator::Validate;

use super::offer_version::require_version;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Rows written by a batch upsert.
#[derive(Debug, Serialize)]
pub struct BatchUpsertResult {
    pub values: Vec<FinancialOfferValue>,
    pub count: usize,
}

/// POST /api/v1/financial-offer-values/batch
///
/// Upsert one version's values in a single transaction. Every line must
/// be an active line of the template of the version's RFP: an unknown line
/// is 404 and a soft-deleted one is 400.
pub async fn batch_upsert(
    State(state): State<AppState>,
    Json(input): Json<BatchOfferValues>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let version = require_version(&state.pool, input.version_id).await?;
    let rfp_id = version.rfp_id.ok_or_else(|| {
        AppError::InternalError(format!("Offer version {} has no supplier", version.id))
    })?;
    let template = FinancialTemplateRepo::find_by_rfp(&state.pool, rfp_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(
                "The RFP has no financial template".to_string(),
            ))
        })?;

    let active: HashSet<DbId> = TemplateLineRepo::list_active(&state.pool, template.id)
        .await?
        .iter()
        .map(|line| line.id)
        .collect();
    let unknown_or_inactive = input
        .values
        .iter()
        .map(|v| v.template_line_id)
        .find(|id| !active.contains(id));

    if let Some(line_id) = unknown_or_inactive {
        let in_template = TemplateLineRepo::find_by_id(&state.pool, line_id)
            .await?
            .is_some_and(|line| line.template_id == template.id);
        return Err(if in_template {
            AppError::Core(CoreError::Validation(format!(
                "Template line {line_id} is inactive"
            )))
        } else {
            AppError::Core(CoreError::NotFound {
                entity: "FinancialTemplateLine",
                id: line_id,
            })
        });
    }

    let values = OfferValueRepo::bulk_upsert(&state.pool, version.id, &input.values).await?;

    tracing::info!(
        version_id = version.id,
        count = values.len(),
        "Offer values saved"
    );
    Ok(Json(DataResponse {
        data: BatchUpsertResult {
            count: values.len(),
            values,
        },
    }))
}
