//! Handlers for the `/financial-template-lines` resource.
//!
//! Every write validates the line against its template before touching the
//! database: unique `line_code`, the recurrence/type pairing, and a parent
//! that exists in the same template without creating a cycle.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use rfpeval_core::error::CoreError;
use rfpeval_core::financial::validation::{
    next_sort_order, normalize_custom_formula, parse_line_type, resolve_recurrence,
    validate_line_code, validate_name, validate_parent_assignment,
};
use rfpeval_core::types::DbId;
use rfpeval_db::models::financial_template_line::{
    CreateTemplateLine, FinancialTemplateLine, TemplateLineFields, UpdateTemplateLine,
};
use rfpeval_db::repositories::{FinancialTemplateRepo, TemplateLineRepo};
use rfpeval_db::DbPool;
use serde::Serialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::{created, DataResponse};
use crate::state::AppState;

pub const DELETED_SOFT: &str = "soft";
pub const DELETED_HARD: &str = "hard";

/// Outcome of a line delete.
#[derive(Debug, Serialize)]
pub struct DeleteLineResult {
    pub id: DbId,
    /// `"soft"` when the subtree was deactivated, `"hard"` when the row was removed.
    pub deleted_type: &'static str,
    /// Number of lines affected (descendants included for a soft delete).
    pub affected: u64,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn line_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "FinancialTemplateLine",
        id,
    })
}

/// Load a prospective parent: it must exist (404), and belong to the same
/// template and be active (400).
async fn require_parent(
    pool: &DbPool,
    template_id: DbId,
    parent_id: DbId,
) -> AppResult<FinancialTemplateLine> {
    let parent = TemplateLineRepo::find_by_id(pool, parent_id)
        .await?
        .ok_or_else(|| line_not_found(parent_id))?;

    if parent.template_id != template_id {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Parent line {parent_id} belongs to a different template"
        ))));
    }
    if !parent.is_active {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Parent line {parent_id} is inactive"
        ))));
    }
    Ok(parent)
}

/// Fail with 409 if another line of the template already uses `line_code`.
async fn ensure_code_available(
    pool: &DbPool,
    template_id: DbId,
    line_code: &str,
    except_id: Option<DbId>,
) -> AppResult<()> {
    let clash = TemplateLineRepo::find_by_code(pool, template_id, line_code)
        .await?
        .filter(|line| Some(line.id) != except_id);

    if clash.is_some() {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "line_code '{line_code}' already exists in this template"
        ))));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/financial-template-lines
///
/// Add a line to a template. `sort_order` defaults to one past the highest
/// sibling.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateTemplateLine>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let template = FinancialTemplateRepo::find_by_id(&state.pool, input.template_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "FinancialTemplate",
            id: input.template_id,
        }))?;

    let line_code = validate_line_code(&input.line_code)?;
    let name = validate_name(&input.name, "Line name")?;
    let line_type = parse_line_type(&input.line_type)?;
    let recurrence_type = resolve_recurrence(line_type, input.recurrence_type.as_deref())?;
    let custom_formula = normalize_custom_formula(input.custom_formula.as_deref())?;

    if let Some(parent_id) = input.parent_id {
        require_parent(&state.pool, template.id, parent_id).await?;
    }
    ensure_code_available(&state.pool, template.id, &line_code, None).await?;

    let sort_order = match input.sort_order {
        Some(order) => order,
        None => next_sort_order(
            TemplateLineRepo::max_sibling_sort_order(&state.pool, template.id, input.parent_id)
                .await?,
        ),
    };

    let fields = TemplateLineFields {
        parent_id: input.parent_id,
        line_code,
        name,
        line_type,
        recurrence_type,
        custom_formula,
        sort_order,
    };
    let line = TemplateLineRepo::create(&state.pool, template.id, &fields).await?;

    tracing::info!(
        template_id = template.id,
        line_id = line.id,
        line_code = %line.line_code,
        "Template line created"
    );
    Ok(created(line))
}

/// PUT /api/v1/financial-template-lines/{id}
///
/// Partial update. An explicit `"parent_id": null` moves the line to the root.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTemplateLine>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let existing = TemplateLineRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| line_not_found(id))?;
    let mut fields = TemplateLineFields::from_row(&existing);

    if let Some(code) = &input.line_code {
        let code = validate_line_code(code)?;
        if code != existing.line_code {
            ensure_code_available(&state.pool, existing.template_id, &code, Some(id)).await?;
        }
        fields.line_code = code;
    }

    if let Some(name) = &input.name {
        fields.name = validate_name(name, "Line name")?;
    }

    // The pairing rule is checked against the final line type, with the
    // stored recurrence carried over unless the request replaces it.
    let line_type = match &input.line_type {
        Some(raw) => parse_line_type(raw)?,
        None => fields.line_type,
    };
    let recurrence = match &input.recurrence_type {
        Some(requested) => requested.clone(),
        None => existing.recurrence_type.clone(),
    };
    fields.recurrence_type = resolve_recurrence(line_type, recurrence.as_deref())?;
    fields.line_type = line_type;

    if let Some(formula) = &input.custom_formula {
        fields.custom_formula = normalize_custom_formula(formula.as_deref())?;
    }

    match input.parent_id {
        Some(Some(parent_id)) => {
            require_parent(&state.pool, existing.template_id, parent_id).await?;
            let parent_of: HashMap<DbId, Option<DbId>> =
                TemplateLineRepo::list_parent_links(&state.pool, existing.template_id)
                    .await?
                    .into_iter()
                    .collect();
            validate_parent_assignment(id, parent_id, &parent_of)?;
            fields.parent_id = Some(parent_id);
        }
        Some(None) => fields.parent_id = None,
        None => {}
    }

    if let Some(order) = input.sort_order {
        fields.sort_order = order;
    }

    let line = TemplateLineRepo::update(&state.pool, id, &fields)
        .await?
        .ok_or_else(|| line_not_found(id))?;

    tracing::info!(line_id = id, template_id = line.template_id, "Template line updated");
    Ok(Json(DataResponse { data: line }))
}

/// DELETE /api/v1/financial-template-lines/{id}
///
/// Soft-deletes the line and its subtree when it has active children or
/// recorded offer values; otherwise removes the row.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let line = TemplateLineRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| line_not_found(id))?;

    let keep_history = TemplateLineRepo::has_active_children(&state.pool, id).await?
        || TemplateLineRepo::has_values(&state.pool, id).await?;

    let result = if keep_history {
        let affected = TemplateLineRepo::deactivate_subtree(&state.pool, id).await?;
        DeleteLineResult {
            id,
            deleted_type: DELETED_SOFT,
            affected,
        }
    } else {
        if !TemplateLineRepo::delete(&state.pool, id).await? {
            return Err(line_not_found(id));
        }
        DeleteLineResult {
            id,
            deleted_type: DELETED_HARD,
            affected: 1,
        }
    };

    tracing::info!(
        line_id = id,
        template_id = line.template_id,
        deleted_type = result.deleted_type,
        affected = result.affected,
        "Template line deleted"
    );
    Ok(Json(DataResponse { data: result }))
}
