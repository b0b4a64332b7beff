//! Formula preview for the line editor.

use axum::response::IntoResponse;
use axum::Json;
use rfpeval_core::financial::formula::{try_evaluate_formula, FormulaVariables};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::response::DataResponse;

#[derive(Debug, Deserialize)]
pub struct EvaluateFormulaRequest {
    pub formula: String,
    #[serde(default)]
    pub variables: FormulaVariables,
}

/// `result` is `0` whenever the formula cannot be evaluated; `error` then
/// says why.
#[derive(Debug, Serialize)]
pub struct EvaluateFormulaResponse {
    pub result: f64,
    pub error: Option<String>,
}

/// POST /api/v1/financial-formulas/evaluate
///
/// Never fails on a bad formula.
pub async fn evaluate(Json(input): Json<EvaluateFormulaRequest>) -> AppResult<impl IntoResponse> {
    let response = match try_evaluate_formula(&input.formula, &input.variables) {
        Ok(result) => EvaluateFormulaResponse {
            result,
            error: None,
        },
        Err(err) => {
            tracing::debug!(formula = %input.formula, error = %err, "Formula evaluation failed");
            EvaluateFormulaResponse {
                result: 0.0,
                error: Some(err.to_string()),
            }
        }
    };
    Ok(Json(DataResponse { data: response }))
}
