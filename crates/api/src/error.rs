use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rfpeval_core::error::CoreError;
use serde::Serialize;

/// Error type returned by every handler.
///
/// Domain failures arrive as [`CoreError`]; database failures are classified
/// by SQLSTATE and constraint name so schema rules surface as 400/409 rather
/// than 500.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

/// DTO rule violations are reported like any other validation error.
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Core(CoreError::Validation(errors.to_string()))
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

/// Status, machine-readable code and message for one error.
struct Classified {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl Classified {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "An internal error occurred",
        )
    }
}

impl AppError {
    fn classify(&self) -> Classified {
        match self {
            AppError::Core(CoreError::NotFound { entity, id }) => Classified::new(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{entity} with id {id} not found"),
            ),
            AppError::Core(CoreError::Validation(msg)) => {
                Classified::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Core(CoreError::Conflict(msg)) => {
                Classified::new(StatusCode::CONFLICT, "CONFLICT", msg.clone())
            }
            AppError::Database(err) => classify_sqlx_error(err),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                Classified::internal()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let Classified {
            status,
            code,
            message,
        } = self.classify();
        (
            status,
            Json(ErrorBody {
                error: message,
                code,
            }),
        )
            .into_response()
    }
}

/// Readable message for the named constraints of the financial schema.
fn constraint_message(constraint: &str) -> String {
    match constraint {
        "uq_financial_templates_rfp_id" => "This RFP already has a financial template".to_string(),
        "uq_financial_template_lines_template_code" => {
            "line_code already exists in this template".to_string()
        }
        "uq_financial_offer_values_version_line" => {
            "The version already holds a value for this line".to_string()
        }
        "ck_financial_templates_period" => "total_period_years must be 1, 3 or 5".to_string(),
        "ck_financial_template_lines_line_type" => {
            "line_type must be 'setup' or 'recurrent'".to_string()
        }
        "ck_financial_template_lines_recurrence" => {
            "recurrence_type is required for recurrent lines and not allowed otherwise"
                .to_string()
        }
        "ck_financial_offer_values_non_negative" => {
            "Costs and quantity must not be negative".to_string()
        }
        other => format!("Value violates constraint: {other}"),
    }
}

/// Map a sqlx error by SQLSTATE:
///
/// - `RowNotFound` is 404.
/// - 23505 on a `uq_` constraint is 409.
/// - 23514 on a `ck_` constraint is 400.
/// - 23503 (a referenced row vanished) is 404.
/// - Anything else is 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> Classified {
    let sqlx::Error::Database(db_err) = err else {
        if matches!(err, sqlx::Error::RowNotFound) {
            return Classified::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Resource not found");
        }
        tracing::error!(error = %err, "Database error");
        return Classified::internal();
    };

    let constraint = db_err.constraint().unwrap_or("unknown");
    match db_err.code().as_deref() {
        Some("23505") if constraint.starts_with("uq_") => Classified::new(
            StatusCode::CONFLICT,
            "CONFLICT",
            constraint_message(constraint),
        ),
        Some("23514") if constraint.starts_with("ck_") => Classified::new(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            constraint_message(constraint),
        ),
        Some("23503") => Classified::new(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "A referenced record no longer exists",
        ),
        _ => {
            tracing::error!(error = %db_err, constraint, "Database error");
            Classified::internal()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_map_to_statuses() {
        let cases = [
            (
                AppError::Core(CoreError::NotFound {
                    entity: "FinancialTemplate",
                    id: 1,
                }),
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
            ),
            (
                AppError::Core(CoreError::Validation("bad".into())),
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
            ),
            (
                AppError::Core(CoreError::Conflict("dup".into())),
                StatusCode::CONFLICT,
                "CONFLICT",
            ),
            (
                AppError::InternalError("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
            (
                AppError::Database(sqlx::Error::RowNotFound),
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
            ),
        ];
        for (err, status, code) in cases {
            let classified = err.classify();
            assert_eq!(classified.status, status);
            assert_eq!(classified.code, code);
        }
    }

    #[test]
    fn internal_messages_are_not_leaked() {
        let classified = AppError::InternalError("secret detail".into()).classify();
        assert_eq!(classified.message, "An internal error occurred");
    }

    #[test]
    fn known_constraints_get_readable_messages() {
        assert_eq!(
            constraint_message("uq_financial_templates_rfp_id"),
            "This RFP already has a financial template"
        );
        assert!(constraint_message("ck_other").contains("ck_other"));
    }
}
