use axum::routing::post;
use axum::Router;

use crate::handlers::formula;
use crate::state::AppState;

/// Routes mounted at `/financial-formulas`.
///
/// ```text
/// POST /evaluate   -> evaluate
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/evaluate", post(formula::evaluate))
}
