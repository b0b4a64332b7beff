//! Route definitions for template lines.

use axum::routing::{post, put};
use axum::Router;

use crate::handlers::template_line;
use crate::state::AppState;

/// Routes mounted at `/financial-template-lines`.
///
/// ```text
/// POST   /       -> create
/// PUT    /{id}   -> update
/// DELETE /{id}   -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(template_line::create))
        .route("/{id}", put(template_line::update).delete(template_line::delete))
}
