//! Route definitions for offer versions.

use axum::routing::get;
use axum::Router;

use crate::handlers::offer_version;
use crate::state::AppState;

/// Routes mounted at `/financial-offer-versions`.
///
/// ```text
/// GET /{id}/values   -> list_values
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/values", get(offer_version::list_values))
}
