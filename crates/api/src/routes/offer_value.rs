use axum::routing::post;
use axum::Router;

use crate::handlers::offer_value;
use crate::state::AppState;

/// Routes mounted at `/financial-offer-values`.
///
/// ```text
/// POST /batch   -> batch_upsert
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/batch", post(offer_value::batch_upsert))
}
