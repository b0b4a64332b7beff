//! Route definitions for RFP-scoped financial resources.

use axum::routing::get;
use axum::Router;

use crate::handlers::{financial_summary, financial_template, offer_version};
use crate::state::AppState;

/// Routes mounted at `/rfps`.
///
/// ```text
/// GET  /{rfp_id}/financial-template         -> get_template
/// POST /{rfp_id}/financial-template         -> create_template
/// PUT  /{rfp_id}/financial-template         -> update_template
/// GET  /{rfp_id}/financial-summary          -> get_summary
/// GET  /{rfp_id}/financial-tree             -> get_tree
/// GET  /{rfp_id}/financial-offer-versions   -> list_by_rfp
/// POST /{rfp_id}/financial-offer-versions   -> create
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{rfp_id}/financial-template",
            get(financial_template::get_template)
                .post(financial_template::create_template)
                .put(financial_template::update_template),
        )
        .route(
            "/{rfp_id}/financial-summary",
            get(financial_summary::get_summary),
        )
        .route("/{rfp_id}/financial-tree", get(financial_summary::get_tree))
        .route(
            "/{rfp_id}/financial-offer-versions",
            get(offer_version::list_by_rfp).post(offer_version::create),
        )
}
