pub mod formula;
pub mod health;
pub mod offer_value;
pub mod offer_version;
pub mod rfp;
pub mod template_line;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /rfps/{rfp_id}/financial-template           get, create, update
/// /rfps/{rfp_id}/financial-summary            multi-version comparison
/// /rfps/{rfp_id}/financial-tree               single-version tree
/// /rfps/{rfp_id}/financial-offer-versions     list, create
///
/// /financial-template-lines                   create
/// /financial-template-lines/{id}              update, delete
///
/// /financial-offer-versions/{id}/values       list values of a version
/// /financial-offer-values/batch               batch upsert
///
/// /financial-formulas/evaluate                formula preview
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // RFP-scoped financial views and templates.
        .nest("/rfps", rfp::router())
        .nest("/financial-template-lines", template_line::router())
        .nest("/financial-offer-versions", offer_version::router())
        .nest("/financial-offer-values", offer_value::router())
        .nest("/financial-formulas", formula::router())
}
