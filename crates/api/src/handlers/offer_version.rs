//! Handlers for supplier offer versions.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use rfpeval_core::error::CoreError;
use rfpeval_core::financial::validation::default_version_name;
use rfpeval_core::types::DbId;
use rfpeval_db::models::offer_version::{CreateOfferVersion, OfferVersionWithSupplier};
use rfpeval_db::repositories::{OfferValueRepo, OfferVersionRepo, SupplierRepo};
use rfpeval_db::DbPool;
use validator::Validate;

use super::financial_template::require_rfp;
use crate::error::{AppError, AppResult};
use crate::response::{created, DataResponse};
use crate::state::AppState;

/// Load a version with its supplier or fail with 404.
pub(crate) async fn require_version(
    pool: &DbPool,
    version_id: DbId,
) -> AppResult<OfferVersionWithSupplier> {
    OfferVersionRepo::find_with_supplier(pool, version_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "FinancialOfferVersion",
            id: version_id,
        }))
}

/// GET /api/v1/rfps/{rfp_id}/financial-offer-versions
///
/// Active versions of the RFP's suppliers, newest first.
pub async fn list_by_rfp(
    State(state): State<AppState>,
    Path(rfp_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    require_rfp(&state.pool, rfp_id).await?;
    let versions = OfferVersionRepo::list_active_for_rfp(&state.pool, rfp_id).await?;
    Ok(Json(DataResponse { data: versions }))
}

/// POST /api/v1/rfps/{rfp_id}/financial-offer-versions
///
/// Create a version for one of the RFP's suppliers. Without a
/// `version_name` the version is called "Version N".
pub async fn create(
    State(state): State<AppState>,
    Path(rfp_id): Path<DbId>,
    Json(input): Json<CreateOfferVersion>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    require_rfp(&state.pool, rfp_id).await?;

    let supplier = SupplierRepo::find_by_id(&state.pool, input.supplier_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Supplier",
            id: input.supplier_id,
        }))?;
    if supplier.rfp_id != rfp_id {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Supplier {} is not part of this RFP",
            supplier.id
        ))));
    }

    let version_name = match input
        .version_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
    {
        Some(name) => name.to_string(),
        None => default_version_name(
            OfferVersionRepo::count_for_supplier(&state.pool, supplier.id).await?,
        ),
    };

    let version =
        OfferVersionRepo::create(&state.pool, supplier.id, &version_name, input.version_date)
            .await?;

    tracing::info!(
        rfp_id,
        supplier_id = supplier.id,
        version_id = version.id,
        version_name = %version.version_name,
        "Offer version created"
    );
    Ok(created(version))
}

/// GET /api/v1/financial-offer-versions/{id}/values
pub async fn list_values(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    require_version(&state.pool, id).await?;
    let values = OfferValueRepo::list_for_version(&state.pool, id).await?;
    Ok(Json(DataResponse { data: values }))
}
