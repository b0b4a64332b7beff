//! Repository for the `financial_offer_versions` table.

use rfpeval_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::offer_version::{FinancialOfferVersion, OfferVersionWithSupplier};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, supplier_id, version_name, version_date, is_active, created_at, updated_at";

/// Columns for a version joined with its supplier (`v` / `s` aliases).
const JOINED_COLUMNS: &str = "v.id, v.supplier_id, s.name AS supplier_name, s.rfp_id, \
    v.version_name, v.version_date, v.is_active";

/// Provides data access for offer versions.
pub struct OfferVersionRepo;

impl OfferVersionRepo {
    /// Insert a new version. `version_date` defaults to now.
    pub async fn create(
        pool: &PgPool,
        supplier_id: DbId,
        version_name: &str,
        version_date: Option<Timestamp>,
    ) -> Result<FinancialOfferVersion, sqlx::Error> {
        let query = format!(
            "INSERT INTO financial_offer_versions (supplier_id, version_name, version_date) \
             VALUES ($1, $2, COALESCE($3, NOW())) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FinancialOfferVersion>(&query)
            .bind(supplier_id)
            .bind(version_name)
            .bind(version_date)
            .fetch_one(pool)
            .await
    }

    /// Number of versions already recorded for a supplier.
    pub async fn count_for_supplier(pool: &PgPool, supplier_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM financial_offer_versions WHERE supplier_id = $1",
        )
        .bind(supplier_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Find a version with its supplier by id.
    pub async fn find_with_supplier(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<OfferVersionWithSupplier>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM financial_offer_versions v \
             LEFT JOIN suppliers s ON s.id = v.supplier_id \
             WHERE v.id = $1"
        );
        sqlx::query_as::<_, OfferVersionWithSupplier>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Batch lookup by id. Unknown ids are simply absent from the result.
    pub async fn find_with_supplier_by_ids(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<OfferVersionWithSupplier>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM financial_offer_versions v \
             LEFT JOIN suppliers s ON s.id = v.supplier_id \
             WHERE v.id = ANY($1)"
        );
        sqlx::query_as::<_, OfferVersionWithSupplier>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Active versions of every supplier of an RFP, newest first.
    pub async fn list_active_for_rfp(
        pool: &PgPool,
        rfp_id: DbId,
    ) -> Result<Vec<OfferVersionWithSupplier>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM financial_offer_versions v \
             JOIN suppliers s ON s.id = v.supplier_id \
             WHERE s.rfp_id = $1 AND v.is_active = true \
             ORDER BY v.version_date DESC, v.id DESC"
        );
        sqlx::query_as::<_, OfferVersionWithSupplier>(&query)
            .bind(rfp_id)
            .fetch_all(pool)
            .await
    }
}
