//! Repository for the `financial_offer_values` table.
//!
//! One row per (version, template line), enforced by
//! `uq_financial_offer_values_version_line`; writes go through an upsert.

use rfpeval_core::types::DbId;
use sqlx::PgPool;

use crate::models::offer_value::{FinancialOfferValue, OfferValueInput};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, version_id, template_line_id, setup_cost, recurrent_cost, quantity, \
    created_at, updated_at";

/// Provides data access for offer values.
pub struct OfferValueRepo;

impl OfferValueRepo {
    /// Upsert a batch of values for one version within a transaction.
    ///
    /// A missing quantity is stored as 1. Either every row is written or none.
    pub async fn bulk_upsert(
        pool: &PgPool,
        version_id: DbId,
        values: &[OfferValueInput],
    ) -> Result<Vec<FinancialOfferValue>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut results = Vec::with_capacity(values.len());

        let query = format!(
            "INSERT INTO financial_offer_values \
                (version_id, template_line_id, setup_cost, recurrent_cost, quantity) \
             VALUES ($1, $2, $3, $4, COALESCE($5, 1)) \
             ON CONFLICT (version_id, template_line_id) \
             DO UPDATE SET \
                setup_cost = EXCLUDED.setup_cost, \
                recurrent_cost = EXCLUDED.recurrent_cost, \
                quantity = EXCLUDED.quantity \
             RETURNING {COLUMNS}"
        );

        for value in values {
            let row = sqlx::query_as::<_, FinancialOfferValue>(&query)
                .bind(version_id)
                .bind(value.template_line_id)
                .bind(value.setup_cost)
                .bind(value.recurrent_cost)
                .bind(value.quantity)
                .fetch_one(&mut *tx)
                .await?;
            results.push(row);
        }

        tx.commit().await?;
        tracing::debug!(version_id, count = results.len(), "Upserted offer values");
        Ok(results)
    }

    /// All values of one version.
    pub async fn list_for_version(
        pool: &PgPool,
        version_id: DbId,
    ) -> Result<Vec<FinancialOfferValue>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM financial_offer_values \
             WHERE version_id = $1 \
             ORDER BY template_line_id, id"
        );
        sqlx::query_as::<_, FinancialOfferValue>(&query)
            .bind(version_id)
            .fetch_all(pool)
            .await
    }

    /// All values of several versions in one round trip.
    pub async fn list_for_versions(
        pool: &PgPool,
        version_ids: &[DbId],
    ) -> Result<Vec<FinancialOfferValue>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM financial_offer_values \
             WHERE version_id = ANY($1) \
             ORDER BY version_id, template_line_id, id"
        );
        sqlx::query_as::<_, FinancialOfferValue>(&query)
            .bind(version_ids)
            .fetch_all(pool)
            .await
    }
}
