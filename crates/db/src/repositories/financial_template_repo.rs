//! Repository for the `financial_templates` table.

use rfpeval_core::types::DbId;
use sqlx::PgPool;

use crate::models::financial_template::{
    CreateFinancialTemplate, FinancialTemplate, UpdateFinancialTemplate,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, rfp_id, name, total_period_years, created_at, updated_at";

/// Provides CRUD operations for financial templates.
pub struct FinancialTemplateRepo;

impl FinancialTemplateRepo {
    /// Insert the template for an RFP, returning the created row.
    ///
    /// `total_period_years` falls back to the column default when `None`.
    /// A second template for the same RFP violates
    /// `uq_financial_templates_rfp_id`.
    pub async fn create(
        pool: &PgPool,
        rfp_id: DbId,
        input: &CreateFinancialTemplate,
    ) -> Result<FinancialTemplate, sqlx::Error> {
        let query = format!(
            "INSERT INTO financial_templates (rfp_id, name, total_period_years) \
             VALUES ($1, $2, COALESCE($3, 3)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FinancialTemplate>(&query)
            .bind(rfp_id)
            .bind(&input.name)
            .bind(input.total_period_years)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<FinancialTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM financial_templates WHERE id = $1");
        sqlx::query_as::<_, FinancialTemplate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the template attached to an RFP, if one exists yet.
    pub async fn find_by_rfp(
        pool: &PgPool,
        rfp_id: DbId,
    ) -> Result<Option<FinancialTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM financial_templates WHERE rfp_id = $1");
        sqlx::query_as::<_, FinancialTemplate>(&query)
            .bind(rfp_id)
            .fetch_optional(pool)
            .await
    }

    /// Update template metadata. Only non-`None` fields are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateFinancialTemplate,
    ) -> Result<Option<FinancialTemplate>, sqlx::Error> {
        let query = format!(
            "UPDATE financial_templates SET \
                name = COALESCE($2, name), \
                total_period_years = COALESCE($3, total_period_years) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FinancialTemplate>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.total_period_years)
            .fetch_optional(pool)
            .await
    }
}
