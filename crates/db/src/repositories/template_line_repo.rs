//! Repository for the `financial_template_lines` table.

use rfpeval_core::types::DbId;
use sqlx::PgPool;

use crate::models::financial_template_line::{FinancialTemplateLine, TemplateLineFields};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, template_id, parent_id, line_code, name, line_type, \
    recurrence_type, custom_formula, sort_order, is_active, created_at, updated_at";

/// Provides CRUD operations for template lines.
pub struct TemplateLineRepo;

impl TemplateLineRepo {
    /// Insert a new line, returning the created row.
    pub async fn create(
        pool: &PgPool,
        template_id: DbId,
        fields: &TemplateLineFields,
    ) -> Result<FinancialTemplateLine, sqlx::Error> {
        let query = format!(
            "INSERT INTO financial_template_lines \
                (template_id, parent_id, line_code, name, line_type, recurrence_type, \
                 custom_formula, sort_order) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FinancialTemplateLine>(&query)
            .bind(template_id)
            .bind(fields.parent_id)
            .bind(&fields.line_code)
            .bind(&fields.name)
            .bind(fields.line_type.as_str())
            .bind(fields.recurrence_type.map(|r| r.as_str()))
            .bind(&fields.custom_formula)
            .bind(fields.sort_order)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<FinancialTemplateLine>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM financial_template_lines WHERE id = $1");
        sqlx::query_as::<_, FinancialTemplateLine>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a line by code within a template, active or not.
    pub async fn find_by_code(
        pool: &PgPool,
        template_id: DbId,
        line_code: &str,
    ) -> Result<Option<FinancialTemplateLine>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM financial_template_lines \
             WHERE template_id = $1 AND line_code = $2"
        );
        sqlx::query_as::<_, FinancialTemplateLine>(&query)
            .bind(template_id)
            .bind(line_code)
            .fetch_optional(pool)
            .await
    }

    /// Active lines of a template, ordered by sort_order then id.
    pub async fn list_active(
        pool: &PgPool,
        template_id: DbId,
    ) -> Result<Vec<FinancialTemplateLine>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM financial_template_lines \
             WHERE template_id = $1 AND is_active = true \
             ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, FinancialTemplateLine>(&query)
            .bind(template_id)
            .fetch_all(pool)
            .await
    }

    /// `(id, parent_id)` for every line of a template, including inactive ones.
    pub async fn list_parent_links(
        pool: &PgPool,
        template_id: DbId,
    ) -> Result<Vec<(DbId, Option<DbId>)>, sqlx::Error> {
        sqlx::query_as::<_, (DbId, Option<DbId>)>(
            "SELECT id, parent_id FROM financial_template_lines WHERE template_id = $1",
        )
        .bind(template_id)
        .fetch_all(pool)
        .await
    }

    /// Highest sort_order among active siblings under `parent_id`
    /// (`None` for roots). Returns `None` when there are no siblings.
    pub async fn max_sibling_sort_order(
        pool: &PgPool,
        template_id: DbId,
        parent_id: Option<DbId>,
    ) -> Result<Option<i32>, sqlx::Error> {
        let (max,): (Option<i32>,) = sqlx::query_as(
            "SELECT MAX(sort_order) FROM financial_template_lines \
             WHERE template_id = $1 AND parent_id IS NOT DISTINCT FROM $2 \
               AND is_active = true",
        )
        .bind(template_id)
        .bind(parent_id)
        .fetch_one(pool)
        .await?;
        Ok(max)
    }

    /// Overwrite every editable column of a line.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        fields: &TemplateLineFields,
    ) -> Result<Option<FinancialTemplateLine>, sqlx::Error> {
        let query = format!(
            "UPDATE financial_template_lines SET \
                parent_id = $2, \
                line_code = $3, \
                name = $4, \
                line_type = $5, \
                recurrence_type = $6, \
                custom_formula = $7, \
                sort_order = $8 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FinancialTemplateLine>(&query)
            .bind(id)
            .bind(fields.parent_id)
            .bind(&fields.line_code)
            .bind(&fields.name)
            .bind(fields.line_type.as_str())
            .bind(fields.recurrence_type.map(|r| r.as_str()))
            .bind(&fields.custom_formula)
            .bind(fields.sort_order)
            .fetch_optional(pool)
            .await
    }

    /// Whether the line has any active children.
    pub async fn has_active_children(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (\
                SELECT 1 FROM financial_template_lines \
                WHERE parent_id = $1 AND is_active = true)",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// Whether any offer version holds a value for the line.
    pub async fn has_values(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (\
                SELECT 1 FROM financial_offer_values WHERE template_line_id = $1)",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// Soft-delete a line and every descendant.
    ///
    /// Returns the number of lines deactivated.
    pub async fn deactivate_subtree(pool: &PgPool, id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "WITH RECURSIVE subtree AS ( \
                SELECT id FROM financial_template_lines WHERE id = $1 \
                UNION \
                SELECT l.id FROM financial_template_lines l \
                JOIN subtree s ON l.parent_id = s.id \
             ) \
             UPDATE financial_template_lines SET is_active = false \
             WHERE id IN (SELECT id FROM subtree) AND is_active = true",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Permanently delete a line. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM financial_template_lines WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
