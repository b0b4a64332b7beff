//! Integration tests for offer versions, offer values and the financial
//! read views (summary and tree), plus formula preview.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, post_json, seed_rfp, seed_supplier};
use serde_json::{json, Value};
use sqlx::PgPool;

/// RFP with a template holding root setup line A and its monthly child B.
struct Fixture {
    rfp_id: i64,
    line_a: i64,
    line_b: i64,
}

async fn post(pool: &PgPool, uri: &str, body: Value) -> (StatusCode, Value) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, uri, body).await;
    let status = response.status();
    (status, body_json(response).await)
}

async fn fetch(pool: &PgPool, uri: &str) -> (StatusCode, Value) {
    let app = common::build_test_app(pool.clone());
    let response = get(app, uri).await;
    let status = response.status();
    (status, body_json(response).await)
}

async fn seed_fixture(pool: &PgPool) -> Fixture {
    let rfp_id = seed_rfp(pool, "Hosting").await;
    let (_, json) = post(
        pool,
        &format!("/api/v1/rfps/{rfp_id}/financial-template"),
        json!({ "name": "Costs", "total_period_years": 3 }),
    )
    .await;
    let template_id = json["data"]["id"].as_i64().unwrap();

    let (_, json) = post(
        pool,
        "/api/v1/financial-template-lines",
        json!({
            "template_id": template_id,
            "line_code": "A",
            "name": "Platform",
            "line_type": "setup",
        }),
    )
    .await;
    let line_a = json["data"]["id"].as_i64().unwrap();

    let (_, json) = post(
        pool,
        "/api/v1/financial-template-lines",
        json!({
            "template_id": template_id,
            "parent_id": line_a,
            "line_code": "B",
            "name": "Support",
            "line_type": "recurrent",
            "recurrence_type": "monthly",
        }),
    )
    .await;
    let line_b = json["data"]["id"].as_i64().unwrap();

    Fixture {
        rfp_id,
        line_a,
        line_b,
    }
}

async fn create_version(pool: &PgPool, rfp_id: i64, supplier_id: i64) -> i64 {
    let (status, json) = post(
        pool,
        &format!("/api/v1/rfps/{rfp_id}/financial-offer-versions"),
        json!({ "supplier_id": supplier_id }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {json}");
    json["data"]["id"].as_i64().unwrap()
}

async fn save_values(pool: &PgPool, version_id: i64, values: Value) -> (StatusCode, Value) {
    post(
        pool,
        "/api/v1/financial-offer-values/batch",
        json!({ "version_id": version_id, "values": values }),
    )
    .await
}

// ---------------------------------------------------------------------------
// Versions and values
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn versions_get_default_names_and_are_listed(pool: PgPool) {
    let fx = seed_fixture(&pool).await;
    let supplier = seed_supplier(&pool, fx.rfp_id, "Acme").await;

    create_version(&pool, fx.rfp_id, supplier).await;
    create_version(&pool, fx.rfp_id, supplier).await;

    let (status, json) = fetch(
        &pool,
        &format!("/api/v1/rfps/{}/financial-offer-versions", fx.rfp_id),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let versions = json["data"].as_array().unwrap();
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[0]["supplier_name"], "Acme");

    let mut names: Vec<&str> = versions
        .iter()
        .map(|v| v["version_name"].as_str().unwrap())
        .collect();
    names.sort_unstable();
    assert_eq!(names, vec!["Version 1", "Version 2"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn version_for_foreign_supplier_is_rejected(pool: PgPool) {
    let fx = seed_fixture(&pool).await;
    let other_rfp = seed_rfp(&pool, "Other").await;
    let outsider = seed_supplier(&pool, other_rfp, "Initech").await;

    let (status, json) = post(
        &pool,
        &format!("/api/v1/rfps/{}/financial-offer-versions", fx.rfp_id),
        json!({ "supplier_id": outsider }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn batch_upsert_overwrites_and_lists_values(pool: PgPool) {
    let fx = seed_fixture(&pool).await;
    let supplier = seed_supplier(&pool, fx.rfp_id, "Acme").await;
    let version = create_version(&pool, fx.rfp_id, supplier).await;

    let (status, json) = save_values(
        &pool,
        version,
        json!([{ "template_line_id": fx.line_a, "setup_cost": 500.0 }]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["count"], 1);
    assert_eq!(json["data"]["values"][0]["quantity"], 1.0);

    save_values(
        &pool,
        version,
        json!([{ "template_line_id": fx.line_a, "setup_cost": 750.0, "quantity": 2 }]),
    )
    .await;

    let (status, json) = fetch(
        &pool,
        &format!("/api/v1/financial-offer-versions/{version}/values"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let values = json["data"].as_array().unwrap();
    assert_eq!(values.len(), 1);
    assert_eq!(values[0]["setup_cost"], 750.0);
    assert_eq!(values[0]["quantity"], 2.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn batch_upsert_rejects_bad_input(pool: PgPool) {
    let fx = seed_fixture(&pool).await;
    let supplier = seed_supplier(&pool, fx.rfp_id, "Acme").await;
    let version = create_version(&pool, fx.rfp_id, supplier).await;

    let (status, json) = save_values(&pool, version, json!([])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let (status, _) = save_values(
        &pool,
        version,
        json!([{ "template_line_id": fx.line_a, "setup_cost": -1.0 }]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = save_values(
        &pool,
        version,
        json!([{ "template_line_id": 999999, "setup_cost": 1.0 }]),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = save_values(
        &pool,
        999999,
        json!([{ "template_line_id": fx.line_a, "setup_cost": 1.0 }]),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn batch_upsert_rejects_soft_deleted_line(pool: PgPool) {
    let fx = seed_fixture(&pool).await;
    let supplier = seed_supplier(&pool, fx.rfp_id, "Acme").await;
    let version = create_version(&pool, fx.rfp_id, supplier).await;

    // Line A has an active child, so deleting it deactivates A and B.
    let app = common::build_test_app(pool.clone());
    let response = delete(app, &format!("/api/v1/financial-template-lines/{}", fx.line_a)).await;
    assert_eq!(body_json(response).await["data"]["deleted_type"], "soft");

    let (status, json) = save_values(
        &pool,
        version,
        json!([{ "template_line_id": fx.line_b, "recurrent_cost": 10.0 }]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let (_, json) = fetch(
        &pool,
        &format!("/api/v1/financial-offer-versions/{version}/values"),
    )
    .await;
    assert_eq!(json["data"], json!([]));
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn summary_rolls_up_child_into_tco(pool: PgPool) {
    let fx = seed_fixture(&pool).await;
    let supplier = seed_supplier(&pool, fx.rfp_id, "Acme").await;
    let version = create_version(&pool, fx.rfp_id, supplier).await;
    save_values(
        &pool,
        version,
        json!([
            { "template_line_id": fx.line_a, "setup_cost": 1000.0, "quantity": 1 },
            { "template_line_id": fx.line_b, "recurrent_cost": 50.0, "quantity": 3 },
        ]),
    )
    .await;

    let (status, json) = fetch(
        &pool,
        &format!(
            "/api/v1/rfps/{}/financial-summary?version_ids={version}&tco_period=3",
            fx.rfp_id
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let data = &json["data"];
    assert_eq!(data["period_years"], 3);
    let row = &data["summary"][0];
    assert_eq!(row["supplier_name"], "Acme");
    assert_eq!(row["total_setup"], 1000.0);
    assert_eq!(row["total_recurrent_annual"], 1800.0);
    assert_eq!(row["tco"], 6400.0);
    assert_eq!(row["tco_rank"], 1);
    assert_eq!(data["diagnostics"], json!([]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn summary_without_versions_is_empty(pool: PgPool) {
    let fx = seed_fixture(&pool).await;

    let (status, json) = fetch(
        &pool,
        &format!("/api/v1/rfps/{}/financial-summary?tcoPeriod=5", fx.rfp_id),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["summary"], json!([]));
    assert_eq!(json["data"]["period_years"], 5);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn summary_for_version_without_values_is_zero(pool: PgPool) {
    let fx = seed_fixture(&pool).await;
    let supplier = seed_supplier(&pool, fx.rfp_id, "Acme").await;
    let version = create_version(&pool, fx.rfp_id, supplier).await;

    let (status, json) = fetch(
        &pool,
        &format!("/api/v1/rfps/{}/financial-summary?versionIds={version}", fx.rfp_id),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let row = &json["data"]["summary"][0];
    assert_eq!(row["total_setup"], 0.0);
    assert_eq!(row["total_recurrent_annual"], 0.0);
    assert_eq!(row["tco"], 0.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn summary_with_unknown_version_returns_404(pool: PgPool) {
    let fx = seed_fixture(&pool).await;

    let (status, json) = fetch(
        &pool,
        &format!("/api/v1/rfps/{}/financial-summary?version_ids=999999", fx.rfp_id),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn summary_rejects_malformed_query(pool: PgPool) {
    let fx = seed_fixture(&pool).await;

    let (status, _) = fetch(
        &pool,
        &format!("/api/v1/rfps/{}/financial-summary?version_ids=1,abc", fx.rfp_id),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = fetch(
        &pool,
        &format!("/api/v1/rfps/{}/financial-summary?sort=price", fx.rfp_id),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn summary_sorts_by_tco_and_ranks(pool: PgPool) {
    let fx = seed_fixture(&pool).await;
    let acme = seed_supplier(&pool, fx.rfp_id, "Acme").await;
    let globex = seed_supplier(&pool, fx.rfp_id, "Globex").await;
    let expensive = create_version(&pool, fx.rfp_id, acme).await;
    let cheap = create_version(&pool, fx.rfp_id, globex).await;

    save_values(
        &pool,
        expensive,
        json!([{ "template_line_id": fx.line_a, "setup_cost": 9000.0 }]),
    )
    .await;
    save_values(
        &pool,
        cheap,
        json!([{ "template_line_id": fx.line_a, "setup_cost": 100.0 }]),
    )
    .await;

    let (_, json) = fetch(
        &pool,
        &format!(
            "/api/v1/rfps/{}/financial-summary?version_ids={expensive},{cheap}",
            fx.rfp_id
        ),
    )
    .await;
    let summary = json["data"]["summary"].as_array().unwrap();
    assert_eq!(summary[0]["version_id"], expensive);
    assert_eq!(summary[0]["tco_rank"], 2);

    let (_, json) = fetch(
        &pool,
        &format!(
            "/api/v1/rfps/{}/financial-summary?version_ids={expensive},{cheap}&sort=tco",
            fx.rfp_id
        ),
    )
    .await;
    let summary = json["data"]["summary"].as_array().unwrap();
    assert_eq!(summary[0]["version_id"], cheap);
    assert_eq!(summary[0]["tco_rank"], 1);
    assert_eq!(summary[1]["supplier_name"], "Acme");
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn tree_returns_flattened_lines_with_subtotals(pool: PgPool) {
    let fx = seed_fixture(&pool).await;
    let supplier = seed_supplier(&pool, fx.rfp_id, "Acme").await;
    let version = create_version(&pool, fx.rfp_id, supplier).await;
    save_values(
        &pool,
        version,
        json!([
            { "template_line_id": fx.line_a, "setup_cost": 1000.0 },
            { "template_line_id": fx.line_b, "recurrent_cost": 50.0, "quantity": 3 },
        ]),
    )
    .await;

    let (status, json) = fetch(
        &pool,
        &format!("/api/v1/rfps/{}/financial-tree?versionId={version}", fx.rfp_id),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let data = &json["data"];
    let lines = data["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["line_code"], "A");
    assert_eq!(lines[0]["level"], 0);
    assert_eq!(lines[0]["child_count"], 1);
    assert_eq!(lines[0]["subtotal_setup"], 1000.0);
    assert_eq!(lines[0]["subtotal_recurrent"], 1800.0);
    assert_eq!(lines[1]["line_code"], "B");
    assert_eq!(lines[1]["level"], 1);
    assert_eq!(data["totals"]["tco"], 6400.0);

    let (status, json) = fetch(
        &pool,
        &format!("/api/v1/rfps/{}/financial-tree", fx.rfp_id),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["totals"]["tco"], 0.0);
    assert!(json["data"]["version_id"].is_null());
}

// ---------------------------------------------------------------------------
// Formula preview
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn formula_preview_evaluates_and_reports_errors(pool: PgPool) {
    let (status, json) = post(
        &pool,
        "/api/v1/financial-formulas/evaluate",
        json!({
            "formula": "{setup_cost} * {quantity} + 10",
            "variables": { "setup_cost": 100.0, "quantity": 2.0 },
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["result"], 210.0);
    assert!(json["data"]["error"].is_null());

    let (status, json) = post(
        &pool,
        "/api/v1/financial-formulas/evaluate",
        json!({ "formula": "process.exit()" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["result"], 0.0);
    assert!(json["data"]["error"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn formula_preview_survives_deeply_nested_input(pool: PgPool) {
    let deep_parens = format!("{}1{}", "(".repeat(2000), ")".repeat(2000));
    let (status, json) = post(
        &pool,
        "/api/v1/financial-formulas/evaluate",
        json!({ "formula": deep_parens }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["result"], 0.0);
    assert!(json["data"]["error"].as_str().unwrap().contains("maximum length"));

    let minus_chain = format!("{}1", "-".repeat(300));
    let (status, json) = post(
        &pool,
        "/api/v1/financial-formulas/evaluate",
        json!({ "formula": minus_chain }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["result"], 0.0);
    assert!(json["data"]["error"].as_str().unwrap().contains("nests deeper"));
}
