// src/routes/rota_rules.rs

use axum::{extract::{Path, State}, Json};
use axum::http::StatusCode;
use serde::Deserialize;
use sqlx::{query, query_as};

use crate::models::{RotaRule, StaffingRule, UpsertCount};
use crate::AppState;
use super::internal_error;

#[derive(Deserialize)]
pub struct UpsertRotaRuleBody {
    pub am_start: String, // "HH:MM"
    pub am_end: String,
    pub pm_start: String,
    pub pm_end: String,
    #[serde(default)] pub require_oncall: bool,
}

pub async fn get_rota_rule(
    State(state): State<AppState>,
    Path(site_id): Path<i64>,
) -> Result<Json<Option<RotaRule>>, (StatusCode, String)> {
    let row = query_as::<_, RotaRule>(r#"SELECT * FROM public.rota_rules WHERE site_id=$1"#)
        .bind(site_id)
        .fetch_optional(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

/// PUT /api/v1/sites/:site_id/rota-rule — one rule row per site, upserted.
pub async fn upsert_rota_rule(
    State(state): State<AppState>,
    Path(site_id): Path<i64>,
    Json(b): Json<UpsertRotaRuleBody>,
) -> Result<Json<RotaRule>, (StatusCode, String)> {
    let row = query_as::<_, RotaRule>(
        r#"
        INSERT INTO public.rota_rules(site_id, am_start, am_end, pm_start, pm_end, require_oncall)
        VALUES ($1,$2,$3,$4,$5,$6)
        ON CONFLICT (site_id)
        DO UPDATE SET am_start = EXCLUDED.am_start,
                      am_end = EXCLUDED.am_end,
                      pm_start = EXCLUDED.pm_start,
                      pm_end = EXCLUDED.pm_end,
                      require_oncall = EXCLUDED.require_oncall
        RETURNING rota_rule_id, site_id, am_start, am_end, pm_start, pm_end, require_oncall
        "#
    )
    .bind(site_id).bind(b.am_start).bind(b.am_end).bind(b.pm_start).bind(b.pm_end).bind(b.require_oncall)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

#[derive(Deserialize)]
pub struct StaffingRuleItem {
    pub job_title: String,
    pub min_count: i32,
    pub max_count: Option<i32>,
}

/// PUT /api/v1/rota-rules/:id/staffing-rules — bulk upsert keyed on
/// (rota_rule, job_title), all items in one transaction.
pub async fn bulk_upsert_staffing_rules(
    State(state): State<AppState>,
    Path(rota_rule_id): Path<i64>,
    Json(items): Json<Vec<StaffingRuleItem>>,
) -> Result<Json<UpsertCount>, (StatusCode, String)> {
    let mut tx = state.pool.begin().await.map_err(internal_error)?;
    for it in &items {
        query(
            r#"
            INSERT INTO public.staffing_rules(rota_rule_id, job_title, min_count, max_count)
            VALUES ($1,$2,$3,$4)
            ON CONFLICT (rota_rule_id, job_title)
            DO UPDATE SET min_count = EXCLUDED.min_count,
                          max_count = EXCLUDED.max_count
            "#
        )
        .bind(rota_rule_id).bind(&it.job_title).bind(it.min_count).bind(it.max_count)
        .execute(&mut *tx).await.map_err(internal_error)?;
    }
    tx.commit().await.map_err(internal_error)?;
    Ok(Json(UpsertCount { upserted: items.len() }))
}

pub async fn list_staffing_rules(
    State(state): State<AppState>,
    Path(rota_rule_id): Path<i64>,
) -> Result<Json<Vec<StaffingRule>>, (StatusCode, String)> {
    let rows = query_as::<_, StaffingRule>(
        r#"SELECT * FROM public.staffing_rules WHERE rota_rule_id=$1 ORDER BY job_title"#)
        .bind(rota_rule_id)
        .fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(rows))
}
