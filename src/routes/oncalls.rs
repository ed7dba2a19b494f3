// src/routes/oncalls.rs
//
// On-call assignments are organisation-wide (not site- or room-bound) and
// keyed uniquely by (organization, date, slot); slot 1 is the manager,
// slots 2 and 3 the doctors.

use axum::{extract::{Path, Query, State}, Json};
use axum::http::StatusCode;
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::{query, query_as};

use crate::models::{CopyCount, OnCallAssignment};
use crate::AppState;
use super::{bad_request, internal_error};

#[derive(Deserialize)]
pub struct UpsertOncallBody {
    pub oncall_date: NaiveDate,
    pub slot: i32, // 1..3
    pub staff_id: Option<i64>,
    pub temp_staff_name: Option<String>,
    #[serde(default)] pub confirmed: bool,
    #[serde(default = "default_period")] pub shift_period: String, // am|pm|full_day
}
fn default_period() -> String { "full_day".into() }

pub async fn upsert_oncall(
    State(state): State<AppState>,
    Path(org_id): Path<i64>,
    Json(b): Json<UpsertOncallBody>,
) -> Result<Json<OnCallAssignment>, (StatusCode, String)> {
    if !(1..=3).contains(&b.slot) {
        return Err(bad_request(format!("on-call slot must be 1..3, got {}", b.slot)));
    }
    let row = query_as::<_, OnCallAssignment>(
        r#"
        INSERT INTO public.oncall_assignments
          (organization_id, oncall_date, slot, staff_id, temp_staff_name, confirmed, shift_period)
        VALUES ($1,$2,$3,$4,$5,$6,$7)
        ON CONFLICT (organization_id, oncall_date, slot)
        DO UPDATE SET staff_id = EXCLUDED.staff_id,
                      temp_staff_name = EXCLUDED.temp_staff_name,
                      confirmed = EXCLUDED.confirmed,
                      shift_period = EXCLUDED.shift_period
        RETURNING oncall_id, organization_id, oncall_date, slot, staff_id, temp_staff_name, confirmed, shift_period
        "#
    )
    .bind(org_id).bind(b.oncall_date).bind(b.slot).bind(b.staff_id)
    .bind(b.temp_staff_name).bind(b.confirmed).bind(b.shift_period)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

#[derive(Deserialize)]
pub struct ListOncallsQ {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

pub async fn list_oncalls(
    State(state): State<AppState>,
    Path(org_id): Path<i64>,
    Query(q): Query<ListOncallsQ>,
) -> Result<Json<Vec<OnCallAssignment>>, (StatusCode, String)> {
    let rows = if let (Some(from), Some(to)) = (q.from, q.to) {
        query_as::<_, OnCallAssignment>(
            r#"
            SELECT * FROM public.oncall_assignments
            WHERE organization_id=$1 AND oncall_date BETWEEN $2 AND $3
            ORDER BY oncall_date, slot
            "#
        )
        .bind(org_id).bind(from).bind(to)
        .fetch_all(&state.pool).await.map_err(internal_error)?
    } else {
        query_as::<_, OnCallAssignment>(
            r#"SELECT * FROM public.oncall_assignments WHERE organization_id=$1 ORDER BY oncall_date, slot"#)
            .bind(org_id)
            .fetch_all(&state.pool).await.map_err(internal_error)?
    };
    Ok(Json(rows))
}

pub async fn delete_oncall(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let res = query(r#"DELETE FROM public.oncall_assignments WHERE oncall_id=$1"#)
        .bind(id).execute(&state.pool).await.map_err(internal_error)?;
    Ok(Json(serde_json::json!({"deleted": res.rows_affected() > 0})))
}

#[derive(Deserialize)]
pub struct DayQ { pub date: NaiveDate }

pub async fn delete_oncalls_for_day(
    State(state): State<AppState>,
    Path(org_id): Path<i64>,
    Query(q): Query<DayQ>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let res = query(
        r#"DELETE FROM public.oncall_assignments WHERE organization_id=$1 AND oncall_date=$2"#)
        .bind(org_id).bind(q.date)
        .execute(&state.pool).await.map_err(internal_error)?;
    Ok(Json(serde_json::json!({"deleted": res.rows_affected()})))
}

#[derive(Deserialize)]
pub struct CopyOncallsBody {
    pub source_date: NaiveDate,
    pub target_date: NaiveDate,
}

/// POST /api/v1/organizations/:org_id/oncalls/copy
///
/// Destructive-then-additive: the target day is cleared first, then the
/// source day's records are re-inserted one at a time with no wrapping
/// transaction. A failure mid-copy leaves the target partially populated;
/// the response's `copied` count against `source_total` is the only report.
pub async fn copy_oncalls_from_day(
    State(state): State<AppState>,
    Path(org_id): Path<i64>,
    Json(b): Json<CopyOncallsBody>,
) -> Result<Json<CopyCount>, (StatusCode, String)> {
    let source = query_as::<_, OnCallAssignment>(
        r#"
        SELECT * FROM public.oncall_assignments
        WHERE organization_id=$1 AND oncall_date=$2
        ORDER BY slot
        "#
    )
    .bind(org_id).bind(b.source_date)
    .fetch_all(&state.pool).await.map_err(internal_error)?;

    query(r#"DELETE FROM public.oncall_assignments WHERE organization_id=$1 AND oncall_date=$2"#)
        .bind(org_id).bind(b.target_date)
        .execute(&state.pool).await.map_err(internal_error)?;

    let mut copied = 0usize;
    for o in &source {
        let res = query(
            r#"
            INSERT INTO public.oncall_assignments
              (organization_id, oncall_date, slot, staff_id, temp_staff_name, confirmed, shift_period)
            VALUES ($1,$2,$3,$4,$5,$6,$7)
            "#
        )
        .bind(org_id).bind(b.target_date).bind(o.slot).bind(o.staff_id)
        .bind(&o.temp_staff_name).bind(o.confirmed).bind(&o.shift_period)
        .execute(&state.pool).await;
        match res {
            Ok(_) => copied += 1,
            Err(e) => {
                tracing::warn!(slot = o.slot, "failed to copy on-call record: {e}");
            }
        }
    }

    Ok(Json(CopyCount { copied, source_total: source.len() }))
}
