// src/routes/confirmations.rs
//
// The confirmation tracker is an audit overlay: it records that someone
// reviewed a day's schedule, optionally together with the violations they
// knowingly accepted. It never alters the shifts themselves.

use axum::{extract::{Path, State}, Json};
use axum::http::StatusCode;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{query, query_as};

use crate::models::{DayConfirmation, RuleOverride};
use crate::AppState;
use super::{bad_request, internal_error};

#[derive(Deserialize)]
pub struct OverrideInput {
    pub rule_type: String, // no_oncall|empty_room|cross_site|temp_not_confirmed
    pub description: String,
    pub reason: String,
    pub facility_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct ConfirmDayBody {
    pub shift_date: NaiveDate,
    pub status: String, // confirmed|confirmed_with_overrides
    pub confirmed_by: Option<i64>,
    #[serde(default)] pub overrides: Vec<OverrideInput>,
}

#[derive(Serialize)]
pub struct ConfirmDayResp {
    pub confirmation: DayConfirmation,
    pub overrides_recorded: usize,
}

/// POST /api/v1/rota-weeks/:id/confirmations
///
/// Upserts the one confirmation row per (week, date) — re-confirming
/// overwrites, never duplicates — then appends one override row per accepted
/// violation. The upsert and the appends are separate statements: an append
/// failure leaves the confirmation in place and is reported only through the
/// reduced `overrides_recorded` count.
pub async fn confirm_day(
    State(state): State<AppState>,
    Path(week_id): Path<i64>,
    Json(b): Json<ConfirmDayBody>,
) -> Result<Json<ConfirmDayResp>, (StatusCode, String)> {
    if b.status != "confirmed" && b.status != "confirmed_with_overrides" {
        return Err(bad_request(format!("unknown confirmation status '{}'", b.status)));
    }

    let confirmation = query_as::<_, DayConfirmation>(
        r#"
        INSERT INTO public.day_confirmations(rota_week_id, shift_date, status, confirmed_by, confirmed_at)
        VALUES ($1,$2,$3,$4, now())
        ON CONFLICT (rota_week_id, shift_date)
        DO UPDATE SET status = EXCLUDED.status,
                      confirmed_by = EXCLUDED.confirmed_by,
                      confirmed_at = now()
        RETURNING day_confirmation_id, rota_week_id, shift_date, status, confirmed_by, confirmed_at
        "#
    )
    .bind(week_id).bind(b.shift_date).bind(&b.status).bind(b.confirmed_by)
    .fetch_one(&state.pool).await.map_err(internal_error)?;

    let mut overrides_recorded = 0usize;
    for o in &b.overrides {
        let res = query(
            r#"
            INSERT INTO public.rule_overrides
              (rota_week_id, shift_date, rule_type, description, reason, facility_id, created_by)
            VALUES ($1,$2,$3,$4,$5,$6,$7)
            "#
        )
        .bind(week_id).bind(b.shift_date).bind(&o.rule_type).bind(&o.description)
        .bind(&o.reason).bind(o.facility_id).bind(b.confirmed_by)
        .execute(&state.pool).await;
        match res {
            Ok(_) => overrides_recorded += 1,
            Err(e) => {
                tracing::warn!(rule_type = %o.rule_type, "failed to record rule override: {e}");
            }
        }
    }

    Ok(Json(ConfirmDayResp { confirmation, overrides_recorded }))
}

/// DELETE /api/v1/rota-weeks/:id/confirmations/:date — removes the
/// confirmation only. Overrides already recorded stay; the audit trail is
/// never retracted.
pub async fn reset_day_confirmation(
    State(state): State<AppState>,
    Path((week_id, date)): Path<(i64, NaiveDate)>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let res = query(
        r#"DELETE FROM public.day_confirmations WHERE rota_week_id=$1 AND shift_date=$2"#)
        .bind(week_id).bind(date)
        .execute(&state.pool).await.map_err(internal_error)?;
    Ok(Json(serde_json::json!({"deleted": res.rows_affected() > 0})))
}

/// GET /api/v1/rota-weeks/:id/confirmations — the week's confirmation set,
/// for client-side per-day status lookups.
pub async fn list_confirmations(
    State(state): State<AppState>,
    Path(week_id): Path<i64>,
) -> Result<Json<Vec<DayConfirmation>>, (StatusCode, String)> {
    let rows = query_as::<_, DayConfirmation>(
        r#"SELECT * FROM public.day_confirmations WHERE rota_week_id=$1 ORDER BY shift_date"#)
        .bind(week_id)
        .fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(rows))
}

/// GET /api/v1/rota-weeks/:id/overrides — the append-only override trail.
pub async fn list_overrides(
    State(state): State<AppState>,
    Path(week_id): Path<i64>,
) -> Result<Json<Vec<RuleOverride>>, (StatusCode, String)> {
    let rows = query_as::<_, RuleOverride>(
        r#"SELECT * FROM public.rule_overrides WHERE rota_week_id=$1 ORDER BY rule_override_id"#)
        .bind(week_id)
        .fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(rows))
}
