// src/routes/rota_weeks.rs

use axum::{extract::{Path, State}, Json};
use axum::http::StatusCode;
use chrono::{Duration, NaiveDate};
use serde::Deserialize;
use sqlx::query_as;

use crate::models::{DayOpeningHours, Facility, OnCallAssignment, RotaRule, RotaWeek, Shift, Site, StaffProfile};
use crate::rota::rules::{validate_week, RuleViolation, ValidationContext};
use crate::AppState;
use super::internal_error;

#[derive(Deserialize)]
pub struct FetchOrCreateBody {
    pub week_start: NaiveDate, // Monday-aligned
    pub created_by: Option<i64>,
}

/// POST /api/v1/sites/:site_id/rota-weeks
///
/// Weeks are created lazily on first access: one row per (site, week_start),
/// concurrent creators resolved by the unique constraint rather than any
/// client-side locking. An existing week is returned as-is; the DO UPDATE is
/// a no-op touch so RETURNING yields a row either way.
pub async fn fetch_or_create_week(
    State(state): State<AppState>,
    Path(site_id): Path<i64>,
    Json(b): Json<FetchOrCreateBody>,
) -> Result<Json<RotaWeek>, (StatusCode, String)> {
    let row = query_as::<_, RotaWeek>(
        r#"
        INSERT INTO public.rota_weeks(site_id, week_start, status, created_by)
        VALUES ($1,$2,'draft',$3)
        ON CONFLICT (site_id, week_start)
        DO UPDATE SET week_start = EXCLUDED.week_start
        RETURNING rota_week_id, site_id, week_start, status, created_by, created_at
        "#
    )
    .bind(site_id).bind(b.week_start).bind(b.created_by)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn get_week(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RotaWeek>, (StatusCode, String)> {
    let row = query_as::<_, RotaWeek>(
        r#"SELECT * FROM public.rota_weeks WHERE rota_week_id=$1"#)
        .bind(id).fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

#[derive(Deserialize)]
pub struct PatchWeekBody {
    pub status: String, // draft|published
}

/// PATCH /api/v1/rota-weeks/:id — unconditional status flip. Publishing is
/// not gated on a clean violation report; the rule engine only reports.
pub async fn update_week_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(b): Json<PatchWeekBody>,
) -> Result<Json<RotaWeek>, (StatusCode, String)> {
    if b.status != "draft" && b.status != "published" {
        return Err(super::bad_request(format!("unknown week status '{}'", b.status)));
    }
    let row = query_as::<_, RotaWeek>(
        r#"
        UPDATE public.rota_weeks SET status = $2
        WHERE rota_week_id = $1
        RETURNING rota_week_id, site_id, week_start, status, created_by, created_at
        "#
    )
    .bind(id).bind(b.status)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

/// GET /api/v1/rota-weeks/:id/violations
///
/// Assembles everything the rule engine needs for the week (shifts, the
/// organisation's on-calls, clinic rooms, opening hours, staff home sites,
/// the site's rota rule) and runs the four staffing checks over all 7 days.
pub async fn week_violations(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<RuleViolation>>, (StatusCode, String)> {
    let week = query_as::<_, RotaWeek>(
        r#"SELECT * FROM public.rota_weeks WHERE rota_week_id=$1"#)
        .bind(id).fetch_one(&state.pool).await.map_err(internal_error)?;

    let site = query_as::<_, Site>(r#"SELECT * FROM public.sites WHERE site_id=$1"#)
        .bind(week.site_id).fetch_one(&state.pool).await.map_err(internal_error)?;

    let rule = query_as::<_, RotaRule>(
        r#"SELECT * FROM public.rota_rules WHERE site_id=$1"#)
        .bind(week.site_id).fetch_optional(&state.pool).await.map_err(internal_error)?;

    let rooms = query_as::<_, Facility>(
        r#"SELECT * FROM public.facilities WHERE site_id=$1 AND facility_type='clinic_room' ORDER BY facility_id"#)
        .bind(week.site_id).fetch_all(&state.pool).await.map_err(internal_error)?;

    let staff = query_as::<_, StaffProfile>(
        r#"SELECT * FROM public.staff_profiles WHERE organization_id=$1 ORDER BY staff_id"#)
        .bind(site.organization_id).fetch_all(&state.pool).await.map_err(internal_error)?;

    let shifts = query_as::<_, Shift>(
        r#"SELECT * FROM public.shifts WHERE rota_week_id=$1 ORDER BY shift_date, shift_id"#)
        .bind(id).fetch_all(&state.pool).await.map_err(internal_error)?;

    let oncalls = query_as::<_, OnCallAssignment>(
        r#"
        SELECT * FROM public.oncall_assignments
        WHERE organization_id=$1 AND oncall_date BETWEEN $2 AND $3
        ORDER BY oncall_date, slot
        "#
    )
    .bind(site.organization_id)
    .bind(week.week_start)
    .bind(week.week_start + Duration::days(6))
    .fetch_all(&state.pool).await.map_err(internal_error)?;

    // Malformed opening-hours payloads degrade to "no entries" (all days
    // treated as closed) rather than failing the whole report.
    let opening: Vec<DayOpeningHours> =
        serde_json::from_value(site.opening_hours).unwrap_or_default();

    let ctx = ValidationContext {
        clinic_rooms: &rooms,
        staff: &staff,
        current_site_id: site.site_id,
        require_oncall: rule.map(|r| r.require_oncall).unwrap_or(true),
    };
    Ok(Json(validate_week(week.week_start, &shifts, &oncalls, &opening, &ctx)))
}
