// src/routes/shifts.rs

use axum::{extract::{Path, State}, Json};
use axum::http::StatusCode;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::{query, query_as, FromRow, PgPool};

use crate::models::{DayOpeningHours, RotaRule, Shift, Site};
use crate::rota::shift_time::{calculate_shift_hours, shift_time_display, ShiftBounds, ShiftType};
use crate::AppState;
use super::{bad_request, internal_error};

/// A shift joined to its staff profile, plus display fields computed after
/// the fetch. `staff_name` falls back to the temp name and then "Unknown"
/// when no profile matches.
#[derive(Debug, Serialize, FromRow)]
pub struct ShiftWithStaff {
    pub shift_id: i64,
    pub rota_week_id: i64,
    pub staff_id: Option<i64>,
    pub shift_date: NaiveDate,
    pub shift_type: String,
    pub custom_start: Option<String>,
    pub custom_end: Option<String>,
    pub is_oncall: bool,
    pub facility_id: Option<i64>,
    pub is_temp_staff: bool,
    pub temp_confirmed: bool,
    pub temp_staff_name: Option<String>,
    pub notes: Option<String>,
    pub staff_name: String,
    pub job_title: Option<String>,
    #[sqlx(default)]
    pub hours: f64,
    #[sqlx(default)]
    pub time_label: String,
}

/// Re-reads the whole week from the store and computes hours/labels. Every
/// shift mutation responds with this list: the store is the source of truth
/// after a write, nothing is patched client-side.
async fn load_week_shifts(pool: &PgPool, week_id: i64) -> Result<Vec<ShiftWithStaff>, sqlx::Error> {
    let mut rows = query_as::<_, ShiftWithStaff>(
        r#"
        SELECT s.shift_id, s.rota_week_id, s.staff_id, s.shift_date, s.shift_type,
               s.custom_start, s.custom_end, s.is_oncall, s.facility_id,
               s.is_temp_staff, s.temp_confirmed, s.temp_staff_name, s.notes,
               COALESCE(sp.full_name, s.temp_staff_name, 'Unknown') AS staff_name,
               sp.job_title
        FROM public.shifts s
        LEFT JOIN public.staff_profiles sp ON sp.staff_id = s.staff_id
        WHERE s.rota_week_id = $1
        ORDER BY s.shift_date, s.shift_id
        "#
    )
    .bind(week_id)
    .fetch_all(pool).await?;

    let site = query_as::<_, Site>(
        r#"
        SELECT si.* FROM public.sites si
        JOIN public.rota_weeks w ON w.site_id = si.site_id
        WHERE w.rota_week_id = $1
        "#
    )
    .bind(week_id)
    .fetch_one(pool).await?;

    let rule = query_as::<_, RotaRule>(
        r#"
        SELECT r.* FROM public.rota_rules r
        JOIN public.rota_weeks w ON w.site_id = r.site_id
        WHERE w.rota_week_id = $1
        "#
    )
    .bind(week_id)
    .fetch_optional(pool).await?;

    let opening: Vec<DayOpeningHours> =
        serde_json::from_value(site.opening_hours).unwrap_or_default();
    let fallback = DayOpeningHours::default();

    for s in &mut rows {
        let idx = s.shift_date.weekday().num_days_from_monday() as usize;
        let day = opening.get(idx).unwrap_or(&fallback);
        let bounds = ShiftBounds {
            site_open: day.am_open.as_deref().or(day.pm_open.as_deref()),
            site_close: day.pm_close.as_deref().or(day.am_close.as_deref()),
            am_start: rule.as_ref().map(|r| r.am_start.as_str()),
            am_end: rule.as_ref().map(|r| r.am_end.as_str()),
            pm_start: rule.as_ref().map(|r| r.pm_start.as_str()),
            pm_end: rule.as_ref().map(|r| r.pm_end.as_str()),
        };
        s.hours = match ShiftType::parse(&s.shift_type) {
            Some(t) => {
                calculate_shift_hours(t, s.custom_start.as_deref(), s.custom_end.as_deref(), &bounds)
            }
            None => 0.0,
        };
        s.time_label =
            shift_time_display(&s.shift_type, s.custom_start.as_deref(), s.custom_end.as_deref());
    }
    Ok(rows)
}

pub async fn list_shifts(
    State(state): State<AppState>,
    Path(week_id): Path<i64>,
) -> Result<Json<Vec<ShiftWithStaff>>, (StatusCode, String)> {
    let rows = load_week_shifts(&state.pool, week_id).await.map_err(internal_error)?;
    Ok(Json(rows))
}

#[derive(Deserialize)]
pub struct AddShiftBody {
    pub staff_id: Option<i64>,       // None = external temp staff
    pub shift_date: NaiveDate,
    pub shift_type: String,          // am|pm|full_day|custom
    pub custom_start: Option<String>,
    pub custom_end: Option<String>,
    #[serde(default)] pub is_oncall: bool,
    pub facility_id: Option<i64>,
    #[serde(default)] pub is_temp_staff: bool,
    #[serde(default)] pub temp_confirmed: bool,
    pub temp_staff_name: Option<String>,
    pub notes: Option<String>,
}

/// POST /api/v1/rota-weeks/:id/shifts
///
/// Custom times are only kept for `custom` shifts and are required there.
/// Double-booking the same staff/date/room is allowed at this layer; the
/// rule engine reports on it, writes never block.
pub async fn add_shift(
    State(state): State<AppState>,
    Path(week_id): Path<i64>,
    Json(b): Json<AddShiftBody>,
) -> Result<Json<Vec<ShiftWithStaff>>, (StatusCode, String)> {
    let Some(shift_type) = ShiftType::parse(&b.shift_type) else {
        return Err(bad_request(format!("unknown shift type '{}'", b.shift_type)));
    };
    let (custom_start, custom_end) = if shift_type == ShiftType::Custom {
        match (&b.custom_start, &b.custom_end) {
            (Some(s), Some(e)) => (Some(s.clone()), Some(e.clone())),
            _ => return Err(bad_request("custom shifts need both custom_start and custom_end")),
        }
    } else {
        (None, None) // silently dropped for typed shifts
    };

    query(
        r#"
        INSERT INTO public.shifts
          (rota_week_id, staff_id, shift_date, shift_type, custom_start, custom_end,
           is_oncall, facility_id, is_temp_staff, temp_confirmed, temp_staff_name, notes)
        VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)
        "#
    )
    .bind(week_id).bind(b.staff_id).bind(b.shift_date).bind(shift_type.as_str())
    .bind(custom_start).bind(custom_end).bind(b.is_oncall).bind(b.facility_id)
    .bind(b.is_temp_staff).bind(b.temp_confirmed).bind(b.temp_staff_name).bind(b.notes)
    .execute(&state.pool).await.map_err(internal_error)?;

    let rows = load_week_shifts(&state.pool, week_id).await.map_err(internal_error)?;
    Ok(Json(rows))
}

#[derive(Deserialize)]
pub struct PatchShiftBody {
    pub staff_id: Option<i64>,
    pub shift_date: Option<NaiveDate>,
    pub shift_type: Option<String>,
    pub custom_start: Option<String>,
    pub custom_end: Option<String>,
    pub is_oncall: Option<bool>,
    pub facility_id: Option<i64>,
    pub is_temp_staff: Option<bool>,
    pub temp_confirmed: Option<bool>,
    pub temp_staff_name: Option<String>,
    pub notes: Option<String>,
}

/// PATCH /api/v1/shifts/:id — read-merge-write so the custom-time invariant
/// holds on type changes, then the week is re-read.
pub async fn update_shift(
    State(state): State<AppState>,
    Path(shift_id): Path<i64>,
    Json(b): Json<PatchShiftBody>,
) -> Result<Json<Vec<ShiftWithStaff>>, (StatusCode, String)> {
    let cur = query_as::<_, Shift>(r#"SELECT * FROM public.shifts WHERE shift_id=$1"#)
        .bind(shift_id)
        .fetch_optional(&state.pool).await.map_err(internal_error)?
        .ok_or((StatusCode::NOT_FOUND, "shift not found".to_string()))?;

    let shift_type_str = b.shift_type.unwrap_or(cur.shift_type);
    let Some(shift_type) = ShiftType::parse(&shift_type_str) else {
        return Err(bad_request(format!("unknown shift type '{shift_type_str}'")));
    };
    let (custom_start, custom_end) = if shift_type == ShiftType::Custom {
        let start = b.custom_start.or(cur.custom_start);
        let end = b.custom_end.or(cur.custom_end);
        match (start, end) {
            (Some(s), Some(e)) => (Some(s), Some(e)),
            _ => return Err(bad_request("custom shifts need both custom_start and custom_end")),
        }
    } else {
        (None, None)
    };

    query(
        r#"
        UPDATE public.shifts SET
          staff_id = $2, shift_date = $3, shift_type = $4,
          custom_start = $5, custom_end = $6, is_oncall = $7, facility_id = $8,
          is_temp_staff = $9, temp_confirmed = $10, temp_staff_name = $11, notes = $12
        WHERE shift_id = $1
        "#
    )
    .bind(shift_id)
    .bind(b.staff_id.or(cur.staff_id))
    .bind(b.shift_date.unwrap_or(cur.shift_date))
    .bind(shift_type.as_str())
    .bind(custom_start)
    .bind(custom_end)
    .bind(b.is_oncall.unwrap_or(cur.is_oncall))
    .bind(b.facility_id.or(cur.facility_id))
    .bind(b.is_temp_staff.unwrap_or(cur.is_temp_staff))
    .bind(b.temp_confirmed.unwrap_or(cur.temp_confirmed))
    .bind(b.temp_staff_name.or(cur.temp_staff_name))
    .bind(b.notes.or(cur.notes))
    .execute(&state.pool).await.map_err(internal_error)?;

    let rows = load_week_shifts(&state.pool, cur.rota_week_id).await.map_err(internal_error)?;
    Ok(Json(rows))
}

pub async fn delete_shift(
    State(state): State<AppState>,
    Path(shift_id): Path<i64>,
) -> Result<Json<Vec<ShiftWithStaff>>, (StatusCode, String)> {
    let week_id: Option<(i64,)> = query_as(
        r#"DELETE FROM public.shifts WHERE shift_id=$1 RETURNING rota_week_id"#)
        .bind(shift_id)
        .fetch_optional(&state.pool).await.map_err(internal_error)?;
    let Some((week_id,)) = week_id else {
        return Err((StatusCode::NOT_FOUND, "shift not found".to_string()));
    };

    let rows = load_week_shifts(&state.pool, week_id).await.map_err(internal_error)?;
    Ok(Json(rows))
}
