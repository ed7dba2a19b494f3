// src/routes/staff.rs

use axum::{extract::{Path, Query, State}, Json};
use serde::Deserialize;
use sqlx::{query_as, query};
use crate::{AppState, models::StaffProfile};
use super::internal_error;

#[derive(Deserialize)]
pub struct ListStaffQ {
    pub organization_id: Option<i64>,
    pub site_id: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Deserialize)]
pub struct CreateStaffBody {
    pub organization_id: i64,
    pub site_id: Option<i64>, // home site
    pub full_name: String,
    pub job_title: Option<String>,
}

#[derive(Deserialize)]
pub struct PatchStaffBody {
    pub site_id: Option<i64>,
    pub full_name: Option<String>,
    pub job_title: Option<String>,
    pub is_active: Option<bool>,
}

pub async fn create_staff(
    State(state): State<AppState>,
    Json(b): Json<CreateStaffBody>,
) -> Result<Json<StaffProfile>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, StaffProfile>(
        r#"
        INSERT INTO public.staff_profiles(organization_id, site_id, full_name, job_title)
        VALUES ($1,$2,$3,$4)
        RETURNING staff_id, organization_id, site_id, full_name, job_title, is_active
        "#
    )
    .bind(b.organization_id).bind(b.site_id).bind(b.full_name).bind(b.job_title)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn list_staff(
    State(state): State<AppState>,
    Query(q): Query<ListStaffQ>,
) -> Result<Json<Vec<StaffProfile>>, (axum::http::StatusCode, String)> {
    let limit = q.limit.unwrap_or(50).clamp(1, 500);
    let offset = q.offset.unwrap_or(0).max(0);

    let rows = match (q.organization_id, q.site_id) {
        (_, Some(site)) => {
            query_as::<_, StaffProfile>(
                r#"SELECT * FROM public.staff_profiles WHERE site_id=$1 ORDER BY full_name LIMIT $2 OFFSET $3"#)
                .bind(site).bind(limit).bind(offset)
                .fetch_all(&state.pool).await.map_err(internal_error)?
        }
        (Some(org), None) => {
            query_as::<_, StaffProfile>(
                r#"SELECT * FROM public.staff_profiles WHERE organization_id=$1 ORDER BY full_name LIMIT $2 OFFSET $3"#)
                .bind(org).bind(limit).bind(offset)
                .fetch_all(&state.pool).await.map_err(internal_error)?
        }
        (None, None) => {
            query_as::<_, StaffProfile>(
                r#"SELECT * FROM public.staff_profiles ORDER BY staff_id DESC LIMIT $1 OFFSET $2"#)
                .bind(limit).bind(offset)
                .fetch_all(&state.pool).await.map_err(internal_error)?
        }
    };
    Ok(Json(rows))
}

pub async fn patch_staff(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(b): Json<PatchStaffBody>,
) -> Result<Json<StaffProfile>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, StaffProfile>(
        r#"
        UPDATE public.staff_profiles SET
          site_id = COALESCE($2, site_id),
          full_name = COALESCE($3, full_name),
          job_title = COALESCE($4, job_title),
          is_active = COALESCE($5, is_active)
        WHERE staff_id = $1
        RETURNING staff_id, organization_id, site_id, full_name, job_title, is_active
        "#
    )
    .bind(id).bind(b.site_id).bind(b.full_name).bind(b.job_title).bind(b.is_active)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn delete_staff(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, (axum::http::StatusCode, String)> {
    let res = query(r#"DELETE FROM public.staff_profiles WHERE staff_id=$1"#)
        .bind(id).execute(&state.pool).await.map_err(internal_error)?;
    Ok(Json(serde_json::json!({"deleted": res.rows_affected() > 0})))
}
