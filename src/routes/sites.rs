// src/routes/sites.rs

use axum::{extract::{Path, State}, Json};
use serde::{Deserialize, Serialize};
use sqlx::{query_as, query, FromRow};
use crate::{AppState, models::Site};
use super::internal_error;

#[derive(Deserialize)]
pub struct CreateSiteBody {
    pub name: String,
    #[serde(default = "default_capacity")] pub am_capacity_per_room: i32,
    #[serde(default = "default_capacity")] pub pm_capacity_per_room: i32,
    #[serde(default = "default_opening_hours")] pub opening_hours: serde_json::Value,
}
fn default_capacity() -> i32 { 1 }
fn default_opening_hours() -> serde_json::Value { serde_json::json!([]) }

#[derive(Deserialize)]
pub struct PatchSiteBody {
    pub name: Option<String>,
    pub am_capacity_per_room: Option<i32>,
    pub pm_capacity_per_room: Option<i32>,
    pub opening_hours: Option<serde_json::Value>,
}

pub async fn create_site(
    State(state): State<AppState>,
    Path(org_id): Path<i64>,
    Json(body): Json<CreateSiteBody>,
) -> Result<Json<Site>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, Site>(
        r#"
        INSERT INTO public.sites(organization_id, name, am_capacity_per_room, pm_capacity_per_room, opening_hours)
        VALUES ($1,$2,$3,$4,$5)
        RETURNING site_id, organization_id, name, am_capacity_per_room, pm_capacity_per_room, opening_hours
        "#
    )
    .bind(org_id)
    .bind(&body.name)
    .bind(body.am_capacity_per_room)
    .bind(body.pm_capacity_per_room)
    .bind(&body.opening_hours)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

#[derive(Serialize, FromRow)]
pub struct SiteLite {
    pub site_id: i64,
    pub name: String,
}

pub async fn list_sites_for_org(
    State(state): State<AppState>,
    Path(org_id): Path<i64>,
) -> Result<Json<Vec<SiteLite>>, (axum::http::StatusCode, String)> {
    let rows = query_as::<_, SiteLite>(
        r#"
        SELECT site_id, name
        FROM public.sites
        WHERE organization_id = $1
        ORDER BY site_id
        "#
    )
    .bind(org_id)
    .fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(rows))
}

pub async fn get_site(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Site>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, Site>(r#"SELECT * FROM public.sites WHERE site_id = $1"#)
        .bind(id)
        .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn patch_site(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<PatchSiteBody>,
) -> Result<Json<Site>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, Site>(
        r#"
        UPDATE public.sites SET
          name = COALESCE($2, name),
          am_capacity_per_room = COALESCE($3, am_capacity_per_room),
          pm_capacity_per_room = COALESCE($4, pm_capacity_per_room),
          opening_hours = COALESCE($5, opening_hours)
        WHERE site_id = $1
        RETURNING site_id, organization_id, name, am_capacity_per_room, pm_capacity_per_room, opening_hours
        "#
    )
    .bind(id)
    .bind(body.name)
    .bind(body.am_capacity_per_room)
    .bind(body.pm_capacity_per_room)
    .bind(body.opening_hours)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn delete_site(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, (axum::http::StatusCode, String)> {
    let res = query(r#"DELETE FROM public.sites WHERE site_id = $1"#)
        .bind(id)
        .execute(&state.pool).await.map_err(internal_error)?;
    Ok(Json(serde_json::json!({ "deleted": res.rows_affected() > 0 })))
}
