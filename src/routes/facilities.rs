// src/routes/facilities.rs

use axum::{extract::{Path, Query, State}, Json};
use serde::Deserialize;
use sqlx::{query_as, query};
use crate::{AppState, models::Facility};
use super::internal_error;

#[derive(Deserialize)]
pub struct CreateFacilityBody {
    pub name: String,
    #[serde(default = "default_type")] pub facility_type: String, // clinic_room|office|equipment
}
fn default_type() -> String { "clinic_room".into() }

#[derive(Deserialize)]
pub struct ListQ { pub facility_type: Option<String> }

pub async fn create_facility(
    State(state): State<AppState>,
    Path(site_id): Path<i64>,
    Json(b): Json<CreateFacilityBody>,
) -> Result<Json<Facility>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, Facility>(
        r#"
        INSERT INTO public.facilities(site_id, name, facility_type)
        VALUES ($1,$2,$3)
        RETURNING facility_id, site_id, name, facility_type
        "#
    )
    .bind(site_id).bind(b.name).bind(b.facility_type)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn list_facilities(
    State(state): State<AppState>,
    Path(site_id): Path<i64>,
    Query(q): Query<ListQ>,
) -> Result<Json<Vec<Facility>>, (axum::http::StatusCode, String)> {
    let rows = if let Some(ft) = q.facility_type {
        query_as::<_, Facility>(
            r#"SELECT * FROM public.facilities WHERE site_id=$1 AND facility_type=$2 ORDER BY facility_id"#)
            .bind(site_id).bind(ft)
            .fetch_all(&state.pool).await.map_err(internal_error)?
    } else {
        query_as::<_, Facility>(
            r#"SELECT * FROM public.facilities WHERE site_id=$1 ORDER BY facility_id"#)
            .bind(site_id)
            .fetch_all(&state.pool).await.map_err(internal_error)?
    };
    Ok(Json(rows))
}

pub async fn delete_facility(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, (axum::http::StatusCode, String)> {
    let res = query(r#"DELETE FROM public.facilities WHERE facility_id=$1"#)
        .bind(id).execute(&state.pool).await.map_err(internal_error)?;
    Ok(Json(serde_json::json!({"deleted": res.rows_affected() > 0})))
}
