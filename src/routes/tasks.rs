// src/routes/tasks.rs
//
// Recurring operational tasks. Occurrences are never stored; every list
// recomputes the current due date from the template and the clock, and a
// completion row keyed by (task, due_date) marks one occurrence done.

use axum::{extract::{Path, Query, State}, Json};
use axum::http::StatusCode;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{query, query_as};
use std::collections::HashSet;

use crate::models::{TaskCompletion, WorkflowTask};
use crate::rota::recurrence::{current_due_date, eta, format_eta, RecurrencePattern};
use crate::AppState;
use super::{bad_request, internal_error};

#[derive(Deserialize)]
pub struct CreateTaskBody {
    pub site_id: Option<i64>,
    pub facility_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub assigned_to: Option<i64>,
    pub job_family: Option<String>,
    pub initial_due_date: NaiveDate,
    pub recurrence: String, // daily|weekly|monthly|custom
    pub interval_days: Option<i32>,
}

pub async fn create_task(
    State(state): State<AppState>,
    Path(org_id): Path<i64>,
    Json(b): Json<CreateTaskBody>,
) -> Result<Json<WorkflowTask>, (StatusCode, String)> {
    if RecurrencePattern::parse(&b.recurrence).is_none() {
        return Err(bad_request(format!("unknown recurrence pattern '{}'", b.recurrence)));
    }
    let row = query_as::<_, WorkflowTask>(
        r#"
        INSERT INTO public.workflow_tasks
          (organization_id, site_id, facility_id, name, description, assigned_to,
           job_family, initial_due_date, recurrence, interval_days)
        VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
        RETURNING task_id, organization_id, site_id, facility_id, name, description,
                  assigned_to, job_family, initial_due_date, recurrence, interval_days,
                  is_active, created_at
        "#
    )
    .bind(org_id).bind(b.site_id).bind(b.facility_id).bind(b.name).bind(b.description)
    .bind(b.assigned_to).bind(b.job_family).bind(b.initial_due_date).bind(b.recurrence)
    .bind(b.interval_days)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

#[derive(Deserialize)]
pub struct ListTasksQ {
    pub site_id: Option<i64>,
    #[serde(default)] pub include_inactive: bool,
    pub as_of: Option<NaiveDate>, // defaults to the current date
}

#[derive(Serialize)]
pub struct TaskWithDue {
    #[serde(flatten)]
    pub task: WorkflowTask,
    pub current_due_date: NaiveDate,
    pub eta_days: i64,
    pub is_overdue: bool,
    pub is_today: bool,
    pub eta_label: String,
    pub completed: bool,
}

/// GET /api/v1/organizations/:org_id/tasks
///
/// Each task comes back with its derived current occurrence: due date, ETA
/// and whether a completion has been recorded for exactly that date.
pub async fn list_tasks(
    State(state): State<AppState>,
    Path(org_id): Path<i64>,
    Query(q): Query<ListTasksQ>,
) -> Result<Json<Vec<TaskWithDue>>, (StatusCode, String)> {
    let today = q.as_of.unwrap_or_else(|| Utc::now().date_naive());

    let tasks = match (q.site_id, q.include_inactive) {
        (Some(site), false) => query_as::<_, WorkflowTask>(
            r#"SELECT * FROM public.workflow_tasks WHERE organization_id=$1 AND site_id=$2 AND is_active ORDER BY task_id"#)
            .bind(org_id).bind(site)
            .fetch_all(&state.pool).await.map_err(internal_error)?,
        (Some(site), true) => query_as::<_, WorkflowTask>(
            r#"SELECT * FROM public.workflow_tasks WHERE organization_id=$1 AND site_id=$2 ORDER BY task_id"#)
            .bind(org_id).bind(site)
            .fetch_all(&state.pool).await.map_err(internal_error)?,
        (None, false) => query_as::<_, WorkflowTask>(
            r#"SELECT * FROM public.workflow_tasks WHERE organization_id=$1 AND is_active ORDER BY task_id"#)
            .bind(org_id)
            .fetch_all(&state.pool).await.map_err(internal_error)?,
        (None, true) => query_as::<_, WorkflowTask>(
            r#"SELECT * FROM public.workflow_tasks WHERE organization_id=$1 ORDER BY task_id"#)
            .bind(org_id)
            .fetch_all(&state.pool).await.map_err(internal_error)?,
    };

    let completions = query_as::<_, (i64, NaiveDate)>(
        r#"
        SELECT c.task_id, c.due_date FROM public.task_completions c
        JOIN public.workflow_tasks t ON t.task_id = c.task_id
        WHERE t.organization_id = $1
        "#
    )
    .bind(org_id)
    .fetch_all(&state.pool).await.map_err(internal_error)?;
    let completed_keys: HashSet<(i64, NaiveDate)> = completions.into_iter().collect();

    let out = tasks
        .into_iter()
        .map(|t| {
            // The write path validates patterns; anything unreadable in old
            // rows falls back to a daily walk.
            let pattern =
                RecurrencePattern::parse(&t.recurrence).unwrap_or(RecurrencePattern::Daily);
            let due = current_due_date(t.initial_due_date, pattern, t.interval_days, today);
            let e = eta(due, today);
            let completed = completed_keys.contains(&(t.task_id, due));
            TaskWithDue {
                current_due_date: due,
                eta_days: e.days,
                is_overdue: e.is_overdue,
                is_today: e.is_today,
                eta_label: format_eta(&e),
                completed,
                task: t,
            }
        })
        .collect();
    Ok(Json(out))
}

#[derive(Deserialize)]
pub struct PatchTaskBody {
    pub site_id: Option<i64>,
    pub facility_id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub assigned_to: Option<i64>,
    pub job_family: Option<String>,
    pub initial_due_date: Option<NaiveDate>,
    pub recurrence: Option<String>,
    pub interval_days: Option<i32>,
    pub is_active: Option<bool>,
}

pub async fn patch_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(b): Json<PatchTaskBody>,
) -> Result<Json<WorkflowTask>, (StatusCode, String)> {
    if let Some(r) = &b.recurrence {
        if RecurrencePattern::parse(r).is_none() {
            return Err(bad_request(format!("unknown recurrence pattern '{r}'")));
        }
    }
    let row = query_as::<_, WorkflowTask>(
        r#"
        UPDATE public.workflow_tasks SET
          site_id = COALESCE($2, site_id),
          facility_id = COALESCE($3, facility_id),
          name = COALESCE($4, name),
          description = COALESCE($5, description),
          assigned_to = COALESCE($6, assigned_to),
          job_family = COALESCE($7, job_family),
          initial_due_date = COALESCE($8, initial_due_date),
          recurrence = COALESCE($9, recurrence),
          interval_days = COALESCE($10, interval_days),
          is_active = COALESCE($11, is_active)
        WHERE task_id = $1
        RETURNING task_id, organization_id, site_id, facility_id, name, description,
                  assigned_to, job_family, initial_due_date, recurrence, interval_days,
                  is_active, created_at
        "#
    )
    .bind(id).bind(b.site_id).bind(b.facility_id).bind(b.name).bind(b.description)
    .bind(b.assigned_to).bind(b.job_family).bind(b.initial_due_date).bind(b.recurrence)
    .bind(b.interval_days).bind(b.is_active)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let res = query(r#"DELETE FROM public.workflow_tasks WHERE task_id=$1"#)
        .bind(id).execute(&state.pool).await.map_err(internal_error)?;
    Ok(Json(serde_json::json!({"deleted": res.rows_affected() > 0})))
}

#[derive(Deserialize)]
pub struct CompleteTaskBody {
    pub due_date: NaiveDate, // the occurrence being completed
    pub completed_by: Option<i64>,
    pub comments: Option<String>,
}

/// POST /api/v1/tasks/:id/completions — upsert on (task, due_date), so
/// re-completing the same occurrence refreshes the record instead of
/// duplicating it.
pub async fn complete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(b): Json<CompleteTaskBody>,
) -> Result<Json<TaskCompletion>, (StatusCode, String)> {
    let row = query_as::<_, TaskCompletion>(
        r#"
        INSERT INTO public.task_completions(task_id, due_date, completed_by, comments, completed_at)
        VALUES ($1,$2,$3,$4, now())
        ON CONFLICT (task_id, due_date)
        DO UPDATE SET completed_by = EXCLUDED.completed_by,
                      comments = EXCLUDED.comments,
                      completed_at = now()
        RETURNING completion_id, task_id, due_date, completed_by, comments, completed_at
        "#
    )
    .bind(id).bind(b.due_date).bind(b.completed_by).bind(b.comments)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn list_completions(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<TaskCompletion>>, (StatusCode, String)> {
    let rows = query_as::<_, TaskCompletion>(
        r#"SELECT * FROM public.task_completions WHERE task_id=$1 ORDER BY due_date DESC"#)
        .bind(id)
        .fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(rows))
}
