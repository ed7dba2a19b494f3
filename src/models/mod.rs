// src/models/mod.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ───────────────────────────────────────
// Core tenancy
// ───────────────────────────────────────
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Organization {
    pub organization_id: i64,
    pub name: String,
    pub status: String,           // active|suspended
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Site {
    pub site_id: i64,
    pub organization_id: i64,
    pub name: String,
    pub am_capacity_per_room: i32,
    pub pm_capacity_per_room: i32,
    pub opening_hours: serde_json::Value, // jsonb: [DayOpeningHours; 7], Monday first
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Facility {
    pub facility_id: i64,
    pub site_id: i64,
    pub name: String,
    pub facility_type: String,    // clinic_room|office|equipment
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StaffProfile {
    pub staff_id: i64,
    pub organization_id: i64,
    pub site_id: Option<i64>,     // home site
    pub full_name: String,
    pub job_title: Option<String>,
    pub is_active: bool,
}

// ───────────────────────────────────────
// Rota scheduling
// ───────────────────────────────────────
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct RotaWeek {
    pub rota_week_id: i64,
    pub site_id: i64,
    pub week_start: NaiveDate,    // Monday-aligned
    pub status: String,           // draft|published
    pub created_by: Option<i64>,  // FK → staff_profiles
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Shift {
    pub shift_id: i64,
    pub rota_week_id: i64,
    pub staff_id: Option<i64>,    // None = external temp staff
    pub shift_date: NaiveDate,
    pub shift_type: String,       // am|pm|full_day|custom
    pub custom_start: Option<String>, // "HH:MM", custom shifts only
    pub custom_end: Option<String>,
    pub is_oncall: bool,
    pub facility_id: Option<i64>, // None = whole site
    pub is_temp_staff: bool,
    pub temp_confirmed: bool,
    pub temp_staff_name: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OnCallAssignment {
    pub oncall_id: i64,
    pub organization_id: i64,     // org-wide, not site-bound
    pub oncall_date: NaiveDate,
    pub slot: i32,                // 1 = manager, 2/3 = doctors
    pub staff_id: Option<i64>,
    pub temp_staff_name: Option<String>,
    pub confirmed: bool,
    pub shift_period: String,     // am|pm|full_day
}

// ───────────────────────────────────────
// Per-site rule configuration
// ───────────────────────────────────────
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct RotaRule {
    pub rota_rule_id: i64,
    pub site_id: i64,
    pub am_start: String,         // "HH:MM"
    pub am_end: String,
    pub pm_start: String,
    pub pm_end: String,
    pub require_oncall: bool,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct StaffingRule {
    pub staffing_rule_id: i64,
    pub rota_rule_id: i64,
    pub job_title: String,
    pub min_count: i32,
    pub max_count: Option<i32>,
}

// ───────────────────────────────────────
// Day confirmation audit overlay
// ───────────────────────────────────────
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct DayConfirmation {
    pub day_confirmation_id: i64,
    pub rota_week_id: i64,
    pub shift_date: NaiveDate,
    pub status: String,           // confirmed|confirmed_with_overrides
    pub confirmed_by: Option<i64>,
    pub confirmed_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct RuleOverride {
    pub rule_override_id: i64,
    pub rota_week_id: i64,
    pub shift_date: NaiveDate,
    pub rule_type: String,        // no_oncall|empty_room|cross_site|temp_not_confirmed
    pub description: String,
    pub reason: String,
    pub facility_id: Option<i64>,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

// ───────────────────────────────────────
// Recurring workflow tasks
// ───────────────────────────────────────
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct WorkflowTask {
    pub task_id: i64,
    pub organization_id: i64,
    pub site_id: Option<i64>,
    pub facility_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub assigned_to: Option<i64>, // FK → staff_profiles
    pub job_family: Option<String>,
    pub initial_due_date: NaiveDate,
    pub recurrence: String,       // daily|weekly|monthly|custom
    pub interval_days: Option<i32>, // custom recurrence only
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct TaskCompletion {
    pub completion_id: i64,
    pub task_id: i64,
    pub due_date: NaiveDate,
    pub completed_by: Option<i64>,
    pub comments: Option<String>,
    pub completed_at: DateTime<Utc>,
}

// ───────────────────────────────────────
// Shared shapes (jsonb payloads)
// ───────────────────────────────────────

/// One weekday's opening hours, as stored in `sites.opening_hours`
/// (array of 7, Monday first).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DayOpeningHours {
    #[serde(default)]
    pub closed: bool,
    pub am_open: Option<String>,  // "HH:MM"
    pub am_close: Option<String>,
    pub pm_open: Option<String>,
    pub pm_close: Option<String>,
}

// ───────────────────────────────────────
// DTOs helpful for endpoints
// ───────────────────────────────────────
#[derive(Debug, Serialize, Deserialize)]
pub struct UpsertCount { pub upserted: usize }

#[derive(Debug, Serialize, Deserialize)]
pub struct CopyCount { pub copied: usize, pub source_total: usize }
