// src/rota/rules.rs
//
// Staffing rule engine. `validate_day` is a pure function over one day's
// data; writes are never blocked on it (publishing a week with violations is
// allowed), it only reports.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::models::{DayOpeningHours, Facility, OnCallAssignment, Shift, StaffProfile};
use crate::rota::shift_time::ShiftType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    NoOncall,
    EmptyRoom,
    CrossSite,
    TempNotConfirmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleViolation {
    pub rule_type: RuleType,
    pub severity: Severity,
    pub date: NaiveDate,
    pub description: String,
    pub facility_id: Option<i64>,
    pub slot: Option<i32>,
    pub period: Option<&'static str>, // "AM" | "PM", empty-room checks only
}

/// Site-scoped inputs shared by every day of a validation run.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    pub clinic_rooms: &'a [Facility],
    pub staff: &'a [StaffProfile],
    pub current_site_id: i64,
    pub require_oncall: bool,
}

/// Evaluates all four staffing checks for one date. Closed days are never in
/// violation. The checks are independent; all of them run every time, and
/// the output order is fixed (on-call slots, then rooms, then cross-site,
/// then unconfirmed temps, each in input order).
pub fn validate_day(
    date: NaiveDate,
    shifts: &[Shift],
    oncalls: &[OnCallAssignment],
    hours: &DayOpeningHours,
    ctx: &ValidationContext<'_>,
) -> Vec<RuleViolation> {
    if hours.closed {
        return Vec::new();
    }

    let mut out = Vec::new();
    let day_shifts: Vec<&Shift> = shifts.iter().filter(|s| s.shift_date == date).collect();

    // 1. On-call coverage for slots 1..3. This check runs even when the
    // site's rota rule has `require_oncall` unset; the flag is carried in
    // the context but not consulted, matching the shipped behavior.
    for slot in 1..=3 {
        let covered = oncalls.iter().any(|o| {
            o.oncall_date == date
                && o.slot == slot
                && (o.staff_id.is_some()
                    || o.temp_staff_name.as_deref().is_some_and(|n| !n.trim().is_empty()))
        });
        if !covered {
            let (severity, description) = if slot == 1 {
                (Severity::Error, "No on-call manager assigned".to_string())
            } else {
                (
                    Severity::Warning,
                    format!("No on-call doctor assigned (slot {slot})"),
                )
            };
            out.push(RuleViolation {
                rule_type: RuleType::NoOncall,
                severity,
                date,
                description,
                facility_id: None,
                slot: Some(slot),
                period: None,
            });
        }
    }

    // 2. Empty clinic rooms, AM and PM halves checked independently.
    for room in ctx.clinic_rooms.iter().filter(|f| f.facility_type == "clinic_room") {
        let covered = |am: bool| {
            day_shifts.iter().any(|s| {
                !s.is_oncall
                    && s.facility_id == Some(room.facility_id)
                    && ShiftType::parse(&s.shift_type)
                        .is_some_and(|t| if am { t.covers_am() } else { t.covers_pm() })
            })
        };
        for (am, period) in [(true, "AM"), (false, "PM")] {
            if !covered(am) {
                out.push(RuleViolation {
                    rule_type: RuleType::EmptyRoom,
                    severity: Severity::Warning,
                    date,
                    description: format!("{} has no {period} cover", room.name),
                    facility_id: Some(room.facility_id),
                    slot: None,
                    period: Some(period),
                });
            }
        }
    }

    // 3. Cross-site staffing. External temps carry no staff reference and
    // have no home site, so they are exempt.
    for s in &day_shifts {
        if s.is_oncall {
            continue;
        }
        let Some(staff_id) = s.staff_id else { continue };
        let Some(profile) = ctx.staff.iter().find(|p| p.staff_id == staff_id) else {
            continue;
        };
        if profile.site_id.is_some_and(|home| home != ctx.current_site_id) {
            out.push(RuleViolation {
                rule_type: RuleType::CrossSite,
                severity: Severity::Warning,
                date,
                description: format!("{} is based at another site", profile.full_name),
                facility_id: s.facility_id,
                slot: None,
                period: None,
            });
        }
    }

    // 4. Unconfirmed temporary staff, regardless of site or room.
    for s in &day_shifts {
        if s.is_temp_staff && !s.temp_confirmed {
            let name = s.temp_staff_name.as_deref().unwrap_or("Temporary staff");
            out.push(RuleViolation {
                rule_type: RuleType::TempNotConfirmed,
                severity: Severity::Error,
                date,
                description: format!("{name} is not confirmed"),
                facility_id: s.facility_id,
                slot: None,
                period: None,
            });
        }
    }

    out
}

/// Runs `validate_day` over the 7 dates from `week_start`, selecting each
/// date's opening hours by Monday-first weekday index. A missing entry is
/// treated as closed. Output is concatenated in day order.
pub fn validate_week(
    week_start: NaiveDate,
    shifts: &[Shift],
    oncalls: &[OnCallAssignment],
    opening_hours: &[DayOpeningHours],
    ctx: &ValidationContext<'_>,
) -> Vec<RuleViolation> {
    let closed = DayOpeningHours { closed: true, ..Default::default() };
    let mut out = Vec::new();
    for offset in 0..7 {
        let date = week_start + Duration::days(offset);
        let idx = date.weekday().num_days_from_monday() as usize;
        let hours = opening_hours.get(idx).unwrap_or(&closed);
        out.extend(validate_day(date, shifts, oncalls, hours, ctx));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, day).unwrap()
    }

    fn open_day() -> DayOpeningHours {
        DayOpeningHours {
            closed: false,
            am_open: Some("08:00".into()),
            am_close: Some("12:30".into()),
            pm_open: Some("13:00".into()),
            pm_close: Some("18:00".into()),
        }
    }

    fn shift(date: NaiveDate, shift_type: &str) -> Shift {
        Shift {
            shift_id: 0,
            rota_week_id: 1,
            staff_id: Some(10),
            shift_date: date,
            shift_type: shift_type.to_string(),
            custom_start: None,
            custom_end: None,
            is_oncall: false,
            facility_id: None,
            is_temp_staff: false,
            temp_confirmed: false,
            temp_staff_name: None,
            notes: None,
        }
    }

    fn oncall(date: NaiveDate, slot: i32) -> OnCallAssignment {
        OnCallAssignment {
            oncall_id: 0,
            organization_id: 1,
            oncall_date: date,
            slot,
            staff_id: Some(10),
            temp_staff_name: None,
            confirmed: true,
            shift_period: "full_day".to_string(),
        }
    }

    fn room(facility_id: i64, name: &str) -> Facility {
        Facility {
            facility_id,
            site_id: 1,
            name: name.to_string(),
            facility_type: "clinic_room".to_string(),
        }
    }

    fn profile(staff_id: i64, site_id: Option<i64>, name: &str) -> StaffProfile {
        StaffProfile {
            staff_id,
            organization_id: 1,
            site_id,
            full_name: name.to_string(),
            job_title: Some("Doctor".to_string()),
            is_active: true,
        }
    }

    fn ctx<'a>(
        rooms: &'a [Facility],
        staff: &'a [StaffProfile],
    ) -> ValidationContext<'a> {
        ValidationContext {
            clinic_rooms: rooms,
            staff,
            current_site_id: 1,
            require_oncall: true,
        }
    }

    #[test]
    fn closed_day_is_never_in_violation() {
        let closed = DayOpeningHours { closed: true, ..Default::default() };
        let rooms = [room(5, "Room 1")];
        let mut temp = shift(d(1), "am");
        temp.is_temp_staff = true;
        let shifts = [temp];
        let out = validate_day(d(1), &shifts, &[], &closed, &ctx(&rooms, &[]));
        assert!(out.is_empty());
    }

    #[test]
    fn missing_oncalls_yield_three_violations() {
        let out = validate_day(d(1), &[], &[], &open_day(), &ctx(&[], &[]));
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|v| v.rule_type == RuleType::NoOncall));
        assert_eq!(out[0].slot, Some(1));
        assert_eq!(out[0].severity, Severity::Error);
        assert_eq!(out[1].slot, Some(2));
        assert_eq!(out[1].severity, Severity::Warning);
        assert_eq!(out[2].slot, Some(3));
        assert_eq!(out[2].severity, Severity::Warning);
    }

    #[test]
    fn oncall_check_ignores_require_oncall_flag() {
        let mut c = ctx(&[], &[]);
        c.require_oncall = false;
        let out = validate_day(d(1), &[], &[], &open_day(), &c);
        assert_eq!(out.iter().filter(|v| v.rule_type == RuleType::NoOncall).count(), 3);
    }

    #[test]
    fn slot_satisfied_by_staff_or_temp_name() {
        let mut by_temp = oncall(d(1), 2);
        by_temp.staff_id = None;
        by_temp.temp_staff_name = Some("Locum Dr".to_string());
        let mut empty_name = oncall(d(1), 3);
        empty_name.staff_id = None;
        empty_name.temp_staff_name = Some("  ".to_string());
        let oncalls = [oncall(d(1), 1), by_temp, empty_name];
        let out = validate_day(d(1), &[], &oncalls, &open_day(), &ctx(&[], &[]));
        // Slot 3's blank temp name does not count as coverage.
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].slot, Some(3));
    }

    #[test]
    fn am_only_room_flags_pm_half() {
        let rooms = [room(5, "Room 1")];
        let mut am = shift(d(1), "am");
        am.facility_id = Some(5);
        let shifts = [am];
        let oncalls = [oncall(d(1), 1), oncall(d(1), 2), oncall(d(1), 3)];
        let staff = [profile(10, Some(1), "Ana")];
        let out = validate_day(d(1), &shifts, &oncalls, &open_day(), &ctx(&rooms, &staff));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].rule_type, RuleType::EmptyRoom);
        assert_eq!(out[0].period, Some("PM"));
        assert_eq!(out[0].facility_id, Some(5));
    }

    #[test]
    fn full_day_shift_covers_both_halves() {
        let rooms = [room(5, "Room 1")];
        let mut full = shift(d(1), "full_day");
        full.facility_id = Some(5);
        let shifts = [full];
        let staff = [profile(10, Some(1), "Ana")];
        let oncalls = [oncall(d(1), 1), oncall(d(1), 2), oncall(d(1), 3)];
        let out = validate_day(d(1), &shifts, &oncalls, &open_day(), &ctx(&rooms, &staff));
        assert!(out.is_empty());
    }

    #[test]
    fn oncall_shifts_do_not_cover_rooms() {
        let rooms = [room(5, "Room 1")];
        let mut s = shift(d(1), "full_day");
        s.facility_id = Some(5);
        s.is_oncall = true;
        let shifts = [s];
        let oncalls = [oncall(d(1), 1), oncall(d(1), 2), oncall(d(1), 3)];
        let staff = [profile(10, Some(1), "Ana")];
        let out = validate_day(d(1), &shifts, &oncalls, &open_day(), &ctx(&rooms, &staff));
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|v| v.rule_type == RuleType::EmptyRoom));
    }

    #[test]
    fn cross_site_staff_are_flagged_and_temps_exempt() {
        let staff = [profile(10, Some(2), "Ben"), profile(11, Some(1), "Ana")];
        let away = shift(d(1), "am");
        let mut home = shift(d(1), "pm");
        home.staff_id = Some(11);
        let mut temp = shift(d(1), "pm");
        temp.staff_id = None;
        temp.is_temp_staff = true;
        temp.temp_confirmed = true;
        temp.temp_staff_name = Some("Locum".to_string());
        let shifts = [away, home, temp];
        let oncalls = [oncall(d(1), 1), oncall(d(1), 2), oncall(d(1), 3)];
        let out = validate_day(d(1), &shifts, &oncalls, &open_day(), &ctx(&[], &staff));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].rule_type, RuleType::CrossSite);
        assert_eq!(out[0].severity, Severity::Warning);
        assert!(out[0].description.contains("Ben"));
    }

    #[test]
    fn unconfirmed_temp_is_always_an_error() {
        let mut temp = shift(d(1), "am");
        temp.staff_id = None;
        temp.is_temp_staff = true;
        temp.temp_staff_name = Some("Locum Dr".to_string());
        let shifts = [temp];
        let oncalls = [oncall(d(1), 1), oncall(d(1), 2), oncall(d(1), 3)];
        let out = validate_day(d(1), &shifts, &oncalls, &open_day(), &ctx(&[], &[]));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].rule_type, RuleType::TempNotConfirmed);
        assert_eq!(out[0].severity, Severity::Error);
    }

    #[test]
    fn confirmed_temp_is_clean() {
        let mut temp = shift(d(1), "am");
        temp.staff_id = None;
        temp.is_temp_staff = true;
        temp.temp_confirmed = true;
        let shifts = [temp];
        let oncalls = [oncall(d(1), 1), oncall(d(1), 2), oncall(d(1), 3)];
        let out = validate_day(d(1), &shifts, &oncalls, &open_day(), &ctx(&[], &[]));
        assert!(out.is_empty());
    }

    #[test]
    fn checks_emit_in_fixed_order() {
        let rooms = [room(5, "Room 1")];
        let staff = [profile(10, Some(2), "Ben")];
        let mut temp = shift(d(1), "pm");
        temp.staff_id = None;
        temp.is_temp_staff = true;
        let shifts = [shift(d(1), "am"), temp];
        let out = validate_day(d(1), &shifts, &[], &open_day(), &ctx(&rooms, &staff));
        let kinds: Vec<RuleType> = out.iter().map(|v| v.rule_type).collect();
        assert_eq!(
            kinds,
            vec![
                RuleType::NoOncall,
                RuleType::NoOncall,
                RuleType::NoOncall,
                RuleType::EmptyRoom,
                RuleType::EmptyRoom,
                RuleType::CrossSite,
                RuleType::TempNotConfirmed,
            ]
        );
    }

    #[test]
    fn week_selects_hours_by_weekday_and_keeps_day_order() {
        // 2024-07-01 is a Monday. Close Wednesday; leave the rest open.
        let monday = d(1);
        let mut hours = vec![open_day(); 7];
        hours[2].closed = true;
        let out = validate_week(monday, &[], &[], &hours, &ctx(&[], &[]));
        // 6 open days, 3 missing on-call slots each.
        assert_eq!(out.len(), 18);
        assert!(out.iter().all(|v| v.date != d(3)));
        let mut dates: Vec<NaiveDate> = out.iter().map(|v| v.date).collect();
        let sorted = { let mut s = dates.clone(); s.sort(); s };
        assert_eq!(dates, sorted);
        dates.dedup();
        assert_eq!(dates.len(), 6);
    }

    #[test]
    fn week_with_short_hours_array_treats_missing_days_as_closed() {
        let monday = d(1);
        let hours = vec![open_day(); 5]; // weekend entries absent
        let out = validate_week(monday, &[], &[], &hours, &ctx(&[], &[]));
        assert_eq!(out.len(), 15);
    }
}
