// src/rota/recurrence.rs
//
// Recurring task occurrences are derived, never stored: a task template is
// the single source of truth, and the "current due date" is recomputed from
// (initial_due_date, pattern, interval, today) on every read.

use chrono::{Duration, Months, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrencePattern {
    Daily,
    Weekly,
    Monthly,
    Custom,
}

impl RecurrencePattern {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

/// The occurrence after `date`. Monthly steps keep the day-of-month, clamped
/// to the target month's length (Jan 31 → Feb 28/29). A custom interval that
/// is unset or < 1 steps by one day, which also guarantees the walk in
/// `current_due_date` terminates.
pub fn next_due_date(
    date: NaiveDate,
    pattern: RecurrencePattern,
    interval_days: Option<i32>,
) -> NaiveDate {
    match pattern {
        RecurrencePattern::Daily => date + Duration::days(1),
        RecurrencePattern::Weekly => date + Duration::weeks(1),
        RecurrencePattern::Monthly => date + Months::new(1),
        RecurrencePattern::Custom => {
            let step = interval_days.filter(|d| *d >= 1).unwrap_or(1);
            date + Duration::days(i64::from(step))
        }
    }
}

/// The template's current due date as of `today`.
///
/// A future (or today) initial date is returned unchanged. Otherwise the
/// occurrences are walked forward from the initial date and the greatest one
/// not after `today` is returned: an occurrence landing exactly on `today`
/// shows as due today, but a strictly future occurrence never replaces the
/// most recently missed one, so overdue tasks stay visibly overdue.
pub fn current_due_date(
    initial: NaiveDate,
    pattern: RecurrencePattern,
    interval_days: Option<i32>,
    today: NaiveDate,
) -> NaiveDate {
    if initial >= today {
        return initial;
    }
    let mut current = initial;
    while current < today {
        let next = next_due_date(current, pattern, interval_days);
        if next > today {
            break; // keep the overdue occurrence rather than skipping ahead
        }
        current = next;
    }
    current
}

/// Signed day-count to a due date. Negative means overdue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Eta {
    pub days: i64,
    pub is_overdue: bool,
    pub is_today: bool,
}

pub fn eta(due_date: NaiveDate, today: NaiveDate) -> Eta {
    let days = (due_date - today).num_days();
    Eta {
        days,
        is_overdue: days < 0,
        is_today: days == 0,
    }
}

/// Presentation label for an ETA.
pub fn format_eta(eta: &Eta) -> String {
    match eta.days {
        d if d < -1 => format!("{} days overdue", -d),
        -1 => "1 day overdue".to_string(),
        0 => "due today".to_string(),
        1 => "due tomorrow".to_string(),
        d => format!("due in {d} days"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn future_initial_is_never_advanced() {
        let due = current_due_date(d(2024, 6, 10), RecurrencePattern::Daily, None, d(2024, 6, 1));
        assert_eq!(due, d(2024, 6, 10));
        let due = current_due_date(d(2024, 6, 1), RecurrencePattern::Weekly, None, d(2024, 6, 1));
        assert_eq!(due, d(2024, 6, 1));
    }

    #[test]
    fn daily_walk_lands_on_today() {
        // 01-01 → 01-02 → 01-03 → 01-04 → 01-05: the last step is exactly
        // today, so the task shows as due today rather than overdue.
        let due = current_due_date(d(2024, 1, 1), RecurrencePattern::Daily, None, d(2024, 1, 5));
        assert_eq!(due, d(2024, 1, 5));
        assert!(eta(due, d(2024, 1, 5)).is_today);
    }

    #[test]
    fn weekly_prefers_overdue_over_upcoming() {
        // Occurrences: 01-01, 01-08, 01-15. On the 10th the 8th is kept; the
        // walk never jumps to the future 15th.
        let due = current_due_date(d(2024, 1, 1), RecurrencePattern::Weekly, None, d(2024, 1, 10));
        assert_eq!(due, d(2024, 1, 8));
        assert!(eta(due, d(2024, 1, 10)).is_overdue);
    }

    #[test]
    fn monthly_clamps_end_of_month() {
        assert_eq!(
            next_due_date(d(2024, 1, 31), RecurrencePattern::Monthly, None),
            d(2024, 2, 29)
        );
        assert_eq!(
            next_due_date(d(2023, 1, 31), RecurrencePattern::Monthly, None),
            d(2023, 2, 28)
        );
        assert_eq!(
            next_due_date(d(2024, 3, 15), RecurrencePattern::Monthly, None),
            d(2024, 4, 15)
        );
    }

    #[test]
    fn custom_interval_defaults_to_one_day() {
        assert_eq!(
            next_due_date(d(2024, 1, 1), RecurrencePattern::Custom, Some(14)),
            d(2024, 1, 15)
        );
        assert_eq!(
            next_due_date(d(2024, 1, 1), RecurrencePattern::Custom, None),
            d(2024, 1, 2)
        );
        assert_eq!(
            next_due_date(d(2024, 1, 1), RecurrencePattern::Custom, Some(0)),
            d(2024, 1, 2)
        );
        assert_eq!(
            next_due_date(d(2024, 1, 1), RecurrencePattern::Custom, Some(-3)),
            d(2024, 1, 2)
        );
    }

    #[test]
    fn nth_occurrence_round_trip() {
        // Stepping n times from the initial date must agree with
        // current_due_date evaluated exactly on that nth occurrence.
        for pattern in [
            RecurrencePattern::Daily,
            RecurrencePattern::Weekly,
            RecurrencePattern::Monthly,
            RecurrencePattern::Custom,
        ] {
            let initial = d(2024, 1, 31);
            let mut occurrence = initial;
            for _ in 0..5 {
                occurrence = next_due_date(occurrence, pattern, Some(10));
                assert_eq!(
                    current_due_date(initial, pattern, Some(10), occurrence),
                    occurrence
                );
            }
        }
    }

    #[test]
    fn eta_invariants() {
        let today = d(2024, 5, 20);
        for offset in -10i64..=10 {
            let e = eta(today + Duration::days(offset), today);
            assert_eq!(e.days, offset);
            assert_eq!(e.is_overdue, offset < 0);
            assert_eq!(e.is_today, offset == 0);
            assert!(!(e.is_overdue && e.is_today));
        }
    }

    #[test]
    fn eta_labels() {
        assert_eq!(format_eta(&Eta { days: -3, is_overdue: true, is_today: false }), "3 days overdue");
        assert_eq!(format_eta(&Eta { days: -1, is_overdue: true, is_today: false }), "1 day overdue");
        assert_eq!(format_eta(&Eta { days: 0, is_overdue: false, is_today: true }), "due today");
        assert_eq!(format_eta(&Eta { days: 1, is_overdue: false, is_today: false }), "due tomorrow");
        assert_eq!(format_eta(&Eta { days: 6, is_overdue: false, is_today: false }), "due in 6 days");
    }
}
