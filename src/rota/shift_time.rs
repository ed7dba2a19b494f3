// src/rota/shift_time.rs

/// Shift categorization: morning, afternoon, whole opening day, or an
/// explicit time range carried on the shift itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftType {
    Am,
    Pm,
    FullDay,
    Custom,
}

impl ShiftType {
    /// Parses the wire/DB string. Unknown values are `None`; callers degrade
    /// (zero hours, no room coverage) rather than erroring.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "am" => Some(Self::Am),
            "pm" => Some(Self::Pm),
            "full_day" => Some(Self::FullDay),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Am => "am",
            Self::Pm => "pm",
            Self::FullDay => "full_day",
            Self::Custom => "custom",
        }
    }

    /// Does a shift of this type provide morning cover?
    pub fn covers_am(self) -> bool {
        matches!(self, Self::Am | Self::FullDay)
    }

    /// Does a shift of this type provide afternoon cover?
    pub fn covers_pm(self) -> bool {
        matches!(self, Self::Pm | Self::FullDay)
    }
}

/// The day's time boundaries a shift can resolve against: site opening hours
/// for `full_day`, the site rota rule's AM/PM bounds for `am`/`pm`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShiftBounds<'a> {
    pub site_open: Option<&'a str>,
    pub site_close: Option<&'a str>,
    pub am_start: Option<&'a str>,
    pub am_end: Option<&'a str>,
    pub pm_start: Option<&'a str>,
    pub pm_end: Option<&'a str>,
}

/// "HH:MM" or "HH:MM:SS" → minutes since midnight. Malformed input is
/// `None`; this is not an error boundary, callers validate upstream.
pub fn parse_time_to_minutes(time: &str) -> Option<i32> {
    let mut parts = time.split(':');
    let hours: i32 = parts.next()?.parse().ok()?;
    let minutes: i32 = parts.next()?.parse().ok()?;
    Some(hours * 60 + minutes)
}

/// Duration in hours for a shift, selecting the start/end pair by type.
/// Missing or unparseable inputs yield 0.0, and the result is clamped at
/// zero so malformed data (end before start) never produces a negative
/// duration.
pub fn calculate_shift_hours(
    shift_type: ShiftType,
    custom_start: Option<&str>,
    custom_end: Option<&str>,
    bounds: &ShiftBounds<'_>,
) -> f64 {
    let (start, end) = match shift_type {
        ShiftType::FullDay => (bounds.site_open, bounds.site_close),
        ShiftType::Am => (bounds.am_start, bounds.am_end),
        ShiftType::Pm => (bounds.pm_start, bounds.pm_end),
        ShiftType::Custom => (custom_start, custom_end),
    };
    let (Some(start), Some(end)) = (start, end) else {
        return 0.0;
    };
    let (Some(start), Some(end)) = (parse_time_to_minutes(start), parse_time_to_minutes(end))
    else {
        return 0.0;
    };
    (f64::from(end - start) / 60.0).max(0.0)
}

/// Human label for a shift's working period. Display only, never used for
/// calculation.
pub fn shift_time_display(
    shift_type: &str,
    custom_start: Option<&str>,
    custom_end: Option<&str>,
) -> String {
    match ShiftType::parse(shift_type) {
        Some(ShiftType::Am) => "AM".to_string(),
        Some(ShiftType::Pm) => "PM".to_string(),
        Some(ShiftType::FullDay) => "Full day".to_string(),
        Some(ShiftType::Custom) => match (custom_start, custom_end) {
            (Some(s), Some(e)) => format!("{s} - {e}"),
            _ => "Custom".to_string(),
        },
        None => shift_type.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> ShiftBounds<'static> {
        ShiftBounds {
            site_open: Some("08:00"),
            site_close: Some("18:00"),
            am_start: Some("08:00"),
            am_end: Some("12:30"),
            pm_start: Some("13:00"),
            pm_end: Some("17:00"),
        }
    }

    #[test]
    fn parses_hh_mm_and_hh_mm_ss() {
        assert_eq!(parse_time_to_minutes("08:30"), Some(510));
        assert_eq!(parse_time_to_minutes("00:00"), Some(0));
        assert_eq!(parse_time_to_minutes("17:45:00"), Some(1065));
    }

    #[test]
    fn malformed_time_is_none() {
        assert_eq!(parse_time_to_minutes("eight"), None);
        assert_eq!(parse_time_to_minutes("0830"), None);
        assert_eq!(parse_time_to_minutes("8:xx"), None);
        assert_eq!(parse_time_to_minutes(""), None);
    }

    #[test]
    fn each_type_uses_its_own_boundaries() {
        let b = bounds();
        assert_eq!(calculate_shift_hours(ShiftType::FullDay, None, None, &b), 10.0);
        assert_eq!(calculate_shift_hours(ShiftType::Am, None, None, &b), 4.5);
        assert_eq!(calculate_shift_hours(ShiftType::Pm, None, None, &b), 4.0);
        assert_eq!(
            calculate_shift_hours(ShiftType::Custom, Some("09:00"), Some("15:00"), &b),
            6.0
        );
    }

    #[test]
    fn non_custom_types_ignore_custom_times() {
        let b = bounds();
        let with_custom =
            calculate_shift_hours(ShiftType::Am, Some("00:00"), Some("23:59"), &b);
        let without = calculate_shift_hours(ShiftType::Am, None, None, &b);
        assert_eq!(with_custom, without);
    }

    #[test]
    fn custom_ignores_site_and_rule_boundaries() {
        let empty = ShiftBounds::default();
        assert_eq!(
            calculate_shift_hours(ShiftType::Custom, Some("10:00"), Some("12:00"), &empty),
            2.0
        );
    }

    #[test]
    fn missing_inputs_degrade_to_zero() {
        let empty = ShiftBounds::default();
        assert_eq!(calculate_shift_hours(ShiftType::FullDay, None, None, &empty), 0.0);
        assert_eq!(calculate_shift_hours(ShiftType::Custom, Some("09:00"), None, &bounds()), 0.0);
        assert_eq!(
            calculate_shift_hours(ShiftType::Custom, Some("bad"), Some("12:00"), &bounds()),
            0.0
        );
    }

    #[test]
    fn end_before_start_clamps_to_zero() {
        assert_eq!(
            calculate_shift_hours(ShiftType::Custom, Some("17:00"), Some("09:00"), &bounds()),
            0.0
        );
    }

    #[test]
    fn display_labels() {
        assert_eq!(shift_time_display("am", None, None), "AM");
        assert_eq!(shift_time_display("pm", None, None), "PM");
        assert_eq!(shift_time_display("full_day", None, None), "Full day");
        assert_eq!(
            shift_time_display("custom", Some("07:30"), Some("16:00")),
            "07:30 - 16:00"
        );
        assert_eq!(shift_time_display("custom", Some("07:30"), None), "Custom");
    }
}
