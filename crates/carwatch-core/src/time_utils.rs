use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use tracing::warn;

// ── Timestamp parsing ─────────────────────────────────────────────────────────

/// The log timestamp formats: ISO-like local date-time without a zone,
/// with or without fractional seconds; a space separator is tolerated.
const FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a log timestamp string into a [`NaiveDateTime`].
///
/// Returns `None` for empty strings or anything outside the fixed format;
/// the caller treats such rows as malformed.
pub fn parse_log_timestamp(s: &str) -> Option<NaiveDateTime> {
    if s.is_empty() {
        return None;
    }
    for fmt in FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ts);
        }
    }
    warn!("could not parse log timestamp \"{}\"", s);
    None
}

// ── Sampling-day attribution ──────────────────────────────────────────────────

/// The sampling day an event belongs to.
///
/// Events at or after `cutoff_hour` roll over to the next calendar day, so
/// that an evening salivette taken before bed counts towards the morning
/// it precedes.
pub fn sampling_date(ts: NaiveDateTime, cutoff_hour: u32) -> NaiveDate {
    if ts.time().hour() >= cutoff_hour {
        ts.date() + Duration::days(1)
    } else {
        ts.date()
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Render a timestamp in the export format (`2019-12-05T07:31:16`).
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Render the time-of-day part only (`07:31:16`).
pub fn format_time_of_day(ts: NaiveDateTime) -> String {
    ts.format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        parse_log_timestamp(s).unwrap()
    }

    // ── parse_log_timestamp ───────────────────────────────────────────────────

    #[test]
    fn test_parse_t_separator() {
        let parsed = parse_log_timestamp("2019-12-05T07:31:16").unwrap();
        assert_eq!(parsed.time().hour(), 7);
    }

    #[test]
    fn test_parse_space_separator() {
        assert!(parse_log_timestamp("2019-12-05 07:31:16").is_some());
    }

    #[test]
    fn test_parse_fractional_seconds() {
        let parsed = parse_log_timestamp("2019-12-05T07:31:16.418").unwrap();
        assert_eq!(parsed.and_utc().timestamp_subsec_millis(), 418);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_log_timestamp("").is_none());
        assert!(parse_log_timestamp("yesterday").is_none());
        assert!(parse_log_timestamp("2019-12-05").is_none());
        assert!(parse_log_timestamp("07:31:16").is_none());
    }

    // ── sampling_date ─────────────────────────────────────────────────────────

    #[test]
    fn test_sampling_date_before_cutoff() {
        let date = sampling_date(ts("2019-12-05T07:00:00"), 18);
        assert_eq!(date, NaiveDate::from_ymd_opt(2019, 12, 5).unwrap());
    }

    #[test]
    fn test_sampling_date_at_cutoff_rolls_over() {
        let date = sampling_date(ts("2019-12-05T18:00:00"), 18);
        assert_eq!(date, NaiveDate::from_ymd_opt(2019, 12, 6).unwrap());
    }

    #[test]
    fn test_sampling_date_just_before_cutoff() {
        let date = sampling_date(ts("2019-12-05T17:59:59"), 18);
        assert_eq!(date, NaiveDate::from_ymd_opt(2019, 12, 5).unwrap());
    }

    #[test]
    fn test_sampling_date_after_midnight_stays() {
        let date = sampling_date(ts("2019-12-06T00:30:00"), 18);
        assert_eq!(date, NaiveDate::from_ymd_opt(2019, 12, 6).unwrap());
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    #[test]
    fn test_format_timestamp() {
        assert_eq!(
            format_timestamp(ts("2019-12-05T07:31:16.418")),
            "2019-12-05T07:31:16"
        );
    }

    #[test]
    fn test_format_time_of_day() {
        assert_eq!(format_time_of_day(ts("2019-12-05T07:31:16")), "07:31:16");
    }
}
