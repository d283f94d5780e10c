//! Bucket Granularity Expressions
//!
//! Parses and renders the store's `<count>:<UNIT>` granularity expressions
//! (for example `15:MINUTES` or `1:HOURS`) and derives a bucket expression
//! from a panel interval.
//!
//! Rendering picks the largest unit that divides the duration exactly, so
//! `parse(render(d)) == d` holds for any positive duration and the emitted
//! expression never mixes units. `DAYS` is accepted on input but never
//! emitted; a multi-day bucket renders as hours.

use std::time::Duration;

use super::error::{SqlError, SqlResult};

/// Sentinel granularity meaning "derive the bucket from the panel interval"
pub const AUTO: &str = "auto";

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SECOND: u128 = 1_000_000_000;
const NANOS_PER_MINUTE: u128 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: u128 = 60 * NANOS_PER_MINUTE;

/// Units ordered largest-first for rendering
const RENDER_UNITS: &[(&str, u128)] = &[
    ("HOURS", NANOS_PER_HOUR),
    ("MINUTES", NANOS_PER_MINUTE),
    ("SECONDS", NANOS_PER_SECOND),
    ("MILLISECONDS", NANOS_PER_MILLI),
    ("MICROSECONDS", NANOS_PER_MICRO),
];

/// Parse a `<count>:<UNIT>` expression into a duration
///
/// The unit is matched case-insensitively against NANOSECONDS, MICROSECONDS,
/// MILLISECONDS, SECONDS, MINUTES, HOURS, and DAYS. The count must be a
/// positive integer.
pub fn parse(expr: &str) -> SqlResult<Duration> {
    let trimmed = expr.trim();
    let (count_str, unit_str) = trimmed.split_once(':').ok_or_else(|| {
        SqlError::Configuration(format!(
            "invalid granularity '{}': expected <count>:<UNIT>",
            trimmed
        ))
    })?;

    let count: u64 = count_str.trim().parse().map_err(|_| {
        SqlError::Configuration(format!(
            "invalid granularity '{}': count must be a positive integer",
            trimmed
        ))
    })?;
    if count == 0 {
        return Err(SqlError::Configuration(format!(
            "invalid granularity '{}': count must be a positive integer",
            trimmed
        )));
    }

    let unit_nanos: u128 = match unit_str.trim().to_uppercase().as_str() {
        "NANOSECONDS" => 1,
        "MICROSECONDS" => NANOS_PER_MICRO,
        "MILLISECONDS" => NANOS_PER_MILLI,
        "SECONDS" => NANOS_PER_SECOND,
        "MINUTES" => NANOS_PER_MINUTE,
        "HOURS" => NANOS_PER_HOUR,
        "DAYS" => 24 * NANOS_PER_HOUR,
        other => {
            return Err(SqlError::Configuration(format!(
                "invalid granularity unit '{}'",
                other
            )))
        }
    };

    let total = count as u128 * unit_nanos;
    let secs = (total / NANOS_PER_SECOND) as u64;
    let nanos = (total % NANOS_PER_SECOND) as u32;
    Ok(Duration::new(secs, nanos))
}

/// Render a duration as the store's `<count>:<UNIT>` expression
///
/// Picks the largest unit (hours down to nanoseconds) that divides the
/// duration exactly. Durations below one nanosecond render as the minimum
/// useful bucket, `1:MILLISECONDS`.
pub fn render(bucket: Duration) -> String {
    let nanos = bucket.as_nanos();
    if nanos == 0 {
        return "1:MILLISECONDS".to_string();
    }

    for (unit, unit_nanos) in RENDER_UNITS {
        if nanos >= *unit_nanos && nanos % unit_nanos == 0 {
            return format!("{}:{}", nanos / unit_nanos, unit);
        }
    }

    format!("{}:NANOSECONDS", nanos)
}

/// Whether a granularity field asks for interval-derived bucketing
pub fn is_auto(expr: &str) -> bool {
    let trimmed = expr.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case(AUTO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_units() {
        assert_eq!(parse("1:HOURS").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse("15:MINUTES").unwrap(), Duration::from_secs(900));
        assert_eq!(parse("30:SECONDS").unwrap(), Duration::from_secs(30));
        assert_eq!(parse("250:MILLISECONDS").unwrap(), Duration::from_millis(250));
        assert_eq!(parse("10:MICROSECONDS").unwrap(), Duration::from_micros(10));
        assert_eq!(parse("500:NANOSECONDS").unwrap(), Duration::from_nanos(500));
        assert_eq!(parse("2:DAYS").unwrap(), Duration::from_secs(2 * 86400));
    }

    #[test]
    fn test_parse_case_insensitive_and_padded() {
        assert_eq!(parse(" 5:minutes ").unwrap(), Duration::from_secs(300));
        assert_eq!(parse("1:Hours").unwrap(), Duration::from_secs(3600));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse("").is_err());
        assert!(parse("HOURS").is_err());
        assert!(parse("0:HOURS").is_err());
        assert!(parse("-1:HOURS").is_err());
        assert!(parse("1:FORTNIGHTS").is_err());
        assert!(parse("x:HOURS").is_err());
    }

    #[test]
    fn test_render_largest_unit() {
        assert_eq!(render(Duration::from_secs(3600)), "1:HOURS");
        assert_eq!(render(Duration::from_secs(7200)), "2:HOURS");
        assert_eq!(render(Duration::from_secs(90)), "90:SECONDS");
        assert_eq!(render(Duration::from_secs(60)), "1:MINUTES");
        assert_eq!(render(Duration::from_millis(1500)), "1500:MILLISECONDS");
        assert_eq!(render(Duration::from_micros(250)), "250:MICROSECONDS");
        assert_eq!(render(Duration::from_nanos(7)), "7:NANOSECONDS");
    }

    #[test]
    fn test_render_never_mixes_units() {
        // 1h30m is not a whole number of hours, so it renders as minutes
        assert_eq!(render(Duration::from_secs(5400)), "90:MINUTES");
        // two days renders as hours, never DAYS
        assert_eq!(render(Duration::from_secs(2 * 86400)), "48:HOURS");
    }

    #[test]
    fn test_render_zero_duration() {
        assert_eq!(render(Duration::ZERO), "1:MILLISECONDS");
    }

    #[test]
    fn test_parse_render_round_trip() {
        let cases = [
            Duration::from_nanos(1),
            Duration::from_nanos(999),
            Duration::from_micros(42),
            Duration::from_millis(250),
            Duration::from_secs(1),
            Duration::from_secs(90),
            Duration::from_secs(900),
            Duration::from_secs(3600),
            Duration::from_secs(86400),
            Duration::from_secs(5400),
        ];
        for d in cases {
            assert_eq!(parse(&render(d)).unwrap(), d, "round trip failed for {:?}", d);
        }
    }

    #[test]
    fn test_is_auto() {
        assert!(is_auto(""));
        assert!(is_auto("  "));
        assert!(is_auto("auto"));
        assert!(is_auto("AUTO"));
        assert!(!is_auto("1:HOURS"));
    }
}
