//! Time Format Catalog
//!
//! Resolves the time-column format strings found in store schemas (epoch
//! counts at seven precisions, native timestamp columns, and Java-style
//! simple-date-format patterns) into a [`TimeExprFormat`] that can encode an
//! instant as a SQL literal and decode result cells back into instants.
//!
//! Both schema syntaxes are recognized: the colon form
//! (`1:MILLISECONDS:EPOCH`) and the pipe form (`EPOCH|MILLISECONDS|1`),
//! along with the bare unit names some schemas carry.
//!
//! # Example
//!
//! ```rust
//! use trellis::sql::TimeExprFormat;
//! use chrono::{TimeZone, Utc};
//!
//! let fmt = TimeExprFormat::resolve("1:SECONDS:EPOCH").unwrap();
//! let t = Utc.with_ymd_and_hms(2014, 1, 1, 0, 0, 0).unwrap();
//! assert_eq!(fmt.encode(t), "1388534400");
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use super::error::{SqlError, SqlResult};

const SDF_TOKEN: &str = "SIMPLE_DATE_FORMAT";

/// Precision of an epoch-count time column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochUnit {
    /// Nanoseconds since the epoch
    Nanos,
    /// Microseconds since the epoch
    Micros,
    /// Milliseconds since the epoch
    Millis,
    /// Seconds since the epoch
    Secs,
    /// Minutes since the epoch
    Mins,
    /// Hours since the epoch
    Hours,
    /// Days since the epoch
    Days,
}

impl EpochUnit {
    /// The unit name used in store format expressions
    pub fn store_name(&self) -> &'static str {
        match self {
            Self::Nanos => "NANOSECONDS",
            Self::Micros => "MICROSECONDS",
            Self::Millis => "MILLISECONDS",
            Self::Secs => "SECONDS",
            Self::Mins => "MINUTES",
            Self::Hours => "HOURS",
            Self::Days => "DAYS",
        }
    }

    /// Encode an instant as the integer count at this unit (floor)
    pub fn encode(&self, instant: DateTime<Utc>) -> i64 {
        match self {
            Self::Nanos => instant
                .timestamp_nanos_opt()
                .unwrap_or_else(|| instant.timestamp_micros().saturating_mul(1_000)),
            Self::Micros => instant.timestamp_micros(),
            Self::Millis => instant.timestamp_millis(),
            Self::Secs => instant.timestamp(),
            Self::Mins => instant.timestamp().div_euclid(60),
            Self::Hours => instant.timestamp().div_euclid(3600),
            Self::Days => instant.timestamp().div_euclid(86400),
        }
    }

    /// Decode an integer count at this unit into an instant
    pub fn decode(&self, count: i64) -> Option<DateTime<Utc>> {
        match self {
            Self::Nanos => Some(Utc.timestamp_nanos(count)),
            Self::Micros => Utc.timestamp_micros(count).single(),
            Self::Millis => Utc.timestamp_millis_opt(count).single(),
            Self::Secs => Utc.timestamp_opt(count, 0).single(),
            Self::Mins => Utc.timestamp_opt(count.checked_mul(60)?, 0).single(),
            Self::Hours => Utc.timestamp_opt(count.checked_mul(3600)?, 0).single(),
            Self::Days => Utc.timestamp_opt(count.checked_mul(86400)?, 0).single(),
        }
    }
}

/// A resolved simple-date-format pattern
///
/// Holds both the original Java-style pattern (re-emitted in store format
/// expressions) and its chrono translation used for the actual formatting
/// and parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdfPattern {
    /// The Java-style pattern as declared in the schema
    pub pattern: String,
    /// The chrono format string the pattern translates to
    pub chrono_format: String,
    /// Whether the pattern carries no time-of-day tokens
    pub date_only: bool,
}

impl SdfPattern {
    /// Format an instant with this pattern
    pub fn format(&self, instant: DateTime<Utc>) -> String {
        instant.format(&self.chrono_format).to_string()
    }

    /// Parse a formatted cell back into an instant
    ///
    /// Date-only patterns parse as midnight UTC.
    pub fn parse(&self, text: &str) -> Option<DateTime<Utc>> {
        let naive = if self.date_only {
            NaiveDate::parse_from_str(text, &self.chrono_format)
                .ok()?
                .and_hms_opt(0, 0, 0)?
        } else {
            NaiveDateTime::parse_from_str(text, &self.chrono_format).ok()?
        };
        Some(Utc.from_utc_datetime(&naive))
    }
}

/// A resolved time-column format
///
/// Exactly one of: an epoch count at a known precision, a native timestamp
/// column (millisecond semantics), or a simple-date-format text column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeExprFormat {
    /// Integer epoch count at the given precision
    Epoch(EpochUnit),
    /// Native TIMESTAMP column; compares and decodes as epoch milliseconds
    TimestampMillis,
    /// Text column formatted with a Java-style date pattern
    SimpleDateFormat(SdfPattern),
}

impl TimeExprFormat {
    /// Resolve a schema format string into a catalog entry
    ///
    /// Returns [`SqlError::UnsupportedFormat`] for anything outside the
    /// recognized set, including date patterns that fail round-trip
    /// validation.
    pub fn resolve(format_str: &str) -> SqlResult<Self> {
        let trimmed = format_str.trim();
        let norm = trimmed.to_ascii_uppercase();

        let epoch = |unit| Ok(Self::Epoch(unit));
        match norm.as_str() {
            "1:NANOSECONDS:EPOCH" | "EPOCH|NANOSECONDS|1" | "EPOCH|NANOSECONDS"
            | "NANOSECONDS" | "EPOCH_NANOS" => return epoch(EpochUnit::Nanos),
            "1:MICROSECONDS:EPOCH" | "EPOCH|MICROSECONDS|1" | "EPOCH|MICROSECONDS"
            | "MICROSECONDS" | "EPOCH_MICROS" => return epoch(EpochUnit::Micros),
            "1:MILLISECONDS:EPOCH" | "EPOCH|MILLISECONDS|1" | "EPOCH|MILLISECONDS"
            | "MILLISECONDS" | "EPOCH_MILLIS" | "EPOCH" => return epoch(EpochUnit::Millis),
            "1:SECONDS:EPOCH" | "EPOCH|SECONDS|1" | "EPOCH|SECONDS" | "SECONDS"
            | "EPOCH_SECONDS" => return epoch(EpochUnit::Secs),
            "1:MINUTES:EPOCH" | "EPOCH|MINUTES|1" | "EPOCH|MINUTES" | "MINUTES"
            | "EPOCH_MINUTES" => return epoch(EpochUnit::Mins),
            "1:HOURS:EPOCH" | "EPOCH|HOURS|1" | "EPOCH|HOURS" | "HOURS" | "EPOCH_HOURS" => {
                return epoch(EpochUnit::Hours)
            }
            "1:DAYS:EPOCH" | "EPOCH|DAYS|1" | "EPOCH|DAYS" | "DAYS" | "EPOCH_DAYS" => {
                return epoch(EpochUnit::Days)
            }
            "TIMESTAMP" | "1:MILLISECONDS:TIMESTAMP" | "TIMESTAMP|MILLISECONDS" => {
                return Ok(Self::TimestampMillis)
            }
            _ => {}
        }

        // SIMPLE_DATE_FORMAT:<pattern>, SIMPLE_DATE_FORMAT|<pattern>, or the
        // legacy <n>:<UNIT>:SIMPLE_DATE_FORMAT:<pattern>. The pattern keeps
        // its original casing; offsets line up because the normalization is
        // ASCII-only.
        if let Some(pos) = norm.find(SDF_TOKEN) {
            let prefix_ok = pos == 0 || trimmed.as_bytes().get(pos - 1) == Some(&b':');
            let rest = &trimmed[pos + SDF_TOKEN.len()..];
            let pattern = rest
                .strip_prefix(':')
                .or_else(|| rest.strip_prefix('|'))
                .map(str::trim)
                .unwrap_or("");
            if prefix_ok && !pattern.is_empty() {
                return Ok(Self::SimpleDateFormat(translate_pattern(pattern)?));
            }
        }

        Err(SqlError::UnsupportedFormat(trimmed.to_string()))
    }

    /// The epoch-milliseconds entry, the output format of every bucketing
    /// expression
    pub fn millis() -> Self {
        Self::Epoch(EpochUnit::Millis)
    }

    /// Encode an instant as a SQL literal in this format
    ///
    /// Epoch and timestamp formats render a bare integer; date patterns
    /// render a single-quoted string.
    pub fn encode(&self, instant: DateTime<Utc>) -> String {
        match self {
            Self::Epoch(unit) => unit.encode(instant).to_string(),
            Self::TimestampMillis => instant.timestamp_millis().to_string(),
            Self::SimpleDateFormat(sdf) => {
                format!("'{}'", sdf.format(instant).replace('\'', "''"))
            }
        }
    }

    /// Decode an integer result cell into an instant
    ///
    /// Returns `None` for date-pattern formats (use [`Self::decode_text`])
    /// and for counts outside the representable range.
    pub fn decode_count(&self, count: i64) -> Option<DateTime<Utc>> {
        match self {
            Self::Epoch(unit) => unit.decode(count),
            Self::TimestampMillis => Utc.timestamp_millis_opt(count).single(),
            Self::SimpleDateFormat(_) => None,
        }
    }

    /// Decode a text result cell into an instant
    ///
    /// Only meaningful for date-pattern formats.
    pub fn decode_text(&self, text: &str) -> Option<DateTime<Utc>> {
        match self {
            Self::SimpleDateFormat(sdf) => sdf.parse(text),
            _ => None,
        }
    }

    /// Whether result cells in this format are text rather than integers
    pub fn is_text(&self) -> bool {
        matches!(self, Self::SimpleDateFormat(_))
    }

    /// The canonical store format expression for this column
    ///
    /// Used as the input-format argument of time-conversion SQL functions.
    pub fn input_format(&self) -> String {
        match self {
            Self::Epoch(unit) => format!("1:{}:EPOCH", unit.store_name()),
            Self::TimestampMillis => "1:MILLISECONDS:EPOCH".to_string(),
            Self::SimpleDateFormat(sdf) => {
                format!("1:DAYS:SIMPLE_DATE_FORMAT:{}", sdf.pattern)
            }
        }
    }
}

impl std::fmt::Display for TimeExprFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.input_format())
    }
}

/// Translate a Java-style date pattern into a chrono format string
///
/// Supports the closed token set seen in store schemas: `yyyy`, `yy`, `MM`,
/// `dd`, `HH`, `mm`, `ss`, `SSS`, quoted literals, and punctuation. The
/// translation is validated by round-tripping the current instant; patterns
/// that cannot reproduce an instant are rejected.
fn translate_pattern(pattern: &str) -> SqlResult<SdfPattern> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut chrono_format = String::new();
    let mut has_time = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            // quoted literal; '' inside quotes is an escaped quote
            i += 1;
            let mut closed = false;
            while i < chars.len() {
                if chars[i] == '\'' {
                    if chars.get(i + 1) == Some(&'\'') {
                        push_literal(&mut chrono_format, '\'');
                        i += 2;
                        continue;
                    }
                    closed = true;
                    i += 1;
                    break;
                }
                push_literal(&mut chrono_format, chars[i]);
                i += 1;
            }
            if !closed {
                return Err(SqlError::UnsupportedFormat(format!(
                    "unclosed quote in date pattern '{}'",
                    pattern
                )));
            }
            continue;
        }

        if c.is_ascii_alphabetic() {
            let mut run = 1;
            while chars.get(i + run) == Some(&c) {
                run += 1;
            }
            let token = match (c, run) {
                ('y', 4) => "%Y",
                ('y', 2) => "%y",
                ('M', 2) => "%m",
                ('d', 2) => "%d",
                ('H', 2) => "%H",
                ('m', 2) => "%M",
                ('s', 2) => "%S",
                ('S', 3) => "%3f",
                _ => {
                    return Err(SqlError::UnsupportedFormat(format!(
                        "unsupported token '{}' in date pattern '{}'",
                        c.to_string().repeat(run),
                        pattern
                    )))
                }
            };
            if matches!(c, 'H' | 'm' | 's' | 'S') {
                has_time = true;
            }
            chrono_format.push_str(token);
            i += run;
            continue;
        }

        push_literal(&mut chrono_format, c);
        i += 1;
    }

    let sdf = SdfPattern {
        pattern: pattern.to_string(),
        chrono_format,
        date_only: !has_time,
    };

    // Round-trip the current instant to catch patterns chrono cannot parse
    // back, such as a bare year with no month and day.
    let probe = Utc::now();
    if sdf.parse(&sdf.format(probe)).is_none() {
        return Err(SqlError::UnsupportedFormat(format!(
            "date pattern '{}' does not round-trip",
            pattern
        )));
    }

    Ok(sdf)
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_resolve_colon_syntax() {
        for (expr, unit) in [
            ("1:NANOSECONDS:EPOCH", EpochUnit::Nanos),
            ("1:MICROSECONDS:EPOCH", EpochUnit::Micros),
            ("1:MILLISECONDS:EPOCH", EpochUnit::Millis),
            ("1:SECONDS:EPOCH", EpochUnit::Secs),
            ("1:MINUTES:EPOCH", EpochUnit::Mins),
            ("1:HOURS:EPOCH", EpochUnit::Hours),
            ("1:DAYS:EPOCH", EpochUnit::Days),
        ] {
            assert_eq!(
                TimeExprFormat::resolve(expr).unwrap(),
                TimeExprFormat::Epoch(unit),
                "failed for {}",
                expr
            );
        }
    }

    #[test]
    fn test_resolve_pipe_and_bare_syntax() {
        assert_eq!(
            TimeExprFormat::resolve("EPOCH|SECONDS|1").unwrap(),
            TimeExprFormat::Epoch(EpochUnit::Secs)
        );
        assert_eq!(
            TimeExprFormat::resolve("EPOCH|MILLISECONDS").unwrap(),
            TimeExprFormat::Epoch(EpochUnit::Millis)
        );
        assert_eq!(
            TimeExprFormat::resolve("milliseconds").unwrap(),
            TimeExprFormat::Epoch(EpochUnit::Millis)
        );
        assert_eq!(
            TimeExprFormat::resolve("EPOCH").unwrap(),
            TimeExprFormat::Epoch(EpochUnit::Millis)
        );
        assert_eq!(
            TimeExprFormat::resolve("EPOCH_SECONDS").unwrap(),
            TimeExprFormat::Epoch(EpochUnit::Secs)
        );
    }

    #[test]
    fn test_resolve_timestamp() {
        assert_eq!(
            TimeExprFormat::resolve("TIMESTAMP").unwrap(),
            TimeExprFormat::TimestampMillis
        );
        assert_eq!(
            TimeExprFormat::resolve("1:MILLISECONDS:TIMESTAMP").unwrap(),
            TimeExprFormat::TimestampMillis
        );
    }

    #[test]
    fn test_resolve_simple_date_format() {
        let fmt = TimeExprFormat::resolve("SIMPLE_DATE_FORMAT:yyyy-MM-dd").unwrap();
        match &fmt {
            TimeExprFormat::SimpleDateFormat(sdf) => {
                assert_eq!(sdf.pattern, "yyyy-MM-dd");
                assert_eq!(sdf.chrono_format, "%Y-%m-%d");
                assert!(sdf.date_only);
            }
            other => panic!("expected date pattern, got {:?}", other),
        }

        let legacy =
            TimeExprFormat::resolve("1:DAYS:SIMPLE_DATE_FORMAT:yyyy-MM-dd HH:mm:ss").unwrap();
        match &legacy {
            TimeExprFormat::SimpleDateFormat(sdf) => {
                assert_eq!(sdf.chrono_format, "%Y-%m-%d %H:%M:%S");
                assert!(!sdf.date_only);
            }
            other => panic!("expected date pattern, got {:?}", other),
        }

        let piped = TimeExprFormat::resolve("SIMPLE_DATE_FORMAT|yyyyMMdd").unwrap();
        assert!(matches!(piped, TimeExprFormat::SimpleDateFormat(_)));
    }

    #[test]
    fn test_resolve_quoted_literal_pattern() {
        let fmt = TimeExprFormat::resolve("SIMPLE_DATE_FORMAT:yyyy-MM-dd'T'HH:mm:ss").unwrap();
        let t = instant(2023, 5, 15, 10, 30, 0);
        assert_eq!(fmt.encode(t), "'2023-05-15T10:30:00'");
        assert_eq!(fmt.decode_text("2023-05-15T10:30:00"), Some(t));
    }

    #[test]
    fn test_resolve_rejects_unknown() {
        assert!(TimeExprFormat::resolve("").is_err());
        assert!(TimeExprFormat::resolve("FORTNIGHTS").is_err());
        assert!(TimeExprFormat::resolve("2:SECONDS:EPOCH").is_err());
        assert!(TimeExprFormat::resolve("SIMPLE_DATE_FORMAT:").is_err());
        // unsupported token letter
        assert!(TimeExprFormat::resolve("SIMPLE_DATE_FORMAT:yyyy-QQ").is_err());
        // a bare year cannot parse back to a date
        assert!(TimeExprFormat::resolve("SIMPLE_DATE_FORMAT:yyyy").is_err());
        // unclosed quote
        assert!(TimeExprFormat::resolve("SIMPLE_DATE_FORMAT:yyyy-MM-dd'T").is_err());
    }

    #[test]
    fn test_encode_known_instant() {
        let t = instant(2014, 1, 1, 0, 0, 0);

        assert_eq!(
            TimeExprFormat::Epoch(EpochUnit::Nanos).encode(t),
            "1388534400000000000"
        );
        assert_eq!(
            TimeExprFormat::Epoch(EpochUnit::Micros).encode(t),
            "1388534400000000"
        );
        assert_eq!(
            TimeExprFormat::Epoch(EpochUnit::Millis).encode(t),
            "1388534400000"
        );
        assert_eq!(TimeExprFormat::Epoch(EpochUnit::Secs).encode(t), "1388534400");
        assert_eq!(TimeExprFormat::Epoch(EpochUnit::Mins).encode(t), "23142240");
        assert_eq!(TimeExprFormat::Epoch(EpochUnit::Hours).encode(t), "385704");
        assert_eq!(TimeExprFormat::Epoch(EpochUnit::Days).encode(t), "16071");
        assert_eq!(TimeExprFormat::TimestampMillis.encode(t), "1388534400000");
    }

    #[test]
    fn test_encode_floors_partial_units() {
        // 10:30:45 should floor to the 10:00 hour and the day start
        let t = instant(2014, 1, 1, 10, 30, 45);
        assert_eq!(TimeExprFormat::Epoch(EpochUnit::Hours).encode(t), "385714");
        assert_eq!(TimeExprFormat::Epoch(EpochUnit::Days).encode(t), "16071");
    }

    #[test]
    fn test_epoch_round_trips_at_unit_precision() {
        let base = instant(2023, 5, 15, 0, 0, 0);
        let cases = [
            (TimeExprFormat::Epoch(EpochUnit::Nanos), base + chrono::Duration::nanoseconds(123)),
            (TimeExprFormat::Epoch(EpochUnit::Micros), base + chrono::Duration::microseconds(456)),
            (TimeExprFormat::Epoch(EpochUnit::Millis), base + chrono::Duration::milliseconds(789)),
            (TimeExprFormat::Epoch(EpochUnit::Secs), instant(2023, 5, 15, 10, 30, 45)),
            (TimeExprFormat::Epoch(EpochUnit::Mins), instant(2023, 5, 15, 10, 30, 0)),
            (TimeExprFormat::Epoch(EpochUnit::Hours), instant(2023, 5, 15, 10, 0, 0)),
            (TimeExprFormat::Epoch(EpochUnit::Days), base),
            (TimeExprFormat::TimestampMillis, base + chrono::Duration::milliseconds(250)),
        ];

        for (fmt, t) in cases {
            let count: i64 = fmt.encode(t).parse().unwrap();
            assert_eq!(fmt.decode_count(count), Some(t), "round trip failed for {}", fmt);
        }
    }

    #[test]
    fn test_sdf_round_trip() {
        let fmt = TimeExprFormat::resolve("SIMPLE_DATE_FORMAT:yyyy-MM-dd HH:mm:ss").unwrap();
        let t = instant(2023, 5, 15, 10, 30, 45);
        let rendered = fmt.encode(t);
        assert_eq!(rendered, "'2023-05-15 10:30:45'");
        assert_eq!(fmt.decode_text(rendered.trim_matches('\'')), Some(t));

        let date_fmt = TimeExprFormat::resolve("SIMPLE_DATE_FORMAT:yyyyMMdd").unwrap();
        assert_eq!(date_fmt.encode(instant(2023, 5, 15, 0, 0, 0)), "'20230515'");
        assert_eq!(
            date_fmt.decode_text("20230515"),
            Some(instant(2023, 5, 15, 0, 0, 0))
        );
    }

    #[test]
    fn test_sdf_millis_token() {
        let fmt = TimeExprFormat::resolve("SIMPLE_DATE_FORMAT:yyyy-MM-dd HH:mm:ss.SSS").unwrap();
        let t = instant(2023, 5, 15, 10, 30, 45) + chrono::Duration::milliseconds(123);
        assert_eq!(fmt.encode(t), "'2023-05-15 10:30:45.123'");
        assert_eq!(fmt.decode_text("2023-05-15 10:30:45.123"), Some(t));
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        let fmt = TimeExprFormat::resolve("SIMPLE_DATE_FORMAT:yyyy-MM-dd").unwrap();
        assert_eq!(fmt.decode_text("not-a-date"), None);
        assert_eq!(fmt.decode_count(1234), None);

        let days = TimeExprFormat::Epoch(EpochUnit::Days);
        assert_eq!(days.decode_text("16071"), None);
        // overflow when scaling to seconds
        assert_eq!(days.decode_count(i64::MAX), None);
    }

    #[test]
    fn test_input_format() {
        assert_eq!(
            TimeExprFormat::Epoch(EpochUnit::Secs).input_format(),
            "1:SECONDS:EPOCH"
        );
        assert_eq!(
            TimeExprFormat::TimestampMillis.input_format(),
            "1:MILLISECONDS:EPOCH"
        );
        assert_eq!(
            TimeExprFormat::resolve("SIMPLE_DATE_FORMAT:yyyy-MM-dd")
                .unwrap()
                .input_format(),
            "1:DAYS:SIMPLE_DATE_FORMAT:yyyy-MM-dd"
        );
    }
}
