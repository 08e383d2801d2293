//! Time expressions: the `at=` / `duration=` grammar used by scheduling tags.
//!
//! All arithmetic happens in the host's local clock context. There is no
//! timezone handling; a `+24h` offset across a DST boundary lands wherever
//! naive addition puts it.

use std::sync::LazyLock;

use chrono::{Duration, NaiveDateTime, NaiveTime};
use miette::Diagnostic;
use regex::Regex;
use thiserror::Error;

/// Errors from resolving a time or duration expression.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum TimeError {
    #[error("unrecognized time expression: \"{expr}\"")]
    #[diagnostic(
        code(paperbase::time::unresolvable),
        help(
            "Supported forms: \"YYYY-MM-DD HH:MM\", \"today HH:MM\", \
             \"tomorrow HH:MM\", \"+30m\", \"+2h\", \"+1d\"."
        )
    )]
    Unresolvable { expr: String },

    #[error("time of day out of range in \"{expr}\"")]
    #[diagnostic(
        code(paperbase::time::clock_out_of_range),
        help("Hours run 00-23 and minutes 00-59 (24-hour clock).")
    )]
    ClockOutOfRange { expr: String },

    #[error("unrecognized duration expression: \"{expr}\"")]
    #[diagnostic(
        code(paperbase::time::bad_duration),
        help("Durations are \"<N>m\" or \"<N>h\", e.g. \"90m\" or \"1h\".")
    )]
    BadDuration { expr: String },
}

pub type TimeResult<T> = std::result::Result<T, TimeError>;

static RE_OFFSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+(\d+)([mhd])$").unwrap());

static RE_DAY_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)(today|tomorrow)\s+(\d{1,2}):(\d{2})$").unwrap()
});

static RE_DURATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)([mh])$").unwrap());

/// Resolve a scheduling expression to an absolute local timestamp.
///
/// Forms, tried in order:
/// 1. `YYYY-MM-DD HH:MM` (or with seconds) — absolute, 24-hour.
/// 2. `today HH:MM` / `tomorrow HH:MM` — resolved against `now`'s date.
/// 3. `+<N>m` / `+<N>h` / `+<N>d` — positive offset from `now`.
pub fn resolve(expr: &str, now: NaiveDateTime) -> TimeResult<NaiveDateTime> {
    let expr = expr.trim();

    for fmt in ["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(expr, fmt) {
            return Ok(ts);
        }
    }

    if let Some(caps) = RE_DAY_KEYWORD.captures(expr) {
        let hour: u32 = caps[2].parse().unwrap_or(u32::MAX);
        let minute: u32 = caps[3].parse().unwrap_or(u32::MAX);
        let time = NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or_else(|| TimeError::ClockOutOfRange { expr: expr.to_string() })?;
        let date = if caps[1].eq_ignore_ascii_case("today") {
            now.date()
        } else {
            now.date() + Duration::days(1)
        };
        return Ok(date.and_time(time));
    }

    if let Some(caps) = RE_OFFSET.captures(expr) {
        let n: i64 = caps[1]
            .parse()
            .map_err(|_| TimeError::Unresolvable { expr: expr.to_string() })?;
        if n == 0 {
            return Err(TimeError::Unresolvable { expr: expr.to_string() });
        }
        let delta = match &caps[2] {
            "m" => Duration::minutes(n),
            "h" => Duration::hours(n),
            _ => Duration::days(n),
        };
        return Ok(now + delta);
    }

    Err(TimeError::Unresolvable { expr: expr.to_string() })
}

/// Parse an event duration (`"90m"`, `"1h"`). Absent means 60 minutes.
pub fn parse_duration(expr: Option<&str>) -> TimeResult<Duration> {
    let Some(expr) = expr else {
        return Ok(Duration::minutes(60));
    };
    let trimmed = expr.trim();
    let caps = RE_DURATION
        .captures(trimmed)
        .ok_or_else(|| TimeError::BadDuration { expr: trimmed.to_string() })?;
    let n: i64 = caps[1]
        .parse()
        .map_err(|_| TimeError::BadDuration { expr: trimmed.to_string() })?;
    if n == 0 {
        return Err(TimeError::BadDuration { expr: trimmed.to_string() });
    }
    Ok(match &caps[2] {
        "m" => Duration::minutes(n),
        _ => Duration::hours(n),
    })
}
