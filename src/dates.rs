//! Date normalization to the canonical `YYYY-MM-DD HH:MM` string.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::config::DateStrategy;

pub const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M";

static ISO_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<y>\d{4})[-/](?P<mo>\d{1,2})[-/](?P<d>\d{1,2})(?:[Tt ]+(?P<h>\d{1,2}):(?P<mi>\d{2})(?::(?P<s>\d{2})(?:[.,](?P<frac>\d+))?)?)?\s*(?P<tz>[Zz]|UTC|GMT|[+-]\d{2}(?::?\d{2})?)?$",
    )
    .expect("static regex")
});

// Loose layouts tried after ISO-8601 and RFC 2822.
static LOOSE_AWARE: [&str; 3] = [
    "%m/%d/%Y %H:%M:%S %z",
    "%m/%d/%Y %H:%M %z",
    "%a %b %d %H:%M:%S %z %Y",
];
static LOOSE_NAIVE: [&str; 9] = [
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M",
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
    "%a %b %d %H:%M:%S %Y",
];
static LOOSE_DATE: [&str; 4] = ["%m/%d/%Y", "%d %b %Y", "%B %d, %Y", "%B %d %Y"];

/// Result of a permissive parse: either an instant with its offset, or a bare wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDate {
    Aware(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

impl ParsedDate {
    /// Local time as written, offset discarded.
    pub fn wall_clock(&self) -> NaiveDateTime {
        match self {
            ParsedDate::Aware(dt) => dt.naive_local(),
            ParsedDate::Naive(dt) => *dt,
        }
    }

    /// Instant in UTC. Values without an offset are taken to already be UTC.
    pub fn to_utc(&self) -> NaiveDateTime {
        match self {
            ParsedDate::Aware(dt) => dt.naive_utc(),
            ParsedDate::Naive(dt) => *dt,
        }
    }
}

/// Normalizes `raw` with `strategy`; `None` when nothing could parse it.
pub fn normalize(raw: &str, strategy: &DateStrategy) -> Option<String> {
    match strategy {
        DateStrategy::FormatList { formats } => normalize_with_formats(raw, formats),
        DateStrategy::TimezoneAware => normalize_to_utc(raw),
    }
}

/// Explicit patterns first, then a permissive parse that keeps the wall-clock
/// time. Offsets are dropped on the fallback path, so values from different
/// zones are not comparable afterwards.
pub fn normalize_with_formats<S: AsRef<str>>(raw: &str, formats: &[S]) -> Option<String> {
    if let Some(dt) = formats.iter().find_map(|f| parse_explicit(raw, f.as_ref())) {
        return Some(canonical(dt));
    }
    let parsed = parse_permissive(raw)?;
    debug!(value = raw, "no explicit format matched, used permissive parse");
    Some(canonical(parsed.wall_clock()))
}

pub fn normalize_to_utc(raw: &str) -> Option<String> {
    parse_permissive(raw).map(|p| canonical(p.to_utc()))
}

pub fn canonical(dt: NaiveDateTime) -> String {
    dt.format(CANONICAL_FORMAT).to_string()
}

/// One strptime-style pattern. Date-only patterns resolve to midnight.
pub fn parse_explicit(raw: &str, format: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, format)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, format)
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// ISO-8601 and its common variants, RFC 2822, then a handful of loose layouts.
pub fn parse_permissive(raw: &str) -> Option<ParsedDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(parsed) = parse_iso_like(s) {
        return Some(parsed);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(ParsedDate::Aware(dt));
    }
    if let Some(dt) = LOOSE_AWARE
        .iter()
        .find_map(|f| DateTime::parse_from_str(s, f).ok())
    {
        return Some(ParsedDate::Aware(dt));
    }
    if let Some(dt) = LOOSE_NAIVE
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
    {
        return Some(ParsedDate::Naive(dt));
    }
    LOOSE_DATE
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .map(|d| ParsedDate::Naive(d.and_time(NaiveTime::MIN)))
}

fn parse_iso_like(s: &str) -> Option<ParsedDate> {
    let caps = ISO_LIKE.captures(s)?;
    let num = |name: &str| -> Option<u32> {
        match caps.name(name) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };

    let date = NaiveDate::from_ymd_opt(caps["y"].parse().ok()?, num("mo")?, num("d")?)?;
    let nanos = match caps.name("frac") {
        Some(m) => {
            let digits: String = m.as_str().chars().take(9).collect();
            format!("{digits:0<9}").parse().ok()?
        }
        None => 0,
    };
    let time = NaiveTime::from_hms_nano_opt(num("h")?, num("mi")?, num("s")?, nanos)?;
    let naive = date.and_time(time);

    match caps.name("tz") {
        None => Some(ParsedDate::Naive(naive)),
        Some(tz) => {
            let offset = parse_offset(tz.as_str())?;
            naive
                .and_local_timezone(offset)
                .single()
                .map(ParsedDate::Aware)
        }
    }
}

/// `Z`, `UTC`, `GMT`, `+HH`, `+HHMM` or `+HH:MM`.
fn parse_offset(tz: &str) -> Option<FixedOffset> {
    if matches!(tz, "Z" | "z" | "UTC" | "GMT") {
        return FixedOffset::east_opt(0);
    }
    let (sign, rest) = match tz.split_at(1) {
        ("+", rest) => (1, rest),
        ("-", rest) => (-1, rest),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    let hours: i32 = digits.get(..2)?.parse().ok()?;
    let minutes: i32 = match digits.get(2..) {
        Some("") | None => 0,
        Some(m) => m.parse().ok()?,
    };
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
