//! Time windows on report filters.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;

use super::{Violation, ViolationKind};

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Parse a timestamp or a bare date (midnight). Offsets are converted to UTC.
pub fn parse_timestamp(value: &Value) -> Result<NaiveDateTime, Violation> {
    let s = value
        .as_str()
        .ok_or_else(|| Violation::new(ViolationKind::InvalidType, "expected a timestamp string"))?
        .trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }
    for format in TIMESTAMP_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN));
    }

    Err(Violation::new(
        ViolationKind::InvalidValue,
        format!("'{}' is not a valid date or timestamp", s),
    ))
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(value: &Value) -> Result<NaiveDate, Violation> {
    let s = value
        .as_str()
        .ok_or_else(|| Violation::new(ViolationKind::InvalidType, "expected a date string"))?
        .trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        Violation::new(
            ViolationKind::InvalidValue,
            format!("'{}' is not a valid date (YYYY-MM-DD)", s),
        )
    })
}

/// Spans under two days read in hours, so a 24 hour cap stays "24 hours".
fn describe(span: Duration) -> String {
    let seconds = span.num_seconds();
    if seconds % 86_400 == 0 && seconds >= 2 * 86_400 {
        format!("{} days", span.num_days())
    } else if seconds % 3_600 == 0 {
        format!("{} hours", span.num_hours())
    } else {
        format!("{} seconds", span.num_seconds())
    }
}

/// A closed timestamp window with `from < to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    from: NaiveDateTime,
    to: NaiveDateTime,
}

impl TimeRange {
    pub fn new(
        from: NaiveDateTime,
        to: NaiveDateTime,
        max_span: Option<Duration>,
    ) -> Result<Self, Violation> {
        if from >= to {
            return Err(Violation::new(
                ViolationKind::OutOfOrder,
                format!("start {} must be earlier than end {}", from, to),
            ));
        }
        if let Some(max) = max_span {
            let span = to - from;
            if span > max {
                return Err(Violation::new(
                    ViolationKind::SpanExceeded,
                    format!(
                        "window of {} exceeds the maximum of {}",
                        describe(span),
                        describe(max)
                    ),
                ));
            }
        }
        Ok(Self { from, to })
    }

    pub fn from(&self) -> NaiveDateTime {
        self.from
    }

    pub fn to(&self) -> NaiveDateTime {
        self.to
    }

    pub fn span(&self) -> Duration {
        self.to - self.from
    }
}

/// Date bounds where either end may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DateBounds {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

impl DateBounds {
    /// `from <= to` when both are given; spans are only checked on closed bounds.
    pub fn new(
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        max_days: Option<i64>,
        min_days: Option<i64>,
    ) -> Result<Self, Violation> {
        if let (Some(f), Some(t)) = (from, to) {
            if f > t {
                return Err(Violation::new(
                    ViolationKind::OutOfOrder,
                    format!("start {} must not be after end {}", f, t),
                ));
            }
            let days = (t - f).num_days();
            if let Some(max) = max_days {
                if days > max {
                    return Err(Violation::new(
                        ViolationKind::SpanExceeded,
                        format!("range of {} days exceeds the maximum of {} days", days, max),
                    ));
                }
            }
            if let Some(min) = min_days {
                if days < min {
                    return Err(Violation::new(
                        ViolationKind::SpanTooShort,
                        format!("range of {} days is shorter than the minimum of {} days", days, min),
                    ));
                }
            }
        }
        Ok(Self { from, to })
    }

    pub fn from(&self) -> Option<NaiveDate> {
        self.from
    }

    pub fn to(&self) -> Option<NaiveDate> {
        self.to
    }

    pub fn is_open(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}
