//! # Temporal Types
//!
//! Two unrelated notions of time live here:
//!
//! - [`DateTimeStamp`]: a credential's `validFrom` / `validUntil` value,
//!   validated against the XML Schema 1.1 `dateTimeStamp` lexical space and
//!   resolved to an instant for chronological comparison.
//! - [`EpochMicros`]: report timestamps (start/stop of a suite, test or
//!   step) in microseconds since the Unix epoch.
//!
//! ## Lexical Form
//!
//! ```text
//! -?([1-9][0-9]{3,}|0[0-9]{3})-(0[1-9]|1[0-2])-(0[1-9]|[12][0-9]|3[01])
//! T(([01][0-9]|2[0-3]):[0-5][0-9]:[0-5][0-9](\.[0-9]+)?|(24:00:00(\.0+)?))
//! (Z|(\+|-)((0[0-9]|1[0-3]):[0-5][0-9]|14:00))
//! ```
//!
//! The timezone is mandatory. `24:00:00` denotes the first instant of the
//! following day.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

const DATE_TIME_STAMP: &str = concat!(
    r"^(?P<year>-?(?:[1-9][0-9]{3,}|0[0-9]{3}))",
    r"-(?P<month>0[1-9]|1[0-2])",
    r"-(?P<day>0[1-9]|[12][0-9]|3[01])",
    r"T(?:(?P<hour>[01][0-9]|2[0-3]):(?P<minute>[0-5][0-9]):(?P<second>[0-5][0-9])(?:\.(?P<frac>[0-9]+))?",
    r"|(?P<eod>24:00:00(?:\.0+)?))",
    r"(?P<tz>Z|(?P<sign>[+-])(?P<tzh>0[0-9]|1[0-3]|14):(?P<tzm>[0-5][0-9]))$",
);

fn date_time_stamp_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(DATE_TIME_STAMP).ok()).as_ref()
}

/// A validated `dateTimeStamp` value, resolved to UTC.
///
/// The original lexical form is kept for display; comparison uses the
/// resolved instant.
#[derive(Debug, Clone)]
pub struct DateTimeStamp {
    lexical: String,
    instant: DateTime<Utc>,
}

impl DateTimeStamp {
    /// Whether `value` matches the `dateTimeStamp` lexical form.
    ///
    /// This is the shape check only; `2023-02-31T00:00:00Z` matches even
    /// though it names no real day. Use [`DateTimeStamp::parse`] to resolve.
    pub fn is_lexically_valid(value: &str) -> bool {
        Self::captures_ok(value)
    }

    fn captures_ok(value: &str) -> bool {
        let Some(re) = date_time_stamp_regex() else {
            return false;
        };
        let Some(caps) = re.captures(value) else {
            return false;
        };
        // 14:xx is only valid as 14:00.
        match (caps.name("tzh"), caps.name("tzm")) {
            (Some(h), Some(m)) => h.as_str() != "14" || m.as_str() == "00",
            _ => true,
        }
    }

    /// Parse and resolve a `dateTimeStamp`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidDateTime`] when the lexical form does not
    /// match, the calendar date does not exist, or the year is out of range.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        let invalid = |reason: &str| CoreError::InvalidDateTime {
            value: value.to_string(),
            reason: reason.to_string(),
        };

        if !Self::captures_ok(value) {
            return Err(invalid("does not match the dateTimeStamp lexical form"));
        }
        let caps = date_time_stamp_regex()
            .and_then(|re| re.captures(value))
            .ok_or_else(|| invalid("does not match the dateTimeStamp lexical form"))?;

        let field = |name: &str| -> Result<u32, CoreError> {
            caps.name(name)
                .ok_or_else(|| invalid("missing component"))?
                .as_str()
                .parse::<u32>()
                .map_err(|_| invalid("component out of range"))
        };

        let year: i32 = caps
            .name("year")
            .ok_or_else(|| invalid("missing year"))?
            .as_str()
            .parse()
            .map_err(|_| invalid("year out of range"))?;
        let date = NaiveDate::from_ymd_opt(year, field("month")?, field("day")?)
            .ok_or_else(|| invalid("no such calendar date"))?;

        let (date, time) = if caps.name("eod").is_some() {
            let next = date
                .checked_add_days(Days::new(1))
                .ok_or_else(|| invalid("year out of range"))?;
            (next, NaiveTime::MIN)
        } else {
            let nanos = caps
                .name("frac")
                .map(|f| fraction_to_nanos(f.as_str()))
                .unwrap_or(0);
            let time = NaiveTime::from_hms_nano_opt(
                field("hour")?,
                field("minute")?,
                field("second")?,
                nanos,
            )
            .ok_or_else(|| invalid("invalid time of day"))?;
            (date, time)
        };

        let offset_secs = match caps.name("sign") {
            None => 0,
            Some(sign) => {
                let secs = (field("tzh")? * 3600 + field("tzm")? * 60) as i32;
                if sign.as_str() == "-" {
                    -secs
                } else {
                    secs
                }
            }
        };
        let offset =
            FixedOffset::east_opt(offset_secs).ok_or_else(|| invalid("invalid timezone offset"))?;
        let instant = offset
            .from_local_datetime(&date.and_time(time))
            .single()
            .ok_or_else(|| invalid("ambiguous local time"))?
            .with_timezone(&Utc);

        Ok(Self {
            lexical: value.to_string(),
            instant,
        })
    }

    /// The resolved instant.
    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    /// The value as it appeared in the document.
    pub fn as_str(&self) -> &str {
        &self.lexical
    }
}

impl PartialEq for DateTimeStamp {
    fn eq(&self, other: &Self) -> bool {
        self.instant == other.instant
    }
}

impl Eq for DateTimeStamp {}

impl PartialOrd for DateTimeStamp {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.instant.cmp(&other.instant))
    }
}

impl fmt::Display for DateTimeStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lexical)
    }
}

/// Take up to nine fractional digits as nanoseconds; further digits are
/// below chrono's resolution.
fn fraction_to_nanos(frac: &str) -> u32 {
    let digits: String = frac.chars().take(9).collect();
    let padded = format!("{digits:0<9}");
    padded.parse().unwrap_or(0)
}

/// Microseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpochMicros(i64);

impl EpochMicros {
    /// The current wall-clock time.
    pub fn now() -> Self {
        Self(Utc::now().timestamp_micros())
    }

    /// Wrap a raw microsecond count.
    pub fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    /// Convert a chrono instant.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp_micros())
    }

    /// The raw microsecond count.
    pub fn as_micros(self) -> i64 {
        self.0
    }

    /// Back to a chrono instant, if in range.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_micros(self.0)
    }
}

impl fmt::Display for EpochMicros {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => f.write_str(&dt.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)),
            None => write!(f, "{}µs", self.0),
        }
    }
}
