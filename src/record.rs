//! The measurement record written by the speed-test logger.
//!
//! Records are decoded leniently: a malformed field never rejects the record,
//! it just becomes a missing speed, an unknown status or an unparsed timestamp.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Naive date-time layouts accepted for wall-clock timestamps.
/// `%.f` is optional when parsing, so these also cover whole seconds.
const WALL_CLOCK_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, Clone, Copy, PartialEq)]
enum Moment {
    /// Wall-clock time with no offset, read in the report zone.
    Wall(NaiveDateTime),
    Instant(DateTime<Utc>),
    Unparsed,
}

/// A record timestamp: the text as logged plus its parsed moment.
#[derive(Debug, Clone, PartialEq)]
pub struct Timestamp {
    raw: String,
    moment: Moment,
}

impl Timestamp {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        let moment = if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            Moment::Instant(dt.with_timezone(&Utc))
        } else if let Some(ndt) = WALL_CLOCK_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        {
            Moment::Wall(ndt)
        } else if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            // Bare dates are midnight UTC, not local midnight.
            Moment::Instant(date.and_time(chrono::NaiveTime::MIN).and_utc())
        } else {
            Moment::Unparsed
        };

        Self {
            raw: raw.to_string(),
            moment,
        }
    }

    /// Epoch milliseconds.
    pub fn from_millis(millis: i64) -> Self {
        let moment = DateTime::from_timestamp_millis(millis)
            .map(Moment::Instant)
            .unwrap_or(Moment::Unparsed);

        Self {
            raw: millis.to_string(),
            moment,
        }
    }

    fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::parse(s),
            Value::Number(n) => match n.as_i64() {
                Some(millis) => Self::from_millis(millis),
                None => {
                    let moment = n
                        .as_f64()
                        .and_then(|f| DateTime::from_timestamp_millis(f as i64))
                        .map(Moment::Instant)
                        .unwrap_or(Moment::Unparsed);
                    Self {
                        raw: n.to_string(),
                        moment,
                    }
                }
            },
            Value::Null => Self {
                raw: String::new(),
                moment: Moment::Unparsed,
            },
            other => Self {
                raw: other.to_string(),
                moment: Moment::Unparsed,
            },
        }
    }

    /// The timestamp exactly as it appeared in the log.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_parsed(&self) -> bool {
        !matches!(self.moment, Moment::Unparsed)
    }

    /// Wall-clock time of this timestamp in `tz`.
    pub fn local_datetime<Tz: TimeZone>(&self, tz: &Tz) -> Option<NaiveDateTime> {
        match self.moment {
            Moment::Wall(ndt) => Some(ndt),
            Moment::Instant(dt) => Some(dt.with_timezone(tz).naive_local()),
            Moment::Unparsed => None,
        }
    }

    /// Calendar day of this timestamp in `tz`. `None` for unparsed timestamps.
    pub fn calendar_date<Tz: TimeZone>(&self, tz: &Tz) -> Option<NaiveDate> {
        self.local_datetime(tz).map(|ndt| ndt.date())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Connectivity status of a single measurement.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InternetStatus {
    Available,
    Unavailable,
    /// Any value the logger never writes, kept verbatim for display.
    Other(String),
    #[default]
    Missing,
}

impl InternetStatus {
    fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) if s == "Available" => Self::Available,
            Value::String(s) if s == "Unavailable" => Self::Unavailable,
            Value::String(s) => Self::Other(s.clone()),
            Value::Null => Self::Missing,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_outage(&self) -> bool {
        matches!(self, Self::Unavailable)
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Available => "Available",
            Self::Unavailable => "Unavailable",
            Self::Other(s) => s,
            Self::Missing => "",
        }
    }
}

impl fmt::Display for InternetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of a record on disk. Every field is optional and loosely typed.
#[derive(Deserialize)]
struct RawRecord {
    #[serde(default)]
    timestamp: Value,
    #[serde(default)]
    download_speed: Value,
    #[serde(default)]
    upload_speed: Value,
    #[serde(default)]
    internet_status: Value,
}

/// One timestamped connectivity/speed measurement.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawRecord")]
pub struct MeasurementRecord {
    pub timestamp: Timestamp,
    /// Megabits per second.
    pub download_speed: Option<f64>,
    /// Megabits per second.
    pub upload_speed: Option<f64>,
    pub internet_status: InternetStatus,
}

impl From<RawRecord> for MeasurementRecord {
    fn from(raw: RawRecord) -> Self {
        Self {
            timestamp: Timestamp::from_value(&raw.timestamp),
            download_speed: raw.download_speed.as_f64(),
            upload_speed: raw.upload_speed.as_f64(),
            internet_status: InternetStatus::from_value(&raw.internet_status),
        }
    }
}

impl MeasurementRecord {
    pub fn new(timestamp: &str, internet_status: InternetStatus) -> Self {
        Self {
            timestamp: Timestamp::parse(timestamp),
            download_speed: None,
            upload_speed: None,
            internet_status,
        }
    }

    pub fn with_speeds(mut self, download: Option<f64>, upload: Option<f64>) -> Self {
        self.download_speed = download;
        self.upload_speed = upload;
        self
    }
}
