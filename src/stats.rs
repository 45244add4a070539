use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::analyzers::{
    SpeedField, average_speed, count_outages, daily_outage_tallies, format_byte_size,
};
use crate::analyzers::utility::ratio;
use crate::record::MeasurementRecord;

/// Every aggregate the dashboard shows, computed once from the loaded log.
///
/// NaN averages serialize as `null` in JSON.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub generated_at: DateTime<Utc>,
    pub source: Option<String>,
    pub log_size_bytes: Option<u64>,
    pub total_records: usize,

    // outages
    pub outage_count: usize,
    pub distinct_days: usize,
    pub daily_outage_average: f64,

    // throughput, Mbps
    pub avg_download_mbps: f64,
    pub avg_upload_mbps: f64,
}

impl DashboardStats {
    /// Aggregates `records`, grouping calendar days in `tz`.
    pub fn from_records<Tz: TimeZone>(records: &[MeasurementRecord], tz: &Tz) -> Self {
        let tallies = daily_outage_tallies(records, tz);
        let outage_count = count_outages(records);

        DashboardStats {
            generated_at: Utc::now(),
            source: None,
            log_size_bytes: None,
            total_records: records.len(),
            outage_count,
            distinct_days: tallies.len(),
            daily_outage_average: ratio(outage_count as f64, tallies.len()),
            avg_download_mbps: average_speed(records, SpeedField::Download),
            avg_upload_mbps: average_speed(records, SpeedField::Upload),
        }
    }

    /// Set where the log came from and how many bytes it was.
    pub fn with_source(mut self, source: &str, size_bytes: u64) -> Self {
        self.source = Some(source.to_string());
        self.log_size_bytes = Some(size_bytes);
        self
    }

    pub fn average_speed(&self, field: SpeedField) -> f64 {
        match field {
            SpeedField::Download => self.avg_download_mbps,
            SpeedField::Upload => self.avg_upload_mbps,
        }
    }

    /// Human-readable log size, if the size is known.
    pub fn log_file_size(&self) -> Option<String> {
        self.log_size_bytes.map(format_byte_size)
    }
}
