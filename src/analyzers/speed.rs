use crate::analyzers::utility::mean_or_nan;
use crate::record::MeasurementRecord;

/// Which throughput column of a record to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedField {
    Download,
    Upload,
}

impl SpeedField {
    /// Field name as written in the log.
    pub const fn column(self) -> &'static str {
        match self {
            SpeedField::Download => "download_speed",
            SpeedField::Upload => "upload_speed",
        }
    }

    pub fn value(self, record: &MeasurementRecord) -> Option<f64> {
        match self {
            SpeedField::Download => record.download_speed,
            SpeedField::Upload => record.upload_speed,
        }
    }
}

/// Mean of `field` over every record, in Mbps.
///
/// A missing value anywhere makes the result NaN, as does an empty log.
pub fn average_speed(records: &[MeasurementRecord], field: SpeedField) -> f64 {
    mean_or_nan(records.iter().map(|r| field.value(r)))
}
