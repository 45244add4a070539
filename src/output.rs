//! Text formatting and file export for dashboard results.
//!
//! Supports the summary lines, JSON serialization, and CSV export with
//! optional gzip compression.

use anyhow::Result;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use tracing::{debug, info};

use crate::stats::DashboardStats;

pub fn log_file_size_line(formatted_size: &str) -> String {
    format!("Log File Size: {formatted_size}")
}

pub fn outage_count_line(outage_count: usize) -> String {
    format!("Internet Outages: {outage_count}")
}

/// NaN prints as `NaN`.
pub fn daily_average_line(daily_outage_average: f64) -> String {
    format!("Daily Average Outages: {daily_outage_average:.2}")
}

pub fn average_speed_lines(download_mbps: f64, upload_mbps: f64) -> [String; 2] {
    [
        format!("Average Download Speed: {download_mbps:.2} Mbps"),
        format!("Average Upload Speed: {upload_mbps:.2} Mbps"),
    ]
}

/// Speed cell for tables: two decimals, `-` when the value is missing.
pub fn speed_cell(speed: Option<f64>) -> String {
    match speed {
        Some(v) => format!("{v:.2}"),
        None => "-".to_string(),
    }
}

/// Writes dashboard statistics as pretty-printed JSON.
pub fn write_json(out: &mut dyn Write, stats: &DashboardStats) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, stats)?;
    writeln!(out)?;
    Ok(())
}

/// Writes `rows` to a new CSV file at `path`, one header row first.
///
/// With `gzip` the file is compressed and `.gz` is appended to the path.
/// Returns the path actually written.
pub fn write_csv<T: Serialize>(path: &str, rows: &[T], gzip: bool) -> Result<String> {
    let path = export(path, gzip, |out| {
        let mut writer = csv::Writer::from_writer(out);
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    })?;

    info!(path = %path, rows = rows.len(), "CSV export written");
    Ok(path)
}

/// Like [`write_csv`] for untyped records. The first record is the header.
pub fn write_csv_records(path: &str, records: &[Vec<String>], gzip: bool) -> Result<String> {
    let path = export(path, gzip, |out| {
        let mut writer = csv::Writer::from_writer(out);
        for record in records {
            writer.write_record(record)?;
        }
        writer.flush()?;
        Ok(())
    })?;

    info!(path = %path, rows = records.len(), "CSV export written");
    Ok(path)
}

fn export<F>(path: &str, gzip: bool, fill: F) -> Result<String>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let path = if gzip {
        format!("{path}.gz")
    } else {
        path.to_string()
    };
    debug!(path = %path, gzip, "Creating export file");

    let mut file = File::create(&path)?;
    if gzip {
        let mut encoder = GzEncoder::new(file, Compression::default());
        fill(&mut encoder)?;
        encoder.finish()?;
    } else {
        fill(&mut file)?;
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use flate2::read::GzDecoder;
    use std::env;
    use std::fs;
    use std::io::Read;

    #[derive(Serialize)]
    struct Row {
        timestamp: &'static str,
        download_speed: String,
    }

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                timestamp: "2024-01-01 00:00:00",
                download_speed: speed_cell(Some(12.346)),
            },
            Row {
                timestamp: "2024-01-01 00:05:00",
                download_speed: speed_cell(None),
            },
        ]
    }

    #[test]
    fn test_summary_lines() {
        assert_eq!(log_file_size_line("3.41 MB"), "Log File Size: 3.41 MB");
        assert_eq!(outage_count_line(2), "Internet Outages: 2");
        assert_eq!(daily_average_line(1.0), "Daily Average Outages: 1.00");
        assert_eq!(
            average_speed_lines(15.0, 4.256),
            [
                "Average Download Speed: 15.00 Mbps".to_string(),
                "Average Upload Speed: 4.26 Mbps".to_string(),
            ]
        );
    }

    #[test]
    fn test_nan_renders_as_nan() {
        assert_eq!(daily_average_line(f64::NAN), "Daily Average Outages: NaN");
        assert_eq!(
            average_speed_lines(f64::NAN, 1.0)[0],
            "Average Download Speed: NaN Mbps"
        );
    }

    #[test]
    fn test_speed_cell() {
        assert_eq!(speed_cell(Some(94.126)), "94.13");
        assert_eq!(speed_cell(Some(0.0)), "0.00");
        assert_eq!(speed_cell(None), "-");
    }

    #[test]
    fn test_write_json() {
        let stats = DashboardStats::from_records(&[], &Utc);
        let mut buf = Vec::new();
        write_json(&mut buf, &stats).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("\"outage_count\": 0"));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_write_csv_writes_header_once() {
        let path = temp_path("speedlog_test_table.csv");
        let _ = fs::remove_file(&path);

        let written = write_csv(&path, &rows(), false).unwrap();
        assert_eq!(written, path);

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "timestamp,download_speed");
        assert_eq!(lines[1], "2024-01-01 00:00:00,12.35");
        assert_eq!(lines[2], "2024-01-01 00:05:00,-");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_csv_overwrites_previous_export() {
        let path = temp_path("speedlog_test_overwrite.csv");
        write_csv(&path, &rows(), false).unwrap();
        write_csv(&path, &rows(), false).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_csv_gzip() {
        let path = temp_path("speedlog_test_table_gz.csv");
        let written = write_csv(&path, &rows(), true).unwrap();
        assert!(written.ends_with(".csv.gz"));

        let mut decoded = String::new();
        GzDecoder::new(fs::File::open(&written).unwrap())
            .read_to_string(&mut decoded)
            .unwrap();
        assert!(decoded.starts_with("timestamp,download_speed\n"));
        assert_eq!(decoded.lines().count(), 3);

        fs::remove_file(&written).unwrap();
    }

    #[test]
    fn test_write_csv_records_gzip() {
        let path = temp_path("speedlog_test_records.csv");
        let records = vec![
            vec!["time".to_string(), "value".to_string()],
            vec!["00:00".to_string(), "1".to_string()],
        ];
        let written = write_csv_records(&path, &records, true).unwrap();

        let mut decoded = String::new();
        GzDecoder::new(fs::File::open(&written).unwrap())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, "time,value\n00:00,1\n");

        fs::remove_file(&written).unwrap();
    }
}
