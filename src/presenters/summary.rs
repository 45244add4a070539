use anyhow::Result;
use std::io::Write;

use super::{DashboardView, Presenter};
use crate::analyzers::SpeedField;
use crate::output::{
    average_speed_lines, daily_average_line, log_file_size_line, outage_count_line,
};

/// The four headline figures: log size, outage count, daily average, speeds.
///
/// The size line is skipped when the log size is unknown.
pub struct SummaryPresenter;

impl Presenter for SummaryPresenter {
    fn render(&self, view: &DashboardView<'_>, out: &mut dyn Write) -> Result<()> {
        let stats = view.stats;

        if let Some(size) = stats.log_file_size() {
            writeln!(out, "{}", log_file_size_line(&size))?;
        }
        writeln!(out, "{}", outage_count_line(stats.outage_count))?;
        writeln!(out, "{}", daily_average_line(stats.daily_outage_average))?;
        let speeds = average_speed_lines(
            stats.average_speed(SpeedField::Download),
            stats.average_speed(SpeedField::Upload),
        );
        for line in speeds {
            writeln!(out, "{line}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{InternetStatus, MeasurementRecord};
    use crate::stats::DashboardStats;
    use chrono::Utc;

    fn render(records: &[MeasurementRecord], stats: &DashboardStats) -> String {
        let view = DashboardView::new(records, stats, &Utc);
        let mut buf = Vec::new();
        SummaryPresenter.render(&view, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_summary_text() {
        let records = vec![
            MeasurementRecord::new("2024-01-01T00:00", InternetStatus::Unavailable)
                .with_speeds(Some(0.0), Some(0.0)),
            MeasurementRecord::new("2024-01-01T01:00", InternetStatus::Available)
                .with_speeds(Some(20.0), Some(4.0)),
        ];
        let stats = DashboardStats::from_records(&records, &Utc).with_source("log.json", 3_575_644);

        assert_eq!(
            render(&records, &stats),
            "Log File Size: 3.41 MB\n\
             Internet Outages: 1\n\
             Daily Average Outages: 1.00\n\
             Average Download Speed: 10.00 Mbps\n\
             Average Upload Speed: 2.00 Mbps\n"
        );
    }

    #[test]
    fn test_summary_empty_log() {
        let stats = DashboardStats::from_records(&[], &Utc).with_source("log.json", 2);

        assert_eq!(
            render(&[], &stats),
            "Log File Size: 2.00 Bytes\n\
             Internet Outages: 0\n\
             Daily Average Outages: NaN\n\
             Average Download Speed: NaN Mbps\n\
             Average Upload Speed: NaN Mbps\n"
        );
    }

    #[test]
    fn test_summary_missing_speed_is_nan() {
        let records = vec![
            MeasurementRecord::new("2024-01-01T00:00", InternetStatus::Available)
                .with_speeds(None, Some(3.0)),
        ];
        let stats = DashboardStats::from_records(&records, &Utc);
        let text = render(&records, &stats);

        assert!(text.contains("Average Download Speed: NaN Mbps\n"));
        assert!(text.contains("Average Upload Speed: 3.00 Mbps\n"));
    }

    #[test]
    fn test_summary_without_size() {
        let stats = DashboardStats::from_records(&[], &Utc);
        assert!(render(&[], &stats).starts_with("Internet Outages: 0\n"));
    }
}
