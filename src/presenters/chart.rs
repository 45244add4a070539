//! Time-series charts: availability over time and throughput over time.
//!
//! Each chart is built as a [`ChartSpec`] (x positions truncated to the minute,
//! one value list per series) and can be drawn as sparklines or exported as CSV.

use anyhow::Result;
use chrono::{NaiveDateTime, Timelike};
use std::io::Write;

use super::{DashboardView, Presenter};
use crate::analyzers::SpeedField;

/// Tick label layout on the time axis.
pub const MINUTE_LABEL: &str = "%H:%M";
const CSV_TIME: &str = "%Y-%m-%d %H:%M";
const SPARKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Availability,
    Speeds,
}

impl ChartKind {
    /// File stem used for CSV exports.
    pub fn slug(self) -> &'static str {
        match self {
            ChartKind::Availability => "availability",
            ChartKind::Speeds => "speeds",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YAxis {
    /// 0/1 axis ticked as Unavailable/Available.
    Availability,
    /// Linear axis that always starts at zero.
    ZeroBased,
}

impl YAxis {
    pub fn tick_label(self, value: f64) -> String {
        match self {
            YAxis::Availability if value != 0.0 => "Available".to_string(),
            YAxis::Availability => "Unavailable".to_string(),
            YAxis::ZeroBased => format!("{value:.2}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: &'static str,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: &'static str,
    pub kind: ChartKind,
    /// X positions in the report zone, ascending, truncated to the minute.
    pub minutes: Vec<NaiveDateTime>,
    pub series: Vec<Series>,
    pub y_axis: YAxis,
}

pub fn truncate_to_minute(time: NaiveDateTime) -> NaiveDateTime {
    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}

impl ChartSpec {
    pub fn build(kind: ChartKind, view: &DashboardView<'_>) -> Self {
        match kind {
            ChartKind::Availability => Self::availability(view),
            ChartKind::Speeds => Self::speeds(view),
        }
    }

    /// 1 for `Available`, 0 for anything else.
    pub fn availability(view: &DashboardView<'_>) -> Self {
        let (minutes, values) = points(view, |r| {
            Some(if r.internet_status.is_available() { 1.0 } else { 0.0 })
        });

        ChartSpec {
            title: "Internet Availability",
            kind: ChartKind::Availability,
            minutes,
            series: vec![Series {
                label: "Internet Availability",
                values,
            }],
            y_axis: YAxis::Availability,
        }
    }

    /// Download and upload speed in Mbps. Missing speeds leave gaps.
    pub fn speeds(view: &DashboardView<'_>) -> Self {
        let (minutes, download) = points(view, |r| SpeedField::Download.value(r));
        let (_, upload) = points(view, |r| SpeedField::Upload.value(r));

        ChartSpec {
            title: "Speeds",
            kind: ChartKind::Speeds,
            minutes,
            series: vec![
                Series {
                    label: "Download Speed (Mbps)",
                    values: download,
                },
                Series {
                    label: "Upload Speed (Mbps)",
                    values: upload,
                },
            ],
            y_axis: YAxis::ZeroBased,
        }
    }

    /// Lowest and highest y value to draw.
    pub fn y_range(&self) -> (f64, f64) {
        match self.y_axis {
            YAxis::Availability => (0.0, 1.0),
            YAxis::ZeroBased => {
                let max = self
                    .series
                    .iter()
                    .flat_map(|s| s.values.iter().flatten())
                    .copied()
                    .filter(|v| v.is_finite())
                    .fold(0.0, f64::max);
                (0.0, max)
            }
        }
    }

    /// File name for this chart's CSV export, e.g. `speeds.csv`.
    pub fn csv_file_name(&self) -> String {
        format!("{}.csv", self.kind.slug())
    }

    /// Header row (`time` plus series labels) followed by one row per point.
    pub fn csv_records(&self) -> Vec<Vec<String>> {
        let mut records = Vec::with_capacity(self.minutes.len() + 1);

        let mut header = vec!["time".to_string()];
        header.extend(self.series.iter().map(|s| s.label.to_string()));
        records.push(header);

        for (i, minute) in self.minutes.iter().enumerate() {
            let mut row = vec![minute.format(CSV_TIME).to_string()];
            row.extend(
                self.series
                    .iter()
                    .map(|s| s.values[i].map(|v| v.to_string()).unwrap_or_default()),
            );
            records.push(row);
        }

        records
    }
}

/// Chart points for every record with a usable time, oldest first.
fn points<F>(view: &DashboardView<'_>, value: F) -> (Vec<NaiveDateTime>, Vec<Option<f64>>)
where
    F: Fn(&crate::record::MeasurementRecord) -> Option<f64>,
{
    let mut points: Vec<(NaiveDateTime, Option<f64>)> = view
        .iter()
        .filter_map(|(record, local)| local.map(|t| (truncate_to_minute(t), value(record))))
        .collect();
    points.sort_by_key(|(t, _)| *t);

    points.into_iter().unzip()
}

/// Squeezes `values` into at most `width` columns, averaging present values per column.
fn compress(values: &[Option<f64>], width: usize) -> Vec<Option<f64>> {
    if width == 0 || values.len() <= width {
        return values.to_vec();
    }

    let chunk = values.len().div_ceil(width);
    values
        .chunks(chunk)
        .map(|c| {
            let present: Vec<f64> = c.iter().flatten().copied().collect();
            (!present.is_empty()).then(|| present.iter().sum::<f64>() / present.len() as f64)
        })
        .collect()
}

fn sparkline(values: &[Option<f64>], (low, high): (f64, f64)) -> String {
    values
        .iter()
        .map(|v| match v {
            Some(v) if v.is_finite() => {
                let scaled = if high > low {
                    ((v - low) / (high - low) * (SPARKS.len() - 1) as f64).round()
                } else {
                    0.0
                };
                SPARKS[(scaled.max(0.0) as usize).min(SPARKS.len() - 1)]
            }
            _ => ' ',
        })
        .collect()
}

/// Draws charts as one sparkline per series.
pub struct ChartPresenter {
    pub kinds: Vec<ChartKind>,
    /// Maximum sparkline columns.
    pub width: usize,
}

impl ChartPresenter {
    fn draw(&self, chart: &ChartSpec, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "== {} ==", chart.title)?;

        let (Some(first), Some(last)) = (chart.minutes.first(), chart.minutes.last()) else {
            writeln!(out, "No data")?;
            return Ok(());
        };

        let range = chart.y_range();
        writeln!(
            out,
            "y: {} .. {}",
            chart.y_axis.tick_label(range.0),
            chart.y_axis.tick_label(range.1)
        )?;

        let label_width = chart.series.iter().map(|s| s.label.len()).max().unwrap_or(0);
        for series in &chart.series {
            let line = sparkline(&compress(&series.values, self.width), range);
            writeln!(out, "{:<label_width$} |{}|", series.label, line)?;
        }

        writeln!(
            out,
            "x: {} .. {} ({} points)",
            first.format(MINUTE_LABEL),
            last.format(MINUTE_LABEL),
            chart.minutes.len()
        )?;
        Ok(())
    }
}

impl Presenter for ChartPresenter {
    fn render(&self, view: &DashboardView<'_>, out: &mut dyn Write) -> Result<()> {
        for (i, kind) in self.kinds.iter().enumerate() {
            if i > 0 {
                writeln!(out)?;
            }
            self.draw(&ChartSpec::build(*kind, view), out)?;
        }
        Ok(())
    }
}
