//! Presentation of a loaded log.
//!
//! Presenters never compute aggregates: they get a [`DashboardView`] holding
//! the records, the precomputed [`DashboardStats`] and each record's wall-clock
//! time in the report zone, and write text to a sink.

pub mod chart;
pub mod summary;
pub mod table;

pub use chart::{ChartKind, ChartPresenter, ChartSpec};
pub use summary::SummaryPresenter;
pub use table::{SortOrder, TableOptions, TablePresenter};

use anyhow::Result;
use chrono::{NaiveDateTime, TimeZone};
use std::io::Write;

use crate::record::MeasurementRecord;
use crate::stats::DashboardStats;

/// Renders one region of the dashboard.
pub trait Presenter {
    fn render(&self, view: &DashboardView<'_>, out: &mut dyn Write) -> Result<()>;
}

/// Read-only input shared by every presenter.
pub struct DashboardView<'a> {
    pub records: &'a [MeasurementRecord],
    pub stats: &'a DashboardStats,
    local_times: Vec<Option<NaiveDateTime>>,
}

impl<'a> DashboardView<'a> {
    /// Resolves every record's timestamp in `tz` once, up front.
    pub fn new<Tz: TimeZone>(
        records: &'a [MeasurementRecord],
        stats: &'a DashboardStats,
        tz: &Tz,
    ) -> Self {
        let local_times = records
            .iter()
            .map(|r| r.timestamp.local_datetime(tz))
            .collect();

        Self {
            records,
            stats,
            local_times,
        }
    }

    /// Records paired with their report-zone time, in log order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a MeasurementRecord, Option<NaiveDateTime>)> + '_ {
        self.records.iter().zip(self.local_times.iter().copied())
    }
}

/// Runs presenters in order, separated by a blank line.
pub fn render_all(
    presenters: &[&dyn Presenter],
    view: &DashboardView<'_>,
    out: &mut dyn Write,
) -> Result<()> {
    for (i, presenter) in presenters.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        presenter.render(view, out)?;
    }
    Ok(())
}
