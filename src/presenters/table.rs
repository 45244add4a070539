//! Sortable, searchable, paged table of measurement records.

use anyhow::{Result, bail};
use serde::Serialize;
use std::io::Write;

use super::{DashboardView, Presenter};
use crate::analyzers::SpeedField;
use crate::output::speed_cell;

/// Page sizes a reader can pick from.
pub const PAGE_SIZES: [usize; 6] = [5, 10, 15, 25, 50, 100];
pub const DEFAULT_PAGE_SIZE: usize = 25;

const HEADERS: [&str; 4] = [
    "timestamp",
    SpeedField::Download.column(),
    SpeedField::Upload.column(),
    "internet_status",
];

/// Order of the timestamp column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    page_size: usize,
    page: usize,
    order: SortOrder,
    search: Option<String>,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page: 1,
            order: SortOrder::default(),
            search: None,
        }
    }
}

impl TableOptions {
    /// Options with the given page size, newest rows first, page 1, no search.
    pub fn new(page_size: usize) -> Result<Self> {
        if !PAGE_SIZES.contains(&page_size) {
            bail!("page size {page_size} is not one of {PAGE_SIZES:?}");
        }
        Ok(Self {
            page_size,
            ..Default::default()
        })
    }

    /// 1-based page to show. Pages past the end show the last page.
    pub fn with_page(mut self, page: usize) -> Result<Self> {
        if page == 0 {
            bail!("pages are numbered from 1");
        }
        self.page = page;
        Ok(self)
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    /// Free-text filter. Blank input clears it.
    pub fn with_search(mut self, search: &str) -> Self {
        let search = search.trim();
        self.search = (!search.is_empty()).then(|| search.to_string());
        self
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }
}

/// One rendered row. Also the CSV export layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub timestamp: String,
    pub download_speed: String,
    pub upload_speed: String,
    pub internet_status: String,
}

impl TableRow {
    fn cells(&self) -> [&str; 4] {
        [
            &self.timestamp,
            &self.download_speed,
            &self.upload_speed,
            &self.internet_status,
        ]
    }

    /// Every term must appear, case-insensitively, in at least one cell.
    fn matches(&self, terms: &[String]) -> bool {
        let cells: Vec<String> = self.cells().iter().map(|c| c.to_lowercase()).collect();
        terms
            .iter()
            .all(|term| cells.iter().any(|cell| cell.contains(term.as_str())))
    }
}

/// The rows of one page plus the counts for the footer.
#[derive(Debug, Clone, PartialEq)]
pub struct TablePage {
    pub rows: Vec<TableRow>,
    /// 1-based index of the first row shown, 0 when nothing matches.
    pub first: usize,
    pub last: usize,
    pub filtered: usize,
    pub total: usize,
    pub page: usize,
    pub page_count: usize,
}

impl TablePage {
    pub fn footer(&self, searching: bool) -> String {
        let mut footer = format!(
            "Showing {} to {} of {} entries",
            self.first, self.last, self.filtered
        );
        if searching {
            footer.push_str(&format!(" (filtered from {} total entries)", self.total));
        }
        footer
    }
}

/// Every row that passes the search, in the requested timestamp order.
///
/// Rows are ordered by their report-zone time, ties by raw timestamp text.
/// Unparsed timestamps count as the oldest: first when ascending, last when
/// descending.
pub fn sorted_rows(view: &DashboardView<'_>, order: SortOrder, search: Option<&str>) -> Vec<TableRow> {
    let terms: Vec<String> = search
        .map(|s| s.split_whitespace().map(str::to_lowercase).collect())
        .unwrap_or_default();

    let mut rows: Vec<_> = view
        .iter()
        .map(|(record, local)| {
            let row = TableRow {
                timestamp: record.timestamp.raw().to_string(),
                download_speed: speed_cell(record.download_speed),
                upload_speed: speed_cell(record.upload_speed),
                internet_status: record.internet_status.to_string(),
            };
            (local, row)
        })
        .filter(|(_, row)| row.matches(&terms))
        .collect();

    rows.sort_by(|(a_time, a_row), (b_time, b_row)| {
        let ord = a_time
            .cmp(b_time)
            .then_with(|| a_row.timestamp.cmp(&b_row.timestamp));
        match order {
            SortOrder::Ascending => ord,
            SortOrder::Descending => ord.reverse(),
        }
    });

    rows.into_iter().map(|(_, row)| row).collect()
}

/// Cuts the requested page out of the sorted, filtered rows.
pub fn table_page(view: &DashboardView<'_>, options: &TableOptions) -> TablePage {
    let rows = sorted_rows(view, options.order, options.search());
    let filtered = rows.len();
    let page_count = filtered.div_ceil(options.page_size).max(1);
    let page = options.page.min(page_count);

    let start = (page - 1) * options.page_size;
    let rows: Vec<TableRow> = rows
        .into_iter()
        .skip(start)
        .take(options.page_size)
        .collect();

    let (first, last) = if rows.is_empty() {
        (0, 0)
    } else {
        (start + 1, start + rows.len())
    };

    TablePage {
        rows,
        first,
        last,
        filtered,
        total: view.records.len(),
        page,
        page_count,
    }
}

pub struct TablePresenter {
    pub options: TableOptions,
}

impl Presenter for TablePresenter {
    fn render(&self, view: &DashboardView<'_>, out: &mut dyn Write) -> Result<()> {
        let page = table_page(view, &self.options);

        let mut widths = HEADERS.map(str::len);
        for row in &page.rows {
            for (width, cell) in widths.iter_mut().zip(row.cells()) {
                *width = (*width).max(cell.chars().count());
            }
        }

        write_line(out, &HEADERS, &widths)?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        let rule: Vec<&str> = rule.iter().map(String::as_str).collect();
        write_line(out, &rule, &widths)?;

        if page.rows.is_empty() {
            writeln!(out, "No matching records found")?;
        }
        for row in &page.rows {
            write_line(out, &row.cells(), &widths)?;
        }

        writeln!(out)?;
        writeln!(out, "{}", page.footer(self.options.search.is_some()))?;
        writeln!(out, "Page {} of {}", page.page, page.page_count)?;
        Ok(())
    }
}

/// Speed columns are right-aligned, text columns left-aligned.
fn write_line(out: &mut dyn Write, cells: &[&str], widths: &[usize]) -> Result<()> {
    let line: Vec<String> = cells
        .iter()
        .zip(widths.iter().copied())
        .enumerate()
        .map(|(i, (cell, width))| match i {
            1 | 2 => format!("{cell:>width$}"),
            _ => format!("{cell:<width$}"),
        })
        .collect();
    writeln!(out, "{}", line.join("  ").trim_end())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{InternetStatus, MeasurementRecord};
    use crate::stats::DashboardStats;
    use chrono::Utc;

    fn records(n: usize) -> Vec<MeasurementRecord> {
        (0..n)
            .map(|i| {
                let status = if i % 3 == 0 {
                    InternetStatus::Unavailable
                } else {
                    InternetStatus::Available
                };
                MeasurementRecord::new(&format!("2024-01-01 {:02}:{:02}:00", i / 60, i % 60), status)
                    .with_speeds(Some(i as f64 * 1.5), None)
            })
            .collect()
    }

    fn with_view<T>(records: &[MeasurementRecord], f: impl FnOnce(&DashboardView<'_>) -> T) -> T {
        let stats = DashboardStats::from_records(records, &Utc);
        let view = DashboardView::new(records, &stats, &Utc);
        f(&view)
    }

    #[test]
    fn test_page_size_must_be_offered() {
        assert!(TableOptions::new(25).is_ok());
        assert!(TableOptions::new(100).is_ok());
        assert!(TableOptions::new(20).is_err());
        assert!(TableOptions::new(0).is_err());
    }

    #[test]
    fn test_page_zero_rejected() {
        assert!(TableOptions::default().with_page(0).is_err());
    }

    #[test]
    fn test_defaults() {
        let options = TableOptions::default();
        assert_eq!(options.page_size, 25);
        assert_eq!(options.order, SortOrder::Descending);
        assert_eq!(options.search(), None);
        assert_eq!(TableOptions::default().with_search("   ").search(), None);
    }

    #[test]
    fn test_default_order_is_newest_first() {
        let records = records(30);
        let page = with_view(&records, |view| table_page(view, &TableOptions::default()));

        assert_eq!(page.rows.len(), 25);
        assert_eq!(page.rows[0].timestamp, "2024-01-01 00:29:00");
        assert_eq!(page.rows[24].timestamp, "2024-01-01 00:05:00");
        assert_eq!((page.first, page.last, page.filtered), (1, 25, 30));
        assert_eq!(page.page_count, 2);
    }

    #[test]
    fn test_second_page_ascending() {
        let records = records(30);
        let options = TableOptions::new(10)
            .unwrap()
            .with_order(SortOrder::Ascending)
            .with_page(2)
            .unwrap();
        let page = with_view(&records, |view| table_page(view, &options));

        assert_eq!(page.rows[0].timestamp, "2024-01-01 00:10:00");
        assert_eq!((page.first, page.last), (11, 20));
        assert_eq!(page.page, 2);
    }

    #[test]
    fn test_page_past_end_shows_last_page() {
        let records = records(12);
        let options = TableOptions::new(5).unwrap().with_page(9).unwrap();
        let page = with_view(&records, |view| table_page(view, &options));

        assert_eq!(page.page, 3);
        assert_eq!((page.first, page.last), (11, 12));
    }

    #[test]
    fn test_search_is_case_insensitive_and_all_terms() {
        let records = records(30);
        let options = TableOptions::default().with_search("unavailable 00:1");
        let page = with_view(&records, |view| table_page(view, &options));

        // 00:12, 00:15 and 00:18 are the outages between 00:10 and 00:19
        let stamps: Vec<_> = page.rows.iter().map(|r| r.timestamp.as_str()).collect();
        assert_eq!(
            stamps,
            ["2024-01-01 00:18:00", "2024-01-01 00:15:00", "2024-01-01 00:12:00"]
        );
        assert_eq!(
            page.footer(true),
            "Showing 1 to 3 of 3 entries (filtered from 30 total entries)"
        );
    }

    #[test]
    fn test_no_match() {
        let records = records(3);
        let options = TableOptions::default().with_search("nothing-like-this");
        let page = with_view(&records, |view| table_page(view, &options));

        assert!(page.rows.is_empty());
        assert_eq!(page.footer(false), "Showing 0 to 0 of 0 entries");
        assert_eq!(page.page_count, 1);
    }

    #[test]
    fn test_unparsed_rows_count_as_oldest() {
        let records = vec![
            MeasurementRecord::new("zzz", InternetStatus::Available),
            MeasurementRecord::new("2024-01-01 00:00:00", InternetStatus::Available),
            MeasurementRecord::new("aaa", InternetStatus::Available),
        ];
        let stamps = |order| {
            with_view(&records, |view| sorted_rows(view, order, None))
                .into_iter()
                .map(|r| r.timestamp)
                .collect::<Vec<_>>()
        };

        assert_eq!(
            stamps(SortOrder::Ascending),
            ["aaa", "zzz", "2024-01-01 00:00:00"]
        );
        assert_eq!(
            stamps(SortOrder::Descending),
            ["2024-01-01 00:00:00", "zzz", "aaa"]
        );
    }

    #[test]
    fn test_headers_use_log_field_names() {
        assert_eq!(
            HEADERS,
            ["timestamp", "download_speed", "upload_speed", "internet_status"]
        );
    }

    #[test]
    fn test_cells_format_speeds() {
        let records = records(2);
        let rows = with_view(&records, |view| sorted_rows(view, SortOrder::Ascending, None));

        assert_eq!(rows[1].download_speed, "1.50");
        assert_eq!(rows[1].upload_speed, "-");
        assert_eq!(rows[0].internet_status, "Unavailable");
    }

    #[test]
    fn test_render_text() {
        let records = records(2);
        let presenter = TablePresenter {
            options: TableOptions::default(),
        };
        let text = with_view(&records, |view| {
            let mut buf = Vec::new();
            presenter.render(view, &mut buf).unwrap();
            String::from_utf8(buf).unwrap()
        });

        let lines: Vec<_> = text.lines().collect();
        assert!(lines[0].starts_with("timestamp"));
        assert!(lines[2].starts_with("2024-01-01 00:01:00"));
        assert!(lines[2].contains("1.50"));
        assert!(text.contains("Showing 1 to 2 of 2 entries\n"));
        assert!(text.ends_with("Page 1 of 1\n"));
    }
}
