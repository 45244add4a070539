use crate::analyzers::utility::ratio;
use crate::record::MeasurementRecord;
use chrono::{NaiveDate, TimeZone};
use std::collections::BTreeMap;

/// Calendar day a record falls on. `None` collects every unparsed timestamp.
pub type DayKey = Option<NaiveDate>;

/// Counts records whose status is exactly `Unavailable`.
pub fn count_outages(records: &[MeasurementRecord]) -> usize {
    records
        .iter()
        .filter(|r| r.internet_status.is_outage())
        .count()
}

/// Outage count per calendar day in `tz`, for every day that has any record.
///
/// Days without outages are present with a tally of zero.
pub fn daily_outage_tallies<Tz: TimeZone>(
    records: &[MeasurementRecord],
    tz: &Tz,
) -> BTreeMap<DayKey, usize> {
    let mut tallies: BTreeMap<DayKey, usize> = BTreeMap::new();

    for record in records {
        let day = tallies.entry(record.timestamp.calendar_date(tz)).or_default();
        if record.internet_status.is_outage() {
            *day += 1;
        }
    }

    tallies
}

/// Mean outages per calendar day covered by the log, days grouped in `tz`.
///
/// Returns NaN for an empty log.
pub fn daily_outage_average<Tz: TimeZone>(records: &[MeasurementRecord], tz: &Tz) -> f64 {
    let tallies = daily_outage_tallies(records, tz);
    let total: usize = tallies.values().sum();

    ratio(total as f64, tallies.len())
}
