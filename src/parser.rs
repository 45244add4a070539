//! JSON decoder for the speed-test measurement log.

use anyhow::{Context, Result};

use crate::record::MeasurementRecord;

/// Decodes the log, a JSON array of measurement objects, keeping file order.
///
/// # Errors
///
/// Returns an error if the bytes are not JSON or the top level is not an
/// array of objects. Odd field values inside a record are never errors.
pub fn parse_records(bytes: &[u8]) -> Result<Vec<MeasurementRecord>> {
    serde_json::from_slice(bytes).context("measurement log is not a JSON array of records")
}
