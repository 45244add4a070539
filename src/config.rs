//! Runtime settings read from flags and the environment.

use anyhow::{Context, Result};
use chrono::FixedOffset;

/// Environment fallback for `--utc-offset`.
pub const UTC_OFFSET_ENV: &str = "SPEEDLOG_UTC_OFFSET";

/// Resolves the report zone. The flag wins over the environment value;
/// `None` from both means the local zone.
pub fn parse_report_zone(flag: Option<&str>, env: Option<&str>) -> Result<Option<FixedOffset>> {
    let Some(raw) = flag.or(env) else {
        return Ok(None);
    };

    let offset = raw
        .trim()
        .parse::<FixedOffset>()
        .with_context(|| format!("invalid UTC offset {raw:?}, expected e.g. +02:00"))?;
    Ok(Some(offset))
}
