//! Pure reducers over a loaded measurement log.
//!
//! Counts outages, averages them per calendar day, averages throughput and
//! formats the log size. Averages over nothing are NaN rather than zero.

pub mod outages;
pub mod size;
pub mod speed;
pub mod utility;

pub use outages::{count_outages, daily_outage_average, daily_outage_tallies};
pub use size::format_byte_size;
pub use speed::{SpeedField, average_speed};
