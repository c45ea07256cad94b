//! Time utilities: calendar due dates to timezone-aware instants.

use chrono::{DateTime, Duration, NaiveDate, Offset, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::ReminderError;

/// Parse an IANA timezone name like "America/Chicago".
pub fn parse_timezone(name: &str) -> Result<Tz, ReminderError> {
    name.trim()
        .parse()
        .map_err(|_| ReminderError::InvalidTimezone(name.to_string()))
}

/// Parse a due date like "2026-02-20" and return local midnight in `tz` as UTC.
///
/// When midnight falls into a DST gap the first valid instant of that day is used.
pub fn parse_due_date(due_date: &str, tz: Tz) -> Result<DateTime<Utc>, ReminderError> {
    let date = NaiveDate::parse_from_str(due_date.trim(), "%Y-%m-%d").map_err(|source| {
        ReminderError::DateParse {
            input: due_date.to_string(),
            source,
        }
    })?;

    let midnight = date.and_time(chrono::NaiveTime::MIN);

    // Ambiguous midnight resolves to the earlier instant; a gap is walked
    // forward in 15-minute steps until the wall clock exists again.
    let mut wall = midnight;
    while wall.date() == date {
        if let Some(local) = tz.from_local_datetime(&wall).earliest() {
            return Ok(local.with_timezone(&Utc));
        }
        wall += Duration::minutes(15);
    }

    // No zone skips a whole day in quarter hours; read midnight with the
    // offset in force at that instant.
    let offset = tz.offset_from_utc_datetime(&midnight).fix();
    Ok(Utc.from_utc_datetime(&(midnight - offset)))
}
