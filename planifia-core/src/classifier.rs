//! Due-date proximity: is a task urgent relative to "now"?

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::ReminderError;
use crate::time::parse_due_date;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    /// Due within the urgent window, or already overdue.
    Urgent,
    Standard,
    /// The due date could not be parsed. Delayed like `Standard`.
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateProximityClassifier {
    tz: Tz,
    urgent_window_hours: i64,
}

impl Default for DateProximityClassifier {
    fn default() -> Self {
        Self::new(chrono_tz::UTC, 24)
    }
}

impl DateProximityClassifier {
    pub fn new(tz: Tz, urgent_window_hours: i64) -> Self {
        Self {
            tz,
            urgent_window_hours,
        }
    }

    /// Whole hours from `now` until local midnight of `due_date`, truncated
    /// toward zero. Negative for overdue tasks.
    pub fn hours_until_due(&self, due_date: &str, now: DateTime<Utc>) -> Result<i64, ReminderError> {
        let due = parse_due_date(due_date, self.tz)?;
        Ok((due - now).num_hours())
    }

    pub fn classify_hours(&self, hours_until_due: i64) -> Classification {
        if hours_until_due <= self.urgent_window_hours {
            Classification::Urgent
        } else {
            Classification::Standard
        }
    }

    /// Classify a raw due date. Parse failures are a normal branch: they are
    /// logged and map to `Classification::Unknown`.
    pub fn classify(&self, due_date: &str, now: DateTime<Utc>) -> Classification {
        match self.hours_until_due(due_date, now) {
            Ok(hours) => self.classify_hours(hours),
            Err(e) => {
                error!(due_date, error = %e, "could not parse due date");
                Classification::Unknown
            }
        }
    }
}
