//! Reminder delay policy: classification in, delay out.

use std::ops::RangeInclusive;

use chrono::Duration;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::classifier::Classification;
use crate::error::ReminderError;

/// Source of the random hour offset for non-urgent reminders.
///
/// Any `rand::RngCore` works (seed a `StdRng` for reproducible runs); tests can
/// script exact values with their own implementation.
pub trait RandomHours {
    fn hours_in(&mut self, range: RangeInclusive<u32>) -> u32;
}

impl<R: RngCore> RandomHours for R {
    fn hours_in(&mut self, range: RangeInclusive<u32>) -> u32 {
        self.random_range(range)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderPolicy {
    /// How many of the top-priority tasks get a reminder per cycle.
    pub max_reminders: usize,
    /// Tasks due within this many hours (or overdue) are urgent.
    pub urgent_window_hours: i64,
    pub urgent_delay_minutes: i64,
    pub standard_min_hours: u32,
    pub standard_max_hours: u32,
}

/// Longest configurable urgent delay: one week.
pub const MAX_URGENT_DELAY_MINUTES: i64 = 7 * 24 * 60;

/// Longest configurable standard delay: one year.
pub const MAX_STANDARD_HOURS: u32 = 365 * 24;

impl Default for ReminderPolicy {
    fn default() -> Self {
        Self {
            max_reminders: 3,
            urgent_window_hours: 24,
            urgent_delay_minutes: 5,
            standard_min_hours: 1,
            standard_max_hours: 24,
        }
    }
}

impl ReminderPolicy {
    pub fn validate(&self) -> Result<(), ReminderError> {
        if self.max_reminders == 0 {
            return Err(ReminderError::InvalidPolicy(
                "max_reminders must be at least 1".into(),
            ));
        }
        if !(0..=MAX_URGENT_DELAY_MINUTES).contains(&self.urgent_delay_minutes) {
            return Err(ReminderError::InvalidPolicy(format!(
                "urgent_delay_minutes must be within 0..={MAX_URGENT_DELAY_MINUTES} (got {})",
                self.urgent_delay_minutes
            )));
        }
        if self.standard_min_hours == 0 {
            return Err(ReminderError::InvalidPolicy(
                "standard_min_hours must be at least 1".into(),
            ));
        }
        if self.standard_min_hours > self.standard_max_hours {
            return Err(ReminderError::InvalidPolicy(format!(
                "standard_min_hours ({}) exceeds standard_max_hours ({})",
                self.standard_min_hours, self.standard_max_hours
            )));
        }
        if self.standard_max_hours > MAX_STANDARD_HOURS {
            return Err(ReminderError::InvalidPolicy(format!(
                "standard_max_hours must be at most {MAX_STANDARD_HOURS} (got {})",
                self.standard_max_hours
            )));
        }
        Ok(())
    }

    /// Hour range for non-urgent delays, clamped to `1..=MAX_STANDARD_HOURS`.
    pub fn standard_range(&self) -> RangeInclusive<u32> {
        let min = self.standard_min_hours.clamp(1, MAX_STANDARD_HOURS);
        let max = self.standard_max_hours.clamp(min, MAX_STANDARD_HOURS);
        min..=max
    }

    /// Delay before the reminder fires.
    ///
    /// Urgent tasks get the fixed short delay. Standard and unknown tasks draw a
    /// whole number of hours uniformly from `standard_range()`. Stateless: each
    /// call is independent of earlier ones. Out-of-range settings are clamped
    /// to the limits `validate` enforces.
    pub fn delay_for<H: RandomHours + ?Sized>(
        &self,
        classification: Classification,
        rng: &mut H,
    ) -> Duration {
        match classification {
            Classification::Urgent => Duration::minutes(
                self.urgent_delay_minutes.clamp(0, MAX_URGENT_DELAY_MINUTES),
            ),
            Classification::Standard | Classification::Unknown => {
                Duration::hours(i64::from(rng.hours_in(self.standard_range())))
            }
        }
    }
}
