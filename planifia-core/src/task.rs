//! Task model as handed over by the task analyzer.

use serde::{Deserialize, Serialize};

/// A task to remind about.
///
/// `due_date` is kept as the raw calendar-date string (`YYYY-MM-DD`) the
/// analyzer produced; parsing happens at classification time so a malformed
/// date only affects that one task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Task {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_date: String,
}

impl Task {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        due_date: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            due_date: due_date.into(),
        }
    }
}
