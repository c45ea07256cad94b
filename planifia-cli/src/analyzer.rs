//! File-backed task analyzer.
//!
//! `tasks.json` holds a JSON array of tasks already in priority order (most
//! important first). The order is handed to the planner untouched.

use anyhow::{Context, Result};
use planifia_core::{AnalysisOutcome, Task, TaskAnalyzer};
use std::fs;
use std::path::{Path, PathBuf};

use crate::session::Session;

#[derive(Debug, Clone)]
pub struct FileTaskAnalyzer {
    path: PathBuf,
    session: Session,
}

impl FileTaskAnalyzer {
    pub fn new(path: impl Into<PathBuf>, session: Session) -> Self {
        Self {
            path: path.into(),
            session,
        }
    }
}

impl TaskAnalyzer for FileTaskAnalyzer {
    fn is_user_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    fn analyze_tasks(&self) -> AnalysisOutcome {
        read_tasks(&self.path).map_err(|e| format!("{e:#}"))
    }
}

pub fn read_tasks(path: &Path) -> Result<Vec<Task>> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    if s.trim().is_empty() {
        return Ok(vec![]);
    }
    serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn write_tasks(path: &Path, tasks: &[Task]) -> Result<()> {
    let s = serde_json::to_string_pretty(tasks)?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
