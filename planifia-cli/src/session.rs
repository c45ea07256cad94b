//! Local login state. The task analyzer refuses to run without a user.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::state::session_path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: Option<String>,
    pub logged_in_at_utc: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_logged_in(&self) -> bool {
        self.user.as_deref().is_some_and(|u| !u.trim().is_empty())
    }
}

pub fn load_session() -> Result<Session> {
    load_session_from(&session_path()?)
}

pub fn load_session_from(p: &Path) -> Result<Session> {
    if !p.exists() {
        return Ok(Session::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    Ok(serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))?)
}

pub fn save_session(session: &Session) -> Result<()> {
    let p = session_path()?;
    let s = serde_json::to_string_pretty(session)?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn login(user: &str) -> Result<()> {
    let user = user.trim();
    if user.is_empty() {
        bail!("user name must not be empty");
    }
    save_session(&Session {
        user: Some(user.to_string()),
        logged_in_at_utc: Some(Utc::now()),
    })?;
    println!("Logged in as {user}");
    Ok(())
}

pub fn logout() -> Result<()> {
    save_session(&Session::default())?;
    println!("Logged out");
    Ok(())
}
