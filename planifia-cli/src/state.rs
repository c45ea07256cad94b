use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$PLANIFIA_HOME`, or `~/.planifia`.
pub fn planifia_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("PLANIFIA_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".planifia"))
}

pub fn ensure_planifia_home() -> Result<PathBuf> {
    let dir = planifia_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn tasks_path() -> Result<PathBuf> {
    Ok(ensure_planifia_home()?.join("tasks.json"))
}

pub fn session_path() -> Result<PathBuf> {
    Ok(ensure_planifia_home()?.join("session.json"))
}
