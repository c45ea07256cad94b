use anyhow::{Context, Result};
use chrono_tz::Tz;
use planifia_core::{ReminderPolicy, parse_timezone};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::state::ensure_planifia_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub reminders: RemindersSection,
    pub notifications: NotificationsSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemindersSection {
    #[serde(flatten)]
    pub policy: ReminderPolicy,

    /// IANA zone used to place due dates at local midnight. Unset means the
    /// system zone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    /// Fixed seed for the random delay source (reproducible plans).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsSection {
    pub title_prefix: String,
}

impl Default for RemindersSection {
    fn default() -> Self {
        Self {
            policy: ReminderPolicy::default(),
            timezone: None,
            seed: None,
        }
    }
}

impl Default for NotificationsSection {
    fn default() -> Self {
        Self {
            title_prefix: "Prioritized Task: ".to_string(),
        }
    }
}

impl RemindersSection {
    pub fn tz(&self) -> Result<Tz> {
        resolve_timezone(self.timezone.as_deref(), || {
            iana_time_zone::get_timezone().ok()
        })
    }
}

/// A configured zone must parse; otherwise use the system zone, then UTC.
fn resolve_timezone(configured: Option<&str>, system: impl FnOnce() -> Option<String>) -> Result<Tz> {
    if let Some(name) = configured {
        return Ok(parse_timezone(name)?);
    }
    match system() {
        Some(name) => match parse_timezone(&name) {
            Ok(tz) => Ok(tz),
            Err(e) => {
                warn!(error = %e, "system timezone not recognized, using UTC");
                Ok(chrono_tz::UTC)
            }
        },
        None => {
            warn!("system timezone unavailable, using UTC");
            Ok(chrono_tz::UTC)
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.reminders.policy.validate()?;
        self.reminders.tz()?;
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_planifia_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    let cfg: Config = toml::from_str(&s).with_context(|| format!("parse {}", p.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", p.display()))?;
    Ok(cfg)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn config_check() -> Result<()> {
    let cfg = load_config()?;
    let r = &cfg.reminders;

    println!("Reminder config ({}):\n", config_path()?.display());
    println!("- max_reminders: {}", r.policy.max_reminders);
    println!("- urgent_window_hours: {}", r.policy.urgent_window_hours);
    println!("- urgent_delay_minutes: {}", r.policy.urgent_delay_minutes);
    println!(
        "- standard delay: {}..={} hours",
        r.policy.standard_min_hours, r.policy.standard_max_hours
    );
    match &r.timezone {
        Some(name) => println!("- timezone: {name}"),
        None => println!("- timezone: {} (system)", r.tz()?),
    }
    println!(
        "- seed: {}",
        r.seed.map(|s| s.to_string()).as_deref().unwrap_or("<random>")
    );
    println!("- title_prefix: {:?}", cfg.notifications.title_prefix);
    Ok(())
}
