use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Subcommand;
use planifia_core::{
    CycleReport, RecordingGateway, ReminderCycle, ReminderPlanner, SchedulingGateway,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use tokio::runtime::Handle;
use tracing::info;

use crate::analyzer::FileTaskAnalyzer;
use crate::config::{Config, load_config};
use crate::session::load_session;
use crate::sink::{Notifier, TimerSink};
use crate::state::tasks_path;

#[derive(Subcommand, Debug)]
pub enum RemindersCommand {
    /// Show which reminders a cycle would schedule, without scheduling them
    Plan {
        /// Prioritized tasks JSON (default: ~/.planifia/tasks.json)
        #[arg(long)]
        tasks: Option<PathBuf>,

        /// Seed for the random delay source (default from config, else random)
        #[arg(long)]
        seed: Option<u64>,

        /// Evaluate as of this RFC3339 instant instead of the current time
        #[arg(long)]
        now: Option<String>,
    },

    /// Run one cycle and deliver reminders as their timers fire
    Run {
        #[arg(long)]
        tasks: Option<PathBuf>,

        #[arg(long)]
        seed: Option<u64>,

        /// Return right after scheduling instead of waiting for delivery
        #[arg(long, default_value_t = false)]
        no_wait: bool,
    },
}

pub async fn run(cmd: RemindersCommand) -> Result<()> {
    match cmd {
        RemindersCommand::Plan { tasks, seed, now } => plan(tasks, seed, now),
        RemindersCommand::Run {
            tasks,
            seed,
            no_wait,
        } => run_cycle(tasks, seed, no_wait).await,
    }
}

fn build_cycle<G: SchedulingGateway>(
    cfg: &Config,
    seed: Option<u64>,
    gateway: G,
) -> Result<ReminderCycle<StdRng, G>> {
    let rng = match seed.or(cfg.reminders.seed) {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };
    let planner = ReminderPlanner::new(cfg.reminders.policy, cfg.reminders.tz()?, rng);
    Ok(ReminderCycle::new(planner, gateway))
}

fn analyzer(tasks: Option<PathBuf>) -> Result<FileTaskAnalyzer> {
    let path = match tasks {
        Some(p) => p,
        None => tasks_path()?,
    };
    Ok(FileTaskAnalyzer::new(path, load_session()?))
}

fn parse_now(now: Option<String>) -> Result<DateTime<Utc>> {
    match now {
        Some(s) => Ok(DateTime::parse_from_rfc3339(&s)
            .with_context(|| format!("invalid --now '{s}' (expected RFC3339)"))?
            .with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}

fn print_report(report: &CycleReport, now: DateTime<Utc>, cfg: &Config) -> Result<()> {
    match report {
        CycleReport::NotAuthenticated => {
            println!("Not logged in; no reminders scheduled. Run: planifia login --user <name>");
        }
        CycleReport::AnalysisFailed(e) => {
            println!("Task analysis failed; no reminders scheduled ({e}).");
        }
        CycleReport::Scheduled(requests) if requests.is_empty() => {
            println!("No tasks to remind.");
        }
        CycleReport::Scheduled(requests) => {
            let tz = cfg.reminders.tz()?;
            for r in requests {
                println!(
                    "#{} [{:?}] {} (due {}) -> in {} at {}",
                    r.identity,
                    r.classification,
                    r.task.title,
                    r.task.due_date,
                    format_delay(r.delay),
                    r.fire_at(now).with_timezone(&tz).format("%Y-%m-%d %H:%M %Z"),
                );
            }
        }
    }
    Ok(())
}

fn format_delay(delay: chrono::Duration) -> String {
    if delay.num_minutes() < 60 {
        format!("{} min", delay.num_minutes())
    } else {
        format!("{} h", delay.num_hours())
    }
}

fn plan(tasks: Option<PathBuf>, seed: Option<u64>, now: Option<String>) -> Result<()> {
    let cfg = load_config()?;
    let now = parse_now(now)?;
    let mut cycle = build_cycle(&cfg, seed, RecordingGateway::new())?;
    let report = cycle.run(&analyzer(tasks)?, now);
    print_report(&report, now, &cfg)
}

async fn run_cycle(tasks: Option<PathBuf>, seed: Option<u64>, no_wait: bool) -> Result<()> {
    let cfg = load_config()?;
    let now = Utc::now();
    let (sink, mut rx) = TimerSink::new(Handle::current());
    let mut cycle = build_cycle(&cfg, seed, sink)?;

    let report = cycle.run(&analyzer(tasks)?, now);
    print_report(&report, now, &cfg)?;

    let sink = cycle.gateway();
    if no_wait || sink.pending_count() == 0 {
        return Ok(());
    }

    let notifier = Notifier::new(cfg.notifications.title_prefix.clone());
    println!("Waiting for {} reminders (Ctrl-C to stop)...", sink.pending_count());

    let delivered = sink
        .wait_for_deliveries(&mut rx, &notifier, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;
    info!(delivered, "reminder delivery finished");

    Ok(())
}
