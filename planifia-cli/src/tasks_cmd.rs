use anyhow::{Result, bail};
use clap::Subcommand;
use planifia_core::{Task, parse_due_date};

use crate::analyzer::{read_tasks, write_tasks};
use crate::config::load_config;
use crate::state::tasks_path;

#[derive(Subcommand, Debug)]
pub enum TasksCommand {
    /// Add a task to the prioritized list (appended at the lowest priority)
    Add {
        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Due date, YYYY-MM-DD
        #[arg(long)]
        due: String,

        /// Insert at the top of the list instead
        #[arg(long, default_value_t = false)]
        first: bool,
    },

    /// List tasks in priority order
    List,

    /// Remove the task at a 1-based position
    Remove { position: usize },
}

pub fn run(cmd: TasksCommand) -> Result<()> {
    match cmd {
        TasksCommand::Add {
            title,
            description,
            due,
            first,
        } => add(title, description, due, first),
        TasksCommand::List => list(),
        TasksCommand::Remove { position } => remove(position),
    }
}

fn load() -> Result<Vec<Task>> {
    let p = tasks_path()?;
    if !p.exists() {
        return Ok(vec![]);
    }
    read_tasks(&p)
}

fn add(title: String, description: String, due: String, first: bool) -> Result<()> {
    if title.trim().is_empty() {
        bail!("title must not be empty");
    }
    // Malformed dates are accepted; the planner treats them as non-urgent.
    let tz = load_config()?.reminders.tz()?;
    if let Err(e) = parse_due_date(&due, tz) {
        println!("Warning: {e}");
    }

    let mut tasks = load()?;
    let task = Task::new(title, description, due);
    if first {
        tasks.insert(0, task);
    } else {
        tasks.push(task);
    }
    let p = tasks_path()?;
    write_tasks(&p, &tasks)?;
    println!("Saved {} tasks to {}", tasks.len(), p.display());
    Ok(())
}

fn list() -> Result<()> {
    let tasks = load()?;
    if tasks.is_empty() {
        println!("No tasks. Add one with: planifia tasks add --title ... --due YYYY-MM-DD");
        return Ok(());
    }
    for (i, t) in tasks.iter().enumerate() {
        println!("{}. {} (due {})", i + 1, t.title, t.due_date);
        if !t.description.is_empty() {
            println!("   {}", t.description);
        }
    }
    Ok(())
}

fn remove(position: usize) -> Result<()> {
    let mut tasks = load()?;
    if position == 0 || position > tasks.len() {
        bail!("no task at position {position} ({} tasks)", tasks.len());
    }
    let t = tasks.remove(position - 1);
    write_tasks(&tasks_path()?, &tasks)?;
    println!("Removed: {}", t.title);
    Ok(())
}
