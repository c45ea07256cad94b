//! planifia-core: reminder timing policy for prioritized tasks.
//!
//! Pure, synchronous building blocks: the planner turns a priority-ordered
//! task list into `(identity, delay)` scheduling requests and hands them to
//! whatever delivery sink the host provides.

pub mod classifier;
pub mod cycle;
pub mod error;
pub mod gateway;
pub mod planner;
pub mod policy;
pub mod task;
pub mod time;

pub use classifier::{Classification, DateProximityClassifier};
pub use cycle::{AnalysisOutcome, CycleReport, ReminderCycle, TaskAnalyzer};
pub use error::ReminderError;
pub use gateway::{RecordingGateway, ReminderDelivery, ReminderPayload, SchedulingGateway};
pub use planner::{ReminderPlanner, ReminderRequest};
pub use policy::{MAX_STANDARD_HOURS, MAX_URGENT_DELAY_MINUTES, RandomHours, ReminderPolicy};
pub use task::Task;
pub use time::{parse_due_date, parse_timezone};
