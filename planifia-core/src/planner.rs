//! Reminder planner: prioritized tasks in, scheduling requests out.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use tracing::{debug, info_span};

use crate::classifier::{Classification, DateProximityClassifier};
use crate::gateway::ReminderPayload;
use crate::policy::{RandomHours, ReminderPolicy};
use crate::task::Task;

/// One reminder to hand to the scheduling gateway.
///
/// `identity` is the task's rank within the selected subset. It doubles as
/// the timer key and the delivered notification id, which is what lets a
/// later cycle replace a still-pending reminder for the same slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderRequest {
    pub task: Task,
    pub identity: u32,
    pub classification: Classification,
    pub delay: Duration,
}

impl ReminderRequest {
    pub fn fire_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.delay
    }

    pub fn payload(&self) -> ReminderPayload {
        ReminderPayload {
            title: self.task.title.clone(),
            description: self.task.description.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReminderPlanner<R> {
    policy: ReminderPolicy,
    classifier: DateProximityClassifier,
    rng: R,
}

impl<R: RandomHours> ReminderPlanner<R> {
    pub fn new(policy: ReminderPolicy, tz: Tz, rng: R) -> Self {
        Self {
            policy,
            classifier: DateProximityClassifier::new(tz, policy.urgent_window_hours),
            rng,
        }
    }

    /// Plan reminders for the top `max_reminders` tasks, in priority order.
    ///
    /// The list is trusted to be sorted already. A malformed due date only
    /// degrades its own task to `Classification::Unknown`.
    pub fn plan(&mut self, tasks: &[Task], now: DateTime<Utc>) -> Vec<ReminderRequest> {
        let selected = tasks.len().min(self.policy.max_reminders);
        let mut out = Vec::with_capacity(selected);

        for (identity, task) in (0u32..).zip(tasks.iter().take(selected)) {
            let _task = info_span!("reminder", title = %task.title, identity).entered();
            let classification = self.classifier.classify(&task.due_date, now);

            let delay = self.policy.delay_for(classification, &mut self.rng);
            match classification {
                Classification::Urgent => debug!(
                    minutes = delay.num_minutes(),
                    "task due soon, reminding shortly"
                ),
                _ => debug!(
                    hours = delay.num_hours(),
                    ?classification,
                    "standard task, reminder delayed"
                ),
            }

            out.push(ReminderRequest {
                task: task.clone(),
                identity,
                classification,
                delay,
            });
        }

        out
    }
}
