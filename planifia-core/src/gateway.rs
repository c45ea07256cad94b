//! Boundary contracts with the delivery sink.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// What a delivered reminder shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderPayload {
    pub title: String,
    pub description: String,
}

/// Hands a planned reminder to the delivery sink.
///
/// Implementations must treat `identity` as the timer key: scheduling the
/// same identity again replaces whatever is still pending for it. The call is
/// fire-and-forget; retries, if any, are the sink's business.
pub trait SchedulingGateway {
    fn schedule(&self, identity: u32, delay: Duration, payload: ReminderPayload);
}

impl<G: SchedulingGateway + ?Sized> SchedulingGateway for &G {
    fn schedule(&self, identity: u32, delay: Duration, payload: ReminderPayload) {
        (**self).schedule(identity, delay, payload)
    }
}

/// Called by the sink once a timer fires.
pub trait ReminderDelivery {
    fn deliver(&self, identity: u32, title: &str, description: &str);
}

/// In-memory gateway: keeps the latest request per identity plus a call log.
///
/// Used for dry runs and tests.
#[derive(Debug, Default)]
pub struct RecordingGateway {
    inner: Mutex<Recorded>,
}

#[derive(Debug, Default)]
struct Recorded {
    calls: Vec<(u32, Duration, ReminderPayload)>,
    pending: BTreeMap<u32, (Duration, ReminderPayload)>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `schedule` call in arrival order.
    pub fn calls(&self) -> Vec<(u32, Duration, ReminderPayload)> {
        self.lock().calls.clone()
    }

    /// Pending reminders keyed by identity (last write wins).
    pub fn pending(&self) -> BTreeMap<u32, (Duration, ReminderPayload)> {
        self.lock().pending.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recorded> {
        // A poisoned log is still a readable log.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SchedulingGateway for RecordingGateway {
    fn schedule(&self, identity: u32, delay: Duration, payload: ReminderPayload) {
        let mut rec = self.lock();
        rec.calls.push((identity, delay, payload.clone()));
        rec.pending.insert(identity, (delay, payload));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(title: &str) -> ReminderPayload {
        ReminderPayload {
            title: title.to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn same_identity_replaces_pending() {
        let g = RecordingGateway::new();
        g.schedule(0, Duration::minutes(5), payload("first"));
        g.schedule(1, Duration::hours(3), payload("other"));
        g.schedule(0, Duration::hours(2), payload("second"));

        assert_eq!(g.calls().len(), 3);
        let pending = g.pending();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[&0], (Duration::hours(2), payload("second")));
    }
}
