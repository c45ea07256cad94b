//! In-process delivery sink: one tokio timer per reminder identity.

use chrono::Duration;
use planifia_core::{ReminderDelivery, ReminderPayload, SchedulingGateway};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub identity: u32,
    pub payload: ReminderPayload,
}

type Pending = HashMap<u32, (u64, JoinHandle<()>)>;

/// Timer-backed `SchedulingGateway`.
///
/// Scheduling an identity that is still pending aborts the old timer (last
/// write wins). Fired reminders come out of the receiver returned by `new`.
#[derive(Debug)]
pub struct TimerSink {
    handle: Handle,
    tx: mpsc::UnboundedSender<Delivery>,
    pending: Arc<Mutex<Pending>>,
    generation: AtomicU64,
}

impl TimerSink {
    pub fn new(handle: Handle) -> (Self, mpsc::UnboundedReceiver<Delivery>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = Self {
            handle,
            tx,
            pending: Arc::new(Mutex::new(HashMap::new())),
            generation: AtomicU64::new(0),
        };
        (sink, rx)
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }

    /// Abort all pending timers.
    pub fn cancel_all(&self) {
        for (_, (_, task)) in lock(&self.pending).drain() {
            task.abort();
        }
    }

    /// Hand fired reminders to `delivery` until no timer is pending or
    /// `shutdown` resolves (which cancels what is left). Returns how many
    /// reminders were delivered.
    pub async fn wait_for_deliveries<D, F>(
        &self,
        rx: &mut mpsc::UnboundedReceiver<Delivery>,
        delivery: &D,
        shutdown: F,
    ) -> usize
    where
        D: ReminderDelivery + ?Sized,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut delivered = 0;

        while self.pending_count() > 0 {
            tokio::select! {
                Some(d) = rx.recv() => {
                    delivery.deliver(d.identity, &d.payload.title, &d.payload.description);
                    delivered += 1;
                }
                _ = &mut shutdown => {
                    info!(pending = self.pending_count(), "interrupted; cancelling pending reminders");
                    self.cancel_all();
                    break;
                }
            }
        }

        // Timers send before leaving the registry, so every fired reminder is queued by now.
        while let Ok(d) = rx.try_recv() {
            delivery.deliver(d.identity, &d.payload.title, &d.payload.description);
            delivered += 1;
        }
        delivered
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl SchedulingGateway for TimerSink {
    fn schedule(&self, identity: u32, delay: Duration, payload: ReminderPayload) {
        // Negative delays fire immediately.
        let wait = delay.to_std().unwrap_or_default();
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;

        // Hold the map while spawning so the timer cannot fire before it is registered.
        let mut pending = lock(&self.pending);
        let tx = self.tx.clone();
        let registry = Arc::clone(&self.pending);
        let task = self.handle.spawn(async move {
            tokio::time::sleep(wait).await;
            let mut pending = lock(&registry);
            // A replaced timer that woke before its abort landed stays silent.
            if !pending.get(&identity).is_some_and(|(g, _)| *g == generation) {
                return;
            }
            // Send while still registered: an empty registry means every
            // fired reminder is already in the channel. Receiver gone means
            // the host stopped listening.
            let _ = tx.send(Delivery { identity, payload });
            pending.remove(&identity);
        });

        if let Some((_, previous)) = pending.insert(identity, (generation, task)) {
            previous.abort();
            debug!(identity, "replaced pending reminder");
        }
        debug!(identity, seconds = wait.as_secs(), "reminder timer armed");
    }
}

/// Presents fired reminders on stdout.
#[derive(Debug, Clone)]
pub struct Notifier {
    title_prefix: String,
}

impl Notifier {
    pub fn new(title_prefix: impl Into<String>) -> Self {
        Self {
            title_prefix: title_prefix.into(),
        }
    }

    pub fn render(&self, title: &str, description: &str) -> String {
        if description.trim().is_empty() {
            format!("{}{}", self.title_prefix, title)
        } else {
            format!("{}{}\n    {}", self.title_prefix, title, description)
        }
    }
}

impl ReminderDelivery for Notifier {
    fn deliver(&self, identity: u32, title: &str, description: &str) {
        info!(identity, title, "reminder delivered");
        println!("[{identity}] {}", self.render(title, description));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(title: &str) -> ReminderPayload {
        ReminderPayload {
            title: title.to_string(),
            description: format!("{title} details"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fires_after_delay_in_delay_order() {
        let (sink, mut rx) = TimerSink::new(Handle::current());
        sink.schedule(0, Duration::hours(3), payload("later"));
        sink.schedule(1, Duration::minutes(5), payload("soon"));
        assert_eq!(sink.pending_count(), 2);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.identity, 1);
        assert_eq!(first.payload.title, "soon");

        let second = rx.recv().await.unwrap();
        assert_eq!(second.identity, 0);
        assert_eq!(sink.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_same_identity_replaces_timer() {
        let (sink, mut rx) = TimerSink::new(Handle::current());
        sink.schedule(0, Duration::hours(1), payload("old"));
        sink.schedule(0, Duration::hours(2), payload("new"));
        assert_eq!(sink.pending_count(), 1);

        let d = rx.recv().await.unwrap();
        assert_eq!(d.payload.title, "new");

        drop(sink);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_all_drops_pending() {
        let (sink, mut rx) = TimerSink::new(Handle::current());
        sink.schedule(0, Duration::minutes(5), payload("a"));
        sink.schedule(1, Duration::minutes(10), payload("b"));
        sink.cancel_all();
        assert_eq!(sink.pending_count(), 0);

        drop(sink);
        assert!(rx.recv().await.is_none());
    }

    #[derive(Default)]
    struct Collected(Mutex<Vec<u32>>);

    impl ReminderDelivery for Collected {
        fn deliver(&self, identity: u32, _title: &str, _description: &str) {
            self.0.lock().unwrap().push(identity);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn simultaneous_timers_are_all_delivered() {
        for _ in 0..200 {
            let (sink, mut rx) = TimerSink::new(Handle::current());
            for identity in 0..3 {
                sink.schedule(identity, Duration::zero(), payload("now"));
            }
            let seen = Collected::default();
            let delivered = sink
                .wait_for_deliveries(&mut rx, &seen, std::future::pending())
                .await;

            assert_eq!(delivered, 3);
            let mut ids = seen.0.lock().unwrap().clone();
            ids.sort();
            assert_eq!(ids, [0, 1, 2]);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn wait_delivers_in_fire_order() {
        let (sink, mut rx) = TimerSink::new(Handle::current());
        sink.schedule(0, Duration::hours(20), payload("late"));
        sink.schedule(1, Duration::minutes(5), payload("urgent"));
        sink.schedule(2, Duration::hours(1), payload("standard"));

        let seen = Collected::default();
        let delivered = sink
            .wait_for_deliveries(&mut rx, &seen, std::future::pending())
            .await;
        assert_eq!(delivered, 3);
        assert_eq!(*seen.0.lock().unwrap(), [1, 2, 0]);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_pending() {
        let (sink, mut rx) = TimerSink::new(Handle::current());
        sink.schedule(0, Duration::hours(2), payload("later"));

        let seen = Collected::default();
        let delivered = sink.wait_for_deliveries(&mut rx, &seen, async {}).await;
        assert_eq!(delivered, 0);
        assert_eq!(sink.pending_count(), 0);
        assert!(seen.0.lock().unwrap().is_empty());
    }

    #[test]
    fn render_with_and_without_description() {
        let n = Notifier::new("Prioritized Task: ");
        assert_eq!(n.render("Pay rent", ""), "Prioritized Task: Pay rent");
        assert_eq!(
            n.render("Pay rent", "before the 5th"),
            "Prioritized Task: Pay rent\n    before the 5th"
        );
    }
}
