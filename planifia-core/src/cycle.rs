//! Planning cycle: analyzer result -> planner -> scheduling gateway.
//!
//! A cycle is synchronous and lock-free. Overlapping cycles each own their
//! planner and may share one gateway by reference; they only race on the
//! gateway, where the replace-per-identity contract settles it (last write wins).

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use crate::error::ReminderError;
use crate::gateway::SchedulingGateway;
use crate::planner::{ReminderPlanner, ReminderRequest};
use crate::policy::RandomHours;
use crate::task::Task;

/// Result of one task analysis: the priority-ordered list, or an error message.
pub type AnalysisOutcome = Result<Vec<Task>, String>;

/// Upstream component that knows the user session and prioritizes tasks.
pub trait TaskAnalyzer {
    fn is_user_logged_in(&self) -> bool;

    fn analyze_tasks(&self) -> AnalysisOutcome;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleReport {
    /// No session; nothing was analyzed or scheduled.
    NotAuthenticated,
    AnalysisFailed(ReminderError),
    Scheduled(Vec<ReminderRequest>),
}

impl CycleReport {
    /// Requests handed to the gateway this cycle, in emission order.
    pub fn requests(&self) -> &[ReminderRequest] {
        match self {
            CycleReport::Scheduled(requests) => requests,
            _ => &[],
        }
    }
}

/// Wires a planner to a gateway. `Send` whenever its parts are, so it can be
/// driven from whichever thread the analysis result arrives on.
#[derive(Debug)]
pub struct ReminderCycle<R, G> {
    planner: ReminderPlanner<R>,
    gateway: G,
}

impl<R: RandomHours, G: SchedulingGateway> ReminderCycle<R, G> {
    pub fn new(planner: ReminderPlanner<R>, gateway: G) -> Self {
        Self { planner, gateway }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Check the session, run the analyzer, then plan and schedule.
    pub fn run<A: TaskAnalyzer + ?Sized>(&mut self, analyzer: &A, now: DateTime<Utc>) -> CycleReport {
        if !analyzer.is_user_logged_in() {
            debug!("cannot schedule reminders: user not logged in");
            return CycleReport::NotAuthenticated;
        }
        self.on_analysis(analyzer.analyze_tasks(), now)
    }

    /// Completion entry point for an analysis result.
    pub fn on_analysis(&mut self, outcome: AnalysisOutcome, now: DateTime<Utc>) -> CycleReport {
        let tasks = match outcome {
            Ok(tasks) => tasks,
            Err(message) => {
                error!(%message, "task analysis failed");
                return CycleReport::AnalysisFailed(ReminderError::AnalysisFailed(message));
            }
        };

        let requests = self.planner.plan(&tasks, now);

        for r in &requests {
            self.gateway.schedule(r.identity, r.delay, r.payload());
        }

        info!(
            analyzed = tasks.len(),
            scheduled = requests.len(),
            "reminder cycle complete"
        );
        CycleReport::Scheduled(requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::RecordingGateway;
    use crate::policy::ReminderPolicy;
    use chrono::{Duration, TimeZone};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::cell::Cell;

    struct FakeAnalyzer {
        logged_in: bool,
        outcome: AnalysisOutcome,
        calls: Cell<usize>,
    }

    impl FakeAnalyzer {
        fn new(logged_in: bool, outcome: AnalysisOutcome) -> Self {
            Self {
                logged_in,
                outcome,
                calls: Cell::new(0),
            }
        }
    }

    impl TaskAnalyzer for FakeAnalyzer {
        fn is_user_logged_in(&self) -> bool {
            self.logged_in
        }

        fn analyze_tasks(&self) -> AnalysisOutcome {
            self.calls.set(self.calls.get() + 1);
            self.outcome.clone()
        }
    }

    fn cycle() -> ReminderCycle<StdRng, RecordingGateway> {
        let planner = ReminderPlanner::new(ReminderPolicy::default(), chrono_tz::UTC, StdRng::seed_from_u64(9));
        ReminderCycle::new(planner, RecordingGateway::new())
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap()
    }

    #[test]
    fn not_logged_in_skips_analysis() {
        let mut c = cycle();
        let analyzer = FakeAnalyzer::new(false, Ok(vec![Task::new("a", "", "2026-01-15")]));
        let report = c.run(&analyzer, now());
        assert_eq!(report, CycleReport::NotAuthenticated);
        assert!(report.requests().is_empty());
        assert_eq!(analyzer.calls.get(), 0);
        assert!(c.gateway().calls().is_empty());
    }

    #[test]
    fn analysis_error_schedules_nothing() {
        let mut c = cycle();
        let analyzer = FakeAnalyzer::new(true, Err("network".into()));
        let report = c.run(&analyzer, now());
        assert_eq!(
            report,
            CycleReport::AnalysisFailed(ReminderError::AnalysisFailed("network".into()))
        );
        assert!(c.gateway().calls().is_empty());
    }

    #[test]
    fn empty_list_schedules_nothing() {
        let mut c = cycle();
        let report = c.on_analysis(Ok(vec![]), now());
        assert_eq!(report, CycleReport::Scheduled(vec![]));
        assert!(c.gateway().calls().is_empty());
    }

    #[test]
    fn one_gateway_call_per_request_in_order() {
        let mut c = cycle();
        let tasks = vec![
            Task::new("a", "first", "2026-01-15"),
            Task::new("b", "second", "2026-01-20"),
            Task::new("c", "third", "nope"),
            Task::new("d", "fourth", "2026-01-15"),
        ];
        let report = c.run(&FakeAnalyzer::new(true, Ok(tasks)), now());

        let calls = c.gateway().calls();
        assert_eq!(calls.len(), 3);
        for (call, req) in calls.iter().zip(report.requests()) {
            assert_eq!(call.0, req.identity);
            assert_eq!(call.1, req.delay);
            assert_eq!(call.2, req.payload());
        }
        assert_eq!(calls[0].1, Duration::minutes(5));
        assert_eq!(calls[2].2.description, "third");
    }

    #[test]
    fn repeated_cycles_replace_by_identity() {
        let mut c = cycle();
        c.on_analysis(Ok(vec![Task::new("old", "", "2026-01-15")]), now());
        c.on_analysis(Ok(vec![Task::new("new", "", "2026-01-15")]), now());

        assert_eq!(c.gateway().calls().len(), 2);
        let pending = c.gateway().pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[&0].1.title, "new");
    }

    #[test]
    fn overlapping_cycles_share_a_gateway() {
        let gateway = RecordingGateway::new();
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4u64)
                .map(|i| {
                    let gateway = &gateway;
                    scope.spawn(move || {
                        let planner = ReminderPlanner::new(
                            ReminderPolicy::default(),
                            chrono_tz::UTC,
                            StdRng::seed_from_u64(i),
                        );
                        let mut c = ReminderCycle::new(planner, gateway);
                        c.on_analysis(Ok(vec![Task::new(format!("t{i}"), "", "2026-01-15")]), now())
                    })
                })
                .collect();
            for h in handles {
                assert_eq!(h.join().unwrap().requests().len(), 1);
            }
        });
        assert_eq!(gateway.calls().len(), 4);
        assert_eq!(gateway.pending().len(), 1);
    }
}
