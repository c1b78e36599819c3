//! Event scheduler: decides when the reconciler runs.
//!
//! One pinned [`Sleep`](tokio::time::Sleep) is the only pending invocation.
//! It starts due immediately. A relevant watcher event re-arms it to fire
//! now, so a burst of events collapses into a single pass. When it fires, the
//! pass runs to completion and its outcome picks the next delay.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use notify::event::ModifyKind;
use notify::{Event, EventKind};
use tokio::sync::mpsc;
use tokio::time::Instant;

use unitsync_control::ServiceManager;
use unitsync_sync::{ActionKind, Reconciler};

use crate::config::Intervals;
use crate::error::DaemonError;

/// Roughly thirty years; stands in for "never" when an interval overflows.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// One reconciliation pass. Returns whether it converged.
#[async_trait]
pub trait Reconcile: Send {
    async fn reconcile(&mut self) -> bool;
}

#[async_trait]
impl<M: ServiceManager> Reconcile for Reconciler<M> {
    async fn reconcile(&mut self) -> bool {
        let report = self.run_pass().await;
        if report.converged {
            tracing::info!(
                units = self.state().len(),
                wrote = report.count(ActionKind::Wrote),
                started = report.count(ActionKind::Started),
                restarted = report.count(ActionKind::Restarted),
                stopped = report.count(ActionKind::Stopped),
                removed = report.count(ActionKind::Removed),
                duration_ms = report.duration_ms,
                "reconciliation pass converged",
            );
        } else {
            tracing::warn!(
                units = self.state().len(),
                failures = report.failures.len(),
                duration_ms = report.duration_ms,
                "reconciliation pass incomplete",
            );
        }
        report.converged
    }
}

/// Drive `reconciler` from watcher `events` and the resync/retry timer.
///
/// Returns `Ok(())` when the event channel closes or `shutdown` resolves,
/// and [`DaemonError::Watcher`] when the watcher reports an error.
pub async fn run_loop<R, S>(
    mut events: mpsc::UnboundedReceiver<notify::Result<Event>>,
    reconciler: &mut R,
    intervals: Intervals,
    shutdown: S,
) -> Result<(), DaemonError>
where
    R: Reconcile + ?Sized,
    S: Future<Output = ()>,
{
    let timer = tokio::time::sleep_until(Instant::now());
    tokio::pin!(timer);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => {
                tracing::info!("shutdown requested, stopping scheduler");
                return Ok(());
            }
            event = events.recv() => {
                let Some(event) = event else {
                    tracing::info!("watcher channel closed, stopping scheduler");
                    return Ok(());
                };
                let event = event.map_err(DaemonError::Watcher)?;
                if is_relevant_event_kind(&event.kind) {
                    tracing::debug!(
                        kind = ?event.kind,
                        paths = ?event.paths,
                        "unit directory changed",
                    );
                    timer.as_mut().reset(Instant::now());
                }
            }
            () = &mut timer => {
                let converged = reconciler.reconcile().await;
                let delay = intervals.next_delay(converged);
                tracing::debug!(delay = ?delay, "next reconciliation scheduled");
                timer.as_mut().reset(deadline_after(delay));
            }
        }
    }
}

/// `now + delay`, clamped to a far-future instant when the sum overflows.
fn deadline_after(delay: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(delay).unwrap_or_else(|| now + FAR_FUTURE)
}

/// Create, write, remove and rename. Metadata and access events are ignored.
pub fn is_relevant_event_kind(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Remove(_)
            | EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Name(_) | ModifyKind::Any)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use notify::event::{
        AccessKind, CreateKind, DataChange, MetadataKind, RemoveKind, RenameMode,
    };

    const INTERVALS: Intervals = Intervals {
        resync: Duration::from_secs(60 * 60),
        retry: Duration::from_secs(1),
    };

    /// Replays one step per pass: events to emit, then the pass outcome.
    /// Drops the event sender after the last step so the loop ends.
    struct Scripted {
        tx: Option<mpsc::UnboundedSender<notify::Result<Event>>>,
        steps: VecDeque<(Vec<EventKind>, bool)>,
        passes: Vec<Instant>,
    }

    impl Scripted {
        fn new(
            steps: Vec<(Vec<EventKind>, bool)>,
        ) -> (Self, mpsc::UnboundedReceiver<notify::Result<Event>>) {
            let (tx, rx) = mpsc::unbounded_channel();
            let scripted = Self {
                tx: Some(tx),
                steps: steps.into(),
                passes: Vec::new(),
            };
            (scripted, rx)
        }

        fn gap(&self, from: usize, to: usize) -> Duration {
            self.passes[to].duration_since(self.passes[from])
        }
    }

    #[async_trait]
    impl Reconcile for Scripted {
        async fn reconcile(&mut self) -> bool {
            self.passes.push(Instant::now());
            let Some((kinds, converged)) = self.steps.pop_front() else {
                return true;
            };
            if let Some(tx) = &self.tx {
                for kind in kinds {
                    let _ = tx.send(Ok(Event::new(kind)));
                }
            }
            if self.steps.is_empty() {
                self.tx = None;
            }
            converged
        }
    }

    fn create() -> EventKind {
        EventKind::Create(CreateKind::File)
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn first_pass_runs_immediately_and_channel_close_ends_loop() {
        let (mut scripted, rx) = Scripted::new(vec![(vec![], true)]);
        let started = Instant::now();

        run_loop(rx, &mut scripted, INTERVALS, std::future::pending())
            .await
            .expect("loop ends cleanly");

        assert_eq!(scripted.passes.len(), 1);
        assert!(scripted.passes[0].duration_since(started) < INTERVALS.retry);
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn relevant_event_preempts_resync_wait() {
        let (mut scripted, rx) = Scripted::new(vec![(vec![create()], true), (vec![], true)]);

        run_loop(rx, &mut scripted, INTERVALS, std::future::pending())
            .await
            .expect("loop ends cleanly");

        assert_eq!(scripted.passes.len(), 2);
        assert!(scripted.gap(0, 1) < INTERVALS.retry, "event must not wait for resync");
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn burst_of_events_coalesces_into_one_pass() {
        let burst = vec![
            create(),
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            EventKind::Remove(RemoveKind::File),
            create(),
        ];
        let (mut scripted, rx) = Scripted::new(vec![(burst, true), (vec![], true)]);

        run_loop(rx, &mut scripted, INTERVALS, std::future::pending())
            .await
            .expect("loop ends cleanly");

        assert_eq!(
            scripted.passes.len(),
            2,
            "a burst of events should collapse to one rerun"
        );
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn failed_pass_retries_after_retry_interval() {
        let (mut scripted, rx) = Scripted::new(vec![(vec![], false), (vec![], true)]);

        run_loop(rx, &mut scripted, INTERVALS, std::future::pending())
            .await
            .expect("loop ends cleanly");

        assert_eq!(scripted.passes.len(), 2);
        let gap = scripted.gap(0, 1);
        assert!(gap >= INTERVALS.retry && gap < INTERVALS.resync, "gap {gap:?}");
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn metadata_event_waits_for_resync() {
        let metadata = EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions));
        let (mut scripted, rx) = Scripted::new(vec![(vec![metadata], true), (vec![], true)]);

        run_loop(rx, &mut scripted, INTERVALS, std::future::pending())
            .await
            .expect("loop ends cleanly");

        assert_eq!(scripted.passes.len(), 2);
        assert!(scripted.gap(0, 1) >= INTERVALS.resync);
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn watcher_error_is_fatal() {
        let (mut scripted, rx) = Scripted::new(vec![(vec![], true)]);
        if let Some(tx) = &scripted.tx {
            tx.send(Err(notify::Error::generic("inotify queue overflow")))
                .expect("send watcher error");
        }

        let err = run_loop(rx, &mut scripted, INTERVALS, std::future::pending())
            .await
            .expect_err("watcher error must end the loop");

        assert!(matches!(err, DaemonError::Watcher(_)), "got {err:?}");
        assert!(err.to_string().contains("inotify queue overflow"));
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn shutdown_ends_loop_without_error() {
        let (mut scripted, rx) = Scripted::new(vec![(vec![], true), (vec![], true)]);

        run_loop(rx, &mut scripted, INTERVALS, std::future::ready(()))
            .await
            .expect("shutdown is clean");

        assert!(scripted.passes.is_empty());
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn overflowing_resync_interval_does_not_panic() {
        let intervals = Intervals {
            resync: Duration::MAX,
            retry: INTERVALS.retry,
        };
        let (mut scripted, rx) = Scripted::new(vec![(vec![], true)]);

        run_loop(rx, &mut scripted, intervals, std::future::pending())
            .await
            .expect("loop ends cleanly");

        assert_eq!(scripted.passes.len(), 1);
    }

    #[test]
    fn deadline_after_clamps_overflow() {
        let before = Instant::now();
        assert!(deadline_after(Duration::MAX) >= before + FAR_FUTURE);
        assert!(deadline_after(Duration::from_secs(1)) >= before + Duration::from_secs(1));
    }

    #[test]
    fn event_kind_relevance() {
        let relevant = [
            EventKind::Create(CreateKind::File),
            EventKind::Remove(RemoveKind::Any),
            EventKind::Modify(ModifyKind::Data(DataChange::Any)),
            EventKind::Modify(ModifyKind::Name(RenameMode::From)),
            EventKind::Modify(ModifyKind::Any),
        ];
        for kind in relevant {
            assert!(is_relevant_event_kind(&kind), "{kind:?} should trigger a pass");
        }

        let ignored = [
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::WriteTime)),
            EventKind::Access(AccessKind::Any),
            EventKind::Other,
            EventKind::Any,
        ];
        for kind in ignored {
            assert!(!is_relevant_event_kind(&kind), "{kind:?} should be ignored");
        }
    }
}
