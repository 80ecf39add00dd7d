//! Submit, poll, reconcile. One tracker instance per job family; each
//! tracked id gets exactly one poll loop, and the backend snapshot always
//! replaces the local record wholesale.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use localagent_client::ApiError;
use localagent_types::JobStatus;
use tokio::sync::Mutex;

use crate::error::StateError;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

/// How a job family talks to its backend: start a job, fetch a snapshot,
/// request cancellation.
#[async_trait]
pub trait JobDriver: Send + Sync + 'static {
    type Request: Send + Sync;
    type Record: JobRecord;

    async fn start(&self, request: &Self::Request) -> Result<String, ApiError>;
    async fn status(&self, id: &str) -> Result<Self::Record, ApiError>;
    async fn cancel(&self, id: &str) -> Result<(), ApiError>;
}

/// A pollable job snapshot.
pub trait JobRecord: Clone + Send + Sync + 'static {
    fn id(&self) -> &str;
    fn status(&self) -> JobStatus;
    fn progress(&self) -> Option<f64>;

    /// The placeholder inserted at submission time: `pending`, progress 0.
    /// Replaced wholesale by the first successful poll.
    fn submitted(id: &str) -> Self;
}

#[derive(Debug, Clone)]
pub struct JobTrackerConfig {
    pub poll_interval: Duration,
    /// Extra polls after a poll failure before tracking halts. 0 keeps
    /// the halt-on-first-error behavior; each retry waits one interval
    /// longer than the last.
    pub poll_retry_limit: u32,
}

impl Default for JobTrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            poll_retry_limit: 0,
        }
    }
}

type TerminalHook<R> = Arc<dyn Fn(R) -> BoxFuture<'static, ()> + Send + Sync>;

pub struct JobTracker<D: JobDriver> {
    driver: Arc<D>,
    config: JobTrackerConfig,
    jobs: Arc<Mutex<HashMap<String, D::Record>>>,
    last_error: Arc<Mutex<Option<StateError>>>,
    on_terminal: Option<TerminalHook<D::Record>>,
}

impl<D: JobDriver> JobTracker<D> {
    pub fn new(driver: D, config: JobTrackerConfig) -> Self {
        Self {
            driver: Arc::new(driver),
            config,
            jobs: Arc::new(Mutex::new(HashMap::new())),
            last_error: Arc::new(Mutex::new(None)),
            on_terminal: None,
        }
    }

    /// Registers the side effect run once per job, with its final record.
    #[must_use]
    pub fn with_terminal_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(D::Record) -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        self.on_terminal = Some(Arc::new(hook));
        self
    }

    /// Starts a job and begins tracking it. The record shows `pending`
    /// with progress 0 until the first poll lands.
    pub async fn submit(&self, request: &D::Request) -> Result<String, StateError> {
        let id = self
            .driver
            .start(request)
            .await
            .map_err(StateError::submission)?;

        {
            let mut jobs = self.jobs.lock().await;
            if jobs.contains_key(&id) {
                // Already tracked; the existing loop keeps ownership.
                return Ok(id);
            }
            jobs.insert(id.clone(), D::Record::submitted(&id));
        }
        self.spawn_poll_loop(id.clone());
        Ok(id)
    }

    /// Cancels on the backend, then drops the local record. The in-flight
    /// poll loop observes the missing id and exits.
    pub async fn cancel(&self, id: &str) -> Result<(), StateError> {
        self.driver.cancel(id).await.map_err(StateError::action)?;
        self.jobs.lock().await.remove(id);
        Ok(())
    }

    /// Replaces a tracked record with an authoritative snapshot obtained
    /// outside the poll loop (pause/resume style actions return one).
    /// Untracked ids are ignored.
    pub async fn reconcile(&self, record: D::Record) {
        let mut jobs = self.jobs.lock().await;
        if let Some(slot) = jobs.get_mut(record.id()) {
            *slot = record;
        }
    }

    /// Drops every tracked record without contacting the backend. Poll
    /// loops observe the missing ids and exit on their next tick.
    pub async fn clear(&self) {
        self.jobs.lock().await.clear();
        *self.last_error.lock().await = None;
    }

    pub async fn job(&self, id: &str) -> Option<D::Record> {
        self.jobs.lock().await.get(id).cloned()
    }

    pub async fn jobs(&self) -> Vec<D::Record> {
        self.jobs.lock().await.values().cloned().collect()
    }

    pub async fn is_tracked(&self, id: &str) -> bool {
        self.jobs.lock().await.contains_key(id)
    }

    pub async fn last_error(&self) -> Option<StateError> {
        self.last_error.lock().await.clone()
    }

    fn spawn_poll_loop(&self, id: String) {
        let driver = Arc::clone(&self.driver);
        let jobs = Arc::clone(&self.jobs);
        let last_error = Arc::clone(&self.last_error);
        let on_terminal = self.on_terminal.clone();
        let interval = self.config.poll_interval;
        let retry_limit = self.config.poll_retry_limit;

        tokio::spawn(async move {
            let mut failures: u32 = 0;
            loop {
                tokio::time::sleep(interval * (failures + 1)).await;
                if !jobs.lock().await.contains_key(&id) {
                    return;
                }
                match driver.status(&id).await {
                    Ok(record) => {
                        failures = 0;
                        let mut guard = jobs.lock().await;
                        if !guard.contains_key(&id) {
                            // Cancelled while the fetch was in flight;
                            // the late response must not reinsert it.
                            return;
                        }
                        let terminal = record.status().is_terminal();
                        guard.insert(id.clone(), record.clone());
                        drop(guard);
                        if terminal {
                            if let Some(hook) = on_terminal.as_ref() {
                                hook(record).await;
                            }
                            return;
                        }
                    }
                    Err(error) => {
                        *last_error.lock().await = Some(StateError::poll(&id, &error));
                        if failures >= retry_limit {
                            tracing::warn!(id, error = %error, "job poll failed, tracking halted");
                            return;
                        }
                        failures += 1;
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    struct FakeJob {
        id: String,
        status: JobStatus,
        progress: Option<f64>,
        payload: Option<String>,
    }

    impl JobRecord for FakeJob {
        fn id(&self) -> &str {
            &self.id
        }
        fn status(&self) -> JobStatus {
            self.status
        }
        fn progress(&self) -> Option<f64> {
            self.progress
        }
        fn submitted(id: &str) -> Self {
            Self {
                id: id.to_string(),
                status: JobStatus::Pending,
                progress: Some(0.0),
                payload: None,
            }
        }
    }

    /// Scripted driver: plays back a fixed status sequence and counts
    /// every call.
    struct ScriptedDriver {
        start_result: Result<String, String>,
        statuses: Mutex<VecDeque<Result<FakeJob, String>>>,
        status_calls: AtomicUsize,
        cancel_calls: AtomicUsize,
    }

    impl ScriptedDriver {
        fn accepting(id: &str, statuses: Vec<Result<FakeJob, String>>) -> Self {
            Self {
                start_result: Ok(id.to_string()),
                statuses: Mutex::new(statuses.into_iter().collect()),
                status_calls: AtomicUsize::new(0),
                cancel_calls: AtomicUsize::new(0),
            }
        }

        fn rejecting(message: &str) -> Self {
            Self {
                start_result: Err(message.to_string()),
                statuses: Mutex::new(VecDeque::new()),
                status_calls: AtomicUsize::new(0),
                cancel_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl JobDriver for ScriptedDriver {
        type Request = ();
        type Record = FakeJob;

        async fn start(&self, _request: &()) -> Result<String, ApiError> {
            self.start_result
                .clone()
                .map_err(|message| ApiError::Request { message })
        }

        async fn status(&self, id: &str) -> Result<FakeJob, ApiError> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            match self.statuses.lock().await.pop_front() {
                Some(Ok(job)) => Ok(job),
                Some(Err(message)) => Err(ApiError::Request { message }),
                None => Ok(FakeJob {
                    id: id.to_string(),
                    status: JobStatus::Running,
                    progress: Some(0.5),
                    payload: None,
                }),
            }
        }

        async fn cancel(&self, _id: &str) -> Result<(), ApiError> {
            self.cancel_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn fast_config() -> JobTrackerConfig {
        JobTrackerConfig {
            poll_interval: Duration::from_millis(10),
            poll_retry_limit: 0,
        }
    }

    fn running(id: &str, progress: f64) -> FakeJob {
        FakeJob {
            id: id.to_string(),
            status: JobStatus::Running,
            progress: Some(progress),
            payload: None,
        }
    }

    fn completed(id: &str, payload: &str) -> FakeJob {
        FakeJob {
            id: id.to_string(),
            status: JobStatus::Completed,
            progress: Some(100.0),
            payload: Some(payload.to_string()),
        }
    }

    #[tokio::test]
    async fn submit_shows_pending_with_zero_progress_immediately() {
        let driver = ScriptedDriver::accepting("j1", vec![Ok(running("j1", 0.4))]);
        let tracker = JobTracker::new(driver, fast_config());

        let id = tracker.submit(&()).await.expect("submit");
        let job = tracker.job(&id).await.expect("tracked");
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.progress, Some(0.0));
    }

    #[tokio::test]
    async fn failed_submission_starts_no_polling() {
        let driver = ScriptedDriver::rejecting("backend down");
        let tracker = JobTracker::new(driver, fast_config());

        let result = tracker.submit(&()).await;
        assert!(matches!(result, Err(StateError::Submission { .. })));
        assert!(tracker.jobs().await.is_empty());
    }

    #[tokio::test]
    async fn pending_pending_completed_sequence_ends_with_payload() {
        let driver = ScriptedDriver::accepting(
            "j1",
            vec![
                Ok(FakeJob {
                    id: "j1".to_string(),
                    status: JobStatus::Pending,
                    progress: Some(0.0),
                    payload: None,
                }),
                Ok(FakeJob {
                    id: "j1".to_string(),
                    status: JobStatus::Pending,
                    progress: Some(0.0),
                    payload: None,
                }),
                Ok(completed("j1", "result.bin")),
            ],
        );
        let tracker = JobTracker::new(driver, fast_config());
        let calls = {
            let id = tracker.submit(&()).await.expect("submit");
            tokio::time::sleep(Duration::from_millis(120)).await;
            let job = tracker.job(&id).await.expect("tracked");
            assert_eq!(job.status, JobStatus::Completed);
            assert_eq!(job.payload.as_deref(), Some("result.bin"));
            tracker.driver.status_calls.load(Ordering::SeqCst)
        };
        // Terminal status must not schedule further polls.
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(tracker.driver.status_calls.load(Ordering::SeqCst), calls);
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn cancel_removes_the_job_and_late_polls_do_not_reinsert() {
        let driver = ScriptedDriver::accepting("j1", vec![Ok(running("j1", 0.2))]);
        let tracker = JobTracker::new(driver, fast_config());

        let id = tracker.submit(&()).await.expect("submit");
        tracker.cancel(&id).await.expect("cancel");
        assert!(!tracker.is_tracked(&id).await);
        assert_eq!(tracker.driver.cancel_calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(!tracker.is_tracked(&id).await);
    }

    #[tokio::test]
    async fn resubmitting_a_tracked_id_spawns_no_second_loop() {
        let driver = ScriptedDriver::accepting("j1", vec![]);
        let tracker = JobTracker::new(driver, fast_config());

        tracker.submit(&()).await.expect("first");
        tracker.submit(&()).await.expect("second");
        tokio::time::sleep(Duration::from_millis(35)).await;

        // One loop polling every 10ms, not two: after ~35ms the scripted
        // driver has seen about three status calls.
        let calls = tracker.driver.status_calls.load(Ordering::SeqCst);
        assert!((2..=4).contains(&calls), "unexpected call count {calls}");
    }

    #[tokio::test]
    async fn poll_failure_halts_tracking_by_default() {
        let driver = ScriptedDriver::accepting(
            "j1",
            vec![Err("boom".to_string()), Ok(completed("j1", "late"))],
        );
        let tracker = JobTracker::new(driver, fast_config());

        let id = tracker.submit(&()).await.expect("submit");
        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(tracker.driver.status_calls.load(Ordering::SeqCst), 1);
        let job = tracker.job(&id).await.expect("still tracked");
        assert_eq!(job.status, JobStatus::Pending);
        assert!(matches!(
            tracker.last_error().await,
            Some(StateError::Poll { .. })
        ));
    }

    #[tokio::test]
    async fn poll_retry_limit_resumes_after_transient_failures() {
        let driver = ScriptedDriver::accepting(
            "j1",
            vec![Err("transient".to_string()), Ok(completed("j1", "done"))],
        );
        let config = JobTrackerConfig {
            poll_interval: Duration::from_millis(10),
            poll_retry_limit: 2,
        };
        let tracker = JobTracker::new(driver, config);

        let id = tracker.submit(&()).await.expect("submit");
        tokio::time::sleep(Duration::from_millis(120)).await;

        let job = tracker.job(&id).await.expect("tracked");
        assert_eq!(job.status, JobStatus::Completed);
    }

    #[tokio::test]
    async fn terminal_hook_fires_once_with_the_final_record() {
        let driver = ScriptedDriver::accepting("j1", vec![Ok(completed("j1", "artifact"))]);
        let seen: Arc<Mutex<Vec<FakeJob>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let tracker = JobTracker::new(driver, fast_config()).with_terminal_hook(move |record| {
            let sink = Arc::clone(&sink);
            Box::pin(async move {
                sink.lock().await.push(record);
            })
        });

        tracker.submit(&()).await.expect("submit");
        tokio::time::sleep(Duration::from_millis(60)).await;

        let seen = seen.lock().await;
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].payload.as_deref(), Some("artifact"));
    }
}
