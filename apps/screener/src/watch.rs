//! Analysis status watcher.
//!
//! Observes one resume through its `pending → processing → completed|failed`
//! lifecycle: an explicit initial load, then silent re-fetches on a fixed
//! interval until a terminal status is seen. The watcher never causes a
//! transition, it only renders what the backend reports.
//!
//! Failure policy: an error on the initial load is returned to the caller and
//! polling does not start; an error during a silent poll is logged and the
//! loop keeps going.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::client::ApiClient;
use crate::errors::ApiError;
use crate::models::resume::ResumeDetail;
use crate::render::render_analysis;

/// Where resume state comes from. `ApiClient` is the production source; tests
/// script their own.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch(&self, resume_id: i64) -> Result<ResumeDetail, ApiError>;
}

#[async_trait]
impl StatusSource for ApiClient {
    async fn fetch(&self, resume_id: i64) -> Result<ResumeDetail, ApiError> {
        self.resume(resume_id).await
    }
}

/// Receives each rendered view. Implementations must not block.
pub trait ViewSink: Send + Sync {
    fn apply(&self, detail: &ResumeDetail, html: &str);
}

struct Shared {
    source: Arc<dyn StatusSource>,
    sink: Arc<dyn ViewSink>,
    /// Bumped on every `start`. Results carrying an older generation are
    /// discarded so a restarted watcher never renders a stale fetch.
    generation: AtomicU64,
}

impl Shared {
    fn render_if_current(&self, generation: u64, detail: &ResumeDetail) {
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(resume_id = detail.id, "Discarding stale render");
            return;
        }
        let html = render_analysis(detail);
        self.sink.apply(detail, &html);
    }
}

struct PollTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// One watcher instance owns at most one polling task and nothing else
/// mutates it.
pub struct AnalysisWatcher {
    shared: Arc<Shared>,
    period: Duration,
    task: Mutex<Option<PollTask>>,
}

impl AnalysisWatcher {
    pub fn new(
        source: Arc<dyn StatusSource>,
        sink: Arc<dyn ViewSink>,
        period: Duration,
    ) -> Self {
        AnalysisWatcher {
            shared: Arc::new(Shared {
                source,
                sink,
                generation: AtomicU64::new(0),
            }),
            period,
            task: Mutex::new(None),
        }
    }

    /// Fetches the resume once and renders it. A failure here surfaces to the
    /// caller and nothing is scheduled. On success, a background task keeps
    /// re-fetching silently until the status is terminal. Calling `start`
    /// while already polling replaces the running task.
    pub async fn start(&self, resume_id: i64) -> Result<ResumeDetail, ApiError> {
        self.stop();
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let detail = self.shared.source.fetch(resume_id).await?;
        self.shared.render_if_current(generation, &detail);

        if !detail.status.is_terminal() {
            let cancel = CancellationToken::new();
            let handle = tokio::spawn(poll_loop(
                self.shared.clone(),
                resume_id,
                self.period,
                cancel.clone(),
                generation,
            ));
            *self.lock_task() = Some(PollTask { cancel, handle });
        }

        Ok(detail)
    }

    /// Cancels the polling task, if any. Idempotent; safe when not running.
    /// A fetch already in flight is abandoned without rendering.
    pub fn stop(&self) {
        if let Some(task) = self.lock_task().take() {
            task.cancel.cancel();
        }
    }

    /// True while a polling task is scheduled and has not exited.
    pub fn is_polling(&self) -> bool {
        self.lock_task()
            .as_ref()
            .map(|task| !task.handle.is_finished())
            .unwrap_or(false)
    }

    /// Waits for the current polling task to finish (terminal status or
    /// cancellation). Returns immediately when nothing is running.
    pub async fn join(&self) {
        let task = self.lock_task().take();
        if let Some(task) = task {
            let _ = task.handle.await;
        }
    }

    fn lock_task(&self) -> MutexGuard<'_, Option<PollTask>> {
        // Recover from poisoning; the Option inside is always consistent.
        self.task.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for AnalysisWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_loop(
    shared: Arc<Shared>,
    resume_id: i64,
    period: Duration,
    cancel: CancellationToken,
    generation: u64,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(resume_id, "Polling cancelled");
                return;
            }
            _ = tokio::time::sleep(period) => {}
        }

        let fetched = tokio::select! {
            // stop() landed while the request was in flight; its result must
            // not render.
            _ = cancel.cancelled() => {
                debug!(resume_id, "Polling cancelled mid-fetch");
                return;
            }
            result = shared.source.fetch(resume_id) => result,
        };

        match fetched {
            Ok(detail) => {
                let terminal = detail.status.is_terminal();
                shared.render_if_current(generation, &detail);
                if terminal {
                    debug!(resume_id, status = ?detail.status, "Terminal status reached, polling stopped");
                    return;
                }
            }
            Err(e) => {
                // Silent poll: log and keep going, the user was not asked.
                warn!(resume_id, error = %e, "Silent refresh failed, will retry");
            }
        }
    }
}

/// Collects rendered views in memory. Useful for tests and for callers that
/// want the latest HTML on demand.
#[derive(Default)]
pub struct MemorySink {
    latest: Mutex<Option<String>>,
}

impl MemorySink {
    pub fn latest(&self) -> Option<String> {
        self.latest.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl ViewSink for MemorySink {
    fn apply(&self, _detail: &ResumeDetail, html: &str) {
        *self.latest.lock().unwrap_or_else(|e| e.into_inner()) = Some(html.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::ResumeStatus;
    use std::collections::VecDeque;

    fn detail(status: ResumeStatus) -> ResumeDetail {
        ResumeDetail {
            id: 1,
            file_name: "ada.pdf".to_string(),
            status,
            overall_score: Some(85),
            ..Default::default()
        }
    }

    /// Yields scripted responses in order; repeats the last state as
    /// completed once the script runs out. `delay` simulates request latency.
    struct ScriptedSource {
        responses: Mutex<VecDeque<Result<ResumeDetail, ApiError>>>,
        delay: Duration,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<ResumeDetail, ApiError>>) -> Arc<Self> {
            Arc::new(ScriptedSource {
                responses: Mutex::new(responses.into()),
                delay: Duration::ZERO,
            })
        }

        fn with_delay(responses: Vec<Result<ResumeDetail, ApiError>>, delay: Duration) -> Arc<Self> {
            Arc::new(ScriptedSource {
                responses: Mutex::new(responses.into()),
                delay,
            })
        }
    }

    #[async_trait]
    impl StatusSource for ScriptedSource {
        async fn fetch(&self, _resume_id: i64) -> Result<ResumeDetail, ApiError> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(detail(ResumeStatus::Completed)))
        }
    }

    #[derive(Default)]
    struct CountingSink {
        statuses: Mutex<Vec<ResumeStatus>>,
    }

    impl CountingSink {
        fn statuses(&self) -> Vec<ResumeStatus> {
            self.statuses.lock().unwrap().clone()
        }
    }

    impl ViewSink for CountingSink {
        fn apply(&self, detail: &ResumeDetail, _html: &str) {
            self.statuses.lock().unwrap().push(detail.status);
        }
    }

    fn http_error() -> ApiError {
        ApiError::Http {
            status: 500,
            message: "server error".to_string(),
        }
    }

    const PERIOD: Duration = Duration::from_secs(3);

    #[tokio::test(start_paused = true)]
    async fn test_terminal_initial_state_does_not_start_polling() {
        let sink = Arc::new(CountingSink::default());
        let source = ScriptedSource::new(vec![Ok(detail(ResumeStatus::Completed))]);
        let watcher = AnalysisWatcher::new(source, sink.clone(), PERIOD);

        let initial = watcher.start(1).await.unwrap();
        assert_eq!(initial.status, ResumeStatus::Completed);
        assert!(!watcher.is_polling());
        assert_eq!(sink.statuses(), vec![ResumeStatus::Completed]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_until_terminal_then_stops() {
        let sink = Arc::new(CountingSink::default());
        let source = ScriptedSource::new(vec![
            Ok(detail(ResumeStatus::Pending)),
            Ok(detail(ResumeStatus::Processing)),
            Ok(detail(ResumeStatus::Completed)),
        ]);
        let watcher = AnalysisWatcher::new(source, sink.clone(), PERIOD);

        watcher.start(1).await.unwrap();
        assert!(watcher.is_polling());

        watcher.join().await;
        assert_eq!(
            sink.statuses(),
            vec![
                ResumeStatus::Pending,
                ResumeStatus::Processing,
                ResumeStatus::Completed
            ]
        );
        assert!(!watcher.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_status_is_terminal() {
        let sink = Arc::new(CountingSink::default());
        let source = ScriptedSource::new(vec![
            Ok(detail(ResumeStatus::Pending)),
            Ok(detail(ResumeStatus::Failed)),
        ]);
        let watcher = AnalysisWatcher::new(source, sink.clone(), PERIOD);

        watcher.start(1).await.unwrap();
        watcher.join().await;
        assert_eq!(
            sink.statuses(),
            vec![ResumeStatus::Pending, ResumeStatus::Failed]
        );
        assert!(!watcher.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_failure_surfaces_and_does_not_poll() {
        let sink = Arc::new(CountingSink::default());
        let source = ScriptedSource::new(vec![Err(http_error())]);
        let watcher = AnalysisWatcher::new(source, sink.clone(), PERIOD);

        let err = watcher.start(1).await.unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 500, .. }));
        assert!(!watcher.is_polling());
        assert!(sink.statuses().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_poll_failure_continues_polling() {
        let sink = Arc::new(CountingSink::default());
        let source = ScriptedSource::new(vec![
            Ok(detail(ResumeStatus::Pending)),
            Err(http_error()),
            Ok(detail(ResumeStatus::Completed)),
        ]);
        let watcher = AnalysisWatcher::new(source, sink.clone(), PERIOD);

        watcher.start(1).await.unwrap();
        watcher.join().await;
        // The failed tick renders nothing; the poll after it completes.
        assert_eq!(
            sink.statuses(),
            vec![ResumeStatus::Pending, ResumeStatus::Completed]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_twice_is_idempotent() {
        let sink = Arc::new(CountingSink::default());
        let source = ScriptedSource::new(vec![
            Ok(detail(ResumeStatus::Pending)),
            Ok(detail(ResumeStatus::Pending)),
            Ok(detail(ResumeStatus::Pending)),
        ]);
        let watcher = AnalysisWatcher::new(source, sink.clone(), PERIOD);

        watcher.start(1).await.unwrap();
        watcher.stop();
        watcher.stop();
        assert!(!watcher.is_polling());

        // No further renders arrive after cancellation.
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(sink.statuses(), vec![ResumeStatus::Pending]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_before_start_is_safe() {
        let sink = Arc::new(CountingSink::default());
        let source = ScriptedSource::new(vec![]);
        let watcher = AnalysisWatcher::new(source, sink, PERIOD);
        watcher.stop();
        assert!(!watcher.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_fetch_after_stop_does_not_render() {
        let sink = Arc::new(CountingSink::default());
        // Each fetch takes 5s; the first poll starts at t=3s and would land
        // at t=8s.
        let source = ScriptedSource::with_delay(
            vec![
                Ok(detail(ResumeStatus::Pending)),
                Ok(detail(ResumeStatus::Processing)),
            ],
            Duration::from_secs(5),
        );
        let watcher = AnalysisWatcher::new(source, sink.clone(), PERIOD);

        watcher.start(1).await.unwrap();
        assert_eq!(sink.statuses(), vec![ResumeStatus::Pending]);

        // Let the poll fetch get in flight, then cancel underneath it.
        tokio::time::sleep(Duration::from_secs(4)).await;
        watcher.stop();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(sink.statuses(), vec![ResumeStatus::Pending]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_discards_previous_generation() {
        let sink = Arc::new(CountingSink::default());
        let source = ScriptedSource::new(vec![
            Ok(detail(ResumeStatus::Pending)),
            Ok(detail(ResumeStatus::Pending)),
            Ok(detail(ResumeStatus::Processing)),
            Ok(detail(ResumeStatus::Completed)),
        ]);
        let watcher = AnalysisWatcher::new(source, sink.clone(), PERIOD);

        watcher.start(1).await.unwrap();
        // Restart against the same resource; the old task is cancelled and
        // only the new generation renders from here on.
        watcher.start(1).await.unwrap();
        assert!(watcher.is_polling());

        watcher.join().await;
        assert_eq!(
            sink.statuses(),
            vec![
                ResumeStatus::Pending,
                ResumeStatus::Pending,
                ResumeStatus::Processing,
                ResumeStatus::Completed
            ]
        );
        assert!(!watcher.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn test_memory_sink_keeps_latest_render() {
        let sink = Arc::new(MemorySink::default());
        let source = ScriptedSource::new(vec![Ok(detail(ResumeStatus::Completed))]);
        let watcher = AnalysisWatcher::new(source, sink.clone(), PERIOD);

        watcher.start(1).await.unwrap();
        let html = sink.latest().unwrap();
        assert!(html.contains("score-success"));
    }
}
