//! Briefing request lifecycle — the single authoritative state slot.
//!
//! One controller instance owns the `BriefingState` for the currently
//! selected patient. All writes happen through its transition methods;
//! observers take snapshots. Every `start()` captures an epoch token,
//! and the spawned request task re-checks that token (and the target
//! patient) under the lock before applying its outcome, so a response
//! that resolves after a cancel, reset, or patient switch is discarded
//! instead of overwriting the state of a patient no longer selected.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::client::{ApiError, BriefingApi};
use crate::config::ViewerConfig;
use crate::models::PatientBriefing;

use super::progress::ProgressSimulator;

// ═══════════════════════════════════════════════════════════
// State
// ═══════════════════════════════════════════════════════════

/// State of the briefing request for the selected patient. Exactly one
/// variant is active at a time; there are no terminal states.
#[derive(Debug, Clone)]
pub enum BriefingState {
    /// No attempt yet, or reset after navigation.
    Idle,
    Pending {
        started_at: DateTime<Utc>,
    },
    Succeeded {
        briefing: PatientBriefing,
        completed_at: DateTime<Utc>,
    },
    Failed {
        error: ApiError,
    },
}

impl BriefingState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Short tag for logs.
    fn tag(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pending { .. } => "pending",
            Self::Succeeded { .. } => "succeeded",
            Self::Failed { .. } => "failed",
        }
    }
}

struct Inner {
    state: BriefingState,
    /// Currently selected patient; None until one is chosen.
    target: Option<i64>,
    /// Bumped on every start/cancel/reset; a resolving task whose
    /// captured epoch no longer matches discards its result.
    epoch: u64,
    /// Monotonic start instant of the pending request, for progress.
    started: Option<Instant>,
    task: Option<JoinHandle<()>>,
}

// ═══════════════════════════════════════════════════════════
// Controller
// ═══════════════════════════════════════════════════════════

/// Owner of the briefing request state for one viewer session.
pub struct BriefingLifecycle<C: BriefingApi + Send + Sync + 'static> {
    client: Arc<C>,
    timeout: Duration,
    session: Uuid,
    inner: Arc<Mutex<Inner>>,
}

impl<C: BriefingApi + Send + Sync + 'static> BriefingLifecycle<C> {
    pub fn new(client: C, config: &ViewerConfig) -> Self {
        Self {
            client: Arc::new(client),
            timeout: Duration::from_millis(config.request_timeout_ms),
            session: Uuid::new_v4(),
            inner: Arc::new(Mutex::new(Inner {
                state: BriefingState::Idle,
                target: None,
                epoch: 0,
                started: None,
                task: None,
            })),
        }
    }

    pub fn session(&self) -> Uuid {
        self.session
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> BriefingState {
        self.lock().state.clone()
    }

    pub fn selected_patient(&self) -> Option<i64> {
        self.lock().target
    }

    /// Elapsed time of the pending request, if one is in flight.
    pub fn elapsed(&self) -> Option<Duration> {
        let inner = self.lock();
        match inner.state {
            BriefingState::Pending { .. } => inner.started.map(|s| s.elapsed()),
            _ => None,
        }
    }

    /// Simulated progress for the pending request: phase index and
    /// status message. None when no request is in flight.
    pub fn progress(&self, sim: &ProgressSimulator) -> Option<(usize, &'static str)> {
        let elapsed = self.elapsed()?;
        Some((sim.phase_at(elapsed), sim.message_at(elapsed)))
    }

    /// Switch the selected patient. Changing patients unconditionally
    /// resets to Idle and invalidates any in-flight request; reselecting
    /// the current patient is a no-op.
    pub fn select_patient(&self, patient_id: i64) {
        let mut inner = self.lock();
        if inner.target == Some(patient_id) {
            return;
        }
        tracing::info!(session = %self.session, patient_id, "patient selected");
        inner.target = Some(patient_id);
        Self::invalidate(&mut inner);
    }

    /// Begin briefing generation for `patient_id`.
    ///
    /// No-op if a request for the same patient is already pending.
    /// Starting for a different patient is treated as navigation: the
    /// controller retargets and the old request's result is discarded.
    pub fn start(&self, patient_id: i64) {
        let (epoch, client) = {
            let mut inner = self.lock();
            if inner.state.is_pending() && inner.target == Some(patient_id) {
                tracing::debug!(patient_id, "start ignored: already pending");
                return;
            }
            inner.target = Some(patient_id);
            Self::invalidate(&mut inner);
            inner.state = BriefingState::Pending {
                started_at: Utc::now(),
            };
            inner.started = Some(Instant::now());
            tracing::info!(session = %self.session, patient_id, "briefing generation started");
            (inner.epoch, Arc::clone(&self.client))
        };

        let inner_ref = Arc::clone(&self.inner);
        let timeout = self.timeout;
        let session = self.session;
        let task = tokio::spawn(async move {
            let outcome = match tokio::time::timeout(timeout, client.generate_briefing(patient_id))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(ApiError::Timeout {
                    timeout_ms: timeout.as_millis() as u64,
                }),
            };

            let mut inner = inner_ref.lock().unwrap_or_else(PoisonError::into_inner);
            if inner.epoch != epoch || inner.target != Some(patient_id) {
                tracing::debug!(
                    session = %session,
                    patient_id,
                    "stale briefing resolution discarded"
                );
                return;
            }
            inner.started = None;
            inner.state = match outcome {
                Ok(briefing) => {
                    tracing::info!(session = %session, patient_id, "briefing generation succeeded");
                    BriefingState::Succeeded {
                        briefing,
                        completed_at: Utc::now(),
                    }
                }
                Err(error) => {
                    tracing::warn!(
                        session = %session,
                        patient_id,
                        error = %error,
                        "briefing generation failed"
                    );
                    BriefingState::Failed { error }
                }
            };
        });
        self.lock().task = Some(task);
    }

    /// Cancel the pending request. State flips to Idle synchronously;
    /// the underlying call is abandoned. No-op unless Pending.
    pub fn cancel(&self) {
        let mut inner = self.lock();
        if !inner.state.is_pending() {
            return;
        }
        tracing::info!(session = %self.session, "briefing generation cancelled");
        Self::invalidate(&mut inner);
        inner.state = BriefingState::Idle;
    }

    /// Start again after a failure. No-op from any other state.
    pub fn retry(&self) {
        let target = {
            let inner = self.lock();
            if !inner.state.is_failed() {
                return;
            }
            inner.target
        };
        if let Some(patient_id) = target {
            tracing::info!(session = %self.session, patient_id, "retrying briefing generation");
            self.start(patient_id);
        }
    }

    /// Force Idle from any state, discarding any in-flight request.
    pub fn reset(&self) {
        let mut inner = self.lock();
        if !inner.state.is_idle() {
            tracing::debug!(session = %self.session, from = inner.state.tag(), "state reset");
        }
        Self::invalidate(&mut inner);
        inner.state = BriefingState::Idle;
    }

    // ── Internal ────────────────────────────────────────

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Invalidate any outstanding request: bump the epoch so a late
    /// resolution is discarded, and abort its task.
    fn invalidate(inner: &mut Inner) {
        inner.epoch += 1;
        inner.started = None;
        if let Some(task) = inner.task.take() {
            task.abort();
        }
    }
}

impl<C: BriefingApi + Send + Sync + 'static> Drop for BriefingLifecycle<C> {
    fn drop(&mut self) {
        let mut inner = self.lock();
        Self::invalidate(&mut inner);
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::models::BriefingSummary;

    fn test_briefing(patient_id: i64) -> PatientBriefing {
        PatientBriefing {
            flags: vec![],
            summary: BriefingSummary {
                one_liner: format!("patient {patient_id}"),
                key_conditions: vec![],
                relevant_history: String::new(),
            },
            suggested_actions: vec![],
            generated_at: Utc::now(),
        }
    }

    /// Scripted API: every call sleeps `delay`, then pops the next
    /// scripted result (default: success echoing the patient id).
    struct ScriptedApi {
        delay: Duration,
        script: Mutex<VecDeque<Result<PatientBriefing, ApiError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedApi {
        fn with_delay(delay: Duration) -> Self {
            Self {
                delay,
                script: Mutex::new(VecDeque::new()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing_once(delay: Duration, error: ApiError) -> Self {
            let api = Self::with_delay(delay);
            api.script.lock().unwrap().push_back(Err(error));
            api
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl BriefingApi for ScriptedApi {
        async fn generate_briefing(&self, patient_id: i64) -> Result<PatientBriefing, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            match self.script.lock().unwrap().pop_front() {
                Some(result) => result,
                None => Ok(test_briefing(patient_id)),
            }
        }

        async fn get_patients(&self) -> Result<Vec<crate::models::Patient>, ApiError> {
            Ok(vec![])
        }

        async fn get_patient(&self, _patient_id: i64) -> Result<crate::models::Patient, ApiError> {
            Err(ApiError::Network("not scripted".into()))
        }
    }

    fn lifecycle(delay_secs: u64) -> BriefingLifecycle<ScriptedApi> {
        BriefingLifecycle::new(
            ScriptedApi::with_delay(Duration::from_secs(delay_secs)),
            &ViewerConfig::default(),
        )
    }

    /// Let the spawned request task reach its sleep.
    async fn settle() {
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
    }

    // ── start ───────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn start_transitions_to_pending_then_succeeded() {
        let lc = lifecycle(30);
        lc.start(1);
        settle().await;
        assert!(lc.state().is_pending());

        tokio::time::sleep(Duration::from_secs(31)).await;
        match lc.state() {
            BriefingState::Succeeded { briefing, .. } => {
                assert_eq!(briefing.summary.one_liner, "patient 1");
            }
            other => panic!("expected Succeeded, got {}", other.tag()),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn start_while_pending_same_patient_is_noop() {
        let lc = lifecycle(30);
        lc.start(1);
        settle().await;
        lc.start(1);
        settle().await;
        assert_eq!(lc.client.calls(), 1, "duplicate start issued a second call");

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(lc.state().is_succeeded());
        assert_eq!(lc.client.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn start_for_another_patient_retargets() {
        let lc = lifecycle(30);
        lc.start(1);
        settle().await;
        lc.start(2);
        settle().await;
        assert_eq!(lc.selected_patient(), Some(2));

        tokio::time::sleep(Duration::from_secs(31)).await;
        match lc.state() {
            BriefingState::Succeeded { briefing, .. } => {
                assert_eq!(briefing.summary.one_liner, "patient 2");
            }
            other => panic!("expected Succeeded for patient 2, got {}", other.tag()),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn regenerate_is_a_fresh_start_from_succeeded() {
        let lc = lifecycle(10);
        lc.start(1);
        tokio::time::sleep(Duration::from_secs(11)).await;
        assert!(lc.state().is_succeeded());

        lc.start(1);
        settle().await;
        assert!(lc.state().is_pending());
        tokio::time::sleep(Duration::from_secs(11)).await;
        assert!(lc.state().is_succeeded());
        assert_eq!(lc.client.calls(), 2);
    }

    // ── stale responses ─────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn late_success_after_patient_switch_is_discarded() {
        let lc = lifecycle(30);
        lc.start(1);
        settle().await;

        // Navigation to patient 2: reset, no new request yet.
        lc.select_patient(2);
        assert!(lc.state().is_idle());

        // Whatever becomes of patient 1's request, it must not apply.
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(lc.state().is_idle(), "stale response overwrote state");
    }

    #[tokio::test(start_paused = true)]
    async fn late_response_after_reset_is_discarded() {
        let lc = lifecycle(30);
        lc.start(1);
        settle().await;
        lc.reset();
        assert!(lc.state().is_idle());

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(lc.state().is_idle());
    }

    // ── cancel ──────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn cancel_flips_to_idle_synchronously() {
        let lc = lifecycle(30);
        lc.start(1);
        settle().await;
        lc.cancel();
        assert!(lc.state().is_idle());

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(lc.state().is_idle(), "cancelled request still applied");
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_outside_pending_is_noop() {
        let lc = lifecycle(5);
        lc.cancel();
        assert!(lc.state().is_idle());

        lc.start(1);
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(lc.state().is_succeeded());
        lc.cancel();
        assert!(lc.state().is_succeeded(), "cancel clobbered a completed briefing");
    }

    // ── retry ───────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn retry_from_failed_starts_again() {
        let api = ScriptedApi::failing_once(
            Duration::from_secs(5),
            ApiError::Server {
                status: 429,
                code: "RATE_LIMIT".into(),
                message: "Too many requests".into(),
                details: None,
            },
        );
        let lc = BriefingLifecycle::new(api, &ViewerConfig::default());

        lc.start(1);
        tokio::time::sleep(Duration::from_secs(6)).await;
        match lc.state() {
            BriefingState::Failed { error } => {
                assert_eq!(error.user_message(), "Too many requests");
            }
            other => panic!("expected Failed, got {}", other.tag()),
        }

        lc.retry();
        settle().await;
        assert!(lc.state().is_pending());
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(lc.state().is_succeeded());
        assert_eq!(lc.client.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_outside_failed_is_noop() {
        let lc = lifecycle(5);
        lc.retry();
        assert!(lc.state().is_idle());
        assert_eq!(lc.client.calls(), 0);

        lc.start(1);
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(lc.state().is_succeeded());
        lc.retry();
        settle().await;
        assert!(lc.state().is_succeeded(), "retry restarted from Succeeded");
        assert_eq!(lc.client.calls(), 1);
    }

    // ── timeout ─────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn deadline_elapsing_fails_with_timeout() {
        // Server slower than the 120s deadline.
        let lc = lifecycle(400);
        lc.start(1);
        tokio::time::sleep(Duration::from_secs(121)).await;
        match lc.state() {
            BriefingState::Failed { error } => {
                assert!(error.is_timeout(), "expected Timeout, got {error:?}");
            }
            other => panic!("expected Failed, got {}", other.tag()),
        }
    }

    // ── selection / reset ───────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn reselecting_same_patient_keeps_state() {
        let lc = lifecycle(5);
        lc.start(1);
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(lc.state().is_succeeded());

        lc.select_patient(1);
        assert!(lc.state().is_succeeded(), "same-patient reselect reset state");
    }

    #[tokio::test(start_paused = true)]
    async fn switching_patient_resets_from_any_state() {
        let lc = lifecycle(5);
        lc.start(1);
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(lc.state().is_succeeded());

        lc.select_patient(2);
        assert!(lc.state().is_idle());
        assert_eq!(lc.selected_patient(), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn reset_forces_idle_from_failed() {
        let api = ScriptedApi::failing_once(
            Duration::from_secs(1),
            ApiError::Network("down".into()),
        );
        let lc = BriefingLifecycle::new(api, &ViewerConfig::default());
        lc.start(1);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(lc.state().is_failed());

        lc.reset();
        assert!(lc.state().is_idle());
    }

    // ── progress wiring ─────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn progress_reported_only_while_pending() {
        let lc = lifecycle(30);
        let sim = ProgressSimulator::default();
        assert!(lc.progress(&sim).is_none());

        lc.start(1);
        settle().await;
        let (phase, message) = lc.progress(&sim).expect("pending request has progress");
        assert_eq!(phase, 0);
        assert_eq!(message, "Reviewing patient record...");

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(lc.progress(&sim).is_none(), "progress after resolution");
    }

    #[tokio::test(start_paused = true)]
    async fn elapsed_is_none_when_idle() {
        let lc = lifecycle(5);
        assert!(lc.elapsed().is_none());
        lc.start(1);
        settle().await;
        assert!(lc.elapsed().is_some());
    }
}
