//! The exam command surface: one owner for the session and its timer.

use tokio::sync::mpsc;
use tracing::debug;

use exam_core::category::CategoryConfig;
use exam_core::model::Question;
use exam_core::session::{
    AdvanceOutcome, ExamSession, FailPolicy, SessionError, SessionStatus, SubmitOutcome,
    TickOutcome,
};

use crate::timer::TimerTask;
use crate::view::ExamSnapshot;

/// Presentation-adjacent knobs applied to every session the flow starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControllerSettings {
    /// What a raised fail signal does to the session (open question upstream;
    /// resolved here as a policy the caller picks).
    pub fail_policy: FailPolicy,
    /// Move forward automatically after a recorded non-final answer. The
    /// original delays this for an animation; the delay is a view concern.
    pub auto_advance: bool,
}

/// Owns one live exam: the session state machine, the tick channel, and the
/// timer task.
///
/// Every command takes `&mut self`, so commands and tick handling are
/// serialized by ownership: no command observes a half-applied mutation.
/// Pending ticks are drained into the session at the top of each command, and
/// the timer is held only while the session is `Active` (acquired on start
/// and restart, released on terminate, finalize, expiry, and drop).
#[derive(Debug)]
pub struct ExamController {
    session: ExamSession,
    settings: ControllerSettings,
    ticks: mpsc::UnboundedReceiver<()>,
    timer: Option<TimerTask>,
}

impl ExamController {
    /// Start a controller over a freshly built pool. Must be called on a
    /// tokio runtime; the timer task starts immediately.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` for an empty pool.
    pub fn new(
        pool: Vec<Question>,
        config: CategoryConfig,
        settings: ControllerSettings,
    ) -> Result<Self, SessionError> {
        let session = ExamSession::new(pool, config)?.with_fail_policy(settings.fail_policy);
        let (tx, rx) = mpsc::unbounded_channel();
        Ok(Self {
            session,
            settings,
            ticks: rx,
            timer: Some(TimerTask::spawn(tx)),
        })
    }

    #[must_use]
    pub fn session(&self) -> &ExamSession {
        &self.session
    }

    /// Apply any pending timer ticks and rebuild the read-only snapshot.
    #[must_use]
    pub fn snapshot(&mut self) -> ExamSnapshot {
        self.drain_ticks();
        ExamSnapshot::of(&self.session)
    }

    /// Apply any pending timer ticks without building a snapshot.
    ///
    /// Every command drains ticks on entry, so calling this is only needed to
    /// let the clock catch up between commands.
    pub fn pump(&mut self) {
        self.drain_ticks();
    }

    // ─── Commands ──────────────────────────────────────────────────────────

    /// Record an answer for the current question.
    ///
    /// With `auto_advance` enabled, a recorded answer that is not on the last
    /// question also moves the index forward.
    ///
    /// # Errors
    ///
    /// Propagates `SessionError` from the session.
    pub fn submit_answer(&mut self, option: &str) -> Result<SubmitOutcome, SessionError> {
        self.drain_ticks();
        let outcome = self.session.submit_answer(option)?;

        if self.settings.auto_advance
            && matches!(outcome, SubmitOutcome::Recorded { .. })
            && self.session.is_active()
            && self.session.current_index() + 1 < self.session.total()
        {
            self.session.advance()?;
        }

        self.sync_timer();
        Ok(outcome)
    }

    /// # Errors
    ///
    /// Propagates `SessionError`, including `Incomplete` from the final-index
    /// finalize.
    pub fn advance(&mut self) -> Result<AdvanceOutcome, SessionError> {
        self.drain_ticks();
        let outcome = self.session.advance();
        self.sync_timer();
        outcome
    }

    /// # Errors
    ///
    /// Propagates `SessionError::NotActive`.
    pub fn retreat(&mut self) -> Result<bool, SessionError> {
        self.drain_ticks();
        self.session.retreat()
    }

    /// # Errors
    ///
    /// Propagates `SessionError::DeferPending` and `SessionError::NotActive`.
    pub fn begin_defer(&mut self) -> Result<(), SessionError> {
        self.drain_ticks();
        self.session.begin_defer()
    }

    /// # Errors
    ///
    /// Propagates `SessionError::NoDeferPending` and `SessionError::NotActive`.
    pub fn complete_defer(&mut self) -> Result<(), SessionError> {
        self.drain_ticks();
        self.session.complete_defer()
    }

    /// Defer without a visible transition window.
    ///
    /// # Errors
    ///
    /// Propagates the errors of both defer phases.
    pub fn defer(&mut self) -> Result<(), SessionError> {
        self.drain_ticks();
        self.session.defer()
    }

    /// # Errors
    ///
    /// Propagates `SessionError::NotActive`.
    pub fn terminate(&mut self) -> Result<(), SessionError> {
        self.drain_ticks();
        let result = self.session.terminate();
        self.sync_timer();
        debug!("exam terminated");
        result
    }

    /// # Errors
    ///
    /// Propagates `SessionError::Incomplete` and `SessionError::NotActive`.
    pub fn finalize(&mut self) -> Result<bool, SessionError> {
        self.drain_ticks();
        let result = self.session.finalize();
        self.sync_timer();
        if let Ok(passed) = result {
            debug!(passed, "exam finalized");
        }
        result
    }

    /// Restart over the same question order, with a fresh timer.
    ///
    /// The old timer and its channel are replaced before the new one starts,
    /// so ticks from the previous run can never reach the new session.
    pub fn restart_same(&mut self) {
        self.session.restart_same();
        self.acquire_timer();
    }

    // ─── Timer plumbing ────────────────────────────────────────────────────

    fn drain_ticks(&mut self) {
        while self.ticks.try_recv().is_ok() {
            if self.session.tick() == TickOutcome::Expired {
                // The clock is clamped at the limit; stop ticking past it.
                self.release_timer();
            }
        }
    }

    fn acquire_timer(&mut self) {
        self.release_timer();
        let (tx, rx) = mpsc::unbounded_channel();
        self.ticks = rx;
        self.timer = Some(TimerTask::spawn(tx));
    }

    fn release_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop();
        }
    }

    fn sync_timer(&mut self) {
        if self.session.status() != SessionStatus::Active {
            self.release_timer();
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
