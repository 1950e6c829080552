use serde::Serialize;
use thiserror::Error;

use crate::category::CategoryConfig;
use crate::model::Question;
use crate::scoring::{self, ScoreCounts};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    Empty,

    #[error("session is no longer active")]
    NotActive,

    #[error("cannot finalize with {unanswered} unanswered question(s)")]
    Incomplete { unanswered: usize },

    #[error("a defer is already in progress")]
    DeferPending,

    #[error("no defer is in progress")]
    NoDeferPending,
}

//
// ─── SESSION TYPES ─────────────────────────────────────────────────────────────
//

/// Lifecycle state of a session. `Completed` and `Terminated` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionStatus {
    Active,
    Completed { passed: bool },
    Terminated,
}

/// Advisory fail notification layered on top of `Active`.
///
/// Raising one does not end the session by itself; under
/// `FailPolicy::Advisory` the user keeps interacting until they restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailSignal {
    TooManyWrong,
    TimedOut,
}

/// What happens when a fail signal is raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailPolicy {
    /// Keep the session active; the signal only informs the caller.
    #[default]
    Advisory,
    /// Terminate the session on the spot.
    HardStop,
}

/// Per-slot status for progress display, recomputed from live state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SlotStatus {
    Current,
    AnsweredCorrect,
    AnsweredWrong,
    Unanswered,
}

/// Outcome of `submit_answer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The option was recorded; `signal` carries a fail signal raised by this
    /// very submission, if any.
    Recorded {
        correct: bool,
        signal: Option<FailSignal>,
    },
    /// First answer wins; the repeat submission changed nothing.
    AlreadyAnswered,
}

/// Outcome of `advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    Moved,
    /// The current slot is unanswered, so the command was ignored.
    Stayed,
    /// Advancing past the last question finalized the exam.
    Finalized { passed: bool },
}

/// Outcome of a one-second `tick`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Advanced,
    /// The clock just reached the duration limit; fires at most once.
    Expired,
    /// Not active or already expired; nothing moved.
    Idle,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// The live state of one exam attempt.
///
/// Owns the question order, the index-aligned answer slots, the cached score
/// counters, and the one-second clock. Every mutation goes through a command
/// method, and `questions`/`answers` are only ever reordered together, so the
/// pairing invariant cannot break.
#[derive(Debug, Clone)]
pub struct ExamSession {
    config: CategoryConfig,
    policy: FailPolicy,
    /// Pool order as originally built, kept for restart-same.
    initial_order: Vec<Question>,
    questions: Vec<Question>,
    answers: Vec<Option<String>>,
    current: usize,
    elapsed_secs: u32,
    counts: ScoreCounts,
    status: SessionStatus,
    fail_signal: Option<FailSignal>,
    wrong_limit_raised: bool,
    time_limit_raised: bool,
    defer_pending: bool,
}

impl ExamSession {
    /// Start a fresh session over the given question order.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` when no questions are provided.
    pub fn new(questions: Vec<Question>, config: CategoryConfig) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }

        let answers = vec![None; questions.len()];
        Ok(Self {
            config,
            policy: FailPolicy::default(),
            initial_order: questions.clone(),
            questions,
            answers,
            current: 0,
            elapsed_secs: 0,
            counts: ScoreCounts::default(),
            status: SessionStatus::Active,
            fail_signal: None,
            wrong_limit_raised: false,
            time_limit_raised: false,
            defer_pending: false,
        })
    }

    /// Choose what a raised fail signal does to the session.
    #[must_use]
    pub fn with_fail_policy(mut self, policy: FailPolicy) -> Self {
        self.policy = policy;
        self
    }

    // ─── Accessors ─────────────────────────────────────────────────────────

    #[must_use]
    pub fn config(&self) -> &CategoryConfig {
        &self.config
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn fail_signal(&self) -> Option<FailSignal> {
        self.fail_signal
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &[Option<String>] {
        &self.answers
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.config.duration_secs().saturating_sub(self.elapsed_secs)
    }

    #[must_use]
    pub fn counts(&self) -> ScoreCounts {
        self.counts
    }

    #[must_use]
    pub fn defer_pending(&self) -> bool {
        self.defer_pending
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.status, SessionStatus::Active)
    }

    /// Rebuild the score counters from the answer slots.
    ///
    /// Must always agree with the incrementally maintained `counts`.
    #[must_use]
    pub fn recount(&self) -> ScoreCounts {
        ScoreCounts::recount(&self.questions, &self.answers)
    }

    /// Per-slot progress statuses, recomputed from live state on every call.
    ///
    /// Never cache this across commands: defer reorders questions and answers
    /// together and a stale copy would point at the wrong slots.
    #[must_use]
    pub fn review_index(&self) -> Vec<SlotStatus> {
        self.questions
            .iter()
            .zip(&self.answers)
            .enumerate()
            .map(|(i, (question, answer))| {
                if i == self.current {
                    SlotStatus::Current
                } else {
                    match answer {
                        Some(option) if question.is_correct(option) => SlotStatus::AnsweredCorrect,
                        Some(_) => SlotStatus::AnsweredWrong,
                        None => SlotStatus::Unanswered,
                    }
                }
            })
            .collect()
    }

    // ─── Commands ──────────────────────────────────────────────────────────

    /// Record an answer for the current question. First answer wins: a repeat
    /// submission is reported as `AlreadyAnswered` and changes nothing.
    ///
    /// The wrong-answer limit is edge-triggered: the signal rides on the
    /// submission that first reaches it and never fires again.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` outside the `Active` state.
    pub fn submit_answer(&mut self, option: &str) -> Result<SubmitOutcome, SessionError> {
        self.ensure_active()?;

        if self.answers[self.current].is_some() {
            return Ok(SubmitOutcome::AlreadyAnswered);
        }

        let correct = self.questions[self.current].is_correct(option);
        self.answers[self.current] = Some(option.to_string());

        let mut signal = None;
        if correct {
            self.counts.correct += 1;
        } else {
            self.counts.wrong += 1;
            if !self.wrong_limit_raised && self.counts.wrong >= self.config.wrong_answer_limit() {
                self.wrong_limit_raised = true;
                signal = Some(self.raise(FailSignal::TooManyWrong));
            }
        }

        Ok(SubmitOutcome::Recorded { correct, signal })
    }

    /// Move forward one question. Ignored while the current slot is
    /// unanswered; at the last index this is equivalent to `finalize`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` outside the `Active` state, and
    /// propagates `SessionError::Incomplete` from the final-index finalize.
    pub fn advance(&mut self) -> Result<AdvanceOutcome, SessionError> {
        self.ensure_active()?;

        if self.answers[self.current].is_none() {
            return Ok(AdvanceOutcome::Stayed);
        }

        if self.current + 1 < self.questions.len() {
            self.current += 1;
            Ok(AdvanceOutcome::Moved)
        } else {
            let passed = self.finalize()?;
            Ok(AdvanceOutcome::Finalized { passed })
        }
    }

    /// Move back to the nearest lower answered slot; no-op when none exists.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` outside the `Active` state.
    pub fn retreat(&mut self) -> Result<bool, SessionError> {
        self.ensure_active()?;

        let target = (0..self.current)
            .rev()
            .find(|&i| self.answers[i].is_some());
        if let Some(i) = target {
            self.current = i;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Open the defer window for the current question.
    ///
    /// Only one defer may be in flight at a time; the two-phase shape exists
    /// so a caller with a visible transition (an animation) can hold the
    /// window open while rejecting further defers.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::DeferPending` when a window is already open and
    /// `SessionError::NotActive` outside the `Active` state.
    pub fn begin_defer(&mut self) -> Result<(), SessionError> {
        self.ensure_active()?;
        if self.defer_pending {
            return Err(SessionError::DeferPending);
        }
        self.defer_pending = true;
        Ok(())
    }

    /// Close the defer window: move the current question and its paired
    /// answer slot to the end in one step.
    ///
    /// `current` wraps to 0 only when it was the last index before the move;
    /// otherwise it stays put and now denotes the question that followed the
    /// deferred one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoDeferPending` without a matching
    /// `begin_defer`, and `SessionError::NotActive` if the session left
    /// `Active` while the window was open (the window is consumed either way).
    pub fn complete_defer(&mut self) -> Result<(), SessionError> {
        if !self.defer_pending {
            return Err(SessionError::NoDeferPending);
        }
        self.defer_pending = false;
        self.ensure_active()?;

        let was_last = self.current + 1 == self.questions.len();
        let question = self.questions.remove(self.current);
        let answer = self.answers.remove(self.current);
        self.questions.push(question);
        self.answers.push(answer);

        if was_last {
            self.current = 0;
        }
        Ok(())
    }

    /// Defer without a visible window: `begin_defer` + `complete_defer`.
    ///
    /// # Errors
    ///
    /// Propagates the errors of both phases.
    pub fn defer(&mut self) -> Result<(), SessionError> {
        self.begin_defer()?;
        self.complete_defer()
    }

    /// End the session early. The confirmation step is a UI concern.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` outside the `Active` state.
    pub fn terminate(&mut self) -> Result<(), SessionError> {
        self.ensure_active()?;
        self.status = SessionStatus::Terminated;
        Ok(())
    }

    /// Compute the verdict and complete the session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Incomplete` while any slot is unanswered (with
    /// no state change) and `SessionError::NotActive` outside `Active`.
    pub fn finalize(&mut self) -> Result<bool, SessionError> {
        self.ensure_active()?;

        let unanswered = self.answers.iter().filter(|slot| slot.is_none()).count();
        if unanswered > 0 {
            return Err(SessionError::Incomplete { unanswered });
        }

        let passed = scoring::passes(self.counts.correct, self.questions.len());
        self.status = SessionStatus::Completed { passed };
        Ok(passed)
    }

    /// Start over with the same questions in their original pool order,
    /// resetting answers, counters, clock, and fail signals. Valid from any
    /// state, including terminal ones.
    pub fn restart_same(&mut self) {
        self.questions = self.initial_order.clone();
        self.answers = vec![None; self.questions.len()];
        self.current = 0;
        self.elapsed_secs = 0;
        self.counts = ScoreCounts::default();
        self.status = SessionStatus::Active;
        self.fail_signal = None;
        self.wrong_limit_raised = false;
        self.time_limit_raised = false;
        self.defer_pending = false;
    }

    /// Advance the clock by one second.
    ///
    /// Clamped to the duration limit: the tick that reaches it reports
    /// `Expired` and raises `TimedOut` exactly once; later ticks are `Idle`.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_active() || self.elapsed_secs >= self.config.duration_secs() {
            return TickOutcome::Idle;
        }

        self.elapsed_secs += 1;
        if self.elapsed_secs == self.config.duration_secs() {
            if !self.time_limit_raised {
                self.time_limit_raised = true;
                self.raise(FailSignal::TimedOut);
            }
            return TickOutcome::Expired;
        }
        TickOutcome::Advanced
    }

    // ─── Internals ─────────────────────────────────────────────────────────

    fn ensure_active(&self) -> Result<(), SessionError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(SessionError::NotActive)
        }
    }

    fn raise(&mut self, signal: FailSignal) -> FailSignal {
        // The first signal sticks; each kind is latched separately by the
        // caller, so a second kind can still be raised but not displayed over
        // the first.
        if self.fail_signal.is_none() {
            self.fail_signal = Some(signal);
        }
        if self.policy == FailPolicy::HardStop {
            self.status = SessionStatus::Terminated;
        }
        signal
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
