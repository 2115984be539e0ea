use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use parking_lot::ReentrantMutex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use quiz_core::Clock;
use quiz_core::model::{AnswerRecord, Question, SessionSnapshot, SessionStatus};
use quiz_core::scoring;
use storage::repository::KeyValueStore;

use super::config::QuizConfig;
use super::hooks::{Notification, SessionHooks};
use super::progress::SessionProgress;
use super::timer::TimerSlot;

//
// ─── REVIEW ────────────────────────────────────────────────────────────────────
//

/// A question paired with the answer recorded for it.
///
/// `question` is `None` when the record points past the current pool, which
/// can happen after restoring a snapshot into a resampled pool.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewItem {
    pub question: Option<Question>,
    pub answer: AnswerRecord,
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

pub(super) struct SessionState {
    rng: StdRng,
    pool: Vec<Question>,
    current: usize,
    total_score: f64,
    max_possible_score: f64,
    status: SessionStatus,
    history: Vec<AnswerRecord>,
    review_mode: bool,
    started_at: Option<i64>,
    question_timer: TimerSlot,
    total_timer: TimerSlot,
}

impl SessionState {
    fn new(config: &QuizConfig) -> Self {
        let rng = config
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        let mut state = Self {
            rng,
            pool: Vec::new(),
            current: 0,
            total_score: 0.0,
            max_possible_score: 0.0,
            status: SessionStatus::Idle,
            history: Vec::new(),
            review_mode: false,
            started_at: None,
            question_timer: TimerSlot::default(),
            total_timer: TimerSlot::default(),
        };
        state.rebuild_pool(config);
        state
    }

    fn rebuild_pool(&mut self, config: &QuizConfig) {
        self.pool = config.pool_builder().build(&mut self.rng);
        self.max_possible_score = scoring::max_possible_score(&self.pool);
    }

    fn cancel_timers(&mut self) {
        self.question_timer.cancel();
        self.total_timer.cancel();
    }

    fn clear_progress(&mut self) {
        self.current = 0;
        self.total_score = 0.0;
        self.history.clear();
        self.review_mode = false;
    }

    fn final_score(&self) -> u32 {
        scoring::final_score(self.total_score, self.max_possible_score)
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

struct Shared {
    config: QuizConfig,
    hooks: SessionHooks,
    store: Option<Arc<dyn KeyValueStore>>,
    clock: Clock,
    state: ReentrantMutex<RefCell<SessionState>>,
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.state.get_mut().get_mut().cancel_timers();
    }
}

/// Builds a [`QuizSession`] from a configuration plus optional collaborators.
pub struct QuizSessionBuilder {
    config: QuizConfig,
    hooks: SessionHooks,
    store: Option<Arc<dyn KeyValueStore>>,
    clock: Clock,
}

impl QuizSessionBuilder {
    #[must_use]
    pub fn new(config: QuizConfig) -> Self {
        Self {
            config,
            hooks: SessionHooks::default(),
            store: None,
            clock: Clock::default(),
        }
    }

    #[must_use]
    pub fn with_hooks(mut self, hooks: SessionHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Store used by `save_state`/`load_state`.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Build the session. The initial pool is sampled here.
    #[must_use]
    pub fn build(self) -> QuizSession {
        let state = SessionState::new(&self.config);
        debug!(questions = state.pool.len(), "quiz session constructed");
        QuizSession {
            shared: Arc::new(Shared {
                config: self.config,
                hooks: self.hooks,
                store: self.store,
                clock: self.clock,
                state: ReentrantMutex::new(RefCell::new(state)),
            }),
        }
    }
}

/// A timed, scored quiz session.
///
/// The handle is cheap to clone; clones share one session. Operations called
/// in the wrong state are ignored. Timers run as tokio tasks on the runtime
/// that was current when they were armed.
///
/// Hooks are invoked while the session lock is held but with no state borrowed,
/// so a hook may query or drive the session it was called from.
#[derive(Clone)]
pub struct QuizSession {
    shared: Arc<Shared>,
}

impl QuizSession {
    /// Session with no hooks, no store and the system clock.
    #[must_use]
    pub fn new(config: QuizConfig) -> Self {
        QuizSessionBuilder::new(config).build()
    }

    #[must_use]
    pub fn builder(config: QuizConfig) -> QuizSessionBuilder {
        QuizSessionBuilder::new(config)
    }

    #[must_use]
    pub fn config(&self) -> &QuizConfig {
        &self.shared.config
    }

    pub(super) fn store(&self) -> Option<&Arc<dyn KeyValueStore>> {
        self.shared.store.as_ref()
    }

    pub(super) fn clock(&self) -> Clock {
        self.shared.clock
    }

    fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        let guard = self.shared.state.lock();
        let state = guard.borrow();
        f(&state)
    }

    /// Deliver one notification. Callers must not hold a state borrow.
    fn notify(&self, notification: &Notification) {
        self.shared.hooks.emit(notification);
    }

    //
    // ─── OPERATIONS ────────────────────────────────────────────────────────────
    //

    /// Begin a fresh run: resample the pool, clear progress, notify, then arm
    /// timers.
    pub fn start(&self) {
        let guard = self.shared.state.lock();
        {
            let mut state = guard.borrow_mut();
            state.cancel_timers();
            state.status = SessionStatus::Started;
            state.clear_progress();
            state.rebuild_pool(&self.shared.config);
            state.started_at = Some(self.shared.clock.now_millis());
            state.status = if state.pool.is_empty() {
                SessionStatus::Completed
            } else {
                SessionStatus::InProgress
            };
            info!(
                questions = state.pool.len(),
                status = %state.status,
                "quiz session started"
            );
        }

        self.notify(&Notification::Started);
        self.notify(&Notification::QuestionChanged(0));

        // Armed even for an empty pool; the auto-skip is then a no-op.
        let mut state = guard.borrow_mut();
        self.arm_question_timer(&mut state);
        self.arm_total_timer(&mut state);
    }

    /// Answer the current question. `None`, or an index outside the question's
    /// choices, records a zero-score skip.
    pub fn submit_answer(&self, choice_index: Option<usize>) {
        let guard = self.shared.state.lock();
        self.apply_answer(&guard, choice_index);
    }

    /// Return to `idle` with a freshly sampled pool. No hooks fire.
    pub fn reset(&self) {
        let guard = self.shared.state.lock();
        let mut state = guard.borrow_mut();
        state.cancel_timers();
        state.status = SessionStatus::Idle;
        state.clear_progress();
        state.started_at = None;
        state.rebuild_pool(&self.shared.config);
        debug!("quiz session reset");
    }

    /// Switch to review mode. Only allowed once the session is completed.
    pub fn enter_review_mode(&self) {
        let guard = self.shared.state.lock();
        let mut state = guard.borrow_mut();
        if state.status != SessionStatus::Completed {
            debug!(status = %state.status, "review mode requested before completion; ignored");
            return;
        }
        state.review_mode = true;
    }

    /// Record an answer, notify, then advance. The caller holds the session
    /// lock; borrows are released around every hook.
    fn apply_answer(&self, cell: &RefCell<SessionState>, choice_index: Option<usize>) {
        let (choice, score) = {
            let mut state = cell.borrow_mut();
            if state.status != SessionStatus::InProgress {
                debug!(status = %state.status, "answer submitted outside a running session; ignored");
                return;
            }
            state.question_timer.cancel();

            let question_index = state.current;
            let choice = choice_index
                .and_then(|index| state.pool.get(question_index)?.choice(index))
                .cloned();
            let score = choice.as_ref().map_or(0.0, |c| c.score);

            state.total_score += score;
            state.history.push(AnswerRecord {
                question_index,
                choice_index,
                score,
            });
            debug!(question_index, ?choice_index, score, "answer recorded");
            (choice, score)
        };

        self.notify(&Notification::Answered { choice, score });

        let next = {
            let mut state = cell.borrow_mut();
            state.current += 1;
            if state.current < state.pool.len() {
                Some(state.current)
            } else {
                state.status = SessionStatus::Completed;
                state.total_timer.cancel();
                None
            }
        };

        match next {
            Some(index) => {
                self.notify(&Notification::QuestionChanged(index));
                self.arm_question_timer(&mut cell.borrow_mut());
            }
            None => {
                let final_score = cell.borrow().final_score();
                let bucket =
                    scoring::score_bucket(final_score, &self.shared.config.scoring_buckets)
                        .map(str::to_owned);
                info!(final_score, bucket = ?bucket, "quiz session completed");
                self.notify(&Notification::Completed {
                    final_score,
                    bucket,
                });
            }
        }
    }

    //
    // ─── TIMERS ────────────────────────────────────────────────────────────────
    //

    fn arm_question_timer(&self, state: &mut SessionState) {
        let Some(limit) = self.shared.config.question_time_limit() else {
            return;
        };
        let session = Arc::downgrade(&self.shared);
        state.question_timer.arm("question", limit, move |generation| {
            if let Some(shared) = session.upgrade() {
                QuizSession { shared }.expire_question(generation);
            }
        });
    }

    fn arm_total_timer(&self, state: &mut SessionState) {
        let Some(limit) = self.shared.config.session_time_limit() else {
            return;
        };
        let session = Arc::downgrade(&self.shared);
        state.total_timer.arm("total", limit, move |generation| {
            if let Some(shared) = session.upgrade() {
                QuizSession { shared }.expire_session(generation);
            }
        });
    }

    fn expire_question(&self, generation: u64) {
        let guard = self.shared.state.lock();
        let index = {
            let mut state = guard.borrow_mut();
            if !state.question_timer.claim(generation) {
                return;
            }
            state.current
        };
        debug!(index, "question time expired");
        self.notify(&Notification::TimeExpired(index));

        // The expiry hook may already have answered this question.
        let still_current = guard.borrow().current == index;
        if !still_current {
            debug!(index, "question advanced during expiry hook; auto-skip dropped");
            return;
        }
        self.apply_answer(&guard, None);
    }

    fn expire_session(&self, generation: u64) {
        let guard = self.shared.state.lock();
        {
            let mut state = guard.borrow_mut();
            if !state.total_timer.claim(generation) {
                return;
            }
            state.question_timer.cancel();
            state.status = SessionStatus::Completed;
            info!(
                answered = state.history.len(),
                "total time expired; quiz session completed"
            );
        }
        self.notify(&Notification::TotalTimeExpired);
    }

    //
    // ─── SNAPSHOTS ─────────────────────────────────────────────────────────────
    //

    pub(super) fn snapshot(&self, saved_at: i64) -> SessionSnapshot {
        self.read(|state| SessionSnapshot {
            current_question_index: state.current,
            review_mode: state.review_mode,
            total_score: state.total_score,
            status: state.status,
            answer_history: state.history.clone(),
            start_timestamp: state.started_at,
            saved_at,
        })
    }

    /// Overwrite progress from a snapshot, then resample the pool.
    ///
    /// Restored indices describe the pool that was live when the snapshot was
    /// taken. With shuffling or tag sampling enabled the rebuilt pool can
    /// differ, so indices may no longer line up with its questions.
    pub(super) fn restore(&self, snapshot: SessionSnapshot) {
        let config = &self.shared.config;
        let guard = self.shared.state.lock();
        let mut state = guard.borrow_mut();
        state.current = snapshot.current_question_index;
        state.total_score = snapshot.total_score;
        state.status = snapshot.status;
        state.history = snapshot.answer_history;
        state.review_mode = snapshot.review_mode;
        state.started_at = snapshot.start_timestamp;
        state.rebuild_pool(config);

        if config.resamples_pool() {
            warn!("restored session into a resampled pool; question indices may not match");
        }
        if state.current > state.pool.len() || state.history.len() != state.current {
            warn!(
                current = state.current,
                answered = state.history.len(),
                pool = state.pool.len(),
                "restored session indices are inconsistent with the rebuilt pool"
            );
        }
        info!(
            current = state.current,
            status = %state.status,
            "quiz session restored"
        );
    }

    //
    // ─── QUERIES ───────────────────────────────────────────────────────────────
    //

    /// The question at the current index, if the index is inside the pool.
    #[must_use]
    pub fn current_question(&self) -> Option<Question> {
        self.read(|state| state.pool.get(state.current).cloned())
    }

    /// The active pool, in presentation order.
    #[must_use]
    pub fn questions(&self) -> Vec<Question> {
        self.read(|state| state.pool.clone())
    }

    #[must_use]
    pub fn total_score(&self) -> f64 {
        self.read(|state| state.total_score)
    }

    #[must_use]
    pub fn max_possible_score(&self) -> f64 {
        self.read(|state| state.max_possible_score)
    }

    /// Normalized score in `0..=100`.
    #[must_use]
    pub fn final_score(&self) -> u32 {
        self.read(SessionState::final_score)
    }

    /// Label of the first configured bucket containing the final score.
    #[must_use]
    pub fn score_bucket(&self) -> Option<String> {
        let final_score = self.final_score();
        scoring::score_bucket(final_score, &self.shared.config.scoring_buckets).map(str::to_owned)
    }

    /// Index of the current question.
    #[must_use]
    pub fn step(&self) -> usize {
        self.read(|state| state.current)
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.read(|state| state.status)
    }

    #[must_use]
    pub fn answer_history(&self) -> Vec<AnswerRecord> {
        self.read(|state| state.history.clone())
    }

    #[must_use]
    pub fn is_in_review_mode(&self) -> bool {
        self.read(|state| state.review_mode)
    }

    /// Questions paired with their answers, in answer order. Empty unless in
    /// review mode.
    #[must_use]
    pub fn review_data(&self) -> Vec<ReviewItem> {
        self.read(|state| {
            if !state.review_mode {
                return Vec::new();
            }
            state
                .history
                .iter()
                .map(|answer| ReviewItem {
                    question: state.pool.get(answer.question_index).cloned(),
                    answer: answer.clone(),
                })
                .collect()
        })
    }

    /// Epoch milliseconds at which the current run started.
    #[must_use]
    pub fn started_at(&self) -> Option<i64> {
        self.read(|state| state.started_at)
    }

    /// Returns a summary of the current session progress.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        self.read(|state| SessionProgress {
            total: state.pool.len(),
            answered: state.history.len(),
            remaining: state.pool.len().saturating_sub(state.current),
            is_complete: state.status == SessionStatus::Completed,
        })
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.read(|state| {
            f.debug_struct("QuizSession")
                .field("status", &state.status)
                .field("pool_len", &state.pool.len())
                .field("current", &state.current)
                .field("total_score", &state.total_score)
                .field("history_len", &state.history.len())
                .field("review_mode", &state.review_mode)
                .field("question_timer_armed", &state.question_timer.is_armed())
                .field("total_timer_armed", &state.total_timer.is_armed())
                .finish_non_exhaustive()
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
