use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use study_core::Clock;
use study_core::model::{
    DifficultyRating, Item, ItemId, NoopScheduler, RatingRecord, SchedulingHook,
};

use crate::error::StudyError;
use crate::timer::{Countdown, TimerHandle};

/// Seconds allowed per question.
pub const WRITING_TIME_LIMIT: u32 = 60;

pub const EMPTY_WRITING: &str = "Add items to start the writing challenge.";
pub const CHALLENGE_FINISHED: &str = "End of the challenge!";
pub const TIME_UP: &str = "Time's up! Rate your answer.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedWritingConfig {
    /// Number of ticks before a question times out.
    pub time_limit: u32,
    pub tick: Duration,
}

impl Default for TimedWritingConfig {
    fn default() -> Self {
        Self {
            time_limit: WRITING_TIME_LIMIT,
            tick: Duration::from_secs(1),
        }
    }
}

/// Identifies one presentation of a question. Timer events carry the token
/// they were started for so that late events can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuestionToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealCause {
    Submitted,
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritingPhase {
    /// Nothing to present.
    Empty,
    Presenting { remaining: u32 },
    Revealed { cause: RevealCause },
    Finished,
}

impl WritingPhase {
    fn name(self) -> &'static str {
        match self {
            WritingPhase::Empty => "no items are loaded",
            WritingPhase::Presenting { .. } => "a question is open",
            WritingPhase::Revealed { .. } => "the answer is shown",
            WritingPhase::Finished => "the challenge is over",
        }
    }
}

/// Whether an event changed the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Ignored,
}

/// Pure state of one writing challenge over a fixed sample.
#[derive(Debug, Clone)]
pub struct TimedWritingSession {
    items: Vec<Item>,
    index: usize,
    phase: WritingPhase,
    response: String,
    time_limit: u32,
    token: QuestionToken,
    ratings: Vec<RatingRecord>,
}

impl TimedWritingSession {
    #[must_use]
    pub fn new(items: Vec<Item>, time_limit: u32) -> Self {
        let phase = if items.is_empty() {
            WritingPhase::Empty
        } else {
            WritingPhase::Presenting {
                remaining: time_limit,
            }
        };
        Self {
            items,
            index: 0,
            phase,
            response: String::new(),
            time_limit,
            token: QuestionToken(1),
            ratings: Vec::new(),
        }
    }

    /// Start over with `items`. Tokens keep increasing so that events from
    /// the previous run never match the new one.
    pub fn restart(&mut self, items: Vec<Item>) {
        let next = QuestionToken(self.token.0 + 1);
        *self = Self::new(items, self.time_limit);
        self.token = next;
    }

    #[must_use]
    pub fn phase(&self) -> WritingPhase {
        self.phase
    }

    /// Token of the open question, if any.
    #[must_use]
    pub fn token(&self) -> Option<QuestionToken> {
        matches!(self.phase, WritingPhase::Presenting { .. }).then_some(self.token)
    }

    #[must_use]
    pub fn current(&self) -> Option<&Item> {
        match self.phase {
            WritingPhase::Presenting { .. } | WritingPhase::Revealed { .. } => {
                self.items.get(self.index)
            }
            WritingPhase::Empty | WritingPhase::Finished => None,
        }
    }

    #[must_use]
    pub fn response(&self) -> &str {
        &self.response
    }

    #[must_use]
    pub fn ratings(&self) -> &[RatingRecord] {
        &self.ratings
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn accepts(&self, token: QuestionToken) -> bool {
        self.token == token && matches!(self.phase, WritingPhase::Presenting { .. })
    }

    /// One timer period elapsed for `token`. Reaching zero reveals the answer.
    pub fn tick(&mut self, token: QuestionToken) -> Transition {
        if !self.accepts(token) {
            return Transition::Ignored;
        }
        if let WritingPhase::Presenting { remaining } = self.phase {
            let remaining = remaining.saturating_sub(1);
            self.phase = if remaining == 0 {
                WritingPhase::Revealed {
                    cause: RevealCause::TimedOut,
                }
            } else {
                WritingPhase::Presenting { remaining }
            };
        }
        Transition::Applied
    }

    /// Force the timeout for `token`.
    pub fn expire(&mut self, token: QuestionToken) -> Transition {
        if !self.accepts(token) {
            return Transition::Ignored;
        }
        self.phase = WritingPhase::Revealed {
            cause: RevealCause::TimedOut,
        };
        Transition::Applied
    }

    pub fn submit(&mut self, token: QuestionToken, text: impl Into<String>) -> Transition {
        if !self.accepts(token) {
            return Transition::Ignored;
        }
        self.response = text.into();
        self.phase = WritingPhase::Revealed {
            cause: RevealCause::Submitted,
        };
        Transition::Applied
    }

    /// Rate the revealed answer and move to the next question.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::InvalidState` unless the answer is revealed.
    pub fn rate(
        &mut self,
        rating: DifficultyRating,
        clock: &Clock,
    ) -> Result<RatingRecord, StudyError> {
        let item_id = match (self.phase, self.items.get(self.index)) {
            (WritingPhase::Revealed { .. }, Some(item)) => item.id(),
            (phase, _) => {
                return Err(StudyError::InvalidState {
                    action: "rate an answer",
                    state: phase.name(),
                });
            }
        };
        let record = RatingRecord {
            item_id,
            question_number: self.index + 1,
            rating,
            rated_at: clock.now(),
        };
        self.ratings.push(record.clone());
        self.advance();
        Ok(record)
    }

    fn advance(&mut self) {
        self.index += 1;
        self.response.clear();
        if self.index < self.items.len() {
            self.token = QuestionToken(self.token.0 + 1);
            self.phase = WritingPhase::Presenting {
                remaining: self.time_limit,
            };
        } else {
            self.phase = WritingPhase::Finished;
        }
    }

    #[must_use]
    pub fn view(&self) -> TimedWritingView {
        let item = self.current();
        let revealed = matches!(self.phase, WritingPhase::Revealed { .. });
        let timer_text = match self.phase {
            WritingPhase::Presenting { remaining } => Some(format!("Time left: {remaining} seconds")),
            WritingPhase::Revealed {
                cause: RevealCause::TimedOut,
            } => Some(TIME_UP.to_owned()),
            _ => None,
        };
        let message = match self.phase {
            WritingPhase::Empty => Some(EMPTY_WRITING),
            WritingPhase::Finished => Some(CHALLENGE_FINISHED),
            _ => None,
        };
        TimedWritingView {
            phase: self.phase,
            item_id: item.map(Item::id),
            number: item.map(|_| self.index + 1),
            total: self.items.len(),
            prompt: item.map(|i| i.prompt().to_owned()),
            answer: item.filter(|_| revealed).map(|i| i.answer().to_owned()),
            response: self.response.clone(),
            timer_text,
            message,
            input_enabled: matches!(self.phase, WritingPhase::Presenting { .. }),
            can_rate: revealed,
        }
    }
}

/// Snapshot of the writing mode for a rendering surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedWritingView {
    pub phase: WritingPhase,
    pub item_id: Option<ItemId>,
    /// 1-based question number.
    pub number: Option<usize>,
    pub total: usize,
    pub prompt: Option<String>,
    /// Only set once the answer is revealed.
    pub answer: Option<String>,
    pub response: String,
    pub timer_text: Option<String>,
    pub message: Option<&'static str>,
    pub input_enabled: bool,
    pub can_rate: bool,
}

pub type ViewObserver = Arc<dyn Fn(&TimedWritingView) + Send + Sync>;

fn lock(session: &Mutex<TimedWritingSession>) -> MutexGuard<'_, TimedWritingSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drives a `TimedWritingSession` with a countdown. Owns at most one timer,
/// which is cancelled whenever the open question changes.
pub struct TimedWritingController {
    session: Arc<Mutex<TimedWritingSession>>,
    timer: Option<TimerHandle>,
    config: TimedWritingConfig,
    clock: Clock,
    scheduler: Arc<dyn SchedulingHook>,
    observer: Option<ViewObserver>,
}

impl TimedWritingController {
    #[must_use]
    pub fn new(config: TimedWritingConfig, clock: Clock) -> Self {
        Self {
            session: Arc::new(Mutex::new(TimedWritingSession::new(
                Vec::new(),
                config.time_limit,
            ))),
            timer: None,
            config,
            clock,
            scheduler: Arc::new(NoopScheduler),
            observer: None,
        }
    }

    #[must_use]
    pub fn with_scheduler(mut self, scheduler: Arc<dyn SchedulingHook>) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Called with a fresh view after every timer tick.
    #[must_use]
    pub fn with_observer(mut self, observer: ViewObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    #[must_use]
    pub fn config(&self) -> TimedWritingConfig {
        self.config
    }

    /// Restart the challenge over `sample`.
    ///
    /// Must be called from within a tokio runtime when `sample` is non-empty.
    pub fn render(&mut self, sample: Vec<Item>) {
        self.cancel_timer();
        lock(&self.session).restart(sample);
        self.arm();
    }

    /// Submit the typed answer for the open question. A submit that loses
    /// the race against the timeout is ignored.
    pub fn submit(&mut self, text: impl Into<String>) -> Transition {
        let transition = {
            let mut session = lock(&self.session);
            match session.token() {
                Some(token) => session.submit(token, text),
                None => Transition::Ignored,
            }
        };
        if transition == Transition::Applied {
            self.cancel_timer();
        } else {
            tracing::debug!("writing submit ignored");
        }
        transition
    }

    /// # Errors
    ///
    /// Returns `StudyError::InvalidState` unless the answer is revealed.
    pub fn rate(&mut self, rating: DifficultyRating) -> Result<RatingRecord, StudyError> {
        let record = lock(&self.session).rate(rating, &self.clock)?;
        tracing::info!(
            item_id = %record.item_id,
            question = record.question_number,
            rating = %record.rating,
            "writing answer rated"
        );
        let decision = self.scheduler.on_rating(&record);
        tracing::debug!(?decision, "scheduling hook");
        self.cancel_timer();
        self.arm();
        Ok(record)
    }

    #[must_use]
    pub fn view(&self) -> TimedWritingView {
        lock(&self.session).view()
    }

    #[must_use]
    pub fn phase(&self) -> WritingPhase {
        lock(&self.session).phase()
    }

    #[must_use]
    pub fn ratings(&self) -> Vec<RatingRecord> {
        lock(&self.session).ratings().to_vec()
    }

    #[must_use]
    pub fn is_timer_running(&self) -> bool {
        self.timer.as_ref().is_some_and(|timer| !timer.is_finished())
    }

    pub fn teardown(&mut self) {
        self.cancel_timer();
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }

    fn arm(&mut self) {
        let Some(token) = lock(&self.session).token() else {
            return;
        };
        tracing::debug!(?token, limit = self.config.time_limit, "writing timer started");

        let ticking = Arc::clone(&self.session);
        let observer = self.observer.clone();
        let expiring = Arc::clone(&self.session);
        self.timer = Some(Countdown::start(
            self.config.time_limit,
            self.config.tick,
            move |_remaining| {
                let view = {
                    let mut session = lock(&ticking);
                    if session.tick(token) == Transition::Ignored {
                        return;
                    }
                    session.view()
                };
                if let Some(observer) = &observer {
                    observer(&view);
                }
            },
            move || {
                if lock(&expiring).expire(token) == Transition::Applied {
                    tracing::debug!(?token, "writing question expired");
                }
            },
        ));
    }
}

impl Drop for TimedWritingController {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}
