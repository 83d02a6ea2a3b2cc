//! The four study modes. Each one owns its session sample and interaction
//! state and exposes plain view data for a rendering surface.

mod flashcards;
mod multiple_choice;
mod timed_writing;
mod true_false;

use study_core::quiz::{QuizResult, score_selections};

use crate::error::StudyError;

pub use flashcards::{EMPTY_FLASHCARDS, EditBuffer, Face, FlashcardMode, FlashcardView, PendingDelete};
pub use multiple_choice::MultipleChoiceMode;
pub use timed_writing::{
    CHALLENGE_FINISHED, EMPTY_WRITING, QuestionToken, RevealCause, TimedWritingConfig, TimedWritingController, TimedWritingSession,
    TimedWritingView, TIME_UP, Transition, ViewObserver, WRITING_TIME_LIMIT, WritingPhase,
};
pub use true_false::{EMPTY_TRUE_FALSE, TrueFalseMode};

/// Answer sheet shared by the two quiz modes: one expected answer per
/// question, the user's current selections and the last check result.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AnswerSheet<A> {
    expected: Vec<A>,
    selections: Vec<Option<A>>,
    result: Option<QuizResult>,
}

impl<A: PartialEq + Clone> AnswerSheet<A> {
    pub(crate) fn new(expected: Vec<A>) -> Self {
        let selections = vec![None; expected.len()];
        Self {
            expected,
            selections,
            result: None,
        }
    }

    pub(crate) fn select(&mut self, question: usize, answer: Option<A>) -> Result<(), StudyError> {
        let slot = self
            .selections
            .get_mut(question)
            .ok_or(StudyError::UnknownQuestion(question))?;
        *slot = answer;
        Ok(())
    }

    pub(crate) fn selection(&self, question: usize) -> Option<&A> {
        self.selections.get(question).and_then(Option::as_ref)
    }

    pub(crate) fn check(&mut self) -> Option<&QuizResult> {
        self.result = score_selections(&self.expected, &self.selections);
        self.result.as_ref()
    }

    pub(crate) fn result(&self) -> Option<&QuizResult> {
        self.result.as_ref()
    }
}

impl<A> Default for AnswerSheet<A> {
    fn default() -> Self {
        Self {
            expected: Vec::new(),
            selections: Vec::new(),
            result: None,
        }
    }
}
