//! Derived quiz questions and their scoring.

mod choice;
mod score;
mod true_false;

use thiserror::Error;

pub use choice::{ChoiceQuestion, MIN_CHOICE_ITEMS, OPTIONS_PER_QUESTION, build_choice_questions};
pub use score::{Mark, QuizResult, QuizScore, score_selections};
pub use true_false::{TrueFalseQuestion, TruthLabel, build_true_false_questions};

/// Errors raised while deriving questions for a mode.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModeError {
    #[error("at least {required} items are required, found {available}")]
    InsufficientData { required: usize, available: usize },
}
