use chrono::{DateTime, Utc};
use std::fmt;

use crate::model::ids::ItemId;

/// Three-level self assessment given after a timed-writing answer is revealed.
///
/// The rating is not scored; it is recorded and handed to a `SchedulingHook`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DifficultyRating {
    /// Answered correctly.
    Easy,
    /// Answered with hesitation.
    Medium,
    /// Missed it.
    Hard,
}

impl DifficultyRating {
    pub const ALL: [DifficultyRating; 3] = [
        DifficultyRating::Easy,
        DifficultyRating::Medium,
        DifficultyRating::Hard,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            DifficultyRating::Easy => "Easy (got it)",
            DifficultyRating::Medium => "Medium (hesitated)",
            DifficultyRating::Hard => "Hard (missed it)",
        }
    }

    /// Parses `easy`/`medium`/`hard` or `1`/`2`/`3`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "easy" | "e" | "1" => Some(Self::Easy),
            "medium" | "m" | "2" => Some(Self::Medium),
            "hard" | "h" | "3" => Some(Self::Hard),
            _ => None,
        }
    }
}

impl fmt::Display for DifficultyRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One rating event in a timed-writing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingRecord {
    pub item_id: ItemId,
    /// 1-based question number within the run.
    pub question_number: usize,
    pub rating: DifficultyRating,
    pub rated_at: DateTime<Utc>,
}

/// What a scheduler decided to do with a rated item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchedulingDecision {
    /// No scheduling is performed.
    Unscheduled,
}

/// Extension point between a difficulty rating and a future review scheduler.
pub trait SchedulingHook: Send + Sync {
    fn on_rating(&self, record: &RatingRecord) -> SchedulingDecision;
}

/// Default hook: records nothing and schedules nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopScheduler;

impl SchedulingHook for NoopScheduler {
    fn on_rating(&self, _record: &RatingRecord) -> SchedulingDecision {
        SchedulingDecision::Unscheduled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_digits() {
        assert_eq!(DifficultyRating::parse("Easy"), Some(DifficultyRating::Easy));
        assert_eq!(DifficultyRating::parse("2"), Some(DifficultyRating::Medium));
        assert_eq!(DifficultyRating::parse(" h "), Some(DifficultyRating::Hard));
        assert_eq!(DifficultyRating::parse("meh"), None);
    }
}
