use rand::Rng;
use study_core::model::ItemRepository;
use study_core::quiz::{QuizResult, TrueFalseQuestion, TruthLabel, build_true_false_questions};
use study_core::sample_with;

use super::AnswerSheet;
use crate::error::StudyError;

pub const EMPTY_TRUE_FALSE: &str = "Add items to generate the true/false quiz.";

#[derive(Debug, Default)]
pub struct TrueFalseMode {
    questions: Vec<TrueFalseQuestion>,
    sheet: AnswerSheet<TruthLabel>,
}

impl TrueFalseMode {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render<R: Rng + ?Sized>(&mut self, repo: &ItemRepository, rng: &mut R) {
        let sample = sample_with(repo.items(), rng);
        self.questions = build_true_false_questions(&sample, repo.items(), rng);
        self.sheet = AnswerSheet::new(self.questions.iter().map(|q| q.expected).collect());
    }

    #[must_use]
    pub fn guidance(&self) -> Option<&'static str> {
        self.questions.is_empty().then_some(EMPTY_TRUE_FALSE)
    }

    #[must_use]
    pub fn questions(&self) -> &[TrueFalseQuestion] {
        &self.questions
    }

    /// # Errors
    ///
    /// Returns `StudyError::UnknownQuestion` if `question` is out of range.
    pub fn select(&mut self, question: usize, answer: Option<TruthLabel>) -> Result<(), StudyError> {
        self.sheet.select(question, answer)
    }

    #[must_use]
    pub fn selection(&self, question: usize) -> Option<TruthLabel> {
        self.sheet.selection(question).copied()
    }

    pub fn check(&mut self) -> Option<&QuizResult> {
        self.sheet.check()
    }

    #[must_use]
    pub fn result(&self) -> Option<&QuizResult> {
        self.sheet.result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use study_core::model::ItemRecord;
    use study_core::quiz::Mark;

    #[test]
    fn empty_repository_shows_guidance() {
        let mut mode = TrueFalseMode::new();
        mode.render(&ItemRepository::new(), &mut StdRng::seed_from_u64(1));
        assert_eq!(mode.guidance(), Some(EMPTY_TRUE_FALSE));
        assert!(mode.check().is_none());
    }

    #[test]
    fn answering_every_label_correctly_scores_full_marks() {
        let repo = ItemRepository::from_records([
            ItemRecord::new("Capital of France", "Paris"),
            ItemRecord::new("Capital of Italy", "Rome"),
            ItemRecord::new("Capital of Spain", "Madrid"),
        ]);
        let mut mode = TrueFalseMode::new();
        mode.render(&repo, &mut StdRng::seed_from_u64(7));
        assert!(mode.guidance().is_none());

        let expected: Vec<TruthLabel> = mode.questions().iter().map(|q| q.expected).collect();
        for (index, label) in expected.into_iter().enumerate() {
            mode.select(index, Some(label)).unwrap();
        }
        let result = mode.check().unwrap();
        assert_eq!(result.score.correct, 3);
        assert_eq!(result.score.to_string(), "3 of 3 (100.00%)");
    }

    #[test]
    fn wrong_and_missing_answers_are_marked() {
        let repo = ItemRepository::from_records([
            ItemRecord::new("A", "1"),
            ItemRecord::new("B", "2"),
        ]);
        let mut mode = TrueFalseMode::new();
        mode.render(&repo, &mut StdRng::seed_from_u64(11));

        let flipped = match mode.questions()[0].expected {
            TruthLabel::True => TruthLabel::False,
            TruthLabel::False => TruthLabel::True,
        };
        mode.select(0, Some(flipped)).unwrap();
        assert_eq!(mode.selection(0), Some(flipped));

        let result = mode.check().unwrap();
        assert_eq!(result.marks, vec![Mark::Incorrect, Mark::Unanswered]);
    }

    #[test]
    fn out_of_range_question_is_rejected() {
        let repo = ItemRepository::from_records([ItemRecord::new("A", "1")]);
        let mut mode = TrueFalseMode::new();
        mode.render(&repo, &mut StdRng::seed_from_u64(5));
        assert!(matches!(
            mode.select(3, Some(TruthLabel::True)).unwrap_err(),
            StudyError::UnknownQuestion(3)
        ));
    }
}
