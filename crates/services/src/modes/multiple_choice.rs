use rand::Rng;
use study_core::model::ItemRepository;
use study_core::quiz::{ChoiceQuestion, ModeError, QuizResult, build_choice_questions};
use study_core::sample_with;

use super::AnswerSheet;
use crate::error::StudyError;

/// Multiple-choice quiz over a fresh sample.
#[derive(Debug, Default)]
pub struct MultipleChoiceMode {
    questions: Vec<ChoiceQuestion>,
    sheet: AnswerSheet<String>,
    unavailable: Option<ModeError>,
}

impl MultipleChoiceMode {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the question set. With too few items the mode keeps only a
    /// guidance message.
    pub fn render<R: Rng + ?Sized>(&mut self, repo: &ItemRepository, rng: &mut R) {
        let sample = sample_with(repo.items(), rng);
        match build_choice_questions(&sample, repo.items(), rng) {
            Ok(questions) => {
                self.sheet =
                    AnswerSheet::new(questions.iter().map(|q| q.correct_answer.clone()).collect());
                self.questions = questions;
                self.unavailable = None;
            }
            Err(err) => {
                tracing::debug!(%err, "multiple choice unavailable");
                self.questions.clear();
                self.sheet = AnswerSheet::default();
                self.unavailable = Some(err);
            }
        }
    }

    #[must_use]
    pub fn guidance(&self) -> Option<String> {
        self.unavailable.map(|err| match err {
            ModeError::InsufficientData { required, .. } => {
                format!("At least {required} items are needed to build a multiple-choice quiz.")
            }
            other => other.to_string(),
        })
    }

    #[must_use]
    pub fn unavailable(&self) -> Option<ModeError> {
        self.unavailable
    }

    #[must_use]
    pub fn questions(&self) -> &[ChoiceQuestion] {
        &self.questions
    }

    /// Select option `option` of question `question` (both 0-based).
    ///
    /// # Errors
    ///
    /// Returns `StudyError::UnknownQuestion` or `StudyError::UnknownOption`.
    pub fn select(&mut self, question: usize, option: usize) -> Result<(), StudyError> {
        let text = self
            .questions
            .get(question)
            .ok_or(StudyError::UnknownQuestion(question))?
            .options
            .get(option)
            .ok_or(StudyError::UnknownOption { question, option })?
            .clone();
        self.sheet.select(question, Some(text))
    }

    /// # Errors
    ///
    /// Returns `StudyError::UnknownQuestion` if out of range.
    pub fn clear_selection(&mut self, question: usize) -> Result<(), StudyError> {
        self.sheet.select(question, None)
    }

    #[must_use]
    pub fn selection(&self, question: usize) -> Option<&str> {
        self.sheet.selection(question).map(String::as_str)
    }

    /// Score the current selections. `None` when there are no questions.
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

    fn abcd() -> ItemRepository {
        ItemRepository::from_records([
            ItemRecord::new("A", "1"),
            ItemRecord::new("B", "2"),
            ItemRecord::new("C", "3"),
            ItemRecord::new("D", "4"),
        ])
    }

    #[test]
    fn three_items_show_guidance_only() {
        let repo = ItemRepository::from_records([
            ItemRecord::new("A", "1"),
            ItemRecord::new("B", "2"),
            ItemRecord::new("C", "3"),
        ]);
        let mut mode = MultipleChoiceMode::new();
        mode.render(&repo, &mut StdRng::seed_from_u64(1));

        assert!(mode.questions().is_empty());
        assert_eq!(
            mode.guidance().as_deref(),
            Some("At least 4 items are needed to build a multiple-choice quiz.")
        );
        assert!(mode.check().is_none());
    }

    #[test]
    fn three_of_four_correct() {
        let repo = abcd();
        let mut mode = MultipleChoiceMode::new();
        mode.render(&repo, &mut StdRng::seed_from_u64(2));
        assert_eq!(mode.questions().len(), 4);

        let picks: Vec<(usize, usize)> = mode
            .questions()
            .iter()
            .enumerate()
            .map(|(index, question)| {
                let correct = question
                    .options
                    .iter()
                    .position(|o| *o == question.correct_answer)
                    .unwrap();
                let pick = if index == 0 {
                    (correct + 1) % question.options.len()
                } else {
                    correct
                };
                (index, pick)
            })
            .collect();
        for (question, option) in picks {
            mode.select(question, option).unwrap();
        }

        let result = mode.check().unwrap();
        assert_eq!(result.score.to_string(), "3 of 4 (75.00%)");
        assert_eq!(result.marks[0], Mark::Incorrect);
    }

    #[test]
    fn unanswered_questions_are_marked() {
        let repo = abcd();
        let mut mode = MultipleChoiceMode::new();
        mode.render(&repo, &mut StdRng::seed_from_u64(3));
        mode.select(1, 0).unwrap();
        mode.clear_selection(1).unwrap();

        let result = mode.check().unwrap();
        assert!(result.marks.iter().all(|m| *m == Mark::Unanswered));
        assert_eq!(result.score.correct, 0);
    }

    #[test]
    fn out_of_range_selection_is_rejected() {
        let repo = abcd();
        let mut mode = MultipleChoiceMode::new();
        mode.render(&repo, &mut StdRng::seed_from_u64(4));
        assert!(matches!(
            mode.select(9, 0).unwrap_err(),
            StudyError::UnknownQuestion(9)
        ));
        assert!(matches!(
            mode.select(0, 9).unwrap_err(),
            StudyError::UnknownOption {
                question: 0,
                option: 9
            }
        ));
    }
}
