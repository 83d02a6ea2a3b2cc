use std::fmt;

/// Per-question marking after a check pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Correct,
    Incorrect,
    Unanswered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizScore {
    pub correct: usize,
    pub total: usize,
}

impl QuizScore {
    /// `correct / total * 100`, rounded to two decimals.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let raw = self.correct as f64 / self.total as f64 * 100.0;
        (raw * 100.0).round() / 100.0
    }
}

impl fmt::Display for QuizScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} ({:.2}%)", self.correct, self.total, self.percentage())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResult {
    pub marks: Vec<Mark>,
    pub score: QuizScore,
}

/// Compare each selection to the expected answer verbatim.
///
/// Missing trailing selections count as unanswered. Returns `None` when
/// there are no questions.
#[must_use]
pub fn score_selections<T: PartialEq>(expected: &[T], selections: &[Option<T>]) -> Option<QuizResult> {
    if expected.is_empty() {
        return None;
    }

    let marks: Vec<Mark> = expected
        .iter()
        .enumerate()
        .map(|(index, want)| match selections.get(index) {
            Some(Some(got)) if got == want => Mark::Correct,
            Some(Some(_)) => Mark::Incorrect,
            _ => Mark::Unanswered,
        })
        .collect();
    let correct = marks.iter().filter(|m| **m == Mark::Correct).count();

    Some(QuizResult {
        score: QuizScore {
            correct,
            total: expected.len(),
        },
        marks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_of_four_reports_seventy_five_percent() {
        let expected = vec!["1".to_string(), "2".into(), "3".into(), "4".into()];
        let selections = vec![
            Some("1".to_string()),
            Some("2".into()),
            Some("3".into()),
            Some("1".into()),
        ];
        let result = score_selections(&expected, &selections).unwrap();
        assert_eq!(result.score.correct, 3);
        assert_eq!(result.score.to_string(), "3 of 4 (75.00%)");
        assert_eq!(result.marks[3], Mark::Incorrect);
    }

    #[test]
    fn matching_is_case_sensitive_and_missing_is_unanswered() {
        let expected = vec!["Yes".to_string(), "No".into(), "Maybe".into()];
        let selections = vec![Some("yes".to_string()), None];
        let result = score_selections(&expected, &selections).unwrap();
        assert_eq!(
            result.marks,
            vec![Mark::Incorrect, Mark::Unanswered, Mark::Unanswered]
        );
        assert_eq!(result.score.correct, 0);
    }

    #[test]
    fn percentage_rounds_to_two_decimals() {
        let score = QuizScore { correct: 1, total: 3 };
        assert!((score.percentage() - 33.33).abs() < f64::EPSILON);
        assert_eq!(score.to_string(), "1 of 3 (33.33%)");
        let score = QuizScore { correct: 2, total: 3 };
        assert_eq!(score.to_string(), "2 of 3 (66.67%)");
    }

    #[test]
    fn no_questions_no_score() {
        assert!(score_selections::<String>(&[], &[]).is_none());
    }
}
