use rand::Rng;
use rand::seq::IndexedRandom;
use std::fmt;
use std::str::FromStr;

use crate::model::{Item, ItemId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TruthLabel {
    True,
    False,
}

impl fmt::Display for TruthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TruthLabel::True => f.write_str("true"),
            TruthLabel::False => f.write_str("false"),
        }
    }
}

impl FromStr for TruthLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "v" => Ok(TruthLabel::True),
            "false" | "f" => Ok(TruthLabel::False),
            other => Err(format!("not a true/false answer: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrueFalseQuestion {
    pub item_id: ItemId,
    pub prompt: String,
    pub statement: String,
    pub expected: TruthLabel,
}

/// Build one statement per sampled item.
///
/// A fair coin picks the branch. On the false branch the statement is the
/// answer of another `pool` item chosen uniformly among those whose answer
/// differs; when none differ the item's own answer is used and the question
/// is still labelled false.
#[must_use]
pub fn build_true_false_questions<R: Rng + ?Sized>(
    sample: &[Item],
    pool: &[Item],
    rng: &mut R,
) -> Vec<TrueFalseQuestion> {
    sample
        .iter()
        .map(|item| {
            let (statement, expected) = if rng.random_bool(0.5) {
                (item.answer().to_owned(), TruthLabel::True)
            } else {
                let wrong: Vec<&Item> = pool
                    .iter()
                    .filter(|other| other.answer() != item.answer())
                    .collect();
                let statement = wrong
                    .choose(rng)
                    .map_or(item.answer(), |other| other.answer())
                    .to_owned();
                (statement, TruthLabel::False)
            };
            TrueFalseQuestion {
                item_id: item.id(),
                prompt: item.prompt().to_owned(),
                statement,
                expected,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemRecord, ItemRepository};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn labels_match_statements() {
        let repo = ItemRepository::from_records(
            (0..40).map(|i| ItemRecord::new(format!("Q{i}"), format!("A{i}"))),
        );
        let mut rng = StdRng::seed_from_u64(11);
        let questions = build_true_false_questions(repo.items(), repo.items(), &mut rng);

        assert_eq!(questions.len(), 40);
        let mut saw_true = false;
        let mut saw_false = false;
        for question in &questions {
            let own = repo.get(question.item_id).unwrap().answer();
            match question.expected {
                TruthLabel::True => {
                    saw_true = true;
                    assert_eq!(question.statement, own);
                }
                TruthLabel::False => {
                    saw_false = true;
                    assert_ne!(question.statement, own);
                }
            }
        }
        assert!(saw_true && saw_false);
    }

    #[test]
    fn false_statement_degrades_to_own_answer_without_alternatives() {
        let repo = ItemRepository::from_records([
            ItemRecord::new("A", "same"),
            ItemRecord::new("B", "same"),
        ]);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            for question in build_true_false_questions(repo.items(), repo.items(), &mut rng) {
                assert_eq!(question.statement, "same");
            }
        }
    }

    #[test]
    fn parses_labels() {
        assert_eq!("True".parse::<TruthLabel>().unwrap(), TruthLabel::True);
        assert_eq!("f".parse::<TruthLabel>().unwrap(), TruthLabel::False);
        assert!("maybe".parse::<TruthLabel>().is_err());
    }
}
