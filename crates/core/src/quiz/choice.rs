use rand::Rng;
use rand::seq::SliceRandom;

use crate::model::{Item, ItemId};
use crate::quiz::ModeError;

/// Options rendered per question, the correct one included.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// Smallest repository a multiple-choice quiz is built from.
pub const MIN_CHOICE_ITEMS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceQuestion {
    pub item_id: ItemId,
    pub prompt: String,
    pub correct_answer: String,
    pub options: Vec<String>,
}

/// Build one question per sampled item.
///
/// Distractors come from the whole `pool` (the repository), not only the
/// sample, visited in a random order. Answers equal to the correct one or
/// already offered are skipped, so a question can end up with fewer than
/// four options when the pool has few distinct answers.
///
/// # Errors
///
/// Returns `ModeError::InsufficientData` when `pool` has fewer than
/// `MIN_CHOICE_ITEMS` items.
pub fn build_choice_questions<R: Rng + ?Sized>(
    sample: &[Item],
    pool: &[Item],
    rng: &mut R,
) -> Result<Vec<ChoiceQuestion>, ModeError> {
    if pool.len() < MIN_CHOICE_ITEMS {
        return Err(ModeError::InsufficientData {
            required: MIN_CHOICE_ITEMS,
            available: pool.len(),
        });
    }

    let mut distractors: Vec<&str> = pool.iter().map(Item::answer).collect();
    distractors.shuffle(rng);

    let questions = sample
        .iter()
        .map(|item| {
            let correct = item.answer();
            let mut options = vec![correct.to_owned()];
            for candidate in &distractors {
                if options.len() == OPTIONS_PER_QUESTION {
                    break;
                }
                if *candidate != correct && !options.iter().any(|o| o == candidate) {
                    options.push((*candidate).to_owned());
                }
            }
            options.shuffle(rng);
            ChoiceQuestion {
                item_id: item.id(),
                prompt: item.prompt().to_owned(),
                correct_answer: correct.to_owned(),
                options,
            }
        })
        .collect();

    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemRecord, ItemRepository};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn repo(records: &[(&str, &str)]) -> ItemRepository {
        ItemRepository::from_records(records.iter().map(|(q, a)| ItemRecord::new(*q, *a)))
    }

    #[test]
    fn requires_four_items() {
        let repo = repo(&[("A", "1"), ("B", "2"), ("C", "3")]);
        let mut rng = StdRng::seed_from_u64(1);
        let err = build_choice_questions(repo.items(), repo.items(), &mut rng).unwrap_err();
        assert_eq!(
            err,
            ModeError::InsufficientData {
                required: 4,
                available: 3
            }
        );
    }

    #[test]
    fn each_question_has_four_distinct_options_with_the_answer() {
        let repo = repo(&[("A", "1"), ("B", "2"), ("C", "3"), ("D", "4"), ("E", "5")]);
        let mut rng = StdRng::seed_from_u64(3);
        let questions = build_choice_questions(repo.items(), repo.items(), &mut rng).unwrap();
        assert_eq!(questions.len(), 5);
        for question in &questions {
            assert_eq!(question.options.len(), OPTIONS_PER_QUESTION);
            assert!(question.options.contains(&question.correct_answer));
            let mut sorted = question.options.clone();
            sorted.sort();
            sorted.dedup();
            assert_eq!(sorted.len(), question.options.len());
            let source = repo.get(question.item_id).unwrap();
            assert_eq!(source.answer(), question.correct_answer);
            assert_eq!(source.prompt(), question.prompt);
        }
    }

    #[test]
    fn repeated_answers_shrink_the_option_set() {
        let repo = repo(&[("A", "x"), ("B", "x"), ("C", "x"), ("D", "y")]);
        let mut rng = StdRng::seed_from_u64(9);
        let questions = build_choice_questions(repo.items(), repo.items(), &mut rng).unwrap();
        for question in &questions {
            assert_eq!(question.options.len(), 2);
        }
    }
}
