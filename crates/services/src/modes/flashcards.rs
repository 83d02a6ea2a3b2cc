use std::collections::HashSet;

use rand::Rng;
use study_core::model::{Item, ItemDraft, ItemId, ItemRepository};
use study_core::sample_with;

use crate::error::StudyError;

pub const EMPTY_FLASHCARDS: &str =
    "No items available. Add an item or check that the dataset loaded.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Front,
    Back,
}

/// In-progress text of the single card being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBuffer {
    pub id: ItemId,
    pub prompt: String,
    pub answer: String,
}

/// A delete waiting for the user's confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub id: ItemId,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashcardView {
    pub id: ItemId,
    /// 1-based position in the repository, for display.
    pub number: usize,
    pub prompt: String,
    pub answer: String,
    pub face: Face,
    pub editing: Option<EditBuffer>,
}

/// Flip cards with in-place edit and confirmed delete.
///
/// Cards are `Viewing` unless their id matches the edit buffer. At most one
/// card is in `Editing`.
#[derive(Debug, Default)]
pub struct FlashcardMode {
    sample: Vec<Item>,
    flipped: HashSet<ItemId>,
    editing: Option<EditBuffer>,
    pending_delete: Option<PendingDelete>,
    positions: Vec<usize>,
}

impl FlashcardMode {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw a fresh sample from `repo` and reset every card to its front.
    pub fn render<R: Rng + ?Sized>(&mut self, repo: &ItemRepository, rng: &mut R) {
        self.sample = sample_with(repo.items(), rng);
        self.flipped.clear();
        self.pending_delete = None;
        if self
            .editing
            .as_ref()
            .is_some_and(|buffer| repo.get(buffer.id).is_none())
        {
            self.editing = None;
        }
        self.refresh(repo);
    }

    /// Re-read the current sample's text from `repo` without resampling.
    /// Items no longer in the repository drop out.
    pub fn refresh(&mut self, repo: &ItemRepository) {
        self.sample = self
            .sample
            .iter()
            .filter_map(|item| repo.get(item.id()).cloned())
            .collect();
        self.positions = self
            .sample
            .iter()
            .map(|item| repo.position(item.id()).unwrap_or_default())
            .collect();
    }

    #[must_use]
    pub fn guidance(&self) -> Option<&'static str> {
        self.sample.is_empty().then_some(EMPTY_FLASHCARDS)
    }

    #[must_use]
    pub fn views(&self) -> Vec<FlashcardView> {
        self.sample
            .iter()
            .zip(&self.positions)
            .map(|(item, position)| {
                let editing = self
                    .editing
                    .as_ref()
                    .filter(|buffer| buffer.id == item.id())
                    .cloned();
                let face = if self.flipped.contains(&item.id()) {
                    Face::Back
                } else {
                    Face::Front
                };
                FlashcardView {
                    id: item.id(),
                    number: position + 1,
                    prompt: item.prompt().to_owned(),
                    answer: item.answer().to_owned(),
                    face,
                    editing,
                }
            })
            .collect()
    }

    #[must_use]
    pub fn sample(&self) -> &[Item] {
        &self.sample
    }

    #[must_use]
    pub fn editing(&self) -> Option<&EditBuffer> {
        self.editing.as_ref()
    }

    #[must_use]
    pub fn pending_delete(&self) -> Option<&PendingDelete> {
        self.pending_delete.as_ref()
    }

    /// Toggle the visible face of a card in the current sample.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::UnknownItem` if the card is not displayed, or
    /// `StudyError::InvalidState` if it is being edited.
    pub fn flip(&mut self, id: ItemId) -> Result<Face, StudyError> {
        if !self.sample.iter().any(|item| item.id() == id) {
            return Err(StudyError::UnknownItem(id));
        }
        if self.editing.as_ref().is_some_and(|buffer| buffer.id == id) {
            return Err(StudyError::InvalidState {
                action: "flip a card",
                state: "it is being edited",
            });
        }
        if self.flipped.remove(&id) {
            Ok(Face::Front)
        } else {
            self.flipped.insert(id);
            Ok(Face::Back)
        }
    }

    /// Open the edit form for `id`, discarding any other card's unsaved edit.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::UnknownItem` if the card is not displayed or no
    /// longer in `repo`.
    pub fn start_edit(&mut self, id: ItemId, repo: &ItemRepository) -> Result<(), StudyError> {
        if !self.sample.iter().any(|item| item.id() == id) {
            return Err(StudyError::UnknownItem(id));
        }
        let item = repo.get(id).ok_or(StudyError::UnknownItem(id))?;
        if let Some(previous) = &self.editing {
            if previous.id != id {
                tracing::debug!(discarded = %previous.id, "discarding unsaved edit");
            }
        }
        self.editing = Some(EditBuffer {
            id,
            prompt: item.prompt().to_owned(),
            answer: item.answer().to_owned(),
        });
        self.flipped.remove(&id);
        self.refresh(repo);
        Ok(())
    }

    /// Replace the text in the open edit form.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::NotEditing` if no form is open.
    pub fn update_buffer(
        &mut self,
        prompt: impl Into<String>,
        answer: impl Into<String>,
    ) -> Result<(), StudyError> {
        let buffer = self.editing.as_mut().ok_or(StudyError::NotEditing)?;
        buffer.prompt = prompt.into();
        buffer.answer = answer.into();
        Ok(())
    }

    /// Validate the edit buffer and write it to `repo`.
    ///
    /// On validation failure the form stays open with its text.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::NotEditing`, `StudyError::Validation` or
    /// `StudyError::UnknownItem`.
    pub fn save_edit(&mut self, repo: &mut ItemRepository) -> Result<ItemId, StudyError> {
        let buffer = self.editing.as_ref().ok_or(StudyError::NotEditing)?;
        let id = buffer.id;
        let draft = ItemDraft::new(buffer.prompt.clone(), buffer.answer.clone());
        repo.update(id, draft)?;
        self.editing = None;
        Ok(id)
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// First step of a delete: remember which item the user asked about.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::UnknownItem` if `id` is not in `repo`.
    pub fn request_delete(
        &mut self,
        id: ItemId,
        repo: &ItemRepository,
    ) -> Result<&PendingDelete, StudyError> {
        let item = repo.get(id).ok_or(StudyError::UnknownItem(id))?;
        let pending = self.pending_delete.insert(PendingDelete {
            id,
            prompt: item.prompt().to_owned(),
        });
        Ok(&*pending)
    }

    /// Remove the item awaiting confirmation from `repo`.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::NoPendingDelete` without a prior request, or
    /// `StudyError::UnknownItem` if the item vanished meanwhile.
    pub fn confirm_delete(&mut self, repo: &mut ItemRepository) -> Result<Item, StudyError> {
        let pending = self
            .pending_delete
            .take()
            .ok_or(StudyError::NoPendingDelete)?;
        let removed = repo.remove(pending.id)?;
        if self.editing.as_ref().is_some_and(|b| b.id == pending.id) {
            self.editing = None;
        }
        Ok(removed)
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use study_core::model::{ItemRecord, ItemValidationError};

    fn setup() -> (ItemRepository, FlashcardMode, StdRng) {
        let repo = ItemRepository::from_records([
            ItemRecord::new("A", "1"),
            ItemRecord::new("B", "2"),
            ItemRecord::new("C", "3"),
        ]);
        let mut rng = StdRng::seed_from_u64(42);
        let mut mode = FlashcardMode::new();
        mode.render(&repo, &mut rng);
        (repo, mode, rng)
    }

    #[test]
    fn empty_repository_shows_guidance() {
        let mut mode = FlashcardMode::new();
        mode.render(&ItemRepository::new(), &mut StdRng::seed_from_u64(1));
        assert_eq!(mode.guidance(), Some(EMPTY_FLASHCARDS));
        assert!(mode.views().is_empty());
    }

    #[test]
    fn flip_toggles_faces() {
        let (_repo, mut mode, _) = setup();
        let id = mode.views()[0].id;
        assert_eq!(mode.flip(id).unwrap(), Face::Back);
        assert_eq!(mode.views()[0].face, Face::Back);
        assert_eq!(mode.flip(id).unwrap(), Face::Front);
    }

    #[test]
    fn views_number_items_by_repository_position() {
        let (repo, mode, _) = setup();
        for view in mode.views() {
            assert_eq!(repo.position(view.id), Some(view.number - 1));
        }
    }

    #[test]
    fn starting_a_second_edit_discards_the_first() {
        let (mut repo, mut mode, _) = setup();
        let a = repo.get_at(0).unwrap().id();
        let b = repo.get_at(1).unwrap().id();

        mode.start_edit(a, &repo).unwrap();
        mode.update_buffer("A edited", "1 edited").unwrap();
        mode.start_edit(b, &repo).unwrap();

        let buffer = mode.editing().unwrap();
        assert_eq!(buffer.id, b);
        assert_eq!(buffer.prompt, "B");
        assert_eq!(mode.views().iter().filter(|v| v.editing.is_some()).count(), 1);

        mode.save_edit(&mut repo).unwrap();
        assert_eq!(repo.get(a).unwrap().prompt(), "A");
    }

    #[test]
    fn only_displayed_cards_can_be_edited() {
        let (mut repo, mut mode, _) = setup();
        let hidden = repo.append(ItemDraft::new("D", "4")).unwrap();

        assert!(matches!(
            mode.start_edit(hidden, &repo).unwrap_err(),
            StudyError::UnknownItem(id) if id == hidden
        ));
        assert!(mode.editing().is_none());
        assert!(matches!(
            mode.save_edit(&mut repo).unwrap_err(),
            StudyError::NotEditing
        ));
        assert_eq!(repo.get(hidden).unwrap().prompt(), "D");
    }

    #[test]
    fn save_with_empty_field_stays_editing() {
        let (mut repo, mut mode, _) = setup();
        let id = repo.get_at(2).unwrap().id();
        let before = repo.to_records();

        mode.start_edit(id, &repo).unwrap();
        mode.update_buffer("C", "   ").unwrap();
        let err = mode.save_edit(&mut repo).unwrap_err();

        assert!(matches!(
            err,
            StudyError::Validation(ItemValidationError::EmptyAnswer)
        ));
        assert_eq!(mode.editing().map(|b| b.id), Some(id));
        assert_eq!(repo.to_records(), before);
    }

    #[test]
    fn save_updates_only_that_item() {
        let (mut repo, mut mode, _) = setup();
        let id = repo.get_at(1).unwrap().id();

        mode.start_edit(id, &repo).unwrap();
        mode.update_buffer(" B2 ", "22").unwrap();
        assert_eq!(mode.save_edit(&mut repo).unwrap(), id);

        assert!(mode.editing().is_none());
        assert_eq!(
            repo.to_records(),
            vec![
                ItemRecord::new("A", "1"),
                ItemRecord::new("B2", "22"),
                ItemRecord::new("C", "3"),
            ]
        );
    }

    #[test]
    fn cancel_discards_changes() {
        let (mut repo, mut mode, _) = setup();
        let id = repo.get_at(0).unwrap().id();
        mode.start_edit(id, &repo).unwrap();
        mode.update_buffer("x", "y").unwrap();
        mode.cancel_edit();
        assert!(matches!(
            mode.save_edit(&mut repo).unwrap_err(),
            StudyError::NotEditing
        ));
        assert_eq!(repo.get(id).unwrap().prompt(), "A");
    }

    #[test]
    fn delete_requires_confirmation() {
        let (mut repo, mut mode, mut rng) = setup();
        let id = repo.get_at(0).unwrap().id();

        assert!(matches!(
            mode.confirm_delete(&mut repo).unwrap_err(),
            StudyError::NoPendingDelete
        ));

        assert_eq!(mode.request_delete(id, &repo).unwrap().prompt, "A");
        mode.cancel_delete();
        assert!(mode.confirm_delete(&mut repo).is_err());
        assert_eq!(repo.len(), 3);

        mode.request_delete(id, &repo).unwrap();
        let removed = mode.confirm_delete(&mut repo).unwrap();
        assert_eq!(removed.prompt(), "A");
        assert_eq!(repo.len(), 2);

        mode.render(&repo, &mut rng);
        assert_eq!(mode.views().len(), 2);
        assert!(mode.views().iter().all(|v| v.id != id));
    }
}
