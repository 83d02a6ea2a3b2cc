use thiserror::Error;

use crate::model::ids::ItemId;
use crate::model::item::{Item, ItemDraft, ItemRecord, ItemValidationError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ItemRepositoryError {
    #[error("unknown item {0}")]
    UnknownItem(ItemId),
    #[error(transparent)]
    Validation(#[from] ItemValidationError),
}

/// Ordered, mutable collection of items for the active dataset.
///
/// Insertion order is display order. Every item gets an `ItemId` on the way
/// in; mutations address items by id and resolve the position at call time,
/// so a stale sample can never edit the wrong row.
#[derive(Debug, Clone, Default)]
pub struct ItemRepository {
    items: Vec<Item>,
    next_id: u64,
}

impl ItemRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository from persisted records, keeping their order.
    ///
    /// Records are taken verbatim; validation applies to user edits only.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = ItemRecord>) -> Self {
        let mut repo = Self::new();
        repo.replace_all(records);
        repo
    }

    /// Drop every item and load `records` in order with fresh ids.
    ///
    /// Ids keep counting up from the previous contents so ids handed out
    /// before a reload never alias new items.
    pub fn replace_all(&mut self, records: impl IntoIterator<Item = ItemRecord>) {
        self.items.clear();
        for record in records {
            let id = self.allocate_id();
            self.items.push(Item::from_record(id, record));
        }
    }

    /// Validate and append a new item at the end.
    ///
    /// # Errors
    ///
    /// Returns `ItemRepositoryError::Validation` if either field is empty.
    pub fn append(&mut self, draft: ItemDraft) -> Result<ItemId, ItemRepositoryError> {
        let validated = draft.validate()?;
        let id = self.allocate_id();
        self.items.push(validated.assign_id(id));
        Ok(id)
    }

    /// Validate and replace the text of an existing item in place.
    ///
    /// # Errors
    ///
    /// Returns `ItemRepositoryError::UnknownItem` if `id` is not present, or
    /// `ItemRepositoryError::Validation` if either field is empty. The
    /// repository is unchanged on error.
    pub fn update(&mut self, id: ItemId, draft: ItemDraft) -> Result<(), ItemRepositoryError> {
        let position = self
            .position(id)
            .ok_or(ItemRepositoryError::UnknownItem(id))?;
        let validated = draft.validate()?;
        self.items[position].apply(validated);
        Ok(())
    }

    /// Remove an item, shifting later positions down by one.
    ///
    /// # Errors
    ///
    /// Returns `ItemRepositoryError::UnknownItem` if `id` is not present.
    pub fn remove(&mut self, id: ItemId) -> Result<Item, ItemRepositoryError> {
        let position = self
            .position(id)
            .ok_or(ItemRepositoryError::UnknownItem(id))?;
        Ok(self.items.remove(position))
    }

    #[must_use]
    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id() == id)
    }

    #[must_use]
    pub fn get_at(&self, position: usize) -> Option<&Item> {
        self.items.get(position)
    }

    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn to_records(&self) -> Vec<ItemRecord> {
        self.items.iter().map(Item::to_record).collect()
    }

    fn allocate_id(&mut self) -> ItemId {
        self.next_id += 1;
        ItemId::new(self.next_id)
    }
}

impl Item {
    fn from_record(id: ItemId, record: ItemRecord) -> Self {
        ItemDraft::from(record).into_unchecked().assign_id(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo_abcd() -> ItemRepository {
        ItemRepository::from_records([
            ItemRecord::new("A", "1"),
            ItemRecord::new("B", "2"),
            ItemRecord::new("C", "3"),
            ItemRecord::new("D", "4"),
        ])
    }

    #[test]
    fn append_assigns_distinct_ids_even_for_duplicate_text() {
        let mut repo = ItemRepository::new();
        let first = repo.append(ItemDraft::new("Q", "A")).unwrap();
        let second = repo.append(ItemDraft::new("Q", "A")).unwrap();
        assert_ne!(first, second);
        assert_eq!(repo.position(first), Some(0));
        assert_eq!(repo.position(second), Some(1));
    }

    #[test]
    fn append_rejects_empty_fields() {
        let mut repo = ItemRepository::new();
        let err = repo.append(ItemDraft::new("Q", "  ")).unwrap_err();
        assert_eq!(
            err,
            ItemRepositoryError::Validation(ItemValidationError::EmptyAnswer)
        );
        assert!(repo.is_empty());
    }

    #[test]
    fn update_changes_only_target_position() {
        let mut repo = repo_abcd();
        let before = repo.to_records();
        let target = repo.get_at(2).unwrap().id();

        repo.update(target, ItemDraft::new("C2", "33")).unwrap();

        let after = repo.to_records();
        assert_eq!(after[2], ItemRecord::new("C2", "33"));
        for position in [0, 1, 3] {
            assert_eq!(after[position], before[position]);
        }
        assert_eq!(repo.get(target).unwrap().prompt(), "C2");
    }

    #[test]
    fn update_with_empty_field_leaves_repository_unchanged() {
        let mut repo = repo_abcd();
        let before = repo.to_records();
        let target = repo.get_at(1).unwrap().id();

        let err = repo.update(target, ItemDraft::new("", "x")).unwrap_err();

        assert_eq!(
            err,
            ItemRepositoryError::Validation(ItemValidationError::EmptyPrompt)
        );
        assert_eq!(repo.to_records(), before);
    }

    #[test]
    fn remove_shifts_later_positions_down() {
        let mut repo = repo_abcd();
        let ids: Vec<ItemId> = repo.items().iter().map(Item::id).collect();

        let removed = repo.remove(ids[1]).unwrap();

        assert_eq!(removed.prompt(), "B");
        assert_eq!(repo.len(), 3);
        assert_eq!(repo.position(ids[0]), Some(0));
        assert_eq!(repo.position(ids[2]), Some(1));
        assert_eq!(repo.position(ids[3]), Some(2));
        assert_eq!(
            repo.to_records(),
            vec![
                ItemRecord::new("A", "1"),
                ItemRecord::new("C", "3"),
                ItemRecord::new("D", "4"),
            ]
        );
    }

    #[test]
    fn stale_id_is_rejected_after_remove() {
        let mut repo = repo_abcd();
        let id = repo.get_at(0).unwrap().id();
        repo.remove(id).unwrap();
        assert_eq!(repo.remove(id).unwrap_err(), ItemRepositoryError::UnknownItem(id));
    }

    #[test]
    fn reload_never_reuses_ids() {
        let mut repo = repo_abcd();
        let old = repo.get_at(0).unwrap().id();
        repo.replace_all([ItemRecord::new("Z", "26")]);
        assert!(repo.get(old).is_none());
        assert_ne!(repo.get_at(0).unwrap().id(), old);
    }
}
