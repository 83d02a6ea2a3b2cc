use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::ItemId;

//
// ─── ITEM TYPES ────────────────────────────────────────────────────────────────
//

/// Unvalidated prompt/answer text, as typed into an add or edit form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemDraft {
    pub prompt: String,
    pub answer: String,
}

impl ItemDraft {
    #[must_use]
    pub fn new(prompt: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            answer: answer.into(),
        }
    }

    /// Trim both fields and reject empty ones.
    ///
    /// # Errors
    ///
    /// Returns `ItemValidationError::EmptyPrompt` or `EmptyAnswer` when the
    /// trimmed field is empty. The prompt is checked first.
    pub fn validate(self) -> Result<ValidatedItem, ItemValidationError> {
        let prompt = self.prompt.trim();
        if prompt.is_empty() {
            return Err(ItemValidationError::EmptyPrompt);
        }
        let answer = self.answer.trim();
        if answer.is_empty() {
            return Err(ItemValidationError::EmptyAnswer);
        }
        Ok(ValidatedItem {
            prompt: prompt.to_owned(),
            answer: answer.to_owned(),
        })
    }

    /// Accept persisted text as-is.
    pub(crate) fn into_unchecked(self) -> ValidatedItem {
        ValidatedItem {
            prompt: self.prompt,
            answer: self.answer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedItem {
    prompt: String,
    answer: String,
}

impl ValidatedItem {
    #[must_use]
    pub fn assign_id(self, id: ItemId) -> Item {
        Item {
            id,
            prompt: self.prompt,
            answer: self.answer,
        }
    }
}

/// A question/answer pair owned by an `ItemRepository`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    id: ItemId,
    prompt: String,
    answer: String,
}

impl Item {
    #[must_use]
    pub fn id(&self) -> ItemId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub(crate) fn apply(&mut self, validated: ValidatedItem) {
        self.prompt = validated.prompt;
        self.answer = validated.answer;
    }

    #[must_use]
    pub fn to_record(&self) -> ItemRecord {
        ItemRecord {
            prompt: self.prompt.clone(),
            answer: self.answer.clone(),
        }
    }
}

/// Persisted and wire shape of an item.
///
/// Older seed documents name the fields `pergunta` / `resposta`; both
/// spellings are accepted on read, only the English names are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    #[serde(alias = "pergunta")]
    pub prompt: String,
    #[serde(alias = "resposta")]
    pub answer: String,
}

impl ItemRecord {
    #[must_use]
    pub fn new(prompt: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            answer: answer.into(),
        }
    }
}

impl From<ItemRecord> for ItemDraft {
    fn from(record: ItemRecord) -> Self {
        Self {
            prompt: record.prompt,
            answer: record.answer,
        }
    }
}

//
// ─── ITEM VALIDATION ERRORS ────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ItemValidationError {
    #[error("prompt must not be empty")]
    EmptyPrompt,
    #[error("answer must not be empty")]
    EmptyAnswer,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_fails_if_prompt_blank() {
        let err = ItemDraft::new("   ", "ok").validate().unwrap_err();
        assert_eq!(err, ItemValidationError::EmptyPrompt);
    }

    #[test]
    fn draft_fails_if_answer_blank() {
        let err = ItemDraft::new("ok", "\n").validate().unwrap_err();
        assert_eq!(err, ItemValidationError::EmptyAnswer);
    }

    #[test]
    fn draft_trims_text() {
        let item = ItemDraft::new("  What?  ", " That. ")
            .validate()
            .unwrap()
            .assign_id(ItemId::new(7));
        assert_eq!(item.prompt(), "What?");
        assert_eq!(item.answer(), "That.");
        assert_eq!(item.id(), ItemId::new(7));
    }

    #[test]
    fn record_accepts_legacy_field_names() {
        let json = r#"[{"pergunta":"Capital?","resposta":"Brasília"},{"prompt":"A","answer":"1"}]"#;
        let records: Vec<ItemRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records[0], ItemRecord::new("Capital?", "Brasília"));
        assert_eq!(records[1], ItemRecord::new("A", "1"));
    }

    #[test]
    fn record_serializes_english_names() {
        let json = serde_json::to_string(&ItemRecord::new("Q", "A")).unwrap();
        assert_eq!(json, r#"{"prompt":"Q","answer":"A"}"#);
    }
}
