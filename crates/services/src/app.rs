//! Top-level application state: the active dataset, the item repository,
//! the four modes and the notices raised for the user.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use storage::repository::ItemStore;
use study_core::Clock;
use study_core::model::{
    DatasetSelector, DifficultyRating, Item, ItemDraft, ItemId, ItemRepository, RatingRecord,
    SchedulingHook,
};
use study_core::quiz::{QuizResult, TruthLabel};
use study_core::sample_with;

use crate::error::StudyError;
use crate::loader::{DatasetLoader, SeedSource};
use crate::modes::{
    FlashcardMode, MultipleChoiceMode, PendingDelete, TimedWritingConfig, TimedWritingController,
    Transition, TrueFalseMode, ViewObserver,
};
use crate::notice::Notice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Flashcards,
    MultipleChoice,
    TrueFalse,
    TimedWriting,
    Add,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Flashcards,
        Tab::MultipleChoice,
        Tab::TrueFalse,
        Tab::TimedWriting,
        Tab::Add,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Tab::Flashcards => "Flashcards",
            Tab::MultipleChoice => "Multiple choice",
            Tab::TrueFalse => "True or false",
            Tab::TimedWriting => "Timed writing",
            Tab::Add => "Add item",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flashcards" | "cards" | "fc" => Ok(Tab::Flashcards),
            "choice" | "multiple-choice" | "mc" => Ok(Tab::MultipleChoice),
            "true-false" | "truefalse" | "tf" => Ok(Tab::TrueFalse),
            "writing" | "timed-writing" | "tw" => Ok(Tab::TimedWriting),
            "add" => Ok(Tab::Add),
            other => Err(format!("unknown tab: {other}")),
        }
    }
}

/// Knobs for `StudyApp::init`.
#[derive(Clone)]
pub struct StudyOptions {
    pub clock: Clock,
    pub writing: TimedWritingConfig,
    /// Fixed seed for every sampling pass; fresh entropy when `None`.
    pub seed: Option<u64>,
    pub scheduler: Option<Arc<dyn SchedulingHook>>,
    /// Receives a view after every writing timer tick.
    pub observer: Option<ViewObserver>,
}

impl Default for StudyOptions {
    fn default() -> Self {
        Self {
            clock: Clock::system(),
            writing: TimedWritingConfig::default(),
            seed: None,
            scheduler: None,
            observer: None,
        }
    }
}

pub struct StudyApp {
    selector: DatasetSelector,
    repo: ItemRepository,
    store: ItemStore,
    loader: DatasetLoader,
    active: Tab,
    flashcards: FlashcardMode,
    choice: MultipleChoiceMode,
    true_false: TrueFalseMode,
    writing: TimedWritingController,
    notices: Vec<Notice>,
    rng: StdRng,
}

impl StudyApp {
    /// Restore the persisted dataset choice, load it and render every mode.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn init(store: ItemStore, source: Arc<dyn SeedSource>, options: StudyOptions) -> Self {
        let selector = match store.load_selector().await {
            Ok(selector) => selector.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(%err, "could not read dataset selector, using default");
                DatasetSelector::default()
            }
        };

        let mut writing = TimedWritingController::new(options.writing, options.clock);
        if let Some(scheduler) = options.scheduler {
            writing = writing.with_scheduler(scheduler);
        }
        if let Some(observer) = options.observer {
            writing = writing.with_observer(observer);
        }
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };

        let mut app = Self {
            selector,
            repo: ItemRepository::new(),
            loader: DatasetLoader::new(store.clone(), source),
            store,
            active: Tab::Flashcards,
            flashcards: FlashcardMode::new(),
            choice: MultipleChoiceMode::new(),
            true_false: TrueFalseMode::new(),
            writing,
            notices: Vec::new(),
            rng,
        };
        app.reload().await;
        app.render_all();
        app
    }

    async fn reload(&mut self) {
        let outcome = self.loader.load(self.selector).await;
        tracing::info!(
            dataset = self.selector.key(),
            origin = ?outcome.origin,
            count = outcome.items.len(),
            "dataset loaded"
        );
        if let Some(err) = &outcome.error {
            self.notices.push(Notice::blocking(format!(
                "Could not load the {} dataset. Check that {} exists. ({err})",
                self.selector.label().to_uppercase(),
                outcome.location
            )));
        }
        self.repo.replace_all(outcome.items);
    }

    fn render_all(&mut self) {
        self.flashcards.render(&self.repo, &mut self.rng);
        self.choice.render(&self.repo, &mut self.rng);
        self.true_false.render(&self.repo, &mut self.rng);
        self.writing
            .render(sample_with(self.repo.items(), &mut self.rng));
    }

    fn render_active(&mut self) {
        match self.active {
            Tab::Flashcards => self.flashcards.render(&self.repo, &mut self.rng),
            Tab::MultipleChoice => self.choice.render(&self.repo, &mut self.rng),
            Tab::TrueFalse => self.true_false.render(&self.repo, &mut self.rng),
            Tab::TimedWriting => self
                .writing
                .render(sample_with(self.repo.items(), &mut self.rng)),
            Tab::Add => {}
        }
    }

    async fn persist(&mut self) -> Result<(), StudyError> {
        let records = self.repo.to_records();
        if let Err(err) = self.store.save_items(self.selector, &records).await {
            tracing::warn!(dataset = self.selector.key(), %err, "could not save items");
            self.notices
                .push(Notice::error(format!("Could not save changes: {err}")));
            return Err(err.into());
        }
        Ok(())
    }

    /// Activate `tab` and render it from a fresh sample.
    pub fn show_tab(&mut self, tab: Tab) {
        tracing::debug!(%tab, "show tab");
        self.active = tab;
        self.render_active();
    }

    /// Toggle to the other dataset, persist the choice and rebuild everything.
    pub async fn switch_dataset(&mut self) -> DatasetSelector {
        self.writing.teardown();
        self.selector = self.selector.other();
        if let Err(err) = self.store.save_selector(self.selector).await {
            tracing::warn!(%err, "could not persist dataset selector");
            self.notices
                .push(Notice::error(format!("Could not remember the dataset choice: {err}")));
        }
        tracing::info!(dataset = self.selector.key(), "switching dataset");

        self.reload().await;
        self.active = Tab::Flashcards;
        self.render_all();
        self.notices.push(Notice::info(format!(
            "Dataset switched to: {}",
            self.selector.label().to_uppercase()
        )));
        self.selector
    }

    #[must_use]
    pub fn switch_label(&self) -> String {
        format!("Switch to: {}", self.selector.other().label().to_uppercase())
    }

    /// Validate and append a new item, then persist and re-render the active tab.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::Validation` with the repository untouched, or
    /// `StudyError::Storage` if the write fails. A failed write keeps the
    /// item in memory and the tab is re-rendered either way.
    pub async fn add_item(
        &mut self,
        prompt: impl Into<String>,
        answer: impl Into<String>,
    ) -> Result<ItemId, StudyError> {
        let id = match self.repo.append(ItemDraft::new(prompt, answer)) {
            Ok(id) => id,
            Err(err) => {
                self.notices
                    .push(Notice::error("Please fill in both the prompt and the answer."));
                return Err(err.into());
            }
        };
        let persisted = self.persist().await;
        self.render_active();
        persisted?;
        self.notices.push(Notice::info("Item added"));
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns `StudyError::UnknownItem` if `id` is not a displayed card.
    pub fn start_edit(&mut self, id: ItemId) -> Result<(), StudyError> {
        self.flashcards.start_edit(id, &self.repo)
    }

    /// # Errors
    ///
    /// Returns `StudyError::NotEditing` if no edit is open.
    pub fn update_edit(
        &mut self,
        prompt: impl Into<String>,
        answer: impl Into<String>,
    ) -> Result<(), StudyError> {
        self.flashcards.update_buffer(prompt, answer)
    }

    /// Write the open edit back to the repository.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::Validation` and keeps the edit open when a field
    /// is empty; `StudyError::NotEditing`, `StudyError::UnknownItem` or
    /// `StudyError::Storage` otherwise.
    pub async fn save_edit(&mut self) -> Result<ItemId, StudyError> {
        let id = match self.flashcards.save_edit(&mut self.repo) {
            Ok(id) => id,
            Err(err @ StudyError::Validation(_)) => {
                self.notices
                    .push(Notice::error("Prompt and answer must not be empty."));
                return Err(err);
            }
            Err(err) => return Err(err),
        };
        let persisted = self.persist().await;
        self.render_active();
        persisted?;
        self.notices.push(Notice::info("Item updated"));
        Ok(id)
    }

    pub fn cancel_edit(&mut self) {
        self.flashcards.cancel_edit();
    }

    /// # Errors
    ///
    /// Returns `StudyError::UnknownItem` if `id` is not loaded.
    pub fn flip(&mut self, id: ItemId) -> Result<(), StudyError> {
        self.flashcards.flip(id).map(|_| ())
    }

    /// Start a delete; returns the confirmation question to show.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::UnknownItem` if `id` is not loaded.
    pub fn request_delete(&mut self, id: ItemId) -> Result<String, StudyError> {
        let pending = self.flashcards.request_delete(id, &self.repo)?;
        Ok(format!(
            "Are you sure you want to delete the item \"{}\"?",
            pending.prompt
        ))
    }

    /// # Errors
    ///
    /// Returns `StudyError::NoPendingDelete`, `StudyError::UnknownItem` or
    /// `StudyError::Storage`.
    pub async fn confirm_delete(&mut self) -> Result<Item, StudyError> {
        let removed = self.flashcards.confirm_delete(&mut self.repo)?;
        let persisted = self.persist().await;
        self.show_tab(Tab::Flashcards);
        persisted?;
        self.notices.push(Notice::info("Item deleted"));
        Ok(removed)
    }

    pub fn cancel_delete(&mut self) {
        self.flashcards.cancel_delete();
    }

    /// # Errors
    ///
    /// Returns `StudyError::UnknownQuestion` or `StudyError::UnknownOption`.
    pub fn select_choice(&mut self, question: usize, option: usize) -> Result<(), StudyError> {
        self.choice.select(question, option)
    }

    pub fn check_choice(&mut self) -> Option<&QuizResult> {
        self.choice.check()
    }

    /// # Errors
    ///
    /// Returns `StudyError::UnknownQuestion` if `question` is out of range.
    pub fn select_truth(&mut self, question: usize, answer: TruthLabel) -> Result<(), StudyError> {
        self.true_false.select(question, Some(answer))
    }

    pub fn check_true_false(&mut self) -> Option<&QuizResult> {
        self.true_false.check()
    }

    pub fn submit_writing(&mut self, text: impl Into<String>) -> Transition {
        self.writing.submit(text)
    }

    /// # Errors
    ///
    /// Returns `StudyError::InvalidState` unless an answer is revealed.
    pub fn rate_writing(&mut self, rating: DifficultyRating) -> Result<RatingRecord, StudyError> {
        self.writing.rate(rating)
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    #[must_use]
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn teardown(&mut self) {
        self.writing.teardown();
    }

    #[must_use]
    pub fn selector(&self) -> DatasetSelector {
        self.selector
    }

    #[must_use]
    pub fn active_tab(&self) -> Tab {
        self.active
    }

    #[must_use]
    pub fn repository(&self) -> &ItemRepository {
        &self.repo
    }

    #[must_use]
    pub fn flashcards(&self) -> &FlashcardMode {
        &self.flashcards
    }

    #[must_use]
    pub fn pending_delete(&self) -> Option<&PendingDelete> {
        self.flashcards.pending_delete()
    }

    #[must_use]
    pub fn multiple_choice(&self) -> &MultipleChoiceMode {
        &self.choice
    }

    #[must_use]
    pub fn true_false(&self) -> &TrueFalseMode {
        &self.true_false
    }

    #[must_use]
    pub fn writing(&self) -> &TimedWritingController {
        &self.writing
    }
}
