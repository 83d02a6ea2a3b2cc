mod dataset;
mod ids;
mod item;
mod rating;
mod repository;

pub use ids::{ItemId, ParseIdError};

pub use dataset::{DatasetError, DatasetSelector};
pub use item::{Item, ItemDraft, ItemRecord, ItemValidationError, ValidatedItem};
pub use rating::{DifficultyRating, NoopScheduler, RatingRecord, SchedulingDecision, SchedulingHook};
pub use repository::{ItemRepository, ItemRepositoryError};
