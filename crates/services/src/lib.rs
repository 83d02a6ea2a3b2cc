#![forbid(unsafe_code)]

pub mod app;
pub mod error;
pub mod loader;
pub mod modes;
pub mod notice;
pub mod timer;

pub use study_core::Clock;

pub use app::{StudyApp, StudyOptions, Tab};
pub use error::{LoadError, StudyError};
pub use loader::{
    DatasetLoader, DatasetPaths, FileSeedSource, HttpSeedSource, LoadOrigin, LoadOutcome,
    SeedSource, StaticSeedSource,
};
pub use notice::{Notice, NoticeLevel};
pub use timer::{Countdown, TimerHandle};
