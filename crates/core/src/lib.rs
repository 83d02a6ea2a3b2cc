#![forbid(unsafe_code)]

pub mod model;
pub mod quiz;
pub mod sampler;
pub mod time;

pub use sampler::{MAX_ITEMS, sample, sample_with};
pub use time::Clock;
