//! Session sampling: the bounded, shuffled subset a mode renders from.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::model::Item;

/// Maximum number of items shown in one rendering pass.
pub const MAX_ITEMS: usize = 51;

/// Shuffle a copy of `items` with the thread RNG and keep the first
/// `MAX_ITEMS`.
#[must_use]
pub fn sample(items: &[Item]) -> Vec<Item> {
    sample_with(items, &mut rand::rng())
}

/// Same as [`sample`] with a caller-provided RNG.
#[must_use]
pub fn sample_with<R: Rng + ?Sized>(items: &[Item], rng: &mut R) -> Vec<Item> {
    let mut copy = items.to_vec();
    copy.shuffle(rng);
    copy.truncate(MAX_ITEMS);
    copy
}
