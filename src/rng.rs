//! Random selection for roles, questions and answerers.
//!
//! The room never touches an RNG directly; it asks a [`Picker`]. Production
//! uses [`RandomPicker`] (optionally seeded), tests inject `ScriptedPicker`
//! (compiled for unit tests and behind the `test-support` feature).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform random choices
pub trait Picker: Send {
    /// Pick one index in `0..len`. `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;

    /// Pick `amount` distinct indices in `0..len` (`amount <= len`)
    fn sample(&mut self, len: usize, amount: usize) -> Vec<usize>;
}

/// `StdRng`-backed picker
pub struct RandomPicker {
    rng: StdRng,
}

impl RandomPicker {
    /// Seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible sequence of choices for a given seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl Picker for RandomPicker {
    fn pick(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }

    fn sample(&mut self, len: usize, amount: usize) -> Vec<usize> {
        rand::seq::index::sample(&mut self.rng, len, amount.min(len)).into_vec()
    }
}

#[cfg(any(test, feature = "test-support"))]
use std::collections::VecDeque;

/// Picker that replays a fixed list of choices.
///
/// `pick` returns the next scripted value (wrapped into range) and `0` once
/// the script runs out. `sample` always takes the first `amount` indices.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Default)]
pub struct ScriptedPicker {
    picks: VecDeque<usize>,
}

#[cfg(any(test, feature = "test-support"))]
impl ScriptedPicker {
    pub fn new(picks: impl IntoIterator<Item = usize>) -> Self {
        Self {
            picks: picks.into_iter().collect(),
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Picker for ScriptedPicker {
    fn pick(&mut self, len: usize) -> usize {
        self.picks.pop_front().map(|i| i % len).unwrap_or(0)
    }

    fn sample(&mut self, len: usize, amount: usize) -> Vec<usize> {
        (0..amount.min(len)).collect()
    }
}
