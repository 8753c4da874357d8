//! Unconstrained random sampling over the flat node list.

use crate::index::SyntaxIndex;
use crate::selection::{Candidate, SelectionStrategy};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use std::time::{SystemTime, UNIX_EPOCH};

/// Number of candidates selected when the caller passes a non-positive count.
pub const DEFAULT_CANDIDATE_COUNT: usize = 5;

/// Strategy that shuffles the index's flat node list and takes a prefix.
pub struct RandomStrategy {
    rng: Pcg64,
}

impl RandomStrategy {
    /// Create a strategy with a fixed seed.  Two strategies built from the same seed
    /// select identical candidates from identical indexes.
    ///
    /// # Arguments
    ///
    /// * `seed` - The seed value for the random number generator.
    pub fn new(seed: u64) -> RandomStrategy {
        RandomStrategy {
            rng: Pcg64::seed_from_u64(seed),
        }
    }

    /// Create a strategy seeded from the system clock.
    pub fn from_time() -> RandomStrategy {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        RandomStrategy::new(since_epoch.as_nanos() as u64)
    }

    /// Select up to `count` random candidates from `index`.  A non-positive `count`
    /// selects [`DEFAULT_CANDIDATE_COUNT`]; when the index holds fewer nodes than
    /// requested, every node is returned.
    ///
    /// # Arguments
    ///
    /// * `index` - The index to draw candidates from.
    /// * `count` - The requested number of candidates.
    pub fn select(&mut self, index: &SyntaxIndex<'_>, count: i64) -> Vec<Candidate> {
        let mut all = index.primary_nodes().to_vec();
        if all.is_empty() {
            return Vec::new();
        }
        let wanted = if count > 0 {
            count as usize
        } else {
            DEFAULT_CANDIDATE_COUNT
        };
        all.shuffle(&mut self.rng);
        all.truncate(wanted.min(all.len()));
        all.into_iter()
            .map(|node| Candidate::new(index, node))
            .collect()
    }
}

impl SelectionStrategy for RandomStrategy {
    fn name(&self) -> &'static str {
        "random"
    }
}
