// seqbatch-data/src/samplers/random_sampler.rs

use super::traits::Sampler;
use log::trace;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Window size meaning "the whole sweep".
pub const WHOLE_SWEEP: usize = usize::MAX;

/// A sampler that shuffles sequences within randomization windows.
///
/// The sweep is cut into consecutive windows of `window` sequences (or
/// `window` samples when `sample_based` is set). Window order is shuffled,
/// then sequences within each window. The shuffle is seeded from
/// `(seed, sweep_index)`, so every sweep gets a different but reproducible
/// order.
#[derive(Debug, Clone)]
pub struct RandomSampler {
    seed: u64,
    window: usize,
    sample_based: bool,
}

impl RandomSampler {
    /// Creates a new `RandomSampler`.
    ///
    /// # Arguments
    ///
    /// * `seed`: Base seed of the shuffles.
    /// * `window`: Randomization window size; `WHOLE_SWEEP` shuffles the full sweep. Zero is treated as one.
    /// * `sample_based`: If `true`, `window` counts samples instead of sequences.
    pub fn new(seed: u64, window: usize, sample_based: bool) -> Self {
        RandomSampler {
            seed,
            window: window.max(1),
            sample_based,
        }
    }

    fn windows(&self, sequence_lengths: &[usize]) -> Vec<Vec<usize>> {
        let mut windows = Vec::new();
        let mut current = Vec::new();
        let mut filled = 0usize;
        for (i, &len) in sequence_lengths.iter().enumerate() {
            current.push(i);
            filled = filled.saturating_add(if self.sample_based { len } else { 1 });
            if filled >= self.window {
                windows.push(std::mem::take(&mut current));
                filled = 0;
            }
        }
        if !current.is_empty() {
            windows.push(current);
        }
        windows
    }
}

// splitmix64 finalizer over the base seed and the sweep index.
fn sweep_seed(seed: u64, sweep_index: usize) -> u64 {
    let mut z = seed ^ (sweep_index as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

impl Sampler for RandomSampler {
    fn sweep_order(&self, sweep_index: usize, sequence_lengths: &[usize]) -> Vec<usize> {
        if sequence_lengths.is_empty() {
            return Vec::new();
        }

        let mut rng = StdRng::seed_from_u64(sweep_seed(self.seed, sweep_index));
        let mut windows = self.windows(sequence_lengths);
        windows.shuffle(&mut rng);
        for window in &mut windows {
            window.shuffle(&mut rng);
        }
        trace!(
            "RandomSampler: sweep {} shuffled in {} windows",
            sweep_index,
            windows.len()
        );
        windows.into_iter().flatten().collect()
    }
}

#[cfg(test)]
#[path = "random_sampler_test.rs"]
mod tests;
