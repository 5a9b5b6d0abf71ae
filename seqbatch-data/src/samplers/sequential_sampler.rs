// seqbatch-data/src/samplers/sequential_sampler.rs

use super::traits::Sampler;

/// Visits sequences in file order, identically on every sweep.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialSampler;

impl SequentialSampler {
    /// Creates a new `SequentialSampler`.
    pub fn new() -> Self {
        SequentialSampler
    }
}

impl Sampler for SequentialSampler {
    fn sweep_order(&self, _sweep_index: usize, sequence_lengths: &[usize]) -> Vec<usize> {
        (0..sequence_lengths.len()).collect()
    }
}

#[cfg(test)]
#[path = "sequential_sampler_test.rs"]
mod tests;
