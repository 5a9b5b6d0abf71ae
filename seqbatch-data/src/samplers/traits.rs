// seqbatch-data/src/samplers/traits.rs

use std::fmt::Debug;

/// A Sampler decides the order in which the sequences of one sweep are
/// visited.
///
/// Samplers are used by the sweep tracker of a `MinibatchSource`. The order
/// must be a pure function of its inputs so that a sweep can be replayed
/// after a restart or checkpoint restore.
pub trait Sampler: Debug + Send + Sync {
    /// Returns a permutation of `0..sequence_lengths.len()`.
    ///
    /// # Arguments
    ///
    /// * `sweep_index` - Index of the sweep being ordered.
    /// * `sequence_lengths` - Budget length of every sequence, in file order.
    fn sweep_order(&self, sweep_index: usize, sequence_lengths: &[usize]) -> Vec<usize>;
}
