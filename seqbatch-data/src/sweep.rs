// seqbatch-data/src/sweep.rs

//! Cursor over the logical, possibly infinitely repeating, data stream.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::EpochSize;
use crate::samplers::Sampler;

/// Position of a source's cursor. Shared by all streams of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepState {
    /// Budget samples delivered since the start (or last restart).
    pub position: usize,
    pub sweep_index: usize,
    /// Sequences of the current sweep already delivered.
    pub offset_in_sweep: usize,
}

/// Tracks the cursor, wraps into new sweeps and enforces the epoch size.
#[derive(Debug)]
pub struct SweepTracker {
    epoch_size: EpochSize,
    state: SweepState,
    order: Option<Vec<usize>>,
}

impl SweepTracker {
    pub fn new(epoch_size: EpochSize) -> Self {
        Self {
            epoch_size,
            state: SweepState::default(),
            order: None,
        }
    }

    pub fn state(&self) -> SweepState {
        self.state
    }

    /// Moves the cursor to a saved position. The sweep order is recomputed
    /// from the sampler on next use.
    pub fn restore(&mut self, state: SweepState) {
        self.state = state;
        self.order = None;
    }

    pub fn restart(&mut self) {
        self.restore(SweepState::default());
    }

    /// Samples still allowed in the epoch, if the epoch is sample-bounded.
    pub fn remaining_in_epoch(&self) -> Option<usize> {
        match self.epoch_size {
            EpochSize::Samples(n) => Some(n.saturating_sub(self.state.position)),
            _ => None,
        }
    }

    /// Index (into `sequence_lengths`) of the next sequence to deliver, or
    /// `None` once the epoch is exhausted or there is no data.
    pub fn peek(&mut self, sampler: &dyn Sampler, sequence_lengths: &[usize]) -> Option<usize> {
        if sequence_lengths.is_empty() || self.remaining_in_epoch() == Some(0) {
            return None;
        }

        let sweep_index = self.state.sweep_index;
        let order = self
            .order
            .get_or_insert_with(|| sampler.sweep_order(sweep_index, sequence_lengths));
        if self.state.offset_in_sweep >= order.len() {
            if self.epoch_size == EpochSize::FullDataSweep {
                return None;
            }
            self.state.sweep_index += 1;
            self.state.offset_in_sweep = 0;
            *order = sampler.sweep_order(self.state.sweep_index, sequence_lengths);
            debug!("SweepTracker: entering sweep {}", self.state.sweep_index);
        }
        order.get(self.state.offset_in_sweep).copied()
    }

    /// Consumes the sequence returned by the last `peek`.
    ///
    /// Returns `true` if it was the last sequence of its sweep.
    pub fn advance(&mut self, length: usize) -> bool {
        self.state.position += length;
        self.state.offset_in_sweep += 1;
        let sweep_len = self.order.as_ref().map_or(0, Vec::len);
        self.state.offset_in_sweep >= sweep_len
    }
}

#[cfg(test)]
#[path = "sweep_test.rs"]
mod tests;
