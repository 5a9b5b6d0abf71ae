// seqbatch-data/src/packer.rs

//! Minibatch packing: picking whole sequences under a sample budget and
//! laying them out as padded per-stream arrays.

use log::trace;

use seqbatch_core::{BatchValue, DenseArray, Result, SeqBatchError, SparseArray};

use crate::minibatch::{mask_row, Minibatch, MinibatchData};
use crate::samplers::Sampler;
use crate::sequence::{SampleData, SequenceGroup};
use crate::streams::StreamInformation;
use crate::sweep::SweepTracker;

/// Sequences chosen for one minibatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Indices into the sweep's sequence list, in delivery order.
    pub indices: Vec<usize>,
    /// Whether the last sequence of a sweep was consumed.
    pub end_of_sweep: bool,
    /// Budget samples consumed.
    pub samples: usize,
}

/// Picks whole sequences for a minibatch of `size` samples.
///
/// A sequence is taken if the batch is still empty or if it fits into the
/// remaining budget; selection stops once the budget is reached, the next
/// sequence does not fit, or the epoch ends.
pub fn select(tracker: &mut SweepTracker, sampler: &dyn Sampler, lengths: &[usize], size: usize) -> Selection {
    let mut selection = Selection::default();
    while selection.samples < size {
        let Some(index) = tracker.peek(sampler, lengths) else {
            break;
        };
        let len = lengths[index];
        let budget = tracker
            .remaining_in_epoch()
            .map_or(size, |remaining| size.min(selection.samples + remaining));
        if !selection.indices.is_empty() && selection.samples + len > budget {
            break;
        }
        selection.end_of_sweep |= tracker.advance(len);
        selection.indices.push(index);
        selection.samples += len;
    }
    trace!(
        "select: {} sequences, {} samples, end_of_sweep={}",
        selection.indices.len(),
        selection.samples,
        selection.end_of_sweep
    );
    selection
}

fn sparse_entries(sample: &SampleData) -> Vec<(usize, f32)> {
    match sample {
        SampleData::Sparse(entries) => entries.clone(),
        SampleData::Dense(values) => values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0.0)
            .map(|(i, v)| (i, *v))
            .collect(),
    }
}

fn write_dense(sample: &SampleData, out: &mut [f32], stream: &str) -> Result<()> {
    match sample {
        SampleData::Dense(values) => {
            if values.len() != out.len() {
                return Err(SeqBatchError::ShapeMismatch {
                    expected: vec![out.len()],
                    actual: vec![values.len()],
                    operation: format!("pack stream '{}'", stream),
                });
            }
            out.copy_from_slice(values);
        }
        SampleData::Sparse(entries) => {
            let width = out.len();
            for &(i, v) in entries {
                let slot = out.get_mut(i).ok_or_else(|| SeqBatchError::IndexOutOfBounds {
                    index: vec![i],
                    shape: vec![width],
                })?;
                *slot = v;
            }
        }
    }
    Ok(())
}

fn stream_samples<'a>(group: &'a SequenceGroup, name: &str) -> &'a [SampleData] {
    match group.stream(name) {
        Some(sequence) => &sequence.samples,
        None => &[],
    }
}

fn pack_stream(info: &StreamInformation, groups: &[&SequenceGroup], end_of_sweep: bool) -> Result<MinibatchData> {
    let name = info.name();
    let lengths: Vec<usize> = groups.iter().map(|g| g.stream_len(name)).collect();
    let max_len = lengths.iter().copied().max().unwrap_or(0);
    let num_samples = lengths.iter().sum();
    let dim = info.sample_dim();

    let mut shape = vec![groups.len(), max_len];
    shape.extend_from_slice(info.sample_shape());
    let mask = lengths.iter().map(|&len| mask_row(len, max_len)).collect();

    let data = if info.is_sparse() {
        let mut rows = Vec::with_capacity(groups.len() * max_len);
        for group in groups {
            let seq = stream_samples(group, name);
            rows.extend(seq.iter().map(sparse_entries));
            rows.extend(std::iter::repeat(Vec::new()).take(max_len - seq.len()));
        }
        BatchValue::Sparse(SparseArray::from_rows(shape, &rows)?)
    } else {
        let mut array = DenseArray::zeros(shape);
        let block = max_len * dim;
        let buffer = array.data_mut();
        for (i, group) in groups.iter().enumerate() {
            for (t, sample) in stream_samples(group, name).iter().enumerate() {
                let start = i * block + t * dim;
                write_dense(sample, &mut buffer[start..start + dim], name)?;
            }
        }
        BatchValue::Dense(array)
    };

    Ok(MinibatchData::from_parts(data, mask, num_samples, end_of_sweep))
}

/// Lays the selected sequence groups out as one minibatch.
///
/// Row `i` of every stream comes from `groups[i]`. Each stream is padded to
/// its own longest selected sequence.
///
/// # Errors
/// `SeqBatchError::ShapeMismatch` if a dense sample does not match the
/// stream's sample dimension.
pub fn pack(streams: &[StreamInformation], groups: &[&SequenceGroup], end_of_sweep: bool) -> Result<Minibatch> {
    streams
        .iter()
        .map(|info| Ok((info.clone(), pack_stream(info, groups, end_of_sweep)?)))
        .collect()
}

#[cfg(test)]
#[path = "packer_test.rs"]
mod tests;
