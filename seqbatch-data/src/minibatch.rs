// seqbatch-data/src/minibatch.rs

//! Minibatch results: per-stream padded data plus sequence masks.

use std::collections::HashMap;

use seqbatch_core::{BatchValue, DenseArray, Result, SeqBatchError};

use crate::streams::StreamInformation;

/// Mask value of the first sample of a sequence.
pub const SEQUENCE_START: u8 = 2;
/// Mask value of any further valid sample.
pub const VALID: u8 = 1;
/// Mask value of a padding slot.
pub const PADDING: u8 = 0;

/// Builds the mask row of a sequence of `len` samples padded to `max_len`.
pub(crate) fn mask_row(len: usize, max_len: usize) -> Vec<u8> {
    (0..max_len)
        .map(|t| match t {
            0 if len > 0 => SEQUENCE_START,
            t if t < len => VALID,
            _ => PADDING,
        })
        .collect()
}

/// The data of one stream within a minibatch.
///
/// `data` is shaped `(num_sequences, max_sequence_length, *sample_shape)`;
/// sequences shorter than the longest one are zero padded. `mask[i][t]`
/// tells whether slot `t` of sequence `i` starts the sequence, continues it,
/// or is padding.
#[derive(Debug, Clone, PartialEq)]
pub struct MinibatchData {
    data: BatchValue,
    mask: Vec<Vec<u8>>,
    num_sequences: usize,
    num_samples: usize,
    end_of_sweep: bool,
}

impl MinibatchData {
    pub(crate) fn from_parts(
        data: BatchValue,
        mask: Vec<Vec<u8>>,
        num_samples: usize,
        end_of_sweep: bool,
    ) -> Self {
        Self {
            num_sequences: mask.len(),
            data,
            mask,
            num_samples,
            end_of_sweep,
        }
    }

    /// Wraps user-provided data.
    ///
    /// Every sequence is assumed to fill the whole length axis, so the mask
    /// is derived from the shape. Use [`MinibatchData::with_mask`] for ragged
    /// batches.
    ///
    /// # Errors
    /// `SeqBatchError::ShapeMismatch` if `data` has fewer than two axes, if
    /// its first axis differs from `num_sequences`, or if `num_samples`
    /// exceeds the number of slots.
    pub fn new(data: BatchValue, num_sequences: usize, num_samples: usize, end_of_sweep: bool) -> Result<Self> {
        let shape = data.shape().to_vec();
        if shape.len() < 2 || shape[0] != num_sequences || num_samples > shape[0] * shape[1] {
            return Err(SeqBatchError::ShapeMismatch {
                expected: vec![num_sequences, num_samples],
                actual: shape,
                operation: "MinibatchData::new".to_string(),
            });
        }
        let max_len = shape[1];
        let mask = (0..num_sequences).map(|_| mask_row(max_len, max_len)).collect();
        Ok(Self::from_parts(data, mask, num_samples, end_of_sweep))
    }

    /// Replaces the mask.
    ///
    /// # Errors
    /// `SeqBatchError::ShapeMismatch` if the mask is not
    /// `num_sequences x max_sequence_length`.
    pub fn with_mask(mut self, mask: Vec<Vec<u8>>) -> Result<Self> {
        let max_len = self.max_sequence_length();
        if mask.len() != self.num_sequences || mask.iter().any(|row| row.len() != max_len) {
            return Err(SeqBatchError::ShapeMismatch {
                expected: vec![self.num_sequences, max_len],
                actual: vec![mask.len(), mask.first().map_or(0, Vec::len)],
                operation: "MinibatchData::with_mask".to_string(),
            });
        }
        self.mask = mask;
        Ok(self)
    }

    pub fn data(&self) -> &BatchValue {
        &self.data
    }

    pub fn mask(&self) -> &[Vec<u8>] {
        &self.mask
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn is_sparse(&self) -> bool {
        self.data.is_sparse()
    }

    pub fn num_sequences(&self) -> usize {
        self.num_sequences
    }

    /// Number of valid (non-padding) samples.
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Whether this minibatch consumed the last sequence of a sweep.
    pub fn end_of_sweep(&self) -> bool {
        self.end_of_sweep
    }

    pub fn max_sequence_length(&self) -> usize {
        self.shape().get(1).copied().unwrap_or(0)
    }

    /// Padded dense view of the data.
    pub fn as_dense(&self) -> DenseArray {
        self.data.to_dense()
    }

    /// Length of every sequence, read off the mask.
    pub fn sequence_lengths(&self) -> Vec<usize> {
        self.mask
            .iter()
            .map(|row| row.iter().filter(|&&m| m != PADDING).count())
            .collect()
    }

    /// The unpadded sequences, each shaped `(length, *sample_shape)`.
    pub fn sequences(&self) -> Result<Vec<DenseArray>> {
        let dense = self.as_dense();
        self.sequence_lengths()
            .into_iter()
            .enumerate()
            .map(|(i, len)| dense.sub_sequence(i, len))
            .collect()
    }
}

/// One minibatch: the data of every stream of the source, keyed by stream.
///
/// An empty minibatch signals that the epoch is exhausted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Minibatch {
    streams: HashMap<StreamInformation, MinibatchData>,
}

impl Minibatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, info: StreamInformation, data: MinibatchData) {
        self.streams.insert(info, data);
    }

    /// # Errors
    /// `SeqBatchError::Lookup` if the stream is not part of this minibatch.
    pub fn get(&self, info: &StreamInformation) -> Result<&MinibatchData> {
        self.streams
            .get(info)
            .ok_or_else(|| SeqBatchError::lookup(info.name()))
    }

    /// Looks a stream up by name.
    ///
    /// # Errors
    /// `SeqBatchError::Lookup` if no stream or more than one stream has
    /// that name.
    pub fn by_name(&self, name: &str) -> Result<&MinibatchData> {
        let mut found = self.streams.iter().filter(|(info, _)| info.name() == name);
        match (found.next(), found.next()) {
            (Some((_, data)), None) => Ok(data),
            _ => Err(SeqBatchError::lookup(name)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StreamInformation, &MinibatchData)> {
        self.streams.iter()
    }

    pub fn into_inner(self) -> HashMap<StreamInformation, MinibatchData> {
        self.streams
    }
}

impl FromIterator<(StreamInformation, MinibatchData)> for Minibatch {
    fn from_iter<I: IntoIterator<Item = (StreamInformation, MinibatchData)>>(iter: I) -> Self {
        Self {
            streams: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
#[path = "minibatch_test.rs"]
mod tests;
