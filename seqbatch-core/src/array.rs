use crate::error::{Result, SeqBatchError};

/// Computes contiguous (row-major) strides for a shape.
pub fn calculate_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![0; shape.len()];
    if shape.is_empty() {
        return strides;
    }
    strides[shape.len() - 1] = 1;
    for i in (0..shape.len() - 1).rev() {
        strides[i] = strides[i + 1] * shape[i + 1].max(1);
    }
    strides
}

/// A dense, row-major array of `f32` values.
///
/// Minibatch payloads for dense streams are stored as `DenseArray`s shaped
/// `(num_sequences, max_sequence_length, *sample_shape)`.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseArray {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl DenseArray {
    /// Creates an array from flattened row-major data.
    ///
    /// # Errors
    /// Returns `SeqBatchError::TensorCreationError` if the length of `data` does not
    /// match the number of elements described by `shape`.
    pub fn new(data: Vec<f32>, shape: Vec<usize>) -> Result<Self> {
        let numel: usize = shape.iter().product();
        if data.len() != numel {
            return Err(SeqBatchError::TensorCreationError {
                data_len: data.len(),
                shape,
            });
        }
        Ok(Self { shape, data })
    }

    pub fn zeros(shape: Vec<usize>) -> Self {
        let numel = shape.iter().product();
        Self {
            data: vec![0.0; numel],
            shape,
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn numel(&self) -> usize {
        self.data.len()
    }

    pub fn strides(&self) -> Vec<usize> {
        calculate_strides(&self.shape)
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    fn offset_of(&self, index: &[usize]) -> Result<usize> {
        if index.len() != self.shape.len() || index.iter().zip(&self.shape).any(|(i, d)| i >= d) {
            return Err(SeqBatchError::IndexOutOfBounds {
                index: index.to_vec(),
                shape: self.shape.clone(),
            });
        }
        Ok(index
            .iter()
            .zip(self.strides())
            .map(|(i, stride)| i * stride)
            .sum())
    }

    /// Returns the element at a full multi-dimensional index.
    pub fn get(&self, index: &[usize]) -> Result<f32> {
        Ok(self.data[self.offset_of(index)?])
    }

    pub fn set(&mut self, index: &[usize], value: f32) -> Result<()> {
        let offset = self.offset_of(index)?;
        self.data[offset] = value;
        Ok(())
    }

    /// Returns the contiguous block at position `i` along the first axis.
    pub fn outer(&self, i: usize) -> Result<&[f32]> {
        let rows = self.shape.first().copied().unwrap_or(0);
        if i >= rows {
            return Err(SeqBatchError::IndexOutOfBounds {
                index: vec![i],
                shape: self.shape.clone(),
            });
        }
        let block: usize = self.shape[1..].iter().product();
        Ok(&self.data[i * block..(i + 1) * block])
    }

    /// Copies the first `len` entries along axis 1 of block `i` (axis 0) into a
    /// new array shaped `(len, *shape[2..])`.
    pub fn sub_sequence(&self, i: usize, len: usize) -> Result<DenseArray> {
        if self.rank() < 2 || len > self.shape[1] {
            return Err(SeqBatchError::ShapeMismatch {
                expected: vec![i, len],
                actual: self.shape.clone(),
                operation: "DenseArray::sub_sequence".to_string(),
            });
        }
        let sample: usize = self.shape[2..].iter().product();
        let block = self.outer(i)?;
        let mut shape = vec![len];
        shape.extend_from_slice(&self.shape[2..]);
        DenseArray::new(block[..len * sample].to_vec(), shape)
    }
}

#[cfg(test)]
#[path = "array_test.rs"]
mod tests;
