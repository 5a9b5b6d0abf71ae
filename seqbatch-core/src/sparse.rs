use crate::array::DenseArray;
use crate::error::{Result, SeqBatchError};

/// A sparse array in compressed-row form.
///
/// All axes but the last are flattened into rows; the last axis is the
/// column (feature) axis. Row `r` holds the non-zeros
/// `indices[row_offsets[r]..row_offsets[r + 1]]` with matching `values`.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseArray {
    shape: Vec<usize>,
    row_offsets: Vec<usize>,
    indices: Vec<usize>,
    values: Vec<f32>,
}

impl SparseArray {
    /// Builds a sparse array from per-row `(column, value)` entries.
    ///
    /// # Errors
    /// Fails with `ShapeMismatch` if the number of rows does not match `shape`
    /// and with `IndexOutOfBounds` if a column exceeds the last axis.
    pub fn from_rows(shape: Vec<usize>, rows: &[Vec<(usize, f32)>]) -> Result<Self> {
        let (num_rows, num_cols) = Self::split_shape(&shape)?;
        if rows.len() != num_rows {
            return Err(SeqBatchError::ShapeMismatch {
                expected: vec![num_rows],
                actual: vec![rows.len()],
                operation: "SparseArray::from_rows".to_string(),
            });
        }

        let nnz = rows.iter().map(Vec::len).sum();
        let mut row_offsets = Vec::with_capacity(num_rows + 1);
        let mut indices = Vec::with_capacity(nnz);
        let mut values = Vec::with_capacity(nnz);
        row_offsets.push(0);
        for (r, row) in rows.iter().enumerate() {
            for &(col, value) in row {
                if col >= num_cols {
                    return Err(SeqBatchError::IndexOutOfBounds {
                        index: vec![r, col],
                        shape: vec![num_rows, num_cols],
                    });
                }
                indices.push(col);
                values.push(value);
            }
            row_offsets.push(indices.len());
        }

        Ok(Self {
            shape,
            row_offsets,
            indices,
            values,
        })
    }

    fn split_shape(shape: &[usize]) -> Result<(usize, usize)> {
        match shape.split_last() {
            Some((&cols, leading)) => Ok((leading.iter().product(), cols)),
            None => Err(SeqBatchError::ShapeMismatch {
                expected: vec![1],
                actual: vec![],
                operation: "SparseArray".to_string(),
            }),
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn num_rows(&self) -> usize {
        self.row_offsets.len() - 1
    }

    pub fn row_offsets(&self) -> &[usize] {
        &self.row_offsets
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Non-zero entries of one row.
    pub fn row(&self, r: usize) -> Result<Vec<(usize, f32)>> {
        if r >= self.num_rows() {
            return Err(SeqBatchError::IndexOutOfBounds {
                index: vec![r],
                shape: vec![self.num_rows()],
            });
        }
        let span = self.row_offsets[r]..self.row_offsets[r + 1];
        Ok(self.indices[span.clone()]
            .iter()
            .copied()
            .zip(self.values[span].iter().copied())
            .collect())
    }

    /// Expands into a dense array of the same shape. Duplicate entries add up.
    pub fn to_dense(&self) -> DenseArray {
        let mut dense = DenseArray::zeros(self.shape.clone());
        let cols = self.shape.last().copied().unwrap_or(0);
        let data = dense.data_mut();
        for r in 0..self.num_rows() {
            for k in self.row_offsets[r]..self.row_offsets[r + 1] {
                data[r * cols + self.indices[k]] += self.values[k];
            }
        }
        dense
    }
}

#[cfg(test)]
#[path = "sparse_test.rs"]
mod tests;
