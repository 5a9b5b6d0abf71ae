use crate::array::DenseArray;
use crate::sparse::SparseArray;
use crate::types::{DType, StorageFormat};

/// Batch payload of one stream: dense or sparse storage behind one type.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchValue {
    Dense(DenseArray),
    Sparse(SparseArray),
}

impl BatchValue {
    pub fn shape(&self) -> &[usize] {
        match self {
            BatchValue::Dense(a) => a.shape(),
            BatchValue::Sparse(a) => a.shape(),
        }
    }

    pub fn storage_format(&self) -> StorageFormat {
        match self {
            BatchValue::Dense(_) => StorageFormat::Dense,
            BatchValue::Sparse(_) => StorageFormat::Sparse,
        }
    }

    pub fn is_sparse(&self) -> bool {
        self.storage_format().is_sparse()
    }

    pub fn dtype(&self) -> DType {
        DType::F32
    }

    /// Dense view of the payload; sparse payloads are expanded.
    pub fn to_dense(&self) -> DenseArray {
        match self {
            BatchValue::Dense(a) => a.clone(),
            BatchValue::Sparse(a) => a.to_dense(),
        }
    }
}

impl From<DenseArray> for BatchValue {
    fn from(array: DenseArray) -> Self {
        BatchValue::Dense(array)
    }
}

impl From<SparseArray> for BatchValue {
    fn from(array: SparseArray) -> Self {
        BatchValue::Sparse(array)
    }
}
