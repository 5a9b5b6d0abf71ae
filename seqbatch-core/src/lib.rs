// Core building blocks shared by the seqbatch crates: the error taxonomy,
// element/storage descriptors and the batch arrays minibatches are made of.
pub mod array;
pub mod error;
pub mod sparse;
pub mod types;
pub mod value;

pub use array::DenseArray;
pub use error::{Result, SeqBatchError};
pub use sparse::SparseArray;
pub use types::{DType, StorageFormat};
pub use value::BatchValue;
