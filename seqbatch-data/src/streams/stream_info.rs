// seqbatch-data/src/streams/stream_info.rs

use std::sync::atomic::{AtomicUsize, Ordering};

use seqbatch_core::{DType, StorageFormat};

use super::stream_def::StreamDef;

static NEXT_STREAM_ID: AtomicUsize = AtomicUsize::new(0);

/// Runtime identity of a stream within one minibatch source.
///
/// Used as the key of minibatch results. Two sources declaring a stream with
/// the same name still get distinct ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamInformation {
    name: String,
    id: usize,
    storage: StorageFormat,
    dtype: DType,
    sample_shape: Vec<usize>,
}

impl StreamInformation {
    /// Creates a stream identity with a caller-chosen id (user sources).
    pub fn new(
        name: impl Into<String>,
        id: usize,
        storage: StorageFormat,
        dtype: DType,
        sample_shape: Vec<usize>,
    ) -> Self {
        Self {
            name: name.into(),
            id,
            storage,
            dtype,
            sample_shape,
        }
    }

    /// Creates a stream identity with a process-unique id.
    pub fn allocate(name: &str, def: &StreamDef) -> Self {
        let id = NEXT_STREAM_ID.fetch_add(1, Ordering::Relaxed);
        Self::new(
            name,
            id,
            def.storage_format(),
            DType::F32,
            def.sample_shape().to_vec(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn storage_format(&self) -> StorageFormat {
        self.storage
    }

    pub fn is_sparse(&self) -> bool {
        self.storage.is_sparse()
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn sample_shape(&self) -> &[usize] {
        &self.sample_shape
    }

    pub fn sample_dim(&self) -> usize {
        self.sample_shape.iter().product()
    }
}
