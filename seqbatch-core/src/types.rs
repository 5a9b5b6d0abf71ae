use std::fmt;

/// Element type of the values carried by a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DType {
    /// 32-bit floating-point type.
    #[default]
    F32,
    /// 64-bit floating-point type.
    F64,
}

impl DType {
    pub fn size_of(&self) -> usize {
        match self {
            DType::F32 => std::mem::size_of::<f32>(),
            DType::F64 => std::mem::size_of::<f64>(),
        }
    }
}

/// How the per-sample values of a stream are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StorageFormat {
    /// Every sample holds the full value vector.
    #[default]
    Dense,
    /// Samples hold `index:value` pairs only.
    Sparse,
}

impl StorageFormat {
    pub fn is_sparse(&self) -> bool {
        matches!(self, StorageFormat::Sparse)
    }
}

impl fmt::Display for StorageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageFormat::Dense => write!(f, "dense"),
            StorageFormat::Sparse => write!(f, "sparse"),
        }
    }
}
