// seqbatch-data/src/streams/stream_def.rs

use std::collections::BTreeMap;

use seqbatch_core::{Result, SeqBatchError, StorageFormat};

use crate::transforms::Transform;

/// Declaration of one named stream: where its values come from in the
/// backing format and what each sample looks like.
///
/// `shape` is the per-sample shape, excluding sequence and batch axes. An
/// empty shape means the deserializer derives it (image streams take it
/// from their scale transform).
#[derive(Debug, Clone, PartialEq)]
pub struct StreamDef {
    field: String,
    shape: Vec<usize>,
    is_sparse: bool,
    transforms: Vec<Transform>,
}

impl StreamDef {
    /// Creates a dense stream definition reading the given source field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            shape: Vec::new(),
            is_sparse: false,
            transforms: Vec::new(),
        }
    }

    /// Per-sample shape; a single dimension for flat streams.
    pub fn shape(mut self, shape: impl Into<Vec<usize>>) -> Self {
        self.shape = shape.into();
        self
    }

    pub fn dim(self, dim: usize) -> Self {
        self.shape(vec![dim])
    }

    pub fn sparse(mut self, is_sparse: bool) -> Self {
        self.is_sparse = is_sparse;
        self
    }

    pub fn transforms(mut self, transforms: Vec<Transform>) -> Self {
        self.transforms = transforms;
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn sample_shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of values in one sample (product of the shape).
    pub fn sample_dim(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_sparse(&self) -> bool {
        self.is_sparse
    }

    pub fn storage_format(&self) -> StorageFormat {
        if self.is_sparse {
            StorageFormat::Sparse
        } else {
            StorageFormat::Dense
        }
    }

    pub fn transform_list(&self) -> &[Transform] {
        &self.transforms
    }

    pub fn has_shape(&self) -> bool {
        !self.shape.is_empty()
    }

    pub(crate) fn with_resolved_shape(&self, shape: Vec<usize>) -> Self {
        Self {
            shape,
            ..self.clone()
        }
    }

    /// Checks the declaration for the given stream name.
    ///
    /// # Errors
    /// `SeqBatchError::Configuration` for an empty field tag or a zero dimension.
    pub fn validate(&self, name: &str) -> Result<()> {
        if self.field.trim().is_empty() {
            return Err(SeqBatchError::configuration(format!(
                "stream '{}' has an empty field tag",
                name
            )));
        }
        if self.shape.iter().any(|&d| d == 0) {
            return Err(SeqBatchError::configuration(format!(
                "stream '{}' has a zero dimension in shape {:?}",
                name, self.shape
            )));
        }
        Ok(())
    }
}

/// Named collection of stream definitions, ordered by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamDefs {
    defs: BTreeMap<String, StreamDef>,
}

impl StreamDefs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a validated stream definition.
    ///
    /// # Errors
    /// `SeqBatchError::Configuration` if the name is empty, already declared,
    /// or the definition itself is invalid.
    pub fn with(mut self, name: impl Into<String>, def: StreamDef) -> Result<Self> {
        self.insert(name, def)?;
        Ok(self)
    }

    pub fn insert(&mut self, name: impl Into<String>, def: StreamDef) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(SeqBatchError::configuration("stream name must not be empty"));
        }
        if self.defs.contains_key(&name) {
            return Err(SeqBatchError::configuration(format!(
                "stream '{}' declared twice",
                name
            )));
        }
        def.validate(&name)?;
        self.defs.insert(name, def);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&StreamDef> {
        self.defs.get(name)
    }

    /// Finds the stream reading a given source field.
    pub fn by_field(&self, field: &str) -> Option<(&str, &StreamDef)> {
        self.defs
            .iter()
            .find(|(_, def)| def.field == field)
            .map(|(name, def)| (name.as_str(), def))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StreamDef)> {
        self.defs.iter().map(|(name, def)| (name.as_str(), def))
    }

    pub fn names(&self) -> Vec<String> {
        self.defs.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub(crate) fn replace(&mut self, name: &str, def: StreamDef) {
        if let Some(slot) = self.defs.get_mut(name) {
            *slot = def;
        }
    }
}

#[cfg(test)]
#[path = "stream_def_test.rs"]
mod tests;
