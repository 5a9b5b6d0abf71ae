// seqbatch-data/src/user_source.rs

//! Extension point for user-defined minibatch sources.

use once_cell::unsync::OnceCell;

use seqbatch_core::Result;

use crate::minibatch::Minibatch;
use crate::source::MinibatchProvider;
use crate::streams::StreamInformation;

/// A minibatch source implemented outside this crate.
///
/// Implementors own their cursor and sweep bookkeeping completely. Each
/// returned [`crate::MinibatchData`] must follow the usual layout: data
/// shaped `(num_sequences, max_sequence_length, *sample_shape)` with a
/// matching mask.
pub trait UserMinibatchSource {
    /// All streams of this source. Called once.
    fn stream_infos(&self) -> Vec<StreamInformation>;

    fn next_minibatch(&mut self, size: usize) -> Result<Minibatch>;
}

/// Adapter exposing a [`UserMinibatchSource`] as a [`MinibatchProvider`].
///
/// The stream list is fetched from the inner source on first lookup and
/// cached; errors from the inner source are passed through unchanged.
#[derive(Debug)]
pub struct UserSource<S> {
    inner: S,
    infos: OnceCell<Vec<StreamInformation>>,
}

impl<S: UserMinibatchSource> UserSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            infos: OnceCell::new(),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn cached_infos(&self) -> &[StreamInformation] {
        self.infos.get_or_init(|| self.inner.stream_infos())
    }
}

impl<S: UserMinibatchSource> MinibatchProvider for UserSource<S> {
    fn stream_infos(&self) -> Vec<StreamInformation> {
        self.cached_infos().to_vec()
    }

    fn next_minibatch(&mut self, size: usize) -> Result<Minibatch> {
        self.inner.next_minibatch(size)
    }
}

#[cfg(test)]
#[path = "user_source_test.rs"]
mod tests;
