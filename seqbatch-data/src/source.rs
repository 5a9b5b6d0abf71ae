// seqbatch-data/src/source.rs
//! # MinibatchSource
//!
//! A `MinibatchSource` turns one or more deserializers into a stream of
//! minibatches. It owns the sweep cursor, the sampler that orders each
//! sweep and the packer that lays sequences out as padded arrays.
//!
//! ## Example
//!
//! ```rust,no_run
//! use seqbatch_data::deserializers::CtfDeserializer;
//! use seqbatch_data::streams::{StreamDef, StreamDefs};
//! use seqbatch_data::{EpochSize, MinibatchProvider, MinibatchSource, MinibatchSourceConfig};
//!
//! # fn main() -> seqbatch_core::Result<()> {
//! let defs = StreamDefs::new()
//!     .with("features", StreamDef::new("x").dim(2))?
//!     .with("labels", StreamDef::new("y").dim(3))?;
//! let ctf = CtfDeserializer::new("train.ctf", defs)?;
//! let config = MinibatchSourceConfig::default()
//!     .randomize(false)
//!     .epoch_size(EpochSize::FullDataSweep);
//! let mut source = MinibatchSource::from_deserializer(Box::new(ctf), config)?;
//! let features = source.stream_info("features")?;
//! loop {
//!     let mb = source.next_minibatch(64)?;
//!     if mb.is_empty() {
//!         break;
//!     }
//!     println!("{:?}", mb.get(&features)?.shape());
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use log::{debug, info, warn};

use seqbatch_core::{Result, SeqBatchError};

use crate::config::MinibatchSourceConfig;
use crate::deserializers::Deserializer;
use crate::minibatch::{Minibatch, MinibatchData};
use crate::packer::{pack, select};
use crate::samplers::Sampler;
use crate::sequence::SequenceGroup;
use crate::streams::StreamInformation;
use crate::sweep::{SweepState, SweepTracker};

/// Anything that hands out minibatches keyed by stream.
pub trait MinibatchProvider {
    /// All streams this provider delivers.
    fn stream_infos(&self) -> Vec<StreamInformation>;

    /// Looks a stream up by name.
    ///
    /// # Errors
    /// `SeqBatchError::Lookup` if no stream, or more than one, has that name.
    fn stream_info(&self, name: &str) -> Result<StreamInformation> {
        let mut found = self.stream_infos().into_iter().filter(|s| s.name() == name);
        match (found.next(), found.next()) {
            (Some(info), None) => Ok(info),
            _ => Err(SeqBatchError::lookup(name)),
        }
    }

    /// Returns the next minibatch of about `size` samples. An empty result
    /// means the epoch is exhausted.
    fn next_minibatch(&mut self, size: usize) -> Result<Minibatch>;
}

/// Minibatch source over a set of deserializers.
///
/// Deserializers are zipped by sequence position: sequence `k` of every
/// deserializer forms record group `k`.
#[derive(Debug)]
pub struct MinibatchSource {
    deserializers: Vec<Box<dyn Deserializer>>,
    config: MinibatchSourceConfig,
    streams: Vec<StreamInformation>,
    sampler: Box<dyn Sampler>,
    tracker: SweepTracker,
    sweep: Option<Vec<SequenceGroup>>,
    lengths: Vec<usize>,
}

impl MinibatchSource {
    /// Creates a source reading from `deserializers`.
    ///
    /// # Errors
    /// `SeqBatchError::Configuration` if the configuration is invalid or no
    /// deserializer is given.
    pub fn new(deserializers: Vec<Box<dyn Deserializer>>, config: MinibatchSourceConfig) -> Result<Self> {
        config.validate()?;
        if deserializers.is_empty() {
            return Err(SeqBatchError::configuration(
                "a minibatch source needs at least one deserializer",
            ));
        }

        let mut streams = Vec::new();
        let mut seen = HashSet::new();
        for deserializer in &deserializers {
            for (name, def) in deserializer.stream_defs().iter() {
                if !seen.insert(name.to_string()) {
                    warn!(
                        "MinibatchSource: stream '{}' is declared by more than one deserializer",
                        name
                    );
                }
                streams.push(StreamInformation::allocate(name, def));
            }
        }

        info!(
            "MinibatchSource: {} deserializers, streams [{}], randomize={}, epoch={:?}",
            deserializers.len(),
            streams.iter().map(StreamInformation::name).collect::<Vec<_>>().join(", "),
            config.randomize,
            config.epoch_size
        );

        Ok(Self {
            sampler: config.sampler(),
            tracker: SweepTracker::new(config.epoch_size),
            deserializers,
            config,
            streams,
            sweep: None,
            lengths: Vec::new(),
        })
    }

    pub fn from_deserializer(deserializer: Box<dyn Deserializer>, config: MinibatchSourceConfig) -> Result<Self> {
        Self::new(vec![deserializer], config)
    }

    pub fn config(&self) -> &MinibatchSourceConfig {
        &self.config
    }

    // Reads every deserializer and zips their sequences into record groups.
    fn load_sweep(&mut self) -> Result<()> {
        if self.sweep.is_some() {
            return Ok(());
        }
        let names: Vec<&str> = self.streams.iter().map(StreamInformation::name).collect();
        let unique: HashSet<&str> = names.iter().copied().collect();
        if unique.len() != names.len() {
            return Err(SeqBatchError::configuration(
                "stream names must be unique across deserializers",
            ));
        }

        let mut merged: Option<Vec<SequenceGroup>> = None;
        for deserializer in &mut self.deserializers {
            let groups = deserializer.read_sequences()?;
            merged = Some(match merged {
                None => groups,
                Some(mut acc) => {
                    if acc.len() != groups.len() {
                        return Err(SeqBatchError::configuration(format!(
                            "{} yields {} sequences, previous deserializers yield {}",
                            deserializer.kind(),
                            groups.len(),
                            acc.len()
                        )));
                    }
                    for (into, from) in acc.iter_mut().zip(groups) {
                        into.merge(from);
                    }
                    acc
                }
            });
        }

        let mut sweep = merged.unwrap_or_default();
        let before = sweep.len();
        sweep.retain(|g| g.length() > 0);
        if sweep.len() != before {
            warn!(
                "MinibatchSource: skipped {} sequences without samples",
                before - sweep.len()
            );
        }
        self.lengths = sweep.iter().map(SequenceGroup::length).collect();
        debug!(
            "MinibatchSource: sweep of {} sequences, {} samples",
            sweep.len(),
            self.lengths.iter().sum::<usize>()
        );
        self.sweep = Some(sweep);
        Ok(())
    }

    /// Like [`MinibatchProvider::next_minibatch`], but keyed by the caller's
    /// own input names.
    ///
    /// # Errors
    /// `SeqBatchError::Lookup` if `input_map` names a stream this source does
    /// not deliver.
    pub fn next_minibatch_mapped<K: Eq + Hash + Clone>(
        &mut self,
        size: usize,
        input_map: &HashMap<K, StreamInformation>,
    ) -> Result<HashMap<K, MinibatchData>> {
        for info in input_map.values() {
            if !self.streams.contains(info) {
                return Err(SeqBatchError::lookup(info.name()));
            }
        }
        let batch = self.next_minibatch(size)?;
        Ok(input_map
            .iter()
            .filter_map(|(key, info)| batch.get(info).ok().map(|data| (key.clone(), data.clone())))
            .collect())
    }

    /// Rewinds the cursor to the start of the first sweep.
    pub fn restart(&mut self) {
        debug!("MinibatchSource: restart");
        self.tracker.restart();
    }

    /// Position of the cursor, for checkpointing.
    pub fn checkpoint_state(&self) -> SweepState {
        self.tracker.state()
    }

    /// Resumes from a saved position; later minibatches equal the ones the
    /// source would have produced after the checkpoint.
    pub fn restore_from_checkpoint(&mut self, state: SweepState) {
        debug!("MinibatchSource: restoring {:?}", state);
        self.tracker.restore(state);
    }

    pub fn current_sweep(&self) -> usize {
        self.tracker.state().sweep_index
    }
}

impl MinibatchProvider for MinibatchSource {
    fn stream_infos(&self) -> Vec<StreamInformation> {
        self.streams.clone()
    }

    /// # Errors
    /// * `SeqBatchError::Configuration` if `size` is zero, or if the
    ///   deserializers disagree on stream names or sequence counts.
    /// * Any `Format` or `Io` error of the deserializers.
    fn next_minibatch(&mut self, size: usize) -> Result<Minibatch> {
        if size == 0 {
            return Err(SeqBatchError::configuration("minibatch size must be positive"));
        }
        self.load_sweep()?;
        let sweep = self.sweep.as_deref().unwrap_or(&[]);

        let selection = select(&mut self.tracker, self.sampler.as_ref(), &self.lengths, size);
        if selection.indices.is_empty() {
            debug!("MinibatchSource: epoch exhausted");
            return Ok(Minibatch::new());
        }
        let groups: Vec<&SequenceGroup> = selection.indices.iter().map(|&i| &sweep[i]).collect();
        pack(&self.streams, &groups, selection.end_of_sweep)
    }
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
