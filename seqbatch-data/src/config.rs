// seqbatch-data/src/config.rs

//! Source-level configuration and the reader configuration surface.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use seqbatch_core::{Result, SeqBatchError};

use crate::deserializers::Deserializer;
use crate::samplers::random_sampler::WHOLE_SWEEP;
use crate::samplers::{RandomSampler, Sampler, SequentialSampler};
use crate::source::MinibatchSource;

/// Numeric encoding of [`EpochSize::FullDataSweep`] in configuration records.
pub const FULL_DATA_SWEEP: usize = usize::MAX - 2;
/// Numeric encoding of [`EpochSize::InfinitelyRepeat`] in configuration records.
pub const INFINITELY_REPEAT: usize = usize::MAX;

/// How much data one epoch of a source delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "usize", into = "usize")]
pub enum EpochSize {
    /// The data repeats forever; minibatches may span sweep boundaries.
    #[default]
    InfinitelyRepeat,
    /// One full pass over the data, then the source is exhausted.
    FullDataSweep,
    /// A fixed number of samples, then the source is exhausted.
    Samples(usize),
}

impl From<usize> for EpochSize {
    fn from(value: usize) -> Self {
        match value {
            INFINITELY_REPEAT => EpochSize::InfinitelyRepeat,
            FULL_DATA_SWEEP => EpochSize::FullDataSweep,
            n => EpochSize::Samples(n),
        }
    }
}

impl From<EpochSize> for usize {
    fn from(value: EpochSize) -> Self {
        match value {
            EpochSize::InfinitelyRepeat => INFINITELY_REPEAT,
            EpochSize::FullDataSweep => FULL_DATA_SWEEP,
            EpochSize::Samples(n) => n,
        }
    }
}

/// Configuration of a `MinibatchSource`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MinibatchSourceConfig {
    /// Shuffle sequences on every sweep.
    pub randomize: bool,
    pub epoch_size: EpochSize,
    /// Randomization window, in sequences or samples (see below).
    pub randomization_window: usize,
    /// Count the randomization window in samples instead of sequences.
    pub sample_based_randomization_window: bool,
    /// Base seed of the per-sweep shuffles.
    pub seed: u64,
}

impl Default for MinibatchSourceConfig {
    fn default() -> Self {
        Self {
            randomize: true,
            epoch_size: EpochSize::InfinitelyRepeat,
            randomization_window: WHOLE_SWEEP,
            sample_based_randomization_window: false,
            seed: 0,
        }
    }
}

impl MinibatchSourceConfig {
    pub fn randomize(mut self, randomize: bool) -> Self {
        self.randomize = randomize;
        self
    }

    pub fn epoch_size(mut self, epoch_size: EpochSize) -> Self {
        self.epoch_size = epoch_size;
        self
    }

    pub fn randomization_window(mut self, window: usize) -> Self {
        self.randomization_window = window;
        self
    }

    pub fn sample_based_randomization_window(mut self, sample_based: bool) -> Self {
        self.sample_based_randomization_window = sample_based;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Parses a configuration from JSON; missing keys take their defaults.
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s)
            .map_err(|e| SeqBatchError::configuration(format!("invalid source configuration: {}", e)))
    }

    /// Validates option combinations.
    pub fn validate(&self) -> Result<()> {
        if self.epoch_size == EpochSize::Samples(0) {
            return Err(SeqBatchError::configuration("epoch size must be positive"));
        }
        if self.randomization_window == 0 {
            return Err(SeqBatchError::configuration(
                "randomization window must be positive",
            ));
        }
        Ok(())
    }

    /// The sampler ordering each sweep under this configuration.
    pub fn sampler(&self) -> Box<dyn Sampler> {
        if self.randomize {
            Box::new(RandomSampler::new(
                self.seed,
                self.randomization_window,
                self.sample_based_randomization_window,
            ))
        } else {
            Box::new(SequentialSampler::new())
        }
    }
}

/// Reader configuration: the deserializers plus source-level options,
/// renderable as one configuration record.
#[derive(Debug)]
pub struct ReaderConfig {
    deserializers: Vec<Box<dyn Deserializer>>,
    config: MinibatchSourceConfig,
}

impl ReaderConfig {
    pub fn new(deserializers: Vec<Box<dyn Deserializer>>, config: MinibatchSourceConfig) -> Self {
        Self {
            deserializers,
            config,
        }
    }

    pub fn config(&self) -> &MinibatchSourceConfig {
        &self.config
    }

    pub fn deserializers(&self) -> &[Box<dyn Deserializer>] {
        &self.deserializers
    }

    /// Renders `epochSize`, `randomize`, `randomizationWindow`,
    /// `sampleBasedRandomizationWindow`, `seed` and the backend records under
    /// `deserializers`.
    pub fn to_json(&self) -> Result<Value> {
        let mut record = serde_json::to_value(&self.config)
            .map_err(|e| SeqBatchError::configuration(e.to_string()))?;
        let deserializers: Vec<Value> = self.deserializers.iter().map(|d| d.config_record()).collect();
        if let Value::Object(map) = &mut record {
            map.insert("deserializers".to_string(), Value::Array(deserializers));
        }
        Ok(record)
    }

    /// Builds the minibatch source this configuration describes.
    pub fn minibatch_source(self) -> Result<MinibatchSource> {
        MinibatchSource::new(self.deserializers, self.config)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
