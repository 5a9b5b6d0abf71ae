// seqbatch-data/src/deserializers/traits.rs

use std::fmt::Debug;

use serde_json::Value;

use seqbatch_core::Result;

use crate::sequence::SequenceGroup;
use crate::streams::StreamDefs;

/// A pluggable reader that turns a backing source into sequence groups for
/// the streams it declares.
///
/// `MinibatchSource` only relies on this contract, so user-supplied backends
/// can be mixed with the built-in CTF and image readers.
pub trait Deserializer: Debug {
    /// Backend type tag used in reader configuration records.
    fn kind(&self) -> &'static str;

    /// The streams this deserializer supplies, with resolved sample shapes.
    fn stream_defs(&self) -> &StreamDefs;

    /// Backend configuration record (`type`, `file`, `input`, ...).
    fn config_record(&self) -> Value;

    /// Reads one full sweep of the backing source in source order.
    ///
    /// # Errors
    ///
    /// Returns `SeqBatchError::Format` for malformed input and
    /// `SeqBatchError::Io` if the source cannot be read.
    fn read_sequences(&mut self) -> Result<Vec<SequenceGroup>>;
}
