// seqbatch-data/src/sequence.rs

//! Sequence assembly: grouping raw deserializer rows into sequences.

use std::collections::BTreeMap;

use log::trace;

/// Values of one sample of one stream.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleData {
    Dense(Vec<f32>),
    Sparse(Vec<(usize, f32)>),
}

/// One row as produced by a deserializer: an optional sequence id and the
/// samples it carries, keyed by stream name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRow {
    pub sequence_id: Option<u64>,
    pub samples: Vec<(String, SampleData)>,
}

/// Samples of one stream that share a sequence id.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    pub sequence_id: u64,
    pub samples: Vec<SampleData>,
}

impl Sequence {
    pub fn new(sequence_id: u64) -> Self {
        Self {
            sequence_id,
            samples: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// One logical record group: the sequences of every stream that originate
/// from the same sequence id.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceGroup {
    pub key: u64,
    pub streams: BTreeMap<String, Sequence>,
}

impl SequenceGroup {
    pub fn new(key: u64) -> Self {
        Self {
            key,
            streams: BTreeMap::new(),
        }
    }

    /// Budget cost of the group: the longest of its stream sequences.
    pub fn length(&self) -> usize {
        self.streams.values().map(Sequence::len).max().unwrap_or(0)
    }

    /// Length of one stream's sequence (zero if the stream is absent).
    pub fn stream_len(&self, name: &str) -> usize {
        self.streams.get(name).map_or(0, Sequence::len)
    }

    pub fn stream(&self, name: &str) -> Option<&Sequence> {
        self.streams.get(name)
    }

    fn push(&mut self, stream: String, sample: SampleData) {
        let key = self.key;
        self.streams
            .entry(stream)
            .or_insert_with(|| Sequence::new(key))
            .samples
            .push(sample);
    }

    /// Moves the sequences of `other` into this group.
    pub fn merge(&mut self, other: SequenceGroup) {
        self.streams.extend(other.streams);
    }
}

/// Groups consecutive rows sharing a sequence id into sequence groups.
///
/// A row without an id starts a group of its own. Groups carrying no sample
/// at all are dropped. Every declared stream gets a (possibly empty) entry.
pub fn assemble(rows: Vec<RawRow>, stream_names: &[String]) -> Vec<SequenceGroup> {
    let mut groups: Vec<SequenceGroup> = Vec::new();
    let mut current: Option<(Option<u64>, SequenceGroup)> = None;
    let mut implicit_key = 0u64;

    for row in rows {
        let continues = matches!(
            (&current, row.sequence_id),
            (Some((Some(open), _)), Some(id)) if *open == id
        );
        if !continues {
            if let Some((_, group)) = current.take() {
                groups.push(group);
            }
            let key = row.sequence_id.unwrap_or(implicit_key);
            implicit_key = implicit_key.max(key.saturating_add(1));
            current = Some((row.sequence_id, SequenceGroup::new(key)));
        }
        if let Some((_, group)) = current.as_mut() {
            for (stream, sample) in row.samples {
                group.push(stream, sample);
            }
        }
    }
    if let Some((_, group)) = current.take() {
        groups.push(group);
    }

    let before = groups.len();
    groups.retain(|g| g.length() > 0);
    if groups.len() != before {
        trace!("assemble: dropped {} empty sequence groups", before - groups.len());
    }
    for group in &mut groups {
        for name in stream_names {
            let key = group.key;
            group
                .streams
                .entry(name.clone())
                .or_insert_with(|| Sequence::new(key));
        }
    }
    groups
}

#[cfg(test)]
#[path = "sequence_test.rs"]
mod tests;
