// seqbatch-data/src/source_test.rs

use super::*;
use crate::config::EpochSize;
use crate::sequence::{assemble, RawRow, SampleData};
use crate::streams::{StreamDef, StreamDefs};
use serde_json::{json, Value};

// In-memory deserializer: one single-stream sequence per entry of `lengths`.
#[derive(Debug)]
struct LengthsDeserializer {
    defs: StreamDefs,
    stream: String,
    lengths: Vec<usize>,
}

impl LengthsDeserializer {
    fn boxed(stream: &str, lengths: &[usize]) -> Box<dyn Deserializer> {
        let defs = StreamDefs::new().with(stream, StreamDef::new(stream).dim(1)).unwrap();
        Box::new(Self {
            defs,
            stream: stream.to_string(),
            lengths: lengths.to_vec(),
        })
    }
}

impl Deserializer for LengthsDeserializer {
    fn kind(&self) -> &'static str {
        "LengthsDeserializer"
    }

    fn stream_defs(&self) -> &StreamDefs {
        &self.defs
    }

    fn config_record(&self) -> Value {
        json!({ "type": self.kind() })
    }

    fn read_sequences(&mut self) -> Result<Vec<SequenceGroup>> {
        let mut rows = Vec::new();
        for (id, &len) in self.lengths.iter().enumerate() {
            for t in 0..len {
                rows.push(RawRow {
                    sequence_id: Some(id as u64),
                    samples: vec![(self.stream.clone(), SampleData::Dense(vec![(id * 10 + t) as f32]))],
                });
            }
        }
        Ok(assemble(rows, &self.defs.names()))
    }
}

fn sequential() -> MinibatchSourceConfig {
    MinibatchSourceConfig::default().randomize(false)
}

fn first_values(mb: &Minibatch, name: &str) -> Vec<f32> {
    let data = mb.by_name(name).unwrap();
    data.sequences()
        .unwrap()
        .iter()
        .map(|s| s.data()[0])
        .collect()
}

#[test]
fn test_source_requires_deserializer() {
    let err = MinibatchSource::new(Vec::new(), sequential()).unwrap_err();
    assert!(matches!(err, SeqBatchError::Configuration { .. }));
}

#[test]
fn test_source_rejects_zero_size() {
    let mut source = MinibatchSource::from_deserializer(LengthsDeserializer::boxed("x", &[1]), sequential()).unwrap();
    assert!(matches!(
        source.next_minibatch(0),
        Err(SeqBatchError::Configuration { .. })
    ));
}

#[test]
fn test_source_spans_sweeps_when_repeating() {
    let mut source =
        MinibatchSource::from_deserializer(LengthsDeserializer::boxed("x", &[2, 1, 3]), sequential()).unwrap();

    let mb = source.next_minibatch(3).unwrap();
    assert_eq!(first_values(&mb, "x"), vec![0.0, 10.0]);
    assert!(!mb.by_name("x").unwrap().end_of_sweep());

    let mb = source.next_minibatch(5).unwrap();
    assert_eq!(first_values(&mb, "x"), vec![20.0, 0.0]);
    assert!(mb.by_name("x").unwrap().end_of_sweep());
    assert_eq!(source.current_sweep(), 1);
}

#[test]
fn test_source_full_sweep_then_empty() {
    let config = sequential().epoch_size(EpochSize::FullDataSweep);
    let mut source = MinibatchSource::from_deserializer(LengthsDeserializer::boxed("x", &[2, 1]), config).unwrap();
    let mb = source.next_minibatch(100).unwrap();
    assert_eq!(mb.by_name("x").unwrap().num_samples(), 3);
    assert!(source.next_minibatch(100).unwrap().is_empty());

    source.restart();
    assert!(!source.next_minibatch(100).unwrap().is_empty());
}

#[test]
fn test_source_zips_deserializers() {
    let deserializers = vec![
        LengthsDeserializer::boxed("a", &[1, 2]),
        LengthsDeserializer::boxed("b", &[3, 1]),
    ];
    let mut source = MinibatchSource::new(deserializers, sequential()).unwrap();
    let mb = source.next_minibatch(3).unwrap();
    // group 0 costs max(1, 3) = 3 samples
    assert_eq!(mb.by_name("a").unwrap().num_sequences(), 1);
    assert_eq!(mb.by_name("a").unwrap().num_samples(), 1);
    assert_eq!(mb.by_name("b").unwrap().num_samples(), 3);
}

#[test]
fn test_source_sequence_count_mismatch() {
    let deserializers = vec![
        LengthsDeserializer::boxed("a", &[1, 2]),
        LengthsDeserializer::boxed("b", &[1]),
    ];
    let mut source = MinibatchSource::new(deserializers, sequential()).unwrap();
    assert!(matches!(
        source.next_minibatch(1),
        Err(SeqBatchError::Configuration { .. })
    ));
}

#[test]
fn test_source_duplicate_stream_names() {
    let deserializers = vec![
        LengthsDeserializer::boxed("a", &[1]),
        LengthsDeserializer::boxed("a", &[1]),
    ];
    let mut source = MinibatchSource::new(deserializers, sequential()).unwrap();
    assert_eq!(source.stream_info("a").unwrap_err(), SeqBatchError::lookup("a"));
    assert_eq!(source.stream_infos().len(), 2);
    assert!(matches!(
        source.next_minibatch(1),
        Err(SeqBatchError::Configuration { .. })
    ));
}

#[test]
fn test_source_mapped_minibatch() {
    let mut source = MinibatchSource::from_deserializer(LengthsDeserializer::boxed("x", &[2]), sequential()).unwrap();
    let info = source.stream_info("x").unwrap();
    let input_map: HashMap<&str, StreamInformation> = [("input", info)].into_iter().collect();
    let mapped = source.next_minibatch_mapped(2, &input_map).unwrap();
    assert_eq!(mapped["input"].num_samples(), 2);

    let foreign = StreamInformation::new("x", usize::MAX, Default::default(), Default::default(), vec![1]);
    let bad: HashMap<&str, StreamInformation> = [("input", foreign)].into_iter().collect();
    assert!(matches!(
        source.next_minibatch_mapped(2, &bad),
        Err(SeqBatchError::Lookup { .. })
    ));
}

#[test]
fn test_source_checkpoint_replays() {
    let config = MinibatchSourceConfig::default().seed(7).randomization_window(2);
    let mut source =
        MinibatchSource::from_deserializer(LengthsDeserializer::boxed("x", &[1, 2, 1, 3, 1]), config).unwrap();
    source.next_minibatch(3).unwrap();
    let state = source.checkpoint_state();
    let expected: Vec<Vec<f32>> = (0..4)
        .map(|_| first_values(&source.next_minibatch(3).unwrap(), "x"))
        .collect();

    source.restore_from_checkpoint(state);
    let replayed: Vec<Vec<f32>> = (0..4)
        .map(|_| first_values(&source.next_minibatch(3).unwrap(), "x"))
        .collect();
    assert_eq!(replayed, expected);
}

// Returns groups as given, without going through `assemble`.
#[derive(Debug)]
struct GroupsDeserializer {
    defs: StreamDefs,
    groups: Vec<SequenceGroup>,
}

impl Deserializer for GroupsDeserializer {
    fn kind(&self) -> &'static str {
        "GroupsDeserializer"
    }

    fn stream_defs(&self) -> &StreamDefs {
        &self.defs
    }

    fn config_record(&self) -> Value {
        json!({ "type": self.kind() })
    }

    fn read_sequences(&mut self) -> Result<Vec<SequenceGroup>> {
        Ok(self.groups.clone())
    }
}

fn groups_source(groups: Vec<SequenceGroup>) -> MinibatchSource {
    let defs = StreamDefs::new().with("x", StreamDef::new("x").dim(1)).unwrap();
    MinibatchSource::from_deserializer(Box::new(GroupsDeserializer { defs, groups }), sequential()).unwrap()
}

#[test]
fn test_source_only_empty_groups_is_exhausted() {
    let mut source = groups_source(vec![SequenceGroup::new(0), SequenceGroup::new(1)]);
    assert!(source.next_minibatch(1).unwrap().is_empty());
    assert!(source.next_minibatch(10).unwrap().is_empty());
}

#[test]
fn test_source_skips_empty_groups() {
    let rows = vec![RawRow {
        sequence_id: Some(1),
        samples: vec![("x".to_string(), SampleData::Dense(vec![4.0]))],
    }];
    let mut groups = assemble(rows, &["x".to_string()]);
    groups.insert(0, SequenceGroup::new(0));
    let mut source = groups_source(groups);
    for _ in 0..3 {
        let mb = source.next_minibatch(1).unwrap();
        assert_eq!(first_values(&mb, "x"), vec![4.0]);
        assert!(mb.by_name("x").unwrap().end_of_sweep());
    }
}
