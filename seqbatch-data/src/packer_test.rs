// seqbatch-data/src/packer_test.rs

use super::*;
use crate::config::EpochSize;
use crate::samplers::SequentialSampler;
use crate::sequence::{assemble, RawRow};
use seqbatch_core::{DType, StorageFormat};

fn dense_info(name: &str, dim: usize) -> StreamInformation {
    StreamInformation::new(name, 0, StorageFormat::Dense, DType::F32, vec![dim])
}

fn sparse_info(name: &str, dim: usize) -> StreamInformation {
    StreamInformation::new(name, 1, StorageFormat::Sparse, DType::F32, vec![dim])
}

fn row(id: u64, samples: Vec<(&str, SampleData)>) -> RawRow {
    RawRow {
        sequence_id: Some(id),
        samples: samples.into_iter().map(|(n, s)| (n.to_string(), s)).collect(),
    }
}

// features: lengths 3 and 1; labels: lengths 1 and 1
fn groups() -> Vec<SequenceGroup> {
    let rows = vec![
        row(0, vec![("f", SampleData::Dense(vec![1.0, 2.0])), ("l", SampleData::Sparse(vec![(2, 1.0)]))]),
        row(0, vec![("f", SampleData::Dense(vec![3.0, 4.0]))]),
        row(0, vec![("f", SampleData::Sparse(vec![(1, 6.0)]))]),
        row(1, vec![("f", SampleData::Dense(vec![7.0, 8.0])), ("l", SampleData::Dense(vec![0.0, 5.0, 0.0]))]),
    ];
    assemble(rows, &["f".to_string(), "l".to_string()])
}

#[test]
fn test_pack_pads_each_stream() {
    let groups = groups();
    let refs: Vec<&SequenceGroup> = groups.iter().collect();
    let f = dense_info("f", 2);
    let l = sparse_info("l", 3);
    let mb = pack(&[f.clone(), l.clone()], &refs, true).unwrap();

    let features = mb.get(&f).unwrap();
    assert_eq!(features.shape(), &[2, 3, 2]);
    assert_eq!(features.mask(), &[vec![2, 1, 1], vec![2, 0, 0]]);
    assert_eq!(features.num_samples(), 4);
    assert!(features.end_of_sweep());
    assert_eq!(
        features.as_dense().data(),
        &[1.0, 2.0, 3.0, 4.0, 0.0, 6.0, 7.0, 8.0, 0.0, 0.0, 0.0, 0.0]
    );

    let labels = mb.get(&l).unwrap();
    assert!(labels.is_sparse());
    assert_eq!(labels.shape(), &[2, 1, 3]);
    assert_eq!(labels.mask(), &[vec![2], vec![2]]);
    assert_eq!(labels.as_dense().data(), &[0.0, 0.0, 1.0, 0.0, 5.0, 0.0]);
}

#[test]
fn test_pack_rejects_wrong_dense_dim() {
    let groups = groups();
    let refs: Vec<&SequenceGroup> = groups.iter().collect();
    let err = pack(&[dense_info("f", 3)], &refs, false).unwrap_err();
    assert!(matches!(err, SeqBatchError::ShapeMismatch { .. }));
}

#[test]
fn test_select_budget_rule() {
    let sampler = SequentialSampler::new();
    let lengths = [4, 3, 5];

    let mut tracker = SweepTracker::new(EpochSize::InfinitelyRepeat);
    // first sequence always taken, even when larger than the budget
    let s = select(&mut tracker, &sampler, &lengths, 2);
    assert_eq!(s.indices, vec![0]);
    assert_eq!(s.samples, 4);

    // 3 fits into 7, 3 + 5 does not
    let s = select(&mut tracker, &sampler, &lengths, 7);
    assert_eq!(s.indices, vec![1]);
    assert!(!s.end_of_sweep);

    let s = select(&mut tracker, &sampler, &lengths, 9);
    assert_eq!(s.indices, vec![2, 0]);
    assert!(s.end_of_sweep);
}

#[test]
fn test_select_full_sweep_drains() {
    let sampler = SequentialSampler::new();
    let mut tracker = SweepTracker::new(EpochSize::FullDataSweep);
    let s = select(&mut tracker, &sampler, &[4, 3], 1000);
    assert_eq!(s.indices, vec![0, 1]);
    assert!(s.end_of_sweep);
    assert_eq!(select(&mut tracker, &sampler, &[4, 3], 1000), Selection::default());
}

#[test]
fn test_select_respects_sample_epoch() {
    let sampler = SequentialSampler::new();
    let mut tracker = SweepTracker::new(EpochSize::Samples(6));
    let s = select(&mut tracker, &sampler, &[2, 2, 2, 2], 100);
    assert_eq!(s.samples, 6);
    assert!(select(&mut tracker, &sampler, &[2, 2, 2, 2], 100).indices.is_empty());
}

#[test]
fn test_pack_sparse_sample_out_of_range_for_dense_stream() {
    let rows = vec![row(0, vec![("f", SampleData::Sparse(vec![(5, 1.0)]))])];
    let groups = assemble(rows, &["f".to_string()]);
    let refs: Vec<&SequenceGroup> = groups.iter().collect();
    let err = pack(&[dense_info("f", 2)], &refs, false).unwrap_err();
    assert_eq!(
        err,
        SeqBatchError::IndexOutOfBounds {
            index: vec![5],
            shape: vec![2],
        }
    );
}
