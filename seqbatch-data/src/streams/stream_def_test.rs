// seqbatch-data/src/streams/stream_def_test.rs

use super::*;
use crate::streams::StreamInformation;

#[test]
fn test_stream_def_defaults() {
    let def = StreamDef::new("x");
    assert_eq!(def.field(), "x");
    assert!(!def.is_sparse());
    assert!(def.transform_list().is_empty());
    assert!(!def.has_shape());
    assert_eq!(def.storage_format(), StorageFormat::Dense);
}

#[test]
fn test_stream_def_builder() {
    let def = StreamDef::new("x").dim(1000).sparse(true);
    assert_eq!(def.sample_shape(), &[1000]);
    assert_eq!(def.sample_dim(), 1000);
    assert_eq!(def.storage_format(), StorageFormat::Sparse);

    let def = StreamDef::new("img").shape(vec![3, 2, 2]);
    assert_eq!(def.sample_dim(), 12);
}

#[test]
fn test_stream_defs_rejects_duplicates() {
    let defs = StreamDefs::new()
        .with("features", StreamDef::new("x").dim(3))
        .unwrap();
    let err = defs
        .with("features", StreamDef::new("y").dim(3))
        .unwrap_err();
    assert!(matches!(err, SeqBatchError::Configuration { .. }));
}

#[test]
fn test_stream_defs_rejects_bad_shape_and_field() {
    let err = StreamDefs::new()
        .with("features", StreamDef::new("x").shape(vec![4, 0]))
        .unwrap_err();
    assert!(matches!(err, SeqBatchError::Configuration { .. }));

    let err = StreamDefs::new()
        .with("features", StreamDef::new(" ").dim(1))
        .unwrap_err();
    assert!(matches!(err, SeqBatchError::Configuration { .. }));
}

#[test]
fn test_stream_defs_lookup_and_order() {
    let defs = StreamDefs::new()
        .with("labels", StreamDef::new("y").dim(5))
        .unwrap()
        .with("features", StreamDef::new("x").dim(1000).sparse(true))
        .unwrap();
    assert_eq!(defs.len(), 2);
    assert_eq!(defs.names(), vec!["features".to_string(), "labels".to_string()]);
    let (name, def) = defs.by_field("y").unwrap();
    assert_eq!(name, "labels");
    assert_eq!(def.sample_dim(), 5);
    assert!(defs.by_field("z").is_none());
}

#[test]
fn test_stream_information_ids_are_unique() {
    let def = StreamDef::new("x").dim(2);
    let a = StreamInformation::allocate("features", &def);
    let b = StreamInformation::allocate("features", &def);
    assert_ne!(a.id(), b.id());
    assert_ne!(a, b);
    assert_eq!(a.name(), b.name());
    assert_eq!(a.sample_shape(), &[2]);
    assert!(!a.is_sparse());
}
