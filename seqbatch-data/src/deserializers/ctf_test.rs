// seqbatch-data/src/deserializers/ctf_test.rs

use super::*;
use crate::sequence::SampleData;
use crate::streams::StreamDef;
use std::io::{Cursor, Write};
use tempfile::NamedTempFile;

const MBDATA_SPARSE: &str = "0\t|x 560:1\t|y 1 0 0 0 0
0\t|x 0:1
0\t|x 0:1
1\t|x 560:1\t|y 0 1 0 0 0
1\t|x 0:1
1\t|x 0:1
1\t|x 424:1
";

fn sparse_defs() -> StreamDefs {
    StreamDefs::new()
        .with("features", StreamDef::new("x").dim(1000).sparse(true))
        .unwrap()
        .with("labels", StreamDef::new("y").dim(5))
        .unwrap()
}

fn write_data(data: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(data.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_ctf_reads_sequences() {
    let file = write_data(MBDATA_SPARSE);
    let mut d = CtfDeserializer::new(file.path(), sparse_defs()).unwrap();
    let groups = d.read_sequences().unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].stream_len("features"), 3);
    assert_eq!(groups[0].stream_len("labels"), 1);
    assert_eq!(groups[1].stream_len("features"), 4);
    assert_eq!(
        groups[1].stream("features").unwrap().samples[3],
        SampleData::Sparse(vec![(424, 1.0)])
    );
    assert_eq!(
        groups[1].stream("labels").unwrap().samples[0],
        SampleData::Dense(vec![0.0, 1.0, 0.0, 0.0, 0.0])
    );

    // a second sweep re-reads the same data
    let again = d.read_sequences().unwrap();
    assert_eq!(again, groups);
}

#[test]
fn test_ctf_config_record() {
    let file = write_data(MBDATA_SPARSE);
    let d = CtfDeserializer::new(file.path(), sparse_defs()).unwrap();
    let cfg = d.config_record();
    assert_eq!(cfg["type"], "CNTKTextFormatDeserializer");
    assert_eq!(cfg["file"], file.path().to_string_lossy().into_owned());
    assert_eq!(cfg["input"]["features"]["alias"], "x");
    assert_eq!(cfg["input"]["features"]["dim"], 1000);
    assert_eq!(cfg["input"]["features"]["format"], "sparse");
    assert_eq!(cfg["input"]["labels"]["format"], "dense");
}

#[test]
fn test_ctf_missing_file() {
    let err = CtfDeserializer::new("/definitely/not/here.txt", sparse_defs()).unwrap_err();
    assert!(matches!(err, SeqBatchError::Io { .. }));
}

#[test]
fn test_ctf_requires_shapes_and_unique_fields() {
    let file = write_data(MBDATA_SPARSE);
    let no_shape = StreamDefs::new().with("features", StreamDef::new("x")).unwrap();
    assert!(matches!(
        CtfDeserializer::new(file.path(), no_shape),
        Err(SeqBatchError::Configuration { .. })
    ));

    let shared_field = StreamDefs::new()
        .with("a", StreamDef::new("x").dim(1))
        .unwrap()
        .with("b", StreamDef::new("x").dim(1))
        .unwrap();
    assert!(CtfDeserializer::new(file.path(), shared_field).is_err());
    assert!(CtfDeserializer::new(file.path(), StreamDefs::new()).is_err());
}

#[test]
fn test_ctf_format_error_surfaces_on_read() {
    let file = write_data("0\t|y 1 0 0 0 0\n0\t|y 1 0\n");
    let mut d = CtfDeserializer::new(file.path(), sparse_defs()).unwrap();
    match d.read_sequences().unwrap_err() {
        SeqBatchError::Format { line, .. } => assert_eq!(line, 2),
        other => panic!("Expected Format error, got {:?}", other),
    }
}

#[test]
fn test_parse_rows_skips_unknown_fields() {
    let text = "0 |y 0 0 1 0 0 |z 42\n\n0 |x 7:2\n";
    let rows = CtfDeserializer::parse_rows(Cursor::new(text), "mem", &sparse_defs()).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].samples.len(), 1);
    assert_eq!(rows[0].samples[0].0, "labels");
    assert_eq!(rows[1].samples[0].1, SampleData::Sparse(vec![(7, 2.0)]));
}

#[test]
fn test_parse_rows_rejects_duplicate_field() {
    let text = "0 |y 0 0 1 0 0 |y 1 0 0 0 0\n";
    let err = CtfDeserializer::parse_rows(Cursor::new(text), "mem", &sparse_defs()).unwrap_err();
    assert!(matches!(err, SeqBatchError::Format { line: 1, .. }));
}
