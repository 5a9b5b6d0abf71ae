use seqbatch_data::{CtfDeserializer, MinibatchSource, MinibatchSourceConfig, StreamDef, StreamDefs};
use std::io::Write;
use tempfile::NamedTempFile;

// Two sequences: S0 lengths 4 and 3, S1 lengths 3 and 2.
#[allow(dead_code)]
pub const MBDATA_DENSE_1: &str = "0  |S0 0   |S1 0
0   |S0 1   |S1 1
0   |S0 2
0   |S0 3   |S1 3
1   |S0 4
1   |S0 5   |S1 1
1   |S0 6   |S1 2
";

// One sequence of 7 samples (S1: 5 samples).
#[allow(dead_code)]
pub const MBDATA_DENSE_2: &str = "0  |S0 0   |S1 0
0   |S0 1   |S1 1
0   |S0 2
0   |S0 3   |S1 3
0   |S0 4
0   |S0 5   |S1 1
0   |S0 6   |S1 2
";

// Sparse 1000-dim features (3 and 4 samples), dense 5-dim labels (1 each).
#[allow(dead_code)]
pub const MBDATA_SPARSE: &str = "0\t|x 560:1\t|y 1 0 0 0 0
0\t|x 0:1
0\t|x 0:1
1\t|x 560:1\t|y 0 1 0 0 0
1\t|x 0:1
1\t|x 0:1
1\t|x 424:1
";

#[allow(dead_code)]
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// Writes `data` to a temporary file kept alive by the returned handle.
#[allow(dead_code)]
pub fn write_data(data: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Temp file creation failed");
    file.write_all(data.as_bytes()).expect("Temp file write failed");
    file.flush().expect("Temp file flush failed");
    file
}

#[allow(dead_code)]
pub fn dense_defs() -> StreamDefs {
    StreamDefs::new()
        .with("features", StreamDef::new("S0").dim(1))
        .and_then(|d| d.with("labels", StreamDef::new("S1").dim(1)))
        .expect("Stream defs failed")
}

#[allow(dead_code)]
pub fn sparse_defs() -> StreamDefs {
    StreamDefs::new()
        .with("features", StreamDef::new("x").dim(1000).sparse(true))
        .and_then(|d| d.with("labels", StreamDef::new("y").dim(5)))
        .expect("Stream defs failed")
}

#[allow(dead_code)]
pub fn ctf_source(file: &NamedTempFile, defs: StreamDefs, config: MinibatchSourceConfig) -> MinibatchSource {
    let ctf = CtfDeserializer::new(file.path(), defs).expect("CTF deserializer failed");
    MinibatchSource::from_deserializer(Box::new(ctf), config).expect("Source creation failed")
}
