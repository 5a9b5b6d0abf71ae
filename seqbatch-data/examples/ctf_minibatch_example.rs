//! Reads a small CTF file with a sequential and a randomized source and
//! prints the shape, mask and sweep flag of every minibatch.
//!
//! `RUST_LOG=debug cargo run --example ctf_minibatch_example`

use std::collections::BTreeMap;
use std::io::Write;

use serde_json::json;
use seqbatch_data::{
    sequence_to_text_format, CtfDeserializer, EpochSize, MinibatchProvider, MinibatchSource, MinibatchSourceConfig,
    StreamDef, StreamDefs,
};

fn main() -> seqbatch_core::Result<()> {
    env_logger::init();

    // Build the CTF text from in-memory sequences.
    let mut text = String::new();
    for (i, (features, label)) in [(vec![0.0, 1.0, 2.0, 3.0], 0), (vec![4.0, 5.0, 6.0], 1), (vec![7.0, 8.0], 2)]
        .into_iter()
        .enumerate()
    {
        let mut one_hot = vec![0; 3];
        one_hot[label] = 1;
        let mut streams = BTreeMap::new();
        streams.insert("x".to_string(), json!(features.iter().map(|v| vec![*v]).collect::<Vec<_>>()));
        streams.insert("y".to_string(), json!([one_hot]));
        text.push_str(&sequence_to_text_format(i, &streams)?);
        text.push('\n');
    }
    println!("--- CTF input ---\n{}", text);

    let mut file = tempfile::NamedTempFile::new().expect("Temp file creation failed");
    file.write_all(text.as_bytes()).expect("Temp file write failed");

    let defs = StreamDefs::new()
        .with("features", StreamDef::new("x").dim(1))?
        .with("labels", StreamDef::new("y").dim(3))?;

    for (title, config) in [
        (
            "Sequential, one sweep",
            MinibatchSourceConfig::default()
                .randomize(false)
                .epoch_size(EpochSize::FullDataSweep),
        ),
        (
            "Randomized, 12 samples",
            MinibatchSourceConfig::default().seed(42).epoch_size(EpochSize::Samples(12)),
        ),
    ] {
        println!("\n--- {} ---", title);
        let ctf = CtfDeserializer::new(file.path(), defs.clone())?;
        let mut source = MinibatchSource::from_deserializer(Box::new(ctf), config)?;
        let features = source.stream_info("features")?;
        for i in 0.. {
            let mb = source.next_minibatch(5)?;
            if mb.is_empty() {
                break;
            }
            let data = mb.get(&features)?;
            println!(
                "Batch {i}: shape {:?}, mask {:?}, end_of_sweep {}, sweep {}",
                data.shape(),
                data.mask(),
                data.end_of_sweep(),
                source.current_sweep()
            );
        }
    }
    Ok(())
}
