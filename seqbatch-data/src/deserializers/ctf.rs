// seqbatch-data/src/deserializers/ctf.rs

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde_json::{json, Map, Value};

use seqbatch_core::{Result, SeqBatchError};

use super::traits::Deserializer;
use crate::sequence::{assemble, RawRow, SequenceGroup};
use crate::streams::StreamDefs;
use crate::text_format::{decode_field, parse_line};

/// Deserializer for the line-oriented CNTK text format.
///
/// Each stream reads the field whose alias equals its `field` tag. The file
/// is opened when the deserializer is built and parsed on first use, so
/// format errors surface at the first minibatch request.
#[derive(Debug)]
pub struct CtfDeserializer {
    path: PathBuf,
    file: File,
    defs: StreamDefs,
}

impl CtfDeserializer {
    /// Creates a CTF deserializer over `path` for the given streams.
    ///
    /// # Errors
    ///
    /// * `SeqBatchError::Configuration` if a stream has no shape, carries
    ///   transforms, or two streams read the same field.
    /// * `SeqBatchError::Io` if the file cannot be opened.
    pub fn new(path: impl AsRef<Path>, defs: StreamDefs) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if defs.is_empty() {
            return Err(SeqBatchError::configuration(
                "CTF deserializer needs at least one stream",
            ));
        }
        let mut fields = HashSet::new();
        for (name, def) in defs.iter() {
            if !def.has_shape() {
                return Err(SeqBatchError::configuration(format!(
                    "CTF stream '{}' must declare a shape",
                    name
                )));
            }
            if !def.transform_list().is_empty() {
                return Err(SeqBatchError::configuration(format!(
                    "CTF stream '{}' cannot carry image transforms",
                    name
                )));
            }
            if !fields.insert(def.field().to_string()) {
                return Err(SeqBatchError::configuration(format!(
                    "field '{}' is read by more than one stream",
                    def.field()
                )));
            }
        }

        let file = File::open(&path).map_err(|e| SeqBatchError::io(&path, &e))?;
        Ok(Self { path, file, defs })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parses CTF text into rows of named samples.
    pub fn parse_rows<R: BufRead>(reader: R, origin: &str, defs: &StreamDefs) -> Result<Vec<RawRow>> {
        let mut rows = Vec::new();
        let mut unknown = HashSet::new();
        for (i, line) in reader.lines().enumerate() {
            let line_no = i + 1;
            let line = line.map_err(|e| SeqBatchError::Io {
                path: PathBuf::from(origin),
                message: e.to_string(),
            })?;
            let Some(parsed) = parse_line(&line, origin, line_no)? else {
                continue;
            };

            let mut row = RawRow {
                sequence_id: parsed.sequence_id,
                samples: Vec::with_capacity(parsed.fields.len()),
            };
            for field in &parsed.fields {
                let Some((name, def)) = defs.by_field(field.alias) else {
                    if unknown.insert(field.alias.to_string()) {
                        warn!("{}: skipping undeclared field '{}'", origin, field.alias);
                    }
                    continue;
                };
                if row.samples.iter().any(|(n, _)| n == name) {
                    return Err(SeqBatchError::format(
                        origin,
                        line_no,
                        format!("field '{}' appears twice in one line", field.alias),
                    ));
                }
                row.samples
                    .push((name.to_string(), decode_field(field, def, origin, line_no)?));
            }
            rows.push(row);
        }
        Ok(rows)
    }
}

impl Deserializer for CtfDeserializer {
    fn kind(&self) -> &'static str {
        "CNTKTextFormatDeserializer"
    }

    fn stream_defs(&self) -> &StreamDefs {
        &self.defs
    }

    fn config_record(&self) -> Value {
        let mut input = Map::new();
        for (name, def) in self.defs.iter() {
            input.insert(
                name.to_string(),
                json!({
                    "alias": def.field(),
                    "dim": def.sample_dim(),
                    "format": def.storage_format().to_string(),
                }),
            );
        }
        json!({
            "type": self.kind(),
            "file": self.path.to_string_lossy(),
            "input": input,
        })
    }

    fn read_sequences(&mut self) -> Result<Vec<SequenceGroup>> {
        let origin = self.path.to_string_lossy().into_owned();
        self.file
            .seek(SeekFrom::Start(0))
            .map_err(|e| SeqBatchError::io(&self.path, &e))?;
        let rows = Self::parse_rows(BufReader::new(&self.file), &origin, &self.defs)?;
        let groups = assemble(rows, &self.defs.names());
        info!(
            "CtfDeserializer: read {} sequences ({} samples) from {}",
            groups.len(),
            groups.iter().map(SequenceGroup::length).sum::<usize>(),
            origin
        );
        Ok(groups)
    }
}

#[cfg(test)]
#[path = "ctf_test.rs"]
mod tests;
