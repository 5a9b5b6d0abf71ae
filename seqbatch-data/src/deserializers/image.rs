// seqbatch-data/src/deserializers/image.rs

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde_json::{json, Map, Value};

use seqbatch_core::{Result, SeqBatchError};

use super::traits::Deserializer;
use crate::sequence::{assemble, RawRow, SampleData, SequenceGroup};
use crate::streams::StreamDefs;
use crate::transforms::Transform;

const IMAGE_FIELD: &str = "image";
const LABEL_FIELD: &str = "label";

/// Decoding backend for image streams.
///
/// Implementations load the image at `path`, run the transform pipeline and
/// return `sample_shape.iter().product()` values.
pub trait ImageDecoder: Debug {
    fn decode(&self, path: &Path, transforms: &[Transform], sample_shape: &[usize]) -> Result<Vec<f32>>;
}

/// Deserializer for image map files (`<filename>\t<label>` per line).
///
/// Supports one stream reading the `image` field and one reading the
/// `label` field. Every map-file line becomes a single-sample sequence.
#[derive(Debug)]
pub struct ImageDeserializer {
    map_file: PathBuf,
    defs: StreamDefs,
    image_stream: Option<String>,
    label_stream: Option<String>,
    decoder: Option<Box<dyn ImageDecoder>>,
}

impl ImageDeserializer {
    /// Creates an image deserializer. The map file is read on first use.
    ///
    /// The image stream's sample shape defaults to `[channels, height, width]`
    /// of its scale transform.
    ///
    /// # Errors
    ///
    /// `SeqBatchError::Configuration` for fields other than `image`/`label`,
    /// more than one stream per field, sparse streams, a label stream without
    /// a shape, or an image stream whose shape cannot be derived.
    pub fn new(map_file: impl AsRef<Path>, defs: StreamDefs) -> Result<Self> {
        let mut resolved = defs.clone();
        let mut image_stream = None;
        let mut label_stream = None;

        for (name, def) in defs.iter() {
            if def.is_sparse() {
                return Err(SeqBatchError::configuration(format!(
                    "image deserializer stream '{}' cannot be sparse",
                    name
                )));
            }
            let slot = match def.field() {
                IMAGE_FIELD => &mut image_stream,
                LABEL_FIELD => &mut label_stream,
                other => {
                    return Err(SeqBatchError::configuration(format!(
                        "image deserializer stream '{}' reads unknown field '{}'",
                        name, other
                    )))
                }
            };
            if slot.is_some() {
                return Err(SeqBatchError::configuration(format!(
                    "image deserializer declares more than one '{}' stream",
                    def.field()
                )));
            }
            *slot = Some(name.to_string());

            if def.field() == LABEL_FIELD && !def.has_shape() {
                return Err(SeqBatchError::configuration(format!(
                    "label stream '{}' must declare the number of classes",
                    name
                )));
            }
            if def.field() == IMAGE_FIELD && !def.has_shape() {
                let shape = def
                    .transform_list()
                    .iter()
                    .rev()
                    .find_map(Transform::output_shape)
                    .ok_or_else(|| {
                        SeqBatchError::configuration(format!(
                            "image stream '{}' needs a shape or a scale transform",
                            name
                        ))
                    })?;
                resolved.replace(name, def.with_resolved_shape(shape));
            }
        }

        Ok(Self {
            map_file: map_file.as_ref().to_path_buf(),
            defs: resolved,
            image_stream,
            label_stream,
            decoder: None,
        })
    }

    /// Attaches the backend that decodes and transforms image files.
    pub fn with_decoder(mut self, decoder: Box<dyn ImageDecoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    pub fn map_file(&self) -> &Path {
        &self.map_file
    }

    fn parse_map_line(&self, line: &str, line_no: usize) -> Result<(PathBuf, usize)> {
        let origin = self.map_file.to_string_lossy().into_owned();
        let (file, label) = line
            .rsplit_once('\t')
            .ok_or_else(|| SeqBatchError::format(&origin, line_no, "expected '<file>\\t<label>'"))?;
        let label = label.trim().parse::<usize>().map_err(|_| {
            SeqBatchError::format(
                &origin,
                line_no,
                format!("label '{}' is not a non-negative integer", label.trim()),
            )
        })?;
        Ok((PathBuf::from(file.trim()), label))
    }
}

impl Deserializer for ImageDeserializer {
    fn kind(&self) -> &'static str {
        "ImageDeserializer"
    }

    fn stream_defs(&self) -> &StreamDefs {
        &self.defs
    }

    fn config_record(&self) -> Value {
        let mut input = Map::new();
        for (name, def) in self.defs.iter() {
            let record = if def.field() == LABEL_FIELD {
                json!({ "labelDim": def.sample_dim() })
            } else {
                let transforms: Vec<Value> = def.transform_list().iter().map(Transform::to_config).collect();
                json!({ "transforms": transforms })
            };
            input.insert(name.to_string(), record);
        }
        json!({
            "type": self.kind(),
            "file": self.map_file.to_string_lossy(),
            "input": input,
        })
    }

    fn read_sequences(&mut self) -> Result<Vec<SequenceGroup>> {
        let text = fs::read_to_string(&self.map_file).map_err(|e| SeqBatchError::io(&self.map_file, &e))?;
        let origin = self.map_file.to_string_lossy().into_owned();

        let mut rows = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let line_no = i + 1;
            if line.trim().is_empty() {
                continue;
            }
            let (image_path, label) = self.parse_map_line(line, line_no)?;
            let mut samples = Vec::with_capacity(2);

            if let Some(name) = &self.label_stream {
                let dim = self.defs.get(name).map_or(0, |d| d.sample_dim());
                if label >= dim {
                    return Err(SeqBatchError::format(
                        &origin,
                        line_no,
                        format!("label {} out of range for {} classes", label, dim),
                    ));
                }
                let mut one_hot = vec![0.0; dim];
                one_hot[label] = 1.0;
                samples.push((name.clone(), SampleData::Dense(one_hot)));
            }

            if let Some(name) = &self.image_stream {
                let decoder = self.decoder.as_ref().ok_or_else(|| {
                    SeqBatchError::configuration(format!(
                        "image stream '{}' has no image decoder attached",
                        name
                    ))
                })?;
                let def = self
                    .defs
                    .get(name)
                    .ok_or_else(|| SeqBatchError::lookup(name.clone()))?;
                let pixels = decoder.decode(&image_path, def.transform_list(), def.sample_shape())?;
                if pixels.len() != def.sample_dim() {
                    return Err(SeqBatchError::format(
                        &origin,
                        line_no,
                        format!(
                            "decoder produced {} values for '{}', expected {}",
                            pixels.len(),
                            image_path.display(),
                            def.sample_dim()
                        ),
                    ));
                }
                debug!("ImageDeserializer: decoded {}", image_path.display());
                samples.push((name.clone(), SampleData::Dense(pixels)));
            }

            rows.push(RawRow {
                sequence_id: Some(i as u64),
                samples,
            });
        }

        let groups = assemble(rows, &self.defs.names());
        info!("ImageDeserializer: read {} images from {}", groups.len(), origin);
        Ok(groups)
    }
}

#[cfg(test)]
#[path = "image_test.rs"]
mod tests;
