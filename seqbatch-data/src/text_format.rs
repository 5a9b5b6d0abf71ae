//! CNTK text format (CTF) codec.
//!
//! A CTF line is `<sequence_id>\t|<alias> <values...> |<alias> <values...>`.
//! Dense fields list bare values, sparse fields list `index:value` tokens.
//! Consecutive lines sharing a sequence id form one sequence.
//!
//! The decode direction backs [`crate::deserializers::CtfDeserializer`];
//! the encode direction ([`sequence_to_text_format`]) turns in-memory
//! per-sequence tensors into CTF text for tooling and tests.

use std::collections::BTreeMap;

use serde_json::Value;

use seqbatch_core::{Result, SeqBatchError};

use crate::sequence::SampleData;
use crate::streams::StreamDef;

/// One `|alias values...` block of a CTF line.
#[derive(Debug, Clone, PartialEq)]
pub struct CtfField<'a> {
    pub alias: &'a str,
    pub tokens: Vec<&'a str>,
}

/// A parsed, not yet type-checked CTF line.
#[derive(Debug, Clone, PartialEq)]
pub struct CtfLine<'a> {
    pub sequence_id: Option<u64>,
    pub fields: Vec<CtfField<'a>>,
}

/// Splits one CTF line into its sequence id and field blocks.
///
/// Returns `Ok(None)` for blank lines. Blocks whose alias starts with `#`
/// are comments and are dropped.
///
/// # Errors
/// `SeqBatchError::Format` when the line has no `|` field marker, when the
/// sequence id is not a non-negative integer, or when a block has no alias.
pub fn parse_line<'a>(line: &'a str, origin: &str, line_no: usize) -> Result<Option<CtfLine<'a>>> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Ok(None);
    }

    let marker = line
        .find('|')
        .ok_or_else(|| SeqBatchError::format(origin, line_no, "missing field marker '|'"))?;
    let id_text = line[..marker].trim();
    let sequence_id = if id_text.is_empty() {
        None
    } else {
        Some(id_text.parse::<u64>().map_err(|_| {
            SeqBatchError::format(
                origin,
                line_no,
                format!("sequence id '{}' is not a non-negative integer", id_text),
            )
        })?)
    };

    let mut fields = Vec::new();
    for block in line[marker + 1..].split('|') {
        let mut tokens = block.split_whitespace();
        let alias = tokens
            .next()
            .ok_or_else(|| SeqBatchError::format(origin, line_no, "field marker without a name"))?;
        if alias.starts_with('#') {
            continue;
        }
        fields.push(CtfField {
            alias,
            tokens: tokens.collect(),
        });
    }

    Ok(Some(CtfLine {
        sequence_id,
        fields,
    }))
}

fn parse_value(token: &str, origin: &str, line_no: usize, alias: &str) -> Result<f32> {
    token.parse::<f32>().map_err(|_| {
        SeqBatchError::format(
            origin,
            line_no,
            format!("non-numeric value '{}' in field '{}'", token, alias),
        )
    })
}

/// Converts one field block into sample data according to its stream definition.
///
/// # Errors
/// `SeqBatchError::Format` for non-numeric values, a dense value count that
/// differs from the declared sample dimension, or a malformed / out of range
/// sparse `index:value` token.
pub fn decode_field(field: &CtfField<'_>, def: &StreamDef, origin: &str, line_no: usize) -> Result<SampleData> {
    let dim = def.sample_dim();
    if !def.is_sparse() {
        if field.tokens.len() != dim {
            return Err(SeqBatchError::format(
                origin,
                line_no,
                format!(
                    "field '{}' has {} values, expected {}",
                    field.alias,
                    field.tokens.len(),
                    dim
                ),
            ));
        }
        let values = field
            .tokens
            .iter()
            .map(|t| parse_value(t, origin, line_no, field.alias))
            .collect::<Result<Vec<_>>>()?;
        return Ok(SampleData::Dense(values));
    }

    let mut entries = Vec::with_capacity(field.tokens.len());
    for token in &field.tokens {
        let (index, value) = token.split_once(':').ok_or_else(|| {
            SeqBatchError::format(
                origin,
                line_no,
                format!("sparse token '{}' in field '{}' is not index:value", token, field.alias),
            )
        })?;
        let index = index.parse::<usize>().map_err(|_| {
            SeqBatchError::format(origin, line_no, format!("invalid sparse index '{}'", index))
        })?;
        if index >= dim {
            return Err(SeqBatchError::format(
                origin,
                line_no,
                format!(
                    "sparse index {} out of range for field '{}' of dimension {}",
                    index, field.alias, dim
                ),
            ));
        }
        entries.push((index, parse_value(value, origin, line_no, field.alias)?));
    }
    Ok(SampleData::Sparse(entries))
}

// Flattens a number or nested array of numbers, returning its shape.
fn flatten_into(value: &Value, out: &mut Vec<f64>) -> Option<Vec<usize>> {
    match value {
        Value::Number(n) => {
            out.push(n.as_f64()?);
            Some(Vec::new())
        }
        Value::Array(items) => {
            let mut inner: Option<Vec<usize>> = None;
            for item in items {
                let shape = flatten_into(item, out)?;
                if let Some(expected) = &inner {
                    if *expected != shape {
                        return None;
                    }
                } else {
                    inner = Some(shape);
                }
            }
            let mut shape = vec![items.len()];
            shape.extend(inner.unwrap_or_default());
            Some(shape)
        }
        _ => None,
    }
}

/// Whether a JSON value is numeric tensor data: a number, or arrays nested
/// uniformly down to numbers.
pub fn is_tensor(value: &Value) -> bool {
    flatten_into(value, &mut Vec::new()).is_some()
}

// Per-sample flattened values of one stream.
fn stream_samples(name: &str, value: &Value) -> Result<Vec<Vec<f64>>> {
    let items = value.as_array().ok_or_else(|| {
        SeqBatchError::InvalidValue(format!(
            "stream '{}' must be a sequence of samples, got {}",
            name, value
        ))
    })?;

    let mut samples = Vec::with_capacity(items.len());
    let mut sample_shape: Option<Vec<usize>> = None;
    for item in items {
        let mut flat = Vec::new();
        let shape = flatten_into(item, &mut flat).ok_or_else(|| {
            SeqBatchError::InvalidValue(format!(
                "stream '{}' contains non-numeric or ragged data: {}",
                name, item
            ))
        })?;
        if let Some(expected) = &sample_shape {
            if *expected != shape {
                return Err(SeqBatchError::InvalidValue(format!(
                    "stream '{}' mixes sample shapes {:?} and {:?}",
                    name, expected, shape
                )));
            }
        } else {
            sample_shape = Some(shape);
        }
        samples.push(flat);
    }
    Ok(samples)
}

/// Renders one sequence as CTF text.
///
/// `streams` maps stream names to tensors whose first axis is the sample
/// axis; the remaining axes of each sample are flattened in row-major order.
/// Line `i` carries sample `i` of every stream that has one, streams sorted
/// by name. Lines are joined with `\n` without a trailing newline; if no
/// stream has any sample the result is empty.
///
/// # Errors
/// `SeqBatchError::InvalidValue` if any stream holds non-numeric data or
/// samples of differing dimensionality. All streams are checked before any
/// output is produced.
pub fn sequence_to_text_format(sequence_index: usize, streams: &BTreeMap<String, Value>) -> Result<String> {
    let decoded = streams
        .iter()
        .map(|(name, value)| Ok((name.as_str(), stream_samples(name, value)?)))
        .collect::<Result<Vec<_>>>()?;

    let num_lines = decoded.iter().map(|(_, s)| s.len()).max().unwrap_or(0);
    let mut lines = Vec::with_capacity(num_lines);
    for i in 0..num_lines {
        let blocks: Vec<String> = decoded
            .iter()
            .filter_map(|(name, samples)| samples.get(i).map(|values| (name, values)))
            .map(|(name, values)| {
                let mut block = format!("|{}", name);
                for v in values {
                    block.push(' ');
                    block.push_str(&v.to_string());
                }
                block
            })
            .collect();
        lines.push(format!("{}\t{}", sequence_index, blocks.join(" ")));
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
#[path = "text_format_test.rs"]
mod tests;
