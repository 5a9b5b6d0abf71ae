//! Image transform descriptors.
//!
//! A transform only describes a step of the decode pipeline; executing it is
//! the job of the image decoding backend. Every descriptor renders to a
//! backend configuration record keyed by a canonical type tag.

use serde_json::{json, Value};

use seqbatch_core::{Result, SeqBatchError};

const CROP_TYPES: &[&str] = &["center", "randomside", "randomarea", "multiview10"];
const JITTER_TYPES: &[&str] = &["none", "uniratio", "unilength", "uniarea"];
const INTERPOLATIONS: &[&str] = &["nearest", "linear", "cubic", "lanczos"];
const SCALE_MODES: &[&str] = &["fill", "crop", "pad"];

#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    Crop {
        crop_type: String,
        side_ratio: f64,
        area_ratio: f64,
        aspect_ratio: f64,
        jitter_type: String,
    },
    Scale {
        width: usize,
        height: usize,
        channels: usize,
        interpolations: String,
        scale_mode: String,
        pad_value: i32,
    },
    Mean {
        mean_file: String,
    },
    Color {
        brightness_radius: f64,
        contrast_radius: f64,
        saturation_radius: f64,
    },
}

fn one_of(what: &str, value: &str, allowed: &[&str]) -> Result<String> {
    if allowed.contains(&value) {
        Ok(value.to_string())
    } else {
        Err(SeqBatchError::configuration(format!(
            "unknown {} '{}', expected one of {:?}",
            what, value, allowed
        )))
    }
}

fn unit_interval(what: &str, value: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(SeqBatchError::configuration(format!(
            "{} must lie in [0, 1], got {}",
            what, value
        )))
    }
}

/// Crop transform. `aspect_ratio` defaults to 1.0 and `area_ratio` to 0.0.
pub fn crop(crop_type: &str, side_ratio: f64, jitter_type: &str) -> Result<Transform> {
    Ok(Transform::Crop {
        crop_type: one_of("crop type", crop_type, CROP_TYPES)?,
        side_ratio: unit_interval("side ratio", side_ratio)?,
        area_ratio: 0.0,
        aspect_ratio: 1.0,
        jitter_type: one_of("jitter type", jitter_type, JITTER_TYPES)?,
    })
}

/// Scale transform. `scale_mode` defaults to "fill" and `pad_value` to -1.
pub fn scale(width: usize, height: usize, channels: usize, interpolations: &str) -> Result<Transform> {
    if width == 0 || height == 0 || channels == 0 {
        return Err(SeqBatchError::configuration(format!(
            "scale dimensions must be positive, got {}x{}x{}",
            width, height, channels
        )));
    }
    Ok(Transform::Scale {
        width,
        height,
        channels,
        interpolations: one_of("interpolation", interpolations, INTERPOLATIONS)?,
        scale_mode: "fill".to_string(),
        pad_value: -1,
    })
}

pub fn mean(mean_file: impl Into<String>) -> Result<Transform> {
    let mean_file = mean_file.into();
    if mean_file.is_empty() {
        return Err(SeqBatchError::configuration("mean transform needs a mean file"));
    }
    Ok(Transform::Mean { mean_file })
}

/// Color jitter transform; all radii default to 0.0 (no jitter).
pub fn color(brightness_radius: f64, contrast_radius: f64, saturation_radius: f64) -> Result<Transform> {
    Ok(Transform::Color {
        brightness_radius: unit_interval("brightness radius", brightness_radius)?,
        contrast_radius: unit_interval("contrast radius", contrast_radius)?,
        saturation_radius: unit_interval("saturation radius", saturation_radius)?,
    })
}

impl Transform {
    /// Overrides the crop aspect ratio. Ignored for other transforms.
    pub fn aspect_ratio(mut self, ratio: f64) -> Result<Self> {
        if let Transform::Crop { aspect_ratio, .. } = &mut self {
            if ratio <= 0.0 {
                return Err(SeqBatchError::configuration(format!(
                    "aspect ratio must be positive, got {}",
                    ratio
                )));
            }
            *aspect_ratio = ratio;
        }
        Ok(self)
    }

    pub fn area_ratio(mut self, ratio: f64) -> Result<Self> {
        if let Transform::Crop { area_ratio, .. } = &mut self {
            *area_ratio = unit_interval("area ratio", ratio)?;
        }
        Ok(self)
    }

    pub fn scale_mode(mut self, mode: &str) -> Result<Self> {
        if let Transform::Scale { scale_mode, .. } = &mut self {
            *scale_mode = one_of("scale mode", mode, SCALE_MODES)?;
        }
        Ok(self)
    }

    pub fn pad_value(mut self, value: i32) -> Self {
        if let Transform::Scale { pad_value, .. } = &mut self {
            *pad_value = value;
        }
        self
    }

    pub fn type_tag(&self) -> &'static str {
        match self {
            Transform::Crop { .. } => "Crop",
            Transform::Scale { .. } => "Scale",
            Transform::Mean { .. } => "Mean",
            Transform::Color { .. } => "Color",
        }
    }

    /// Sample shape `[channels, height, width]` produced by a scale transform.
    pub fn output_shape(&self) -> Option<Vec<usize>> {
        match self {
            Transform::Scale {
                width,
                height,
                channels,
                ..
            } => Some(vec![*channels, *height, *width]),
            _ => None,
        }
    }

    /// Backend configuration record for this transform.
    pub fn to_config(&self) -> Value {
        match self {
            Transform::Crop {
                crop_type,
                side_ratio,
                area_ratio,
                aspect_ratio,
                jitter_type,
            } => json!({
                "type": self.type_tag(),
                "cropType": crop_type,
                "sideRatio": side_ratio,
                "areaRatio": area_ratio,
                "aspectRatio": aspect_ratio,
                "jitterType": jitter_type,
            }),
            Transform::Scale {
                width,
                height,
                channels,
                interpolations,
                scale_mode,
                pad_value,
            } => json!({
                "type": self.type_tag(),
                "width": width,
                "height": height,
                "channels": channels,
                "interpolations": interpolations,
                "scaleMode": scale_mode,
                "padValue": pad_value,
            }),
            Transform::Mean { mean_file } => json!({
                "type": self.type_tag(),
                "meanFile": mean_file,
            }),
            Transform::Color {
                brightness_radius,
                contrast_radius,
                saturation_radius,
            } => json!({
                "type": self.type_tag(),
                "brightnessRadius": brightness_radius,
                "contrastRadius": contrast_radius,
                "saturationRadius": saturation_radius,
            }),
        }
    }
}

#[cfg(test)]
#[path = "transforms_test.rs"]
mod tests;
