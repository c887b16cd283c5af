//! Normalized feature frames and the magnitude shaping curve.

use std::ops::Deref;

/// Largest byte magnitude an analyser reports
const MAX_MAGNITUDE: f32 = u8::MAX as f32;

/// Shape a single byte magnitude into [0, 1].
///
/// Magnitudes below `threshold` are noise and map to 0. Everything else is
/// normalized and raised to the 1.5 power (`sqrt(n) * n`), which flattens
/// quiet bins and keeps loud ones near full scale.
pub fn shape_magnitude(magnitude: u8, threshold: u8) -> f32 {
    if magnitude < threshold {
        return 0.0;
    }
    let normalized = magnitude as f32 / MAX_MAGNITUDE;
    normalized.sqrt() * normalized
}

/// One snapshot of normalized per-bin intensities
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureFrame {
    values: Vec<f32>,
}

impl FeatureFrame {
    /// Idle frame: `resolution` zeros
    pub fn silent(resolution: usize) -> Self {
        Self {
            values: vec![0.0; resolution],
        }
    }

    /// Build a frame from raw analyser bytes
    pub fn from_magnitudes(magnitudes: &[u8], threshold: u8) -> Self {
        Self {
            values: magnitudes
                .iter()
                .map(|&m| shape_magnitude(m, threshold))
                .collect(),
        }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Mean intensity across all bins (0 for an empty frame)
    pub fn average(&self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f32>() / self.values.len() as f32
    }

    /// Loudest bin intensity
    pub fn peak(&self) -> f32 {
        self.values.iter().copied().fold(0.0, f32::max)
    }

    /// True when every bin is zero
    pub fn is_silent(&self) -> bool {
        self.values.iter().all(|&v| v == 0.0)
    }
}

impl Deref for FeatureFrame {
    type Target = [f32];

    fn deref(&self) -> &Self::Target {
        &self.values
    }
}
