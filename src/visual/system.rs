//! Scene state driven by one feature frame per tick.

use super::ring::FrequencyRing;
use super::sphere::SoundSphere;
use crate::audio::FeatureFrame;
use crate::params::{RingParams, SphereParams};

/// Per-tick summary for logging and renderer decisions
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SceneStats {
    /// Mean frame intensity
    pub average: f32,
    /// Loudest bin
    pub peak: f32,
    /// Sphere is spiking (false = idle rest shape)
    pub sphere_reactive: bool,
    pub tallest_bar: f32,
}

/// Sphere and ring together, updated from the same frame
pub struct VisualizerScene {
    pub sphere: SoundSphere,
    pub ring: FrequencyRing,
}

impl VisualizerScene {
    pub fn new(sphere_params: SphereParams, ring_params: RingParams) -> Self {
        Self {
            sphere: SoundSphere::new(sphere_params),
            ring: FrequencyRing::new(ring_params),
        }
    }

    /// Update both visuals. The frame is only read.
    pub fn update(&mut self, frame: &FeatureFrame) -> SceneStats {
        let sphere_reactive = self.sphere.update(frame);
        self.ring.update(frame);

        SceneStats {
            average: frame.average(),
            peak: frame.peak(),
            sphere_reactive,
            tallest_bar: self.ring.tallest(),
        }
    }
}

impl Default for VisualizerScene {
    fn default() -> Self {
        Self::new(SphereParams::default(), RingParams::default())
    }
}
