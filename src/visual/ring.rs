//! Ring of frequency bars around the sphere.

use glam::{Mat4, Quat, Vec3};
use std::f32::consts::{FRAC_PI_2, TAU};

use crate::audio::FeatureFrame;
use crate::params::RingParams;

/// Placement and look of one bar
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bar {
    pub position: Vec3,
    /// Rotation about Y so the bar faces outward (radians)
    pub yaw_rad: f32,
    /// Unclamped height from the frame
    pub height: f32,
    /// Y scale applied to the unit bar (never below `min_height`)
    pub scale_y: f32,
    /// sRGB colour, components in [0, 1]
    pub color: [f32; 3],
}

impl Bar {
    /// Model matrix: scale, then yaw, then translate
    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::new(1.0, self.scale_y, 1.0),
            Quat::from_rotation_y(self.yaw_rad),
            self.position,
        )
    }
}

/// Frequency bars laid out evenly on a circle
pub struct FrequencyRing {
    pub bars: Vec<Bar>,
    params: RingParams,
}

impl FrequencyRing {
    pub fn new(params: RingParams) -> Self {
        let count = params.bars;
        let bars = (0..count)
            .map(|i| {
                let angle = (i as f32 / count as f32) * TAU;
                Bar {
                    position: Vec3::new(angle.cos() * params.radius, 0.0, angle.sin() * params.radius),
                    yaw_rad: -angle + FRAC_PI_2,
                    height: 0.0,
                    scale_y: params.min_height,
                    color: hsl_to_rgb(params.base_hue_deg, 1.0, 0.5),
                }
            })
            .collect();

        Self { bars, params }
    }

    /// Resample the frame onto the bars
    pub fn update(&mut self, frame: &FeatureFrame) {
        let count = self.bars.len();
        let p = &self.params;

        for (i, bar) in self.bars.iter_mut().enumerate() {
            let index = (i * frame.len()) / count;
            let height = frame.get(index).copied().unwrap_or(0.0) * p.height_scale;

            bar.height = height;
            bar.scale_y = height.max(p.min_height);
            bar.color = hsl_to_rgb(
                p.base_hue_deg + height * p.hue_range_deg,
                1.0,
                0.5 + height * 0.5,
            );
        }
    }

    /// Tallest bar height this tick
    pub fn tallest(&self) -> f32 {
        self.bars.iter().map(|b| b.height).fold(0.0, f32::max)
    }
}

/// Convert HSL (hue in degrees, saturation and lightness clamped to [0, 1]) to RGB
pub fn hsl_to_rgb(hue_deg: f32, saturation: f32, lightness: f32) -> [f32; 3] {
    let h = hue_deg.rem_euclid(360.0) / 360.0;
    let s = saturation.clamp(0.0, 1.0);
    let l = lightness.clamp(0.0, 1.0);

    if s == 0.0 {
        return [l, l, l];
    }

    let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    [
        hue_to_channel(p, q, h + 1.0 / 3.0),
        hue_to_channel(p, q, h),
        hue_to_channel(p, q, h - 1.0 / 3.0),
    ]
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}
