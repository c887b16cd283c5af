//! Presentation parameters for the sphere and frequency ring.

/// Audio-reactive wireframe sphere parameters
#[derive(Debug, Clone)]
pub struct SphereParams {
    /// Rest radius (scene units)
    pub radius: f32,

    /// Icosahedron subdivision level (each face splits into (detail + 1)^2 triangles)
    pub detail: u32,

    /// Mean frame intensity above which the sphere reacts
    /// Below it the sphere snaps back to its rest shape
    pub sound_threshold: f32,

    /// Bin intensity multiplier for spike length
    pub intensity_scale: f32,

    /// Angular spread factor used to pick a bin from the vertex azimuth
    pub band_spread: f32,

    /// Spatial frequency of the spike pattern across the surface
    pub pattern_frequency: f32,

    /// Minimum distortion multiplier (pattern trough)
    pub distortion_base: f32,

    /// Extra distortion at pattern peaks
    pub distortion_range: f32,

    /// Rotation about Y per tick (radians)
    pub rotation_per_tick_rad: f32,
}

impl Default for SphereParams {
    fn default() -> Self {
        Self {
            radius: 1.0,
            detail: 3,
            sound_threshold: 0.05,
            intensity_scale: 3.5,
            band_spread: 10.0,
            pattern_frequency: 10.0,
            distortion_base: 0.5,
            distortion_range: 1.5,
            rotation_per_tick_rad: 0.001,
        }
    }
}

/// Ring of frequency bars around the sphere
#[derive(Debug, Clone)]
pub struct RingParams {
    /// Number of bars around the circle
    pub bars: usize,

    /// Ring radius (scene units)
    pub radius: f32,

    /// Bin intensity -> bar height multiplier
    pub height_scale: f32,

    /// Minimum Y scale so silent bars stay visible
    pub min_height: f32,

    /// Hue at zero height (degrees)
    pub base_hue_deg: f32,

    /// Hue shift at height 1.0 (degrees)
    pub hue_range_deg: f32,
}

impl Default for RingParams {
    fn default() -> Self {
        Self {
            bars: 64,
            radius: 2.2,
            height_scale: 1.5,
            min_height: 0.01,
            base_hue_deg: 210.0,
            hue_range_deg: 150.0,
        }
    }
}
