//! Parameter definitions with physical units and documented semantics.
//!
//! All magic numbers are extracted here with:
//! - Units (samples, dBFS, radians, scene units)
//! - Documented ranges and meanings
//! - Validation where a bad value would break analysis

mod audio;
mod render;
mod visual;

// Re-export all types
pub use audio::{
    audio_constants, AnalyserConfig, CaptureConstraints, ChainConfig, ExtractorConfig,
};
pub use render::FrameLoopConfig;
pub use visual::{RingParams, SphereParams};
