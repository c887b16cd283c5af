//! Microphone capture and spectral feature extraction.
//!
//! Captures live input through an [`AudioHost`], runs it through a gain and
//! FFT analyser, and shapes the byte magnitudes into normalized frames for
//! audio-reactive visuals.

mod cpal_host;
mod error;
mod extractor;
mod fft;
mod frame;
mod host;

// Re-export public types
pub use cpal_host::{CpalGraph, CpalHost, CpalStream, SampleWindow};
pub use error::{CaptureError, Error};
pub use extractor::FeatureExtractor;
pub use fft::{blackman_window, Analyser};
pub use frame::{shape_magnitude, FeatureFrame};
pub use host::{AnalysisGraph, AudioHost, CaptureStream, ContextState};
