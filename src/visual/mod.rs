//! Audio-reactive scene state: a spiking sphere and a ring of frequency bars.
//!
//! Everything here is CPU-side geometry and transforms. Drawing it is left to
//! whichever renderer consumes the vertex data and bar transforms.

mod ring;
mod sphere;
mod system;

// Re-export public types
pub use ring::{hsl_to_rgb, Bar, FrequencyRing};
pub use sphere::{SoundSphere, Vertex};
pub use system::{SceneStats, VisualizerScene};
