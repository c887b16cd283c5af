//! Capture and analysis primitives the extractor depends on.
//!
//! The extractor never talks to a device directly. It drives an [`AudioHost`],
//! which opens microphone streams, wires them into a gain + analyser graph and
//! suspends or resumes its processing context. [`CpalHost`](super::CpalHost)
//! is the real implementation; tests substitute their own.

use super::CaptureError;
use crate::params::{CaptureConstraints, ChainConfig};

/// Lifecycle of the host's processing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Running,
    Suspended,
    Closed,
}

/// An open microphone stream
pub trait CaptureStream {
    /// Stop every live input track. Safe to call repeatedly.
    fn stop_tracks(&mut self);

    /// Number of tracks still delivering audio
    fn live_tracks(&self) -> usize;
}

/// A connected source -> gain -> analyser graph
pub trait AnalysisGraph {
    /// Bins produced per snapshot
    fn frequency_bin_count(&self) -> usize;

    /// Copy the latest byte magnitudes into `out` (one per bin)
    fn byte_frequency_data(&mut self, out: &mut [u8]);

    /// Detach every node. Safe to call repeatedly.
    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;
}

/// Host capability: device access plus a suspendable processing context
pub trait AudioHost {
    type Stream: CaptureStream;
    type Graph: AnalysisGraph;

    /// Request microphone access with the given processing constraints
    fn open_microphone(
        &mut self,
        constraints: &CaptureConstraints,
    ) -> Result<Self::Stream, CaptureError>;

    /// Build and connect the processing chain fed by `stream`
    fn connect(
        &mut self,
        stream: &Self::Stream,
        chain: &ChainConfig,
    ) -> Result<Self::Graph, CaptureError>;

    fn context_state(&self) -> ContextState;

    fn resume(&mut self) -> Result<(), CaptureError>;

    /// Pause processing without tearing the context down
    fn suspend(&mut self);
}
