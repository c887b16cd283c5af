//! Feature extractor: one capture session, polled once per frame.

use super::frame::FeatureFrame;
use super::host::{AnalysisGraph, AudioHost, CaptureStream, ContextState};
use super::Error;
use crate::params::ExtractorConfig;

/// One open capture pipeline
struct AudioSession<H: AudioHost> {
    stream: H::Stream,
    graph: H::Graph,
    /// Raw byte magnitudes, one per bin
    magnitudes: Vec<u8>,
    noise_threshold: u8,
}

impl<H: AudioHost> AudioSession<H> {
    fn read_frame(&mut self) -> FeatureFrame {
        self.graph.byte_frequency_data(&mut self.magnitudes);
        FeatureFrame::from_magnitudes(&self.magnitudes, self.noise_threshold)
    }

    fn close(mut self) {
        self.graph.disconnect();
        self.stream.stop_tracks();
    }
}

/// Owns at most one capture session and turns analyser snapshots into [`FeatureFrame`]s.
///
/// Driven by a single owner: `start` opens the session, `get_frame` is polled
/// each tick, `stop` releases the device. Dropping the extractor stops it.
pub struct FeatureExtractor<H: AudioHost> {
    host: H,
    config: ExtractorConfig,
    session: Option<AudioSession<H>>,
}

impl<H: AudioHost> FeatureExtractor<H> {
    /// Create an idle extractor. Fails only on invalid configuration.
    pub fn new(host: H, config: ExtractorConfig) -> Result<Self, Error> {
        config.validate().map_err(Error::InvalidConfig)?;

        Ok(Self {
            host,
            config,
            session: None,
        })
    }

    /// Open the microphone and connect the analysis chain.
    ///
    /// Returns [`Error::AlreadyActive`] if a session is open. On any capture
    /// failure, whatever was created is released before the host error is returned.
    pub fn start(&mut self) -> Result<(), Error> {
        if self.session.is_some() {
            return Err(Error::AlreadyActive);
        }

        let mut stream = self.host.open_microphone(&self.config.constraints)?;

        let mut graph = match self.host.connect(&stream, &self.config.chain) {
            Ok(graph) => graph,
            Err(e) => {
                stream.stop_tracks();
                self.host.suspend();
                tracing::warn!(error = %e, "analysis_graph_failed");
                return Err(e.into());
            }
        };

        if self.host.context_state() == ContextState::Suspended {
            if let Err(e) = self.host.resume() {
                graph.disconnect();
                stream.stop_tracks();
                tracing::warn!(error = %e, "audio_context_resume_failed");
                return Err(e.into());
            }
        }

        let resolution = self.config.resolution();
        if graph.frequency_bin_count() != resolution {
            tracing::debug!(
                host_bins = graph.frequency_bin_count(),
                resolution,
                "analysis_graph_bin_count_mismatch"
            );
        }

        self.session = Some(AudioSession {
            stream,
            graph,
            magnitudes: vec![0; resolution],
            noise_threshold: self.config.noise_threshold,
        });

        tracing::info!(resolution, "capture_session_started");
        Ok(())
    }

    /// Tear down the session and suspend the host context. No-op when idle.
    pub fn stop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };

        session.close();
        if self.host.context_state() == ContextState::Running {
            self.host.suspend();
        }

        tracing::info!("capture_session_stopped");
    }

    /// Latest shaped spectrum, or a silent frame when no session is open
    pub fn get_frame(&mut self) -> FeatureFrame {
        match self.session.as_mut() {
            Some(session) => session.read_frame(),
            None => FeatureFrame::silent(self.config.resolution()),
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Frame length (bins)
    pub fn resolution(&self) -> usize {
        self.config.resolution()
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable host access, e.g. to close it once capture is over
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

impl<H: AudioHost> Drop for FeatureExtractor<H> {
    fn drop(&mut self) {
        self.stop();
    }
}
