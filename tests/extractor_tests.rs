// Feature extractor lifecycle against a scripted host.
// The fake host counts open tracks and connected nodes so tests can check
// that every failure path releases what it created.

use approx::assert_abs_diff_eq;
use std::cell::RefCell;
use std::rc::Rc;

use soundsphere::audio::{
    AnalysisGraph, AudioHost, CaptureError, CaptureStream, ContextState, Error, FeatureExtractor,
};
use soundsphere::params::{AnalyserConfig, CaptureConstraints, ChainConfig, ExtractorConfig};

/// Nodes in a source -> gain -> analyser chain
const CHAIN_NODES: usize = 3;

#[derive(Debug, Default)]
struct Resources {
    open_tracks: usize,
    connected_nodes: usize,
    suspend_calls: usize,
    last_constraints: Option<CaptureConstraints>,
    last_gain: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Failure {
    Microphone,
    Connect,
    Resume,
}

struct FakeHost {
    resources: Rc<RefCell<Resources>>,
    magnitudes: Rc<RefCell<Vec<u8>>>,
    failure: Option<Failure>,
    state: ContextState,
}

impl FakeHost {
    fn new() -> Self {
        Self {
            resources: Rc::new(RefCell::new(Resources::default())),
            magnitudes: Rc::new(RefCell::new(vec![0; 128])),
            failure: None,
            state: ContextState::Suspended,
        }
    }

    fn failing(failure: Failure) -> Self {
        Self {
            failure: Some(failure),
            ..Self::new()
        }
    }
}

struct FakeStream {
    resources: Rc<RefCell<Resources>>,
    live: bool,
}

impl CaptureStream for FakeStream {
    fn stop_tracks(&mut self) {
        if self.live {
            self.live = false;
            self.resources.borrow_mut().open_tracks -= 1;
        }
    }

    fn live_tracks(&self) -> usize {
        usize::from(self.live)
    }
}

struct FakeGraph {
    resources: Rc<RefCell<Resources>>,
    magnitudes: Rc<RefCell<Vec<u8>>>,
    bins: usize,
    connected: bool,
}

impl AnalysisGraph for FakeGraph {
    fn frequency_bin_count(&self) -> usize {
        self.bins
    }

    fn byte_frequency_data(&mut self, out: &mut [u8]) {
        let source = self.magnitudes.borrow();
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = if self.connected {
                source.get(i).copied().unwrap_or(0)
            } else {
                0
            };
        }
    }

    fn disconnect(&mut self) {
        if self.connected {
            self.connected = false;
            self.resources.borrow_mut().connected_nodes -= CHAIN_NODES;
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

impl AudioHost for FakeHost {
    type Stream = FakeStream;
    type Graph = FakeGraph;

    fn open_microphone(
        &mut self,
        constraints: &CaptureConstraints,
    ) -> Result<FakeStream, CaptureError> {
        if self.failure == Some(Failure::Microphone) {
            return Err(CaptureError::PermissionDenied);
        }
        let mut resources = self.resources.borrow_mut();
        resources.open_tracks += 1;
        resources.last_constraints = Some(*constraints);

        Ok(FakeStream {
            resources: Rc::clone(&self.resources),
            live: true,
        })
    }

    fn connect(
        &mut self,
        _stream: &FakeStream,
        chain: &ChainConfig,
    ) -> Result<FakeGraph, CaptureError> {
        if self.failure == Some(Failure::Connect) {
            return Err(CaptureError::Device("analyser unavailable".to_string()));
        }
        let mut resources = self.resources.borrow_mut();
        resources.connected_nodes += CHAIN_NODES;
        resources.last_gain = Some(chain.gain);

        Ok(FakeGraph {
            resources: Rc::clone(&self.resources),
            magnitudes: Rc::clone(&self.magnitudes),
            bins: chain.analyser.frequency_bin_count(),
            connected: true,
        })
    }

    fn context_state(&self) -> ContextState {
        self.state
    }

    fn resume(&mut self) -> Result<(), CaptureError> {
        if self.failure == Some(Failure::Resume) {
            return Err(CaptureError::NoDevice);
        }
        self.state = ContextState::Running;
        Ok(())
    }

    fn suspend(&mut self) {
        self.resources.borrow_mut().suspend_calls += 1;
        self.state = ContextState::Suspended;
    }
}

fn extractor(host: FakeHost) -> FeatureExtractor<FakeHost> {
    FeatureExtractor::new(host, ExtractorConfig::default()).unwrap()
}

fn expected(magnitude: u8) -> f32 {
    if magnitude < 3 {
        return 0.0;
    }
    let n = magnitude as f32 / 255.0;
    n.sqrt() * n
}

#[test]
fn test_never_started_returns_silence() {
    let mut extractor = extractor(FakeHost::new());

    let frame = extractor.get_frame();
    assert_eq!(frame.len(), 128);
    assert!(frame.iter().all(|&v| v == 0.0));
    assert!(!extractor.is_active());
}

#[test]
fn test_start_opens_chain_with_capture_settings() {
    let host = FakeHost::new();
    let resources = Rc::clone(&host.resources);
    let mut extractor = extractor(host);

    extractor.start().unwrap();

    assert!(extractor.is_active());
    assert_eq!(extractor.host().context_state(), ContextState::Running);

    let resources = resources.borrow();
    assert_eq!(resources.open_tracks, 1);
    assert_eq!(resources.connected_nodes, CHAIN_NODES);
    assert_eq!(resources.last_gain, Some(1.5));

    let constraints = resources.last_constraints.unwrap();
    assert!(constraints.echo_cancellation);
    assert!(constraints.noise_suppression);
    assert!(constraints.auto_gain_control);
}

#[test]
fn test_frames_have_fixed_length_while_active() {
    let host = FakeHost::new();
    let magnitudes = Rc::clone(&host.magnitudes);
    let mut extractor = extractor(host);
    extractor.start().unwrap();

    for level in [0u8, 10, 128, 255] {
        *magnitudes.borrow_mut() = vec![level; 128];
        let frame = extractor.get_frame();

        assert_eq!(frame.len(), 128);
        assert_abs_diff_eq!(frame[0], expected(level), epsilon = 1e-6);
    }

    // Host returning fewer bins still yields a full-length frame
    *magnitudes.borrow_mut() = vec![255; 10];
    let frame = extractor.get_frame();
    assert_eq!(frame.len(), 128);
    assert_eq!(frame[9], 1.0);
    assert_eq!(frame[10], 0.0);
}

#[test]
fn test_synthetic_magnitudes_follow_curve() {
    let host = FakeHost::new();
    let magnitudes = Rc::clone(&host.magnitudes);
    let mut extractor = extractor(host);
    extractor.start().unwrap();

    let mut input = vec![0u8; 128];
    input[..6].copy_from_slice(&[0, 0, 5, 250, 2, 255]);
    *magnitudes.borrow_mut() = input.clone();

    let frame = extractor.get_frame();

    assert_eq!(frame[0], 0.0);
    assert_eq!(frame[1], 0.0);
    assert_abs_diff_eq!(frame[2], (5.0f32 / 255.0).powf(1.5), epsilon = 1e-6);
    assert_abs_diff_eq!(frame[3], (250.0f32 / 255.0).powf(1.5), epsilon = 1e-6);
    assert_eq!(frame[4], 0.0); // under the noise floor
    assert_eq!(frame[5], 1.0);

    for (value, &magnitude) in frame.iter().zip(&input) {
        assert_abs_diff_eq!(*value, expected(magnitude), epsilon = 1e-6);
    }
}

#[test]
fn test_stop_returns_to_silence_and_releases_everything() {
    let host = FakeHost::new();
    let resources = Rc::clone(&host.resources);
    let magnitudes = Rc::clone(&host.magnitudes);
    let mut extractor = extractor(host);

    extractor.start().unwrap();
    *magnitudes.borrow_mut() = vec![200; 128];
    assert!(!extractor.get_frame().is_silent());

    extractor.stop();

    let frame = extractor.get_frame();
    assert_eq!(frame.len(), 128);
    assert!(frame.is_silent());
    assert!(!extractor.is_active());
    assert_eq!(extractor.host().context_state(), ContextState::Suspended);

    let resources = resources.borrow();
    assert_eq!(resources.open_tracks, 0);
    assert_eq!(resources.connected_nodes, 0);
    assert_eq!(resources.suspend_calls, 1);
}

#[test]
fn test_double_stop_is_harmless() {
    let host = FakeHost::new();
    let resources = Rc::clone(&host.resources);
    let mut extractor = extractor(host);

    extractor.start().unwrap();
    extractor.stop();
    extractor.stop();

    assert!(!extractor.is_active());
    assert_eq!(resources.borrow().suspend_calls, 1);
    assert_eq!(resources.borrow().open_tracks, 0);
}

#[test]
fn test_stop_before_start_is_noop() {
    let host = FakeHost::new();
    let resources = Rc::clone(&host.resources);
    let mut extractor = extractor(host);

    extractor.stop();

    assert_eq!(resources.borrow().suspend_calls, 0);
    assert!(extractor.get_frame().is_silent());
}

#[test]
fn test_permission_denied_leaves_nothing_open() {
    let host = FakeHost::failing(Failure::Microphone);
    let resources = Rc::clone(&host.resources);
    let mut extractor = extractor(host);

    let err = extractor.start().unwrap_err();

    assert!(matches!(
        err,
        Error::CaptureUnavailable(CaptureError::PermissionDenied)
    ));
    assert_eq!(err.to_string(), "microphone access denied");
    assert!(!extractor.is_active());
    assert_eq!(resources.borrow().open_tracks, 0);
    assert_eq!(resources.borrow().connected_nodes, 0);
    assert!(extractor.get_frame().is_silent());
}

#[test]
fn test_graph_failure_stops_tracks() {
    let host = FakeHost::failing(Failure::Connect);
    let resources = Rc::clone(&host.resources);
    let mut extractor = extractor(host);

    let err = extractor.start().unwrap_err();

    assert!(matches!(
        err,
        Error::CaptureUnavailable(CaptureError::Device(ref msg)) if msg == "analyser unavailable"
    ));
    assert_eq!(resources.borrow().open_tracks, 0);
    assert_eq!(resources.borrow().connected_nodes, 0);
    assert!(!extractor.is_active());
}

#[test]
fn test_resume_failure_disconnects_graph() {
    let host = FakeHost::failing(Failure::Resume);
    let resources = Rc::clone(&host.resources);
    let mut extractor = extractor(host);

    let err = extractor.start().unwrap_err();

    assert!(matches!(
        err,
        Error::CaptureUnavailable(CaptureError::NoDevice)
    ));
    assert_eq!(resources.borrow().open_tracks, 0);
    assert_eq!(resources.borrow().connected_nodes, 0);
    assert!(!extractor.is_active());
}

#[test]
fn test_second_start_is_rejected_without_leaking() {
    let host = FakeHost::new();
    let resources = Rc::clone(&host.resources);
    let mut extractor = extractor(host);

    extractor.start().unwrap();
    let err = extractor.start().unwrap_err();

    assert!(matches!(err, Error::AlreadyActive));
    assert!(extractor.is_active());
    assert_eq!(resources.borrow().open_tracks, 1);
    assert_eq!(resources.borrow().connected_nodes, CHAIN_NODES);
}

#[test]
fn test_restart_after_stop() {
    let host = FakeHost::new();
    let resources = Rc::clone(&host.resources);
    let mut extractor = extractor(host);

    extractor.start().unwrap();
    extractor.stop();
    extractor.start().unwrap();

    assert!(extractor.is_active());
    assert_eq!(extractor.get_frame().len(), 128);
    assert_eq!(resources.borrow().open_tracks, 1);
}

#[test]
fn test_drop_tears_down_session() {
    let host = FakeHost::new();
    let resources = Rc::clone(&host.resources);

    {
        let mut extractor = extractor(host);
        extractor.start().unwrap();
        assert_eq!(resources.borrow().open_tracks, 1);
    }

    assert_eq!(resources.borrow().open_tracks, 0);
    assert_eq!(resources.borrow().connected_nodes, 0);
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = ExtractorConfig {
        chain: ChainConfig {
            analyser: AnalyserConfig {
                fft_size: 100,
                ..Default::default()
            },
            ..Default::default()
        },
        ..Default::default()
    };

    let result = FeatureExtractor::new(FakeHost::new(), config);
    assert!(matches!(result, Err(Error::InvalidConfig(_))));
}

#[test]
fn test_resolution_follows_fft_size() {
    let config = ExtractorConfig {
        chain: ChainConfig {
            analyser: AnalyserConfig {
                fft_size: 1024,
                ..Default::default()
            },
            ..Default::default()
        },
        ..Default::default()
    };
    let mut extractor = FeatureExtractor::new(FakeHost::new(), config).unwrap();

    assert_eq!(extractor.resolution(), 512);
    assert_eq!(extractor.get_frame().len(), 512);

    extractor.start().unwrap();
    assert_eq!(extractor.get_frame().len(), 512);
}
