//! Microphone capture on top of cpal.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use dagc::MonoAgc;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::fft::Analyser;
use super::host::{AnalysisGraph, AudioHost, CaptureStream, ContextState};
use super::CaptureError;
use crate::params::{audio_constants::MAX_FFT_SIZE, CaptureConstraints, ChainConfig};

/// Most recent mono samples written by the capture callback
#[derive(Debug)]
pub struct SampleWindow {
    samples: VecDeque<f32>,
    capacity: usize,
}

impl SampleWindow {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append mono samples, dropping the oldest beyond capacity
    pub fn extend(&mut self, samples: &[f32]) {
        for &sample in samples {
            if self.samples.len() == self.capacity {
                self.samples.pop_front();
            }
            self.samples.push_back(sample);
        }
    }

    /// Copy up to `count` of the newest samples into `out` (oldest first)
    pub fn copy_latest(&self, count: usize, out: &mut Vec<f32>) {
        out.clear();
        let skip = self.samples.len().saturating_sub(count);
        out.extend(self.samples.iter().skip(skip));
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// AGC target level and adaptation rate
const AGC_TARGET_RMS: f32 = 0.1;
const AGC_DISTORTION_FACTOR: f32 = 0.000001;

/// Per-callback input processing: mono downmix, then optional AGC
#[derive(Debug)]
pub struct InputConditioner {
    agc: Option<MonoAgc>,
    mono: Vec<f32>,
}

impl InputConditioner {
    pub fn new(auto_gain_control: bool) -> Result<Self, CaptureError> {
        let agc = if auto_gain_control {
            let agc = MonoAgc::new(AGC_TARGET_RMS, AGC_DISTORTION_FACTOR)
                .map_err(|e| CaptureError::Device(format!("failed to create agc: {:?}", e)))?;
            Some(agc)
        } else {
            None
        };

        Ok(Self {
            agc,
            mono: Vec::new(),
        })
    }

    pub fn has_agc(&self) -> bool {
        self.agc.is_some()
    }

    /// Downmix interleaved frames and apply gain control. Returns the mono block.
    pub fn process(&mut self, data: &[f32], channels: usize) -> &[f32] {
        self.mono.clear();
        if channels <= 1 {
            self.mono.extend_from_slice(data);
        } else {
            self.mono.extend(
                data.chunks(channels)
                    .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32),
            );
        }

        if let Some(agc) = &mut self.agc {
            agc.process(&mut self.mono);
        }
        &self.mono
    }
}

/// cpal-backed [`AudioHost`].
///
/// The "context" is the resolved input device plus a shared running flag.
/// Suspending keeps the device cached, so the next session skips enumeration.
pub struct CpalHost {
    device_name: Option<String>,
    device: Option<cpal::Device>,
    running: Arc<AtomicBool>,
    state: ContextState,
}

impl CpalHost {
    /// Host for the named input device, or the system default when `None`
    pub fn new(device_name: Option<String>) -> Self {
        Self {
            device_name,
            device: None,
            running: Arc::new(AtomicBool::new(false)),
            state: ContextState::Suspended,
        }
    }

    /// Names of all input devices on the default host
    pub fn list_input_devices() -> Result<Vec<String>, CaptureError> {
        let host = cpal::default_host();
        let devices = host
            .input_devices()
            .map_err(|e| CaptureError::Device(e.to_string()))?;

        Ok(devices
            .map(|d| d.name().unwrap_or_else(|_| "Unknown".to_string()))
            .collect())
    }

    /// Release the cached device. The host cannot be resumed afterwards.
    pub fn close(&mut self) {
        self.running.store(false, Ordering::Release);
        self.forget_device();
        self.state = ContextState::Closed;
    }

    /// Drop the cached device so the next open enumerates again
    fn forget_device(&mut self) {
        if self.device.take().is_some() {
            tracing::debug!("input_device_forgotten");
        }
    }

    fn resolve_device(&mut self) -> Result<cpal::Device, CaptureError> {
        if let Some(device) = &self.device {
            return Ok(device.clone());
        }

        let host = cpal::default_host();
        let device = match &self.device_name {
            Some(name) => host
                .input_devices()
                .map_err(|e| CaptureError::Device(e.to_string()))?
                .find(|d| d.name().map(|n| n == *name).unwrap_or(false))
                .ok_or(CaptureError::NoDevice)?,
            None => host.default_input_device().ok_or(CaptureError::NoDevice)?,
        };

        tracing::info!(
            device = %device.name().unwrap_or_else(|_| "Unknown".to_string()),
            "input_device_resolved"
        );

        self.device = Some(device.clone());
        Ok(device)
    }

    fn open_on_device(
        &self,
        device: &cpal::Device,
        constraints: &CaptureConstraints,
    ) -> Result<CpalStream, CaptureError> {
        // cpal exposes raw device input only
        tracing::debug!(
            echo_cancellation = constraints.echo_cancellation,
            noise_suppression = constraints.noise_suppression,
            "capture_constraints_not_applied_by_host"
        );

        let supported = device.default_input_config().map_err(map_config_error)?;
        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();
        let conditioner = InputConditioner::new(constraints.auto_gain_control)?;

        tracing::debug!(
            channels = config.channels,
            sample_rate = config.sample_rate.0,
            ?sample_format,
            agc = conditioner.has_agc(),
            "input_stream_config"
        );

        let window = Arc::new(Mutex::new(SampleWindow::with_capacity(MAX_FFT_SIZE)));
        let running = Arc::clone(&self.running);

        let stream = match sample_format {
            cpal::SampleFormat::F32 => {
                build_input::<f32>(device, &config, Arc::clone(&window), running, conditioner)
            }
            cpal::SampleFormat::F64 => {
                build_input::<f64>(device, &config, Arc::clone(&window), running, conditioner)
            }
            cpal::SampleFormat::I16 => {
                build_input::<i16>(device, &config, Arc::clone(&window), running, conditioner)
            }
            cpal::SampleFormat::I32 => {
                build_input::<i32>(device, &config, Arc::clone(&window), running, conditioner)
            }
            cpal::SampleFormat::U16 => {
                build_input::<u16>(device, &config, Arc::clone(&window), running, conditioner)
            }
            other => Err(CaptureError::Device(format!(
                "unsupported sample format {:?}",
                other
            ))),
        }?;

        stream.play().map_err(map_play_error)?;

        Ok(CpalStream {
            stream: Some(stream),
            window,
            sample_rate_hz: config.sample_rate.0,
        })
    }
}

impl AudioHost for CpalHost {
    type Stream = CpalStream;
    type Graph = CpalGraph;

    fn open_microphone(
        &mut self,
        constraints: &CaptureConstraints,
    ) -> Result<CpalStream, CaptureError> {
        if self.state == ContextState::Closed {
            return Err(CaptureError::Device("audio context closed".to_string()));
        }

        let device = self.resolve_device()?;
        let opened = self.open_on_device(&device, constraints);
        if opened.is_err() {
            // Unplugged or broken device: resolve again next time
            self.forget_device();
        }
        opened
    }

    fn connect(
        &mut self,
        stream: &CpalStream,
        chain: &ChainConfig,
    ) -> Result<CpalGraph, CaptureError> {
        if stream.live_tracks() == 0 {
            return Err(CaptureError::Device("capture stream already stopped".to_string()));
        }

        tracing::debug!(
            gain = chain.gain,
            fft_size = chain.analyser.fft_size,
            sample_rate = stream.sample_rate_hz,
            "analysis_graph_connected"
        );

        Ok(CpalGraph {
            window: Some(Arc::clone(&stream.window)),
            gain: chain.gain,
            analyser: Analyser::new(chain.analyser.clone()),
            scratch: Vec::with_capacity(chain.analyser.fft_size),
        })
    }

    fn context_state(&self) -> ContextState {
        self.state
    }

    fn resume(&mut self) -> Result<(), CaptureError> {
        match self.state {
            ContextState::Closed => Err(CaptureError::Device("audio context closed".to_string())),
            ContextState::Running => Ok(()),
            ContextState::Suspended => {
                self.running.store(true, Ordering::Release);
                self.state = ContextState::Running;
                Ok(())
            }
        }
    }

    fn suspend(&mut self) {
        if self.state == ContextState::Running {
            self.running.store(false, Ordering::Release);
            self.state = ContextState::Suspended;
        }
    }
}

fn build_input<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    window: Arc<Mutex<SampleWindow>>,
    running: Arc<AtomicBool>,
    mut conditioner: InputConditioner,
) -> Result<cpal::Stream, CaptureError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = config.channels as usize;
    let mut converted = Vec::new();

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                // Suspended context: drop input
                if !running.load(Ordering::Acquire) {
                    return;
                }

                converted.clear();
                converted.extend(data.iter().map(|&s| f32::from_sample(s)));

                let mono = conditioner.process(&converted, channels);

                let Ok(mut window) = window.lock() else {
                    tracing::warn!("sample_window_poisoned");
                    return;
                };
                window.extend(mono);
            },
            |err| tracing::error!(%err, "input_stream_error"),
            None,
        )
        .map_err(map_build_error)
}

fn is_permission_error(description: &str) -> bool {
    let lower = description.to_lowercase();
    lower.contains("permission") || lower.contains("denied") || lower.contains("not authorized")
}

fn map_backend_error(err: cpal::BackendSpecificError) -> CaptureError {
    if is_permission_error(&err.description) {
        CaptureError::PermissionDenied
    } else {
        CaptureError::Device(err.description)
    }
}

fn map_config_error(err: cpal::DefaultStreamConfigError) -> CaptureError {
    match err {
        cpal::DefaultStreamConfigError::DeviceNotAvailable => CaptureError::NoDevice,
        cpal::DefaultStreamConfigError::BackendSpecific { err } => map_backend_error(err),
        other => CaptureError::Device(other.to_string()),
    }
}

fn map_build_error(err: cpal::BuildStreamError) -> CaptureError {
    match err {
        cpal::BuildStreamError::DeviceNotAvailable => CaptureError::NoDevice,
        cpal::BuildStreamError::BackendSpecific { err } => map_backend_error(err),
        other => CaptureError::Device(other.to_string()),
    }
}

fn map_play_error(err: cpal::PlayStreamError) -> CaptureError {
    match err {
        cpal::PlayStreamError::DeviceNotAvailable => CaptureError::NoDevice,
        cpal::PlayStreamError::BackendSpecific { err } => map_backend_error(err),
        #[allow(unreachable_patterns)]
        other => CaptureError::Device(other.to_string()),
    }
}

/// Live cpal input stream feeding a [`SampleWindow`]
pub struct CpalStream {
    stream: Option<cpal::Stream>,
    window: Arc<Mutex<SampleWindow>>,
    sample_rate_hz: u32,
}

impl CpalStream {
    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }
}

impl CaptureStream for CpalStream {
    fn stop_tracks(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                tracing::debug!(%e, "input_stream_pause_failed");
            }
            drop(stream);
            tracing::debug!("input_stream_stopped");
        }
    }

    fn live_tracks(&self) -> usize {
        usize::from(self.stream.is_some())
    }
}

impl Drop for CpalStream {
    fn drop(&mut self) {
        self.stop_tracks();
    }
}

/// Gain + analyser reading from a capture stream's sample window
pub struct CpalGraph {
    window: Option<Arc<Mutex<SampleWindow>>>,
    gain: f32,
    analyser: Analyser,
    scratch: Vec<f32>,
}

impl AnalysisGraph for CpalGraph {
    fn frequency_bin_count(&self) -> usize {
        self.analyser.frequency_bin_count()
    }

    fn byte_frequency_data(&mut self, out: &mut [u8]) {
        let Some(window) = &self.window else {
            out.iter_mut().for_each(|b| *b = 0);
            return;
        };

        let fft_size = self.analyser.config().fft_size;
        match window.lock() {
            Ok(window) => window.copy_latest(fft_size, &mut self.scratch),
            Err(_) => {
                tracing::warn!("sample_window_poisoned");
                self.scratch.clear();
            }
        }

        let gain = self.gain;
        self.scratch.iter_mut().for_each(|s| *s *= gain);
        self.analyser.byte_frequency_data(&self.scratch, out);
    }

    fn disconnect(&mut self) {
        if self.window.take().is_some() {
            self.analyser.reset();
            tracing::debug!("analysis_graph_disconnected");
        }
    }

    fn is_connected(&self) -> bool {
        self.window.is_some()
    }
}
