//! Frequency analyser: windowed FFT with smoothing and decibel-to-byte mapping.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

use crate::params::AnalyserConfig;

/// Short-time spectrum analyser producing byte magnitudes per bin
pub struct Analyser {
    config: AnalyserConfig,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    /// Smoothed linear magnitudes from the previous snapshot
    smoothed: Vec<f32>,
}

impl Analyser {
    /// Plan the FFT and precompute the window. `config` must already be validated.
    pub fn new(config: AnalyserConfig) -> Self {
        let size = config.fft_size;
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let window = (0..size).map(|i| blackman_window(i, size)).collect();

        Self {
            fft,
            window,
            buffer: vec![Complex::new(0.0, 0.0); size],
            smoothed: vec![0.0; config.frequency_bin_count()],
            config,
        }
    }

    pub fn config(&self) -> &AnalyserConfig {
        &self.config
    }

    pub fn frequency_bin_count(&self) -> usize {
        self.smoothed.len()
    }

    /// Analyse the most recent `fft_size` samples and write one byte per bin into `out`.
    ///
    /// Short input is treated as preceded by silence. Extra bins in `out` are left untouched.
    pub fn byte_frequency_data(&mut self, samples: &[f32], out: &mut [u8]) {
        self.update_spectrum(samples);

        let range = self.config.max_decibels - self.config.min_decibels;
        let scale = u8::MAX as f32 / range;

        for (byte, &magnitude) in out.iter_mut().zip(&self.smoothed) {
            *byte = decibels_to_byte(magnitude, self.config.min_decibels, scale);
        }
    }

    /// Drop smoothing history
    pub fn reset(&mut self) {
        self.smoothed.iter_mut().for_each(|m| *m = 0.0);
    }

    fn update_spectrum(&mut self, samples: &[f32]) {
        let size = self.config.fft_size;
        let recent = &samples[samples.len().saturating_sub(size)..];
        let lead = size - recent.len();

        // Apply window, zero-padding the front when history is short
        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let sample = if i < lead { 0.0 } else { recent[i - lead] };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process(&mut self.buffer);

        let tau = self.config.smoothing_time_constant;
        let norm = 1.0 / size as f32;

        for (k, smoothed) in self.smoothed.iter_mut().enumerate() {
            let current = self.buffer[k].norm() * norm;
            let blended = tau * *smoothed + (1.0 - tau) * current;
            *smoothed = if blended.is_finite() { blended } else { 0.0 };
        }
    }
}

/// Map a linear magnitude onto [0, 255] through the decibel window
fn decibels_to_byte(magnitude: f32, min_decibels: f32, scale: f32) -> u8 {
    if magnitude <= 0.0 {
        return 0;
    }
    let db = 20.0 * magnitude.log10();
    let scaled = ((db - min_decibels) * scale).floor();
    if scaled.is_nan() {
        return 0;
    }
    scaled.clamp(0.0, u8::MAX as f32) as u8
}

/// Blackman window (alpha = 0.16) used by the analyser
pub fn blackman_window(index: usize, size: usize) -> f32 {
    let phase = 2.0 * PI * index as f32 / size as f32;
    0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos()
}
