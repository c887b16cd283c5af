//! Capture and analysis configuration.

/// Microphone processing requested from the host when capture opens.
///
/// These mirror the usual browser-style constraints. Hosts that cannot apply
/// a constraint log it and carry on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConstraints {
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain_control: bool,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain_control: true,
        }
    }
}

/// Frequency analyser configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyserConfig {
    /// Analysis window size in samples (must be power of 2)
    /// Yields fft_size / 2 output bins
    pub fft_size: usize,

    /// Level mapped to byte 0 (dBFS)
    pub min_decibels: f32,

    /// Level mapped to byte 255 (dBFS)
    pub max_decibels: f32,

    /// Blend factor with the previous block (0 = no smoothing, 1 = frozen)
    pub smoothing_time_constant: f32,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: 256,
            min_decibels: -90.0,
            max_decibels: -10.0,
            smoothing_time_constant: 0.6,
        }
    }
}

impl AnalyserConfig {
    /// Number of frequency bins produced per snapshot
    pub fn frequency_bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Validate configuration (FFT size must be power of 2, etc.)
    pub fn validate(&self) -> Result<(), String> {
        if !self.fft_size.is_power_of_two() {
            return Err(format!(
                "FFT size must be power of 2, got {}",
                self.fft_size
            ));
        }
        if !(audio_constants::MIN_FFT_SIZE..=audio_constants::MAX_FFT_SIZE)
            .contains(&self.fft_size)
        {
            return Err(format!(
                "FFT size must be within {}..={}, got {}",
                audio_constants::MIN_FFT_SIZE,
                audio_constants::MAX_FFT_SIZE,
                self.fft_size
            ));
        }
        if !self.min_decibels.is_finite() || !self.max_decibels.is_finite() {
            return Err("Decibel range must be finite".to_string());
        }
        if self.min_decibels >= self.max_decibels {
            return Err(format!(
                "min_decibels ({}) must be below max_decibels ({})",
                self.min_decibels, self.max_decibels
            ));
        }
        if !(0.0..=1.0).contains(&self.smoothing_time_constant) {
            return Err(format!(
                "Smoothing must be within 0..=1, got {}",
                self.smoothing_time_constant
            ));
        }
        Ok(())
    }
}

/// Linear processing chain: source -> gain -> analyser
#[derive(Debug, Clone, PartialEq)]
pub struct ChainConfig {
    /// Linear gain applied before analysis (1.0 = unity)
    pub gain: f32,

    pub analyser: AnalyserConfig,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            gain: 1.5,
            analyser: AnalyserConfig::default(),
        }
    }
}

impl ChainConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.gain.is_finite() || self.gain < 0.0 {
            return Err(format!("Gain must be finite and >= 0, got {}", self.gain));
        }
        self.analyser.validate()
    }
}

/// Everything the feature extractor needs to open a session
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorConfig {
    pub constraints: CaptureConstraints,
    pub chain: ChainConfig,

    /// Byte magnitudes below this are treated as background noise
    pub noise_threshold: u8,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            constraints: CaptureConstraints::default(),
            chain: ChainConfig::default(),
            noise_threshold: audio_constants::DEFAULT_NOISE_THRESHOLD,
        }
    }
}

impl ExtractorConfig {
    /// Output frame length (bins)
    pub fn resolution(&self) -> usize {
        self.chain.analyser.frequency_bin_count()
    }

    pub fn validate(&self) -> Result<(), String> {
        self.chain.validate()
    }
}

/// Analysis limits (compile-time)
pub mod audio_constants {
    /// Smallest accepted analysis window
    pub const MIN_FFT_SIZE: usize = 32;

    /// Largest accepted analysis window, also the capture window capacity
    pub const MAX_FFT_SIZE: usize = 32768;

    /// Default noise floor in byte magnitude units
    pub const DEFAULT_NOISE_THRESHOLD: u8 = 3;
}
