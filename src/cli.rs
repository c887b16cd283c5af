//! Command-line argument parsing.

use clap::Parser;

use crate::params::{
    audio_constants::DEFAULT_NOISE_THRESHOLD, AnalyserConfig, ChainConfig, ExtractorConfig,
    FrameLoopConfig,
};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "soundsphere")]
#[command(about = "Microphone-driven audio-reactive sphere", long_about = None)]
pub struct Args {
    /// Input device name (default: system default input)
    #[arg(long, value_name = "NAME")]
    pub device: Option<String>,

    /// List input devices and exit
    #[arg(long)]
    pub list_devices: bool,

    /// Linear gain applied before analysis
    #[arg(long, value_name = "X", default_value_t = 1.5)]
    pub gain: f32,

    /// Noise floor in byte magnitude units (0-255)
    #[arg(long, value_name = "BYTE", default_value_t = DEFAULT_NOISE_THRESHOLD)]
    pub threshold: u8,

    /// Analyser smoothing (0 = none, 1 = frozen)
    #[arg(long, value_name = "T", default_value_t = 0.6)]
    pub smoothing: f32,

    /// Analysis window in samples (power of 2)
    #[arg(long, value_name = "N", default_value_t = 256)]
    pub fft_size: usize,

    /// Level mapped to zero (dBFS)
    #[arg(long, value_name = "DB", default_value_t = -90.0, allow_hyphen_values = true)]
    pub min_db: f32,

    /// Level mapped to full scale (dBFS)
    #[arg(long, value_name = "DB", default_value_t = -10.0, allow_hyphen_values = true)]
    pub max_db: f32,

    /// Frame loop rate
    #[arg(
        long,
        value_name = "N",
        default_value_t = 60,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub fps: u32,

    /// Stop after this many seconds (default: run until interrupted)
    #[arg(long, value_name = "SECONDS")]
    pub duration: Option<f32>,

    /// Log a level report every N ticks (0 disables)
    #[arg(long, value_name = "TICKS", default_value_t = 30)]
    pub report_every: u64,
}

impl Args {
    /// Build extractor configuration from command-line arguments
    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            chain: ChainConfig {
                gain: self.gain,
                analyser: AnalyserConfig {
                    fft_size: self.fft_size,
                    min_decibels: self.min_db,
                    max_decibels: self.max_db,
                    smoothing_time_constant: self.smoothing,
                },
            },
            noise_threshold: self.threshold,
            ..Default::default()
        }
    }

    /// Build frame loop configuration from command-line arguments
    pub fn frame_loop_config(&self) -> FrameLoopConfig {
        FrameLoopConfig {
            fps: self.fps,
            duration_secs: self.duration,
            report_every_ticks: self.report_every,
        }
    }
}
