//! Frame loop configuration.

use std::time::Duration;

/// Headless frame loop configuration
#[derive(Debug, Clone)]
pub struct FrameLoopConfig {
    /// Ticks per second
    pub fps: u32,

    /// Optional run length (seconds); `None` runs until the process is stopped
    pub duration_secs: Option<f32>,

    /// Log a level report every N ticks (0 disables reports)
    pub report_every_ticks: u64,
}

impl Default for FrameLoopConfig {
    fn default() -> Self {
        Self {
            fps: 60,
            duration_secs: None,
            report_every_ticks: 30,
        }
    }
}

impl FrameLoopConfig {
    /// Tick rate actually used; zero is treated as 1 fps
    pub fn effective_fps(&self) -> u32 {
        self.fps.max(1)
    }

    /// Time budget for one tick
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.effective_fps() as f64)
    }

    /// Total number of ticks to run, if bounded
    pub fn total_ticks(&self) -> Option<u64> {
        let fps = self.effective_fps() as f32;
        self.duration_secs
            .map(|secs| (secs.max(0.0) * fps).ceil() as u64)
    }
}
