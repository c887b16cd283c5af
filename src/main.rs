//! Soundsphere - microphone-driven audio-reactive sphere
//!
//! Listens to the default input, extracts a shaped spectrum every tick and
//! drives the sphere and frequency ring scene state from it.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use soundsphere::audio::{CpalHost, FeatureExtractor};
use soundsphere::cli::Args;
use soundsphere::params::FrameLoopConfig;
use soundsphere::visual::VisualizerScene;

/// Main application state
struct App {
    extractor: FeatureExtractor<CpalHost>,
    scene: VisualizerScene,
    loop_config: FrameLoopConfig,
    shutdown: Arc<AtomicBool>,
}

impl App {
    fn new(args: &Args, shutdown: Arc<AtomicBool>) -> Result<Self> {
        let host = CpalHost::new(args.device.clone());
        let extractor = FeatureExtractor::new(host, args.extractor_config())
            .context("Invalid analysis settings")?;

        Ok(Self {
            extractor,
            scene: VisualizerScene::default(),
            loop_config: args.frame_loop_config(),
            shutdown,
        })
    }

    /// Poll the extractor once per tick until the duration elapses or Ctrl-C
    fn run(&mut self) -> Result<()> {
        self.extractor
            .start()
            .context("Failed to access microphone")?;

        let interval = self.loop_config.tick_interval();
        let total_ticks = self.loop_config.total_ticks();
        let report_every = self.loop_config.report_every_ticks;
        let mut tick: u64 = 0;

        while !self.shutdown.load(Ordering::Acquire)
            && total_ticks.map_or(true, |total| tick < total)
        {
            let tick_start = Instant::now();

            let frame = self.extractor.get_frame();
            let stats = self.scene.update(&frame);

            if report_every > 0 && tick % report_every == 0 {
                tracing::info!(
                    tick,
                    average = %format!("{:.3}", stats.average),
                    peak = %format!("{:.3}", stats.peak),
                    reactive = stats.sphere_reactive,
                    tallest_bar = %format!("{:.3}", stats.tallest_bar),
                    "levels"
                );
            }

            tick += 1;
            if let Some(remaining) = interval.checked_sub(tick_start.elapsed()) {
                thread::sleep(remaining);
            }
        }

        tracing::info!(ticks = tick, "frame_loop_finished");
        self.extractor.stop();
        self.extractor.host_mut().close();
        Ok(())
    }
}

fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(env_filter)
        .init();

    let args = Args::parse();

    if args.list_devices {
        let devices = CpalHost::list_input_devices().context("Failed to enumerate devices")?;
        if devices.is_empty() {
            println!("No input devices found");
        }
        for name in devices {
            println!("{}", name);
        }
        return Ok(());
    }

    tracing::info!("soundsphere starting");

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    ctrlc::set_handler(move || flag.store(true, Ordering::Release))
        .context("Failed to install Ctrl-C handler")?;

    let mut app = App::new(&args, shutdown)?;
    app.run()
}
