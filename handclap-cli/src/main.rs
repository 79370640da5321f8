mod commands;
mod console;
mod selection;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use handclap_core::{OverflowPolicy, Settings, StopSignal};
use handclap_cpal::CpalBackend;

use selection::DeviceSelector;

#[derive(Parser, Debug)]
#[command(name = "handclap")]
#[command(about = "Detect hand claps live, or record several microphones at once")]
#[command(version)]
struct Cli {
    /// JSON settings file; flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    capture: CaptureArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Default)]
struct CaptureArgs {
    /// Sample rate in Hz
    #[arg(long, global = true)]
    rate: Option<u32>,

    /// Samples per channel in one frame
    #[arg(long, global = true)]
    chunk: Option<usize>,

    /// Report overflow as an error instead of silently dropping old audio
    #[arg(long, global = true)]
    strict_overflow: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List audio input devices
    Devices {
        /// Only devices whose name contains this (case-insensitive)
        #[arg(long)]
        filter: Option<String>,
    },

    /// Listen on one device and report claps until Ctrl+C
    Listen {
        /// Device ID from `handclap devices`
        #[arg(long, conflicts_with = "device_name")]
        device: Option<usize>,

        /// First device whose name contains this
        #[arg(long)]
        device_name: Option<String>,

        /// Peak level (0-32767) a frame must exceed to count as a clap
        #[arg(long)]
        threshold: Option<u16>,

        /// Fraction of the threshold the level must fall below to re-arm
        #[arg(long)]
        release_ratio: Option<f32>,
    },

    /// Record from two or more devices and save one WAV per microphone
    Record {
        /// Device IDs in channel order (left, right, ...)
        #[arg(long, value_delimiter = ',', conflicts_with = "filter")]
        devices: Vec<usize>,

        /// Use the first devices whose name contains this
        #[arg(long)]
        filter: Option<String>,

        /// Recording length in seconds
        #[arg(long)]
        duration: Option<f64>,

        /// Where WAV files and metadata are written
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Fewest devices to record from
        #[arg(long)]
        min_devices: Option<usize>,
    },
}

/// Load settings (file or defaults) and fold command-line overrides in.
fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match cli.config {
        Some(ref path) => Settings::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => Settings::default(),
    };

    if let Some(rate) = cli.capture.rate {
        settings.capture.sample_rate = rate;
    }
    if let Some(chunk) = cli.capture.chunk {
        settings.capture.chunk_size = chunk;
    }
    if cli.capture.strict_overflow {
        settings.capture.overflow_policy = OverflowPolicy::Fail;
    }

    match cli.command {
        Commands::Listen {
            threshold,
            release_ratio,
            ..
        } => {
            if let Some(threshold) = threshold {
                settings.detector.threshold = threshold;
            }
            if let Some(ratio) = release_ratio {
                settings.detector.release_ratio = ratio;
            }
        }
        Commands::Record {
            ref filter,
            duration,
            ref out_dir,
            min_devices,
            ..
        } => {
            if let Some(ref filter) = filter {
                settings.device_filter = filter.clone();
            }
            if let Some(duration) = duration {
                settings.record_duration_secs = duration;
            }
            if let Some(ref dir) = out_dir {
                settings.output_directory = dir.clone();
            }
            if let Some(min) = min_devices {
                settings.recorder.min_streams = min;
            }
        }
        Commands::Devices { .. } => {}
    }

    settings.validate().context("invalid settings")?;
    Ok(settings)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = resolve_settings(&cli)?;
    let backend = CpalBackend::new();
    log::debug!("Using {} host, settings {:?}", backend.host_name(), settings);

    let stop = StopSignal::new();
    let handler_stop = stop.clone();
    ctrlc::set_handler(move || handler_stop.trigger()).context("installing Ctrl+C handler")?;

    match cli.command {
        Commands::Devices { ref filter } => {
            commands::list_devices(&backend, filter.as_deref()).context("listing devices")?
        }
        Commands::Listen {
            device,
            ref device_name,
            ..
        } => commands::listen(&backend, &settings, device, device_name.as_deref(), &stop)
            .context("listening")?,
        Commands::Record { ref devices, .. } => {
            let selector = if devices.is_empty() {
                DeviceSelector::NameFilter(settings.device_filter.clone())
            } else {
                DeviceSelector::Ids(devices.clone())
            };
            commands::record(&backend, &settings, &selector, &stop).context("recording")?
        }
    }

    Ok(())
}
