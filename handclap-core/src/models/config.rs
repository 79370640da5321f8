use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::CaptureError;

/// Longest recording `Settings` accepts (one day).
pub const MAX_RECORD_DURATION_SECS: f64 = 24.0 * 60.0 * 60.0;

/// What a pull-mode stream does when its input ring fills up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Drop the oldest unread samples and keep going.
    #[default]
    DropOldest,
    /// Drop the oldest unread samples and fail the next read with
    /// `CaptureError::Overflow`.
    Fail,
}

/// Format of a single capture stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfiguration {
    /// Sample rate in Hz (default: 44100).
    pub sample_rate: u32,

    /// Channels per stream (default: 1).
    pub channels: u16,

    /// Frame length in samples per channel (default: 1024).
    pub chunk_size: usize,

    /// Pull-mode ring capacity, in frames (default: 32).
    pub buffer_frames: usize,

    pub overflow_policy: OverflowPolicy,
}

impl CaptureConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if self.channels == 0 {
            return Err("channel count must be positive".into());
        }
        if self.chunk_size == 0 {
            return Err("chunk size must be positive".into());
        }
        if self.buffer_frames == 0 {
            return Err("buffer must hold at least one frame".into());
        }
        Ok(())
    }

    /// Interleaved samples in one frame.
    pub fn frame_len(&self) -> usize {
        self.chunk_size * self.channels as usize
    }

    /// Wall-clock length of one frame.
    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(self.chunk_size as f64 / self.sample_rate as f64)
    }
}

impl Default for CaptureConfiguration {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 1,
            chunk_size: 1024,
            buffer_frames: 32,
            overflow_policy: OverflowPolicy::DropOldest,
        }
    }
}

/// Transient detector tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Peak magnitude (16-bit scale) a frame must exceed to trigger.
    pub threshold: u16,

    /// Fraction of `threshold` the peak must fall below to re-arm.
    pub release_ratio: f32,
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.release_ratio > 0.0 && self.release_ratio < 1.0) {
            return Err(format!(
                "release ratio must be in (0, 1), got {}",
                self.release_ratio
            ));
        }
        Ok(())
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold: 4000,
            release_ratio: 0.5,
        }
    }
}

/// Multi-stream recorder policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Distinct devices a session needs before any stream is opened.
    pub min_streams: usize,

    /// Length difference, in frames, still accepted as start-time skew.
    pub skew_tolerance_frames: usize,

    /// Host start-up latency a full-length session may lose per channel
    /// before it is sealed degraded (default: 200 ms).
    pub latency_allowance_ms: u64,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            min_streams: 2,
            skew_tolerance_frames: 1,
            latency_allowance_ms: 200,
        }
    }
}

/// Everything the command surface can configure, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub capture: CaptureConfiguration,
    pub detector: DetectorConfig,
    pub recorder: RecorderConfig,
    pub record_duration_secs: f64,
    /// Case-insensitive name substring used to pick recording devices.
    pub device_filter: String,
    pub output_directory: PathBuf,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, CaptureError> {
        let json = fs::read_to_string(path).map_err(|e| {
            CaptureError::ConfigurationFailed(format!("failed to read {}: {}", path.display(), e))
        })?;
        let settings: Settings = serde_json::from_str(&json).map_err(|e| {
            CaptureError::ConfigurationFailed(format!("failed to parse {}: {}", path.display(), e))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), CaptureError> {
        self.capture
            .validate()
            .map_err(CaptureError::ConfigurationFailed)?;
        self.detector
            .validate()
            .map_err(CaptureError::ConfigurationFailed)?;
        if !(self.record_duration_secs.is_finite() && self.record_duration_secs > 0.0) {
            return Err(CaptureError::ConfigurationFailed(
                "record duration must be positive".into(),
            ));
        }
        if self.record_duration_secs > MAX_RECORD_DURATION_SECS {
            return Err(CaptureError::ConfigurationFailed(format!(
                "record duration must be at most {} seconds, got {}",
                MAX_RECORD_DURATION_SECS, self.record_duration_secs
            )));
        }
        if self.recorder.min_streams == 0 {
            return Err(CaptureError::ConfigurationFailed(
                "at least one recording device is required".into(),
            ));
        }
        Ok(())
    }

    pub fn record_duration(&self) -> Result<Duration, CaptureError> {
        Duration::try_from_secs_f64(self.record_duration_secs).map_err(|e| {
            CaptureError::ConfigurationFailed(format!(
                "invalid record duration {}: {}",
                self.record_duration_secs, e
            ))
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            capture: CaptureConfiguration::default(),
            detector: DetectorConfig::default(),
            recorder: RecorderConfig::default(),
            record_duration_secs: 10.0,
            device_filter: "usb".into(),
            output_directory: PathBuf::from("."),
        }
    }
}
