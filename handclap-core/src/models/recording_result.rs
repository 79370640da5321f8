use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::audio_models::{ChannelRole, DeviceDescriptor};
use super::error::CaptureError;

/// Samples captured for one channel role, handed to the caller once sealed.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelRecording {
    pub role: ChannelRole,
    pub device: DeviceDescriptor,
    pub samples: Vec<i16>,
}

impl ChannelRecording {
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

/// Outcome of the post-seal length check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionStatus {
    /// Every channel holds the same number of samples.
    Complete,
    /// Channel lengths differ by more than the skew tolerance, or a session
    /// that ran its full duration came up short on some channel. The
    /// channels cannot be correlated sample-for-sample.
    Degraded { counts: Vec<(ChannelRole, usize)> },
}

/// A sealed recording session. No further mutation happens after
/// `MultiStreamRecorder::await_completion` returns it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSession {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub sample_rate: u32,
    /// Interleaved channels per recording.
    pub channels: u16,
    pub requested_duration: Duration,
    pub elapsed: Duration,
    /// Stopped early by a `StopSignal`.
    pub interrupted: bool,
    /// Registration order.
    pub recordings: Vec<ChannelRecording>,
    pub status: SessionStatus,
    /// Samples removed from channels that ran ahead within the skew tolerance.
    pub trimmed: Vec<(ChannelRole, usize)>,
    /// Streams that failed to close cleanly. They were still released.
    pub stop_errors: Vec<(ChannelRole, CaptureError)>,
}

impl RecordingSession {
    pub fn is_complete(&self) -> bool {
        self.status == SessionStatus::Complete
    }

    pub fn recording(&self, role: ChannelRole) -> Option<&ChannelRecording> {
        self.recordings.iter().find(|r| r.role == role)
    }

    pub fn sample_counts(&self) -> Vec<(ChannelRole, usize)> {
        self.recordings
            .iter()
            .map(|r| (r.role, r.sample_count()))
            .collect()
    }
}

/// Per-channel entry of the session sidecar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMetadata {
    pub role: ChannelRole,
    pub device_name: String,
    pub device_index: usize,
    pub sample_count: usize,
    pub file_name: String,
    pub checksum: String,
}

/// Metadata stored alongside a session's WAV files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub id: String,
    pub created_at: String,
    pub sample_rate: u32,
    pub channels: u16,
    pub duration_secs: f64,
    pub interrupted: bool,
    #[serde(flatten)]
    pub status: SessionStatus,
    pub tracks: Vec<ChannelMetadata>,
}

impl RecordingMetadata {
    pub fn new(session: &RecordingSession, tracks: Vec<ChannelMetadata>) -> Self {
        Self {
            id: session.id.to_string(),
            created_at: session.created_at.to_rfc3339(),
            sample_rate: session.sample_rate,
            channels: session.channels,
            duration_secs: session.elapsed.as_secs_f64(),
            interrupted: session.interrupted,
            status: session.status.clone(),
            tracks,
        }
    }
}
