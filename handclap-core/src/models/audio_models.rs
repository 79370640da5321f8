use std::fmt;

use serde::{Deserialize, Serialize};

/// Snapshot of an input-capable device at enumeration time.
///
/// `index` is the device's position in the host enumeration order. It goes
/// stale when hardware changes; re-enumerate instead of caching descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub index: usize,
    pub name: String,
    pub max_input_channels: u16,
    pub host_api: String,
}

impl fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ID {}: {} ({})", self.index, self.name, self.host_api)
    }
}

/// Logical recording channel a stream feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelRole {
    Left,
    Right,
    Center,
    Aux(u8),
}

impl ChannelRole {
    /// Role for the n-th selected device: left, right, then aux channels.
    pub fn for_position(position: usize) -> Self {
        match position {
            0 => Self::Left,
            1 => Self::Right,
            n => Self::Aux((n - 1).min(u8::MAX as usize) as u8),
        }
    }

    /// File stem used when persisting this channel, e.g. `left_mic`.
    pub fn file_stem(&self) -> String {
        match self {
            Self::Left => "left_mic".into(),
            Self::Right => "right_mic".into(),
            Self::Center => "center_mic".into(),
            Self::Aux(n) => format!("aux{}_mic", n),
        }
    }
}

impl fmt::Display for ChannelRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
            Self::Center => write!(f, "center"),
            Self::Aux(n) => write!(f, "aux{}", n),
        }
    }
}

/// Result of evaluating one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionEvent {
    /// Maximum absolute sample in the frame.
    pub peak: u16,
    pub triggered: bool,
    pub frame_index: u64,
    /// Start of the frame relative to stream start.
    pub offset_secs: f64,
}

/// Final amplitude readout of a listening run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenSummary {
    pub frames: u64,
    pub detections: u64,
    pub max_peak: u16,
    pub last_peak: u16,
    pub errors: u64,
    pub interrupted: bool,
}

impl fmt::Display for ListenSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} frames, {} claps, max peak {}, last peak {}",
            self.frames, self.detections, self.max_peak, self.last_peak
        )
    }
}
