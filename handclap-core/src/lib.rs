//! # handclap-core
//!
//! Host-agnostic clap detection and multi-microphone recording.
//!
//! Audio backends (cpal in `handclap-cpal`, scripted fakes in tests)
//! implement `CaptureStream` and `DeviceEnumerator`; everything above that
//! seam lives here.
//!
//! ## Architecture
//!
//! ```text
//! handclap-core (this crate)
//! ├── traits/       ← CaptureStream, DeviceEnumerator, CaptureObserver
//! ├── models/       ← CaptureError, Frame, configuration, session results
//! ├── processing/   ← FrameRouter, FrameAssembler, RingBuffer, PCM, WAV header
//! ├── detection/    ← TransientDetector
//! ├── session/      ← ClapListener, MultiStreamRecorder, StopSignal
//! └── storage/      ← WAV writer, session export, metadata sidecar
//! ```

pub mod detection;
pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

// Re-export key types at crate root for convenience.
pub use detection::transient_detector::{DetectorState, TransientDetector};
pub use models::audio_models::{ChannelRole, DetectionEvent, DeviceDescriptor, ListenSummary};
pub use models::config::{
    CaptureConfiguration, DetectorConfig, OverflowPolicy, RecorderConfig, Settings,
    MAX_RECORD_DURATION_SECS,
};
pub use models::error::CaptureError;
pub use models::frame::Frame;
pub use models::recording_result::{
    ChannelMetadata, ChannelRecording, RecordingMetadata, RecordingSession, SessionStatus,
};
pub use models::state::SessionState;
pub use processing::frame_router::FrameRouter;
pub use session::listener::ClapListener;
pub use session::recorder::{MultiStreamRecorder, RecordingHandle};
pub use session::stop_signal::StopSignal;
pub use storage::export::write_session;
pub use traits::capture_observer::CaptureObserver;
pub use traits::capture_stream::{CaptureStream, FrameCallback};
pub use traits::device_enumerator::{name_contains, DeviceEnumerator};
