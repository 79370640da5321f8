use crate::models::audio_models::{ChannelRole, DetectionEvent};
use crate::models::error::CaptureError;
use crate::models::frame::Frame;
use crate::models::recording_result::RecordingSession;
use crate::models::state::SessionState;

/// Observability sink for the listener and recorder.
///
/// Listener callbacks run on the control thread. Recorder callbacks run on
/// the control thread too; frame delivery threads never call into an
/// observer.
pub trait CaptureObserver: Send + Sync {
    /// Every frame the listener pulls, before detection.
    fn on_frame(&self, _frame: &Frame) {}

    /// Every evaluated frame. `event.triggered` marks a clap.
    fn on_detection(&self, event: &DetectionEvent);

    /// A recoverable error the listener logged and skipped past.
    fn on_error(&self, _error: &CaptureError) {}

    fn on_state_changed(&self, _state: &SessionState) {}

    /// Called once per stream that failed to stop cleanly.
    fn on_stop_error(&self, _role: ChannelRole, _error: &CaptureError) {}

    fn on_session_sealed(&self, _session: &RecordingSession) {}
}
