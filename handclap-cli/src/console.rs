use std::sync::atomic::{AtomicU64, Ordering};

use handclap_core::processing::pcm;
use handclap_core::{
    CaptureError, CaptureObserver, ChannelRole, DetectionEvent, Frame, RecordingSession, SessionState,
};

/// Observer that reports to the terminal and the log.
///
/// Claps go to stdout; everything else goes through `log` so `RUST_LOG`
/// controls how chatty a run is.
#[derive(Debug, Default)]
pub struct ConsoleObserver {
    claps: AtomicU64,
}

impl ConsoleObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claps(&self) -> u64 {
        self.claps.load(Ordering::Relaxed)
    }
}

impl CaptureObserver for ConsoleObserver {
    fn on_frame(&self, frame: &Frame) {
        log::trace!(
            "frame {} level {:.3}",
            frame.index(),
            pcm::peak_level(frame.samples())
        );
    }

    fn on_detection(&self, event: &DetectionEvent) {
        if event.triggered {
            self.claps.fetch_add(1, Ordering::Relaxed);
            println!("Clap detected! Peak value: {}", event.peak);
        }
    }

    fn on_error(&self, error: &CaptureError) {
        log::debug!("capture error: {}", error);
    }

    fn on_state_changed(&self, state: &SessionState) {
        match state {
            SessionState::Recording { elapsed_secs } if *elapsed_secs > 0.0 => {
                log::info!("Recording... {:.0}s", elapsed_secs)
            }
            SessionState::Failed(e) => log::error!("Recording failed: {}", e),
            other => log::debug!("session state: {:?}", other),
        }
    }

    fn on_stop_error(&self, role: ChannelRole, error: &CaptureError) {
        eprintln!("Warning: {} channel did not stop cleanly: {}", role, error);
    }

    fn on_session_sealed(&self, session: &RecordingSession) {
        for recording in &session.recordings {
            println!(
                "{} buffer size: {} samples ({})",
                recording.role,
                recording.sample_count(),
                recording.device.name
            );
        }
    }
}
