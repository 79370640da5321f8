use std::sync::Arc;

use crate::detection::transient_detector::TransientDetector;
use crate::models::audio_models::ListenSummary;
use crate::models::config::DetectorConfig;
use crate::models::error::CaptureError;
use crate::models::frame::Frame;
use crate::session::stop_signal::StopSignal;
use crate::traits::capture_observer::CaptureObserver;
use crate::traits::capture_stream::CaptureStream;

/// Live clap detection over a single pull-mode stream.
///
/// Runs a blocking read loop on the caller's thread:
/// ```text
/// [CaptureStream] → read_frame_timeout(frame period) → [TransientDetector] → observer
/// ```
/// Each read waits at most one frame period, so a `StopSignal` is honoured
/// within one frame period. Recoverable errors (overflow, malformed frames)
/// are logged and skipped. The loop ends when the stream closes, the signal
/// fires or the stream fails for good, and the stream is closed on every
/// exit path.
pub struct ClapListener<S: CaptureStream> {
    stream: S,
    detector: TransientDetector,
    observer: Option<Arc<dyn CaptureObserver>>,
    summary: ListenSummary,
}

impl<S: CaptureStream> ClapListener<S> {
    pub fn new(stream: S, config: &DetectorConfig) -> Result<Self, CaptureError> {
        let detector = TransientDetector::new(config, stream.config().chunk_size)?;
        Ok(Self {
            stream,
            detector,
            observer: None,
            summary: ListenSummary::default(),
        })
    }

    pub fn set_observer(&mut self, observer: Arc<dyn CaptureObserver>) {
        self.observer = Some(observer);
    }

    pub fn detector(&self) -> &TransientDetector {
        &self.detector
    }

    /// Counters of the current (or last) run.
    pub fn summary(&self) -> ListenSummary {
        self.summary
    }

    pub fn stream(&self) -> &S {
        &self.stream
    }

    /// Listen until the stream closes or `stop` fires.
    ///
    /// An interrupt is a normal return with `summary.interrupted` set.
    pub fn run(&mut self, stop: &StopSignal) -> Result<ListenSummary, CaptureError> {
        self.summary = ListenSummary::default();
        self.detector.reset();

        if let Err(e) = self.stream.open() {
            self.release();
            return Err(e);
        }
        log::info!("Listening for claps on {}", self.stream.descriptor());

        let period = self.stream.config().frame_period();
        loop {
            if stop.is_triggered() {
                self.summary.interrupted = true;
                break;
            }

            match self.stream.read_frame_timeout(period) {
                Ok(Some(frame)) => self.process(&frame),
                Ok(None) => {}
                Err(CaptureError::StreamClosed) => {
                    log::info!("Input stream closed");
                    break;
                }
                Err(e) if e.is_recoverable() => self.report(&e),
                Err(e) => {
                    log::error!("Capture failed on {}: {}", self.stream.descriptor(), e);
                    self.summary.errors += 1;
                    if let Some(ref observer) = self.observer {
                        observer.on_error(&e);
                    }
                    self.release();
                    return Err(e);
                }
            }
        }

        self.release();
        log::info!("Stopped listening: {}", self.summary);
        Ok(self.summary)
    }

    fn process(&mut self, frame: &Frame) {
        if let Some(ref observer) = self.observer {
            observer.on_frame(frame);
        }

        match self.detector.evaluate(frame) {
            Ok(event) => {
                self.summary.frames += 1;
                self.summary.last_peak = event.peak;
                self.summary.max_peak = self.summary.max_peak.max(event.peak);
                if event.triggered {
                    self.summary.detections += 1;
                    log::info!(
                        "Clap detected at {:.3}s, peak {}",
                        event.offset_secs,
                        event.peak
                    );
                }
                if let Some(ref observer) = self.observer {
                    observer.on_detection(&event);
                }
            }
            Err(e) => self.report(&e),
        }
    }

    fn report(&mut self, error: &CaptureError) {
        self.summary.errors += 1;
        log::warn!("Skipping frame: {}", error);
        if let Some(ref observer) = self.observer {
            observer.on_error(error);
        }
    }

    fn release(&mut self) {
        if let Err(e) = self.stream.close() {
            log::warn!("Failed to close {}: {}", self.stream.descriptor(), e);
        }
    }
}
