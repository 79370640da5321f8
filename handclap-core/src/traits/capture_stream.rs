use std::sync::Arc;
use std::time::Duration;

use crate::models::audio_models::DeviceDescriptor;
use crate::models::config::CaptureConfiguration;
use crate::models::error::CaptureError;
use crate::models::frame::Frame;

/// Push-mode frame handler.
///
/// Runs on the audio subsystem's delivery thread. Must copy and return; any
/// blocking here starves the host and drops samples.
pub type FrameCallback = Arc<dyn Fn(Frame) + Send + Sync + 'static>;

/// One open (or openable) audio input device.
///
/// Implemented by:
/// - `CpalCaptureStream` (handclap-cpal)
/// - `FakeCaptureStream` (tests, `test-util` feature)
///
/// Frames are delivered either by pull (`read_frame*`) or, after `start`,
/// by push to the registered callback. Not `Send`: some host backends pin
/// their stream handle to the thread that built it.
pub trait CaptureStream {
    /// Device backing this stream.
    fn descriptor(&self) -> &DeviceDescriptor;

    /// Format the stream was created with.
    fn config(&self) -> &CaptureConfiguration;

    /// Acquire the device and begin capturing into the pull queue.
    /// Opening an open stream is a no-op.
    fn open(&mut self) -> Result<(), CaptureError>;

    fn is_open(&self) -> bool;

    /// Wait up to `timeout` for the next frame.
    ///
    /// `Ok(None)` on timeout. `Err(StreamClosed)` once the stream is closed
    /// and less than a frame remains queued.
    fn read_frame_timeout(&mut self, timeout: Duration) -> Result<Option<Frame>, CaptureError>;

    /// Block until a full frame has been captured.
    fn read_frame(&mut self) -> Result<Frame, CaptureError> {
        let period = self.config().frame_period();
        loop {
            if let Some(frame) = self.read_frame_timeout(period)? {
                return Ok(frame);
            }
        }
    }

    /// Switch to push delivery, opening the device first if needed.
    fn start(&mut self, callback: FrameCallback) -> Result<(), CaptureError>;

    /// Release the device. Safe to call repeatedly.
    fn close(&mut self) -> Result<(), CaptureError>;
}
