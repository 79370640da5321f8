use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, RwLock};

use crate::models::config::{CaptureConfiguration, OverflowPolicy};
use crate::models::error::CaptureError;
use crate::models::frame::Frame;
use crate::processing::frame_assembler::FrameAssembler;
use crate::processing::ring_buffer::RingBuffer;
use crate::traits::capture_stream::FrameCallback;

struct RouterState {
    ring: RingBuffer,
    assembler: FrameAssembler,
    /// Samples that have left the front of the ring, read or dropped.
    read_position: u64,
    pending_overflow: u64,
    overflowing: bool,
    closed: bool,
}

/// Hand-off point between a host delivery thread and the stream owner.
///
/// Backends share one router (`Arc<FrameRouter>`) between their audio
/// callback, which calls `deliver`, and the `CaptureStream` implementation,
/// which reads frames or installs a push handler.
///
/// ```text
///                      ┌→ [FrameAssembler] → handler(Frame)   (push)
/// host callback → deliver
///                      └→ [RingBuffer] → read_frame_timeout    (pull)
/// ```
pub struct FrameRouter {
    config: CaptureConfiguration,
    state: Mutex<RouterState>,
    frame_ready: Condvar,
    handler: RwLock<Option<FrameCallback>>,
    dropped_total: AtomicU64,
}

impl FrameRouter {
    pub fn new(config: CaptureConfiguration) -> Self {
        let capacity = config.frame_len() * config.buffer_frames.max(1);
        Self {
            state: Mutex::new(RouterState {
                ring: RingBuffer::new(capacity.max(1)),
                assembler: FrameAssembler::new(&config),
                read_position: 0,
                pending_overflow: 0,
                overflowing: false,
                closed: true,
            }),
            config,
            frame_ready: Condvar::new(),
            handler: RwLock::new(None),
            dropped_total: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &CaptureConfiguration {
        &self.config
    }

    /// Called from the host delivery thread with freshly captured samples.
    ///
    /// Never blocks beyond the router's own short critical section.
    pub fn deliver(&self, samples: &[i16]) {
        let handler = self.handler.read().clone();
        let mut state = self.state.lock();
        if state.closed {
            return;
        }

        if let Some(handler) = handler {
            let mut frames = Vec::new();
            state.assembler.push(samples, |frame| frames.push(frame));
            drop(state);
            for frame in frames {
                handler(frame);
            }
            return;
        }

        let dropped = state.ring.write(samples) as u64;
        if dropped > 0 {
            state.read_position += dropped;
            self.dropped_total.fetch_add(dropped, Ordering::Relaxed);
            if self.config.overflow_policy == OverflowPolicy::Fail {
                state.pending_overflow += dropped;
            }
            if !state.overflowing {
                state.overflowing = true;
                log::warn!("Input overflow: dropped {} unread samples", dropped);
            }
        }

        let ready = state.ring.count() >= self.config.frame_len();
        drop(state);
        if ready {
            self.frame_ready.notify_all();
        }
    }

    /// Wait up to `timeout` for a full frame from the pull queue.
    pub fn read_frame_timeout(&self, timeout: Duration) -> Result<Option<Frame>, CaptureError> {
        let deadline = Instant::now() + timeout;
        let frame_len = self.config.frame_len();
        let mut state = self.state.lock();
        let mut timed_out = false;

        // A delivery can land while the wait times out, so the overflow and
        // closed checks run once more before giving up.
        loop {
            if state.pending_overflow > 0 {
                let dropped = std::mem::take(&mut state.pending_overflow);
                return Err(CaptureError::Overflow { dropped });
            }

            if let Some(samples) = state.ring.read_exact(frame_len) {
                let index = state.read_position / frame_len as u64;
                state.read_position += frame_len as u64;
                state.overflowing = false;
                return Ok(Some(Frame::new(
                    samples,
                    self.config.sample_rate,
                    self.config.channels,
                    index,
                )));
            }

            if state.closed {
                return Err(CaptureError::StreamClosed);
            }

            if timed_out {
                return Ok(None);
            }
            timed_out = self.frame_ready.wait_until(&mut state, deadline).timed_out();
        }
    }

    /// Route subsequent deliveries to `handler` instead of the pull queue.
    pub fn set_handler(&self, handler: FrameCallback) {
        *self.handler.write() = Some(handler);
    }

    pub fn clear_handler(&self) {
        *self.handler.write() = None;
    }

    /// Start accepting deliveries with empty buffers and frame indices at zero.
    pub fn open(&self) {
        let mut state = self.state.lock();
        state.ring.reset();
        state.assembler.reset();
        state.read_position = 0;
        state.pending_overflow = 0;
        state.overflowing = false;
        state.closed = false;
    }

    /// Stop accepting deliveries and wake blocked readers. Frames already
    /// queued can still be read.
    pub fn close(&self) {
        self.state.lock().closed = true;
        self.frame_ready.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Samples dropped to overflow since construction.
    pub fn dropped_total(&self) -> u64 {
        self.dropped_total.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn config(chunk_size: usize, buffer_frames: usize, policy: OverflowPolicy) -> CaptureConfiguration {
        CaptureConfiguration {
            sample_rate: 8000,
            channels: 1,
            chunk_size,
            buffer_frames,
            overflow_policy: policy,
        }
    }

    #[test]
    fn pull_returns_full_frames_only() {
        let router = FrameRouter::new(config(4, 4, OverflowPolicy::DropOldest));
        router.open();
        router.deliver(&[1, 2, 3]);

        assert_eq!(router.read_frame_timeout(Duration::from_millis(1)).unwrap(), None);

        router.deliver(&[4, 5]);
        let frame = router
            .read_frame_timeout(Duration::from_millis(1))
            .unwrap()
            .unwrap();
        assert_eq!(frame.samples(), &[1, 2, 3, 4]);
        assert_eq!(frame.index(), 0);
    }

    #[test]
    fn overflow_drops_oldest_and_keeps_reading() {
        let router = FrameRouter::new(config(2, 2, OverflowPolicy::DropOldest));
        router.open();
        router.deliver(&[1, 2, 3, 4, 5, 6]);

        let frame = router
            .read_frame_timeout(Duration::from_millis(1))
            .unwrap()
            .unwrap();
        assert_eq!(frame.samples(), &[3, 4]);
        assert_eq!(frame.index(), 1);
        assert_eq!(router.dropped_total(), 2);
    }

    #[test]
    fn strict_overflow_fails_next_read_once() {
        let router = FrameRouter::new(config(2, 2, OverflowPolicy::Fail));
        router.open();
        router.deliver(&[1, 2, 3, 4, 5, 6]);

        assert_eq!(
            router.read_frame_timeout(Duration::from_millis(1)),
            Err(CaptureError::Overflow { dropped: 2 })
        );
        let frame = router
            .read_frame_timeout(Duration::from_millis(1))
            .unwrap()
            .unwrap();
        assert_eq!(frame.samples(), &[3, 4]);
    }

    #[test]
    fn overflow_during_wait_is_reported_before_the_frame() {
        let router = Arc::new(FrameRouter::new(config(2, 2, OverflowPolicy::Fail)));
        router.open();

        let producer = Arc::clone(&router);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            producer.deliver(&[1, 2, 3, 4, 5, 6]);
        });

        // Zero-length waits keep the reader in the timed-out path while the
        // overflowing block lands.
        let give_up = Instant::now() + Duration::from_secs(5);
        let first = loop {
            match router.read_frame_timeout(Duration::ZERO) {
                Ok(None) if Instant::now() < give_up => continue,
                other => break other,
            }
        };
        handle.join().unwrap();

        assert_eq!(first, Err(CaptureError::Overflow { dropped: 2 }));
        let frame = router
            .read_frame_timeout(Duration::from_millis(1))
            .unwrap()
            .unwrap();
        assert_eq!(frame.samples(), &[3, 4]);
    }

    #[test]
    fn close_drains_then_reports_closed() {
        let router = FrameRouter::new(config(2, 4, OverflowPolicy::DropOldest));
        router.open();
        router.deliver(&[1, 2, 3]);
        router.close();

        assert!(router.read_frame_timeout(Duration::from_millis(1)).unwrap().is_some());
        assert_eq!(
            router.read_frame_timeout(Duration::from_millis(1)),
            Err(CaptureError::StreamClosed)
        );
    }

    #[test]
    fn deliveries_while_closed_are_ignored() {
        let router = FrameRouter::new(config(2, 4, OverflowPolicy::DropOldest));
        router.deliver(&[1, 2]);
        router.open();

        assert_eq!(router.read_frame_timeout(Duration::from_millis(1)).unwrap(), None);
    }

    #[test]
    fn push_handler_receives_assembled_frames() {
        let router = FrameRouter::new(config(3, 4, OverflowPolicy::DropOldest));
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        router.set_handler(Arc::new(move |frame: Frame| sink.lock().push(frame)));
        router.open();

        router.deliver(&[1, 2, 3, 4, 5, 6, 7]);

        let frames = received.lock();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].samples(), &[4, 5, 6]);
        assert_eq!(frames[1].index(), 1);
    }

    #[test]
    fn blocked_reader_wakes_on_delivery() {
        let router = Arc::new(FrameRouter::new(config(2, 4, OverflowPolicy::DropOldest)));
        router.open();

        let producer = Arc::clone(&router);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            producer.deliver(&[7, 8]);
        });

        let frame = router.read_frame_timeout(Duration::from_secs(5)).unwrap();
        handle.join().unwrap();
        assert_eq!(frame.unwrap().samples(), &[7, 8]);
    }
}
