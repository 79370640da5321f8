use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::models::audio_models::{ChannelRole, DeviceDescriptor};
use crate::models::config::RecorderConfig;
use crate::models::error::CaptureError;
use crate::models::frame::Frame;
use crate::models::recording_result::{ChannelRecording, RecordingSession, SessionStatus};
use crate::models::state::SessionState;
use crate::session::stop_signal::StopSignal;
use crate::traits::capture_observer::CaptureObserver;
use crate::traits::capture_stream::{CaptureStream, FrameCallback};

/// How often the control thread wakes to publish progress while recording.
const PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

/// Append-only sample store for one channel role.
///
/// Written only by its own stream's delivery thread; read once, by the
/// control thread, after it is sealed.
#[derive(Debug, Default)]
struct ChannelBuffer {
    samples: Vec<i16>,
    frames: u64,
    late_frames: u64,
    sealed: bool,
}

impl ChannelBuffer {
    fn append(&mut self, frame: Frame) {
        if self.sealed {
            self.late_frames += 1;
            return;
        }
        self.samples.extend_from_slice(frame.samples());
        self.frames += 1;
    }
}

struct ChannelSlot<S> {
    role: ChannelRole,
    device: DeviceDescriptor,
    stream: S,
    buffer: Arc<Mutex<ChannelBuffer>>,
}

/// Coordinates N capture streams into one time-bounded recording.
///
/// ```text
/// [Stream L] → push callback → [ChannelBuffer L] ─┐
///                                                  ├→ seal → RecordingSession
/// [Stream R] → push callback → [ChannelBuffer R] ─┘
/// ```
///
/// Callbacks only copy samples under their own channel's lock, so channels
/// never contend with each other. The control thread waits on a
/// `StopSignal` with the session deadline, then stops every stream in
/// registration order and seals the buffers.
pub struct MultiStreamRecorder {
    config: RecorderConfig,
    observer: Option<Arc<dyn CaptureObserver>>,
}

impl MultiStreamRecorder {
    pub fn new(config: RecorderConfig) -> Self {
        Self {
            config,
            observer: None,
        }
    }

    pub fn set_observer(&mut self, observer: Arc<dyn CaptureObserver>) {
        self.observer = Some(observer);
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    /// Open every stream, register its buffer and start the duration clock.
    ///
    /// Validation happens before any stream is touched. If a stream fails to
    /// start, every stream started so far is closed before the error returns.
    pub fn start<S: CaptureStream>(
        &self,
        streams: Vec<(ChannelRole, S)>,
        duration: Duration,
    ) -> Result<RecordingHandle<S>, CaptureError> {
        self.validate(&streams, duration)?;

        let first = streams[0].1.config().clone();
        let skew_tolerance = self.config.skew_tolerance_frames * first.frame_len();
        let latency_samples = self
            .config
            .latency_allowance_ms
            .saturating_mul(u64::from(first.sample_rate))
            / 1000;
        let latency_samples = latency_samples.saturating_mul(u64::from(first.channels));
        let now = Instant::now();
        let mut handle = RecordingHandle {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            sample_rate: first.sample_rate,
            channels: first.channels,
            skew_tolerance,
            fill_slack: skew_tolerance.saturating_add(latency_samples as usize),
            duration,
            started_at: now,
            deadline: deadline_after(now, duration)?,
            slots: Vec::with_capacity(streams.len()),
            stop: StopSignal::new(),
            state: SessionState::Idle,
            observer: self.observer.clone(),
        };
        handle.set_state(SessionState::Starting);

        for (role, mut stream) in streams {
            let buffer = Arc::new(Mutex::new(ChannelBuffer::default()));
            let sink = Arc::clone(&buffer);
            let callback: FrameCallback = Arc::new(move |frame: Frame| sink.lock().append(frame));

            if let Err(e) = stream.start(callback) {
                log::error!("Failed to start {} channel on {}: {}", role, stream.descriptor(), e);
                let _ = stream.close();
                handle.stop_all();
                handle.slots.clear();
                handle.set_state(SessionState::Failed(e.clone()));
                return Err(e);
            }

            log::info!("Recording {} channel from {}", role, stream.descriptor());
            handle.slots.push(ChannelSlot {
                role,
                device: stream.descriptor().clone(),
                stream,
                buffer,
            });
        }

        handle.started_at = Instant::now();
        handle.deadline = deadline_after(handle.started_at, duration)?;
        handle.set_state(SessionState::Recording { elapsed_secs: 0.0 });
        log::info!(
            "Recording {} channels for {:.1}s",
            handle.slots.len(),
            duration.as_secs_f64()
        );
        Ok(handle)
    }

    /// Block until the session's duration elapses (or its stop signal
    /// fires), then stop all streams and return the sealed session.
    pub fn await_completion<S: CaptureStream>(&self, handle: RecordingHandle<S>) -> RecordingSession {
        handle.wait()
    }

    /// Start, wait and seal in one call.
    pub fn record<S: CaptureStream>(
        &self,
        streams: Vec<(ChannelRole, S)>,
        duration: Duration,
        stop: &StopSignal,
    ) -> Result<RecordingSession, CaptureError> {
        let mut handle = self.start(streams, duration)?;
        handle.stop = stop.clone();
        Ok(handle.wait())
    }

    fn validate<S: CaptureStream>(
        &self,
        streams: &[(ChannelRole, S)],
        duration: Duration,
    ) -> Result<(), CaptureError> {
        let devices: HashSet<usize> = streams.iter().map(|(_, s)| s.descriptor().index).collect();
        let required = self.config.min_streams.max(1);
        if devices.len() < required {
            return Err(CaptureError::InsufficientDevices {
                required,
                found: devices.len(),
            });
        }
        if devices.len() != streams.len() {
            return Err(CaptureError::ConfigurationFailed(
                "the same device is registered for more than one channel".into(),
            ));
        }

        let roles: HashSet<ChannelRole> = streams.iter().map(|(role, _)| *role).collect();
        if roles.len() != streams.len() {
            return Err(CaptureError::ConfigurationFailed(
                "channel roles must be unique".into(),
            ));
        }

        let format = streams[0].1.config();
        for (role, stream) in streams {
            let config = stream.config();
            config.validate().map_err(CaptureError::ConfigurationFailed)?;
            if config.sample_rate != format.sample_rate
                || config.channels != format.channels
                || config.chunk_size != format.chunk_size
            {
                return Err(CaptureError::ConfigurationFailed(format!(
                    "{} channel format differs from the first stream",
                    role
                )));
            }
        }

        if duration.is_zero() {
            return Err(CaptureError::ConfigurationFailed(
                "recording duration must be positive".into(),
            ));
        }
        deadline_after(Instant::now(), duration)?;
        Ok(())
    }
}

fn deadline_after(start: Instant, duration: Duration) -> Result<Instant, CaptureError> {
    start.checked_add(duration).ok_or_else(|| {
        CaptureError::ConfigurationFailed(format!(
            "recording duration of {}s is out of range",
            duration.as_secs()
        ))
    })
}

/// A running recording. Owns its streams and buffers until `wait` seals
/// them; dropping it early closes every stream.
pub struct RecordingHandle<S: CaptureStream> {
    id: Uuid,
    created_at: DateTime<Utc>,
    sample_rate: u32,
    channels: u16,
    skew_tolerance: usize,
    /// Samples a channel may fall short of `elapsed * sample_rate`.
    fill_slack: usize,
    duration: Duration,
    started_at: Instant,
    deadline: Instant,
    slots: Vec<ChannelSlot<S>>,
    stop: StopSignal,
    state: SessionState,
    observer: Option<Arc<dyn CaptureObserver>>,
}

impl<S: CaptureStream> RecordingHandle<S> {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Trigger this to end the recording early (e.g. from a Ctrl-C handler).
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Samples captured so far, per channel.
    pub fn sample_counts(&self) -> Vec<(ChannelRole, usize)> {
        self.slots
            .iter()
            .map(|slot| (slot.role, slot.buffer.lock().samples.len()))
            .collect()
    }

    /// Wait for the deadline or the stop signal, then seal the session.
    pub fn wait(mut self) -> RecordingSession {
        let interrupted = self.wait_for_deadline();
        self.seal(interrupted)
    }

    fn wait_for_deadline(&mut self) -> bool {
        loop {
            let now = Instant::now();
            if now >= self.deadline {
                return false;
            }
            let wake_at = (now + PROGRESS_INTERVAL).min(self.deadline);
            if self.stop.wait_until(wake_at) {
                log::info!("Recording interrupted after {:.1}s", self.elapsed().as_secs_f64());
                return true;
            }
            let elapsed_secs = self.elapsed().as_secs_f64();
            self.set_state(SessionState::Recording { elapsed_secs });
            log::debug!("Recording {:.1}s: {:?}", elapsed_secs, self.sample_counts());
        }
    }

    fn seal(&mut self, interrupted: bool) -> RecordingSession {
        self.set_state(SessionState::Stopping);
        let stop_errors = self.stop_all();
        let elapsed = self.started_at.elapsed().min(self.duration);

        // Taking each lock after its stream is closed orders the length read
        // after the last callback on every delivery thread.
        let mut recordings = Vec::with_capacity(self.slots.len());
        for slot in self.slots.drain(..) {
            let mut buffer = slot.buffer.lock();
            buffer.sealed = true;
            log::debug!(
                "{} channel sealed: {} frames, {} samples, {} late frames discarded",
                slot.role,
                buffer.frames,
                buffer.samples.len(),
                buffer.late_frames
            );
            recordings.push(ChannelRecording {
                role: slot.role,
                device: slot.device.clone(),
                samples: std::mem::take(&mut buffer.samples),
            });
        }

        let (mut status, trimmed) = reconcile_lengths(&mut recordings, self.skew_tolerance);
        // An interrupted session is only as long as it ran.
        if !interrupted && status == SessionStatus::Complete {
            let expected =
                (elapsed.as_secs_f64() * f64::from(self.sample_rate)) as usize * self.channels as usize;
            if let Some(counts) = short_channels(&recordings, expected.saturating_sub(self.fill_slack)) {
                log::warn!(
                    "Channels fell short of {} expected samples: {:?}",
                    expected,
                    counts
                );
                status = SessionStatus::Degraded { counts };
            }
        }

        let session = RecordingSession {
            id: self.id,
            created_at: self.created_at,
            sample_rate: self.sample_rate,
            channels: self.channels,
            requested_duration: self.duration,
            elapsed,
            interrupted,
            recordings,
            status,
            trimmed,
            stop_errors,
        };

        self.set_state(SessionState::Sealed);
        log::info!(
            "Session {} sealed: {:?} {:?}",
            session.id,
            session.sample_counts(),
            session.status
        );
        if let Some(ref observer) = self.observer {
            observer.on_session_sealed(&session);
        }
        session
    }

    /// Close every stream in registration order, even after failures.
    fn stop_all(&mut self) -> Vec<(ChannelRole, CaptureError)> {
        let mut errors = Vec::new();
        for slot in self.slots.iter_mut() {
            if let Err(e) = slot.stream.close() {
                log::warn!("Failed to stop {} channel on {}: {}", slot.role, slot.device, e);
                if let Some(ref observer) = self.observer {
                    observer.on_stop_error(slot.role, &e);
                }
                errors.push((slot.role, e));
            }
        }
        errors
    }

    fn set_state(&mut self, state: SessionState) {
        if let Some(ref observer) = self.observer {
            observer.on_state_changed(&state);
        }
        self.state = state;
    }
}

impl<S: CaptureStream> Drop for RecordingHandle<S> {
    fn drop(&mut self) {
        if !self.slots.is_empty() {
            log::warn!("Recording {} dropped before completion, releasing devices", self.id);
            self.stop_all();
        }
    }
}

/// Equal lengths pass. A difference within `tolerance` samples is start-time
/// skew: longer channels lose their tail down to the shortest and the cut is
/// reported. Anything larger marks the session degraded, buffers untouched.
fn reconcile_lengths(
    recordings: &mut [ChannelRecording],
    tolerance: usize,
) -> (SessionStatus, Vec<(ChannelRole, usize)>) {
    let shortest = recordings.iter().map(|r| r.samples.len()).min().unwrap_or(0);
    let longest = recordings.iter().map(|r| r.samples.len()).max().unwrap_or(0);

    if shortest == longest {
        return (SessionStatus::Complete, Vec::new());
    }

    if longest - shortest > tolerance {
        let counts: Vec<(ChannelRole, usize)> =
            recordings.iter().map(|r| (r.role, r.samples.len())).collect();
        log::warn!("Channel lengths diverge beyond skew tolerance: {:?}", counts);
        return (SessionStatus::Degraded { counts }, Vec::new());
    }

    let mut trimmed = Vec::new();
    for recording in recordings.iter_mut() {
        let excess = recording.samples.len() - shortest;
        if excess > 0 {
            recording.samples.truncate(shortest);
            trimmed.push((recording.role, excess));
        }
    }
    log::warn!("Trimmed channels to {} samples: {:?}", shortest, trimmed);
    (SessionStatus::Complete, trimmed)
}

/// Every channel's count when any channel holds fewer than `floor` samples.
fn short_channels(recordings: &[ChannelRecording], floor: usize) -> Option<Vec<(ChannelRole, usize)>> {
    if recordings.iter().all(|r| r.samples.len() >= floor) {
        return None;
    }
    Some(recordings.iter().map(|r| (r.role, r.samples.len())).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::CaptureConfiguration;
    use crate::testing::{constant_frames, FakeCaptureStream};
    use std::thread;

    const SETTLE: Duration = Duration::from_millis(300);

    // Low enough that short scripts cover SETTLE at this rate.
    fn capture_config(chunk_size: usize) -> CaptureConfiguration {
        CaptureConfiguration {
            sample_rate: 1000,
            chunk_size,
            ..Default::default()
        }
    }

    fn recorder() -> MultiStreamRecorder {
        MultiStreamRecorder::new(RecorderConfig::default())
    }

    fn ramp(frames: usize, chunk: usize, offset: i16) -> Vec<Vec<i16>> {
        (0..frames)
            .map(|f| (0..chunk).map(|i| offset + (f * chunk + i) as i16).collect())
            .collect()
    }

    #[test]
    fn two_streams_round_trip_exactly() {
        let left_script = ramp(20, 64, 0);
        let right_script = ramp(20, 64, 5000);
        let left = FakeCaptureStream::new(1, "USB Mic A", capture_config(64))
            .with_script(left_script.clone());
        let right = FakeCaptureStream::new(2, "USB Mic B", capture_config(64))
            .with_script(right_script.clone());

        let handle = recorder()
            .start(vec![(ChannelRole::Left, left), (ChannelRole::Right, right)], SETTLE)
            .unwrap();
        let session = recorder().await_completion(handle);

        assert!(session.is_complete());
        assert!(session.trimmed.is_empty());
        assert!(!session.interrupted);
        let left = session.recording(ChannelRole::Left).unwrap();
        let right = session.recording(ChannelRole::Right).unwrap();
        assert_eq!(left.sample_count(), 20 * 64);
        assert_eq!(right.sample_count(), 20 * 64);
        assert_eq!(left.samples, left_script.concat());
        assert_eq!(right.samples, right_script.concat());
    }

    #[test]
    fn uneven_host_blocks_still_yield_whole_frames() {
        let script: Vec<Vec<i16>> = vec![vec![1; 100], vec![2; 28], vec![3; 64]];
        let left = FakeCaptureStream::new(1, "A", capture_config(64)).with_script(script.clone());
        let right = FakeCaptureStream::new(2, "B", capture_config(64)).with_script(script);

        let session = recorder()
            .record(
                vec![(ChannelRole::Left, left), (ChannelRole::Right, right)],
                SETTLE,
                &StopSignal::new(),
            )
            .unwrap();

        assert_eq!(session.sample_counts(), vec![(ChannelRole::Left, 192), (ChannelRole::Right, 192)]);
    }

    #[test]
    fn single_device_is_rejected_before_opening() {
        let only = FakeCaptureStream::new(1, "USB Mic", capture_config(64));
        let counters = only.counters();

        let result = recorder().start(vec![(ChannelRole::Left, only)], SETTLE);

        assert!(matches!(
            result,
            Err(CaptureError::InsufficientDevices { required: 2, found: 1 })
        ));
        assert_eq!(counters.opens(), 0);
    }

    #[test]
    fn same_device_cannot_fill_two_channels() {
        let a = FakeCaptureStream::new(4, "USB Mic", capture_config(64));
        let b = FakeCaptureStream::new(4, "USB Mic", capture_config(64));
        let (ca, cb) = (a.counters(), b.counters());

        let result = recorder().start(vec![(ChannelRole::Left, a), (ChannelRole::Right, b)], SETTLE);

        assert!(matches!(
            result,
            Err(CaptureError::InsufficientDevices { required: 2, found: 1 })
        ));
        assert_eq!(ca.opens() + cb.opens(), 0);
    }

    #[test]
    fn mismatched_formats_are_rejected() {
        let a = FakeCaptureStream::new(1, "A", capture_config(64));
        let b = FakeCaptureStream::new(2, "B", capture_config(128));

        let result = recorder().start(vec![(ChannelRole::Left, a), (ChannelRole::Right, b)], SETTLE);
        assert!(matches!(result, Err(CaptureError::ConfigurationFailed(_))));
    }

    #[test]
    fn open_failure_releases_streams_already_started() {
        let a = FakeCaptureStream::new(1, "A", capture_config(64));
        let b = FakeCaptureStream::new(2, "B", capture_config(64)).failing_open("busy");
        let c = FakeCaptureStream::new(3, "C", capture_config(64));
        let (ca, cb, cc) = (a.counters(), b.counters(), c.counters());

        let result = recorder().start(
            vec![
                (ChannelRole::Left, a),
                (ChannelRole::Right, b),
                (ChannelRole::Center, c),
            ],
            SETTLE,
        );

        assert_eq!(result.err(), Some(CaptureError::DeviceOpen("busy".into())));
        assert_eq!(ca.opens(), 1);
        assert!(ca.is_balanced());
        assert_eq!(cb.opens(), 0);
        assert_eq!(cc.opens(), 0);
    }

    #[test]
    fn one_frame_of_skew_is_trimmed_and_reported() {
        let left = FakeCaptureStream::new(1, "A", capture_config(64))
            .with_script(constant_frames(11, 64, |_| 7));
        let right = FakeCaptureStream::new(2, "B", capture_config(64))
            .with_script(constant_frames(10, 64, |_| 9));

        let session = recorder()
            .record(
                vec![(ChannelRole::Left, left), (ChannelRole::Right, right)],
                SETTLE,
                &StopSignal::new(),
            )
            .unwrap();

        assert!(session.is_complete());
        assert_eq!(session.trimmed, vec![(ChannelRole::Left, 64)]);
        assert_eq!(session.sample_counts(), vec![(ChannelRole::Left, 640), (ChannelRole::Right, 640)]);
    }

    #[test]
    fn larger_divergence_degrades_session() {
        let left = FakeCaptureStream::new(1, "A", capture_config(64))
            .with_script(constant_frames(10, 64, |_| 1));
        let right = FakeCaptureStream::new(2, "B", capture_config(64))
            .with_script(constant_frames(4, 64, |_| 1));

        let session = recorder()
            .record(
                vec![(ChannelRole::Left, left), (ChannelRole::Right, right)],
                SETTLE,
                &StopSignal::new(),
            )
            .unwrap();

        assert_eq!(
            session.status,
            SessionStatus::Degraded {
                counts: vec![(ChannelRole::Left, 640), (ChannelRole::Right, 256)]
            }
        );
        assert_eq!(session.recording(ChannelRole::Left).unwrap().sample_count(), 640);
    }

    #[test]
    fn channels_short_of_the_duration_degrade_session() {
        // 300 ms at 8 kHz expects 2400 samples; 640 is under even with slack.
        let config = CaptureConfiguration {
            sample_rate: 8000,
            ..capture_config(64)
        };
        let left = FakeCaptureStream::new(1, "A", config.clone())
            .with_script(constant_frames(10, 64, |_| 1));
        let right = FakeCaptureStream::new(2, "B", config).with_script(constant_frames(10, 64, |_| 2));

        let session = recorder()
            .record(
                vec![(ChannelRole::Left, left), (ChannelRole::Right, right)],
                SETTLE,
                &StopSignal::new(),
            )
            .unwrap();

        assert!(!session.interrupted);
        assert_eq!(
            session.status,
            SessionStatus::Degraded {
                counts: vec![(ChannelRole::Left, 640), (ChannelRole::Right, 640)]
            }
        );
        assert_eq!(session.recording(ChannelRole::Right).unwrap().sample_count(), 640);
    }

    #[test]
    fn interrupted_session_is_not_held_to_full_length() {
        let config = CaptureConfiguration {
            sample_rate: 8000,
            ..capture_config(64)
        };
        let left = FakeCaptureStream::new(1, "A", config.clone())
            .with_script(constant_frames(10, 64, |_| 1));
        let right = FakeCaptureStream::new(2, "B", config).with_script(constant_frames(10, 64, |_| 2));

        let handle = recorder()
            .start(
                vec![(ChannelRole::Left, left), (ChannelRole::Right, right)],
                Duration::from_secs(30),
            )
            .unwrap();
        let stop = handle.stop_signal();
        let interrupter = thread::spawn(move || {
            thread::sleep(Duration::from_millis(400));
            stop.trigger();
        });

        let session = handle.wait();
        interrupter.join().unwrap();

        assert!(session.interrupted);
        assert!(session.is_complete());
        assert_eq!(session.sample_counts(), vec![(ChannelRole::Left, 640), (ChannelRole::Right, 640)]);
    }

    #[test]
    fn unrepresentable_duration_is_rejected_before_opening() {
        let a = FakeCaptureStream::new(1, "A", capture_config(64));
        let b = FakeCaptureStream::new(2, "B", capture_config(64));
        let (ca, cb) = (a.counters(), b.counters());

        let result = recorder().start(
            vec![(ChannelRole::Left, a), (ChannelRole::Right, b)],
            Duration::from_secs(u64::MAX / 2),
        );

        assert!(matches!(result, Err(CaptureError::ConfigurationFailed(_))));
        assert_eq!(ca.opens() + cb.opens(), 0);
    }

    #[test]
    fn interrupt_mid_recording_closes_everything() {
        let pace = Duration::from_millis(5);
        let left = FakeCaptureStream::new(1, "A", capture_config(40))
            .with_script(constant_frames(2000, 40, |_| 1))
            .paced(pace);
        let right = FakeCaptureStream::new(2, "B", capture_config(40))
            .with_script(constant_frames(2000, 40, |_| 2))
            .paced(pace);
        let (cl, cr) = (left.counters(), right.counters());

        let handle = recorder()
            .start(
                vec![(ChannelRole::Left, left), (ChannelRole::Right, right)],
                Duration::from_secs(30),
            )
            .unwrap();
        let stop = handle.stop_signal();
        let interrupter = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            stop.trigger();
        });

        let started = Instant::now();
        let session = handle.wait();
        interrupter.join().unwrap();

        assert!(session.interrupted);
        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(cl.opens(), 1);
        assert!(cl.is_balanced());
        assert!(cr.is_balanced());
    }

    #[test]
    fn failed_close_does_not_stop_later_streams() {
        let left = FakeCaptureStream::new(1, "A", capture_config(64)).failing_close("unplugged");
        let right = FakeCaptureStream::new(2, "B", capture_config(64));
        let (cl, cr) = (left.counters(), right.counters());

        let session = recorder()
            .record(
                vec![(ChannelRole::Left, left), (ChannelRole::Right, right)],
                Duration::from_millis(20),
                &StopSignal::new(),
            )
            .unwrap();

        assert_eq!(
            session.stop_errors,
            vec![(ChannelRole::Left, CaptureError::DeviceOpen("unplugged".into()))]
        );
        assert!(cl.is_balanced());
        assert!(cr.is_balanced());
    }

    #[test]
    fn dropping_handle_releases_devices() {
        let left = FakeCaptureStream::new(1, "A", capture_config(64));
        let right = FakeCaptureStream::new(2, "B", capture_config(64));
        let (cl, cr) = (left.counters(), right.counters());

        let handle = recorder()
            .start(
                vec![(ChannelRole::Left, left), (ChannelRole::Right, right)],
                Duration::from_secs(30),
            )
            .unwrap();
        drop(handle);

        assert_eq!(cl.opens(), 1);
        assert!(cl.is_balanced());
        assert!(cr.is_balanced());
    }

    #[test]
    fn reconcile_equal_lengths_untouched() {
        let device = DeviceDescriptor {
            index: 0,
            name: "x".into(),
            max_input_channels: 1,
            host_api: "fake".into(),
        };
        let mut recordings = vec![
            ChannelRecording {
                role: ChannelRole::Left,
                device: device.clone(),
                samples: vec![1; 10],
            },
            ChannelRecording {
                role: ChannelRole::Right,
                device,
                samples: vec![2; 10],
            },
        ];

        let (status, trimmed) = reconcile_lengths(&mut recordings, 0);
        assert_eq!(status, SessionStatus::Complete);
        assert!(trimmed.is_empty());

        assert_eq!(short_channels(&recordings, 10), None);
        assert_eq!(
            short_channels(&recordings, 11),
            Some(vec![(ChannelRole::Left, 10), (ChannelRole::Right, 10)])
        );
    }
}
