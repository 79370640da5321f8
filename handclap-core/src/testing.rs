//! In-memory capture devices for tests.
//!
//! `FakeCaptureStream` plays a scripted sequence of sample blocks through a
//! real `FrameRouter` from its own delivery thread, the way a host backend
//! would, and counts open/close calls so tests can assert that every device
//! was released.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::models::audio_models::DeviceDescriptor;
use crate::models::config::CaptureConfiguration;
use crate::models::error::CaptureError;
use crate::models::frame::Frame;
use crate::processing::frame_router::FrameRouter;
use crate::traits::capture_stream::{CaptureStream, FrameCallback};
use crate::traits::device_enumerator::DeviceEnumerator;

/// Open/close bookkeeping shared between a fake stream and its test.
#[derive(Debug, Default)]
pub struct DeviceCounters {
    opens: AtomicUsize,
    closes: AtomicUsize,
}

impl DeviceCounters {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Every successful open was matched by a close.
    pub fn is_balanced(&self) -> bool {
        self.opens() == self.closes()
    }
}

/// Scripted capture device.
pub struct FakeCaptureStream {
    descriptor: DeviceDescriptor,
    config: CaptureConfiguration,
    router: Arc<FrameRouter>,
    script: Arc<Vec<Vec<i16>>>,
    pace: Option<Duration>,
    end_after_script: bool,
    open_error: Option<String>,
    read_error: Option<String>,
    close_error: Option<String>,
    counters: Arc<DeviceCounters>,
    is_open: bool,
    feeder_stop: Arc<AtomicBool>,
    feeder: Option<thread::JoinHandle<()>>,
}

impl FakeCaptureStream {
    pub fn new(index: usize, name: &str, config: CaptureConfiguration) -> Self {
        Self {
            descriptor: DeviceDescriptor {
                index,
                name: name.into(),
                max_input_channels: config.channels,
                host_api: "fake".into(),
            },
            router: Arc::new(FrameRouter::new(config.clone())),
            config,
            script: Arc::new(Vec::new()),
            pace: None,
            end_after_script: false,
            open_error: None,
            read_error: None,
            close_error: None,
            counters: Arc::new(DeviceCounters::default()),
            is_open: false,
            feeder_stop: Arc::new(AtomicBool::new(false)),
            feeder: None,
        }
    }

    /// Blocks of samples delivered, in order, once the stream opens. Block
    /// sizes need not match the frame length.
    pub fn with_script(mut self, blocks: Vec<Vec<i16>>) -> Self {
        self.script = Arc::new(blocks);
        self
    }

    /// Sleep between blocks, like a real-time device.
    pub fn paced(mut self, interval: Duration) -> Self {
        self.pace = Some(interval);
        self
    }

    /// Close the router after the script so pull readers see `StreamClosed`.
    pub fn ending_after_script(mut self) -> Self {
        self.end_after_script = true;
        self
    }

    pub fn failing_open(mut self, message: &str) -> Self {
        self.open_error = Some(message.into());
        self
    }

    /// Every pull read fails with `DeviceOpen`, like a device unplugged
    /// mid-capture.
    pub fn failing_reads(mut self, message: &str) -> Self {
        self.read_error = Some(message.into());
        self
    }

    /// `close` still releases the device, then reports this error.
    pub fn failing_close(mut self, message: &str) -> Self {
        self.close_error = Some(message.into());
        self
    }

    pub fn counters(&self) -> Arc<DeviceCounters> {
        Arc::clone(&self.counters)
    }

    fn spawn_feeder(&mut self) -> Result<(), CaptureError> {
        self.feeder_stop.store(false, Ordering::SeqCst);
        let stop = Arc::clone(&self.feeder_stop);
        let router = Arc::clone(&self.router);
        let script = Arc::clone(&self.script);
        let pace = self.pace;
        let end_after_script = self.end_after_script;

        let handle = thread::Builder::new()
            .name(format!("fake-capture-{}", self.descriptor.index))
            .spawn(move || {
                for block in script.iter() {
                    if stop.load(Ordering::SeqCst) {
                        return;
                    }
                    router.deliver(block);
                    if let Some(interval) = pace {
                        thread::sleep(interval);
                    }
                }
                if end_after_script {
                    router.close();
                }
            })
            .map_err(|e| CaptureError::DeviceOpen(format!("failed to spawn feeder: {}", e)))?;

        self.feeder = Some(handle);
        Ok(())
    }
}

impl CaptureStream for FakeCaptureStream {
    fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    fn config(&self) -> &CaptureConfiguration {
        &self.config
    }

    fn open(&mut self) -> Result<(), CaptureError> {
        if self.is_open {
            return Ok(());
        }
        if let Some(ref message) = self.open_error {
            return Err(CaptureError::DeviceOpen(message.clone()));
        }
        self.router.open();
        self.counters.opens.fetch_add(1, Ordering::SeqCst);
        self.is_open = true;
        self.spawn_feeder()
    }

    fn is_open(&self) -> bool {
        self.is_open
    }

    fn read_frame_timeout(&mut self, timeout: Duration) -> Result<Option<Frame>, CaptureError> {
        if let Some(ref message) = self.read_error {
            return Err(CaptureError::DeviceOpen(message.clone()));
        }
        self.router.read_frame_timeout(timeout)
    }

    fn start(&mut self, callback: FrameCallback) -> Result<(), CaptureError> {
        self.router.set_handler(callback);
        if let Err(e) = self.open() {
            self.router.clear_handler();
            return Err(e);
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), CaptureError> {
        if !self.is_open {
            return Ok(());
        }
        self.feeder_stop.store(true, Ordering::SeqCst);
        self.router.close();
        if let Some(handle) = self.feeder.take() {
            let _ = handle.join();
        }
        self.router.clear_handler();
        self.is_open = false;
        self.counters.closes.fetch_add(1, Ordering::SeqCst);

        match self.close_error {
            Some(ref message) => Err(CaptureError::DeviceOpen(message.clone())),
            None => Ok(()),
        }
    }
}

impl Drop for FakeCaptureStream {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// Fixed device list standing in for a host.
#[derive(Debug, Clone, Default)]
pub struct FakeDeviceEnumerator {
    devices: Vec<DeviceDescriptor>,
    failure: Option<String>,
}

impl FakeDeviceEnumerator {
    pub fn new(devices: Vec<DeviceDescriptor>) -> Self {
        Self {
            devices,
            failure: None,
        }
    }

    /// Every query fails with `DeviceQuery`.
    pub fn unavailable(message: &str) -> Self {
        Self {
            devices: Vec::new(),
            failure: Some(message.into()),
        }
    }
}

impl DeviceEnumerator for FakeDeviceEnumerator {
    fn list_input_devices(&self) -> Result<Vec<DeviceDescriptor>, CaptureError> {
        if let Some(ref message) = self.failure {
            return Err(CaptureError::DeviceQuery(message.clone()));
        }
        Ok(self
            .devices
            .iter()
            .filter(|d| d.max_input_channels > 0)
            .cloned()
            .collect())
    }
}

/// `count` frames of `frame_len` samples, every sample of frame `i` set to
/// `value(i)`.
pub fn constant_frames(count: usize, frame_len: usize, value: impl Fn(usize) -> i16) -> Vec<Vec<i16>> {
    (0..count).map(|i| vec![value(i); frame_len]).collect()
}
