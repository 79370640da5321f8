//! cpal input stream behind the `CaptureStream` trait.
//!
//! The cpal data callback runs on the host's audio thread and only converts
//! to i16 and hands samples to a shared `FrameRouter`. Everything else
//! (frame assembly, overflow accounting, pull/push delivery) happens in the
//! router.

use std::sync::Arc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{BufferSize, SampleFormat, SampleRate, StreamConfig};

use handclap_core::models::audio_models::DeviceDescriptor;
use handclap_core::models::config::CaptureConfiguration;
use handclap_core::models::error::CaptureError;
use handclap_core::models::frame::Frame;
use handclap_core::processing::frame_router::FrameRouter;
use handclap_core::processing::pcm;
use handclap_core::traits::capture_stream::{CaptureStream, FrameCallback};

use crate::device_enumerator::Leases;

/// Host sample formats we convert from, best first.
const PREFERRED_FORMATS: [SampleFormat; 3] = [SampleFormat::I16, SampleFormat::F32, SampleFormat::U16];

/// One supported input configuration range, reduced to what format
/// selection needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FormatRange {
    channels: u16,
    min_rate: u32,
    max_rate: u32,
    format: SampleFormat,
}

impl FormatRange {
    fn accepts(&self, config: &CaptureConfiguration) -> bool {
        self.channels == config.channels
            && (self.min_rate..=self.max_rate).contains(&config.sample_rate)
    }
}

fn choose_sample_format(ranges: &[FormatRange], config: &CaptureConfiguration) -> Option<SampleFormat> {
    PREFERRED_FORMATS
        .into_iter()
        .find(|format| ranges.iter().any(|r| r.format == *format && r.accepts(config)))
}

/// Capture from one cpal input device.
///
/// Created by `CpalBackend::open_stream`. Holds a lease on its device ID
/// while open; `close` (or drop) releases it.
pub struct CpalCaptureStream {
    device: cpal::Device,
    descriptor: DeviceDescriptor,
    config: CaptureConfiguration,
    router: Arc<FrameRouter>,
    leases: Leases,
    stream: Option<cpal::Stream>,
}

impl CpalCaptureStream {
    pub(crate) fn new(
        device: cpal::Device,
        descriptor: DeviceDescriptor,
        config: CaptureConfiguration,
        leases: Leases,
    ) -> Self {
        Self {
            device,
            descriptor,
            router: Arc::new(FrameRouter::new(config.clone())),
            config,
            leases,
            stream: None,
        }
    }

    /// Samples discarded because the pull queue was full.
    pub fn dropped_samples(&self) -> u64 {
        self.router.dropped_total()
    }

    fn supported_format(&self) -> Result<SampleFormat, CaptureError> {
        let ranges: Vec<FormatRange> = self
            .device
            .supported_input_configs()
            .map_err(|e| CaptureError::DeviceOpen(format!("{}: {}", self.descriptor, e)))?
            .map(|range| FormatRange {
                channels: range.channels(),
                min_rate: range.min_sample_rate().0,
                max_rate: range.max_sample_rate().0,
                format: range.sample_format(),
            })
            .collect();

        choose_sample_format(&ranges, &self.config).ok_or_else(|| {
            CaptureError::DeviceOpen(format!(
                "{} does not support {} Hz with {} channel(s)",
                self.descriptor, self.config.sample_rate, self.config.channels
            ))
        })
    }

    fn build_stream(&self, format: SampleFormat) -> Result<cpal::Stream, CaptureError> {
        let stream_config = StreamConfig {
            channels: self.config.channels,
            sample_rate: SampleRate(self.config.sample_rate),
            buffer_size: BufferSize::Default,
        };
        let router = Arc::clone(&self.router);
        let on_error = stream_error_logger(self.descriptor.to_string());

        let built = match format {
            SampleFormat::I16 => self.device.build_input_stream(
                &stream_config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| router.deliver(data),
                on_error,
                None,
            ),
            SampleFormat::F32 => {
                let mut scratch = Vec::new();
                self.device.build_input_stream(
                    &stream_config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        pcm::convert_f32_into(data, &mut scratch);
                        router.deliver(&scratch);
                    },
                    on_error,
                    None,
                )
            }
            SampleFormat::U16 => {
                let mut scratch = Vec::new();
                self.device.build_input_stream(
                    &stream_config,
                    move |data: &[u16], _: &cpal::InputCallbackInfo| {
                        scratch.clear();
                        scratch.extend(data.iter().map(|&s| pcm::u16_to_i16(s)));
                        router.deliver(&scratch);
                    },
                    on_error,
                    None,
                )
            }
            other => {
                return Err(CaptureError::DeviceOpen(format!(
                    "unsupported sample format {:?}",
                    other
                )))
            }
        };

        built.map_err(|e| CaptureError::DeviceOpen(format!("{}: {}", self.descriptor, e)))
    }

    fn acquire(&mut self) -> Result<(), CaptureError> {
        let format = self.supported_format()?;
        self.router.open();
        let stream = self.build_stream(format)?;
        stream
            .play()
            .map_err(|e| CaptureError::DeviceOpen(format!("{}: {}", self.descriptor, e)))?;
        log::info!(
            "Opened {} at {} Hz, {} channel(s), {:?}",
            self.descriptor,
            self.config.sample_rate,
            self.config.channels,
            format
        );
        self.stream = Some(stream);
        Ok(())
    }

    fn release_lease(&self) {
        self.leases.lock().remove(&self.descriptor.index);
    }
}

impl CaptureStream for CpalCaptureStream {
    fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    fn config(&self) -> &CaptureConfiguration {
        &self.config
    }

    fn open(&mut self) -> Result<(), CaptureError> {
        if self.stream.is_some() {
            return Ok(());
        }
        if !self.leases.lock().insert(self.descriptor.index) {
            return Err(CaptureError::DeviceOpen(format!("{} is already in use", self.descriptor)));
        }

        if let Err(e) = self.acquire() {
            self.router.close();
            self.release_lease();
            return Err(e);
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    fn read_frame_timeout(&mut self, timeout: Duration) -> Result<Option<Frame>, CaptureError> {
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
        let stream = match self.stream.take() {
            Some(stream) => stream,
            None => return Ok(()),
        };

        let paused = stream.pause();
        // Dropping the stream joins cpal's callback thread.
        drop(stream);
        self.router.close();
        self.router.clear_handler();
        self.release_lease();
        log::debug!("Closed {}", self.descriptor);

        paused.map_err(|e| CaptureError::DeviceOpen(format!("failed to stop {}: {}", self.descriptor, e)))
    }
}

impl Drop for CpalCaptureStream {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("{}", e);
        }
    }
}

fn stream_error_logger(device: String) -> impl FnMut(cpal::StreamError) + Send + 'static {
    move |err| log::error!("Input stream error on {}: {}", device, err)
}
