//! Input device discovery through a cpal host.
//!
//! Device IDs are positions in `Host::devices()`, so an ID stays stable for
//! as long as the host's device list does. `open_stream` re-checks the name
//! behind an ID before acquiring it.

use std::collections::HashSet;
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait};
use parking_lot::Mutex;

use handclap_core::models::audio_models::DeviceDescriptor;
use handclap_core::models::config::CaptureConfiguration;
use handclap_core::models::error::CaptureError;
use handclap_core::traits::device_enumerator::DeviceEnumerator;

use crate::cpal_stream::CpalCaptureStream;

/// Device IDs currently held open by streams of one backend.
pub(crate) type Leases = Arc<Mutex<HashSet<usize>>>;

/// Entry point to the host audio subsystem.
///
/// Owns the cpal `Host` and the set of devices its streams hold, so a
/// device is never opened twice through the same backend.
pub struct CpalBackend {
    host: cpal::Host,
    leases: Leases,
}

impl CpalBackend {
    /// Backend over the platform's default host (ALSA, CoreAudio, WASAPI).
    pub fn new() -> Self {
        Self::with_host(cpal::default_host())
    }

    pub fn with_host(host: cpal::Host) -> Self {
        Self {
            host,
            leases: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn host_name(&self) -> &'static str {
        self.host.id().name()
    }

    /// The host's default input device, if it has one.
    pub fn default_input_device(&self) -> Result<Option<DeviceDescriptor>, CaptureError> {
        let default_name = match self.host.default_input_device().and_then(|d| d.name().ok()) {
            Some(name) => name,
            None => return Ok(None),
        };
        Ok(self
            .list_input_devices()?
            .into_iter()
            .find(|d| d.name == default_name))
    }

    /// Create (but do not open) a stream on `descriptor`'s device.
    pub fn open_stream(
        &self,
        descriptor: &DeviceDescriptor,
        config: CaptureConfiguration,
    ) -> Result<CpalCaptureStream, CaptureError> {
        config.validate().map_err(CaptureError::ConfigurationFailed)?;
        if config.channels > descriptor.max_input_channels {
            return Err(CaptureError::DeviceOpen(format!(
                "{} has {} input channels, {} requested",
                descriptor, descriptor.max_input_channels, config.channels
            )));
        }

        let device = self.device_at(descriptor.index)?;
        let name = device
            .name()
            .map_err(|e| CaptureError::DeviceOpen(format!("device {}: {}", descriptor.index, e)))?;
        if name != descriptor.name {
            return Err(CaptureError::DeviceOpen(format!(
                "device {} is now {:?}, expected {:?}",
                descriptor.index, name, descriptor.name
            )));
        }

        Ok(CpalCaptureStream::new(
            device,
            descriptor.clone(),
            config,
            Arc::clone(&self.leases),
        ))
    }

    fn device_at(&self, index: usize) -> Result<cpal::Device, CaptureError> {
        self.host
            .devices()
            .map_err(|e| CaptureError::DeviceQuery(e.to_string()))?
            .nth(index)
            .ok_or_else(|| CaptureError::DeviceOpen(format!("no device with ID {}", index)))
    }
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceEnumerator for CpalBackend {
    fn list_input_devices(&self) -> Result<Vec<DeviceDescriptor>, CaptureError> {
        let devices = self
            .host
            .devices()
            .map_err(|e| CaptureError::DeviceQuery(e.to_string()))?;
        let host_api = self.host_name().to_string();

        let mut inputs = Vec::new();
        for (index, device) in devices.enumerate() {
            let max_input_channels = max_input_channels(&device);
            if max_input_channels == 0 {
                continue;
            }
            let name = match device.name() {
                Ok(name) => name,
                Err(e) => {
                    log::debug!("Skipping device {}: {}", index, e);
                    continue;
                }
            };
            inputs.push(DeviceDescriptor {
                index,
                name,
                max_input_channels,
                host_api: host_api.clone(),
            });
        }

        log::debug!("{} input devices on {}", inputs.len(), host_api);
        Ok(inputs)
    }
}

/// Largest channel count any supported input config offers; 0 for
/// output-only devices.
fn max_input_channels(device: &cpal::Device) -> u16 {
    device
        .supported_input_configs()
        .map(|configs| configs.map(|c| c.channels()).max().unwrap_or(0))
        .unwrap_or(0)
}
