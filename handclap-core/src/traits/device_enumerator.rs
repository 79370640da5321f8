use crate::models::audio_models::DeviceDescriptor;
use crate::models::error::CaptureError;

/// Host audio device discovery.
///
/// Implementations query the host once per call and return input-capable
/// devices in host enumeration order.
pub trait DeviceEnumerator {
    /// Devices with at least one input channel.
    fn list_input_devices(&self) -> Result<Vec<DeviceDescriptor>, CaptureError>;

    /// Input devices accepted by `predicate`, in enumeration order.
    fn find_devices<P>(&self, predicate: P) -> Result<Vec<DeviceDescriptor>, CaptureError>
    where
        P: Fn(&DeviceDescriptor) -> bool,
        Self: Sized,
    {
        Ok(self
            .list_input_devices()?
            .into_iter()
            .filter(|d| predicate(d))
            .collect())
    }
}

/// Case-insensitive device name match, e.g. `name_contains("usb")`.
pub fn name_contains(needle: &str) -> impl Fn(&DeviceDescriptor) -> bool {
    let needle = needle.to_lowercase();
    move |device| device.name.to_lowercase().contains(&needle)
}
