//! Which input devices a command should use.

use handclap_core::{name_contains, CaptureError, ChannelRole, DeviceDescriptor, DeviceEnumerator};

/// How the user picked recording devices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceSelector {
    /// Explicit device IDs, in channel order.
    Ids(Vec<usize>),
    /// First matches of a case-insensitive name substring.
    NameFilter(String),
}

/// Resolve `selector` to at least `required` devices with their channel
/// roles: the first device is left, the second right, the rest aux.
pub fn select_recording_devices<E: DeviceEnumerator>(
    enumerator: &E,
    selector: &DeviceSelector,
    required: usize,
) -> Result<Vec<(ChannelRole, DeviceDescriptor)>, CaptureError> {
    let devices = match selector {
        DeviceSelector::Ids(ids) => {
            let available = enumerator.list_input_devices()?;
            ids.iter()
                .map(|id| find_by_id(&available, *id))
                .collect::<Result<Vec<_>, _>>()?
        }
        DeviceSelector::NameFilter(needle) => {
            let mut matches = enumerator.find_devices(name_contains(needle))?;
            matches.truncate(required);
            matches
        }
    };

    if devices.len() < required {
        return Err(CaptureError::InsufficientDevices {
            required,
            found: devices.len(),
        });
    }

    Ok(devices
        .into_iter()
        .enumerate()
        .map(|(position, device)| (ChannelRole::for_position(position), device))
        .collect())
}

/// Pick the listening device: an explicit ID wins, then the first name
/// match, then `fallback` (the host default), then the first input.
pub fn select_listen_device<E: DeviceEnumerator>(
    enumerator: &E,
    id: Option<usize>,
    name: Option<&str>,
    fallback: Option<DeviceDescriptor>,
) -> Result<DeviceDescriptor, CaptureError> {
    let available = enumerator.list_input_devices()?;

    if let Some(id) = id {
        return find_by_id(&available, id);
    }

    if let Some(name) = name {
        let is_match = name_contains(name);
        return available
            .into_iter()
            .find(|d| is_match(d))
            .ok_or_else(|| CaptureError::DeviceOpen(format!("no input device matching {:?}", name)));
    }

    match fallback {
        Some(device) => Ok(device),
        None => available
            .into_iter()
            .next()
            .ok_or(CaptureError::InsufficientDevices { required: 1, found: 0 }),
    }
}

fn find_by_id(available: &[DeviceDescriptor], id: usize) -> Result<DeviceDescriptor, CaptureError> {
    available
        .iter()
        .find(|d| d.index == id)
        .cloned()
        .ok_or_else(|| CaptureError::DeviceOpen(format!("no input device with ID {}", id)))
}
