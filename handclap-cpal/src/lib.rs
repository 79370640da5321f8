//! # handclap-cpal
//!
//! Cross-platform host backend for handclap, built on cpal.
//!
//! Provides:
//! - `CpalBackend` — input device enumeration and stream creation
//! - `CpalCaptureStream` — `CaptureStream` over a cpal input stream
//!
//! ## Usage
//! ```ignore
//! use handclap_core::{name_contains, CaptureConfiguration, DeviceEnumerator};
//! use handclap_cpal::CpalBackend;
//!
//! let backend = CpalBackend::new();
//! let usb = backend.find_devices(name_contains("usb"))?;
//! let stream = backend.open_stream(&usb[0], CaptureConfiguration::default())?;
//! ```

pub mod cpal_stream;
pub mod device_enumerator;

pub use cpal_stream::CpalCaptureStream;
pub use device_enumerator::CpalBackend;
