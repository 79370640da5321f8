use std::path::Path;
use std::sync::Arc;

use handclap_core::{
    name_contains, write_session, CaptureError, ClapListener, DeviceEnumerator, MultiStreamRecorder,
    RecordingSession, SessionStatus, Settings, StopSignal,
};
use handclap_cpal::{CpalBackend, CpalCaptureStream};

use crate::console::ConsoleObserver;
use crate::selection::{select_listen_device, select_recording_devices, DeviceSelector};

/// Print every input device, optionally only those whose name contains
/// `filter`.
pub fn list_devices(backend: &CpalBackend, filter: Option<&str>) -> Result<(), CaptureError> {
    let devices = match filter {
        Some(needle) => backend.find_devices(name_contains(needle))?,
        None => backend.list_input_devices()?,
    };

    if devices.is_empty() {
        println!("No input devices found on {}.", backend.host_name());
        return Ok(());
    }

    let default = backend.default_input_device()?.map(|d| d.index);
    for device in &devices {
        let marker = if Some(device.index) == default { " [default]" } else { "" };
        println!(
            "{} - {} input channel(s){}",
            device, device.max_input_channels, marker
        );
    }
    Ok(())
}

/// Listen on one device until Ctrl-C (or the device goes away), printing
/// each clap.
pub fn listen(
    backend: &CpalBackend,
    settings: &Settings,
    device_id: Option<usize>,
    device_name: Option<&str>,
    stop: &StopSignal,
) -> Result<(), CaptureError> {
    let fallback = match (device_id, device_name) {
        (None, None) => backend.default_input_device()?,
        _ => None,
    };
    let device = select_listen_device(backend, device_id, device_name, fallback)?;
    let stream = backend.open_stream(&device, settings.capture.clone())?;

    let mut listener = ClapListener::new(stream, &settings.detector)?;
    listener.set_observer(Arc::new(ConsoleObserver::new()));

    println!(
        "Listening for claps on {} (threshold {}). Press Ctrl+C to stop.",
        device, settings.detector.threshold
    );
    let summary = listener.run(stop)?;

    if summary.interrupted {
        println!("Stopped listening.");
    } else {
        println!("Input stream ended.");
    }
    println!("{}", summary);
    let dropped = listener.stream().dropped_samples();
    if dropped > 0 {
        println!("{} samples dropped to overflow.", dropped);
    }
    Ok(())
}

/// Record from the selected devices for the configured duration, then
/// write one WAV per channel plus the session sidecar.
pub fn record(
    backend: &CpalBackend,
    settings: &Settings,
    selector: &DeviceSelector,
    stop: &StopSignal,
) -> Result<(), CaptureError> {
    let duration = settings.record_duration()?;
    let selected = select_recording_devices(backend, selector, settings.recorder.min_streams)?;

    let mut streams: Vec<(_, CpalCaptureStream)> = Vec::with_capacity(selected.len());
    for (role, device) in &selected {
        println!("{} channel: {}", role, device);
        streams.push((*role, backend.open_stream(device, settings.capture.clone())?));
    }

    let mut recorder = MultiStreamRecorder::new(settings.recorder.clone());
    recorder.set_observer(Arc::new(ConsoleObserver::new()));

    println!(
        "Recording for {:.1} seconds. Press Ctrl+C to stop early.",
        settings.record_duration_secs
    );
    let session = recorder.record(streams, duration, stop)?;

    if session.interrupted {
        println!("Recording interrupted after {:.1}s.", session.elapsed.as_secs_f64());
    }
    if let SessionStatus::Degraded { ref counts } = session.status {
        eprintln!("Warning: channels are short or out of step: {:?}", counts);
    }

    write_and_report(&session, &settings.output_directory)
}

fn write_and_report(session: &RecordingSession, out_dir: &Path) -> Result<(), CaptureError> {
    let metadata = write_session(session, out_dir)?;

    println!("Recording complete.");
    for track in &metadata.tracks {
        println!(
            "Saved {} ({} samples, sha256 {})",
            out_dir.join(&track.file_name).display(),
            track.sample_count,
            &track.checksum[..12.min(track.checksum.len())]
        );
    }
    Ok(())
}
