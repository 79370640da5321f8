use std::fs;
use std::path::Path;

use crate::models::audio_models::ChannelRole;
use crate::models::error::CaptureError;
use crate::models::recording_result::{ChannelMetadata, RecordingMetadata, RecordingSession};
use crate::processing::wav_format::WavSpec;
use crate::storage::metadata::write_metadata;
use crate::storage::wav_writer::write_wav;

/// WAV file name for a channel, e.g. `left_mic_clap.wav`.
pub fn channel_file_name(role: ChannelRole) -> String {
    format!("{}_clap.wav", role.file_stem())
}

/// Persist a sealed session: one WAV per channel plus the JSON sidecar.
///
/// Degraded sessions are written as-is; the sidecar carries the status and
/// per-channel counts so the mismatch stays visible.
pub fn write_session(session: &RecordingSession, dir: &Path) -> Result<RecordingMetadata, CaptureError> {
    fs::create_dir_all(dir)
        .map_err(|e| CaptureError::StorageError(format!("failed to create {}: {}", dir.display(), e)))?;

    let spec = WavSpec {
        sample_rate: session.sample_rate,
        channels: session.channels,
    };

    let mut tracks = Vec::with_capacity(session.recordings.len());
    for recording in &session.recordings {
        let file_name = channel_file_name(recording.role);
        let checksum = write_wav(&dir.join(&file_name), spec, &recording.samples)?;
        log::info!(
            "Wrote {} ({} samples) from {}",
            file_name,
            recording.sample_count(),
            recording.device.name
        );
        tracks.push(ChannelMetadata {
            role: recording.role,
            device_name: recording.device.name.clone(),
            device_index: recording.device.index,
            sample_count: recording.sample_count(),
            file_name,
            checksum,
        });
    }

    let metadata = RecordingMetadata::new(session, tracks);
    write_metadata(&metadata, dir)?;
    Ok(metadata)
}
