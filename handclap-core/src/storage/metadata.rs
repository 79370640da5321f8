use std::fs;
use std::path::Path;

use crate::models::error::CaptureError;
use crate::models::recording_result::RecordingMetadata;

/// File name of the session sidecar inside an output directory.
pub const METADATA_FILE_NAME: &str = "clap_session.metadata.json";

/// Write session metadata as `clap_session.metadata.json` in `dir`.
pub fn write_metadata(metadata: &RecordingMetadata, dir: &Path) -> Result<(), CaptureError> {
    let metadata_path = dir.join(METADATA_FILE_NAME);
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| CaptureError::StorageError(format!("failed to serialize metadata: {}", e)))?;
    fs::write(&metadata_path, json)
        .map_err(|e| CaptureError::StorageError(format!("failed to write metadata: {}", e)))?;
    Ok(())
}

/// Read the session sidecar from `dir`.
pub fn read_metadata(dir: &Path) -> Result<RecordingMetadata, CaptureError> {
    let json = fs::read_to_string(dir.join(METADATA_FILE_NAME))
        .map_err(|e| CaptureError::StorageError(format!("failed to read metadata: {}", e)))?;
    serde_json::from_str(&json)
        .map_err(|e| CaptureError::StorageError(format!("failed to parse metadata: {}", e)))
}
