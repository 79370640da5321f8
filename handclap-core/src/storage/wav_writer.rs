use std::fs::{self, File};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::models::error::CaptureError;
use crate::processing::pcm;
use crate::processing::wav_format::{WavSpec, WAV_HEADER_SIZE};

/// Streaming 16-bit PCM WAV writer.
///
/// ```text
/// [44-byte WAV header, sizes zeroed until close]
/// [little-endian i16 samples...]
/// ```
///
/// `close` rewrites the header with the final data length and returns the
/// SHA-256 of the finished file.
pub struct WavFileWriter {
    file_path: PathBuf,
    spec: WavSpec,
    file: Option<BufWriter<File>>,
    data_bytes: u64,
}

impl WavFileWriter {
    pub fn new(file_path: PathBuf, spec: WavSpec) -> Self {
        Self {
            file_path,
            spec,
            file: None,
            data_bytes: 0,
        }
    }

    /// Create the file (and its directory) and write a placeholder header.
    pub fn open(&mut self) -> Result<(), CaptureError> {
        if self.file.is_some() {
            return Ok(());
        }

        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| CaptureError::StorageError(format!("failed to create directory: {}", e)))?;
        }

        let file = File::create(&self.file_path).map_err(|e| {
            CaptureError::StorageError(format!("failed to create {}: {}", self.file_path.display(), e))
        })?;
        let mut file = BufWriter::new(file);
        file.write_all(&self.spec.header(0))
            .map_err(|e| CaptureError::StorageError(format!("write failed: {}", e)))?;

        self.file = Some(file);
        self.data_bytes = 0;
        Ok(())
    }

    pub fn write_samples(&mut self, samples: &[i16]) -> Result<(), CaptureError> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| CaptureError::StorageError("file is not open for writing".into()))?;
        let bytes = pcm::to_le_bytes(samples);
        file.write_all(&bytes)
            .map_err(|e| CaptureError::StorageError(format!("write failed: {}", e)))?;
        self.data_bytes += bytes.len() as u64;
        Ok(())
    }

    /// Patch the header sizes, flush, and checksum the file.
    pub fn close(&mut self) -> Result<String, CaptureError> {
        let mut file = self
            .file
            .take()
            .ok_or_else(|| CaptureError::StorageError("file is not open".into()))?;

        let data_len = u32::try_from(self.data_bytes).map_err(|_| {
            CaptureError::StorageError(format!("{} bytes exceeds the WAV size limit", self.data_bytes))
        })?;

        file.seek(SeekFrom::Start(0))
            .map_err(|e| CaptureError::StorageError(e.to_string()))?;
        file.write_all(&self.spec.header(data_len))
            .map_err(|e| CaptureError::StorageError(e.to_string()))?;
        file.flush().map_err(|e| CaptureError::StorageError(e.to_string()))?;
        drop(file);

        sha256_file(&self.file_path)
    }

    /// PCM bytes written so far, header excluded.
    pub fn data_bytes(&self) -> u64 {
        self.data_bytes
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

/// Write a whole channel in one go. Returns the file checksum.
pub fn write_wav(path: &Path, spec: WavSpec, samples: &[i16]) -> Result<String, CaptureError> {
    let mut writer = WavFileWriter::new(path.to_path_buf(), spec);
    writer.open()?;
    writer.write_samples(samples)?;
    writer.close()
}

/// Load a file written by `WavFileWriter`.
pub fn read_wav(path: &Path) -> Result<(WavSpec, Vec<i16>), CaptureError> {
    let data = fs::read(path)
        .map_err(|e| CaptureError::StorageError(format!("failed to read {}: {}", path.display(), e)))?;
    let (spec, data_len) = WavSpec::parse(&data)
        .ok_or_else(|| CaptureError::StorageError(format!("{} is not a 16-bit PCM WAV file", path.display())))?;

    let end = WAV_HEADER_SIZE + data_len as usize;
    if data.len() < end {
        return Err(CaptureError::StorageError(format!(
            "{} is truncated: header claims {} data bytes",
            path.display(),
            data_len
        )));
    }
    let samples = data[WAV_HEADER_SIZE..end]
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect();
    Ok((spec, samples))
}

/// SHA-256 hex digest of a file.
pub fn sha256_file(path: &Path) -> Result<String, CaptureError> {
    let data =
        fs::read(path).map_err(|e| CaptureError::StorageError(format!("failed to read file for checksum: {}", e)))?;
    Ok(hex_encode(&Sha256::digest(&data)))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
