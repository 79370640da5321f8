use crate::models::audio_models::DetectionEvent;
use crate::models::config::DetectorConfig;
use crate::models::error::CaptureError;
use crate::models::frame::Frame;

/// Hysteresis latch of the detector.
///
/// ```text
///            peak > threshold (emit)
///   Armed ───────────────────────────→ Cooldown
///     ↑                                   │
///     └───── peak < threshold * ratio ────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    Armed,
    Cooldown,
}

/// Peak-threshold clap detector with hysteresis.
///
/// A clap usually stays above threshold for several consecutive frames. The
/// latch turns that whole loud episode into a single triggered event, and
/// only re-arms after a frame whose peak falls below
/// `threshold * release_ratio`.
#[derive(Debug, Clone)]
pub struct TransientDetector {
    threshold: u16,
    release_level: f32,
    release_ratio: f32,
    chunk_size: usize,
    state: DetectorState,
}

impl TransientDetector {
    /// `chunk_size` is the per-channel frame length frames must match.
    pub fn new(config: &DetectorConfig, chunk_size: usize) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::ConfigurationFailed)?;
        if chunk_size == 0 {
            return Err(CaptureError::ConfigurationFailed(
                "chunk size must be positive".into(),
            ));
        }
        Ok(Self {
            threshold: config.threshold,
            release_level: config.threshold as f32 * config.release_ratio,
            release_ratio: config.release_ratio,
            chunk_size,
            state: DetectorState::Armed,
        })
    }

    pub fn threshold(&self) -> u16 {
        self.threshold
    }

    pub fn release_ratio(&self) -> f32 {
        self.release_ratio
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        self.state == DetectorState::Armed
    }

    /// Back to `Armed`, e.g. after the stream was reopened.
    pub fn reset(&mut self) {
        self.state = DetectorState::Armed;
    }

    /// Evaluate one frame. Malformed frames leave the latch untouched.
    pub fn evaluate(&mut self, frame: &Frame) -> Result<DetectionEvent, CaptureError> {
        let expected = self.chunk_size * frame.channels().max(1) as usize;
        if frame.is_empty() || frame.len() != expected {
            return Err(CaptureError::InvalidFrame {
                expected,
                actual: frame.len(),
            });
        }

        let peak = frame.peak();
        let mut triggered = false;

        match self.state {
            DetectorState::Armed if peak > self.threshold => {
                triggered = true;
                self.state = DetectorState::Cooldown;
            }
            DetectorState::Cooldown if (peak as f32) < self.release_level => {
                self.state = DetectorState::Armed;
                log::trace!("Detector re-armed at frame {}", frame.index());
            }
            _ => {}
        }

        Ok(DetectionEvent {
            peak,
            triggered,
            frame_index: frame.index(),
            offset_secs: frame.offset_secs(self.chunk_size),
        })
    }
}
