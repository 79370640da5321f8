use super::error::CaptureError;

/// Recording session state machine.
///
/// State transitions:
/// ```text
/// idle → starting → recording → stopping → sealed
///           ↓
///         failed
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    Starting,
    Recording { elapsed_secs: f64 },
    Stopping,
    Sealed,
    Failed(CaptureError),
}

impl SessionState {
    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Sealed | Self::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(SessionState::Sealed.is_terminal());
        assert!(SessionState::Failed(CaptureError::StreamClosed).is_terminal());
        assert!(!SessionState::Recording { elapsed_secs: 1.0 }.is_terminal());
        assert!(SessionState::Recording { elapsed_secs: 1.0 }.is_recording());
    }
}
