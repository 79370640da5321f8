use crate::models::config::CaptureConfiguration;
use crate::models::frame::Frame;

/// Cuts arbitrarily sized host buffers into fixed-size, indexed frames.
///
/// Hosts hand over whatever buffer size they negotiated; downstream code
/// needs exactly `chunk_size * channels` samples per frame. Leftover samples
/// wait for the next push.
#[derive(Debug)]
pub struct FrameAssembler {
    pending: Vec<i16>,
    frame_len: usize,
    sample_rate: u32,
    channels: u16,
    next_index: u64,
}

impl FrameAssembler {
    pub fn new(config: &CaptureConfiguration) -> Self {
        let frame_len = config.frame_len();
        Self {
            pending: Vec::with_capacity(frame_len * 2),
            frame_len,
            sample_rate: config.sample_rate,
            channels: config.channels,
            next_index: 0,
        }
    }

    /// Append samples and hand every completed frame to `emit`, in order.
    pub fn push(&mut self, samples: &[i16], mut emit: impl FnMut(Frame)) {
        self.pending.extend_from_slice(samples);
        while self.pending.len() >= self.frame_len {
            let chunk: Vec<i16> = self.pending.drain(..self.frame_len).collect();
            emit(Frame::new(chunk, self.sample_rate, self.channels, self.next_index));
            self.next_index += 1;
        }
    }

    /// Samples waiting for the rest of their frame.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Index the next emitted frame will carry.
    pub fn next_index(&self) -> u64 {
        self.next_index
    }

    /// Drop partial data and restart indices at zero.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.next_index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(chunk_size: usize, channels: u16) -> CaptureConfiguration {
        CaptureConfiguration {
            chunk_size,
            channels,
            ..Default::default()
        }
    }

    #[test]
    fn emits_fixed_frames_across_uneven_pushes() {
        let mut assembler = FrameAssembler::new(&config(4, 1));
        let mut frames = Vec::new();

        assembler.push(&[1, 2, 3], |f| frames.push(f));
        assert!(frames.is_empty());
        assert_eq!(assembler.pending(), 3);

        assembler.push(&[4, 5, 6, 7, 8, 9], |f| frames.push(f));
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].samples(), &[1, 2, 3, 4]);
        assert_eq!(frames[1].samples(), &[5, 6, 7, 8]);
        assert_eq!(frames[0].index(), 0);
        assert_eq!(frames[1].index(), 1);
        assert_eq!(assembler.pending(), 1);
    }

    #[test]
    fn frame_length_counts_all_channels() {
        let mut assembler = FrameAssembler::new(&config(2, 2));
        let mut frames = Vec::new();

        assembler.push(&[1, -1, 2, -2, 3], |f| frames.push(f));

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].len(), 4);
        assert_eq!(frames[0].channels(), 2);
    }

    #[test]
    fn reset_restarts_indices() {
        let mut assembler = FrameAssembler::new(&config(2, 1));
        assembler.push(&[1, 2, 3], |_| {});
        assembler.reset();

        assert_eq!(assembler.pending(), 0);
        assert_eq!(assembler.next_index(), 0);
    }
}
