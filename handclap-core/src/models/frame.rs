/// One fixed-size block of interleaved 16-bit samples from a single stream.
///
/// Immutable once produced. `index` counts frames from the start of the
/// stream that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    samples: Vec<i16>,
    sample_rate: u32,
    channels: u16,
    index: u64,
}

impl Frame {
    pub fn new(samples: Vec<i16>, sample_rate: u32, channels: u16, index: u64) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
            index,
        }
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    /// Maximum absolute sample value. `i16::MIN` maps to 32768.
    pub fn peak(&self) -> u16 {
        self.samples
            .iter()
            .map(|s| s.unsigned_abs())
            .max()
            .unwrap_or(0)
    }

    /// Frame start in seconds since the stream started, given the per-channel
    /// frame length.
    pub fn offset_secs(&self, chunk_size: usize) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        (self.index as f64 * chunk_size as f64) / self.sample_rate as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peak_handles_most_negative_sample() {
        let frame = Frame::new(vec![0, 12, i16::MIN, 300], 44100, 1, 0);
        assert_eq!(frame.peak(), 32768);
    }

    #[test]
    fn peak_of_empty_frame_is_zero() {
        let frame = Frame::new(Vec::new(), 44100, 1, 0);
        assert_eq!(frame.peak(), 0);
    }

    #[test]
    fn offset_from_index() {
        let frame = Frame::new(vec![0; 1024], 44100, 1, 43);
        approx::assert_relative_eq!(frame.offset_secs(1024), 43.0 * 1024.0 / 44100.0);
    }
}
