/// Circular buffer of 16-bit samples for pull-mode capture.
///
/// Not synchronized on its own; `FrameRouter` wraps it in a
/// `parking_lot::Mutex` shared with the delivery thread.
///
/// Overflow behavior: drops oldest samples and reports how many were lost.
#[derive(Debug)]
pub struct RingBuffer {
    buffer: Vec<i16>,
    write_index: usize,
    read_index: usize,
    available: usize,
    capacity: usize,
}

impl RingBuffer {
    /// `capacity` must be non-zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be non-zero");
        Self {
            buffer: vec![0; capacity],
            write_index: 0,
            read_index: 0,
            available: 0,
            capacity,
        }
    }

    /// Write samples into the ring buffer, returning how many unread samples
    /// were dropped to make room.
    ///
    /// If `samples` is larger than capacity, only the last `capacity` samples
    /// are kept.
    pub fn write(&mut self, samples: &[i16]) -> usize {
        if samples.is_empty() {
            return 0;
        }

        let mut dropped = 0;
        let samples = if samples.len() > self.capacity {
            dropped += samples.len() - self.capacity;
            &samples[samples.len() - self.capacity..]
        } else {
            samples
        };

        let overflow = (self.available + samples.len()).saturating_sub(self.capacity);
        if overflow > 0 {
            self.read_index = (self.read_index + overflow) % self.capacity;
            self.available -= overflow;
            dropped += overflow;
        }

        for &sample in samples {
            self.buffer[self.write_index] = sample;
            self.write_index = (self.write_index + 1) % self.capacity;
        }
        self.available += samples.len();
        dropped
    }

    /// Read and remove up to `count` samples from the buffer.
    pub fn read(&mut self, count: usize) -> Vec<i16> {
        let to_read = count.min(self.available);
        if to_read == 0 {
            return Vec::new();
        }

        let mut result = Vec::with_capacity(to_read);
        for i in 0..to_read {
            result.push(self.buffer[(self.read_index + i) % self.capacity]);
        }
        self.read_index = (self.read_index + to_read) % self.capacity;
        self.available -= to_read;
        result
    }

    /// Read exactly `count` samples, or nothing if fewer are buffered.
    pub fn read_exact(&mut self, count: usize) -> Option<Vec<i16>> {
        if count == 0 || self.available < count {
            return None;
        }
        Some(self.read(count))
    }

    pub fn count(&self) -> usize {
        self.available
    }

    pub fn is_empty(&self) -> bool {
        self.available == 0
    }

    pub fn reset(&mut self) {
        self.write_index = 0;
        self.read_index = 0;
        self.available = 0;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_write_read() {
        let mut buf = RingBuffer::new(10);
        assert_eq!(buf.write(&[1, 2, 3]), 0);

        assert_eq!(buf.count(), 3);
        assert_eq!(buf.read(3), vec![1, 2, 3]);
        assert!(buf.is_empty());
    }

    #[test]
    fn overflow_drops_oldest_and_reports() {
        let mut buf = RingBuffer::new(4);
        buf.write(&[1, 2, 3, 4]);
        let dropped = buf.write(&[5, 6]);

        assert_eq!(dropped, 2);
        assert_eq!(buf.count(), 4);
        assert_eq!(buf.read(4), vec![3, 4, 5, 6]);
    }

    #[test]
    fn write_larger_than_capacity_keeps_tail() {
        let mut buf = RingBuffer::new(3);
        let dropped = buf.write(&[1, 2, 3, 4, 5]);

        assert_eq!(dropped, 2);
        assert_eq!(buf.read(3), vec![3, 4, 5]);
    }

    #[test]
    fn wraparound() {
        let mut buf = RingBuffer::new(4);

        buf.write(&[1, 2, 3]);
        buf.read(2);
        buf.write(&[4, 5, 6]);

        assert_eq!(buf.count(), 4);
        assert_eq!(buf.read(4), vec![3, 4, 5, 6]);
    }

    #[test]
    fn read_exact_waits_for_a_full_block() {
        let mut buf = RingBuffer::new(8);
        buf.write(&[1, 2, 3]);

        assert_eq!(buf.read_exact(4), None);
        assert_eq!(buf.count(), 3);

        buf.write(&[4]);
        assert_eq!(buf.read_exact(4), Some(vec![1, 2, 3, 4]));
    }

    #[test]
    fn reset_clears_buffer() {
        let mut buf = RingBuffer::new(10);
        buf.write(&[1, 2, 3]);
        buf.reset();

        assert!(buf.is_empty());
        assert!(buf.read(10).is_empty());
    }
}
