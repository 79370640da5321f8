//! RIFF/WAVE header encoding for 16-bit PCM channel files.

/// Size of the canonical header: RIFF descriptor + `fmt ` + `data` preamble.
pub const WAV_HEADER_SIZE: usize = 44;

const BITS_PER_SAMPLE: u16 = 16;
const PCM_FORMAT: u16 = 1;

/// Format of a 16-bit PCM WAV file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    pub sample_rate: u32,
    pub channels: u16,
}

impl WavSpec {
    pub fn block_align(&self) -> u16 {
        self.channels * BITS_PER_SAMPLE / 8
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.block_align() as u32
    }

    /// Header for a file whose data chunk holds `data_len` bytes.
    ///
    /// Layout (little-endian):
    /// ```text
    /// [0-3]   "RIFF"   [4-7]   36 + data_len   [8-11]  "WAVE"
    /// [12-15] "fmt "   [16-19] 16              [20-21] 1 (PCM)
    /// [22-23] channels [24-27] sample_rate     [28-31] byte_rate
    /// [32-33] align    [34-35] 16              [36-39] "data"
    /// [40-43] data_len
    /// ```
    pub fn header(&self, data_len: u32) -> [u8; WAV_HEADER_SIZE] {
        let mut header = [0u8; WAV_HEADER_SIZE];
        header[0..4].copy_from_slice(b"RIFF");
        header[4..8].copy_from_slice(&(36u32.saturating_add(data_len)).to_le_bytes());
        header[8..12].copy_from_slice(b"WAVE");
        header[12..16].copy_from_slice(b"fmt ");
        header[16..20].copy_from_slice(&16u32.to_le_bytes());
        header[20..22].copy_from_slice(&PCM_FORMAT.to_le_bytes());
        header[22..24].copy_from_slice(&self.channels.to_le_bytes());
        header[24..28].copy_from_slice(&self.sample_rate.to_le_bytes());
        header[28..32].copy_from_slice(&self.byte_rate().to_le_bytes());
        header[32..34].copy_from_slice(&self.block_align().to_le_bytes());
        header[34..36].copy_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
        header[36..40].copy_from_slice(b"data");
        header[40..44].copy_from_slice(&data_len.to_le_bytes());
        header
    }

    /// Read back the spec and data length of a header this module wrote.
    pub fn parse(header: &[u8]) -> Option<(WavSpec, u32)> {
        if header.len() < WAV_HEADER_SIZE
            || &header[0..4] != b"RIFF"
            || &header[8..12] != b"WAVE"
            || &header[36..40] != b"data"
        {
            return None;
        }
        let le16 = |at: usize| u16::from_le_bytes([header[at], header[at + 1]]);
        let le32 = |at: usize| {
            u32::from_le_bytes([header[at], header[at + 1], header[at + 2], header[at + 3]])
        };
        if le16(20) != PCM_FORMAT || le16(34) != BITS_PER_SAMPLE {
            return None;
        }
        let spec = WavSpec {
            channels: le16(22),
            sample_rate: le32(24),
        };
        Some((spec, le32(40)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_44k_header_fields() {
        let spec = WavSpec {
            sample_rate: 44100,
            channels: 1,
        };
        let header = spec.header(2048);

        assert_eq!(&header[0..4], b"RIFF");
        assert_eq!(&header[12..16], b"fmt ");
        assert_eq!(u32::from_le_bytes([header[4], header[5], header[6], header[7]]), 36 + 2048);
        assert_eq!(spec.byte_rate(), 88200);
        assert_eq!(spec.block_align(), 2);
    }

    #[test]
    fn parse_reads_back_written_header() {
        let spec = WavSpec {
            sample_rate: 48000,
            channels: 2,
        };
        let header = spec.header(9600);

        assert_eq!(WavSpec::parse(&header), Some((spec, 9600)));
    }

    #[test]
    fn parse_rejects_foreign_data() {
        assert_eq!(WavSpec::parse(&[b'x'; WAV_HEADER_SIZE]), None);
        assert_eq!(WavSpec::parse(&[0u8; 10]), None);
    }
}
