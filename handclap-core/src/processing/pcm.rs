//! Sample-format helpers for 16-bit PCM.
//!
//! Pure functions over slices, no platform dependencies.

/// Convert a normalized f32 sample `[-1.0, 1.0]` to 16-bit PCM.
///
/// Clamps out-of-range values. Full scale maps to `±i16::MAX`.
pub fn f32_to_i16(sample: f32) -> i16 {
    let clamped = sample.clamp(-1.0, 1.0);
    (clamped * i16::MAX as f32) as i16
}

/// Convert an unsigned 16-bit sample (midpoint 32768) to signed.
pub fn u16_to_i16(sample: u16) -> i16 {
    (sample as i32 - 32768) as i16
}

/// Convert a slice of normalized floats into `out`, replacing its contents.
pub fn convert_f32_into(samples: &[f32], out: &mut Vec<i16>) {
    out.clear();
    out.extend(samples.iter().map(|&s| f32_to_i16(s)));
}

/// Serialize samples as little-endian bytes for a PCM data chunk.
pub fn to_le_bytes(samples: &[i16]) -> Vec<u8> {
    let mut data = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        data.extend_from_slice(&sample.to_le_bytes());
    }
    data
}

/// Peak absolute level normalized to 0.0–1.0.
pub fn peak_level(samples: &[i16]) -> f32 {
    let peak = samples.iter().map(|s| s.unsigned_abs()).max().unwrap_or(0);
    peak as f32 / 32768.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn f32_conversion_clamps() {
        assert_eq!(f32_to_i16(0.0), 0);
        assert_eq!(f32_to_i16(1.0), i16::MAX);
        assert_eq!(f32_to_i16(-1.0), -i16::MAX);
        assert_eq!(f32_to_i16(2.0), i16::MAX);
        assert_eq!(f32_to_i16(-3.0), -i16::MAX);
    }

    #[test]
    fn u16_midpoint_is_silence() {
        assert_eq!(u16_to_i16(32768), 0);
        assert_eq!(u16_to_i16(0), i16::MIN);
        assert_eq!(u16_to_i16(u16::MAX), i16::MAX);
    }

    #[test]
    fn convert_into_reuses_buffer() {
        let mut out = vec![9, 9, 9, 9];
        convert_f32_into(&[0.0, 0.5], &mut out);
        assert_eq!(out.len(), 2);
        assert_eq!(out[1], (0.5 * i16::MAX as f32) as i16);
    }

    #[test]
    fn le_bytes_layout() {
        let bytes = to_le_bytes(&[1, -2]);
        assert_eq!(bytes, vec![0x01, 0x00, 0xFE, 0xFF]);
    }

    #[test]
    fn peak_level_full_scale() {
        approx::assert_relative_eq!(peak_level(&[0, i16::MIN, 10]), 1.0);
        approx::assert_relative_eq!(peak_level(&[]), 0.0);
    }
}
