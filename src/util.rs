//! Byte helpers.

/// Decodes up to four bytes as a big-endian unsigned integer.
///
/// An empty slice decodes to `0`. Bytes beyond the fourth are shifted out,
/// so callers should never pass more than four.
pub fn read_be(bytes: &[u8]) -> u32 {
    debug_assert!(bytes.len() <= 4);
    bytes
        .iter()
        .fold(0u32, |sum, &b| (sum << 8) | u32::from(b))
}

#[cfg(test)]
mod tests {
    use byteorder::{BigEndian, ByteOrder};

    use super::*;

    #[test]
    fn inverse_of_big_endian_encoding() {
        for v in 0..=u8::MAX {
            assert_eq!(read_be(&[v]), u32::from(v));
        }

        let mut buf = [0; 2];
        for v in 0..=u16::MAX {
            BigEndian::write_u16(&mut buf, v);
            assert_eq!(read_be(&buf), u32::from(v));
        }

        let mut buf = [0; 4];
        for &v in &[0, 1, 0xFF, 0x100, 0xFFFF, 0x0001_0000, 0x1234_5678, u32::MAX - 1, u32::MAX] {
            BigEndian::write_u32(&mut buf, v);
            assert_eq!(read_be(&buf), v);
        }
        for v in (0..=u32::MAX).step_by(65_521) {
            BigEndian::write_u32(&mut buf, v);
            assert_eq!(read_be(&buf), v);
        }
    }

    #[test]
    fn boundary_values() {
        assert_eq!(read_be(&[]), 0);
        assert_eq!(read_be(&[0x00, 0x00]), 0);
        assert_eq!(read_be(&[0xFF, 0xFF]), 0xFFFF);
        assert_eq!(read_be(&[0x00, 0x0A]), 10);
    }
}
