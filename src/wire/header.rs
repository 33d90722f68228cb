//! The fixed 8-byte frame header shared by every request and response.

use crate::error::Error;
use crate::wire::endian;

/// The current (and only) protocol version this crate speaks.
pub const PROTOCOL_VERSION: u16 = 1;

/// The default TCP port Chat262 listens on.
pub const DEFAULT_PORT: u16 = 61079;

/// Length, in bytes, of an encoded [`Header`].
pub const HEADER_LEN: usize = 8;

/// The 8-byte header that precedes every frame's body.
///
/// Field order on the wire, all little-endian: `version: u16`,
/// `type: u16`, `body_len: u32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// The protocol version of the sender.
    pub version: u16,
    /// The numeric message type (see [`crate::wire::message`]).
    pub msg_type: u16,
    /// The exact number of bytes making up the body that follows.
    pub body_len: u32,
}

impl Header {
    /// Constructs a new header carrying the current protocol version.
    pub fn new(msg_type: u16, body_len: u32) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            msg_type,
            body_len,
        }
    }

    /// Encodes this header into its fixed 8-byte wire form.
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        endian::write_u16(&mut buf[0..2], self.version);
        endian::write_u16(&mut buf[2..4], self.msg_type);
        endian::write_u32(&mut buf[4..8], self.body_len);
        buf
    }

    /// Decodes a header from exactly [`HEADER_LEN`] bytes.
    pub fn decode(buf: &[u8]) -> Result<Self, Error> {
        if buf.len() != HEADER_LEN {
            return Err(Error::IncompleteHeader(buf.len()));
        }

        Ok(Self {
            version: endian::read_u16(&buf[0..2]),
            msg_type: endian::read_u16(&buf[2..4]),
            body_len: endian::read_u32(&buf[4..8]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn encode_decode_known_values() {
        let h = Header::new(104, 9);
        let encoded = h.encode();
        assert_eq!(encoded, [1, 0, 104, 0, 9, 0, 0, 0]);
        assert_eq!(Header::decode(&encoded).unwrap(), h);
    }

    #[test]
    fn decode_rejects_short_buffer() {
        let err = Header::decode(&[1, 0, 2, 0]).unwrap_err();
        assert_eq!(err, Error::IncompleteHeader(4));
    }

    #[test]
    fn decode_rejects_long_buffer() {
        let err = Header::decode(&[0u8; 9]).unwrap_err();
        assert_eq!(err, Error::IncompleteHeader(9));
    }

    proptest! {
        #[test]
        fn prop_round_trip(version: u16, msg_type: u16, body_len: u32) {
            let h = Header { version, msg_type, body_len };
            let encoded = h.encode();
            prop_assert_eq!(encoded.len(), HEADER_LEN);
            prop_assert_eq!(Header::decode(&encoded).unwrap(), h);
        }
    }
}
