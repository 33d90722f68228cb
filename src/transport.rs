//! Framed transport: loop-until-complete send/recv of a header then a body
//! over any `Read + Write` byte stream (spec §4.3).
//!
//! The transport is deliberately synchronous per connection; concurrency
//! comes from one handler thread per connection in [`crate::server`].

use std::io::{self, Read, Write};

use crate::error::Error;
use crate::wire::header::{Header, HEADER_LEN};

/// Reads exactly `buf.len()` bytes, translating a clean EOF (zero bytes
/// read before the buffer is full) into [`Error::ConnectionClosed`] and
/// any other I/O error into [`Error::RecvFailed`].
fn read_exact_loop<R: Read>(r: &mut R, buf: &mut [u8]) -> Result<(), Error> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => return Err(Error::ConnectionClosed),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::RecvFailed(e.to_string())),
        }
    }
    Ok(())
}

/// Writes the entirety of `buf`, looping past partial writes.
fn write_all_loop<W: Write>(w: &mut W, buf: &[u8]) -> Result<(), Error> {
    let mut sent = 0;
    while sent < buf.len() {
        match w.write(&buf[sent..]) {
            Ok(0) => return Err(Error::SendFailed("write returned 0 bytes".to_string())),
            Ok(n) => sent += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::SendFailed(e.to_string())),
        }
    }
    Ok(())
}

/// Reads one frame header from `r`.
pub fn recv_header<R: Read>(r: &mut R) -> Result<Header, Error> {
    let mut buf = [0u8; HEADER_LEN];
    read_exact_loop(r, &mut buf)?;
    Header::decode(&buf)
}

/// Reads exactly `len` bytes of frame body from `r`.
pub fn recv_body<R: Read>(r: &mut R, len: u32) -> Result<Vec<u8>, Error> {
    let mut buf = vec![0u8; len as usize];
    read_exact_loop(r, &mut buf)?;
    Ok(buf)
}

/// Writes a full frame (header and body already concatenated by the
/// caller, e.g. via `Request::encode_frame`/`Response::encode_frame`) to
/// `w`.
pub fn send_frame<W: Write>(w: &mut W, frame: &[u8]) -> Result<(), Error> {
    write_all_loop(w, frame)?;
    w.flush().map_err(|e| Error::SendFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    struct PartialReader {
        chunks: Vec<Vec<u8>>,
    }

    impl Read for PartialReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.chunks.is_empty() {
                return Ok(0);
            }
            let chunk = self.chunks.remove(0);
            let n = chunk.len().min(buf.len());
            buf[..n].copy_from_slice(&chunk[..n]);
            Ok(n)
        }
    }

    #[test]
    fn recv_header_across_partial_reads() {
        let mut r = PartialReader {
            chunks: vec![vec![1, 0], vec![104, 0], vec![9, 0, 0, 0]],
        };
        let h = recv_header(&mut r).unwrap();
        assert_eq!(h.version, 1);
        assert_eq!(h.msg_type, 104);
        assert_eq!(h.body_len, 9);
    }

    #[test]
    fn recv_header_eof_is_connection_closed() {
        let mut r = Cursor::new(Vec::<u8>::new());
        let err = recv_header(&mut r).unwrap_err();
        assert_eq!(err, Error::ConnectionClosed);
    }

    #[test]
    fn recv_header_partial_then_eof_is_connection_closed() {
        let mut r = Cursor::new(vec![1u8, 0, 104]);
        let err = recv_header(&mut r).unwrap_err();
        assert_eq!(err, Error::ConnectionClosed);
    }

    #[test]
    fn send_and_recv_round_trip_over_cursor_pair() {
        let frame = crate::wire::Request::Logout.encode_frame();
        let mut buf = Vec::new();
        send_frame(&mut buf, &frame).unwrap();

        let mut r = Cursor::new(buf);
        let header = recv_header(&mut r).unwrap();
        assert_eq!(header.msg_type, crate::wire::msg_type::LOGOUT_REQUEST);
        let body = recv_body(&mut r, header.body_len).unwrap();
        assert!(body.is_empty());
    }
}
