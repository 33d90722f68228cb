use thiserror::Error;

/// Error types returned by this crate.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// The buffer is too small to contain an 8-byte frame header.
    #[error("incomplete frame header (got {0} bytes, expected 8)")]
    IncompleteHeader(usize),

    /// A message body's length prefixes are internally inconsistent, or the
    /// body's total length doesn't match `body_len` from the header.
    ///
    /// This is the `BodyMalformed` error named in the protocol's error
    /// taxonomy: the server answers it with `invalid_body_response` and
    /// closes the connection; a client surfaces it to the caller.
    #[error("malformed message body")]
    BodyMalformed,

    /// The request or response `type` field doesn't match any known
    /// message type.
    #[error("unrecognised message type {0}")]
    UnknownMessageType(u16),

    /// The peer closed the connection (clean EOF) while a frame was only
    /// partially read.
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// Sending a frame to the peer failed.
    #[error("failed to send frame: {0}")]
    SendFailed(String),

    /// Receiving a frame from the peer failed.
    #[error("failed to receive frame: {0}")]
    RecvFailed(String),

    /// A client received a frame whose `version` or `type` didn't match
    /// what it expected for the request it sent.
    #[error("unexpected response header (version {version}, type {msg_type})")]
    HeaderMismatch {
        /// The `version` field observed on the wire.
        version: u16,
        /// The `type` field observed on the wire.
        msg_type: u16,
    },

    /// An I/O error occurred that isn't more precisely classified above.
    #[error("i/o error ({0:?}): {1}")]
    Io(std::io::ErrorKind, String),
}

impl From<std::io::Error> for Error {
    fn from(v: std::io::Error) -> Self {
        if v.kind() == std::io::ErrorKind::UnexpectedEof {
            return Self::ConnectionClosed;
        }
        Self::Io(v.kind(), v.to_string())
    }
}
