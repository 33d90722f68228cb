//! Request/response bodies for every message type in the protocol, and
//! their strict-length-checked codec.
//!
//! See spec §4.2. Every deserializer verifies that the body's length
//! exactly matches what its internal length prefixes require; any
//! deviation (short, long, or internally inconsistent) is rejected as
//! [`Error::BodyMalformed`].

use crate::error::Error;
use crate::wire::endian;
use crate::wire::header::Header;

/// Numeric message type codes, exactly as laid out in spec §4.2's table.
pub mod msg_type {
    pub const REGISTRATION_REQUEST: u16 = 101;
    pub const LOGIN_REQUEST: u16 = 102;
    pub const LOGOUT_REQUEST: u16 = 103;
    pub const ACCOUNTS_REQUEST: u16 = 104;
    pub const SEND_TXT_REQUEST: u16 = 105;
    pub const RECV_TXT_REQUEST: u16 = 106;
    pub const CORRESPONDENTS_REQUEST: u16 = 107;
    pub const DELETE_REQUEST: u16 = 108;

    pub const REGISTRATION_RESPONSE: u16 = 201;
    pub const LOGIN_RESPONSE: u16 = 202;
    pub const LOGOUT_RESPONSE: u16 = 203;
    pub const ACCOUNTS_RESPONSE: u16 = 204;
    pub const SEND_TXT_RESPONSE: u16 = 205;
    pub const RECV_TXT_RESPONSE: u16 = 206;
    pub const CORRESPONDENTS_RESPONSE: u16 = 207;
    pub const DELETE_RESPONSE: u16 = 208;

    pub const WRONG_VERSION: u16 = 301;
    pub const INVALID_TYPE: u16 = 302;
    pub const INVALID_BODY: u16 = 303;
}

/// The sender tag on a stored (or wire-transmitted) text, interpreted from
/// the reader's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// The reader sent this text.
    You = 0,
    /// The reader's correspondent sent this text.
    Other = 1,
}

impl Tag {
    /// Maps a raw wire tag byte to a [`Tag`].
    pub fn from_raw(v: u8) -> Result<Self, Error> {
        match v {
            0 => Ok(Self::You),
            1 => Ok(Self::Other),
            _ => Err(Error::BodyMalformed),
        }
    }

    /// Returns the raw wire byte for this tag.
    pub fn as_raw(self) -> u8 {
        self as u8
    }

    /// The tag as seen by the other party holding the mirrored copy of
    /// this text.
    pub fn inverted(self) -> Self {
        match self {
            Self::You => Self::Other,
            Self::Other => Self::You,
        }
    }
}

/// One text as carried in a `recv_txt_response`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireText {
    /// Sender tag, from the reader's perspective.
    pub tag: Tag,
    /// The raw text content (may be empty; no length cap).
    pub content: Vec<u8>,
}

/// A fully decoded client→server request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `registration_request` (101).
    Registration {
        /// The desired username.
        username: Vec<u8>,
        /// The desired password.
        password: Vec<u8>,
    },
    /// `login_request` (102).
    Login {
        /// The claimed username.
        username: Vec<u8>,
        /// The claimed password.
        password: Vec<u8>,
    },
    /// `logout_request` (103).
    Logout,
    /// `accounts_request` (104).
    Accounts {
        /// The wildcard pattern to match registered usernames against.
        pattern: Vec<u8>,
    },
    /// `send_txt_request` (105).
    SendTxt {
        /// The recipient's username.
        to: Vec<u8>,
        /// The text content.
        text: Vec<u8>,
    },
    /// `recv_txt_request` (106).
    RecvTxt {
        /// The correspondent whose chat to fetch.
        from: Vec<u8>,
    },
    /// `correspondents_request` (107).
    Correspondents,
    /// `delete_request` (108).
    Delete,
}

impl Request {
    /// Returns the numeric message type for this request.
    pub fn msg_type(&self) -> u16 {
        match self {
            Self::Registration { .. } => msg_type::REGISTRATION_REQUEST,
            Self::Login { .. } => msg_type::LOGIN_REQUEST,
            Self::Logout => msg_type::LOGOUT_REQUEST,
            Self::Accounts { .. } => msg_type::ACCOUNTS_REQUEST,
            Self::SendTxt { .. } => msg_type::SEND_TXT_REQUEST,
            Self::RecvTxt { .. } => msg_type::RECV_TXT_REQUEST,
            Self::Correspondents => msg_type::CORRESPONDENTS_REQUEST,
            Self::Delete => msg_type::DELETE_REQUEST,
        }
    }

    /// Encodes the body (not including the header) for this request.
    pub fn encode_body(&self) -> Vec<u8> {
        match self {
            Self::Registration { username, password } | Self::Login { username, password } => {
                encode_two_strings(username, password)
            }
            Self::Logout | Self::Correspondents | Self::Delete => Vec::new(),
            Self::Accounts { pattern } => encode_one_string(pattern),
            Self::SendTxt { to, text } => encode_two_strings(to, text),
            Self::RecvTxt { from } => encode_one_string(from),
        }
    }

    /// Encodes this request into a full frame (header followed by body).
    pub fn encode_frame(&self) -> Vec<u8> {
        let body = self.encode_body();
        let header = Header::new(self.msg_type(), body.len() as u32);
        let mut frame = Vec::with_capacity(crate::wire::header::HEADER_LEN + body.len());
        frame.extend_from_slice(&header.encode());
        frame.extend_from_slice(&body);
        frame
    }

    /// Decodes a request body given the message type already read from the
    /// header. `body` must be exactly `header.body_len` bytes (the caller
    /// is responsible for having read exactly that many).
    pub fn decode(msg_type: u16, body: &[u8]) -> Result<Self, Error> {
        Ok(match msg_type {
            msg_type::REGISTRATION_REQUEST => {
                let (username, password) = decode_two_strings(body)?;
                Self::Registration { username, password }
            }
            msg_type::LOGIN_REQUEST => {
                let (username, password) = decode_two_strings(body)?;
                Self::Login { username, password }
            }
            msg_type::LOGOUT_REQUEST => {
                require_empty(body)?;
                Self::Logout
            }
            msg_type::ACCOUNTS_REQUEST => {
                let pattern = decode_one_string(body)?;
                Self::Accounts { pattern }
            }
            msg_type::SEND_TXT_REQUEST => {
                let (to, text) = decode_two_strings(body)?;
                Self::SendTxt { to, text }
            }
            msg_type::RECV_TXT_REQUEST => {
                let from = decode_one_string(body)?;
                Self::RecvTxt { from }
            }
            msg_type::CORRESPONDENTS_REQUEST => {
                require_empty(body)?;
                Self::Correspondents
            }
            msg_type::DELETE_REQUEST => {
                require_empty(body)?;
                Self::Delete
            }
            other => return Err(Error::UnknownMessageType(other)),
        })
    }
}

/// A fully decoded server→client response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// `registration_response` (201).
    Registration {
        /// Raw status code; never assumed to be one of the known values.
        status: u32,
    },
    /// `login_response` (202).
    Login {
        /// Raw status code.
        status: u32,
    },
    /// `logout_response` (203).
    Logout {
        /// Raw status code.
        status: u32,
    },
    /// `accounts_response` (204).
    Accounts {
        /// Raw status code.
        status: u32,
        /// Matching usernames; only meaningful (and only ever non-empty)
        /// when `status == OK`.
        usernames: Vec<Vec<u8>>,
    },
    /// `send_txt_response` (205).
    SendTxt {
        /// Raw status code.
        status: u32,
    },
    /// `recv_txt_response` (206).
    RecvTxt {
        /// Raw status code.
        status: u32,
        /// The caller's view of the chat; only meaningful when
        /// `status == OK`.
        texts: Vec<WireText>,
    },
    /// `correspondents_response` (207).
    Correspondents {
        /// Raw status code.
        status: u32,
        /// The caller's correspondents; only meaningful when
        /// `status == OK`.
        usernames: Vec<Vec<u8>>,
    },
    /// `delete_response` (208).
    Delete {
        /// Raw status code.
        status: u32,
    },
    /// `wrong_version` (301).
    WrongVersion {
        /// The protocol version the server expects.
        correct_version: u16,
    },
    /// `invalid_type` (302).
    InvalidType,
    /// `invalid_body` (303).
    InvalidBody,
}

impl Response {
    /// Returns the numeric message type for this response.
    pub fn msg_type(&self) -> u16 {
        match self {
            Self::Registration { .. } => msg_type::REGISTRATION_RESPONSE,
            Self::Login { .. } => msg_type::LOGIN_RESPONSE,
            Self::Logout { .. } => msg_type::LOGOUT_RESPONSE,
            Self::Accounts { .. } => msg_type::ACCOUNTS_RESPONSE,
            Self::SendTxt { .. } => msg_type::SEND_TXT_RESPONSE,
            Self::RecvTxt { .. } => msg_type::RECV_TXT_RESPONSE,
            Self::Correspondents { .. } => msg_type::CORRESPONDENTS_RESPONSE,
            Self::Delete { .. } => msg_type::DELETE_RESPONSE,
            Self::WrongVersion { .. } => msg_type::WRONG_VERSION,
            Self::InvalidType => msg_type::INVALID_TYPE,
            Self::InvalidBody => msg_type::INVALID_BODY,
        }
    }

    /// The raw status code, for the typed response variants that carry
    /// one. Protocol errors (wrong version/type/body) carry no status
    /// code and return `None`.
    pub fn status(&self) -> Option<u32> {
        match self {
            Self::Registration { status }
            | Self::Login { status }
            | Self::Logout { status }
            | Self::Accounts { status, .. }
            | Self::SendTxt { status }
            | Self::RecvTxt { status, .. }
            | Self::Correspondents { status, .. }
            | Self::Delete { status } => Some(*status),
            Self::WrongVersion { .. } | Self::InvalidType | Self::InvalidBody => None,
        }
    }

    /// Encodes the body (not including the header) for this response.
    pub fn encode_body(&self) -> Vec<u8> {
        match self {
            Self::Registration { status }
            | Self::Login { status }
            | Self::Logout { status }
            | Self::SendTxt { status }
            | Self::Delete { status } => {
                let mut buf = vec![0u8; 4];
                endian::write_u32(&mut buf, *status);
                buf
            }
            Self::Accounts { status, usernames } | Self::Correspondents { status, usernames } => {
                encode_status_and_names(*status, usernames)
            }
            Self::RecvTxt { status, texts } => encode_recv_txt(*status, texts),
            Self::WrongVersion { correct_version } => {
                let mut buf = vec![0u8; 2];
                endian::write_u16(&mut buf, *correct_version);
                buf
            }
            Self::InvalidType | Self::InvalidBody => Vec::new(),
        }
    }

    /// Encodes this response into a full frame (header followed by body).
    pub fn encode_frame(&self) -> Vec<u8> {
        let body = self.encode_body();
        let header = Header::new(self.msg_type(), body.len() as u32);
        let mut frame = Vec::with_capacity(crate::wire::header::HEADER_LEN + body.len());
        frame.extend_from_slice(&header.encode());
        frame.extend_from_slice(&body);
        frame
    }

    /// Decodes a response body given the message type already read from
    /// the header.
    pub fn decode(msg_type: u16, body: &[u8]) -> Result<Self, Error> {
        Ok(match msg_type {
            msg_type::REGISTRATION_RESPONSE => Self::Registration {
                status: decode_status_only(body)?,
            },
            msg_type::LOGIN_RESPONSE => Self::Login {
                status: decode_status_only(body)?,
            },
            msg_type::LOGOUT_RESPONSE => Self::Logout {
                status: decode_status_only(body)?,
            },
            msg_type::SEND_TXT_RESPONSE => Self::SendTxt {
                status: decode_status_only(body)?,
            },
            msg_type::DELETE_RESPONSE => Self::Delete {
                status: decode_status_only(body)?,
            },
            msg_type::ACCOUNTS_RESPONSE => {
                let (status, usernames) = decode_status_and_names(body)?;
                Self::Accounts { status, usernames }
            }
            msg_type::CORRESPONDENTS_RESPONSE => {
                let (status, usernames) = decode_status_and_names(body)?;
                Self::Correspondents { status, usernames }
            }
            msg_type::RECV_TXT_RESPONSE => {
                let (status, texts) = decode_recv_txt(body)?;
                Self::RecvTxt { status, texts }
            }
            msg_type::WRONG_VERSION => {
                if body.len() != 2 {
                    return Err(Error::BodyMalformed);
                }
                Self::WrongVersion {
                    correct_version: endian::read_u16(&body[0..2]),
                }
            }
            msg_type::INVALID_TYPE => {
                require_empty(body)?;
                Self::InvalidType
            }
            msg_type::INVALID_BODY => {
                require_empty(body)?;
                Self::InvalidBody
            }
            other => return Err(Error::UnknownMessageType(other)),
        })
    }
}

fn require_empty(body: &[u8]) -> Result<(), Error> {
    if !body.is_empty() {
        return Err(Error::BodyMalformed);
    }
    Ok(())
}

fn decode_status_only(body: &[u8]) -> Result<u32, Error> {
    if body.len() != 4 {
        return Err(Error::BodyMalformed);
    }
    Ok(endian::read_u32(&body[0..4]))
}

fn encode_one_string(s: &[u8]) -> Vec<u8> {
    let mut buf = vec![0u8; 4 + s.len()];
    endian::write_u32(&mut buf[0..4], s.len() as u32);
    buf[4..].copy_from_slice(s);
    buf
}

fn encode_two_strings(a: &[u8], b: &[u8]) -> Vec<u8> {
    let mut buf = vec![0u8; 8 + a.len() + b.len()];
    endian::write_u32(&mut buf[0..4], a.len() as u32);
    endian::write_u32(&mut buf[4..8], b.len() as u32);
    buf[8..8 + a.len()].copy_from_slice(a);
    buf[8 + a.len()..].copy_from_slice(b);
    buf
}

/// A cursor over a request/response body that rejects any length prefix
/// inconsistent with the remaining bytes, and requires the whole body to
/// be consumed by the time decoding finishes.
struct BodyReader<'a> {
    body: &'a [u8],
    pos: usize,
}

impl<'a> BodyReader<'a> {
    fn new(body: &'a [u8]) -> Self {
        Self { body, pos: 0 }
    }

    fn read_u32(&mut self) -> Result<u32, Error> {
        if self.body.len() - self.pos < 4 {
            return Err(Error::BodyMalformed);
        }
        let v = endian::read_u32(&self.body[self.pos..self.pos + 4]);
        self.pos += 4;
        Ok(v)
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], Error> {
        if self.body.len() - self.pos < len {
            return Err(Error::BodyMalformed);
        }
        let v = &self.body[self.pos..self.pos + len];
        self.pos += len;
        Ok(v)
    }

    fn read_u32_prefixed_bytes(&mut self) -> Result<&'a [u8], Error> {
        let len = self.read_u32()? as usize;
        self.read_bytes(len)
    }

    fn remaining(&self) -> usize {
        self.body.len() - self.pos
    }

    /// Reads a `u32` count and rejects it outright if it couldn't possibly
    /// be backed by the bytes left in the body, given each entry needs at
    /// least `min_entry_len` bytes. Guards against pre-sizing a `Vec` off
    /// an untrusted, unbounded length prefix.
    fn read_bounded_count(&mut self, min_entry_len: usize) -> Result<usize, Error> {
        let count = self.read_u32()? as usize;
        if count > self.remaining() / min_entry_len {
            return Err(Error::BodyMalformed);
        }
        Ok(count)
    }

    fn finish(self) -> Result<(), Error> {
        if self.pos != self.body.len() {
            return Err(Error::BodyMalformed);
        }
        Ok(())
    }
}

fn decode_one_string(body: &[u8]) -> Result<Vec<u8>, Error> {
    let mut r = BodyReader::new(body);
    let s = r.read_u32_prefixed_bytes()?.to_vec();
    r.finish()?;
    Ok(s)
}

fn decode_two_strings(body: &[u8]) -> Result<(Vec<u8>, Vec<u8>), Error> {
    let mut r = BodyReader::new(body);
    let ulen = r.read_u32()? as usize;
    let plen = r.read_u32()? as usize;
    let u = r.read_bytes(ulen)?.to_vec();
    let p = r.read_bytes(plen)?.to_vec();
    r.finish()?;
    Ok((u, p))
}

fn encode_status_and_names(status: u32, names: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = vec![0u8; 4];
    endian::write_u32(&mut buf, status);

    if status != crate::wire::status::OK {
        return buf;
    }

    let mut header = vec![0u8; 4 + 4 * names.len()];
    endian::write_u32(&mut header[0..4], names.len() as u32);
    for (i, n) in names.iter().enumerate() {
        endian::write_u32(&mut header[4 + 4 * i..8 + 4 * i], n.len() as u32);
    }
    buf.extend_from_slice(&header);
    for n in names {
        buf.extend_from_slice(n);
    }
    buf
}

fn decode_status_and_names(body: &[u8]) -> Result<(u32, Vec<Vec<u8>>), Error> {
    let mut r = BodyReader::new(body);
    let status = r.read_u32()?;

    if status != crate::wire::status::OK {
        r.finish()?;
        return Ok((status, Vec::new()));
    }

    let count = r.read_bounded_count(4)?;
    let mut lens = Vec::with_capacity(count);
    for _ in 0..count {
        lens.push(r.read_u32()? as usize);
    }
    let mut names = Vec::with_capacity(count);
    for len in lens {
        names.push(r.read_bytes(len)?.to_vec());
    }
    r.finish()?;
    Ok((status, names))
}

fn encode_recv_txt(status: u32, texts: &[WireText]) -> Vec<u8> {
    let mut buf = vec![0u8; 4];
    endian::write_u32(&mut buf, status);

    if status != crate::wire::status::OK {
        return buf;
    }

    let count = texts.len();
    let mut header = vec![0u8; 4 + count + 4 * count];
    endian::write_u32(&mut header[0..4], count as u32);
    for (i, t) in texts.iter().enumerate() {
        header[4 + i] = t.tag.as_raw();
    }
    let lens_start = 4 + count;
    for (i, t) in texts.iter().enumerate() {
        endian::write_u32(
            &mut header[lens_start + 4 * i..lens_start + 4 * i + 4],
            t.content.len() as u32,
        );
    }
    buf.extend_from_slice(&header);
    for t in texts {
        buf.extend_from_slice(&t.content);
    }
    buf
}

fn decode_recv_txt(body: &[u8]) -> Result<(u32, Vec<WireText>), Error> {
    let mut r = BodyReader::new(body);
    let status = r.read_u32()?;

    if status != crate::wire::status::OK {
        r.finish()?;
        return Ok((status, Vec::new()));
    }

    let count = r.read_bounded_count(5)?;
    let mut tags = Vec::with_capacity(count);
    for _ in 0..count {
        tags.push(Tag::from_raw(r.read_bytes(1)?[0])?);
    }
    let mut lens = Vec::with_capacity(count);
    for _ in 0..count {
        lens.push(r.read_u32()? as usize);
    }
    let mut texts = Vec::with_capacity(count);
    for (tag, len) in tags.into_iter().zip(lens) {
        texts.push(WireText {
            tag,
            content: r.read_bytes(len)?.to_vec(),
        });
    }
    r.finish()?;
    Ok((status, texts))
}
