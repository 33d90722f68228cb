//! The Chat262 wire protocol: endianness helpers, the frame header, and the
//! request/response codec (spec §4.2).

pub(crate) mod endian;
pub mod header;
pub mod message;
pub mod status;

pub use header::{Header, DEFAULT_PORT, HEADER_LEN, PROTOCOL_VERSION};
pub use message::{msg_type, Request, Response, Tag, WireText};
