//! The synchronous request client (spec §4.6).

pub mod poller;

use std::net::{SocketAddr, TcpStream};

use crate::error::Error;
use crate::transport;
use crate::wire::{Request, Response, Tag, WireText, PROTOCOL_VERSION};

/// Resolved client configuration: the server address to connect to.
///
/// Matches spec §6: a single positional `<ip-address>` on the default
/// Chat262 port, no config file.
#[derive(Debug, Clone, Copy)]
pub struct ClientConfig {
    /// Address of the server to connect to.
    pub addr: SocketAddr,
}

impl ClientConfig {
    /// Builds a config connecting to `addr` on the default Chat262 port.
    pub fn new(addr: std::net::IpAddr) -> Self {
        Self {
            addr: SocketAddr::new(addr, crate::wire::DEFAULT_PORT),
        }
    }
}

/// One chat entry, as returned by [`Client::recv_txt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    /// Whether the reader or their correspondent sent this text.
    pub tag: Tag,
    /// The text content.
    pub content: Vec<u8>,
}

/// A single synchronous request/response exchange against the server.
///
/// A `Client` owns one [`TcpStream`] and is not shared between threads;
/// the interactive CLI and the background poller each hold their own.
#[derive(Debug)]
pub struct Client {
    stream: TcpStream,
}

impl Client {
    /// Connects to the server named by `config`.
    pub fn connect(config: &ClientConfig) -> Result<Self, Error> {
        let stream = TcpStream::connect(config.addr)?;
        stream.set_nodelay(true)?;
        Ok(Self { stream })
    }

    fn roundtrip(&mut self, request: Request, expect_type: u16) -> Result<(u16, Vec<u8>), Error> {
        transport::send_frame(&mut self.stream, &request.encode_frame())?;

        let header = transport::recv_header(&mut self.stream)?;
        if header.version != PROTOCOL_VERSION {
            return Err(Error::HeaderMismatch {
                version: header.version,
                msg_type: header.msg_type,
            });
        }
        let body = transport::recv_body(&mut self.stream, header.body_len)?;

        if header.msg_type != expect_type {
            return Err(Error::HeaderMismatch {
                version: header.version,
                msg_type: header.msg_type,
            });
        }

        Ok((header.msg_type, body))
    }

    /// Registers a new account.
    pub fn register(&mut self, username: &[u8], password: &[u8]) -> Result<u32, Error> {
        let request = Request::Registration {
            username: username.to_vec(),
            password: password.to_vec(),
        };
        let (_, body) = self.roundtrip(request, crate::wire::message::msg_type::REGISTRATION_RESPONSE)?;
        decode_status_only(crate::wire::message::msg_type::REGISTRATION_RESPONSE, &body)
    }

    /// Logs in, binding this connection's session to `username`.
    pub fn login(&mut self, username: &[u8], password: &[u8]) -> Result<u32, Error> {
        let request = Request::Login {
            username: username.to_vec(),
            password: password.to_vec(),
        };
        let (_, body) = self.roundtrip(request, crate::wire::message::msg_type::LOGIN_RESPONSE)?;
        decode_status_only(crate::wire::message::msg_type::LOGIN_RESPONSE, &body)
    }

    /// Logs out the session bound to this connection.
    pub fn logout(&mut self) -> Result<u32, Error> {
        let (_, body) = self.roundtrip(Request::Logout, crate::wire::message::msg_type::LOGOUT_RESPONSE)?;
        decode_status_only(crate::wire::message::msg_type::LOGOUT_RESPONSE, &body)
    }

    /// Looks up registered usernames matching `pattern`.
    pub fn accounts(&mut self, pattern: &[u8]) -> Result<(u32, Vec<Vec<u8>>), Error> {
        let request = Request::Accounts {
            pattern: pattern.to_vec(),
        };
        let (msg_type, body) = self.roundtrip(request, crate::wire::message::msg_type::ACCOUNTS_RESPONSE)?;
        match Response::decode(msg_type, &body)? {
            Response::Accounts { status, usernames } => Ok((status, usernames)),
            other => Err(unexpected_response(other)),
        }
    }

    /// Sends `text` to `to`.
    pub fn send_txt(&mut self, to: &[u8], text: &[u8]) -> Result<u32, Error> {
        let request = Request::SendTxt {
            to: to.to_vec(),
            text: text.to_vec(),
        };
        let (_, body) = self.roundtrip(request, crate::wire::message::msg_type::SEND_TXT_RESPONSE)?;
        decode_status_only(crate::wire::message::msg_type::SEND_TXT_RESPONSE, &body)
    }

    /// Fetches the caller's view of the chat with `from`.
    pub fn recv_txt(&mut self, from: &[u8]) -> Result<(u32, Vec<ChatEntry>), Error> {
        let request = Request::RecvTxt {
            from: from.to_vec(),
        };
        let (msg_type, body) = self.roundtrip(request, crate::wire::message::msg_type::RECV_TXT_RESPONSE)?;
        match Response::decode(msg_type, &body)? {
            Response::RecvTxt { status, texts } => Ok((
                status,
                texts
                    .into_iter()
                    .map(|WireText { tag, content }| ChatEntry { tag, content })
                    .collect(),
            )),
            other => Err(unexpected_response(other)),
        }
    }

    /// Fetches the caller's correspondents.
    pub fn correspondents(&mut self) -> Result<(u32, Vec<Vec<u8>>), Error> {
        let (msg_type, body) = self.roundtrip(
            Request::Correspondents,
            crate::wire::message::msg_type::CORRESPONDENTS_RESPONSE,
        )?;
        match Response::decode(msg_type, &body)? {
            Response::Correspondents { status, usernames } => Ok((status, usernames)),
            other => Err(unexpected_response(other)),
        }
    }

    /// Deletes the account bound to this connection's session.
    pub fn delete_account(&mut self) -> Result<u32, Error> {
        let (_, body) = self.roundtrip(Request::Delete, crate::wire::message::msg_type::DELETE_RESPONSE)?;
        decode_status_only(crate::wire::message::msg_type::DELETE_RESPONSE, &body)
    }
}

fn decode_status_only(msg_type: u16, body: &[u8]) -> Result<u32, Error> {
    Response::decode(msg_type, body)?
        .status()
        .ok_or(Error::BodyMalformed)
}

fn unexpected_response(response: Response) -> Error {
    Error::HeaderMismatch {
        version: PROTOCOL_VERSION,
        msg_type: response.msg_type(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server;
    use crate::store::Store;
    use std::net::Ipv4Addr;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn start_test_server() -> SocketAddr {
        let mut config = server::ServerConfig::new(Ipv4Addr::LOCALHOST.into());
        config.addr.set_port(0);
        let listener = server::bind(&config).unwrap();
        let addr = listener.local_addr().unwrap();
        let store = Arc::new(Store::new());
        thread::spawn(move || {
            let _ = server::serve(listener, store);
        });
        addr
    }

    fn connect(addr: SocketAddr) -> Client {
        let config = ClientConfig { addr };
        loop {
            match Client::connect(&config) {
                Ok(c) => return c,
                Err(_) => thread::sleep(Duration::from_millis(10)),
            }
        }
    }

    #[test]
    fn register_login_send_recv_round_trip() {
        let addr = start_test_server();

        let mut alice = connect(addr);
        assert_eq!(
            alice.register(b"alice", b"hunter2!").unwrap(),
            crate::wire::status::OK
        );
        assert_eq!(
            alice.login(b"alice", b"hunter2!").unwrap(),
            crate::wire::status::OK
        );

        let mut bob = connect(addr);
        assert_eq!(bob.register(b"bob", b"password").unwrap(), crate::wire::status::OK);
        assert_eq!(bob.login(b"bob", b"password").unwrap(), crate::wire::status::OK);

        assert_eq!(alice.send_txt(b"bob", b"hi").unwrap(), crate::wire::status::OK);

        let (status, texts) = bob.recv_txt(b"alice").unwrap();
        assert_eq!(status, crate::wire::status::OK);
        assert_eq!(
            texts,
            vec![ChatEntry {
                tag: Tag::Other,
                content: b"hi".to_vec()
            }]
        );
    }

    #[test]
    fn accounts_lookup_and_correspondents() {
        let addr = start_test_server();

        let mut alice = connect(addr);
        alice.register(b"alice", b"hunter2!").unwrap();
        alice.login(b"alice", b"hunter2!").unwrap();

        let mut bob = connect(addr);
        bob.register(b"bob_the_builder", b"password").unwrap();

        let (status, names) = alice.accounts(b"bob*").unwrap();
        assert_eq!(status, crate::wire::status::OK);
        assert_eq!(names, vec![b"bob_the_builder".to_vec()]);

        assert_eq!(
            alice.correspondents().unwrap(),
            (crate::wire::status::OK, Vec::new())
        );
    }

    #[test]
    fn unauthorized_surfaces_as_status_code_not_error() {
        let addr = start_test_server();
        let mut client = connect(addr);
        let (status, usernames) = client.accounts(b"*").unwrap();
        assert_eq!(status, crate::wire::status::UNAUTHORIZED);
        assert!(usernames.is_empty());
    }

    #[test]
    fn delete_account_then_cannot_login() {
        let addr = start_test_server();

        let mut alice = connect(addr);
        alice.register(b"alice", b"hunter2!").unwrap();
        alice.login(b"alice", b"hunter2!").unwrap();
        assert_eq!(alice.delete_account().unwrap(), crate::wire::status::OK);

        let mut second = connect(addr);
        assert_eq!(
            second.login(b"alice", b"hunter2!").unwrap(),
            crate::wire::status::INVALID_CREDENTIALS
        );
    }
}
