//! The per-connection state machine (spec §4.5).
//!
//! `Reading-Header → Reading-Body → Dispatching → Reading-Header`, with
//! terminal transitions to `Closing` on I/O error, EOF, a version
//! mismatch, or a malformed body.

use std::io::{Read, Write};
use std::net::TcpStream;

use log::{debug, warn};

use crate::error::Error;
use crate::store::Store;
use crate::transport;
use crate::wire::header::{Header, PROTOCOL_VERSION};
use crate::wire::message::{Request, Response};
use crate::wire::status;

/// Runs the dispatch loop for one accepted connection until it closes.
///
/// `session` is the explicit per-connection handle (spec §9's REDESIGN
/// FLAG): it is allocated once by the caller and lives for exactly as
/// long as this function runs.
pub fn run<S: Read + Write>(mut stream: S, store: &Store, session: crate::store::SessionId) {
    loop {
        let header = match transport::recv_header(&mut stream) {
            Ok(h) => h,
            Err(Error::ConnectionClosed) => break,
            Err(e) => {
                warn!("recv_header failed: {e}");
                break;
            }
        };

        if header.version != PROTOCOL_VERSION {
            let resp = Response::WrongVersion {
                correct_version: PROTOCOL_VERSION,
            };
            let _ = transport::send_frame(&mut stream, &resp.encode_frame());
            break;
        }

        let body = match transport::recv_body(&mut stream, header.body_len) {
            Ok(b) => b,
            Err(e) => {
                warn!("recv_body failed: {e}");
                break;
            }
        };

        match dispatch_one(&mut stream, store, session, &header, &body) {
            Ok(ShouldContinue::Continue) => continue,
            Ok(ShouldContinue::Close) => break,
            Err(e) => {
                warn!("send failed, closing connection: {e}");
                break;
            }
        }
    }

    store.evict_session(session);
}

enum ShouldContinue {
    Continue,
    Close,
}

fn dispatch_one<S: Write>(
    stream: &mut S,
    store: &Store,
    session: crate::store::SessionId,
    header: &Header,
    body: &[u8],
) -> Result<ShouldContinue, Error> {
    let request = match Request::decode(header.msg_type, body) {
        Ok(r) => r,
        Err(Error::UnknownMessageType(t)) => {
            debug!("unknown message type {t}, continuing");
            transport::send_frame(stream, &Response::InvalidType.encode_frame())?;
            return Ok(ShouldContinue::Continue);
        }
        Err(_) => {
            transport::send_frame(stream, &Response::InvalidBody.encode_frame())?;
            return Ok(ShouldContinue::Close);
        }
    };

    let response = handle(store, session, request);
    transport::send_frame(stream, &response.encode_frame())?;
    Ok(ShouldContinue::Continue)
}

fn handle(store: &Store, session: crate::store::SessionId, request: Request) -> Response {
    match request {
        Request::Registration { username, password } => Response::Registration {
            status: match store.register(&username, &password) {
                Ok(()) => status::OK,
                Err(e) => e.status().unwrap_or(status::UNAUTHORIZED),
            },
        },

        Request::Login { username, password } => {
            // Double-login policy (§4.5): unbind first, then attempt the
            // new login. Failure leaves the caller unbound.
            if store.is_logged_in(session) {
                let _ = store.logout(session);
            }
            Response::Login {
                status: match store.login(session, &username, &password) {
                    Ok(()) => status::OK,
                    Err(e) => e.status().unwrap_or(status::INVALID_CREDENTIALS),
                },
            }
        }

        Request::Logout => Response::Logout {
            status: match store.logout(session) {
                Ok(()) => status::OK,
                Err(e) => e.status().unwrap_or(status::UNAUTHORIZED),
            },
        },

        Request::Accounts { pattern } => {
            if !store.is_logged_in(session) {
                return Response::Accounts {
                    status: status::UNAUTHORIZED,
                    usernames: Vec::new(),
                };
            }
            Response::Accounts {
                status: status::OK,
                usernames: store.get_usernames(&pattern),
            }
        }

        Request::SendTxt { to, text } => Response::SendTxt {
            status: match store.send_txt(session, &to, &text) {
                Ok(()) => status::OK,
                Err(e) => e.status().unwrap_or(status::UNAUTHORIZED),
            },
        },

        Request::RecvTxt { from } => match store.recv_txt(session, &from) {
            Ok(texts) => Response::RecvTxt {
                status: status::OK,
                texts: texts
                    .into_iter()
                    .map(|t| crate::wire::WireText {
                        tag: t.tag,
                        content: t.content,
                    })
                    .collect(),
            },
            Err(e) => Response::RecvTxt {
                status: e.status().unwrap_or(status::UNAUTHORIZED),
                texts: Vec::new(),
            },
        },

        Request::Correspondents => match store.get_correspondents(session) {
            Ok(usernames) => Response::Correspondents {
                status: status::OK,
                usernames,
            },
            Err(e) => Response::Correspondents {
                status: e.status().unwrap_or(status::UNAUTHORIZED),
                usernames: Vec::new(),
            },
        },

        Request::Delete => Response::Delete {
            status: match store.delete_user(session) {
                Ok(()) => status::OK,
                Err(e) => e.status().unwrap_or(status::UNAUTHORIZED),
            },
        },
    }
}

/// Convenience wrapper for the common case of running the dispatcher
/// directly over a `TcpStream`.
pub fn run_tcp(stream: TcpStream, store: &Store, session: crate::store::SessionId) {
    run(stream, store, session);
}
