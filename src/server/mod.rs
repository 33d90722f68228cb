//! The listener and connection accept loop (spec §4.5, §6).

mod dispatcher;

use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::thread;

use log::{info, warn};

use crate::store::Store;

/// Backlog handed to `listen(2)` for the server socket.
///
/// Spec §6 only requires "at least 1"; this is an explicit, generous
/// value rather than relying on the platform default.
const LISTEN_BACKLOG: i32 = 128;

/// Resolved server configuration.
///
/// Constructed directly by tests, or by [`crate::server`]'s binary
/// collaborator from a single positional `<ip-address>` CLI argument
/// (spec §6) — there is no config file.
#[derive(Debug, Clone, Copy)]
pub struct ServerConfig {
    /// Address to bind the listening socket to.
    pub addr: SocketAddr,
}

impl ServerConfig {
    /// Builds a config binding to `addr` on the default Chat262 port.
    pub fn new(addr: std::net::IpAddr) -> Self {
        Self {
            addr: SocketAddr::new(addr, crate::wire::DEFAULT_PORT),
        }
    }
}

/// Binds a listening socket at `config.addr` with `SO_REUSEADDR` set and
/// an explicit backlog, handing it back as a standard
/// [`std::net::TcpListener`].
///
/// `std::net::TcpListener::bind` does not expose a way to set
/// `SO_REUSEADDR` before calling `listen(2)` on all platforms, so the
/// socket is built and configured through `socket2` first.
pub fn bind(config: &ServerConfig) -> std::io::Result<TcpListener> {
    use socket2::{Domain, Socket, Type};

    let domain = if config.addr.is_ipv6() {
        Domain::IPV6
    } else {
        Domain::IPV4
    };
    let socket = Socket::new(domain, Type::STREAM, None)?;
    socket.set_reuse_address(true)?;
    socket.bind(&config.addr.into())?;
    socket.listen(LISTEN_BACKLOG)?;
    Ok(socket.into())
}

/// Accepts connections on `listener` forever, spawning one detached
/// thread per connection to run the dispatcher loop against `store`.
///
/// Returns only if `accept` itself fails unrecoverably; a single
/// connection's I/O errors are handled and logged inside its own thread
/// and never propagate here.
pub fn serve(listener: TcpListener, store: Arc<Store>) -> std::io::Result<()> {
    info!("listening on {}", listener.local_addr()?);

    loop {
        let (stream, peer) = match listener.accept() {
            Ok(pair) => pair,
            Err(e) => {
                warn!("accept failed: {e}");
                continue;
            }
        };

        let store = Arc::clone(&store);
        let session = store.new_session();

        if let Err(e) = stream.set_nodelay(true) {
            warn!("failed to set TCP_NODELAY for {peer}: {e}");
        }

        thread::spawn(move || {
            info!("connection accepted from {peer}");
            dispatcher::run_tcp(stream, &store, session);
            info!("connection closed from {peer}");
        });
    }
}

/// Convenience entry point: binds `config` and serves forever.
pub fn run(config: &ServerConfig) -> std::io::Result<()> {
    let listener = bind(config)?;
    let store = Arc::new(Store::new());
    serve(listener, store)
}
