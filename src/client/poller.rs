//! The background poller used by the interactive client (spec §4.7).
//!
//! Every two seconds, fetches the active chat via `recv_txt` and, if the
//! text count changed since last poll, replaces the cached copy. A
//! `Condvar` lets the UI wake the poller early (e.g. for shutdown)
//! instead of waiting out the full interval.

use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use log::warn;

use super::{ChatEntry, Client};

const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// State shared between the poller thread and the UI thread reading it.
#[derive(Debug, Default)]
pub struct PollerState {
    /// The most recently fetched view of the active chat.
    pub cached_chat: Vec<ChatEntry>,
    /// Text the UI is composing but hasn't sent yet.
    ///
    /// Exposed here, rather than owned by the UI alone, so the poller's
    /// redraw (guarded by the same mutex) never clobbers an in-progress
    /// line the user is typing.
    pub pending_outgoing: Vec<u8>,
    should_exit: bool,
}

/// Owns the shared state and the synchronization primitives coordinating
/// the poller thread with the UI.
pub struct Poller {
    state: Arc<Mutex<PollerState>>,
    cond: Arc<Condvar>,
}

impl std::fmt::Debug for Poller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller").finish_non_exhaustive()
    }
}

impl Poller {
    /// Spawns the polling thread, fetching `correspondent`'s chat from
    /// `client` every two seconds until [`Poller::stop`] is called.
    pub fn spawn(mut client: Client, correspondent: Vec<u8>) -> (Self, std::thread::JoinHandle<()>) {
        let state = Arc::new(Mutex::new(PollerState::default()));
        let cond = Arc::new(Condvar::new());

        let thread_state = Arc::clone(&state);
        let thread_cond = Arc::clone(&cond);

        let handle = std::thread::spawn(move || {
            let mut last_count = 0usize;
            loop {
                let guard = thread_state.lock().unwrap_or_else(|e| e.into_inner());
                let (guard, _timed_out) = thread_cond
                    .wait_timeout_while(guard, POLL_INTERVAL, |s| !s.should_exit)
                    .unwrap_or_else(|e| e.into_inner());
                if guard.should_exit {
                    return;
                }
                drop(guard);

                match client.recv_txt(&correspondent) {
                    Ok((status, chat)) if status == crate::wire::status::OK => {
                        if chat.len() != last_count {
                            last_count = chat.len();
                            let mut guard = thread_state.lock().unwrap_or_else(|e| e.into_inner());
                            guard.cached_chat = chat;
                        }
                    }
                    Ok((status, _)) => {
                        warn!("poller recv_txt for {correspondent:?} returned status {status}");
                    }
                    Err(e) => {
                        warn!("poller recv_txt failed: {e}");
                    }
                }
            }
        });

        (Self { state, cond }, handle)
    }

    /// Returns a clone of the shared state handle, for the UI thread to
    /// read `cached_chat` and read/write `pending_outgoing` under the
    /// same lock the poller redraws under.
    pub fn state(&self) -> Arc<Mutex<PollerState>> {
        Arc::clone(&self.state)
    }

    /// Signals the poller thread to stop and wakes it immediately rather
    /// than waiting out the current interval.
    pub fn stop(&self) {
        let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        guard.should_exit = true;
        drop(guard);
        self.cond.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server;
    use crate::store::Store;
    use crate::client::ClientConfig;
    use std::net::{Ipv4Addr, SocketAddr};
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
    fn stop_wakes_poller_without_waiting_out_interval() {
        let addr = start_test_server();

        let mut setup = connect(addr);
        setup.register(b"alice", b"hunter2!").unwrap();
        setup.register(b"bob", b"password").unwrap();
        setup.login(b"alice", b"hunter2!").unwrap();

        let (poller, handle) = Poller::spawn(setup, b"bob".to_vec());

        let start = std::time::Instant::now();
        poller.stop();
        handle.join().unwrap();
        assert!(start.elapsed() < Duration::from_secs(2));
    }
}
