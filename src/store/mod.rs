//! The in-memory account/chat store (spec §4.4).
//!
//! Exactly one [`std::sync::Mutex`] covers `accounts`, `historical_usernames`
//! and the session bindings — the coarse grain is intentional (spec §9):
//! the workload is low-rate and a single lock keeps the cross-account
//! invariants (in particular `send_txt`'s two-sided write and
//! `delete_user`'s cascade) trivially atomic.
//!
//! Per the REDESIGN FLAG in spec §9, session identity is an explicit
//! [`SessionId`] allocated once per accepted connection and threaded
//! through every call, rather than keyed off the handling thread's
//! identity.

mod account;
mod wildcard;

pub use account::{Account, Chat, Text};

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::wire::status;

/// Username length bounds, inclusive (spec §3/§4.4.2).
pub const USERNAME_MIN_LEN: usize = 4;
pub const USERNAME_MAX_LEN: usize = 40;

/// Password length bounds, inclusive (spec §3/§4.4.2).
pub const PASSWORD_MIN_LEN: usize = 4;
pub const PASSWORD_MAX_LEN: usize = 60;

/// An explicit, per-connection session handle.
///
/// Allocated once by [`Store::new_session`] when a connection is accepted,
/// and passed to every store operation performed on that connection's
/// behalf for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

/// The outcome of a store operation that can fail.
///
/// These are *not* wire status codes: [`StoreError::status`] maps the
/// subset that correspond to a protocol-level status onto one, but
/// [`StoreError::AlreadySignedIn`] is a pure invariant violation that a
/// dispatcher resolves itself (spec §4.5's double-login policy) rather
/// than surfacing directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// Login/lookup failed: unknown username or wrong password.
    InvalidCredentials,
    /// Registration failed: the username is already registered, or was
    /// ever registered and later deleted.
    UserExists,
    /// The named user does not exist.
    UserDoesNotExist,
    /// The username fails the §4.4.2 validation rule.
    UsernameInvalid,
    /// The password fails the §4.4.2 validation rule.
    PasswordInvalid,
    /// The session isn't bound to an account, and the operation requires
    /// one.
    Unauthorized,
    /// `login` was called on a session that is already bound to an
    /// account (spec §4.4's `login` invariant). The dispatcher's
    /// double-login policy unbinds first so this is never surfaced to a
    /// client directly.
    AlreadySignedIn,
}

impl StoreError {
    /// Maps this error to its protocol-level status code, where one
    /// exists. [`StoreError::AlreadySignedIn`] has no wire representation
    /// — it's resolved by the dispatcher before a response is built.
    pub fn status(self) -> Option<u32> {
        Some(match self {
            Self::InvalidCredentials => status::INVALID_CREDENTIALS,
            Self::UserExists => status::USER_EXISTS,
            Self::UserDoesNotExist => status::USER_DOES_NOT_EXIST,
            Self::UsernameInvalid => status::USERNAME_INVALID,
            Self::PasswordInvalid => status::PASSWORD_INVALID,
            Self::Unauthorized => status::UNAUTHORIZED,
            Self::AlreadySignedIn => return None,
        })
    }
}

#[derive(Debug, Default)]
struct Inner {
    accounts: HashMap<Vec<u8>, Account>,
    historical_usernames: HashSet<Vec<u8>>,
    sessions: HashMap<SessionId, Vec<u8>>,
}

impl Inner {
    /// Unbinds `session`, returning the username it was bound to, if any.
    fn unbind(&mut self, session: SessionId) -> Option<Vec<u8>> {
        self.sessions.remove(&session)
    }

    fn caller(&self, session: SessionId) -> Option<&[u8]> {
        self.sessions.get(&session).map(Vec::as_slice)
    }
}

/// The shared, thread-safe account/chat store.
#[derive(Debug)]
pub struct Store {
    inner: Mutex<Inner>,
    next_session: AtomicU64,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Constructs an empty store.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            next_session: AtomicU64::new(0),
        }
    }

    /// Allocates a fresh [`SessionId`], unique for the lifetime of this
    /// store. Called once per accepted connection.
    pub fn new_session(&self) -> SessionId {
        SessionId(self.next_session.fetch_add(1, Ordering::Relaxed))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Registers a new account.
    ///
    /// Validates the username and password per spec §4.4.2 (username
    /// checked strictly before password), then requires the username to
    /// never have been used (including by a deleted account).
    pub fn register(&self, username: &[u8], password: &[u8]) -> Result<(), StoreError> {
        validate_username(username)?;
        validate_password(password)?;

        let mut inner = self.lock();
        if inner.historical_usernames.contains(username) {
            return Err(StoreError::UserExists);
        }

        inner.historical_usernames.insert(username.to_vec());
        inner
            .accounts
            .insert(username.to_vec(), Account::new(password.to_vec()));
        Ok(())
    }

    /// Logs `session` into `username`, if the credentials match.
    ///
    /// Fails with [`StoreError::AlreadySignedIn`] if `session` is already
    /// bound — callers implementing the double-login policy (spec §4.5)
    /// should `logout` first.
    pub fn login(
        &self,
        session: SessionId,
        username: &[u8],
        password: &[u8],
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner.sessions.contains_key(&session) {
            return Err(StoreError::AlreadySignedIn);
        }

        match inner.accounts.get(username) {
            Some(acc) if acc.password == password => {
                inner.sessions.insert(session, username.to_vec());
                Ok(())
            }
            _ => Err(StoreError::InvalidCredentials),
        }
    }

    /// Logs `session` out. Fails if it wasn't bound.
    pub fn logout(&self, session: SessionId) -> Result<(), StoreError> {
        let mut inner = self.lock();
        match inner.unbind(session) {
            Some(_) => Ok(()),
            None => Err(StoreError::Unauthorized),
        }
    }

    /// Unbinds `session` unconditionally, without error if it wasn't
    /// bound. Used by the dispatcher when a connection terminates, so the
    /// session never outlives its connection (spec §3, Session).
    pub fn evict_session(&self, session: SessionId) {
        let mut inner = self.lock();
        inner.unbind(session);
    }

    /// Returns whether `session` is currently bound to an account.
    pub fn is_logged_in(&self, session: SessionId) -> bool {
        self.lock().sessions.contains_key(&session)
    }

    /// Returns every registered username matching `pattern` under the
    /// wildcard rule (spec §4.4.1). Iteration order is the store's
    /// internal order and carries no promise (spec §9).
    pub fn get_usernames(&self, pattern: &[u8]) -> Vec<Vec<u8>> {
        self.lock()
            .accounts
            .keys()
            .filter(|u| wildcard::matches(pattern, u))
            .cloned()
            .collect()
    }

    /// Sends `text` from `session`'s account to `to`.
    ///
    /// Appends `(You, text)` to the sender's view of the chat and
    /// `(Other, text)` to the recipient's, creating the chat entries if
    /// absent. When `to` names the sender, both copies land in the same
    /// chat, `You` before `Other`.
    pub fn send_txt(&self, session: SessionId, to: &[u8], text: &[u8]) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let sender = inner
            .caller(session)
            .ok_or(StoreError::Unauthorized)?
            .to_vec();

        if !inner.accounts.contains_key(to) {
            return Err(StoreError::UserDoesNotExist);
        }

        inner
            .accounts
            .get_mut(&sender)
            .expect("caller's own account must exist while its session is bound")
            .chats
            .entry(to.to_vec())
            .or_default()
            .push(Text {
                tag: crate::wire::Tag::You,
                content: text.to_vec(),
            });

        inner
            .accounts
            .get_mut(to)
            .expect("existence checked above")
            .chats
            .entry(sender)
            .or_default()
            .push(Text {
                tag: crate::wire::Tag::Other,
                content: text.to_vec(),
            });

        Ok(())
    }

    /// Returns `session`'s view of its chat with `from`, empty if no such
    /// chat exists yet. Fails if `from` was never registered.
    pub fn recv_txt(&self, session: SessionId, from: &[u8]) -> Result<Chat, StoreError> {
        let inner = self.lock();
        let caller = inner.caller(session).ok_or(StoreError::Unauthorized)?;

        if !inner.accounts.contains_key(from) {
            return Err(StoreError::UserDoesNotExist);
        }

        Ok(inner
            .accounts
            .get(caller)
            .and_then(|acc| acc.chats.get(from))
            .cloned()
            .unwrap_or_default())
    }

    /// Returns the usernames of `session`'s correspondents.
    pub fn get_correspondents(&self, session: SessionId) -> Result<Vec<Vec<u8>>, StoreError> {
        let inner = self.lock();
        let caller = inner.caller(session).ok_or(StoreError::Unauthorized)?;
        Ok(inner
            .accounts
            .get(caller)
            .map(|acc| acc.chats.keys().cloned().collect())
            .unwrap_or_default())
    }

    /// Deletes `session`'s account.
    ///
    /// For every correspondent, removes the caller from that
    /// correspondent's chats; then removes the caller's own account and
    /// unbinds the session. The username remains reserved in
    /// `historical_usernames` forever.
    pub fn delete_user(&self, session: SessionId) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let username = inner.caller(session).ok_or(StoreError::Unauthorized)?.to_vec();

        let correspondents: Vec<Vec<u8>> = inner
            .accounts
            .get(&username)
            .map(|acc| acc.chats.keys().cloned().collect())
            .unwrap_or_default();

        for correspondent in correspondents {
            if let Some(acc) = inner.accounts.get_mut(&correspondent) {
                acc.chats.remove(&username);
            }
        }

        inner.accounts.remove(&username);
        inner.unbind(session);
        Ok(())
    }

    /// Returns whether `username` has ever been registered (including if
    /// later deleted). Exposed for tests asserting spec §8's
    /// `historical_usernames ⊇ accounts.keys` invariant.
    #[cfg(test)]
    pub(crate) fn is_historical(&self, username: &[u8]) -> bool {
        self.lock().historical_usernames.contains(username)
    }

    /// Returns whether `username` currently has an active account.
    #[cfg(test)]
    pub(crate) fn is_registered(&self, username: &[u8]) -> bool {
        self.lock().accounts.contains_key(username)
    }
}

fn validate_username(username: &[u8]) -> Result<(), StoreError> {
    let len_ok = (USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&username.len());
    let chars_ok = !username.contains(&b'*') && !username.contains(&b' ');
    if len_ok && chars_ok {
        Ok(())
    } else {
        Err(StoreError::UsernameInvalid)
    }
}

fn validate_password(password: &[u8]) -> Result<(), StoreError> {
    if (PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&password.len()) {
        Ok(())
    } else {
        Err(StoreError::PasswordInvalid)
    }
}
