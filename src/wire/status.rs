//! Protocol-level status codes (§4.2).
//!
//! These travel as a `u32` at the front of every response body. A
//! deserializer must never assume a received code is one of the known
//! values below — the raw integer is always what callers see; this module
//! only adds a convenience mapping on top for callers that want to match
//! on the known set.

/// The request succeeded.
pub const OK: u32 = 0;
/// Login failed: unknown username or wrong password.
pub const INVALID_CREDENTIALS: u32 = 1;
/// Registration failed: the username is already (or was ever) registered.
pub const USER_EXISTS: u32 = 2;
/// The named user does not exist.
pub const USER_DOES_NOT_EXIST: u32 = 3;
/// The requested username fails the length/character constraints.
pub const USERNAME_INVALID: u32 = 4;
/// The requested password fails the length constraint.
pub const PASSWORD_INVALID: u32 = 5;
/// The caller's session isn't logged in (or the action otherwise isn't
/// permitted for it).
pub const UNAUTHORIZED: u32 = 6;

/// A typed view of the known status codes, for callers that want to
/// `match` rather than compare against the raw constants.
///
/// Constructing one never fails outright: [`StatusCode::from_raw`] returns
/// `None` for unrecognised codes rather than erroring, so the raw `u32`
/// remains the source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// See [`OK`].
    Ok,
    /// See [`INVALID_CREDENTIALS`].
    InvalidCredentials,
    /// See [`USER_EXISTS`].
    UserExists,
    /// See [`USER_DOES_NOT_EXIST`].
    UserDoesNotExist,
    /// See [`USERNAME_INVALID`].
    UsernameInvalid,
    /// See [`PASSWORD_INVALID`].
    PasswordInvalid,
    /// See [`UNAUTHORIZED`].
    Unauthorized,
}

impl StatusCode {
    /// Maps a raw wire status code to its typed equivalent, if known.
    pub fn from_raw(v: u32) -> Option<Self> {
        Some(match v {
            OK => Self::Ok,
            INVALID_CREDENTIALS => Self::InvalidCredentials,
            USER_EXISTS => Self::UserExists,
            USER_DOES_NOT_EXIST => Self::UserDoesNotExist,
            USERNAME_INVALID => Self::UsernameInvalid,
            PASSWORD_INVALID => Self::PasswordInvalid,
            UNAUTHORIZED => Self::Unauthorized,
            _ => return None,
        })
    }

    /// Returns the raw wire value for this status code.
    pub fn as_raw(self) -> u32 {
        match self {
            Self::Ok => OK,
            Self::InvalidCredentials => INVALID_CREDENTIALS,
            Self::UserExists => USER_EXISTS,
            Self::UserDoesNotExist => USER_DOES_NOT_EXIST,
            Self::UsernameInvalid => USERNAME_INVALID,
            Self::PasswordInvalid => PASSWORD_INVALID,
            Self::Unauthorized => UNAUTHORIZED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_round_trip() {
        for code in [
            OK,
            INVALID_CREDENTIALS,
            USER_EXISTS,
            USER_DOES_NOT_EXIST,
            USERNAME_INVALID,
            PASSWORD_INVALID,
            UNAUTHORIZED,
        ] {
            let typed = StatusCode::from_raw(code).expect("known code");
            assert_eq!(typed.as_raw(), code);
        }
    }

    #[test]
    fn unknown_code_is_none_not_error() {
        assert_eq!(StatusCode::from_raw(999), None);
    }
}
