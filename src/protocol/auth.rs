//! Per-line authentication and authorization.
//!
//! There is no login state: every line carries `auth <user> <password>`
//! and is checked against the [`CredentialStore`] on its own.  Only after
//! authentication succeeds does [`authorize`] consult the static policy:
//!
//! | Command       | Minimum privilege |
//! |---------------|-------------------|
//! | `nop`         | 0                 |
//! | `exit`        | 0                 |
//! | `set`         | 15                |
//!
//! Password comparison goes through HMAC-SHA256 tags and the
//! constant-time `hmac_sha256::HMAC::verify`, so response timing does not
//! reveal how much of a guess was right.

use core::fmt;

use log::warn;

use crate::app::commands::CommandKind;
use crate::app::ports::{AuthError, CredentialStore};
use crate::error::CommandError;

/// Key for the password-comparison MAC.  Not a secret.
const COMPARE_KEY: &[u8] = b"breakerd/credential-compare/v1";

/// Privilege granted to an authenticated identity.
///
/// Credential files use 0–15; any larger byte is representable and
/// treated as at least administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrivilegeLevel(u8);

impl PrivilegeLevel {
    pub const GUEST: Self = Self(0);
    /// Level required for register writes.
    pub const ADMIN: Self = Self(15);

    pub const fn new(level: u8) -> Self {
        Self(level)
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for PrivilegeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Minimum privilege needed to run `kind`.
pub const fn required_level(kind: CommandKind) -> PrivilegeLevel {
    match kind {
        CommandKind::SetVariable => PrivilegeLevel::ADMIN,
        CommandKind::Nop | CommandKind::Exit => PrivilegeLevel::GUEST,
    }
}

/// Validate a claimed identity against the store.
pub fn authenticate<C>(
    store: &C,
    username: &str,
    password: &str,
) -> Result<PrivilegeLevel, AuthError>
where
    C: CredentialStore + ?Sized,
{
    let result = store.authenticate(username, password);
    if let Err(e) = result {
        warn!("auth: {} for user '{}'", e, username);
    }
    result
}

/// Decide whether `level` may execute `kind`.
pub fn authorize(level: PrivilegeLevel, kind: CommandKind) -> Result<(), CommandError> {
    if level >= required_level(kind) {
        Ok(())
    } else {
        warn!("authz: level {} may not run {:?}", level, kind);
        Err(CommandError::AuthorizationRequired)
    }
}

/// Constant-time password equality.
pub fn passwords_match(stored: &str, supplied: &str) -> bool {
    let expected = hmac_sha256::HMAC::mac(stored.as_bytes(), COMPARE_KEY);
    hmac_sha256::HMAC::verify(supplied.as_bytes(), COMPARE_KEY, &expected)
}
