//! Port traits — the boundary between the command pipeline and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! The credential source and the event destination are adapters.  The
//! [`AppService`](super::service::AppService) consumes them through these
//! traits, so the pipeline can be driven entirely from tests.
//!
//! ## Security notes
//!
//! - **CredentialStore** implementations MUST return the first record whose
//!   username matches exactly; later records for the same user are ignored.
//! - Password comparison SHOULD use [`passwords_match`](crate::protocol::auth::passwords_match).

use core::fmt;
use std::sync::Arc;

use crate::error::CommandError;
use crate::protocol::auth::PrivilegeLevel;

// ───────────────────────────────────────────────────────────────
// Credential store (driven adapter: credential source → domain)
// ───────────────────────────────────────────────────────────────

/// Resolves a username/password pair to a privilege level.
pub trait CredentialStore {
    fn authenticate(&self, username: &str, password: &str) -> Result<PrivilegeLevel, AuthError>;
}

impl<T: CredentialStore + ?Sized> CredentialStore for &T {
    fn authenticate(&self, username: &str, password: &str) -> Result<PrivilegeLevel, AuthError> {
        (**self).authenticate(username, password)
    }
}

impl<T: CredentialStore + ?Sized> CredentialStore for Arc<T> {
    fn authenticate(&self, username: &str, password: &str) -> Result<PrivilegeLevel, AuthError> {
        (**self).authenticate(username, password)
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

impl<T: EventSink + ?Sized> EventSink for &mut T {
    fn emit(&mut self, event: &super::events::AppEvent) {
        (**self).emit(event);
    }
}

/// Sink that drops every event.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &super::events::AppEvent) {}
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`CredentialStore::authenticate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No record carries this username.
    UnknownUser,
    /// The first matching record has a different password.
    BadPassword,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownUser => write!(f, "unknown user"),
            Self::BadPassword => write!(f, "bad password"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<AuthError> for CommandError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::UnknownUser => Self::UnknownUser,
            AuthError::BadPassword => Self::BadPassword,
        }
    }
}
