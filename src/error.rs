//! Per-line command errors.
//!
//! Every rejection the pipeline can produce is one variant of
//! [`CommandError`].  All variants are `Copy` and recoverable: the
//! session replies with the variant's wire text and keeps reading.
//! `Display` renders exactly the reply line (without the newline).

use core::fmt;

/// Why a command line was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandError {
    /// Fewer than four tokens, or an over-long line.
    MalformedInput,
    /// The line did not start with the `auth` preamble.
    AuthenticationRequired,
    /// No credential record matches the username.
    UnknownUser,
    /// The username matched but the password did not.
    BadPassword,
    /// The authenticated privilege level may not run the command.
    AuthorizationRequired,
    /// The command token names no known command.
    UnknownCommand,
    /// `set` with a missing or unparsable register / value.
    BadVariable,
}

impl CommandError {
    /// Reply line sent to the client for this error.
    pub const fn wire_text(self) -> &'static str {
        match self {
            Self::MalformedInput | Self::UnknownCommand => "Bad or unknown command!",
            Self::AuthenticationRequired => "Authentication required!",
            Self::UnknownUser => "Unknown user!",
            Self::BadPassword => "Bad password!",
            Self::AuthorizationRequired => "Authorization required!",
            Self::BadVariable => "Bad variable / value!",
        }
    }

    /// True for the two credential failures.
    pub const fn is_authentication_failure(self) -> bool {
        matches!(self, Self::UnknownUser | Self::BadPassword)
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_text())
    }
}

impl std::error::Error for CommandError {}

/// Pipeline-wide `Result` alias.
pub type Result<T> = core::result::Result<T, CommandError>;
