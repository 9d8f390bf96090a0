//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (log lines today).

use crate::error::CommandError;
use crate::registers::RegisterId;
use crate::safety::TripEvent;

use super::commands::AppCommand;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// An authorized command was dispatched.
    CommandExecuted { user: String, command: AppCommand },

    /// A line was rejected; the reply carries the same error.
    CommandRejected(CommandError),

    /// The interlock opened the breaker.
    BreakerTripped(TripEvent),

    /// Named or non-zero registers after a line was handled.
    Registers(Vec<(RegisterId, u8)>),
}
