//! Commands a client can run.
//!
//! Numeric ids are part of the wire protocol (scripts send them in place
//! of the names), so they must never be renumbered.

use crate::registers::RegisterId;

/// Command discriminant, as resolved from the command token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandKind {
    /// No operation; still runs the interlock.
    Nop = 0,
    /// End the session without running the interlock.
    Exit = 1,
    /// Write one register.
    SetVariable = 2,
}

impl CommandKind {
    pub const fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            0 => Some(Self::Nop),
            1 => Some(Self::Exit),
            2 => Some(Self::SetVariable),
            _ => None,
        }
    }
}

/// A fully validated command, ready for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    Nop,
    Exit,
    SetVariable { register: RegisterId, value: u8 },
}

impl AppCommand {
    pub const fn kind(&self) -> CommandKind {
        match self {
            Self::Nop => CommandKind::Nop,
            Self::Exit => CommandKind::Exit,
            Self::SetVariable { .. } => CommandKind::SetVariable,
        }
    }
}
