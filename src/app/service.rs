//! Application service — the command pipeline.
//!
//! [`AppService`] owns the register bank and the interlock and borrows
//! nothing from the network.  Each call to [`handle_line`] runs one line
//! through the whole pipeline:
//!
//! ```text
//!  line ─▶ tokenize ─▶ authenticate ─▶ authorize ─▶ dispatch ─▶ interlock ─▶ reply
//!                           ▲                                       │
//!                    CredentialStore                            EventSink
//! ```
//!
//! The bank and interlock sit behind one mutex.  A line holds the lock
//! from dispatch through the interlock pass, so the trip rule always sees
//! a consistent set of registers even with many sessions running.
//!
//! [`handle_line`]: AppService::handle_line

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::info;

use crate::config::ServerConfig;
use crate::error::CommandError;
use crate::protocol::auth::{authenticate, authorize};
use crate::protocol::parser::{
    self, AUTH_PREAMBLE, MIN_TOKENS, ParseMode, command_of, register_of, value_of,
};
use crate::registers::{RegisterBank, RegisterId};
use crate::safety::{Interlock, TripEvent};

use super::commands::{AppCommand, CommandKind};
use super::events::AppEvent;
use super::ports::{AuthError, CredentialStore, EventSink};

// ───────────────────────────────────────────────────────────────
// Options and outcomes
// ───────────────────────────────────────────────────────────────

/// Protocol switches taken from [`ServerConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceOptions {
    pub parse_mode: ParseMode,
    /// Report both credential failures as `Authentication required!`.
    pub collapse_auth_errors: bool,
}

impl From<&ServerConfig> for ServiceOptions {
    fn from(config: &ServerConfig) -> Self {
        Self {
            parse_mode: config.parse_mode,
            collapse_auth_errors: config.collapse_auth_errors,
        }
    }
}

/// Result of handling one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineOutcome {
    pub reply: Result<(), CommandError>,
    /// An authorized `exit` ends the session after the reply.
    pub close_session: bool,
}

impl LineOutcome {
    pub const fn rejected(error: CommandError) -> Self {
        Self {
            reply: Err(error),
            close_session: false,
        }
    }

    /// Reply line without the trailing newline.
    pub const fn wire_text(&self) -> &'static str {
        match self.reply {
            Ok(()) => "OK",
            Err(e) => e.wire_text(),
        }
    }
}

struct Hardware {
    bank: RegisterBank,
    interlock: Interlock,
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The command pipeline.  Share it between sessions with an `Arc`.
pub struct AppService<C> {
    credentials: C,
    hardware: Mutex<Hardware>,
    options: ServiceOptions,
}

impl<C: CredentialStore> AppService<C> {
    /// Construct the service with power-on registers from `config`.
    pub fn new(credentials: C, config: &ServerConfig) -> Self {
        Self::with_bank(
            credentials,
            RegisterBank::with_defaults(&config.initial_registers),
            ServiceOptions::from(config),
        )
    }

    pub fn with_bank(credentials: C, bank: RegisterBank, options: ServiceOptions) -> Self {
        info!(
            "AppService ready (parse_mode={:?}, collapse_auth_errors={})",
            options.parse_mode, options.collapse_auth_errors
        );
        Self {
            credentials,
            hardware: Mutex::new(Hardware {
                bank,
                interlock: Interlock::new(),
            }),
            options,
        }
    }

    // ── Per-line pipeline ─────────────────────────────────────

    /// Run one command line through the pipeline and report the reply.
    pub fn handle_line(&self, line: &str, sink: &mut impl EventSink) -> LineOutcome {
        let outcome = match self.process(line, sink) {
            Ok(close_session) => LineOutcome {
                reply: Ok(()),
                close_session,
            },
            Err(e) => {
                sink.emit(&AppEvent::CommandRejected(e));
                LineOutcome::rejected(e)
            }
        };
        if !outcome.close_session {
            self.report_registers(sink);
        }
        outcome
    }

    fn process(&self, line: &str, sink: &mut impl EventSink) -> Result<bool, CommandError> {
        let tokens = parser::tokenize(line);
        if tokens.len() < MIN_TOKENS {
            return Err(CommandError::MalformedInput);
        }
        if tokens[0] != AUTH_PREAMBLE {
            return Err(CommandError::AuthenticationRequired);
        }

        let user = tokens[1];
        let level = authenticate(&self.credentials, user, tokens[2])
            .map_err(|e| self.authentication_error(e))?;

        let mode = self.options.parse_mode;
        let kind = command_of(tokens[3], mode).ok_or(CommandError::UnknownCommand)?;
        authorize(level, kind)?;

        let command = match kind {
            CommandKind::Nop => AppCommand::Nop,
            CommandKind::Exit => AppCommand::Exit,
            CommandKind::SetVariable => {
                let (Some(reg), Some(val)) = (tokens.get(4), tokens.get(5)) else {
                    return Err(CommandError::BadVariable);
                };
                let register = register_of(reg, mode).ok_or(CommandError::BadVariable)?;
                let value = value_of(val, mode).ok_or(CommandError::BadVariable)?;
                AppCommand::SetVariable { register, value }
            }
        };

        Ok(self.execute(user, command, sink))
    }

    fn authentication_error(&self, e: AuthError) -> CommandError {
        if self.options.collapse_auth_errors {
            CommandError::AuthenticationRequired
        } else {
            e.into()
        }
    }

    // ── Dispatch ──────────────────────────────────────────────

    /// Dispatch an already-authorized command.
    ///
    /// Returns `true` when the session must close (`exit`).  Every other
    /// command is followed by an interlock pass under the same lock.
    fn execute(&self, user: &str, command: AppCommand, sink: &mut impl EventSink) -> bool {
        let mut guard = self.lock();
        let hw = &mut *guard;

        match command {
            AppCommand::Nop => {}
            AppCommand::Exit => {
                sink.emit(&AppEvent::CommandExecuted {
                    user: user.to_owned(),
                    command,
                });
                return true;
            }
            AppCommand::SetVariable { register, value } => hw.bank.set(register, value),
        }
        sink.emit(&AppEvent::CommandExecuted {
            user: user.to_owned(),
            command,
        });

        if let Some(trip) = hw.interlock.evaluate(&mut hw.bank) {
            sink.emit(&AppEvent::BreakerTripped(trip));
        }
        false
    }

    /// Run one interlock pass outside of any command.
    pub fn run_interlock(&self, sink: &mut impl EventSink) -> Option<TripEvent> {
        let mut guard = self.lock();
        let hw = &mut *guard;
        let trip = hw.interlock.evaluate(&mut hw.bank);
        if let Some(trip) = trip {
            sink.emit(&AppEvent::BreakerTripped(trip));
        }
        trip
    }

    /// Emit the named and non-zero registers as one event.
    pub fn report_registers(&self, sink: &mut impl EventSink) {
        let visible = self.lock().bank.iter_visible().collect();
        sink.emit(&AppEvent::Registers(visible));
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current value of one register.
    pub fn register(&self, id: RegisterId) -> u8 {
        self.lock().bank.get(id)
    }

    /// Copy of the whole bank.
    pub fn snapshot(&self) -> RegisterBank {
        self.lock().bank.clone()
    }

    /// Breaker trips since startup.
    pub fn trip_count(&self) -> u64 {
        self.lock().interlock.trip_count()
    }

    /// A panicking session must not wedge every other session.
    fn lock(&self) -> MutexGuard<'_, Hardware> {
        self.hardware.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
