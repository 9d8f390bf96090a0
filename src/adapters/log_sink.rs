//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the `log`
//! facade.  Register dumps only render at debug level.

use log::{Level, debug, error, info, log_enabled, warn};

use crate::app::commands::AppCommand;
use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::registers::RegisterBank;

/// Adapter that logs every [`AppEvent`] tagged with its session id.
pub struct LogEventSink {
    session: u64,
}

impl LogEventSink {
    pub fn new(session: u64) -> Self {
        Self { session }
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        let s = self.session;
        match event {
            AppEvent::CommandExecuted { user, command } => match command {
                AppCommand::Nop => info!("[{}] command: nop (user={})", s, user),
                AppCommand::Exit => info!("[{}] command: exit (user={})", s, user),
                AppCommand::SetVariable { register, value } => info!(
                    "[{}] command: set {} = {} (user={})",
                    s,
                    RegisterBank::display_name(*register),
                    value,
                    user
                ),
            },
            // `authenticate` already warned with the username.
            AppEvent::CommandRejected(e) if e.is_authentication_failure() => {
                debug!("[{}] rejected: {}", s, e);
            }
            AppEvent::CommandRejected(e) => warn!("[{}] rejected: {}", s, e),
            AppEvent::BreakerTripped(t) => error!(
                "[{}] *** BREAKER TRIPPED: voltage {} outside [{}, {}]",
                s, t.voltage, t.min_voltage, t.max_voltage
            ),
            AppEvent::Registers(regs) => {
                if log_enabled!(Level::Debug) {
                    debug!("[{}] variables:", s);
                    for (id, value) in regs {
                        debug!(
                            "[{}]   {:>3}: {:<24} = {}",
                            s,
                            id,
                            RegisterBank::display_name(*id),
                            value
                        );
                    }
                }
            }
        }
    }
}
