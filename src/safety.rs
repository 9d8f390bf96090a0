//! Circuit-breaker interlock.
//!
//! The interlock runs **after every accepted command** (except `exit`)
//! while the caller still holds the register lock, so the four registers
//! it reads are observed atomically with respect to any concurrent `set`.
//!
//! ## Trip rule
//!
//! If the breaker is closed (non-zero) and the voltage lies outside the
//! inclusive window `[min_voltage, max_voltage]`, the breaker is forced
//! open (0) and a [`TripEvent`] is returned.
//!
//! Re-evaluating with the breaker already open is a no-op, so the
//! evaluator is idempotent.  It never touches any other register.

use log::debug;

use crate::registers::{Register, RegisterBank};

/// Snapshot of the interlock inputs at the moment the breaker opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripEvent {
    pub voltage: u8,
    pub min_voltage: u8,
    pub max_voltage: u8,
}

/// Breaker interlock evaluator.
#[derive(Debug, Default)]
pub struct Interlock {
    trips: u64,
}

impl Interlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the breaker is closed and the voltage is out of window.
    pub fn trip_conditions_met(bank: &RegisterBank) -> bool {
        let voltage = bank.load(Register::Voltage);
        bank.load(Register::CircuitBreaker) != 0
            && !(bank.load(Register::MinVoltage)..=bank.load(Register::MaxVoltage))
                .contains(&voltage)
    }

    /// Evaluate the trip rule, opening the breaker if it fires.
    pub fn evaluate(&mut self, bank: &mut RegisterBank) -> Option<TripEvent> {
        if !Self::trip_conditions_met(bank) {
            return None;
        }

        bank.store(Register::CircuitBreaker, 0);
        self.trips = self.trips.saturating_add(1);

        let event = TripEvent {
            voltage: bank.load(Register::Voltage),
            min_voltage: bank.load(Register::MinVoltage),
            max_voltage: bank.load(Register::MaxVoltage),
        };
        debug!("interlock: trip #{} recorded", self.trips);
        Some(event)
    }

    /// Number of trips since this evaluator was created.
    pub fn trip_count(&self) -> u64 {
        self.trips
    }
}
