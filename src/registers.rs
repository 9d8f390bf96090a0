//! Register bank — the simulated hardware state.
//!
//! 256 byte-wide slots addressed by a `u8` register id.  A handful of ids
//! carry semantic names; the rest are anonymous general-purpose slots.
//! Every slot always holds a value, so `get`/`set` are total.
//!
//! The bank performs no validation: any byte is legal in any slot.  Safety
//! meaning lives in [`crate::safety::Interlock`], not here.

use serde::{Deserialize, Serialize};

/// Number of addressable registers.
pub const REGISTER_COUNT: usize = 256;

/// Register identifier.  A full byte, so no id is ever out of range.
pub type RegisterId = u8;

/// Registers with reserved semantic names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Register {
    /// Default target when a client names nothing useful.
    Unused = 0,
    /// Potential read from the hardware.
    Voltage = 1,
    /// Current read from the hardware.
    Amperage = 2,
    /// Lowest voltage before the breaker trips.
    MinVoltage = 3,
    /// Highest voltage before the breaker trips.
    MaxVoltage = 4,
    /// 0 = open (tripped), non-zero = closed (armed).
    CircuitBreaker = 5,
}

impl Register {
    pub const ALL: [Self; 6] = [
        Self::Unused,
        Self::Voltage,
        Self::Amperage,
        Self::MinVoltage,
        Self::MaxVoltage,
        Self::CircuitBreaker,
    ];

    pub const fn id(self) -> RegisterId {
        self as u8
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Unused => "unused",
            Self::Voltage => "voltage",
            Self::Amperage => "amperage",
            Self::MinVoltage => "min_voltage",
            Self::MaxVoltage => "max_voltage",
            Self::CircuitBreaker => "circuit_breaker",
        }
    }

    pub fn from_id(id: RegisterId) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.id() == id)
    }

    /// Exact, case-sensitive name lookup.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.name() == name)
    }
}

/// Power-on values of the named registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterDefaults {
    pub voltage: u8,
    pub amperage: u8,
    pub min_voltage: u8,
    pub max_voltage: u8,
    pub circuit_breaker: u8,
}

impl Default for RegisterDefaults {
    fn default() -> Self {
        Self {
            voltage: 240,
            amperage: 0,
            min_voltage: 235,
            max_voltage: 245,
            circuit_breaker: 1,
        }
    }
}

/// The 256-slot register array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterBank {
    slots: [u8; REGISTER_COUNT],
}

impl RegisterBank {
    /// Bank initialised with the standard power-on defaults.
    pub fn new() -> Self {
        Self::with_defaults(&RegisterDefaults::default())
    }

    pub fn with_defaults(defaults: &RegisterDefaults) -> Self {
        let mut bank = Self {
            slots: [0; REGISTER_COUNT],
        };
        bank.store(Register::Voltage, defaults.voltage);
        bank.store(Register::Amperage, defaults.amperage);
        bank.store(Register::MinVoltage, defaults.min_voltage);
        bank.store(Register::MaxVoltage, defaults.max_voltage);
        bank.store(Register::CircuitBreaker, defaults.circuit_breaker);
        bank
    }

    pub fn get(&self, id: RegisterId) -> u8 {
        self.slots[id as usize]
    }

    pub fn set(&mut self, id: RegisterId, value: u8) {
        self.slots[id as usize] = value;
    }

    /// Read a named register.
    pub fn load(&self, reg: Register) -> u8 {
        self.get(reg.id())
    }

    /// Write a named register.
    pub fn store(&mut self, reg: Register, value: u8) {
        self.set(reg.id(), value);
    }

    /// Semantic name of `id`, if it has one.
    pub fn name_of(id: RegisterId) -> Option<&'static str> {
        Register::from_id(id).map(Register::name)
    }

    /// Name for display: the semantic name, or `var[N]`.
    pub fn display_name(id: RegisterId) -> String {
        Self::name_of(id).map_or_else(|| format!("var[{id}]"), str::to_owned)
    }

    /// Every register that is named or holds a non-zero value, in id order.
    pub fn iter_visible(&self) -> impl Iterator<Item = (RegisterId, u8)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, v)| (i as RegisterId, *v))
            .filter(|(id, v)| *v != 0 || Self::name_of(*id).is_some())
    }
}

impl Default for RegisterBank {
    fn default() -> Self {
        Self::new()
    }
}
