//! Turnout relay driver.
//!
//! [`RelayDriver`] sits between the routing logic and a [`RelayBank`]. It
//! enforces the startup rule (bus bring-up, then every relay LOW, before any
//! route is applied) and keeps the commanded level of each relay for
//! telemetry and read-back.
//!
//! # Example
//!
//! ```rust
//! use nscale_router::relays::RelayDriver;
//! use nscale_router::hal::MockRelayBank;
//! use nscale_router::Level;
//!
//! let mut driver = RelayDriver::new(MockRelayBank::new());
//! driver.init().unwrap();
//! driver.apply(5, Level::High).unwrap();
//! driver.apply(5, Level::High).unwrap(); // harmless repeat
//! assert_eq!(driver.states(), [false, false, false, false, false, true, false, false]);
//! ```

use crate::route::RelayPattern;
use crate::traits::{Level, RelayBank, RELAY_COUNT};

/// Errors from the relay driver.
#[derive(Debug, thiserror::Error)]
pub enum RelayError<E: core::fmt::Debug> {
    /// A relay was commanded before [`RelayDriver::init`] succeeded.
    #[error("relay bank used before initialization")]
    NotInitialized,
    /// [`RelayDriver::init`] was called a second time.
    #[error("relay bank already initialized")]
    AlreadyInitialized,
    /// Relay index outside 0..8.
    #[error("relay index {0} out of range")]
    InvalidRelay(u8),
    /// The underlying bus failed.
    #[error("relay bus error: {0:?}")]
    Bus(E),
}

/// Driver for the eight-relay turnout bank.
pub struct RelayDriver<B: RelayBank> {
    bank: B,
    states: [bool; RELAY_COUNT],
    initialized: bool,
    test_level: Level,
}

impl<B: RelayBank> RelayDriver<B> {
    /// Wrap a relay bank. Nothing touches the bus until [`init`](Self::init).
    pub fn new(bank: B) -> Self {
        Self {
            bank,
            states: [false; RELAY_COUNT],
            initialized: false,
            test_level: Level::Low,
        }
    }

    /// Bring up the bus and drive all eight relays LOW.
    ///
    /// Runs once. On error the driver stays uninitialized and refuses every
    /// later write.
    pub fn init(&mut self) -> Result<(), RelayError<B::Error>> {
        if self.initialized {
            return Err(RelayError::AlreadyInitialized);
        }
        self.bank.init().map_err(RelayError::Bus)?;
        for index in 0..RELAY_COUNT as u8 {
            self.bank.write(index, Level::Low).map_err(RelayError::Bus)?;
        }
        self.states = [false; RELAY_COUNT];
        self.initialized = true;
        log::info!("relay bank initialized, all {} relays LOW", RELAY_COUNT);
        Ok(())
    }

    /// Whether [`init`](Self::init) has completed.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Drive one relay. Repeating a level is harmless.
    pub fn apply(&mut self, index: u8, level: Level) -> Result<(), RelayError<B::Error>> {
        if !self.initialized {
            return Err(RelayError::NotInitialized);
        }
        let Some(slot) = self.states.get_mut(index as usize) else {
            return Err(RelayError::InvalidRelay(index));
        };
        self.bank.write(index, level).map_err(RelayError::Bus)?;
        *slot = level.is_high();
        Ok(())
    }

    /// Apply both commands of a route pattern, in order.
    pub fn apply_pattern(&mut self, pattern: &RelayPattern) -> Result<(), RelayError<B::Error>> {
        for cmd in pattern.commands() {
            self.apply(cmd.relay, cmd.level)?;
        }
        Ok(())
    }

    /// Last commanded level of every relay (`true` = HIGH).
    #[inline]
    pub fn states(&self) -> [bool; RELAY_COUNT] {
        self.states
    }

    /// Bench check: drive every relay to the current test level, then flip
    /// the level for the next call. Returns the level just written.
    pub fn self_test_step(&mut self) -> Result<Level, RelayError<B::Error>> {
        let level = self.test_level;
        for index in 0..RELAY_COUNT as u8 {
            self.apply(index, level)?;
        }
        self.test_level = match level {
            Level::Low => Level::High,
            Level::High => Level::Low,
        };
        Ok(level)
    }

    /// Access the underlying bank.
    pub fn bank(&self) -> &B {
        &self.bank
    }
}
