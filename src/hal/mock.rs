//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for all hardware traits, enabling
//! development and testing on desktop without the relay board.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockRelayBank`] | [`RelayBank`] | Records relay writes and levels |
//! | [`MockToggles`] | [`ToggleInputs`] | Settable toggle switches |
//! | [`MockThrottleInputs`] | [`ThrottleInputs`] | Settable direction flag and knob |
//! | [`MockMotorPwm`] | [`MotorPwm`] | Records duty cycles |
//! | [`MockClock`] | [`Clock`] | Controllable time source |
//! | [`MockPin`] | `embedded_hal::digital::InputPin` | Fixed-level GPIO input |
//! | [`MockI2c`] | `embedded_hal::i2c::I2c` | SX1509 register file |
//!
//! # Example
//!
//! ```rust
//! use nscale_router::hal::{MockRelayBank, MockToggles};
//! use nscale_router::traits::{Level, RelayBank, ToggleInputs};
//!
//! let mut bank = MockRelayBank::new();
//! bank.init().unwrap();
//! bank.write(2, Level::High).unwrap();
//! assert_eq!(bank.levels[2], Level::High);
//!
//! let mut toggles = MockToggles::new([true; 4]);
//! toggles.set(3, false);
//! assert_eq!(toggles.read_toggles(), [true, true, true, false]);
//! ```
//!
//! [`RelayBank`]: crate::traits::RelayBank
//! [`ToggleInputs`]: crate::traits::ToggleInputs
//! [`ThrottleInputs`]: crate::traits::ThrottleInputs
//! [`MotorPwm`]: crate::traits::MotorPwm
//! [`Clock`]: crate::traits::Clock

extern crate alloc;
use alloc::vec::Vec;

use embedded_hal::digital;
use embedded_hal::i2c::{self, I2c, NoAcknowledgeSource, Operation};

use crate::hal::sx1509::reg;
use crate::traits::{
    Clock, Direction, Level, MotorPwm, RelayBank, ThrottleInputs, ToggleInputs, RELAY_COUNT,
    STATION_COUNT,
};

// ============================================================================
// Hardware Mocks
// ============================================================================

/// Mock relay bank for testing.
///
/// Records every write in order. Use the public fields to inspect state
/// after test operations.
#[derive(Debug, Default)]
pub struct MockRelayBank {
    /// Current level of each relay.
    pub levels: [Level; RELAY_COUNT],
    /// Every `write` call in order.
    pub writes: Vec<(u8, Level)>,
    /// Number of times `init` was called.
    pub init_calls: usize,
    /// Make `init` fail, as an unreachable expander would.
    pub fail_init: bool,
    /// Fail the write attempt with this 1-based number.
    pub fail_write_at: Option<usize>,
    /// Write attempts so far, failed ones included.
    pub write_attempts: usize,
}

impl MockRelayBank {
    /// Creates a working relay bank.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a relay bank whose bring-up fails.
    pub fn failing() -> Self {
        Self {
            fail_init: true,
            ..Self::default()
        }
    }

    /// Creates a relay bank whose `n`th write attempt fails and leaves the
    /// relay untouched.
    pub fn failing_write(n: usize) -> Self {
        Self {
            fail_write_at: Some(n),
            ..Self::default()
        }
    }

    /// Levels as booleans (`true` = HIGH).
    pub fn states(&self) -> [bool; RELAY_COUNT] {
        self.levels.map(|l| l.is_high())
    }
}

impl RelayBank for MockRelayBank {
    type Error = ();

    fn init(&mut self) -> Result<(), ()> {
        self.init_calls += 1;
        if self.fail_init {
            Err(())
        } else {
            Ok(())
        }
    }

    fn write(&mut self, index: u8, level: Level) -> Result<(), ()> {
        self.write_attempts += 1;
        if self.fail_write_at == Some(self.write_attempts) {
            return Err(());
        }
        let slot = self.levels.get_mut(index as usize).ok_or(())?;
        *slot = level;
        self.writes.push((index, level));
        Ok(())
    }
}

/// Mock toggle switches.
#[derive(Debug, Clone)]
pub struct MockToggles {
    /// Switch positions (`true` = straight).
    pub toggles: [bool; STATION_COUNT],
}

impl MockToggles {
    /// Creates toggles in the given positions.
    pub fn new(toggles: [bool; STATION_COUNT]) -> Self {
        Self { toggles }
    }

    /// Flip one switch.
    pub fn set(&mut self, station: usize, straight: bool) {
        if let Some(t) = self.toggles.get_mut(station) {
            *t = straight;
        }
    }
}

impl Default for MockToggles {
    fn default() -> Self {
        // Pull-ups hold open switches HIGH
        Self::new([true; STATION_COUNT])
    }
}

impl ToggleInputs for MockToggles {
    fn read_toggles(&mut self) -> [bool; STATION_COUNT] {
        self.toggles
    }
}

/// Mock throttle inputs.
#[derive(Debug, Clone, Default)]
pub struct MockThrottleInputs {
    /// Direction flag.
    pub direction: Direction,
    /// Knob reading.
    pub magnitude: u16,
}

impl MockThrottleInputs {
    /// Creates inputs with the given flag and knob position.
    pub fn new(direction: Direction, magnitude: u16) -> Self {
        Self {
            direction,
            magnitude,
        }
    }
}

impl ThrottleInputs for MockThrottleInputs {
    fn read_direction(&mut self) -> Direction {
        self.direction
    }

    fn read_magnitude(&mut self) -> u16 {
        self.magnitude
    }
}

/// Mock PWM motor outputs.
#[derive(Debug, Default)]
pub struct MockMotorPwm {
    /// Last duty pair (channel A, channel B).
    pub duty: (u8, u8),
    /// Number of times `set_duty` was called.
    pub call_count: usize,
}

impl MockMotorPwm {
    /// Creates outputs at zero duty.
    pub fn new() -> Self {
        Self::default()
    }
}

impl MotorPwm for MockMotorPwm {
    type Error = ();

    fn set_duty(&mut self, channel_a: u8, channel_b: u8) -> Result<(), ()> {
        self.duty = (channel_a, channel_b);
        self.call_count += 1;
        Ok(())
    }
}

/// Mock clock for testing.
///
/// ```rust
/// use nscale_router::hal::MockClock;
/// use nscale_router::traits::Clock;
///
/// let mut clock = MockClock::new();
/// clock.set(1000);
/// clock.advance(500);
/// assert_eq!(clock.now_ms(), 1500);
/// ```
#[derive(Debug, Default)]
pub struct MockClock {
    current_ms: u64,
}

impl MockClock {
    /// Creates a new mock clock starting at 0ms.
    pub fn new() -> Self {
        Self { current_ms: 0 }
    }

    /// Sets the current time in milliseconds.
    pub fn set(&mut self, ms: u64) {
        self.current_ms = ms;
    }

    /// Advances the clock by the given duration.
    pub fn advance(&mut self, ms: u64) {
        self.current_ms += ms;
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.current_ms
    }
}

// ============================================================================
// embedded-hal Mocks
// ============================================================================

/// GPIO input stuck at one level, or failing every read.
#[derive(Debug, Clone, Copy)]
pub struct MockPin {
    level: Option<bool>,
}

impl MockPin {
    /// Pin reading HIGH.
    pub fn high() -> Self {
        Self { level: Some(true) }
    }

    /// Pin reading LOW.
    pub fn low() -> Self {
        Self { level: Some(false) }
    }

    /// Pin whose reads return an error.
    pub fn failing() -> Self {
        Self { level: None }
    }
}

impl digital::ErrorType for MockPin {
    type Error = digital::ErrorKind;
}

impl digital::InputPin for MockPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.level.ok_or(digital::ErrorKind::Other)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|h| !h)
    }
}

/// I2C bus with a simulated SX1509 register file behind one address.
///
/// Supports register auto-increment on reads and writes, and the
/// `0x12, 0x34` software reset sequence.
#[derive(Debug, Clone)]
pub struct MockI2c {
    /// Register file.
    pub regs: [u8; 256],
    /// Every register write as (register, value), in order.
    pub writes: Vec<(u8, u8)>,
    /// Completed software resets.
    pub resets: usize,
    /// Leave registers untouched on reset (to fake a wrong chip).
    pub ignore_reset: bool,
    address: u8,
    present: bool,
    pointer: u8,
    reset_armed: bool,
}

impl MockI2c {
    /// SX1509 at `address`, registers at their power-on values.
    pub fn sx1509(address: u8) -> Self {
        let mut bus = Self {
            regs: [0; 256],
            writes: Vec::new(),
            resets: 0,
            ignore_reset: false,
            address,
            present: true,
            pointer: 0,
            reset_armed: false,
        };
        bus.load_defaults();
        bus
    }

    /// Nothing acknowledges on the bus.
    pub fn absent(mut self) -> Self {
        self.present = false;
        self
    }

    fn load_defaults(&mut self) {
        self.regs = [0; 256];
        for r in [
            reg::DIR_A - 1,
            reg::DIR_A,
            reg::DATA_A - 1,
            reg::DATA_A,
            reg::INTERRUPT_MASK_A - 1,
            reg::INTERRUPT_MASK_A,
        ] {
            self.regs[r as usize] = 0xFF;
        }
    }

    fn store(&mut self, register: u8, value: u8) {
        self.writes.push((register, value));
        if register == reg::RESET {
            if value == 0x12 {
                self.reset_armed = true;
            } else {
                if value == 0x34 && self.reset_armed {
                    self.resets += 1;
                    if !self.ignore_reset {
                        self.load_defaults();
                    }
                }
                self.reset_armed = false;
            }
            return;
        }
        self.regs[register as usize] = value;
    }
}

impl i2c::ErrorType for MockI2c {
    type Error = i2c::ErrorKind;
}

impl I2c for MockI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if !self.present || address != self.address {
            return Err(i2c::ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    let Some((&register, data)) = bytes.split_first() else {
                        continue;
                    };
                    self.pointer = register;
                    for &value in data {
                        self.store(self.pointer, value);
                        self.pointer = self.pointer.wrapping_add(1);
                    }
                }
                Operation::Read(buf) => {
                    for byte in buf.iter_mut() {
                        *byte = self.regs[self.pointer as usize];
                        self.pointer = self.pointer.wrapping_add(1);
                    }
                }
            }
        }
        Ok(())
    }
}
