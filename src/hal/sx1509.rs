//! SX1509 16-channel I/O expander driving the turnout relays.
//!
//! The relays hang off bank A (IO0..IO7). The driver talks to the chip over
//! any `embedded-hal` 1.0 I2C bus, so the same code runs on the ESP32 and
//! against [`MockI2c`](crate::hal::MockI2c) in tests.
//!
//! # Bring-up
//!
//! 1. Software reset: `0x12` then `0x34` to `RegReset`
//! 2. Read `RegInterruptMaskA` / `RegSenseHighB` and expect their reset
//!    values `0xFF` / `0x00`; anything else means the chip is not there
//! 3. Drive bank A data low, then make bank A outputs
//!
//! Step 3 writes the data register first because the chip resets with
//! data high, and relays must never see that level.

use embedded_hal::i2c::I2c;

use crate::traits::{Level, RelayBank, RELAY_COUNT};

/// Register addresses used by the driver.
pub mod reg {
    /// Bank A direction (1 = input, 0 = output)
    pub const DIR_A: u8 = 0x0F;
    /// Bank A data
    pub const DATA_A: u8 = 0x11;
    /// Bank A interrupt mask, reset value 0xFF
    pub const INTERRUPT_MASK_A: u8 = 0x13;
    /// Bank B high-edge sense, reset value 0x00 (follows `INTERRUPT_MASK_A`)
    pub const SENSE_HIGH_B: u8 = 0x14;
    /// Software reset register
    pub const RESET: u8 = 0x7D;
}

/// First and second words of the software reset sequence.
const RESET_SEQUENCE: [u8; 2] = [0x12, 0x34];

/// Expected `[RegInterruptMaskA, RegSenseHighB]` after reset.
const RESET_SIGNATURE: [u8; 2] = [0xFF, 0x00];

/// SX1509 errors.
#[derive(Debug, thiserror::Error)]
pub enum Sx1509Error<E: core::fmt::Debug> {
    /// I2C transfer failed.
    #[error("i2c error: {0:?}")]
    Bus(E),
    /// The device answered but its registers did not read back as expected.
    #[error("sx1509 not responding (read {0:02X?})")]
    NotResponding([u8; 2]),
    /// Pin outside bank A.
    #[error("pin {0} is not a relay channel")]
    InvalidPin(u8),
}

/// SX1509 relay bank on I2C.
pub struct Sx1509<I2C> {
    i2c: I2C,
    address: u8,
    data_a: u8,
}

impl<I2C: I2c> Sx1509<I2C> {
    /// Create a driver for the chip at `address`. No bus traffic yet.
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            data_a: 0,
        }
    }

    /// Configured 7-bit address.
    #[inline]
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Cached bank A output image.
    #[inline]
    pub fn data_a(&self) -> u8 {
        self.data_a
    }

    /// Give back the bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn write_reg(&mut self, register: u8, value: u8) -> Result<(), Sx1509Error<I2C::Error>> {
        self.i2c
            .write(self.address, &[register, value])
            .map_err(Sx1509Error::Bus)
    }

    fn reset(&mut self) -> Result<(), Sx1509Error<I2C::Error>> {
        for word in RESET_SEQUENCE {
            self.write_reg(reg::RESET, word)?;
        }
        Ok(())
    }
}

impl<I2C: I2c> RelayBank for Sx1509<I2C> {
    type Error = Sx1509Error<I2C::Error>;

    fn init(&mut self) -> Result<(), Self::Error> {
        self.reset()?;

        let mut signature = [0u8; 2];
        self.i2c
            .write_read(self.address, &[reg::INTERRUPT_MASK_A], &mut signature)
            .map_err(Sx1509Error::Bus)?;
        if signature != RESET_SIGNATURE {
            return Err(Sx1509Error::NotResponding(signature));
        }

        self.data_a = 0;
        self.write_reg(reg::DATA_A, self.data_a)?;
        self.write_reg(reg::DIR_A, 0x00)?;
        log::debug!("sx1509 at {:#04x} ready", self.address);
        Ok(())
    }

    fn write(&mut self, index: u8, level: Level) -> Result<(), Self::Error> {
        if index as usize >= RELAY_COUNT {
            return Err(Sx1509Error::InvalidPin(index));
        }
        let mask = 1u8 << index;
        self.data_a = match level {
            Level::High => self.data_a | mask,
            Level::Low => self.data_a & !mask,
        };
        self.write_reg(reg::DATA_A, self.data_a)
    }
}
