//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`] for various platforms.
//!
//! # Available Implementations
//!
//! - `mock`: Test implementations for desktop development
//! - `sx1509`: Relay bank on an SX1509 expander, over any `embedded-hal` I2C bus
//! - `esp32`: ESP32-S3 inputs, PWM and sensor interrupts (requires `esp32` feature)

pub mod mock;
pub mod sx1509;

#[cfg(feature = "esp32")]
pub mod esp32;

pub use mock::*;
pub use sx1509::{Sx1509, Sx1509Error};

#[cfg(feature = "esp32")]
pub use esp32::*;
