//! Trait definitions for hardware abstraction.
//!
//! These abstractions allow the routing controller to run on the ESP32
//! relay board or against desktop mocks in tests.
//!
//! # Hardware Abstraction
//!
//! - [`RelayBank`]: turnout relays behind the I/O expander
//! - [`ToggleInputs`]: per-station route toggles
//! - [`ThrottleInputs`]: direction flag and speed knob
//! - [`MotorPwm`]: two-channel PWM track drive
//! - [`Clock`]: time source for `no_std` environments

pub mod hardware;

pub use hardware::*;
