//! ESP32-S3 hardware abstraction layer for the turnout controller.
//!
//! # Hardware Configuration
//!
//! - **MCU**: ESP32-S3 DevKitC-1
//! - **Relays**: 8-channel relay board on an SX1509 expander (I2C, 0x3E)
//! - **Station sensors**: 4 reed/IR sensors, active low, pull-up biased
//! - **Route toggles**: 4 panel switches, pull-up biased
//! - **Track power**: dual PWM H-bridge, speed knob on ADC, direction switch
//!
//! # Pin Assignments
//!
//! See the [`pins`] module for GPIO assignments.

mod clock;
mod motor;
mod sensors;
mod throttle;

pub use clock::Esp32Clock;
pub use motor::Esp32MotorPwm;
pub use sensors::Esp32StationSensors;
pub use throttle::Esp32ThrottleInputs;

/// Pin assignments for the ESP32-S3 DevKitC-1.
pub mod pins {
    // =========================================================================
    // Track Power
    // =========================================================================

    /// Speed knob (ADC1 channel 0)
    pub const THROTTLE_IN: i32 = 1;

    /// Direction switch (HIGH = forward)
    pub const DIRECTION: i32 = 2;

    /// Forward PWM output
    pub const THROTTLE_OUT_A: i32 = 11;

    /// Reverse PWM output
    pub const THROTTLE_OUT_B: i32 = 12;

    // =========================================================================
    // Station Sensors (falling edge = arrival)
    // =========================================================================

    /// Sensors for stations 0..4
    pub const TRACK_POS: [i32; 4] = [4, 5, 6, 7];

    // =========================================================================
    // Route Toggles (HIGH = straight)
    // =========================================================================

    /// Toggles for stations 0..4
    pub const TRACK_TOGGLE: [i32; 4] = [15, 16, 17, 18];

    // =========================================================================
    // I2C (SX1509)
    // =========================================================================

    /// I2C data line
    pub const I2C_SDA: i32 = 8;

    /// I2C clock line
    pub const I2C_SCL: i32 = 9;
}
