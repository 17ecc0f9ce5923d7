//! Track power throttle.
//!
//! Reads the direction flag and the speed knob each cycle and drives exactly
//! one of the two PWM channels. There is no smoothing or memory between
//! cycles: the knob position is the speed.
//!
//! # Example
//!
//! ```rust
//! use nscale_router::throttle::ThrottleOutput;
//! use nscale_router::Direction;
//!
//! let out = ThrottleOutput::from_inputs(Direction::Forward, 1023);
//! assert_eq!(out.speed_percent, 100);
//! assert_eq!((out.pwm_a, out.pwm_b), (255, 0));
//! ```

use crate::traits::{Direction, MotorPwm, ThrottleInputs, MAX_THROTTLE};

/// Result of one throttle update.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThrottleOutput {
    /// Direction read from the flag.
    pub direction: Direction,
    /// Speed, 0..=100.
    pub speed_percent: u8,
    /// Forward channel duty, 0..=255.
    pub pwm_a: u8,
    /// Reverse channel duty, 0..=255.
    pub pwm_b: u8,
}

impl ThrottleOutput {
    /// Scale a raw knob reading to percent, then to 8-bit duty on the channel
    /// matching `direction`. Readings above 1023 are clamped.
    pub fn from_inputs(direction: Direction, magnitude: u16) -> Self {
        let magnitude = u32::from(magnitude.min(MAX_THROTTLE));
        let speed = magnitude * 100 / u32::from(MAX_THROTTLE);
        let duty = (speed * 255 / 100) as u8;
        let (pwm_a, pwm_b) = match direction {
            Direction::Forward => (duty, 0),
            Direction::Reverse => (0, duty),
        };
        Self {
            direction,
            speed_percent: speed as u8,
            pwm_a,
            pwm_b,
        }
    }
}

/// Throttle controller: operator inputs in, PWM out.
pub struct Throttle<I: ThrottleInputs, M: MotorPwm> {
    inputs: I,
    motor: M,
}

impl<I: ThrottleInputs, M: MotorPwm> Throttle<I, M> {
    /// Create a throttle from its inputs and PWM outputs.
    pub fn new(inputs: I, motor: M) -> Self {
        Self { inputs, motor }
    }

    /// Sample the inputs and drive the motor.
    pub fn update(&mut self) -> Result<ThrottleOutput, M::Error> {
        let direction = self.inputs.read_direction();
        let magnitude = self.inputs.read_magnitude();
        let out = ThrottleOutput::from_inputs(direction, magnitude);
        self.motor.set_duty(out.pwm_a, out.pwm_b)?;
        Ok(out)
    }

    /// Cut track power.
    pub fn stop(&mut self) -> Result<(), M::Error> {
        self.motor.stop()
    }

    /// Access the inputs.
    pub fn inputs_mut(&mut self) -> &mut I {
        &mut self.inputs
    }

    /// Access the PWM outputs.
    pub fn motor(&self) -> &M {
        &self.motor
    }
}
