//! Route toggle switches.
//!
//! Four pull-up biased switches on the control panel, one per station.
//! An open switch reads HIGH and means "continue straight".

use embedded_hal::digital::InputPin;

use crate::traits::{ToggleInputs, STATION_COUNT};

/// Samples the toggle switches once per control cycle.
pub struct ToggleReader<T: ToggleInputs> {
    inputs: T,
}

impl<T: ToggleInputs> ToggleReader<T> {
    /// Wrap a toggle input source.
    pub fn new(inputs: T) -> Self {
        Self { inputs }
    }

    /// Read all four toggles.
    #[inline]
    pub fn sample(&mut self) -> [bool; STATION_COUNT] {
        self.inputs.read_toggles()
    }

    /// Access the underlying inputs (tests flip mock switches through this).
    pub fn inputs_mut(&mut self) -> &mut T {
        &mut self.inputs
    }
}

/// Toggle switches wired to four `embedded-hal` input pins.
///
/// A pin that fails to read is reported HIGH, the level its pull-up holds
/// it at when nothing drives it.
pub struct GpioToggles<P: InputPin> {
    pins: [P; STATION_COUNT],
}

impl<P: InputPin> GpioToggles<P> {
    /// Create from pins ordered by station.
    pub fn new(pins: [P; STATION_COUNT]) -> Self {
        Self { pins }
    }
}

impl<P: InputPin> ToggleInputs for GpioToggles<P> {
    fn read_toggles(&mut self) -> [bool; STATION_COUNT] {
        let mut out = [true; STATION_COUNT];
        for (slot, pin) in out.iter_mut().zip(self.pins.iter_mut()) {
            *slot = pin.is_high().unwrap_or(true);
        }
        out
    }
}
