//! Speed knob and direction switch.
//!
//! The knob is a potentiometer on ADC1; the S3's 12-bit reading is scaled
//! down to the 0..=1023 range the throttle math expects. The direction
//! switch is pulled up, so an unconnected switch reads forward.

use crate::traits::{Direction, ThrottleInputs};
use esp_idf_hal::adc::attenuation::DB_11;
use esp_idf_hal::adc::oneshot::config::AdcChannelConfig;
use esp_idf_hal::adc::oneshot::{AdcChannelDriver, AdcDriver};
use esp_idf_hal::adc::ADC1;
use esp_idf_hal::gpio::{Gpio1, Gpio2, Input, PinDriver, Pull};
use esp_idf_hal::peripheral::Peripheral;

/// Throttle inputs on GPIO1 (ADC) and GPIO2.
pub struct Esp32ThrottleInputs<'d> {
    knob: AdcChannelDriver<'d, Gpio1, &'d AdcDriver<'d, ADC1>>,
    direction: PinDriver<'d, Gpio2, Input>,
}

impl<'d> Esp32ThrottleInputs<'d> {
    /// Creates the throttle inputs.
    ///
    /// # Errors
    ///
    /// Returns an error if ADC or GPIO initialization fails.
    pub fn new(
        adc: &'d AdcDriver<'d, ADC1>,
        knob_pin: impl Peripheral<P = Gpio1> + 'd,
        direction_pin: impl Peripheral<P = Gpio2> + 'd,
    ) -> Result<Self, esp_idf_hal::sys::EspError> {
        let config = AdcChannelConfig {
            attenuation: DB_11,
            ..Default::default()
        };
        let knob = AdcChannelDriver::new(adc, knob_pin, &config)?;

        let mut direction = PinDriver::input(direction_pin)?;
        direction.set_pull(Pull::Up)?;

        Ok(Self { knob, direction })
    }
}

impl ThrottleInputs for Esp32ThrottleInputs<'_> {
    fn read_direction(&mut self) -> Direction {
        Direction::from_level(self.direction.is_high())
    }

    fn read_magnitude(&mut self) -> u16 {
        // A failed conversion reads as zero speed
        self.knob.read().map(|raw| raw >> 2).unwrap_or(0)
    }
}
