//! Two-channel track PWM using the ESP32 LEDC peripheral.
//!
//! - Forward: A = duty, B = 0
//! - Reverse: A = 0, B = duty
//!
//! The duty values come straight from [`ThrottleOutput`] (0..=255), so the
//! timer runs at 8-bit resolution.
//!
//! [`ThrottleOutput`]: crate::throttle::ThrottleOutput

use crate::traits::MotorPwm;
use esp_idf_hal::ledc::{config::TimerConfig, LedcDriver, LedcTimerDriver, Resolution};
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::prelude::*;

/// LEDC-backed track PWM.
///
/// # Example
///
/// ```ignore
/// use nscale_router::hal::esp32::Esp32MotorPwm;
/// use nscale_router::traits::MotorPwm;
///
/// let peripherals = Peripherals::take()?;
/// let mut pwm = Esp32MotorPwm::new(
///     peripherals.pins.gpio11,
///     peripherals.pins.gpio12,
///     peripherals.ledc.timer0,
///     peripherals.ledc.channel0,
///     peripherals.ledc.channel1,
/// )?;
/// pwm.set_duty(128, 0)?;
/// ```
pub struct Esp32MotorPwm<'d> {
    channel_a: LedcDriver<'d>,
    channel_b: LedcDriver<'d>,
}

impl<'d> Esp32MotorPwm<'d> {
    /// PWM frequency in Hz (20kHz is above audible range)
    const PWM_FREQ_HZ: u32 = 20_000;

    /// 8-bit duty, matching the throttle scaling
    const PWM_RESOLUTION: Resolution = Resolution::Bits8;

    /// Creates the PWM outputs, both at zero duty.
    ///
    /// # Errors
    ///
    /// Returns an error if LEDC initialization fails.
    pub fn new<T, TI, AC, ACI, BC, BCI, AP, API, BP, BPI>(
        pin_a: AP,
        pin_b: BP,
        timer: T,
        a_channel: AC,
        b_channel: BC,
    ) -> Result<Self, esp_idf_hal::sys::EspError>
    where
        TI: esp_idf_hal::ledc::LedcTimer + 'd,
        T: Peripheral<P = TI> + 'd,
        ACI: esp_idf_hal::ledc::LedcChannel<SpeedMode = TI::SpeedMode> + 'd,
        AC: Peripheral<P = ACI> + 'd,
        BCI: esp_idf_hal::ledc::LedcChannel<SpeedMode = TI::SpeedMode> + 'd,
        BC: Peripheral<P = BCI> + 'd,
        API: esp_idf_hal::gpio::OutputPin + 'd,
        AP: Peripheral<P = API> + 'd,
        BPI: esp_idf_hal::gpio::OutputPin + 'd,
        BP: Peripheral<P = BPI> + 'd,
    {
        let timer_config = TimerConfig::default()
            .frequency(Self::PWM_FREQ_HZ.Hz())
            .resolution(Self::PWM_RESOLUTION);
        let timer_driver = LedcTimerDriver::new(timer, &timer_config)?;

        let channel_a = LedcDriver::new(a_channel, &timer_driver, pin_a)?;
        let channel_b = LedcDriver::new(b_channel, &timer_driver, pin_b)?;

        let mut pwm = Self {
            channel_a,
            channel_b,
        };
        pwm.set_duty(0, 0)?;
        Ok(pwm)
    }
}

impl MotorPwm for Esp32MotorPwm<'_> {
    type Error = esp_idf_hal::sys::EspError;

    fn set_duty(&mut self, channel_a: u8, channel_b: u8) -> Result<(), Self::Error> {
        // Lower the channel going to zero first so both are never high together
        if channel_a == 0 {
            self.channel_a.set_duty(0)?;
            self.channel_b.set_duty(u32::from(channel_b))
        } else {
            self.channel_b.set_duty(0)?;
            self.channel_a.set_duty(u32::from(channel_a))
        }
    }
}
