//! Station sensor interrupts.
//!
//! Each sensor pin gets a falling-edge GPIO interrupt whose handler does
//! nothing but [`StationCounters::on_station_edge`]. ESP-IDF disables a pin
//! interrupt after it fires, so the main loop calls
//! [`rearm`](Esp32StationSensors::rearm) once per cycle.

extern crate alloc;
use alloc::sync::Arc;

use super::Esp32Clock;
use crate::sensors::StationCounters;
use crate::traits::STATION_COUNT;
use esp_idf_hal::gpio::{AnyIOPin, Input, InterruptType, PinDriver, Pull};

/// The four station sensors with their edge handlers installed.
pub struct Esp32StationSensors<'d> {
    pins: [PinDriver<'d, AnyIOPin, Input>; STATION_COUNT],
}

impl<'d> Esp32StationSensors<'d> {
    /// Configure the pins (ordered by station) and install the handlers.
    ///
    /// # Errors
    ///
    /// Returns an error if GPIO or interrupt setup fails.
    pub fn new(
        pins: [AnyIOPin; STATION_COUNT],
        counters: &Arc<StationCounters>,
    ) -> Result<Self, esp_idf_hal::sys::EspError> {
        let [p0, p1, p2, p3] = pins;
        Ok(Self {
            pins: [
                Self::arm(p0, 0, counters)?,
                Self::arm(p1, 1, counters)?,
                Self::arm(p2, 2, counters)?,
                Self::arm(p3, 3, counters)?,
            ],
        })
    }

    fn arm(
        pin: AnyIOPin,
        station: usize,
        counters: &Arc<StationCounters>,
    ) -> Result<PinDriver<'d, AnyIOPin, Input>, esp_idf_hal::sys::EspError> {
        let mut driver = PinDriver::input(pin)?;
        driver.set_pull(Pull::Up)?;
        driver.set_interrupt_type(InterruptType::NegEdge)?;

        let counters = Arc::clone(counters);
        // Safety: the handler touches only atomics and the ISR-safe timer,
        // and the counters outlive the driver through the Arc.
        unsafe {
            driver.subscribe(move || {
                counters.on_station_edge(station, Esp32Clock::millis());
            })?;
        }
        driver.enable_interrupt()?;
        Ok(driver)
    }

    /// Re-enable every sensor interrupt.
    pub fn rearm(&mut self) -> Result<(), esp_idf_hal::sys::EspError> {
        for pin in &mut self.pins {
            pin.enable_interrupt()?;
        }
        Ok(())
    }
}
