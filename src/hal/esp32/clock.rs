//! ESP32 clock implementation using the ESP-IDF timer.

use crate::traits::Clock;

/// Reads the ESP-IDF high resolution timer.
///
/// `esp_timer_get_time()` is safe to call from interrupt context, which is
/// where the station sensor handlers take their timestamps.
pub struct Esp32Clock;

impl Esp32Clock {
    /// Creates a new ESP32 clock instance.
    #[inline]
    pub fn new() -> Self {
        Self
    }

    /// Milliseconds since boot, without needing an instance.
    #[inline]
    pub fn millis() -> u64 {
        // Safe: plain read of the hardware timer, no side effects
        let micros = unsafe { esp_idf_hal::sys::esp_timer_get_time() };
        (micros / 1000) as u64
    }
}

impl Default for Esp32Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for Esp32Clock {
    #[inline]
    fn now_ms(&self) -> u64 {
        Self::millis()
    }
}
