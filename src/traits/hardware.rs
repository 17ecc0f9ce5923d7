//! Hardware abstraction traits for the relay bank, operator inputs and motor drive.
//!
//! These traits let the routing core run unchanged against the SX1509 relay
//! board on the ESP32 and against the mocks in [`crate::hal::mock`].
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`RelayBank`] | Eight turnout relays behind an addressed bus |
//! | [`ToggleInputs`] | Four route toggle switches, one per station |
//! | [`ThrottleInputs`] | Direction flag and analog speed knob |
//! | [`MotorPwm`] | Two one-directional PWM drive channels |
//! | [`Clock`] | Time source for `no_std` environments |
//!
//! # Example
//!
//! ```rust
//! use nscale_router::traits::{RelayBank, Level};
//! use nscale_router::hal::MockRelayBank;
//!
//! let mut bank = MockRelayBank::new();
//! bank.init().unwrap();
//! bank.write(4, Level::High).unwrap();
//! assert_eq!(bank.levels[4], Level::High);
//! ```

/// Number of stations on the loop.
pub const STATION_COUNT: usize = 4;

/// Number of turnout relays on the expander.
pub const RELAY_COUNT: usize = 8;

/// Largest value the throttle ADC reports after scaling to 10 bits.
pub const MAX_THROTTLE: u16 = 1023;

/// Direction of train travel around the loop.
///
/// # Default
///
/// Defaults to [`Forward`](Self::Forward), the state the controller boots in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    /// Station order 0 → 1 → 2 → 3 → 0.
    #[default]
    Forward,
    /// Station order 0 → 3 → 2 → 1 → 0.
    Reverse,
}

impl Direction {
    /// Returns the direction as a lowercase string.
    ///
    /// ```
    /// use nscale_router::Direction;
    ///
    /// assert_eq!(Direction::Forward.as_str(), "forward");
    /// assert_eq!(Direction::Reverse.as_str(), "reverse");
    /// ```
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Reverse => "reverse",
        }
    }

    /// Parse direction from text input.
    ///
    /// Accepts `"forward"`/`"fwd"`/`"1"` and `"reverse"`/`"rev"`/`"-1"`.
    /// Input is trimmed and case-insensitive.
    ///
    /// ```
    /// use nscale_router::Direction;
    ///
    /// assert_eq!(Direction::from_text(" FWD "), Some(Direction::Forward));
    /// assert_eq!(Direction::from_text("-1"), Some(Direction::Reverse));
    /// assert_eq!(Direction::from_text("stopped"), None);
    /// ```
    pub fn from_text(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("forward") || s.eq_ignore_ascii_case("fwd") || s == "1" {
            Some(Direction::Forward)
        } else if s.eq_ignore_ascii_case("reverse") || s.eq_ignore_ascii_case("rev") || s == "-1"
        {
            Some(Direction::Reverse)
        } else {
            None
        }
    }

    /// Direction encoded by the level of the direction pin (HIGH = forward).
    #[inline]
    pub const fn from_level(high: bool) -> Self {
        if high {
            Direction::Forward
        } else {
            Direction::Reverse
        }
    }

    /// Value carried in the serial telemetry report (`1` or `-1`).
    #[inline]
    pub const fn telemetry_code(&self) -> i8 {
        match self {
            Direction::Forward => 1,
            Direction::Reverse => -1,
        }
    }
}

/// Logic level of a relay output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Level {
    /// Relay de-energized.
    #[default]
    Low,
    /// Relay energized.
    High,
}

impl Level {
    /// Returns true for [`Level::High`].
    #[inline]
    pub const fn is_high(&self) -> bool {
        matches!(self, Level::High)
    }

    /// Upper-case name used in route log lines.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Level::Low => "LOW",
            Level::High => "HIGH",
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Turnout relay bank behind an I/O expander.
///
/// Implementations talk to the physical bus; bookkeeping such as the
/// "initialize before use" rule lives in [`RelayDriver`].
///
/// # Implementation Notes
///
/// - `init()` must verify the device answers and configure every relay
///   channel as an output
/// - `write()` must be safe to repeat with the same level
///
/// [`RelayDriver`]: crate::relays::RelayDriver
pub trait RelayBank {
    /// Error type for bus operations.
    type Error: core::fmt::Debug;

    /// Bring up the device. A failure here is terminal for the controller.
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Drive relay `index` (0..8) to `level`.
    fn write(&mut self, index: u8, level: Level) -> Result<(), Self::Error>;
}

/// Route toggle switches, one per station.
///
/// `true` means "continue straight", `false` means "diverge". The platform
/// contract is that reading always succeeds.
pub trait ToggleInputs {
    /// Sample all four toggles.
    fn read_toggles(&mut self) -> [bool; STATION_COUNT];
}

/// Operator throttle inputs.
pub trait ThrottleInputs {
    /// Read the direction flag.
    fn read_direction(&mut self) -> Direction;

    /// Read the speed knob, 0..=[`MAX_THROTTLE`].
    fn read_magnitude(&mut self) -> u16;
}

/// Two one-directional PWM motor drive channels.
///
/// Channel A drives the train forward, channel B in reverse. Callers never
/// drive both above zero at once.
pub trait MotorPwm {
    /// Error type for PWM operations.
    type Error: core::fmt::Debug;

    /// Set both 8-bit duty cycles.
    fn set_duty(&mut self, channel_a: u8, channel_b: u8) -> Result<(), Self::Error>;

    /// Convenience method to cut power to the track.
    fn stop(&mut self) -> Result<(), Self::Error> {
        self.set_duty(0, 0)
    }
}

/// Time source trait for `no_std` compatibility.
///
/// ```rust
/// use nscale_router::traits::Clock;
/// use nscale_router::hal::MockClock;
///
/// let mut clock = MockClock::new();
/// clock.advance(250);
/// assert_eq!(clock.now_ms(), 250);
/// ```
pub trait Clock {
    /// Returns current time in milliseconds since an arbitrary epoch.
    ///
    /// Must be monotonically increasing.
    fn now_ms(&self) -> u64;
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Direction Tests
    // =========================================================================

    #[test]
    fn direction_default_is_forward() {
        assert_eq!(Direction::default(), Direction::Forward);
    }

    #[test]
    fn direction_from_level() {
        assert_eq!(Direction::from_level(true), Direction::Forward);
        assert_eq!(Direction::from_level(false), Direction::Reverse);
    }

    #[test]
    fn direction_telemetry_code() {
        assert_eq!(Direction::Forward.telemetry_code(), 1);
        assert_eq!(Direction::Reverse.telemetry_code(), -1);
    }

    #[test]
    fn direction_from_text_variants() {
        assert_eq!(Direction::from_text("forward"), Some(Direction::Forward));
        assert_eq!(Direction::from_text("REV"), Some(Direction::Reverse));
        assert_eq!(Direction::from_text("\t1\n"), Some(Direction::Forward));
        assert_eq!(Direction::from_text(""), None);
        assert_eq!(Direction::from_text("0"), None);
    }

    // =========================================================================
    // Level Tests
    // =========================================================================

    #[test]
    fn level_from_bool() {
        assert_eq!(Level::from(true), Level::High);
        assert_eq!(Level::from(false), Level::Low);
        assert!(Level::High.is_high());
        assert!(!Level::default().is_high());
    }

    #[test]
    fn level_names() {
        assert_eq!(Level::High.as_str(), "HIGH");
        assert_eq!(Level::Low.as_str(), "LOW");
    }

    // =========================================================================
    // MotorPwm Default Methods Tests
    // =========================================================================

    struct TestPwm {
        duty: (u8, u8),
    }

    impl MotorPwm for TestPwm {
        type Error = ();

        fn set_duty(&mut self, a: u8, b: u8) -> Result<(), ()> {
            self.duty = (a, b);
            Ok(())
        }
    }

    #[test]
    fn motor_pwm_stop_default_impl() {
        let mut pwm = TestPwm { duty: (200, 0) };
        pwm.stop().unwrap();
        assert_eq!(pwm.duty, (0, 0));
    }
}
