//! Controller configuration.
//!
//! Uses `heapless::String` for `no_std` compatibility while remaining
//! ergonomic to use on desktop with `std`.
//!
//! # Example
//!
//! ```rust
//! use nscale_router::config::{Config, SensorConfig, TimingConfig};
//!
//! // Use defaults
//! let config = Config::default();
//! assert_eq!(config.timing.loop_interval_ms, 250);
//!
//! // Or customize
//! let config = Config::default()
//!     .with_timing(TimingConfig::default().with_telemetry_every_cycles(8))
//!     .with_sensors(SensorConfig::default().with_debounce_ms(750));
//! ```

use heapless::String as HString;

/// Maximum length for short config strings (device names)
pub const MAX_SHORT_STRING: usize = 64;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Default SX1509 I2C address (ADDR1/ADDR0 strapped low)
pub const DEFAULT_EXPANDER_ADDRESS: u8 = 0x3E;

// ============================================================================
// Helper for creating heapless strings
// ============================================================================

/// Create a ShortString from a &str, truncating at a character boundary
pub fn short_string(s: &str) -> ShortString {
    let mut hs = ShortString::new();
    let valid_end = s
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|end| *end <= MAX_SHORT_STRING)
        .last()
        .unwrap_or(0);
    let _ = hs.push_str(&s[..valid_end]);
    hs
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete controller configuration
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Control loop and telemetry cadence
    pub timing: TimingConfig,
    /// I/O expander bus settings
    pub bus: BusConfig,
    /// Station sensor settings
    pub sensors: SensorConfig,
    /// Device identification
    pub device: DeviceConfig,
}

impl Config {
    /// Set timing configuration
    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Set bus configuration
    pub fn with_bus(mut self, bus: BusConfig) -> Self {
        self.bus = bus;
        self
    }

    /// Set sensor configuration
    pub fn with_sensors(mut self, sensors: SensorConfig) -> Self {
        self.sensors = sensors;
        self
    }

    /// Set device configuration
    pub fn with_device(mut self, device: DeviceConfig) -> Self {
        self.device = device;
        self
    }
}

// ============================================================================
// Timing Config
// ============================================================================

/// Control loop timing
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimingConfig {
    /// Delay between control cycles in milliseconds
    pub loop_interval_ms: u32,
    /// Emit a telemetry report every N cycles (0 = never)
    pub telemetry_every_cycles: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            loop_interval_ms: 250,
            telemetry_every_cycles: 4,
        }
    }
}

impl TimingConfig {
    /// Set the control loop interval
    pub fn with_loop_interval_ms(mut self, ms: u32) -> Self {
        self.loop_interval_ms = ms;
        self
    }

    /// Set the telemetry interval in cycles
    pub fn with_telemetry_every_cycles(mut self, cycles: u32) -> Self {
        self.telemetry_every_cycles = cycles;
        self
    }

    /// Telemetry period in milliseconds, if enabled
    pub fn telemetry_period_ms(&self) -> Option<u32> {
        (self.telemetry_every_cycles != 0)
            .then(|| self.loop_interval_ms.saturating_mul(self.telemetry_every_cycles))
    }
}

// ============================================================================
// Bus Config
// ============================================================================

/// Relay expander bus configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BusConfig {
    /// 7-bit I2C address of the SX1509
    pub expander_address: u8,
    /// I2C clock in Hz
    pub i2c_baudrate_hz: u32,
    /// Sweep the relays once at startup before routing
    pub relay_self_test: bool,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            expander_address: DEFAULT_EXPANDER_ADDRESS,
            i2c_baudrate_hz: 100_000,
            relay_self_test: false,
        }
    }
}

impl BusConfig {
    /// Set the expander address
    pub fn with_expander_address(mut self, address: u8) -> Self {
        self.expander_address = address;
        self
    }

    /// Set the I2C clock
    pub fn with_i2c_baudrate_hz(mut self, hz: u32) -> Self {
        self.i2c_baudrate_hz = hz;
        self
    }

    /// Enable or disable the startup relay sweep
    pub fn with_relay_self_test(mut self, enabled: bool) -> Self {
        self.relay_self_test = enabled;
        self
    }
}

// ============================================================================
// Sensor Config
// ============================================================================

/// Station sensor configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorConfig {
    /// Minimum time between two counted arrivals at one station
    pub debounce_ms: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self { debounce_ms: 500 }
    }
}

impl SensorConfig {
    /// Set the debounce window (0 disables it)
    pub fn with_debounce_ms(mut self, ms: u32) -> Self {
        self.debounce_ms = ms;
        self
    }
}

// ============================================================================
// Device Config
// ============================================================================

/// Device identification configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceConfig {
    /// Human-readable device name
    pub name: ShortString,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: short_string("nscale-router"),
        }
    }
}

impl DeviceConfig {
    /// Set the device name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = short_string(name);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
