//! # nscale-router
//!
//! Turnout routing controller for a closed N-scale loop with four stations
//! and eight relay-driven turnouts.
//!
//! ## Features
//!
//! - **Route decisions**: a data table maps (station, direction, toggle) to
//!   the two relays that set the next segment
//! - **Position tracking**: interrupt-safe arrival counters with debounce,
//!   turned into the train's current station once per cycle
//! - **Relay driver**: SX1509 I/O expander over any `embedded-hal` I2C bus,
//!   with a known-safe all-LOW startup
//! - **Throttle**: direction flag and speed knob to two PWM channels
//! - **Telemetry**: the three-record serial report, allocation free
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Hardware abstractions
//! - `route` - Routing table and decision function
//! - `sensors` - Arrival counters and station tracking
//! - `toggles` / `relays` / `throttle` - Component drivers
//! - `controller` - The control loop context tying them together
//! - `hal` - Concrete implementations (mock for testing, esp32 for hardware)
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use nscale_router::{Config, Direction, StationCounters, TrackController};
//! use nscale_router::hal::{MockMotorPwm, MockRelayBank, MockThrottleInputs, MockToggles};
//!
//! let counters = Arc::new(StationCounters::new(500));
//! let mut controller = TrackController::new(
//!     MockRelayBank::new(),
//!     MockToggles::default(),
//!     MockThrottleInputs::new(Direction::Forward, 700),
//!     MockMotorPwm::new(),
//!     Arc::clone(&counters),
//!     &Config::default(),
//! );
//! controller.start().unwrap();
//!
//! // From the sensor interrupt
//! counters.on_station_edge(2, 1_000);
//!
//! // Main loop, every 250ms
//! let report = controller.cycle().unwrap();
//! if let Some(telemetry) = report.telemetry {
//!     print!("{}", telemetry);
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Control loop context.
pub mod controller;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Turnout relay driver.
pub mod relays;
/// Route decision engine.
pub mod route;
/// Station arrival counters and position tracking.
pub mod sensors;
/// Train and track state records.
pub mod state;
/// Serial telemetry report.
pub mod telemetry;
/// Throttle controller.
pub mod throttle;
/// Route toggle reader.
pub mod toggles;
/// Core traits for hardware abstraction.
pub mod traits;

/// Shared configuration system for desktop and ESP32.
pub mod config;

// Re-exports for convenience
pub use controller::{ControllerError, CycleReport, TrackController};
pub use relays::{RelayDriver, RelayError};
pub use route::{decide_route, RelayCommand, RelayPattern, RouteDecision, RouteIntent};
pub use sensors::{Arrival, EdgeOutcome, StationCounters, StationTracker};
pub use state::{TrackState, TrainState};
pub use telemetry::{TelemetryReport, TelemetrySchedule};
pub use throttle::{Throttle, ThrottleOutput};
pub use toggles::{GpioToggles, ToggleReader};
pub use traits::{
    Clock, Direction, Level, MotorPwm, RelayBank, ThrottleInputs, ToggleInputs, MAX_THROTTLE,
    RELAY_COUNT, STATION_COUNT,
};

// Config re-exports
pub use config::{BusConfig, Config, DeviceConfig, SensorConfig, TimingConfig};
