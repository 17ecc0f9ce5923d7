//! Train and track state owned by the control loop.

use crate::traits::{Direction, RELAY_COUNT, STATION_COUNT};

/// Where the train is and how it is being driven.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TrainState {
    /// Station the train last arrived at, 0..4.
    pub current_station: usize,
    /// Direction from the throttle flag.
    pub current_direction: Direction,
    /// Throttle speed, 0..=100.
    pub current_speed: u8,
}

/// Toggle inputs and relay outputs as last seen by the control loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TrackState {
    /// Operator intent per station (`true` = straight).
    pub toggle: [bool; STATION_COUNT],
    /// Commanded relay levels (`true` = energized).
    pub switch_relay: [bool; RELAY_COUNT],
}
