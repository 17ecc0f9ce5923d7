//! Route decision engine.
//!
//! Maps a station arrival to the two turnout relays that set up the next
//! segment. Each station's toggle is read while the train sits at that
//! station, so the decision always reflects the operator's current intent
//! for the segment ahead.
//!
//! # Track Layout
//!
//! ```text
//!         S2
//! 5 |             | 7
//! --------------------
//! 4 |             | 6
//!   |             |
//! S1|             |S3
//!   |             |
//! 1 |             | 3
//! --------------------
//! 0 |             | 2
//!   |             |
//! S0|             |
//! --------------------
//! ```
//!
//! # Example
//!
//! ```rust
//! use nscale_router::route::{decide_route, RouteDecision};
//! use nscale_router::{Direction, Level};
//!
//! let decision = decide_route(0, Direction::Forward, false);
//! let RouteDecision::Apply(pattern) = decision else { panic!() };
//! assert_eq!(pattern.level_of(0), Some(Level::Low));
//! assert_eq!(pattern.level_of(2), Some(Level::High));
//! ```

use core::fmt;

use crate::traits::{Direction, Level, RELAY_COUNT, STATION_COUNT};

/// Operator intent at a station, taken from its toggle switch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RouteIntent {
    /// Continue straight on to the next station.
    Straight,
    /// Take the diverging route and stay on the same track.
    Diverge,
}

impl RouteIntent {
    /// Toggle HIGH means straight.
    #[inline]
    pub const fn from_toggle(toggle: bool) -> Self {
        if toggle {
            RouteIntent::Straight
        } else {
            RouteIntent::Diverge
        }
    }

    const fn index(self) -> usize {
        match self {
            RouteIntent::Straight => 0,
            RouteIntent::Diverge => 1,
        }
    }
}

/// A single relay write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelayCommand {
    /// Relay channel on the expander (0..8).
    pub relay: u8,
    /// Level to drive.
    pub level: Level,
}

impl RelayCommand {
    const fn high(relay: u8) -> Self {
        Self {
            relay,
            level: Level::High,
        }
    }

    const fn low(relay: u8) -> Self {
        Self {
            relay,
            level: Level::Low,
        }
    }
}

/// The pair of relay levels a station exit requires.
///
/// Relays not named in the pattern are "don't care" and keep whatever was
/// last commanded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelayPattern(pub [RelayCommand; 2]);

impl RelayPattern {
    /// The commands in write order.
    #[inline]
    pub fn commands(&self) -> &[RelayCommand; 2] {
        &self.0
    }

    /// Level this pattern requires on `relay`, or `None` if it doesn't care.
    pub fn level_of(&self, relay: u8) -> Option<Level> {
        self.0.iter().find(|c| c.relay == relay).map(|c| c.level)
    }

    /// Apply to an in-memory relay image, leaving other relays untouched.
    pub fn apply_to(&self, relays: &mut [bool; RELAY_COUNT]) {
        for cmd in &self.0 {
            if let Some(slot) = relays.get_mut(cmd.relay as usize) {
                *slot = cmd.level.is_high();
            }
        }
    }
}

impl fmt::Display for RelayPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b] = &self.0;
        write!(
            f,
            "relay{}={}, relay{}={}",
            a.relay,
            a.level.as_str(),
            b.relay,
            b.level.as_str()
        )
    }
}

/// Station × intent → relay pattern, forward direction.
pub const ROUTE_TABLE: [[RelayPattern; 2]; STATION_COUNT] = [
    [
        RelayPattern([RelayCommand::high(0), RelayCommand::high(1)]),
        RelayPattern([RelayCommand::low(0), RelayCommand::high(2)]),
    ],
    [
        RelayPattern([RelayCommand::high(4), RelayCommand::high(5)]),
        RelayPattern([RelayCommand::low(4), RelayCommand::high(6)]),
    ],
    [
        RelayPattern([RelayCommand::high(7), RelayCommand::high(6)]),
        RelayPattern([RelayCommand::low(7), RelayCommand::high(5)]),
    ],
    [
        RelayPattern([RelayCommand::high(3), RelayCommand::high(2)]),
        RelayPattern([RelayCommand::low(3), RelayCommand::low(1)]),
    ],
];

/// Outcome of a routing decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteDecision {
    /// Write this pattern to the relay bank.
    Apply(RelayPattern),
    /// Station index outside the loop. Nothing to do.
    StationOutOfRange(usize),
    /// Reverse routing has no table yet. No relay may change.
    ReverseNotImplemented {
        /// Station the train was at.
        station: usize,
    },
}

impl RouteDecision {
    /// The pattern to apply, if any.
    pub fn pattern(&self) -> Option<&RelayPattern> {
        match self {
            RouteDecision::Apply(p) => Some(p),
            _ => None,
        }
    }
}

/// Look up the relay pattern for a train at `station` heading `direction`.
///
/// `toggle` is the route toggle of that same station. Pure and constant
/// time; never indexes the table out of range.
pub fn decide_route(station: usize, direction: Direction, toggle: bool) -> RouteDecision {
    let Some(row) = ROUTE_TABLE.get(station) else {
        return RouteDecision::StationOutOfRange(station);
    };
    match direction {
        Direction::Forward => RouteDecision::Apply(row[RouteIntent::from_toggle(toggle).index()]),
        Direction::Reverse => RouteDecision::ReverseNotImplemented { station },
    }
}

/// Human-readable summary of where a forward route leads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteSummary {
    /// Station the train is at.
    pub station: usize,
    /// Chosen intent.
    pub intent: RouteIntent,
}

impl fmt::Display for RouteSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.intent {
            RouteIntent::Straight => write!(
                f,
                "Train at station {}, heading towards station {}",
                self.station,
                (self.station + 1) % STATION_COUNT
            ),
            RouteIntent::Diverge => write!(
                f,
                "Train at station {}, remaining on the same track",
                self.station
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(station: usize, toggle: bool) -> RelayPattern {
        match decide_route(station, Direction::Forward, toggle) {
            RouteDecision::Apply(p) => p,
            other => panic!("expected pattern, got {:?}", other),
        }
    }

    #[test]
    fn straight_routes_match_table() {
        let expected = [(0, 1), (4, 5), (7, 6), (3, 2)];
        for (station, (a, b)) in expected.into_iter().enumerate() {
            let p = apply(station, true);
            assert_eq!(p.level_of(a), Some(Level::High), "station {}", station);
            assert_eq!(p.level_of(b), Some(Level::High), "station {}", station);
        }
    }

    #[test]
    fn diverge_routes_match_table() {
        let expected = [
            (0, Level::Low, 2, Level::High),
            (4, Level::Low, 6, Level::High),
            (7, Level::Low, 5, Level::High),
            (3, Level::Low, 1, Level::Low),
        ];
        for (station, (a, la, b, lb)) in expected.into_iter().enumerate() {
            let p = apply(station, false);
            assert_eq!(p.level_of(a), Some(la), "station {}", station);
            assert_eq!(p.level_of(b), Some(lb), "station {}", station);
        }
    }

    #[test]
    fn pattern_only_touches_its_two_relays() {
        for station in 0..STATION_COUNT {
            for toggle in [true, false] {
                let p = apply(station, toggle);
                let mut relays = [true, false, true, false, true, false, true, false];
                let before = relays;
                p.apply_to(&mut relays);
                for i in 0..RELAY_COUNT as u8 {
                    if p.level_of(i).is_none() {
                        assert_eq!(relays[i as usize], before[i as usize]);
                    }
                }
            }
        }
    }

    #[test]
    fn reverse_is_explicitly_unimplemented() {
        for station in 0..STATION_COUNT {
            for toggle in [true, false] {
                assert_eq!(
                    decide_route(station, Direction::Reverse, toggle),
                    RouteDecision::ReverseNotImplemented { station }
                );
            }
        }
    }

    #[test]
    fn out_of_range_station_is_noop() {
        for station in [4, 5, 100, usize::MAX] {
            let d = decide_route(station, Direction::Forward, true);
            assert_eq!(d, RouteDecision::StationOutOfRange(station));
            assert!(d.pattern().is_none());
        }
    }

    #[test]
    fn pattern_display() {
        let p = apply(0, false);
        let mut s: heapless::String<64> = heapless::String::new();
        core::fmt::write(&mut s, format_args!("{}", p)).unwrap();
        assert_eq!(s.as_str(), "relay0=LOW, relay2=HIGH");
    }

    #[test]
    fn summary_wraps_to_station_zero() {
        let mut s: heapless::String<64> = heapless::String::new();
        let summary = RouteSummary {
            station: 3,
            intent: RouteIntent::Straight,
        };
        core::fmt::write(&mut s, format_args!("{}", summary)).unwrap();
        assert_eq!(s.as_str(), "Train at station 3, heading towards station 0");
    }
}
