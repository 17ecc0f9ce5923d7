//! Serial telemetry report.
//!
//! Every few control cycles the controller prints three JSON records, one per
//! line, in a fixed field order that downstream tools parse:
//!
//! ```text
//! {"currentStation": 1, "currentDirection": 1, "currentSpeed": 42}
//! {"trackToggle": [1, 0, 1, 1], "trackSwitch": [0, 0, 0, 0, 1, 1, 0, 0]}
//! {"stationCount": [3, 3, 2, 2]}
//! ```
//!
//! Booleans are written as `0`/`1` and direction as `1`/`-1`. Rendering uses
//! `heapless::String`, so no allocation is needed.

use core::fmt::{self, Write};

use heapless::String as HString;

use crate::state::{TrackState, TrainState};
use crate::traits::STATION_COUNT;

/// Capacity of a rendered report (all three lines).
pub const REPORT_CAPACITY: usize = 256;

/// A rendered report.
pub type ReportString = HString<REPORT_CAPACITY>;

/// Read-only view of the controller state for one report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TelemetryReport {
    /// Train record.
    pub train: TrainState,
    /// Track record.
    pub track: TrackState,
    /// Arrival counters.
    pub station_count: [u32; STATION_COUNT],
}

impl TelemetryReport {
    /// Render all three lines, each terminated by `\n`.
    pub fn render(&self) -> Result<ReportString, fmt::Error> {
        let mut out = ReportString::new();
        write!(out, "{}", self)?;
        Ok(out)
    }
}

impl fmt::Display for TelemetryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{{\"currentStation\": {}, \"currentDirection\": {}, \"currentSpeed\": {}}}",
            self.train.current_station,
            self.train.current_direction.telemetry_code(),
            self.train.current_speed
        )?;

        f.write_str("{\"trackToggle\": ")?;
        write_list(f, self.track.toggle.iter().map(|&b| u32::from(b)))?;
        f.write_str(", \"trackSwitch\": ")?;
        write_list(f, self.track.switch_relay.iter().map(|&b| u32::from(b)))?;
        f.write_str("}\n")?;

        f.write_str("{\"stationCount\": ")?;
        write_list(f, self.station_count.iter().copied())?;
        f.write_str("}\n")
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: impl Iterator<Item = u32>) -> fmt::Result {
    f.write_char('[')?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    f.write_char(']')
}

/// Decides which control cycles emit a report.
///
/// Reports on the first cycle and then every `every_cycles` cycles.
/// An interval of 0 disables reporting.
#[derive(Clone, Debug)]
pub struct TelemetrySchedule {
    every_cycles: u32,
    cycle: u32,
}

impl TelemetrySchedule {
    /// Schedule reporting every `every_cycles` cycles.
    pub fn new(every_cycles: u32) -> Self {
        Self {
            every_cycles,
            cycle: 0,
        }
    }

    /// Advance one cycle; returns true if this cycle should report.
    pub fn tick(&mut self) -> bool {
        let due = self.every_cycles != 0 && self.cycle % self.every_cycles == 0;
        self.cycle = self.cycle.wrapping_add(1);
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Direction;

    fn sample() -> TelemetryReport {
        TelemetryReport {
            train: TrainState {
                current_station: 1,
                current_direction: Direction::Reverse,
                current_speed: 42,
            },
            track: TrackState {
                toggle: [true, false, true, true],
                switch_relay: [false, false, false, false, true, true, false, false],
            },
            station_count: [3, 3, 2, 2],
        }
    }

    #[test]
    fn renders_three_lines_in_order() {
        let out = sample().render().unwrap();
        let mut lines = out.as_str().lines();
        assert_eq!(
            lines.next(),
            Some("{\"currentStation\": 1, \"currentDirection\": -1, \"currentSpeed\": 42}")
        );
        assert_eq!(
            lines.next(),
            Some("{\"trackToggle\": [1, 0, 1, 1], \"trackSwitch\": [0, 0, 0, 0, 1, 1, 0, 0]}")
        );
        assert_eq!(lines.next(), Some("{\"stationCount\": [3, 3, 2, 2]}"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn worst_case_fits_capacity() {
        let mut report = sample();
        report.station_count = [u32::MAX; STATION_COUNT];
        report.train.current_station = usize::MAX;
        assert!(report.render().is_ok());
    }

    #[test]
    fn lines_are_json() {
        let out = sample().render().unwrap();
        for line in out.as_str().lines() {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(value.is_object());
        }
    }

    #[test]
    fn schedule_every_four() {
        let mut schedule = TelemetrySchedule::new(4);
        let due: heapless::Vec<bool, 9> = (0..9).map(|_| schedule.tick()).collect();
        assert_eq!(
            due.as_slice(),
            &[true, false, false, false, true, false, false, false, true]
        );
    }

    #[test]
    fn schedule_zero_disables() {
        let mut schedule = TelemetrySchedule::new(0);
        assert!((0..10).all(|_| !schedule.tick()));
    }
}
