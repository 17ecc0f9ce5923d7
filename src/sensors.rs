//! Station position sensors.
//!
//! Each station has a pull-up biased sensor that produces a falling edge when
//! the train passes. The edge handler runs outside the main loop (a GPIO
//! interrupt on hardware), so the only state it touches is
//! [`StationCounters`], which is lock-free and safe to share through a
//! `static` or an `Arc`.
//!
//! The main loop never reads the counters one by one. It takes a
//! [`snapshot`](StationCounters::snapshot) and hands it to a
//! [`StationTracker`], which turns counter movement into arrivals.
//!
//! # Example
//!
//! ```rust
//! use nscale_router::sensors::{EdgeOutcome, StationCounters, StationTracker};
//! use nscale_router::Direction;
//!
//! static COUNTERS: StationCounters = StationCounters::new(500);
//!
//! // Interrupt context
//! assert_eq!(COUNTERS.on_station_edge(1, 1_000), EdgeOutcome::Counted);
//! assert_eq!(COUNTERS.on_station_edge(1, 1_010), EdgeOutcome::Debounced);
//!
//! // Main loop
//! let mut tracker = StationTracker::new();
//! let arrival = tracker.update(COUNTERS.snapshot(), 0, Direction::Forward).unwrap();
//! assert_eq!(arrival.station, 1);
//! ```

use core::sync::atomic::{AtomicU32, Ordering};

use crate::traits::{Direction, STATION_COUNT};

/// Re-read limit when taking a snapshot while edges keep arriving.
const SNAPSHOT_RETRIES: usize = 4;

/// What the edge handler did with an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeOutcome {
    /// Counter incremented.
    Counted,
    /// Edge arrived inside the debounce window and was dropped.
    Debounced,
    /// No such station. Ignored.
    UnknownStation,
}

/// Per-station arrival counters shared with the edge handlers.
///
/// Counters only ever go up (wrapping at `u32::MAX`).
#[derive(Debug)]
pub struct StationCounters {
    counts: [AtomicU32; STATION_COUNT],
    last_edge_ms: [AtomicU32; STATION_COUNT],
    debounce_ms: AtomicU32,
}

impl StationCounters {
    /// Create zeroed counters with a minimum inter-arrival time per station.
    ///
    /// A `debounce_ms` of 0 counts every edge.
    pub const fn new(debounce_ms: u32) -> Self {
        Self {
            counts: [
                AtomicU32::new(0),
                AtomicU32::new(0),
                AtomicU32::new(0),
                AtomicU32::new(0),
            ],
            last_edge_ms: [
                AtomicU32::new(0),
                AtomicU32::new(0),
                AtomicU32::new(0),
                AtomicU32::new(0),
            ],
            debounce_ms: AtomicU32::new(debounce_ms),
        }
    }

    /// Change the debounce window.
    pub fn set_debounce_ms(&self, debounce_ms: u32) {
        self.debounce_ms.store(debounce_ms, Ordering::Relaxed);
    }

    /// Current debounce window in milliseconds.
    pub fn debounce_ms(&self) -> u32 {
        self.debounce_ms.load(Ordering::Relaxed)
    }

    /// Record a falling edge on `station`'s sensor at `now_ms`.
    ///
    /// Interrupt safe: no locks, no allocation, no logging. One handler per
    /// station pin, so the load/store pair on `last_edge_ms` never races
    /// with itself.
    pub fn on_station_edge(&self, station: usize, now_ms: u64) -> EdgeOutcome {
        let (Some(count), Some(last)) = (self.counts.get(station), self.last_edge_ms.get(station))
        else {
            return EdgeOutcome::UnknownStation;
        };

        // Timestamps are kept as wrapping 32-bit milliseconds.
        let now = now_ms as u32;
        let window = self.debounce_ms.load(Ordering::Relaxed);
        if window > 0
            && count.load(Ordering::Acquire) > 0
            && now.wrapping_sub(last.load(Ordering::Relaxed)) < window
        {
            return EdgeOutcome::Debounced;
        }

        last.store(now, Ordering::Relaxed);
        count.fetch_add(1, Ordering::Release);
        EdgeOutcome::Counted
    }

    /// Counter for one station, or `None` out of range.
    pub fn count(&self, station: usize) -> Option<u32> {
        self.counts.get(station).map(|c| c.load(Ordering::Acquire))
    }

    /// Read all four counters as one consistent set.
    ///
    /// Reads twice and accepts when both passes agree. If edges keep landing
    /// the last pass is returned; it is still a valid lower bound because
    /// counters never go backwards.
    pub fn snapshot(&self) -> [u32; STATION_COUNT] {
        let mut previous = self.read_once();
        for _ in 0..SNAPSHOT_RETRIES {
            let current = self.read_once();
            if current == previous {
                return current;
            }
            previous = current;
        }
        previous
    }

    fn read_once(&self) -> [u32; STATION_COUNT] {
        core::array::from_fn(|i| self.counts[i].load(Ordering::Acquire))
    }
}

impl Default for StationCounters {
    fn default() -> Self {
        Self::new(0)
    }
}

/// A detected arrival.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Arrival {
    /// Station the train reached.
    pub station: usize,
    /// How far that station's counter moved since the last cycle.
    pub passes: u32,
    /// True when more than one station advanced in the same cycle.
    pub ambiguous: bool,
}

/// Turns counter snapshots into the train's current station.
///
/// The station whose counter advanced becomes the current station. If more
/// than one advanced since the last cycle (a stalled loop), the train passed
/// them all in order, so the one farthest ahead of the current station in
/// the direction of travel wins. An advance at the current station itself
/// only wins when it is the only one.
#[derive(Clone, Debug, Default)]
pub struct StationTracker {
    last: [u32; STATION_COUNT],
}

impl StationTracker {
    /// Tracker that has seen no arrivals.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last snapshot the tracker consumed.
    pub fn last_snapshot(&self) -> [u32; STATION_COUNT] {
        self.last
    }

    /// Consume a snapshot and report the arrival it implies, if any.
    pub fn update(
        &mut self,
        snapshot: [u32; STATION_COUNT],
        current_station: usize,
        direction: Direction,
    ) -> Option<Arrival> {
        let mut best: Option<(usize, usize, u32)> = None;
        let mut advanced = 0;

        for (station, (&now, &before)) in snapshot.iter().zip(self.last.iter()).enumerate() {
            let passes = now.wrapping_sub(before);
            if passes == 0 {
                continue;
            }
            advanced += 1;
            let distance = distance_ahead(current_station, station, direction);
            if best.map_or(true, |(_, d, _)| distance > d) {
                best = Some((station, distance, passes));
            }
        }
        self.last = snapshot;

        let (station, _, passes) = best?;
        let ambiguous = advanced > 1;
        if ambiguous {
            log::warn!(
                "{} stations advanced in one cycle, taking station {}",
                advanced,
                station
            );
        }
        if passes > 1 {
            log::warn!("station {} counted {} passes in one cycle", station, passes);
        }
        Some(Arrival {
            station,
            passes,
            ambiguous,
        })
    }
}

/// Stations travelled from `from` to reach `to`, within one lap.
fn distance_ahead(from: usize, to: usize, direction: Direction) -> usize {
    let from = from % STATION_COUNT;
    match direction {
        Direction::Forward => (to + STATION_COUNT - from) % STATION_COUNT,
        Direction::Reverse => (from + STATION_COUNT - to) % STATION_COUNT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_count_per_station() {
        let counters = StationCounters::new(0);
        for i in 0..5 {
            assert_eq!(counters.on_station_edge(2, i), EdgeOutcome::Counted);
        }
        assert_eq!(counters.snapshot(), [0, 0, 5, 0]);
    }

    #[test]
    fn unknown_station_ignored() {
        let counters = StationCounters::new(0);
        assert_eq!(counters.on_station_edge(4, 0), EdgeOutcome::UnknownStation);
        assert_eq!(counters.snapshot(), [0; 4]);
        assert_eq!(counters.count(9), None);
    }

    #[test]
    fn debounce_window_drops_bounce() {
        let counters = StationCounters::new(500);
        assert_eq!(counters.on_station_edge(0, 10_000), EdgeOutcome::Counted);
        assert_eq!(counters.on_station_edge(0, 10_001), EdgeOutcome::Debounced);
        assert_eq!(counters.on_station_edge(0, 10_499), EdgeOutcome::Debounced);
        assert_eq!(counters.on_station_edge(0, 10_500), EdgeOutcome::Counted);
        assert_eq!(counters.count(0), Some(2));
    }

    #[test]
    fn debounce_is_per_station() {
        let counters = StationCounters::new(500);
        counters.on_station_edge(0, 100);
        assert_eq!(counters.on_station_edge(1, 101), EdgeOutcome::Counted);
    }

    #[test]
    fn first_edge_at_time_zero_counts() {
        let counters = StationCounters::new(500);
        assert_eq!(counters.on_station_edge(3, 0), EdgeOutcome::Counted);
    }

    #[test]
    fn debounce_survives_timer_wrap() {
        let counters = StationCounters::new(500);
        let near_wrap = u32::MAX as u64 - 100;
        counters.on_station_edge(0, near_wrap);
        // 200ms later, after the 32-bit millisecond counter wrapped
        assert_eq!(
            counters.on_station_edge(0, near_wrap + 200),
            EdgeOutcome::Debounced
        );
    }

    #[test]
    fn tracker_reports_single_arrival() {
        let mut tracker = StationTracker::new();
        let arrival = tracker.update([0, 1, 0, 0], 0, Direction::Forward).unwrap();
        assert_eq!(arrival.station, 1);
        assert_eq!(arrival.passes, 1);
        assert!(!arrival.ambiguous);
        assert_eq!(tracker.update([0, 1, 0, 0], 1, Direction::Forward), None);
    }

    #[test]
    fn tracker_prefers_farthest_ahead() {
        let mut tracker = StationTracker::new();
        let arrival = tracker.update([0, 0, 1, 1], 1, Direction::Forward).unwrap();
        assert_eq!(arrival.station, 3);
        assert!(arrival.ambiguous);

        let mut tracker = StationTracker::new();
        let arrival = tracker.update([1, 0, 0, 1], 1, Direction::Reverse).unwrap();
        assert_eq!(arrival.station, 3);
    }

    #[test]
    fn tracker_stalled_loop_takes_last_station_passed() {
        let mut tracker = StationTracker::new();
        let arrival = tracker.update([0, 1, 1, 0], 0, Direction::Forward).unwrap();
        assert_eq!(arrival.station, 2);
    }

    #[test]
    fn tracker_same_station_only_when_alone() {
        let mut tracker = StationTracker::new();
        let arrival = tracker.update([1, 1, 0, 0], 0, Direction::Forward).unwrap();
        assert_eq!(arrival.station, 1);

        let mut tracker = StationTracker::new();
        let arrival = tracker.update([1, 0, 0, 0], 0, Direction::Forward).unwrap();
        assert_eq!(arrival.station, 0);
    }

    #[test]
    fn distance_ahead_both_directions() {
        assert_eq!(distance_ahead(0, 1, Direction::Forward), 1);
        assert_eq!(distance_ahead(3, 0, Direction::Forward), 1);
        assert_eq!(distance_ahead(0, 3, Direction::Reverse), 1);
        assert_eq!(distance_ahead(2, 2, Direction::Reverse), 0);
    }
}
