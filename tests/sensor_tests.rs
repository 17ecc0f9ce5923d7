//! Arrival counters under interrupt-like load, debounce timing and tracking

use std::sync::Arc;
use std::thread;

use nscale_router::hal::MockClock;
use nscale_router::{Clock, Direction, EdgeOutcome, StationCounters, StationTracker};

#[test]
fn counters_are_isolated_per_station() {
    let counters = StationCounters::new(0);
    let edges = [3u32, 0, 7, 1];
    for (station, &n) in edges.iter().enumerate() {
        for _ in 0..n {
            counters.on_station_edge(station, 0);
        }
    }
    assert_eq!(counters.snapshot(), edges);
}

#[test]
fn concurrent_edges_are_never_lost() {
    const EDGES: u32 = 10_000;
    let counters = Arc::new(StationCounters::new(0));

    let handles: Vec<_> = (0..4)
        .map(|station| {
            let counters = Arc::clone(&counters);
            thread::spawn(move || {
                for i in 0..EDGES {
                    counters.on_station_edge(station, u64::from(i));
                }
            })
        })
        .collect();

    // Snapshots taken mid-burst never go backwards
    let mut previous = [0u32; 4];
    for _ in 0..1_000 {
        let snapshot = counters.snapshot();
        for (now, before) in snapshot.iter().zip(previous.iter()) {
            assert!(now >= before);
        }
        previous = snapshot;
    }

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(counters.snapshot(), [EDGES; 4]);
}

#[test]
fn debounce_window_follows_clock() {
    let counters = StationCounters::new(500);
    let mut clock = MockClock::new();
    clock.set(10_000);

    assert_eq!(counters.on_station_edge(2, clock.now_ms()), EdgeOutcome::Counted);
    for _ in 0..4 {
        clock.advance(100);
        assert_eq!(
            counters.on_station_edge(2, clock.now_ms()),
            EdgeOutcome::Debounced
        );
    }
    clock.advance(100);
    assert_eq!(counters.on_station_edge(2, clock.now_ms()), EdgeOutcome::Counted);
    assert_eq!(counters.count(2), Some(2));
}

#[test]
fn debounce_is_per_station() {
    let counters = StationCounters::new(500);
    assert_eq!(counters.on_station_edge(0, 1_000), EdgeOutcome::Counted);
    assert_eq!(counters.on_station_edge(1, 1_010), EdgeOutcome::Counted);
    assert_eq!(counters.snapshot(), [1, 1, 0, 0]);
}

#[test]
fn debounce_survives_timer_wrap() {
    let counters = StationCounters::new(500);
    let near_wrap = u64::from(u32::MAX) - 100;

    assert_eq!(counters.on_station_edge(3, near_wrap), EdgeOutcome::Counted);
    assert_eq!(
        counters.on_station_edge(3, near_wrap + 300),
        EdgeOutcome::Debounced
    );
    assert_eq!(
        counters.on_station_edge(3, near_wrap + 600),
        EdgeOutcome::Counted
    );
}

#[test]
fn tracker_follows_a_forward_lap() {
    let counters = StationCounters::new(0);
    let mut tracker = StationTracker::new();
    let mut current = 0;

    for station in [1, 2, 3, 0, 1] {
        counters.on_station_edge(station, 0);
        let arrival = tracker
            .update(counters.snapshot(), current, Direction::Forward)
            .unwrap();
        assert_eq!(arrival.station, station);
        assert_eq!(arrival.passes, 1);
        assert!(!arrival.ambiguous);
        current = arrival.station;
    }
    assert_eq!(counters.snapshot(), [1, 2, 1, 1]);
}

#[test]
fn tracker_takes_last_station_passed_in_reverse() {
    let counters = StationCounters::new(0);
    let mut tracker = StationTracker::new();

    counters.on_station_edge(3, 0);
    counters.on_station_edge(2, 0);
    let arrival = tracker
        .update(counters.snapshot(), 0, Direction::Reverse)
        .unwrap();
    assert_eq!(arrival.station, 2);
    assert!(arrival.ambiguous);
}

#[test]
fn quiet_cycle_has_no_arrival() {
    let counters = StationCounters::new(0);
    let mut tracker = StationTracker::new();
    counters.on_station_edge(2, 0);
    assert!(tracker
        .update(counters.snapshot(), 0, Direction::Forward)
        .is_some());
    assert!(tracker
        .update(counters.snapshot(), 2, Direction::Forward)
        .is_none());
}
