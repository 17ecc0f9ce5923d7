//! End-to-end routing through the controller and the SX1509 driver

use std::sync::Arc;

use nscale_router::hal::{
    MockI2c, MockMotorPwm, MockThrottleInputs, MockToggles, Sx1509, Sx1509Error,
};
use nscale_router::{
    decide_route, Config, ControllerError, Direction, RelayError, RouteDecision, StationCounters,
    TrackController,
};

const ADDRESS: u8 = 0x3E;

type Controller = TrackController<Sx1509<MockI2c>, MockToggles, MockThrottleInputs, MockMotorPwm>;

fn controller(toggles: [bool; 4], direction: Direction) -> (Controller, Arc<StationCounters>) {
    let counters = Arc::new(StationCounters::default());
    let controller = TrackController::new(
        Sx1509::new(MockI2c::sx1509(ADDRESS), ADDRESS),
        MockToggles::new(toggles),
        MockThrottleInputs::new(direction, 700),
        MockMotorPwm::new(),
        Arc::clone(&counters),
        &Config::default(),
    );
    (controller, counters)
}

/// Fire one sensor edge and run a cycle; edges are spaced past the debounce window.
fn arrive(c: &mut Controller, counters: &StationCounters, station: usize, at_ms: u64) {
    counters.on_station_edge(station, at_ms);
    let report = c.cycle().unwrap();
    assert_eq!(report.arrival.map(|a| a.station), Some(station));
}

#[test]
fn startup_drives_every_relay_low() {
    let (mut c, _) = controller([true; 4], Direction::Forward);
    c.start().unwrap();
    assert_eq!(c.track().switch_relay, [false; 8]);
    assert_eq!(c.relays().bank().data_a(), 0x00);
}

#[test]
fn straight_lap_sets_each_pattern() {
    let (mut c, counters) = controller([true; 4], Direction::Forward);
    c.start().unwrap();

    arrive(&mut c, &counters, 0, 1_000);
    assert_eq!(c.relays().bank().data_a(), 0b0000_0011);

    arrive(&mut c, &counters, 1, 2_000);
    assert_eq!(c.relays().bank().data_a(), 0b0011_0011);

    arrive(&mut c, &counters, 2, 3_000);
    assert_eq!(c.relays().bank().data_a(), 0b1111_0011);

    arrive(&mut c, &counters, 3, 4_000);
    assert_eq!(c.relays().bank().data_a(), 0xFF);
    assert_eq!(c.track().switch_relay, [true; 8]);
    assert_eq!(c.train().current_station, 3);
}

#[test]
fn diverging_lap_sets_each_pattern() {
    let (mut c, counters) = controller([false; 4], Direction::Forward);
    c.start().unwrap();

    arrive(&mut c, &counters, 0, 1_000);
    assert_eq!(
        c.track().switch_relay,
        [false, false, true, false, false, false, false, false]
    );

    arrive(&mut c, &counters, 1, 2_000);
    arrive(&mut c, &counters, 2, 3_000);
    arrive(&mut c, &counters, 3, 4_000);
    assert_eq!(
        c.track().switch_relay,
        [false, false, true, false, false, true, true, false]
    );
    assert_eq!(c.relays().bank().data_a(), 0b0110_0100);
}

#[test]
fn station_one_straight_matches_table() {
    let (mut c, counters) = controller([false, true, false, false], Direction::Forward);
    c.start().unwrap();
    arrive(&mut c, &counters, 1, 1_000);

    let relays = c.track().switch_relay;
    assert!(relays[4]);
    assert!(relays[5]);
    assert_eq!(relays.iter().filter(|&&r| r).count(), 2);
}

#[test]
fn reverse_travel_never_touches_relays() {
    let (mut c, counters) = controller([true; 4], Direction::Reverse);
    c.start().unwrap();

    for (i, station) in [3, 2, 1, 0].into_iter().enumerate() {
        counters.on_station_edge(station, 1_000 * (i as u64 + 1));
        let report = c.cycle().unwrap();
        assert_eq!(
            report.decision,
            Some(RouteDecision::ReverseNotImplemented { station })
        );
    }
    assert_eq!(c.train().current_station, 0);
    assert_eq!(c.track().switch_relay, [false; 8]);
    assert_eq!(c.relays().bank().data_a(), 0x00);
}

#[test]
fn out_of_range_station_is_a_no_op() {
    let (mut c, _) = controller([true; 4], Direction::Forward);
    c.start().unwrap();
    assert_eq!(c.route(4).unwrap(), RouteDecision::StationOutOfRange(4));
    assert_eq!(c.route(usize::MAX).unwrap(), RouteDecision::StationOutOfRange(usize::MAX));
    assert_eq!(c.relays().bank().data_a(), 0x00);
}

#[test]
fn routing_is_deterministic() {
    for station in 0..4 {
        for toggle in [true, false] {
            assert_eq!(
                decide_route(station, Direction::Forward, toggle),
                decide_route(station, Direction::Forward, toggle)
            );
        }
    }
}

#[test]
fn stalled_cycle_routes_the_last_station_passed() {
    let (mut c, counters) = controller([true; 4], Direction::Forward);
    c.start().unwrap();
    arrive(&mut c, &counters, 0, 1_000);

    counters.on_station_edge(1, 2_000);
    counters.on_station_edge(2, 3_000);
    let report = c.cycle().unwrap();
    let arrival = report.arrival.unwrap();
    assert_eq!(arrival.station, 2);
    assert!(arrival.ambiguous);
    assert_eq!(c.train().current_station, 2);
    assert!(c.track().switch_relay[7]);
    assert!(c.track().switch_relay[6]);
}

#[test]
fn missing_expander_is_fatal() {
    let counters = Arc::new(StationCounters::default());
    let mut c = TrackController::new(
        Sx1509::new(MockI2c::sx1509(ADDRESS).absent(), ADDRESS),
        MockToggles::default(),
        MockThrottleInputs::default(),
        MockMotorPwm::new(),
        counters,
        &Config::default(),
    );

    let err = c.start().unwrap_err();
    assert!(matches!(
        err,
        ControllerError::DeviceInit(RelayError::Bus(Sx1509Error::Bus(_)))
    ));
    assert!(!c.is_started());
    assert!(matches!(c.cycle(), Err(ControllerError::NotStarted)));
}

#[test]
fn wrong_address_is_fatal() {
    let counters = Arc::new(StationCounters::default());
    let mut c = TrackController::new(
        Sx1509::new(MockI2c::sx1509(0x3F), ADDRESS),
        MockToggles::default(),
        MockThrottleInputs::default(),
        MockMotorPwm::new(),
        counters,
        &Config::default(),
    );
    assert!(matches!(c.start(), Err(ControllerError::DeviceInit(_))));
}

#[test]
fn self_test_sweep_over_expander() {
    let (mut c, _) = controller([true; 4], Direction::Forward);
    c.start().unwrap();
    c.relay_self_test_step().unwrap();
    c.relay_self_test_step().unwrap();
    assert_eq!(c.relays().bank().data_a(), 0xFF);
    c.relay_self_test_step().unwrap();
    assert_eq!(c.relays().bank().data_a(), 0x00);
}
