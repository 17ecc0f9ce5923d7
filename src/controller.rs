//! The control loop context.
//!
//! [`TrackController`] owns every piece of state the loop touches: the train
//! and track records, the relay driver, the toggle reader, the throttle and
//! the arrival tracker. The only thing it shares is the
//! [`StationCounters`] handle, which the sensor edge handlers write to.
//!
//! # Cycle
//!
//! Each call to [`cycle`](TrackController::cycle):
//!
//! 1. Updates the throttle (direction and speed)
//! 2. Samples the route toggles
//! 3. Snapshots the arrival counters and updates the current station
//! 4. Routes the turnouts if the train arrived somewhere, or if the toggle
//!    at the station it is sitting at changed. A route whose relay writes
//!    failed part way is retried every cycle until it completes
//! 5. Decides whether this cycle emits telemetry
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use nscale_router::{Config, Direction, StationCounters, TrackController};
//! use nscale_router::hal::{MockMotorPwm, MockRelayBank, MockThrottleInputs, MockToggles};
//!
//! let counters = Arc::new(StationCounters::new(0));
//! let mut controller = TrackController::new(
//!     MockRelayBank::new(),
//!     MockToggles::new([true; 4]),
//!     MockThrottleInputs::new(Direction::Forward, 512),
//!     MockMotorPwm::new(),
//!     Arc::clone(&counters),
//!     &Config::default(),
//! );
//! controller.start().unwrap();
//!
//! counters.on_station_edge(1, 0);
//! let report = controller.cycle().unwrap();
//! assert_eq!(report.arrival.map(|a| a.station), Some(1));
//! assert!(controller.track().switch_relay[4]);
//! ```

extern crate alloc;
use alloc::sync::Arc;

use crate::config::Config;
use crate::relays::{RelayDriver, RelayError};
use crate::route::{decide_route, RouteDecision, RouteIntent, RouteSummary};
use crate::sensors::{Arrival, StationCounters, StationTracker};
use crate::state::{TrackState, TrainState};
use crate::telemetry::{TelemetryReport, TelemetrySchedule};
use crate::throttle::{Throttle, ThrottleOutput};
use crate::toggles::ToggleReader;
use crate::traits::{Level, MotorPwm, RelayBank, ThrottleInputs, ToggleInputs};

/// Controller errors.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError<R: core::fmt::Debug, M: core::fmt::Debug> {
    /// Relay bank bring-up failed. Terminal: the controller must not route.
    #[error("device initialization failed: {0}")]
    DeviceInit(RelayError<R>),
    /// `cycle` called before a successful `start`.
    #[error("controller not started")]
    NotStarted,
    /// A relay write failed after startup.
    #[error("relay error: {0}")]
    Relay(RelayError<R>),
    /// The motor PWM failed.
    #[error("motor error: {0:?}")]
    Motor(M),
}

/// Error type of a controller built on bank `B` and motor `M`.
pub type ControllerErrorFor<B, M> =
    ControllerError<<B as RelayBank>::Error, <M as MotorPwm>::Error>;

/// What happened in one control cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CycleReport {
    /// Throttle output applied this cycle.
    pub throttle: ThrottleOutput,
    /// Arrival detected this cycle.
    pub arrival: Option<Arrival>,
    /// Routing decision taken this cycle.
    pub decision: Option<RouteDecision>,
    /// Telemetry to emit, on reporting cycles.
    pub telemetry: Option<TelemetryReport>,
}

/// Turnout routing controller.
pub struct TrackController<B, T, I, M>
where
    B: RelayBank,
    T: ToggleInputs,
    I: ThrottleInputs,
    M: MotorPwm,
{
    relays: RelayDriver<B>,
    toggles: ToggleReader<T>,
    throttle: Throttle<I, M>,
    counters: Arc<StationCounters>,
    tracker: StationTracker,
    telemetry: TelemetrySchedule,
    train: TrainState,
    track: TrackState,
    located: bool,
    started: bool,
    pending: Option<usize>,
}

impl<B, T, I, M> TrackController<B, T, I, M>
where
    B: RelayBank,
    T: ToggleInputs,
    I: ThrottleInputs,
    M: MotorPwm,
{
    /// Assemble a controller. No hardware is touched until [`start`](Self::start).
    ///
    /// The counters' debounce window is set from `config.sensors`.
    pub fn new(
        relay_bank: B,
        toggles: T,
        throttle_inputs: I,
        motor: M,
        counters: Arc<StationCounters>,
        config: &Config,
    ) -> Self {
        counters.set_debounce_ms(config.sensors.debounce_ms);
        let tracker = StationTracker::new();
        Self {
            relays: RelayDriver::new(relay_bank),
            toggles: ToggleReader::new(toggles),
            throttle: Throttle::new(throttle_inputs, motor),
            counters,
            tracker,
            telemetry: TelemetrySchedule::new(config.timing.telemetry_every_cycles),
            train: TrainState::default(),
            track: TrackState::default(),
            located: false,
            started: false,
            pending: None,
        }
    }

    /// Bring up the relay bank and drive every relay LOW.
    ///
    /// Any failure is returned as [`ControllerError::DeviceInit`] and the
    /// controller stays unusable.
    pub fn start(&mut self) -> Result<(), ControllerErrorFor<B, M>> {
        self.relays.init().map_err(ControllerError::DeviceInit)?;
        self.track.switch_relay = self.relays.states();
        self.started = true;
        Ok(())
    }

    /// Station whose route failed part way and is retried next cycle.
    #[inline]
    pub fn pending_route(&self) -> Option<usize> {
        self.pending
    }

    /// Whether [`start`](Self::start) succeeded.
    #[inline]
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Run one control cycle.
    pub fn cycle(&mut self) -> Result<CycleReport, ControllerErrorFor<B, M>> {
        if !self.started {
            return Err(ControllerError::NotStarted);
        }

        let throttle = self.throttle.update().map_err(ControllerError::Motor)?;
        self.train.current_direction = throttle.direction;
        self.train.current_speed = throttle.speed_percent;

        let previous_toggle = self.track.toggle;
        self.track.toggle = self.toggles.sample();

        let snapshot = self.counters.snapshot();
        let arrival = self.tracker.update(
            snapshot,
            self.train.current_station,
            self.train.current_direction,
        );

        let target = if let Some(arrival) = arrival {
            self.train.current_station = arrival.station;
            self.located = true;
            Some(arrival.station)
        } else {
            let station = self.train.current_station;
            let toggle_changed = previous_toggle.get(station) != self.track.toggle.get(station);
            if self.located && toggle_changed {
                log::info!("toggle {} changed while train at station", station);
                Some(station)
            } else if let Some(station) = self.pending {
                log::warn!("retrying route for station {}", station);
                Some(station)
            } else {
                None
            }
        };

        // A route stays pending until both relays of its pair are written
        let decision = match target {
            Some(station) => {
                self.pending = Some(station);
                let decision = self.route(station)?;
                self.pending = None;
                Some(decision)
            }
            None => None,
        };

        let telemetry = self.telemetry.tick().then(|| self.report_with(snapshot));

        Ok(CycleReport {
            throttle,
            arrival,
            decision,
            telemetry,
        })
    }

    /// Route the turnouts for a train at `station` using the current
    /// direction and that station's last sampled toggle.
    ///
    /// Out-of-range stations and reverse travel leave every relay alone.
    pub fn route(&mut self, station: usize) -> Result<RouteDecision, ControllerErrorFor<B, M>> {
        if !self.started {
            return Err(ControllerError::NotStarted);
        }
        let toggle = self.track.toggle.get(station).copied().unwrap_or(true);
        let decision = decide_route(station, self.train.current_direction, toggle);

        match &decision {
            RouteDecision::Apply(pattern) => {
                let summary = RouteSummary {
                    station,
                    intent: RouteIntent::from_toggle(toggle),
                };
                log::info!("{}", summary);
                log::info!("{}", pattern);
                let applied = self.relays.apply_pattern(pattern);
                self.track.switch_relay = self.relays.states();
                applied.map_err(ControllerError::Relay)?;
            }
            RouteDecision::ReverseNotImplemented { station } => {
                log::warn!(
                    "reverse routing not implemented, relays unchanged at station {}",
                    station
                );
            }
            RouteDecision::StationOutOfRange(station) => {
                log::warn!("no route for station {}, ignoring", station);
            }
        }
        Ok(decision)
    }

    /// One step of the relay bench sweep (see [`RelayDriver::self_test_step`]).
    pub fn relay_self_test_step(&mut self) -> Result<Level, ControllerErrorFor<B, M>> {
        if !self.started {
            return Err(ControllerError::NotStarted);
        }
        let level = self.relays.self_test_step();
        self.track.switch_relay = self.relays.states();
        level.map_err(ControllerError::Relay)
    }

    /// Cut track power.
    pub fn stop_motor(&mut self) -> Result<(), ControllerErrorFor<B, M>> {
        self.throttle.stop().map_err(ControllerError::Motor)
    }

    /// Telemetry view of the current state.
    pub fn telemetry_report(&self) -> TelemetryReport {
        self.report_with(self.counters.snapshot())
    }

    fn report_with(&self, station_count: [u32; 4]) -> TelemetryReport {
        TelemetryReport {
            train: self.train,
            track: self.track,
            station_count,
        }
    }

    /// Train record.
    pub fn train(&self) -> &TrainState {
        &self.train
    }

    /// Track record.
    pub fn track(&self) -> &TrackState {
        &self.track
    }

    /// Shared arrival counters.
    pub fn counters(&self) -> &Arc<StationCounters> {
        &self.counters
    }

    /// Relay driver (read-only).
    pub fn relays(&self) -> &RelayDriver<B> {
        &self.relays
    }

    /// Toggle reader, for flipping mock switches in tests.
    pub fn toggles_mut(&mut self) -> &mut ToggleReader<T> {
        &mut self.toggles
    }

    /// Throttle, for driving mock inputs in tests.
    pub fn throttle_mut(&mut self) -> &mut Throttle<I, M> {
        &mut self.throttle
    }
}
