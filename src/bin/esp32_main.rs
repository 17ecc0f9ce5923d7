//! ESP32-S3 turnout routing controller.
//!
//! This is the main entry point for the relay board. It runs a 250ms
//! control loop that:
//! - Reads the speed knob and direction switch and drives track PWM
//! - Samples the four route toggles
//! - Turns station sensor interrupts into arrivals
//! - Sets the turnout relays for the segment after each arrival
//! - Prints the telemetry report every fourth cycle
//!
//! # Build
//!
//! ```bash
//! cargo build --release --features esp32 --bin esp32_main
//! espflash flash --monitor target/xtensa-esp32s3-espidf/release/esp32_main
//! ```

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use esp_idf_hal::adc::oneshot::AdcDriver;
use esp_idf_hal::gpio::{AnyIOPin, IOPin, Input, PinDriver, Pull};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::prelude::*;
use nscale_router::hal::esp32::{pins, Esp32MotorPwm, Esp32StationSensors, Esp32ThrottleInputs};
use nscale_router::hal::Sx1509;
use nscale_router::{Config, GpioToggles, StationCounters, TrackController};

/// Pause between relay sweep steps.
const SELF_TEST_STEP_MS: u64 = 100;

fn main() -> anyhow::Result<()> {
    // Initialize ESP-IDF
    esp_idf_hal::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    let config = Config::default();

    println!();
    println!("================================");
    println!("  {}", config.device.name);
    println!("================================");
    println!();

    let peripherals = Peripherals::take()?;

    // =========================================================================
    // Track power (PWM, speed knob, direction switch)
    // =========================================================================
    let motor = Esp32MotorPwm::new(
        peripherals.pins.gpio11,
        peripherals.pins.gpio12,
        peripherals.ledc.timer0,
        peripherals.ledc.channel0,
        peripherals.ledc.channel1,
    )?;
    let adc1 = AdcDriver::new(peripherals.adc1)?;
    let throttle_inputs =
        Esp32ThrottleInputs::new(&adc1, peripherals.pins.gpio1, peripherals.pins.gpio2)?;
    log::info!(
        "track power ready (PWM GPIO{}/{}, knob GPIO{}, direction GPIO{})",
        pins::THROTTLE_OUT_A,
        pins::THROTTLE_OUT_B,
        pins::THROTTLE_IN,
        pins::DIRECTION
    );

    // =========================================================================
    // Route toggles
    // =========================================================================
    let toggles = GpioToggles::new([
        pulled_up(peripherals.pins.gpio15.downgrade())?,
        pulled_up(peripherals.pins.gpio16.downgrade())?,
        pulled_up(peripherals.pins.gpio17.downgrade())?,
        pulled_up(peripherals.pins.gpio18.downgrade())?,
    ]);
    log::info!("route toggles ready (GPIO {:?})", pins::TRACK_TOGGLE);

    // =========================================================================
    // Station sensors (falling edge interrupts)
    // =========================================================================
    let counters = Arc::new(StationCounters::new(config.sensors.debounce_ms));
    let mut sensors = Esp32StationSensors::new(
        [
            peripherals.pins.gpio4.downgrade(),
            peripherals.pins.gpio5.downgrade(),
            peripherals.pins.gpio6.downgrade(),
            peripherals.pins.gpio7.downgrade(),
        ],
        &counters,
    )?;
    log::info!("station sensors armed (GPIO {:?})", pins::TRACK_POS);

    // =========================================================================
    // Relay expander (SX1509 on I2C)
    // =========================================================================
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio8, // SDA
        peripherals.pins.gpio9, // SCL
        &I2cConfig::new().baudrate(config.bus.i2c_baudrate_hz.Hz().into()),
    )?;
    log::info!(
        "i2c ready (SDA GPIO{}, SCL GPIO{})",
        pins::I2C_SDA,
        pins::I2C_SCL
    );
    let relay_bank = Sx1509::new(i2c, config.bus.expander_address);

    let mut controller = TrackController::new(
        relay_bank,
        toggles,
        throttle_inputs,
        motor,
        Arc::clone(&counters),
        &config,
    );

    if let Err(e) = controller.start() {
        log::error!(
            "Failed to communicate with SX1509 at {:#04x}: {}. Check wiring and address.",
            config.bus.expander_address,
            e
        );
        // Fail-stop: no further I/O. Track PWM has been at zero since
        // Esp32MotorPwm::new and no cycle has run.
        loop {
            thread::sleep(Duration::from_secs(1));
        }
    }
    log::info!("relay bank ready at {:#04x}", config.bus.expander_address);

    if config.bus.relay_self_test {
        for _ in 0..3 {
            let level = controller.relay_self_test_step()?;
            log::info!("relay sweep: all {}", level.as_str());
            thread::sleep(Duration::from_millis(SELF_TEST_STEP_MS));
        }
    }

    log::info!(
        "starting control loop ({}ms)",
        config.timing.loop_interval_ms
    );

    // =========================================================================
    // Main Control Loop
    // =========================================================================
    loop {
        thread::sleep(Duration::from_millis(u64::from(
            config.timing.loop_interval_ms,
        )));

        if let Err(e) = sensors.rearm() {
            log::warn!("failed to re-enable sensor interrupts: {:?}", e);
        }

        match controller.cycle() {
            Ok(report) => {
                if let Some(telemetry) = report.telemetry {
                    print!("{}", telemetry);
                }
            }
            Err(e) => log::error!("control cycle failed: {}", e),
        }
    }
}

fn pulled_up(pin: AnyIOPin) -> anyhow::Result<PinDriver<'static, AnyIOPin, Input>> {
    let mut driver = PinDriver::input(pin)?;
    driver.set_pull(Pull::Up)?;
    Ok(driver)
}
