mod config;
#[cfg(target_os = "espidf")]
mod hardware;
#[cfg(not(target_os = "espidf"))]
mod simulation;

use config::Config;
use log::*;

#[cfg(target_os = "espidf")]
#[no_mangle]
pub extern "C" fn __pender() {
    // No-op: the embassy-time-driver feature of esp-idf-svc handles wake-ups,
    // this only satisfies the linker
}

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    use esp_idf_svc::hal::delay::FreeRtos;
    use esp_idf_svc::log::EspLogger;
    use motion::{ActuatorDriver, Shutdown};
    use protection::{ControlLoop, CoverStateMachine, Indicator};
    use sensors::SensorReader;

    // Required for ESP-IDF patches
    esp_idf_svc::sys::link_patches();
    EspLogger::initialize_default();

    let config = Config::load()?;
    let calibration = config.calibration();
    info!("Calibration: {:?}", calibration);

    let board = hardware::Board::take()?;
    let [a_forward, a_reverse, b_forward, b_reverse] = board.motor_lines;

    // Nothing triggers this on the device; the loop runs until power-off
    let shutdown = Shutdown::new();
    let driver = ActuatorDriver::new(
        a_forward,
        a_reverse,
        b_forward,
        b_reverse,
        FreeRtos,
        calibration.timing(),
        shutdown.clone(),
    );

    let mut control = ControlLoop::new(
        SensorReader::new(board.analog, calibration.wind_factor),
        CoverStateMachine::new(driver, calibration),
        Indicator::new(board.indicator),
        FreeRtos,
        shutdown,
    );
    control.run();
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::load()?;
    let calibration = config.calibration();
    info!("Calibration: {:?}", calibration);

    simulation::run(calibration)
}
