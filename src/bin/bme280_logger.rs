//! BME280 Logger CLI
//!
//! This binary runs on a Raspberry Pi and logs temperature, humidity and
//! pressure from a BME280 to a CSV file.
//!
//! ## Usage
//!
//! ```bash
//! # Sample every 15 seconds on /dev/i2c-1, address 0x76
//! bme280_logger measurements.csv --interval 15
//!
//! # Single reading from a sensor at 0x77 on bus 0
//! bme280_logger measurements.csv --port 0 --address 0x77 --one-shot
//!
//! # Log every sample
//! RUST_LOG=debug bme280_logger measurements.csv -i 60
//! ```
//!
//! ## Exit codes
//!
//! - `0` - one-shot reading stored, or `--help`/`--version`
//! - `1` - invalid arguments, bus, calibration or log file error
//! - `2` - sensor access denied while sampling
//! - `3` - gave up after repeated transient sensor failures

use std::error::Error;
use std::process::ExitCode;

use log::{error, info};

use bme280_logger::cli::{self, Invocation};
use bme280_logger::{
    Bme280Sensor, Configuration, CsvLogFile, LoggerError, Mode, RppalBus, RunSummary,
    SamplingController, ThreadTimer,
};

fn main() -> ExitCode {
    let Invocation { config, verbose } = match cli::parse_from(std::env::args_os()) {
        Ok(invocation) => invocation,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(cli::exit_code_for(&e));
        }
    };

    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(config) {
        Ok(summary) => {
            info!(
                "Stopped: {:?}, {} record(s) written",
                summary.termination, summary.records_written
            );
            ExitCode::from(summary.termination.exit_code())
        }
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: Configuration) -> Result<RunSummary, LoggerError> {
    info!("Starting BME280 logger");
    info!("Writing measurements to {}", config.log_path().display());
    info!(
        "I2C port: {}, address: 0x{:02x}",
        config.bus_id(),
        config.device_address()
    );
    match config.mode() {
        Mode::Continuous { interval } => info!("Sample interval: {} s", interval.as_secs_f64()),
        Mode::OneShot => info!("One-shot mode"),
    }

    let bus = RppalBus::open(config.bus_id()).map_err(|source| LoggerError::BusOpen {
        bus: config.bus_id(),
        source,
    })?;
    info!("Opened /dev/i2c-{}", bus.bus_id());
    let sensor = Bme280Sensor::new(bus, config.device_address());
    let store = CsvLogFile::new(config.log_path());

    SamplingController::new(config, sensor, store, ThreadTimer).run()
}

fn report(err: &LoggerError) {
    error!("{}", err);
    let mut source = err.source();
    while let Some(cause) = source {
        error!("  caused by: {}", cause);
        source = cause.source();
    }
}
