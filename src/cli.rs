//! Command-line interface

use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{value_parser, Arg, ArgAction, ArgGroup, ArgMatches, Command};

use crate::config::{ConfigError, Configuration, Mode, DEFAULT_BUS_ID};

/// Builds and returns the CLI argument parser for the logger.
pub fn build_cli() -> Command {
    Command::new("bme280_logger")
        .version(env!("CARGO_PKG_VERSION"))
        .about("BME280 logger. Log temperature, humidity, and pressure to a file.")
        .arg(
            Arg::new("filename")
                .value_name("FILE")
                .help("CSV log file to append measurements to")
                .value_parser(value_parser!(PathBuf))
                .required(true),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("BUS")
                .help("I2C port (bus)")
                .value_parser(value_parser!(u8))
                .default_value("1"),
        )
        .arg(
            Arg::new("address")
                .short('a')
                .long("address")
                .value_name("ADDR")
                .help("I2C address, decimal or 0x/0o/0b prefixed")
                .value_parser(parse_auto_int)
                .default_value("0x76"),
        )
        .arg(
            Arg::new("interval")
                .short('i')
                .long("interval")
                .value_name("SECONDS")
                .help("sample interval in seconds")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("one-shot")
                .long("one-shot")
                .help("take a single sample and exit")
                .action(ArgAction::SetTrue),
        )
        .group(
            ArgGroup::new("mode")
                .args(["interval", "one-shot"])
                .required(true)
                .multiple(false),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("log every sample (debug level)")
                .action(ArgAction::SetTrue),
        )
}

/// Exit status for arguments that could not be turned into a configuration
pub const USAGE_ERROR: u8 = 1;

/// A parsed command line
#[derive(Debug)]
pub struct Invocation {
    pub config: Configuration,
    pub verbose: bool,
}

/// Parse `args` (program name first) into a validated configuration
///
/// Validation failures are reported as clap errors, so they print the same
/// way as malformed arguments do.
pub fn parse_from<I, T>(args: I) -> Result<Invocation, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut command = build_cli();
    let matches = command.try_get_matches_from_mut(args)?;
    let config = configuration_from_matches(&matches)
        .map_err(|e| command.error(ErrorKind::ValueValidation, e))?;
    Ok(Invocation {
        config,
        verbose: matches.get_flag("verbose"),
    })
}

/// Exit status for a clap error: 0 for `--help`/`--version`, otherwise
/// [`USAGE_ERROR`]
pub fn exit_code_for(err: &clap::Error) -> u8 {
    if err.use_stderr() {
        USAGE_ERROR
    } else {
        0
    }
}

/// Parse an integer literal, detecting the base from its prefix
pub fn parse_auto_int(value: &str) -> Result<u16, String> {
    let lower = value.trim().to_ascii_lowercase();
    let (digits, radix) = if let Some(hex) = lower.strip_prefix("0x") {
        (hex, 16)
    } else if let Some(oct) = lower.strip_prefix("0o") {
        (oct, 8)
    } else if let Some(bin) = lower.strip_prefix("0b") {
        (bin, 2)
    } else {
        let unsigned = lower.strip_prefix('+').unwrap_or(lower.as_str());
        if unsigned.starts_with('0') && unsigned.chars().any(|c| c != '0' && c != '_') {
            return Err(format!(
                "invalid integer literal {value:?}: leading zeros need a base prefix"
            ));
        }
        (lower.as_str(), 10)
    };

    if radix != 10 && digits.starts_with(['+', '-']) {
        return Err(format!("invalid integer literal {value:?}: sign after base prefix"));
    }
    let digits = digits.replace('_', "");
    u16::from_str_radix(&digits, radix)
        .map_err(|e| format!("invalid integer literal {value:?}: {e}"))
}

/// Turn parsed arguments into a validated configuration
pub fn configuration_from_matches(matches: &ArgMatches) -> Result<Configuration, ConfigError> {
    let log_path = matches
        .get_one::<PathBuf>("filename")
        .ok_or(ConfigError::MissingArgument("FILE"))?;
    let bus_id = matches.get_one::<u8>("port").copied().unwrap_or(DEFAULT_BUS_ID);
    let address = matches
        .get_one::<u16>("address")
        .copied()
        .ok_or(ConfigError::MissingArgument("--address"))?;

    let mode = match matches.get_one::<f64>("interval") {
        Some(secs) => Mode::continuous(*secs)?,
        None if matches.get_flag("one-shot") => Mode::OneShot,
        None => return Err(ConfigError::MissingArgument("--interval or --one-shot")),
    };

    Configuration::new(log_path.clone(), bus_id, address, mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::time::Duration;

    fn parse(args: &[&str]) -> Result<Configuration, ConfigError> {
        let matches = build_cli()
            .try_get_matches_from(std::iter::once("bme280_logger").chain(args.iter().copied()))
            .expect("arguments should parse");
        configuration_from_matches(&matches)
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["log.csv", "--one-shot"]).unwrap();
        assert_eq!(config.log_path(), Path::new("log.csv"));
        assert_eq!(config.bus_id(), 1);
        assert_eq!(config.device_address(), 0x76);
        assert_eq!(config.mode(), Mode::OneShot);
    }

    #[test]
    fn test_interval_and_address() {
        let config = parse(&["log.csv", "-p", "0", "-a", "0x77", "-i", "2.5"]).unwrap();
        assert_eq!(config.bus_id(), 0);
        assert_eq!(config.device_address(), 0x77);
        assert_eq!(
            config.mode(),
            Mode::Continuous { interval: Duration::from_millis(2500) }
        );
    }

    #[test]
    fn test_mode_is_required_and_exclusive() {
        assert!(build_cli().try_get_matches_from(["bme280_logger", "log.csv"]).is_err());
        assert!(build_cli()
            .try_get_matches_from(["bme280_logger", "log.csv", "-i", "15", "--one-shot"])
            .is_err());
    }

    #[test]
    fn test_out_of_range_address() {
        assert_eq!(
            parse(&["log.csv", "-a", "0x80", "--one-shot"]),
            Err(ConfigError::InvalidAddress(0x80))
        );
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert_eq!(
            parse(&["log.csv", "-i", "0"]),
            Err(ConfigError::InvalidInterval(0.0))
        );
    }

    #[test]
    fn test_usage_errors_exit_with_failure() {
        let cases: [&[&str]; 5] = [
            &["bme280_logger", "log.csv"],
            &["bme280_logger", "log.csv", "-i", "15", "--one-shot"],
            &["bme280_logger", "log.csv", "-a", "zz", "--one-shot"],
            &["bme280_logger", "log.csv", "-i", "0"],
            &["bme280_logger", "log.csv", "-a", "0x80", "--one-shot"],
        ];
        for args in cases {
            let err = parse_from(args.iter().copied()).unwrap_err();
            assert_eq!(exit_code_for(&err), USAGE_ERROR, "{args:?}");
        }
    }

    #[test]
    fn test_validation_failure_is_a_clap_error() {
        let err = parse_from(["bme280_logger", "log.csv", "-i", "0"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        assert!(err.to_string().contains("interval"));
    }

    #[test]
    fn test_help_and_version_exit_cleanly() {
        for flag in ["--help", "--version"] {
            let err = parse_from(["bme280_logger", flag]).unwrap_err();
            assert_eq!(exit_code_for(&err), 0, "{flag}");
        }
    }

    #[test]
    fn test_parse_from_reads_verbose() {
        let invocation = parse_from(["bme280_logger", "log.csv", "--one-shot", "-v"]).unwrap();
        assert!(invocation.verbose);
        assert_eq!(invocation.config.mode(), Mode::OneShot);
    }

    #[test]
    fn test_parse_auto_int() {
        assert_eq!(parse_auto_int("118"), Ok(118));
        assert_eq!(parse_auto_int("0x76"), Ok(0x76));
        assert_eq!(parse_auto_int("0X77"), Ok(0x77));
        assert_eq!(parse_auto_int("0o166"), Ok(0x76));
        assert_eq!(parse_auto_int("0b111_0110"), Ok(0x76));
        assert_eq!(parse_auto_int("0"), Ok(0));
        assert_eq!(parse_auto_int("00"), Ok(0));
        assert_eq!(parse_auto_int("+118"), Ok(118));
        assert!(parse_auto_int("076").is_err());
        assert!(parse_auto_int("0x+76").is_err());
        assert!(parse_auto_int("0b-1").is_err());
        assert!(parse_auto_int("0x").is_err());
        assert!(parse_auto_int("seventy").is_err());
    }
}
