//! Sampling controller - the sample/store/sleep/retry state machine
//!
//! ```text
//! Sampling ── success, continuous ──▶ Sleeping ── interval ──▶ Sampling
//! Sampling ── success, one-shot ────▶ Done(Completed)
//! Sampling ── permission denied ────▶ Done(PermissionDenied)
//! Sampling ── transient, budget left ▶ WaitingToRetry ─────────▶ Sampling
//! Sampling ── transient, budget spent ▶ Done(RetriesExhausted)
//! ```
//!
//! The retry budget belongs to the controller, not to one sample: it is set
//! once at construction and successful samples do not refill it.

use std::time::Duration;

use log::{debug, error, info, warn};

use crate::config::{Configuration, Mode};
use crate::domain::Reading;
use crate::error::LoggerError;
use crate::ports::sensor::{FailureKind, SensorError, SensorPort};
use crate::ports::storage::{StorageError, StoragePort};
use crate::ports::timer::TimerPort;

/// Transient failures tolerated over one controller lifetime
pub const DEFAULT_RETRY_BUDGET: u8 = 3;

/// Bounded counter of transient failures still tolerated
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryBudget {
    remaining: u8,
}

impl RetryBudget {
    pub const fn new(attempts: u8) -> Self {
        Self { remaining: attempts }
    }

    pub const fn remaining(&self) -> u8 {
        self.remaining
    }

    /// Spend one unit; `true` if another attempt is still allowed
    pub fn consume(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining > 0
    }
}

impl Default for RetryBudget {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_BUDGET)
    }
}

/// Why a run stopped
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// One-shot run stored its reading
    Completed,
    /// The sensor refused access; never retried
    PermissionDenied,
    /// The retry budget ran out on transient failures
    RetriesExhausted,
}

impl Termination {
    /// Process exit status for a run that stopped this way
    ///
    /// Codes 0 and 1 are shared with usage and startup errors; stops caused
    /// by the sensor use codes of their own.
    pub const fn exit_code(self) -> u8 {
        match self {
            Termination::Completed => 0,
            Termination::PermissionDenied => 2,
            Termination::RetriesExhausted => 3,
        }
    }
}

/// Controller state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Sampling,
    WaitingToRetry,
    Sleeping,
    Done(Termination),
}

/// Result of one sample, tagged for the transition function
#[derive(Debug)]
pub enum SampleOutcome<T> {
    Success(Reading<T>),
    PermissionDenied(SensorError),
    Transient(SensorError),
}

impl<T> From<Result<Reading<T>, SensorError>> for SampleOutcome<T> {
    fn from(result: Result<Reading<T>, SensorError>) -> Self {
        match result {
            Ok(reading) => SampleOutcome::Success(reading),
            Err(e) => match e.kind() {
                FailureKind::PermissionDenied => SampleOutcome::PermissionDenied(e),
                FailureKind::Transient => SampleOutcome::Transient(e),
            },
        }
    }
}

/// Classified outcome of a sampling iteration, after any storage side effect
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The reading was appended to the log
    Recorded,
    PermissionDenied,
    Transient,
}

/// Transition out of `Sampling`
pub fn advance(mode: Mode, budget: &mut RetryBudget, outcome: Outcome) -> State {
    match outcome {
        Outcome::Recorded => match mode {
            Mode::OneShot => State::Done(Termination::Completed),
            Mode::Continuous { .. } => State::Sleeping,
        },
        Outcome::PermissionDenied => State::Done(Termination::PermissionDenied),
        Outcome::Transient => {
            if budget.consume() {
                State::WaitingToRetry
            } else {
                State::Done(Termination::RetriesExhausted)
            }
        }
    }
}

/// What a finished run did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub termination: Termination,
    pub records_written: u64,
    pub retries_remaining: u8,
}

/// Drives sensor, store and timer through the sampling state machine
pub struct SamplingController<S, L, T> {
    config: Configuration,
    sensor: S,
    store: L,
    timer: T,
    budget: RetryBudget,
    records_written: u64,
}

impl<S, L, T> SamplingController<S, L, T>
where
    S: SensorPort,
    L: StoragePort,
    T: TimerPort,
{
    pub fn new(config: Configuration, sensor: S, store: L, timer: T) -> Self {
        Self::with_budget(config, sensor, store, timer, RetryBudget::default())
    }

    pub fn with_budget(
        config: Configuration,
        sensor: S,
        store: L,
        timer: T,
        budget: RetryBudget,
    ) -> Self {
        Self {
            config,
            sensor,
            store,
            timer,
            budget,
            records_written: 0,
        }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn store(&self) -> &L {
        &self.store
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Load calibration, ensure the log header, then sample until a
    /// terminal state is reached
    ///
    /// Storage failures are not part of the state machine and end the run
    /// with an error; records appended before the failure stay on disk.
    pub fn run(&mut self) -> Result<RunSummary, LoggerError> {
        info!("Loading calibration parameters");
        let calibration = self
            .sensor
            .load_calibration()
            .map_err(LoggerError::Calibration)?;
        debug!("Loaded calibration parameters from the device: {:?}", calibration);

        self.store.ensure_header()?;

        info!("Starting sampling");
        let mut state = State::Sampling;
        loop {
            state = match state {
                State::Sampling => {
                    let outcome = SampleOutcome::from(self.sensor.sample(&calibration));
                    self.handle(outcome)?
                }
                State::WaitingToRetry => State::Sampling,
                State::Sleeping => {
                    self.timer.sleep(self.interval());
                    State::Sampling
                }
                State::Done(termination) => {
                    return Ok(RunSummary {
                        termination,
                        records_written: self.records_written,
                        retries_remaining: self.budget.remaining(),
                    });
                }
            };
        }
    }

    fn handle(&mut self, outcome: SampleOutcome<S::Timestamp>) -> Result<State, StorageError> {
        let mode = self.config.mode();
        let classified = match outcome {
            SampleOutcome::Success(reading) => {
                debug!(
                    "Acquired sample: {} {:?} °C {:?} % {:?} hPa",
                    reading.timestamp, reading.temperature, reading.humidity, reading.pressure
                );
                self.store.append(&reading)?;
                self.records_written += 1;
                Outcome::Recorded
            }
            SampleOutcome::PermissionDenied(e) => {
                error!("Sensor access denied, stopping: {}", e);
                Outcome::PermissionDenied
            }
            SampleOutcome::Transient(e) => {
                warn!("Sample failed: {}", e);
                Outcome::Transient
            }
        };

        let next = advance(mode, &mut self.budget, classified);
        match next {
            State::WaitingToRetry => {
                warn!("Retrying immediately ({} retries left)", self.budget.remaining())
            }
            State::Done(Termination::RetriesExhausted) => {
                error!("Giving up after exhausting the retry budget")
            }
            _ => {}
        }
        Ok(next)
    }

    fn interval(&self) -> Duration {
        match self.config.mode() {
            Mode::Continuous { interval } => interval,
            Mode::OneShot => Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn continuous() -> Mode {
        Mode::continuous(15.0).unwrap()
    }

    #[test]
    fn test_budget_counts_down() {
        let mut budget = RetryBudget::default();
        assert!(budget.consume());
        assert!(budget.consume());
        assert!(!budget.consume());
        assert_eq!(budget.remaining(), 0);
        assert!(!budget.consume());
    }

    #[test]
    fn test_recorded_transitions() {
        let mut budget = RetryBudget::default();
        assert_eq!(
            advance(Mode::OneShot, &mut budget, Outcome::Recorded),
            State::Done(Termination::Completed)
        );
        assert_eq!(advance(continuous(), &mut budget, Outcome::Recorded), State::Sleeping);
        assert_eq!(budget.remaining(), DEFAULT_RETRY_BUDGET);
    }

    #[test]
    fn test_permission_denied_ignores_budget() {
        let mut budget = RetryBudget::default();
        assert_eq!(
            advance(continuous(), &mut budget, Outcome::PermissionDenied),
            State::Done(Termination::PermissionDenied)
        );
        assert_eq!(budget.remaining(), DEFAULT_RETRY_BUDGET);
    }

    #[test]
    fn test_third_transient_failure_ends_run() {
        let mut budget = RetryBudget::default();
        assert_eq!(advance(continuous(), &mut budget, Outcome::Transient), State::WaitingToRetry);
        assert_eq!(advance(continuous(), &mut budget, Outcome::Transient), State::WaitingToRetry);
        assert_eq!(
            advance(continuous(), &mut budget, Outcome::Transient),
            State::Done(Termination::RetriesExhausted)
        );
    }

    #[test]
    fn test_success_does_not_refill_budget() {
        let mut budget = RetryBudget::default();
        advance(continuous(), &mut budget, Outcome::Transient);
        advance(continuous(), &mut budget, Outcome::Recorded);
        advance(continuous(), &mut budget, Outcome::Transient);
        assert_eq!(
            advance(continuous(), &mut budget, Outcome::Transient),
            State::Done(Termination::RetriesExhausted)
        );
    }

    #[test]
    fn test_one_shot_transient_retries() {
        let mut budget = RetryBudget::default();
        assert_eq!(advance(Mode::OneShot, &mut budget, Outcome::Transient), State::WaitingToRetry);
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        assert_eq!(Termination::Completed.exit_code(), 0);
        assert_eq!(Termination::PermissionDenied.exit_code(), 2);
        assert_eq!(Termination::RetriesExhausted.exit_code(), 3);
    }

    #[test]
    fn test_outcome_tagging() {
        use crate::ports::bus::BusError;
        use std::io;

        let ok: SampleOutcome<u64> = Ok(Reading::new(0, 20.0, 40.0, 1000.0)).into();
        assert!(matches!(ok, SampleOutcome::Success(_)));

        let denied: SampleOutcome<u64> = Err(SensorError::from(BusError::from_io(
            io::Error::from(io::ErrorKind::PermissionDenied),
        )))
        .into();
        assert!(matches!(denied, SampleOutcome::PermissionDenied(_)));

        let busy: SampleOutcome<u64> = Err(SensorError::NotReady).into();
        assert!(matches!(busy, SampleOutcome::Transient(_)));
    }
}
