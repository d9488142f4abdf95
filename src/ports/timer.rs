//! Timer port - how the sampling loop waits between scheduled samples

use std::time::Duration;

/// Port for blocking waits
pub trait TimerPort {
    /// Block the calling thread for `duration`
    fn sleep(&mut self, duration: Duration);
}
