//! Thread-sleep timer adapter

use std::thread;
use std::time::Duration;

use crate::ports::timer::TimerPort;

/// Timer that blocks the current thread
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadTimer;

impl TimerPort for ThreadTimer {
    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}
