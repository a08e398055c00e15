//! Timer source abstraction

/// Periodic tick source owned by the round.
///
/// The round calls `start_ticking` when a round begins or resumes and `stop`
/// at reveal, pause or restart. The host delivers each tick by calling
/// `RoundStateMachine::tick`. Both calls must be idempotent: a second start
/// must not create a second interval and a second stop must not fail.
pub trait TimerSource {
    fn start_ticking(&mut self, interval_secs: u32);
    fn stop(&mut self);
}

/// Host-driven timer that only tracks whether it is running.
///
/// For hosts that already own a clock (a game loop, a test) and call
/// `tick()` themselves.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ManualTimer {
    running: bool,
    interval_secs: u32,
    starts: usize,
    stops: usize,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn interval_secs(&self) -> u32 {
        self.interval_secs
    }

    /// Times the timer went from stopped to running
    pub fn start_count(&self) -> usize {
        self.starts
    }

    /// Times the timer went from running to stopped
    pub fn stop_count(&self) -> usize {
        self.stops
    }
}

impl TimerSource for ManualTimer {
    fn start_ticking(&mut self, interval_secs: u32) {
        self.interval_secs = interval_secs;
        if !self.running {
            self.running = true;
            self.starts += 1;
        }
    }

    fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.stops += 1;
        }
    }
}
