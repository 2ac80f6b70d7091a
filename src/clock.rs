use std::time::{Duration, Instant};

/// Fixed-rate deadline tracker for the game loop. It never sleeps itself:
/// the loop waits for input with [`Ticker::remaining`] as the timeout, so
/// input and ticks are serviced by the same thread.
#[derive(Debug, Clone)]
pub struct Ticker {
    period: Duration,
    next_due: Instant,
    stopped: bool,
}

impl Ticker {
    pub fn new(period: Duration, now: Instant) -> Self {
        Ticker { period, next_due: now + period, stopped: false }
    }

    /// Schedules the first tick one period from `now` and clears a previous stop.
    pub fn start(&mut self, now: Instant) {
        self.next_due = now + self.period;
        self.stopped = false;
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.next_due.saturating_duration_since(now)
    }

    pub fn is_due(&self, now: Instant) -> bool {
        !self.stopped && now >= self.next_due
    }

    /// Moves the deadline one period on. A loop that fell a whole period
    /// behind is re-anchored on `now` rather than firing a burst of ticks.
    pub fn advance(&mut self, now: Instant) {
        self.next_due += self.period;

        if self.next_due <= now {
            self.next_due = now + self.period;
        }
    }

    /// Pushes the next deadline back by `extra`.
    pub fn delay(&mut self, extra: Duration) {
        self.next_due += extra;
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}
