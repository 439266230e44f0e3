use web_time::Instant;

/// The display tops out here; a running stopwatch stops itself once it gets there.
pub const MAX_ELAPSED_SECS: u32 = 999;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Running { started_at: Instant },
    Stopped { elapsed: u32 },
}

/// Whole-second game timer: idle, then running, then stopped.
///
/// Every method that reads the clock has an `_at` variant taking the current instant, which is
/// what the plain variants call with [`Instant::now`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Stopwatch {
    phase: Phase,
}

impl Stopwatch {
    pub const fn new() -> Self {
        Self { phase: Phase::Idle }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running { .. })
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self.phase, Phase::Stopped { .. })
    }

    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    /// Starts timing from `now`. Does nothing while running; a stopped stopwatch starts over.
    pub fn start_at(&mut self, now: Instant) {
        if !self.is_running() {
            self.phase = Phase::Running { started_at: now };
        }
    }

    pub fn stop(&mut self) {
        self.stop_at(Instant::now());
    }

    /// Freezes the elapsed time. Does nothing unless running.
    pub fn stop_at(&mut self, now: Instant) {
        if let Phase::Running { started_at } = self.phase {
            self.phase = Phase::Stopped {
                elapsed: secs_between(started_at, now),
            };
        }
    }

    pub fn elapsed(&mut self) -> u32 {
        self.elapsed_at(Instant::now())
    }

    /// Seconds on the clock: 0 while idle, live while running, frozen once stopped.
    pub fn elapsed_at(&mut self, now: Instant) -> u32 {
        match self.phase {
            Phase::Idle => 0,
            Phase::Running { started_at } => {
                let elapsed = secs_between(started_at, now);
                if elapsed >= MAX_ELAPSED_SECS {
                    log::debug!("Stopwatch reached {}s, stopping", MAX_ELAPSED_SECS);
                    self.phase = Phase::Stopped { elapsed };
                }
                elapsed
            }
            Phase::Stopped { elapsed } => elapsed,
        }
    }

    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

fn secs_between(start: Instant, end: Instant) -> u32 {
    let secs = end.saturating_duration_since(start).as_secs();
    secs.min(MAX_ELAPSED_SECS.into()) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;

    fn secs(value: u64) -> Duration {
        Duration::from_secs(value)
    }

    #[test]
    fn idle_stopwatch_reads_zero() {
        let mut stopwatch = Stopwatch::new();
        let now = Instant::now();

        assert!(stopwatch.is_idle());
        assert_eq!(stopwatch.elapsed_at(now + secs(30)), 0);

        stopwatch.stop_at(now + secs(30));
        assert!(stopwatch.is_idle());
        assert_eq!(stopwatch.elapsed_at(now + secs(30)), 0);
    }

    #[test]
    fn running_stopwatch_counts_whole_seconds() {
        let mut stopwatch = Stopwatch::new();
        let start = Instant::now();
        stopwatch.start_at(start);

        assert!(stopwatch.is_running());
        assert_eq!(stopwatch.elapsed_at(start), 0);
        assert_eq!(stopwatch.elapsed_at(start + Duration::from_millis(1200)), 1);
        assert_eq!(stopwatch.elapsed_at(start + secs(42)), 42);
    }

    #[test]
    fn start_while_running_keeps_first_start() {
        let mut stopwatch = Stopwatch::new();
        let start = Instant::now();
        stopwatch.start_at(start);
        stopwatch.start_at(start + secs(10));

        assert_eq!(stopwatch.elapsed_at(start + secs(15)), 15);
    }

    #[test]
    fn stop_freezes_elapsed_time() {
        let mut stopwatch = Stopwatch::new();
        let start = Instant::now();
        stopwatch.start_at(start);
        stopwatch.stop_at(start + Duration::from_millis(1200));

        assert!(stopwatch.is_stopped());
        assert_eq!(stopwatch.elapsed_at(start + secs(100)), 1);

        // second stop is ignored
        stopwatch.stop_at(start + secs(50));
        assert_eq!(stopwatch.elapsed_at(start + secs(100)), 1);
    }

    #[test]
    fn start_after_stop_begins_again() {
        let mut stopwatch = Stopwatch::new();
        let start = Instant::now();
        stopwatch.start_at(start);
        stopwatch.stop_at(start + secs(5));

        stopwatch.start_at(start + secs(20));
        assert!(stopwatch.is_running());
        assert_eq!(stopwatch.elapsed_at(start + secs(23)), 3);
    }

    #[test]
    fn caps_at_limit_and_stops_itself() {
        let mut stopwatch = Stopwatch::new();
        let start = Instant::now();
        stopwatch.start_at(start);

        assert_eq!(stopwatch.elapsed_at(start + secs(3000)), MAX_ELAPSED_SECS);
        assert!(stopwatch.is_stopped());
        assert_eq!(stopwatch.elapsed_at(start + secs(5000)), MAX_ELAPSED_SECS);
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut stopwatch = Stopwatch::new();
        let start = Instant::now();
        stopwatch.start_at(start);
        stopwatch.reset();

        assert!(stopwatch.is_idle());
        assert_eq!(stopwatch.elapsed_at(start + secs(10)), 0);
    }
}
