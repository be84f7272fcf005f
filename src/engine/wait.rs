use std::time::{Duration, Instant};

use tracing::debug;

pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Time source for the readiness loop.
pub trait Clock {
    /// Time since the clock was created.
    fn elapsed(&self) -> Duration;
    fn sleep(&self, duration: Duration);
}

/// Wall clock backed by `Instant` and `thread::sleep`.
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// How a readiness wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Ready { elapsed: Duration, attempts: u32 },
    TimedOut { elapsed: Duration, attempts: u32 },
}

impl WaitOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, WaitOutcome::Ready { .. })
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            WaitOutcome::Ready { elapsed, .. } | WaitOutcome::TimedOut { elapsed, .. } => *elapsed,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            WaitOutcome::Ready { attempts, .. } | WaitOutcome::TimedOut { attempts, .. } => {
                *attempts
            }
        }
    }
}

/// Block until `probe` succeeds or `timeout_secs` elapse.
///
/// The probe runs on ticks at `interval`, `2 * interval`, ... after the
/// call and is handed the time left before the deadline. A deadline that
/// lands on a tick wins over that tick. Ticks that pass while a slow probe
/// is still running are dropped, so the probe never runs more than once
/// per interval. A probe that returns at or after the deadline counts as
/// a failure, whatever it answered. A timeout of zero or less returns
/// `TimedOut` without probing.
pub fn wait_until_ready<C, P>(
    timeout_secs: i64,
    interval: Duration,
    clock: &C,
    mut probe: P,
) -> WaitOutcome
where
    C: Clock + ?Sized,
    P: FnMut(Duration) -> bool,
{
    let start = clock.elapsed();
    let since_start = || clock.elapsed().saturating_sub(start);

    if timeout_secs <= 0 || interval.is_zero() {
        debug!("Timeout of {timeout_secs}s leaves no time to probe");
        return WaitOutcome::TimedOut {
            elapsed: Duration::ZERO,
            attempts: 0,
        };
    }

    let deadline = Duration::from_secs(timeout_secs as u64);
    let mut next_tick = interval;
    let mut attempts = 0;

    loop {
        let now = since_start();

        if next_tick >= deadline {
            clock.sleep(deadline.saturating_sub(now));
            let elapsed = since_start();
            debug!("Timeout reached after {elapsed:?}");
            return WaitOutcome::TimedOut { elapsed, attempts };
        }

        clock.sleep(next_tick.saturating_sub(now));
        attempts += 1;

        let ready = probe(deadline.saturating_sub(since_start()));
        let now = since_start();

        if now >= deadline {
            debug!("Timeout reached after {now:?}");
            return WaitOutcome::TimedOut {
                elapsed: now,
                attempts,
            };
        }

        if ready {
            debug!("Engine ready after {now:?}");
            return WaitOutcome::Ready {
                elapsed: now,
                attempts,
            };
        }

        debug!("Still waiting... ({now:?} elapsed)");

        next_tick += interval;
        while next_tick <= now {
            next_tick += interval;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    /// Clock that only moves when slept on.
    #[derive(Default)]
    struct ManualClock {
        now: Cell<Duration>,
    }

    impl ManualClock {
        fn advance(&self, by: Duration) {
            self.now.set(self.now.get() + by);
        }
    }

    impl Clock for ManualClock {
        fn elapsed(&self) -> Duration {
            self.now.get()
        }

        fn sleep(&self, duration: Duration) {
            self.advance(duration);
        }
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn non_positive_timeout_never_probes() {
        for timeout in [0, -1, -120] {
            let clock = ManualClock::default();
            let mut calls = 0;
            let outcome = wait_until_ready(timeout, POLL_INTERVAL, &clock, |_| {
                calls += 1;
                true
            });
            assert_eq!(
                outcome,
                WaitOutcome::TimedOut {
                    elapsed: Duration::ZERO,
                    attempts: 0
                }
            );
            assert_eq!(calls, 0);
            assert_eq!(clock.elapsed(), Duration::ZERO);
        }
    }

    #[test]
    fn ready_on_nth_tick_reports_that_time() {
        for n in 1..=5u32 {
            let clock = ManualClock::default();
            let mut calls = 0;
            let outcome = wait_until_ready(120, POLL_INTERVAL, &clock, |_| {
                calls += 1;
                calls == n
            });
            assert_eq!(
                outcome,
                WaitOutcome::Ready {
                    elapsed: POLL_INTERVAL * n,
                    attempts: n
                }
            );
        }
    }

    #[test]
    fn first_probe_waits_one_interval() {
        let clock = ManualClock::default();
        let outcome = wait_until_ready(120, POLL_INTERVAL, &clock, |_| {
            assert_eq!(clock.elapsed(), POLL_INTERVAL);
            true
        });
        assert!(outcome.is_ready());
    }

    #[test]
    fn never_ready_times_out_at_deadline() {
        let clock = ManualClock::default();
        let outcome = wait_until_ready(5, POLL_INTERVAL, &clock, |_| false);
        // Ticks at 2s and 4s; the next one (6s) is past the deadline.
        assert_eq!(
            outcome,
            WaitOutcome::TimedOut {
                elapsed: secs(5),
                attempts: 2
            }
        );
    }

    #[test]
    fn deadline_wins_a_tie_with_a_tick() {
        let clock = ManualClock::default();
        let mut calls = 0;
        let outcome = wait_until_ready(4, POLL_INTERVAL, &clock, |_| {
            calls += 1;
            calls == 2
        });
        assert_eq!(
            outcome,
            WaitOutcome::TimedOut {
                elapsed: secs(4),
                attempts: 1
            }
        );
    }

    #[test]
    fn timeout_shorter_than_interval_never_probes() {
        let clock = ManualClock::default();
        let mut calls = 0;
        let outcome = wait_until_ready(1, POLL_INTERVAL, &clock, |_| {
            calls += 1;
            true
        });
        assert!(!outcome.is_ready());
        assert_eq!(outcome.elapsed(), secs(1));
        assert_eq!(calls, 0);
    }

    #[test]
    fn slow_probe_drops_missed_ticks() {
        let clock = ManualClock::default();
        let mut probe_times = Vec::new();
        let outcome = wait_until_ready(20, POLL_INTERVAL, &clock, |_| {
            probe_times.push(clock.elapsed());
            // Each probe takes 3s, overrunning the next tick.
            clock.advance(secs(3));
            false
        });
        // Probes at 2s (ends 5s), 6s (ends 9s), 10s, 14s; 18s ends 21s.
        assert_eq!(
            probe_times,
            [secs(2), secs(6), secs(10), secs(14), secs(18)]
        );
        for pair in probe_times.windows(2) {
            assert!(pair[1] - pair[0] >= POLL_INTERVAL);
        }
        // The last probe overran the deadline; it fails and the wait ends.
        assert_eq!(
            outcome,
            WaitOutcome::TimedOut {
                elapsed: secs(21),
                attempts: 5
            }
        );
    }

    #[test]
    fn custom_interval_is_respected() {
        let clock = ManualClock::default();
        let outcome = wait_until_ready(1, Duration::from_millis(100), &clock, |_| false);
        assert_eq!(outcome.attempts(), 9);
        assert_eq!(outcome.elapsed(), secs(1));
    }

    #[test]
    fn clock_offset_does_not_leak_into_elapsed() {
        let clock = ManualClock::default();
        clock.advance(secs(1000));
        let outcome = wait_until_ready(10, POLL_INTERVAL, &clock, |_| true);
        assert_eq!(outcome.elapsed(), POLL_INTERVAL);
    }

    #[test]
    fn answer_after_the_deadline_is_a_timeout() {
        let clock = ManualClock::default();
        let outcome = wait_until_ready(5, POLL_INTERVAL, &clock, |_| {
            // A probe that hangs well past the 5s deadline, then succeeds.
            clock.advance(secs(7));
            true
        });
        assert_eq!(
            outcome,
            WaitOutcome::TimedOut {
                elapsed: secs(9),
                attempts: 1
            }
        );
    }

    #[test]
    fn answer_exactly_at_the_deadline_is_a_timeout() {
        let clock = ManualClock::default();
        let outcome = wait_until_ready(4, POLL_INTERVAL, &clock, |budget| {
            clock.advance(budget);
            true
        });
        assert!(!outcome.is_ready());
        assert_eq!(outcome.elapsed(), secs(4));
    }

    #[test]
    fn probe_is_given_the_time_left() {
        let clock = ManualClock::default();
        let mut budgets = Vec::new();
        wait_until_ready(7, POLL_INTERVAL, &clock, |budget| {
            budgets.push(budget);
            false
        });
        assert_eq!(budgets, [secs(5), secs(3), secs(1)]);
    }

    #[test]
    fn system_clock_sleeps() {
        let clock = SystemClock::new();
        let outcome = wait_until_ready(1, Duration::from_millis(20), &clock, |_| true);
        assert!(outcome.is_ready());
        assert!(outcome.elapsed() >= Duration::from_millis(20));
    }
}
