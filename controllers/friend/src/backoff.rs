//! # Fibonacci Backoff
//!
//! Retry delays for objects whose reconcile failed.
//! The delay grows along the Fibonacci sequence, which rises more slowly than
//! exponential backoff, and is capped at a configured maximum.
//!
//! With min = 1s and max = 300s the delays for failures 1, 2, 3, ... are:
//! 1s, 2s, 3s, 5s, 8s, 13s, ... 233s, 300s (max).

use std::time::Duration;

/// Fibonacci backoff calculator
///
/// Stateless: the caller passes the number of consecutive failures of an
/// object, which the controller context tracks per object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FibonacciBackoff {
    /// Delay for the first two failures
    min: Duration,
    /// Upper bound for any delay
    max: Duration,
}

impl FibonacciBackoff {
    /// Create a backoff starting at `min` and capped at `max`.
    ///
    /// A `max` below `min` is raised to `min`.
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max: max.max(min),
        }
    }

    /// Delay before retry number `failures` (1 for the first failure).
    ///
    /// Failures 0 and 1 both map to `min`; after that each delay is the sum of
    /// the previous two, capped at `max`.
    #[must_use]
    pub fn delay_for(&self, failures: u32) -> Duration {
        if failures <= 1 {
            return self.min;
        }

        let mut prev = self.min;
        let mut current = self.min;
        for _ in 2..=failures {
            let next = prev.saturating_add(current);
            prev = current;
            current = next.min(self.max);

            if current >= self.max {
                break;
            }
        }

        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_fibonacci_backoff_sequence() {
        let backoff = FibonacciBackoff::new(secs(1), secs(300));

        let delays: Vec<u64> = (1..=8).map(|n| backoff.delay_for(n).as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 3, 5, 8, 13, 21, 34]);
        assert_eq!(backoff.delay_for(0), secs(1));
    }

    #[test]
    fn test_fibonacci_backoff_max_cap() {
        let backoff = FibonacciBackoff::new(secs(60), secs(600));

        // 60, 120, 180, 300, 480, then 780 capped to 600
        assert_eq!(backoff.delay_for(5), secs(480));
        assert_eq!(backoff.delay_for(6), secs(600));
        // Should stay at max
        assert_eq!(backoff.delay_for(50), secs(600));
        assert_eq!(backoff.delay_for(u32::MAX), secs(600));
    }

    #[test]
    fn test_max_below_min_is_raised() {
        let backoff = FibonacciBackoff::new(secs(10), secs(1));
        assert_eq!(backoff.delay_for(1), secs(10));
        assert_eq!(backoff.delay_for(4), secs(10));
    }
}
