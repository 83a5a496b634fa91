//! Exponential retry backoff for failed jobs.

use chrono::Duration;

const INITIAL_DELAY_SECONDS: i64 = 30;
const MAX_DELAY_SECONDS: i64 = 6 * 60 * 60;

/// The delay a job must sit at `failed` before `retry_count` retries become eligible again.
/// `delay(0) = 30s`, doubling each attempt, capped at 6h (reached around `retry_count = 10`).
#[must_use]
pub fn delay(retry_count: u32) -> Duration {
    let capped_shift = retry_count.min(20);
    let seconds = INITIAL_DELAY_SECONDS.saturating_mul(1i64 << capped_shift);
    Duration::seconds(seconds.min(MAX_DELAY_SECONDS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_thirty_seconds() {
        assert_eq!(delay(0), Duration::seconds(30));
    }

    #[test]
    fn doubles_each_attempt_until_the_cap() {
        assert_eq!(delay(1), Duration::seconds(60));
        assert_eq!(delay(2), Duration::seconds(120));
        assert_eq!(delay(3), Duration::seconds(240));
    }

    #[test]
    fn saturates_at_six_hours() {
        assert_eq!(delay(10), Duration::seconds(MAX_DELAY_SECONDS));
        assert_eq!(delay(11), Duration::seconds(MAX_DELAY_SECONDS));
        assert_eq!(delay(1000), Duration::seconds(MAX_DELAY_SECONDS));
    }

    #[test]
    fn is_monotonically_non_decreasing() {
        let mut previous = delay(0);
        for retry_count in 1..30 {
            let current = delay(retry_count);
            assert!(current >= previous);
            previous = current;
        }
    }
}
