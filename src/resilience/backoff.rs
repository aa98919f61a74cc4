//! Reconnect backoff policy.

use std::time::Duration;

use crate::config::ReconnectConfig;

/// Capped linear backoff with a hard attempt budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay added per attempt.
    pub step: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Consecutive failed attempts before giving up.
    pub max_attempts: u32,
}

impl ReconnectPolicy {
    pub fn from_config(config: &ReconnectConfig) -> Self {
        Self {
            step: Duration::from_millis(config.step_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            max_attempts: config.max_attempts,
        }
    }

    /// Delay before reconnect attempt `attempt` (1-based).
    ///
    /// Returns `None` once the attempt budget is spent.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt > self.max_attempts {
            return None;
        }
        Some(calculate_backoff(attempt, self.step, self.max_delay))
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::from_config(&ReconnectConfig::default())
    }
}

/// Linear backoff: `min(attempt * step, max)`.
pub fn calculate_backoff(attempt: u32, step: Duration, max: Duration) -> Duration {
    step.saturating_mul(attempt).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_calculation() {
        let step = Duration::from_millis(100);
        let max = Duration::from_millis(3000);

        assert_eq!(calculate_backoff(0, step, max), Duration::ZERO);
        assert_eq!(calculate_backoff(1, step, max).as_millis(), 100);
        assert_eq!(calculate_backoff(7, step, max).as_millis(), 700);
        assert_eq!(calculate_backoff(30, step, max).as_millis(), 3000);
        assert_eq!(calculate_backoff(u32::MAX, step, max).as_millis(), 3000);
    }

    #[test]
    fn test_policy_gives_up_after_budget() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.max_attempts, 20);
        assert_eq!(policy.delay_for(1), Some(Duration::from_millis(100)));
        assert_eq!(policy.delay_for(20), Some(Duration::from_millis(2000)));
        assert_eq!(policy.delay_for(21), None);
    }
}
