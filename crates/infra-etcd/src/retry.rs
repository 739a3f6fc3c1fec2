// Retry policy for store requests
// The resolver never retries; the store client owns this budget
use rand::Rng;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry decision result
#[derive(Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the request after the given delay
    Retry(Duration),
    /// Budget exhausted for this peer
    GiveUp,
}

/// Exponential backoff with ±10% jitter, applied per peer
///
/// delay = base_delay * (backoff_factor ^ (attempt - 1))
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    backoff_factor: f64,
}

impl RetryPolicy {
    /// Create a new retry policy
    ///
    /// # Arguments
    /// * `max_attempts` - Attempts per peer, including the first (at least 1)
    /// * `base_delay` - Delay before the second attempt
    ///
    /// # Example
    /// ```text
    /// let policy = RetryPolicy::new(3, Duration::from_millis(100));
    /// ```
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            backoff_factor: 2.0,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Decide whether to try again after `attempt` (1-based) failed
    pub fn should_retry(&self, attempt: u32) -> RetryDecision {
        if attempt >= self.max_attempts {
            warn!(
                attempt = attempt,
                max_attempts = self.max_attempts,
                "Max retry attempts reached"
            );
            return RetryDecision::GiveUp;
        }

        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let base_ms = self.base_delay.as_millis() as f64 * self.backoff_factor.powi(exponent);

        // ±10% jitter
        let jitter_factor = rand::thread_rng().gen_range(0.9..=1.1);
        let delay = Duration::from_millis((base_ms * jitter_factor) as u64);

        debug!(attempt = attempt, delay_ms = delay.as_millis() as u64, "Scheduling retry");
        RetryDecision::Retry(delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(100))
    }
}
