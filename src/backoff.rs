//! Randomized exponential backoff.

use rand::Rng;
use std::time::{Duration, Instant};

/// Parameters of an exponential backoff schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    /// Delay before the first retry.
    pub initial_interval: Duration,
    /// Growth factor applied to the interval after every retry.
    pub multiplier: f64,
    /// Each delay is drawn from `interval * (1 ± randomization_factor)`.
    pub randomization_factor: f64,
    /// Upper bound for the (unrandomized) interval.
    pub max_interval: Duration,
    /// Total time after which no further retries are attempted.
    pub max_elapsed_time: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            multiplier: 1.5,
            randomization_factor: 0.5,
            max_interval: Duration::from_secs(60),
            max_elapsed_time: Duration::from_secs(180),
        }
    }
}

impl BackoffPolicy {
    /// Start a fresh schedule; the elapsed-time clock starts now.
    pub fn start(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            policy: *self,
            current: self.initial_interval,
            started: Instant::now(),
        }
    }
}

/// Running state of one backoff schedule.
#[derive(Debug)]
pub struct ExponentialBackoff {
    policy: BackoffPolicy,
    current: Duration,
    started: Instant,
}

impl ExponentialBackoff {
    /// Delay before the next attempt, or `None` once the elapsed budget is spent.
    pub fn next_backoff(&mut self) -> Option<Duration> {
        let delay = randomize(self.current, self.policy.randomization_factor);
        self.current = grow(self.current, self.policy.multiplier, self.policy.max_interval);

        if self.started.elapsed() + delay > self.policy.max_elapsed_time {
            return None;
        }
        Some(delay)
    }
}

fn grow(current: Duration, multiplier: f64, max: Duration) -> Duration {
    let next = current.as_secs_f64() * multiplier;
    if !next.is_finite() || next >= max.as_secs_f64() {
        max
    } else {
        Duration::from_secs_f64(next)
    }
}

fn randomize(interval: Duration, factor: f64) -> Duration {
    let factor = factor.clamp(0.0, 1.0);
    let secs = interval.as_secs_f64();
    let delta = secs * factor;
    if delta <= 0.0 {
        return interval;
    }
    Duration::from_secs_f64(rand::rng().random_range((secs - delta)..=(secs + delta)))
}
