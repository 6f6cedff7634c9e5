//! State-change waiter (exponential backoff)
//!
//! Remote resources are provisioned asynchronously: the API call returns
//! while the resource is still `Creating` or `Deleting`. The waiter polls a
//! refresh function until the reported state reaches a target, the deadline
//! passes, or the caller cancels.

use crate::error::{CloudError, Result};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep, timeout_at};
use tokio_util::sync::CancellationToken;

const DEFAULT_NOT_FOUND_CHECKS: u32 = 20;

/// Outcome of a single refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation<T> {
    /// The resource exists and reports `state`
    Found { value: T, state: String },
    /// The remote API does not know the resource (yet, or any more)
    NotFound,
}

impl<T> Observation<T> {
    pub fn found(value: T, state: impl Into<String>) -> Self {
        Observation::Found {
            value,
            state: state.into(),
        }
    }
}

/// Poll interval schedule
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffConfig {
    /// Delay before the second refresh, and the floor for every delay
    pub min_interval: Duration,

    /// Upper bound for any delay
    pub max_interval: Duration,

    /// Growth factor per attempt
    pub multiplier: f64,

    /// Proportional jitter (0.1 = ±10%)
    pub jitter: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(10),
            multiplier: 2.0,
            jitter: 0.1,
        }
    }
}

impl BackoffConfig {
    /// Un-jittered delay for the given attempt (0-based)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let min = self.min_interval.as_secs_f64();
        let max = self.max_interval.max(self.min_interval).as_secs_f64();
        let base = min * self.multiplier.powi(attempt.min(32) as i32);
        Duration::from_secs_f64(base.clamp(min, max))
    }

    /// Delay for the given attempt with jitter applied, kept within bounds
    pub fn next_delay(&self, attempt: u32) -> Duration {
        let delay = self.delay_for_attempt(attempt);
        if self.jitter <= 0.0 {
            return delay;
        }

        let min = self.min_interval.as_secs_f64();
        let max = self.max_interval.max(self.min_interval).as_secs_f64();
        let spread = delay.as_secs_f64() * self.jitter;
        let offset = rand::thread_rng().gen_range(-spread..=spread);
        Duration::from_secs_f64((delay.as_secs_f64() + offset).clamp(min, max))
    }
}

/// Parameters of a state-change wait
#[derive(Debug, Clone)]
pub struct StateChangeConf {
    /// Human readable subject used in errors and logs
    pub description: String,

    /// States that mean "keep waiting"
    pub pending: Vec<String>,

    /// States that mean "done"
    pub target: Vec<String>,

    /// Overall deadline for the wait
    pub timeout: Duration,

    /// Consecutive not-found refreshes tolerated before giving up
    pub not_found_checks: u32,

    /// Consecutive target observations required before succeeding
    pub continuous_target_occurrence: u32,

    /// Whether not-found ends the wait successfully (deletion waits)
    pub not_found_is_target: bool,

    pub backoff: BackoffConfig,
}

impl StateChangeConf {
    pub fn new<P, T>(description: impl Into<String>, pending: P, target: T, timeout: Duration) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        Self {
            description: description.into(),
            pending: pending.into_iter().map(Into::into).collect(),
            target: target.into_iter().map(Into::into).collect(),
            timeout,
            not_found_checks: DEFAULT_NOT_FOUND_CHECKS,
            continuous_target_occurrence: 1,
            not_found_is_target: false,
            backoff: BackoffConfig::default(),
        }
    }

    pub fn with_not_found_checks(mut self, checks: u32) -> Self {
        self.not_found_checks = checks;
        self
    }

    pub fn with_continuous_target_occurrence(mut self, occurrence: u32) -> Self {
        self.continuous_target_occurrence = occurrence;
        self
    }

    pub fn with_not_found_as_target(mut self) -> Self {
        self.not_found_is_target = true;
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    /// Poll `refresh` until the resource reaches a target state.
    ///
    /// Returns the value of the last refresh, or `None` when the wait ended
    /// because the resource was not found and that counts as target.
    /// Errors from `refresh` abort the wait and are returned unchanged.
    pub async fn wait_for_state<T, F, Fut>(
        &self,
        cancel: &CancellationToken,
        mut refresh: F,
    ) -> Result<Option<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Observation<T>>>,
    {
        let deadline = Instant::now() + self.timeout;
        let mut last_state: Option<String> = None;

        let outcome = {
            let poll = self.poll(&mut refresh, &mut last_state);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                res = timeout_at(deadline, poll) => Some(res),
            }
        };

        match outcome {
            None => {
                tracing::debug!("Wait for {} cancelled", self.description);
                Err(CloudError::Cancelled(self.description.clone()))
            }
            Some(Ok(result)) => result,
            Some(Err(_elapsed)) => Err(CloudError::Timeout {
                what: self.description.clone(),
                last_state: last_state.unwrap_or_else(|| "none".to_string()),
            }),
        }
    }

    async fn poll<T, F, Fut>(
        &self,
        refresh: &mut F,
        last_state: &mut Option<String>,
    ) -> Result<Option<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Observation<T>>>,
    {
        let required = self.continuous_target_occurrence.max(1);
        let mut attempt: u32 = 0;
        let mut not_found_ticks: u32 = 0;
        let mut target_hits: u32 = 0;

        loop {
            if attempt > 0 {
                let delay = self.backoff.next_delay(attempt - 1);
                tracing::debug!(
                    "Waiting {:?} before refreshing {} (attempt {})",
                    delay,
                    self.description,
                    attempt + 1
                );
                sleep(delay).await;
            }
            attempt = attempt.saturating_add(1);

            match refresh().await? {
                Observation::NotFound => {
                    target_hits = 0;
                    if self.not_found_is_target {
                        tracing::debug!("{}: not found, treating as done", self.description);
                        return Ok(None);
                    }

                    not_found_ticks += 1;
                    if not_found_ticks > self.not_found_checks {
                        return Err(CloudError::Timeout {
                            what: format!(
                                "{} (not found after {} checks)",
                                self.description, not_found_ticks
                            ),
                            last_state: last_state
                                .clone()
                                .unwrap_or_else(|| "not found".to_string()),
                        });
                    }
                }
                Observation::Found { value, state } => {
                    not_found_ticks = 0;
                    *last_state = Some(state.clone());

                    if self.target.contains(&state) {
                        target_hits += 1;
                        tracing::debug!(
                            "{}: state {} ({}/{})",
                            self.description,
                            state,
                            target_hits,
                            required
                        );
                        if target_hits >= required {
                            return Ok(Some(value));
                        }
                    } else if self.pending.contains(&state) {
                        target_hits = 0;
                        tracing::debug!("{}: still {}", self.description, state);
                    } else {
                        return Err(CloudError::UnexpectedState {
                            state,
                            expected: self.target.join(", "),
                        });
                    }
                }
            }
        }
    }
}
