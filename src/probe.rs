//! Liveness probing of a freshly provisioned instance.
//!
//! The instance is polled at `{host_url}/alive` until it answers with a success
//! status. Failed attempts back off exponentially; the number of attempts is
//! capped, never the wall-clock time.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::errors::ProbeError;

/// Largest shift applied to the base delay, keeping the multiplication in range.
const MAX_SHIFT: u32 = 20;

/// Exponential backoff bounded by an attempt count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffSchedule {
    pub base_delay: Duration,
    pub max_attempts: u32,
}

impl Default for BackoffSchedule {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            max_attempts: 8,
        }
    }
}

impl BackoffSchedule {
    pub fn new(base_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base_delay,
            max_attempts,
        }
    }

    /// Delay to wait after the failed attempt `attempt` (1-based).
    ///
    /// Doubles on every attempt: `base`, `2 * base`, `4 * base`, ...
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(MAX_SHIFT);
        self.base_delay.saturating_mul(1_u32 << shift)
    }

    /// Every delay the schedule can produce, one between each pair of attempts.
    pub fn delays(&self) -> Vec<Duration> {
        (1..self.max_attempts).map(|a| self.delay_after(a)).collect()
    }
}

/// Run `op` until it succeeds or the schedule's attempts are used up.
///
/// `op` receives the 1-based attempt number.
pub async fn retry_with_backoff<F, Fut, T, E>(
    schedule: &BackoffSchedule,
    mut op: F,
) -> Result<T, ProbeError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    if schedule.max_attempts == 0 {
        return Err(ProbeError::NoAttempts);
    }

    let mut attempt = 0;
    loop {
        attempt += 1;
        match op(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    info!(attempt, "Succeeded after retrying");
                }
                return Ok(value);
            }
            Err(e) => {
                if attempt >= schedule.max_attempts {
                    return Err(ProbeError::Exhausted {
                        attempts: attempt,
                        last_error: e.to_string(),
                    });
                }
                let delay = schedule.delay_after(attempt);
                warn!(
                    attempt,
                    max_attempts = schedule.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Attempt failed, backing off"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Polls an instance's `/alive` endpoint.
pub struct LivenessProber {
    client: reqwest::Client,
    url: String,
    schedule: BackoffSchedule,
}

impl LivenessProber {
    pub fn new(host_url: &str, schedule: BackoffSchedule, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            url: format!("{}/alive", host_url.trim_end_matches('/')),
            schedule,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Block until the instance answers, or fail once every attempt is spent.
    pub async fn probe(&self) -> Result<(), ProbeError> {
        info!(url = %self.url, max_attempts = self.schedule.max_attempts, "Probing instance");
        retry_with_backoff(&self.schedule, |attempt| async move {
            debug!(attempt, "GET {}", self.url);
            let response = self
                .client
                .get(&self.url)
                .send()
                .await
                .map_err(|e| e.to_string())?;
            let status = response.status();
            if status.is_success() {
                Ok(())
            } else {
                Err(format!("{} returned status {}", self.url, status.as_u16()))
            }
        })
        .await?;
        info!(url = %self.url, "Instance is alive");
        Ok(())
    }
}
