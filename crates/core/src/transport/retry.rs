use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::warn;
use rand::Rng;
use tokio::time::sleep;

use crate::errors::{is_transient_status, CoreError};

use super::traits::{ApiRequest, ApiResponse, NotionTransport};

const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_BASE_DELAY_MS: u64 = 500;
const DEFAULT_MAX_DELAY_MS: u64 = 8_000;

/// Bounded exponential backoff for transient store failures.
///
/// Transient means: no response at all (timeout, connection error), or
/// HTTP 408, 429 or 5xx. Everything else is returned to the caller on the
/// first attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Add up to 20% random jitter on top of each delay.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry number `retry` (1-based): `base * 2^(retry-1)`,
    /// capped at `max_delay`, plus jitter.
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exp = retry.saturating_sub(1).min(16);
        let base_ms = self.base_delay.as_millis().min(u128::from(u64::MAX)) as u64;
        let max_ms = self.max_delay.as_millis().min(u128::from(u64::MAX)) as u64;
        let backoff = base_ms.saturating_mul(1_u64 << exp).min(max_ms);
        let jitter = if self.jitter && backoff > 0 {
            rand::thread_rng().gen_range(0..=(backoff / 5))
        } else {
            0
        };
        Duration::from_millis(backoff.saturating_add(jitter))
    }
}

/// Send a request, retrying transient failures according to `policy`.
///
/// Returns the first non-transient response (success or not). When retries
/// run out, the last failure becomes `RemoteUnavailable`. The cancel flag is
/// checked before every attempt and every wait.
pub async fn send_with_retry(
    transport: &dyn NotionTransport,
    request: &ApiRequest,
    policy: &RetryPolicy,
    cancel_flag: Option<&AtomicBool>,
) -> Result<ApiResponse, CoreError> {
    let max_attempts = policy.max_attempts();
    let mut attempt = 0u32;

    loop {
        check_cancelled(cancel_flag)?;
        attempt = attempt.saturating_add(1);

        let (failure, hint) = match transport.send(request).await {
            Ok(response) if !is_transient_status(response.status) => return Ok(response),
            Ok(response) => {
                let detail = response.error_body().message;
                (
                    format!("HTTP {} ({})", response.status, detail),
                    response.retry_after,
                )
            }
            Err(err) if err.is_transient() => (err.to_string(), None),
            Err(err) => return Err(err),
        };

        if attempt >= max_attempts {
            return Err(CoreError::RemoteUnavailable(format!(
                "{} {} failed after {attempt} attempt(s): {failure}",
                request.method, request.path
            )));
        }

        let mut delay = policy.delay_for(attempt);
        if let Some(retry_after) = hint {
            delay = delay.max(retry_after.min(policy.max_delay));
        }
        warn!(
            "{} {} failed ({failure}); retry {}/{} in {} ms",
            request.method,
            request.path,
            attempt,
            policy.max_retries,
            delay.as_millis()
        );

        check_cancelled(cancel_flag)?;
        sleep(delay).await;
    }
}

fn check_cancelled(cancel_flag: Option<&AtomicBool>) -> Result<(), CoreError> {
    if cancel_flag.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
        return Err(CoreError::Cancelled);
    }
    Ok(())
}
