// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Fixed-interval readiness polling.
//!
//! Providers never retry failed API calls on their own. The exception is a
//! backend that accepts a change asynchronously (a job queue, a nameserver sync)
//! and only reports completion later. Those providers poll with [`wait_for`]
//! until the backend says the change is applied or the propagation timeout
//! elapses.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::errors::ProviderError;

/// Poll `check` every `interval` until it returns `Ok(true)` or `timeout` elapses.
///
/// `check` is always called at least once. Transient errors are logged and
/// polling continues; a permanent error ends the wait immediately.
///
/// # Errors
///
/// - [`ProviderError::Timeout`] when the deadline passes first
/// - Any permanent error returned by `check`
pub async fn wait_for<F, Fut>(
    provider: &str,
    action: &str,
    timeout: Duration,
    interval: Duration,
    mut check: F,
) -> Result<(), ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, ProviderError>>,
{
    let start = Instant::now();
    let mut attempt: u32 = 0;
    let mut last_error: Option<ProviderError> = None;

    loop {
        attempt += 1;

        match check().await {
            Ok(true) => {
                debug!(
                    provider = provider,
                    action = action,
                    attempt = attempt,
                    elapsed = ?start.elapsed(),
                    "Backend change applied"
                );
                return Ok(());
            }
            Ok(false) => {}
            Err(e) if e.is_transient() => {
                warn!(
                    provider = provider,
                    action = action,
                    attempt = attempt,
                    error = %e,
                    "Transient error while waiting, will poll again"
                );
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }

        if start.elapsed() + interval > timeout {
            let action = match last_error {
                Some(e) => format!("{action} (last error: {e})"),
                None => action.to_string(),
            };
            return Err(ProviderError::Timeout {
                provider: provider.to_string(),
                action,
                timeout,
            });
        }

        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
#[path = "wait_tests.rs"]
mod wait_tests;
