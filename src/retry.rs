//! Retry with jittered exponential backoff, shared by the HTTP clients.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Backoff {
    /// Total attempts, including the first.
    pub attempts: u32,
    pub initial_ms: u64,
}

impl Backoff {
    /// Equal jitter: base/2 + rand(0, base/2), base doubling per attempt.
    pub(crate) fn delay(self, attempt: u32) -> Duration {
        let base = self.initial_ms.saturating_mul(2u64.saturating_pow(attempt));
        let half = base / 2;
        Duration::from_millis(half + fastrand::u64(..half.max(1)))
    }

    /// Runs `op` until it succeeds, fails permanently, or attempts run out.
    pub(crate) async fn retry<T, E, F, Fut>(
        self,
        is_transient: impl Fn(&E) -> bool,
        mut op: F,
    ) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Err(e) if is_transient(&e) && attempt + 1 < self.attempts => {
                    let delay = self.delay(attempt);
                    debug!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retrying after transient error"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}
