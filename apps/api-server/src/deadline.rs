//! Per-request deadline driving the service's cancellation token.

use std::time::Duration;

use tokio_util::sync::{CancellationToken, DropGuard};

/// Cancels its token after a timeout, or when dropped.
///
/// Dropping happens when the handler finishes or when actix abandons the
/// request because the client went away.
pub struct Deadline {
    token: CancellationToken,
    _guard: DropGuard,
}

impl Deadline {
    pub fn after(timeout: Duration) -> Self {
        let token = CancellationToken::new();
        let timer = token.clone();

        actix_web::rt::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(timeout) => {
                    tracing::warn!(timeout_ms = timeout.as_millis() as u64, "Request deadline exceeded");
                    timer.cancel();
                }
                _ = timer.cancelled() => {}
            }
        });

        Self {
            _guard: token.clone().drop_guard(),
            token,
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn fires_after_timeout() {
        let deadline = Deadline::after(Duration::from_millis(10));
        tokio::time::timeout(Duration::from_secs(1), deadline.token().cancelled())
            .await
            .unwrap();
    }

    #[actix_web::test]
    async fn drop_cancels() {
        let deadline = Deadline::after(Duration::from_secs(60));
        let token = deadline.token().clone();
        drop(deadline);
        assert!(token.is_cancelled());
    }
}
