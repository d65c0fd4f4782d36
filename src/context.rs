//! Run context: cancellation and deadline for a single action run
//!
//! Cheap to clone; clones share the same cancellation token.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::EngineError;

#[derive(Clone, Debug, Default)]
pub struct RunContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl RunContext {
    /// Context that is never done unless cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Same token, with a deadline `timeout` from now.
    /// An earlier existing deadline wins. A timeout too large to represent
    /// as an instant leaves the deadline unchanged.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self;
        };
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Why the context is done, if it is
    pub fn err(&self) -> Option<EngineError> {
        if self.token.is_cancelled() {
            Some(EngineError::Cancelled)
        } else if self.deadline.is_some_and(|d| Instant::now() >= d) {
            Some(EngineError::DeadlineExceeded)
        } else {
            None
        }
    }

    /// Resolves once the context is cancelled or its deadline passes
    pub async fn done(&self) -> EngineError {
        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;
                _ = self.token.cancelled() => EngineError::Cancelled,
                _ = tokio::time::sleep_until(deadline) => EngineError::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                EngineError::Cancelled
            }
        }
    }
}
