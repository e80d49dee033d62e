//! Per-call session context: cancellation plus optional deadline.
//!
//! The store never imposes its own timeouts. Each round trip is raced against
//! whatever the caller threads through here.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{Result, SessionStoreError};
use crate::observability::SessionStoreEvent;

/// Cancellation and deadline carried into every context-aware store call.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl SessionContext {
    /// A context that is never cancelled and has no deadline.
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    /// Bind calls to an existing cancellation token.
    #[must_use]
    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            deadline: None,
        }
    }

    /// Add a deadline `timeout` from now. An earlier existing deadline wins.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Add an absolute deadline. An earlier existing deadline wins.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    /// Derive a context cancelled whenever this one is, with the same deadline.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            cancel: self.cancel.child_token(),
            deadline: self.deadline,
        }
    }

    /// Token observed by this context.
    #[must_use]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Deadline, if one was set.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancel this context and every child derived from it.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Fail fast when the context is already done.
    pub fn check(&self, operation: &'static str) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(self.interrupted(SessionStoreError::Cancelled { operation }));
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(self.interrupted(SessionStoreError::DeadlineExceeded { operation }));
        }
        Ok(())
    }

    /// Run one store round trip under this context.
    ///
    /// A context that is already done fails before `request` is polled.
    pub async fn run<T, F>(&self, operation: &'static str, request: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check(operation)?;
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                Err(self.interrupted(SessionStoreError::Cancelled { operation }))
            }
            () = deadline => {
                Err(self.interrupted(SessionStoreError::DeadlineExceeded { operation }))
            }
            result = request => result,
        }
    }

    fn interrupted(&self, error: SessionStoreError) -> SessionStoreError {
        tracing::warn!(
            event = SessionStoreEvent::OperationInterrupted.as_str(),
            error = %error,
            has_deadline = self.deadline.is_some(),
            "session store operation interrupted by caller context"
        );
        error
    }
}
