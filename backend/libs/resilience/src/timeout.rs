/// Deadlines for external calls (blob stores, ffmpeg, brokers)
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::warn;

/// The guarded operation did not finish in time
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{operation} timed out after {after:?}")]
pub struct Elapsed {
    pub operation: &'static str,
    pub after: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum TimeoutError<E> {
    #[error(transparent)]
    Elapsed(#[from] Elapsed),
    #[error(transparent)]
    Failed(E),
}

impl<E> TimeoutError<E> {
    /// Collapse into the operation's own error type.
    pub fn into_inner_with(self, on_elapsed: impl FnOnce(Elapsed) -> E) -> E {
        match self {
            TimeoutError::Elapsed(elapsed) => on_elapsed(elapsed),
            TimeoutError::Failed(err) => err,
        }
    }
}

/// Execute a future with timeout. The future is dropped when the deadline passes.
pub async fn with_timeout<F, T>(
    operation: &'static str,
    duration: Duration,
    future: F,
) -> Result<T, Elapsed>
where
    F: Future<Output = T>,
{
    timeout(duration, future).await.map_err(|_| {
        warn!(operation = operation, timeout = ?duration, "Operation timed out");
        Elapsed {
            operation,
            after: duration,
        }
    })
}

/// Execute a fallible future with timeout, keeping the operation's error type.
pub async fn with_timeout_result<F, T, E>(
    operation: &'static str,
    duration: Duration,
    future: F,
) -> Result<T, TimeoutError<E>>
where
    F: Future<Output = Result<T, E>>,
{
    with_timeout(operation, duration, future)
        .await?
        .map_err(TimeoutError::Failed)
}
