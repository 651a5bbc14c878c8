//! Runs CPU-bound planning work off the async executor with a deadline.

use std::time::Duration;

use nofly_core::{CancellationFlag, RouteError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("route computation exceeded {0:?}")]
    TimedOut(Duration),

    #[error("route worker failed: {0}")]
    Worker(String),
}

/// Run `job` on the blocking pool and wait at most `deadline`.
///
/// When the deadline passes the flag is raised so the job stops at its next
/// cancellation check; the caller gets [`RunError::TimedOut`] immediately.
pub async fn run_blocking<T, F>(
    deadline: Duration,
    cancellation: CancellationFlag,
    job: F,
) -> Result<T, RunError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, RouteError> + Send + 'static,
{
    let handle = tokio::task::spawn_blocking(job);
    match tokio::time::timeout(deadline, handle).await {
        Ok(Ok(result)) => result.map_err(RunError::from),
        Ok(Err(join_error)) => Err(RunError::Worker(join_error.to_string())),
        Err(_) => {
            cancellation.cancel();
            tracing::warn!(
                deadline_ms = deadline.as_millis() as u64,
                "route computation timed out"
            );
            Err(RunError::TimedOut(deadline))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_job_result() {
        let result = run_blocking(Duration::from_secs(5), CancellationFlag::new(), || Ok(42)).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn passes_route_errors_through() {
        let result: Result<(), _> =
            run_blocking(Duration::from_secs(5), CancellationFlag::new(), || {
                Err(RouteError::NoPathFound)
            })
            .await;
        assert!(matches!(result, Err(RunError::Route(RouteError::NoPathFound))));
    }

    #[tokio::test]
    async fn deadline_raises_the_flag() {
        let flag = CancellationFlag::new();
        let watched = flag.clone();
        let result: Result<(), _> = run_blocking(Duration::from_millis(20), flag.clone(), move || {
            while !watched.is_cancelled() {
                std::thread::sleep(Duration::from_millis(5));
            }
            Err(RouteError::Cancelled)
        })
        .await;
        assert!(matches!(result, Err(RunError::TimedOut(_))));
        assert!(flag.is_cancelled());
    }

    #[tokio::test]
    async fn panicking_job_is_a_worker_error() {
        let result: Result<(), _> =
            run_blocking(Duration::from_secs(5), CancellationFlag::new(), || {
                panic!("boom")
            })
            .await;
        assert!(matches!(result, Err(RunError::Worker(_))));
    }
}
