//! Long-running-operation polling
//!
//! Imports and document translations run asynchronously on the server; the
//! client tracks them by id and fractional progress. One generic loop shape
//! serves every job kind, parameterized only by the status-fetch closure.

use std::future::Future;

use tokio::time::{sleep, Duration, Instant};
use tracing::{debug, warn};

use crate::core::errors::{LaraError, Result};

/// Fixed delay between status fetches
pub(crate) const POLLING_INTERVAL: Duration = Duration::from_millis(2000);

/// A server-side job tracked by id and progress in `[0, 1]`
pub trait JobStatus {
    /// Server-assigned job identifier
    fn id(&self) -> &str;

    /// Fractional progress; `1.0` means the job is complete
    fn progress(&self) -> f32;
}

/// Poll a job until its progress reaches `1.0`.
///
/// Each iteration re-checks the caller's deadline before sleeping, never
/// mid-sleep; an exceeded deadline fails with [`LaraError::Timeout`]. The
/// update callback observes every freshly fetched handle.
pub(crate) async fn wait_for_completion<J, F, Fut>(
    mut job: J,
    mut fetch_status: F,
    mut update_callback: Option<&mut dyn FnMut(&J)>,
    max_wait: Option<Duration>,
) -> Result<J>
where
    J: JobStatus,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<J>>,
{
    let start = Instant::now();

    while job.progress() < 1.0 {
        if let Some(limit) = max_wait {
            if start.elapsed() > limit {
                warn!(id = job.id(), "job did not complete before the deadline");
                return Err(LaraError::Timeout);
            }
        }

        sleep(POLLING_INTERVAL).await;

        job = fetch_status(job.id().to_string()).await?;
        debug!(id = job.id(), progress = job.progress(), "job status refreshed");

        if let Some(callback) = update_callback.as_mut() {
            callback(&job);
        }
    }

    Ok(job)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[derive(Debug, Clone)]
    struct FakeImport {
        id: String,
        progress: f32,
    }

    impl JobStatus for FakeImport {
        fn id(&self) -> &str {
            &self.id
        }

        fn progress(&self) -> f32 {
            self.progress
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_converges_on_completion() {
        let progress = Rc::new(Cell::new(0.0f32));
        let fetch = {
            let progress = progress.clone();
            move |id: String| {
                let progress = progress.clone();
                async move {
                    progress.set(progress.get() + 0.5);
                    Ok(FakeImport {
                        id,
                        progress: progress.get(),
                    })
                }
            }
        };

        let mut seen = Vec::new();
        let mut callback = |job: &FakeImport| seen.push(job.progress);

        let job = FakeImport {
            id: "import-1".to_string(),
            progress: 0.0,
        };
        let done = wait_for_completion(job, fetch, Some(&mut callback), None)
            .await
            .unwrap();

        assert_eq!(done.progress, 1.0);
        assert_eq!(done.id, "import-1");
        assert_eq!(seen, vec![0.5, 1.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_times_out_when_progress_stalls() {
        let fetch = |id: String| async move { Ok(FakeImport { id, progress: 0.0 }) };

        let job = FakeImport {
            id: "import-2".to_string(),
            progress: 0.0,
        };
        let started = Instant::now();
        let result =
            wait_for_completion(job, fetch, None, Some(Duration::from_millis(1))).await;

        assert!(matches!(result, Err(LaraError::Timeout)));
        // Fails within one polling interval of the 1ms deadline
        assert!(started.elapsed() <= POLLING_INTERVAL + Duration::from_millis(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_complete_job_returns_without_fetching() {
        let calls = Rc::new(Cell::new(0u32));
        let fetch = {
            let calls = calls.clone();
            move |id: String| {
                calls.set(calls.get() + 1);
                async move { Ok(FakeImport { id, progress: 1.0 }) }
            }
        };

        let job = FakeImport {
            id: "import-3".to_string(),
            progress: 1.0,
        };
        let done = wait_for_completion(job, fetch, None, None).await.unwrap();

        assert_eq!(done.progress, 1.0);
        assert_eq!(calls.get(), 0);
    }
}
