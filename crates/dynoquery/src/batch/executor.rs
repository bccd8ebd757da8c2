//! Bounded-concurrency fan-out and the unprocessed-entry retry loop shared
//! by every batch operation.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use dynoquery_core::{Error, ErrorKind, Operation, Result};

use crate::config::BatchPolicy;

/// Runs `work` for every job with at most `concurrency` in flight.
///
/// Once a job fails, jobs that have not started yet are skipped. Jobs
/// already running finish before this returns. The first error wins.
pub(crate) async fn run_bounded<J, F, Fut>(
    operation: Operation,
    jobs: Vec<J>,
    concurrency: usize,
    work: F,
) -> Result<()>
where
    J: Send + 'static,
    F: Fn(J) -> Fut,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    if jobs.is_empty() {
        return Ok(());
    }

    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let cancelled = Arc::new(AtomicBool::new(false));
    let mut join_set = JoinSet::new();

    for (index, job) in jobs.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let cancelled = Arc::clone(&cancelled);
        let task = work(job);

        join_set.spawn(async move {
            let _permit = semaphore.acquire_owned().await.map_err(|e| {
                Error::new(operation, ErrorKind::Worker(format!("semaphore closed: {e}")))
            })?;
            if cancelled.load(Ordering::SeqCst) {
                return Ok(());
            }

            let result = task.await;
            if let Err(e) = &result {
                cancelled.store(true, Ordering::SeqCst);
                error!(operation = %operation, chunk = index, error = %e, "batch chunk failed");
            }
            result
        });
    }

    let mut first_error = None;
    while let Some(joined) = join_set.join_next().await {
        let result = joined.unwrap_or_else(|e| {
            Err(Error::new(
                operation,
                ErrorKind::Worker(format!("task panicked: {e}")),
            ))
        });
        if let Err(e) = result {
            first_error.get_or_insert(e);
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Sends `pending`, then resends whatever the store reports as unprocessed,
/// pausing `policy.retry_interval` before each follow-up.
///
/// After `policy.max_retries` follow-ups the remaining entries are dropped
/// with a warning and the call still succeeds.
pub(crate) async fn drain<E, S, Fut>(
    policy: BatchPolicy,
    operation: Operation,
    mut pending: BTreeMap<String, Vec<E>>,
    mut send: S,
) -> Result<()>
where
    S: FnMut(BTreeMap<String, Vec<E>>) -> Fut,
    Fut: Future<Output = Result<BTreeMap<String, Vec<E>>>>,
{
    let mut retries = 0;

    loop {
        let mut unprocessed = send(pending).await?;
        unprocessed.retain(|_, entries| !entries.is_empty());
        if unprocessed.is_empty() {
            return Ok(());
        }

        let remaining: usize = unprocessed.values().map(Vec::len).sum();
        if retries >= policy.max_retries {
            warn!(
                operation = %operation,
                dropped = remaining,
                retries,
                "giving up on unprocessed batch entries"
            );
            return Ok(());
        }

        retries += 1;
        debug!(operation = %operation, remaining, retry = retries, "retrying unprocessed entries");
        tokio::time::sleep(policy.retry_interval).await;
        pending = unprocessed;
    }
}
