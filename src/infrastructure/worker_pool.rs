//! Bounded, order-preserving fan-out for independent per-row work
//!
//! Used to prefetch listing rows (e.g. search results) without flooding the
//! site: at most `limit` tasks run at once and results come back in input
//! order regardless of completion order.

use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error};

use super::parsing_error::{ScrapeError, ScrapeResult};

/// Run `task` over every item with at most `limit` in flight.
///
/// Results are returned in the order of `items`. The first failed item (in
/// that order) becomes the error.
pub async fn map_ordered<I, T, F, Fut>(items: Vec<I>, limit: usize, task: F) -> ScrapeResult<Vec<T>>
where
    I: Send + 'static,
    T: Send + 'static,
    F: Fn(I) -> Fut,
    Fut: Future<Output = ScrapeResult<T>> + Send + 'static,
{
    let limit = limit.max(1);
    let semaphore = Arc::new(Semaphore::new(limit));
    let total = items.len();
    debug!("Dispatching {} task(s) with concurrency {}", total, limit);

    let mut handles = Vec::with_capacity(total);
    for item in items {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| ScrapeError::Worker {
                message: format!("Semaphore acquire failed: {e}"),
            })?;
        let work = task(item);
        handles.push(tokio::spawn(async move {
            let _permit = permit;
            work.await
        }));
    }

    join_all(handles)
        .await
        .into_iter()
        .map(|joined| {
            joined.map_err(|e| {
                error!("Worker task failed: {}", e);
                ScrapeError::Worker {
                    message: e.to_string(),
                }
            })?
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn keeps_input_order_when_completion_order_differs() {
        let delays = vec![30_u64, 5, 20, 1];
        let results = map_ordered(delays.clone(), 4, |delay| async move {
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(delay)
        })
        .await
        .unwrap();
        assert_eq!(results, delays);
    }

    #[tokio::test]
    async fn never_exceeds_the_limit() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        map_ordered((0..10).collect(), 3, |n: u32| {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                Ok(n)
            }
        })
        .await
        .unwrap();

        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn first_failure_in_input_order_wins() {
        let err = map_ordered(vec![1_u32, 2, 3], 2, |n| async move {
            if n >= 2 {
                Err(ScrapeError::parse("row", &n.to_string()))
            } else {
                Ok(n)
            }
        })
        .await
        .unwrap_err();
        assert_eq!(err, ScrapeError::parse("row", "2"));
    }
}
