//! Concurrent per-row execution for bulk actions.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tokio::sync::Semaphore;
use tokio::sync::SemaphorePermit;

use crate::config::ActionHandler;
use crate::config::Invocation;
use crate::error::HandlerError;
use crate::model::Row;

/// Default number of per-row operations in flight at once.
pub const DEFAULT_BULK_CONCURRENCY: usize = 8;

/// Limits the number of concurrent operations.
///
/// Wraps a `tokio::sync::Semaphore`. Cloning shares the permits.
///
/// # Example
///
/// ```
/// use datagrid_lib::dispatch::ConcurrencyLimiter;
///
/// let limiter = ConcurrencyLimiter::new(4);
/// assert_eq!(limiter.limit(), 4);
/// assert_eq!(limiter.available(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    limit: usize,
}

impl ConcurrencyLimiter {
    /// Creates a limiter; a limit of 0 is raised to 1.
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    /// Acquires a permit, waiting if necessary.
    ///
    /// The permit is released when dropped.
    pub async fn acquire(&self) -> Result<SemaphorePermit<'_>, HandlerError> {
        self.semaphore
            .acquire()
            .await
            .map_err(|_| HandlerError::failed("concurrency limiter closed"))
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns the number of available permits.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

impl Default for ConcurrencyLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_BULK_CONCURRENCY)
    }
}

/// Handler running one operation per target row. See [`per_row`].
pub struct PerRow<F> {
    limiter: ConcurrencyLimiter,
    f: F,
}

#[async_trait]
impl<F, Fut> ActionHandler for PerRow<F>
where
    F: Fn(Row) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    async fn run(&self, invocation: Invocation) -> Result<(), HandlerError> {
        let rows = invocation.into_rows();
        let total = rows.len();

        let results = join_all(rows.into_iter().map(|row| async move {
            let _permit = self.limiter.acquire().await?;
            (self.f)(row).await
        }))
        .await;

        let failures: Vec<HandlerError> = results.into_iter().filter_map(Result::err).collect();
        let Some(first) = failures.first() else {
            return Ok(());
        };

        log::debug!("{} of {} per-row operations failed", failures.len(), total);
        Err(HandlerError::Partial {
            failed: failures.len(),
            total,
            message: first.to_string(),
        })
    }
}

/// Builds a handler that runs `f` once per target row, all concurrently
/// (at most `limit` at a time), and waits for every operation to settle.
///
/// Succeeds only if every operation succeeds. Operations that succeeded are
/// not rolled back when others fail.
///
/// # Example
///
/// ```
/// use datagrid_lib::config::ActionDef;
/// use datagrid_lib::dispatch::per_row;
///
/// let delete = ActionDef::new("delete", "Delete")
///     .destructive()
///     .handler(per_row(4, |row| async move {
///         let _id = row.id();
///         Ok(())
///     }));
/// assert!(delete.has_handler());
/// ```
pub fn per_row<F, Fut>(limit: usize, f: F) -> PerRow<F>
where
    F: Fn(Row) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    PerRow {
        limiter: ConcurrencyLimiter::new(limit),
        f,
    }
}
