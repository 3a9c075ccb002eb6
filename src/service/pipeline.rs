//! Strictly sequential execution of asynchronous steps.
//!
//! Both helpers start a step only after the previous one has completed, and stop at the first
//! failure: steps after it are never started and the error is handed back unchanged. Nothing
//! already done is undone.

use crate::errors::ApiResult;
use futures::future::BoxFuture;
use std::future::Future;

/// Runs `step` once per item, in order, threading the accumulator through by value.
///
/// ```rust
/// use agora::service::pipeline::run_serially;
/// # async fn demo() -> agora::errors::ApiResult<()> {
/// let sum = run_serially(vec![1, 2, 3], 0, |acc, n| async move { Ok(acc + n) }).await?;
/// assert_eq!(sum, 6);
/// # Ok(())
/// # }
/// ```
pub async fn run_serially<I, A, F, Fut>(items: I, init: A, mut step: F) -> ApiResult<A>
where
    I: IntoIterator,
    F: FnMut(A, I::Item) -> Fut,
    Fut: Future<Output = ApiResult<A>>,
{
    let mut acc = init;
    for item in items {
        acc = step(acc, item).await?;
    }
    Ok(acc)
}

/// A fail-fast batch of independent writes.
///
/// Futures are lazy, so adding a write only records it; [`SerialBatch::run`] drives them one
/// after another in insertion order.
#[derive(Default)]
pub struct SerialBatch<'a> {
    writes: Vec<BoxFuture<'a, ApiResult<()>>>,
}

impl<'a> SerialBatch<'a> {
    pub fn new() -> Self {
        Self { writes: Vec::new() }
    }

    pub fn add<F>(&mut self, write: F) -> &mut Self
    where
        F: Future<Output = ApiResult<()>> + Send + 'a,
    {
        self.writes.push(Box::pin(write));
        self
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Runs every write in order. Returns once all of them succeeded, or with the first error.
    pub async fn run(self) -> ApiResult<()> {
        if self.is_empty() {
            return Ok(());
        }
        run_serially(self.writes, (), |_, write| write).await
    }
}
