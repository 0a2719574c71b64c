//! Batched fan-out executor.
//!
//! Tasks are partitioned into consecutive groups of at most `batch_size`.
//! Groups run strictly one after another; tasks inside a group are polled
//! concurrently and the group waits for every task to settle. A task is not
//! started before its group starts, which bounds in-flight requests to
//! `batch_size`.

use crate::models::{DexError, Result};
use futures::future::join_all;
use std::future::Future;
use tracing::debug;

/// Outcome of one task, in the position of the task that produced it.
#[derive(Debug)]
pub enum Settled<T> {
    Ok(T),
    Failed(DexError),
}

impl<T> Settled<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// The value, or `placeholder` if the task failed.
    pub fn value_or(self, placeholder: T) -> T {
        match self {
            Self::Ok(value) => value,
            Self::Failed(_) => placeholder,
        }
    }

    pub fn into_result(self) -> Result<T> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::Failed(e) => Err(e),
        }
    }
}

impl<T> From<Result<T>> for Settled<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => Self::Ok(value),
            Err(e) => Self::Failed(e),
        }
    }
}

/// Number of groups `len` tasks are split into. A zero batch size counts as one.
pub fn group_count(len: usize, batch_size: usize) -> usize {
    len.div_ceil(batch_size.max(1))
}

/// Run `tasks` in sequential groups of `batch_size`, settling every task.
///
/// The output has the same length and order as `tasks`.
pub async fn run_batched<T, F, Fut>(tasks: Vec<F>, batch_size: usize) -> Vec<Settled<T>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let batch_size = batch_size.max(1);
    let groups = group_count(tasks.len(), batch_size);
    let mut settled = Vec::with_capacity(tasks.len());
    let mut pending = tasks.into_iter();

    for group in 0..groups {
        let started: Vec<Fut> = pending.by_ref().take(batch_size).map(|task| task()).collect();
        let results = join_all(started).await;

        let failed = results.iter().filter(|r| r.is_err()).count();
        debug!(
            group = group + 1,
            groups = groups,
            size = results.len(),
            failed = failed,
            "Group settled"
        );

        settled.extend(results.into_iter().map(Settled::from));
    }

    settled
}
