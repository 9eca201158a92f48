use crate::error::{ClaimError, Result};
use futures::future;
use std::future::Future;
use tracing::debug;

/// Progress notifications emitted between units of work. Consumed
/// synchronously by the caller; nothing advances while a callback runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A read batch is about to start (1-based).
    ReadBatch { current: usize, total: usize },
    /// A funding chunk is about to be submitted (1-based).
    Chunk { current: usize, total: usize },
    /// A cleanup page was deleted.
    Page { number: usize, cleaned: usize },
}

/// Split `items` into order-preserving chunks of at most `max_per_chunk`.
/// Concatenating the chunks reproduces the input exactly.
pub fn chunk<T>(items: &[T], max_per_chunk: usize) -> Vec<&[T]> {
    assert!(max_per_chunk > 0, "chunk bound must be positive");
    items.chunks(max_per_chunk).collect()
}

/// Run `op` over `items` in sequential batches of `batch_size`, with every
/// op inside a batch running concurrently.
///
/// Results come back indexed by input position, never by completion order:
/// `result[i]` always belongs to `items[i]`. `on_progress(batch, total)` is
/// invoked once before each batch starts. The first op failure fails the
/// whole call; no partial results are returned.
pub async fn run_serial_batches<T, R, F, Fut, P>(
    items: &[T],
    batch_size: usize,
    mut op: F,
    mut on_progress: P,
) -> Result<Vec<R>>
where
    T: Clone,
    F: FnMut(T, usize) -> Fut,
    Fut: Future<Output = Result<R>>,
    P: FnMut(usize, usize),
{
    if batch_size == 0 {
        return Err(ClaimError::Config("batch size must be positive".to_string()));
    }

    let total_batches = (items.len() + batch_size - 1) / batch_size;
    let mut results = Vec::with_capacity(items.len());

    for (batch_index, batch) in items.chunks(batch_size).enumerate() {
        on_progress(batch_index + 1, total_batches);
        debug!("running batch {}/{} ({} ops)", batch_index + 1, total_batches, batch.len());

        let ops: Vec<Fut> = batch
            .iter()
            .enumerate()
            .map(|(offset, item)| op(item.clone(), batch_index * batch_size + offset))
            .collect();

        // try_join_all preserves input order, which is what makes the
        // positional guarantee hold regardless of completion order.
        results.extend(future::try_join_all(ops).await?);
    }

    Ok(results)
}
