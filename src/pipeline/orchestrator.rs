//! Batch orchestrator.
//!
//! Pipeline flow:
//! Identifiers → RecordAssembler (×N, concurrent) → ordered RenderItems → Renderer
//!
//! K_i: One item per identifier, in input order.
//! K_i: Every assembly settles to a resolved record or a tombstone, so the
//!      batch as a whole never fails.

use super::assembler::RecordAssembler;
use crate::models::{Identifier, RenderItem};
use crate::render::Renderer;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Coarse orchestrator state, for spinner visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    Idle,
    Loading,
}

/// Summary of one orchestrated batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub resolved: usize,
    pub tombstoned: usize,
    pub items: Vec<RenderItem>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.items.len()
    }
}

/// Runs the assembler over a batch of identifiers.
pub struct BatchOrchestrator {
    assembler: RecordAssembler,
    /// Batches currently settling
    active: AtomicUsize,
}

/// Counts one running batch for as long as it lives.
struct ActiveBatch<'a>(&'a AtomicUsize);

impl<'a> ActiveBatch<'a> {
    fn enter(active: &'a AtomicUsize) -> Self {
        active.fetch_add(1, Ordering::SeqCst);
        Self(active)
    }
}

impl Drop for ActiveBatch<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl BatchOrchestrator {
    pub fn new(assembler: RecordAssembler) -> Self {
        Self {
            assembler,
            active: AtomicUsize::new(0),
        }
    }

    /// `Loading` while any batch is settling.
    pub fn state(&self) -> LoadState {
        if self.active.load(Ordering::SeqCst) > 0 {
            LoadState::Loading
        } else {
            LoadState::Idle
        }
    }

    /// Assemble every identifier concurrently, preserving input order.
    ///
    /// An empty batch is a logged no-op.
    pub async fn run(&self, identifiers: &[Identifier]) -> Vec<RenderItem> {
        self.run_observed(identifiers, |_| {}).await
    }

    /// Like [`run`](Self::run), calling `on_settled` as each record settles.
    pub async fn run_observed<F>(&self, identifiers: &[Identifier], on_settled: F) -> Vec<RenderItem>
    where
        F: Fn(&RenderItem),
    {
        if identifiers.is_empty() {
            debug!("No identifiers to render");
            return Vec::new();
        }

        let _active = ActiveBatch::enter(&self.active);
        let on_settled = &on_settled;
        let items = join_all(identifiers.iter().map(|id| async move {
            let item = self.assembler.assemble(id).await;
            on_settled(&item);
            item
        }))
        .await;

        items
    }

    /// Run the batch and hand the ordered items to `renderer`.
    ///
    /// Render failures are logged; they never turn into a batch failure.
    pub async fn render_batch<R>(&self, identifiers: &[Identifier], renderer: &mut R) -> BatchReport
    where
        R: Renderer + ?Sized,
    {
        let batch_id = Uuid::new_v4();
        let started_at = Utc::now();
        let start = Instant::now();

        if identifiers.is_empty() {
            debug!(batch_id = %batch_id, "Empty batch, nothing to render");
            return BatchReport {
                batch_id,
                started_at,
                finished_at: started_at,
                resolved: 0,
                tombstoned: 0,
                items: Vec::new(),
            };
        }

        info!(
            batch_id = %batch_id,
            total = identifiers.len(),
            "Starting batch"
        );

        renderer.set_loading(true);
        let progress = renderer.progress(identifiers.len());
        let items = self
            .run_observed(identifiers, |_| {
                if let Some(pb) = &progress {
                    pb.inc(1);
                }
            })
            .await;
        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        if let Err(e) = renderer.render(&items) {
            warn!(batch_id = %batch_id, error = %e, "Render failed");
        }
        renderer.set_loading(false);

        let resolved = items.iter().filter(|i| i.is_resolved()).count();
        let tombstoned = items.len() - resolved;

        info!(
            batch_id = %batch_id,
            resolved = resolved,
            tombstoned = tombstoned,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Batch complete"
        );

        BatchReport {
            batch_id,
            started_at,
            finished_at: Utc::now(),
            resolved,
            tombstoned,
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fakes::MemoryFetcher;
    use crate::models::Config;
    use crate::render::CardBoard;
    use serde_json::json;
    use std::sync::Arc;

    fn orchestrator(fetcher: MemoryFetcher) -> BatchOrchestrator {
        let assembler = RecordAssembler::new(Arc::new(fetcher), &Config::default());
        BatchOrchestrator::new(assembler)
    }

    fn fetcher() -> MemoryFetcher {
        let fetcher = MemoryFetcher::new().with_yields(2);
        for (id, name) in [(1, "bulbasaur"), (4, "charmander"), (7, "squirtle")] {
            fetcher.insert(
                format!("https://pokeapi.co/api/v2/pokemon/{id}"),
                json!({ "id": id, "name": name }),
            );
        }
        fetcher
    }

    fn ids(values: &[u32]) -> Vec<Identifier> {
        values.iter().copied().map(Identifier::from).collect()
    }

    #[tokio::test]
    async fn test_order_preserved_with_failures() {
        let orchestrator = orchestrator(fetcher());
        let items = orchestrator.run(&ids(&[7, 99999, 1, 4])).await;

        assert_eq!(items.len(), 4);
        assert_eq!(items[0].as_resolved().unwrap().id, 7);
        assert_eq!(items[1].as_tombstone().unwrap().identifier.as_str(), "99999");
        assert_eq!(items[2].as_resolved().unwrap().id, 1);
        assert_eq!(items[3].as_resolved().unwrap().id, 4);
        assert_eq!(orchestrator.state(), LoadState::Idle);
    }

    #[tokio::test]
    async fn test_empty_batch_is_noop() {
        let orchestrator = orchestrator(fetcher());
        let mut board = CardBoard::default();

        let report = orchestrator.render_batch(&[], &mut board).await;
        assert_eq!(report.total(), 0);
        assert!(board.items().is_empty());
        assert_eq!(board.renders(), 0);
        assert!(board.loading_history().is_empty());
    }

    #[tokio::test]
    async fn test_render_batch_toggles_loading() {
        let orchestrator = orchestrator(fetcher());
        let mut board = CardBoard::default();

        let report = orchestrator.render_batch(&ids(&[1, 2]), &mut board).await;

        assert_eq!(report.resolved, 1);
        assert_eq!(report.tombstoned, 1);
        assert!(report.finished_at >= report.started_at);
        assert_eq!(board.loading_history(), &[true, false]);
        assert_eq!(board.items().len(), 2);
        assert!(!board.is_loading());
    }

    #[tokio::test]
    async fn test_run_observed_sees_every_item() {
        let orchestrator = orchestrator(fetcher());
        let seen = std::sync::Mutex::new(0usize);

        let items = orchestrator
            .run_observed(&ids(&[1, 4, 5]), |_| {
                assert_eq!(orchestrator.state(), LoadState::Loading);
                *seen.lock().unwrap() += 1;
            })
            .await;

        assert_eq!(items.len(), 3);
        assert_eq!(*seen.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_overlapping_batches_stay_loading() {
        let orchestrator = orchestrator(fetcher());
        let states = std::sync::Mutex::new(Vec::new());
        let long: Vec<Identifier> = vec![Identifier::from(1); 20];

        let short_ids = ids(&[4]);
        let (short, long) = futures::join!(
            orchestrator.run(&short_ids),
            orchestrator.run_observed(&long, |_| {
                states.lock().unwrap().push(orchestrator.state());
            }),
        );

        assert_eq!(short.len(), 1);
        assert_eq!(long.len(), 20);
        let states = states.into_inner().unwrap();
        assert_eq!(states.len(), 20);
        assert!(states.iter().all(|s| *s == LoadState::Loading));
        assert_eq!(orchestrator.state(), LoadState::Idle);
    }

    #[tokio::test]
    async fn test_dropped_batch_returns_to_idle() {
        let orchestrator = orchestrator(fetcher());
        {
            let batch_ids = ids(&[1, 4]);
            let batch = std::pin::pin!(orchestrator.run(&batch_ids));
            // Poll once so the batch registers, then drop it mid-flight
            let _ = futures::poll!(batch);
            assert_eq!(orchestrator.state(), LoadState::Loading);
        }
        assert_eq!(orchestrator.state(), LoadState::Idle);
    }
}
