//! Record assembler: one identifier in, one render item out.
//!
//! Pipeline flow:
//! Identifier → primary fetch → (types ∥ abilities ∥ batched moves) → ResolvedRecord
//!
//! Any failure outside the per-name isolation turns the record into a
//! tombstone; nothing propagates past `assemble`.

use super::batch::{Settled, run_batched};
use super::resolver::NameResolver;
use crate::client::JsonFetcher;
use crate::models::{
    BatchingConfig, Config, DexError, FaultPolicy, Identifier, PrimaryRecord, RenderItem,
    ResolvedRecord, Result, SubResourceRef, Tombstone,
};
use futures::future::join_all;
use reqwest::Url;
use std::sync::Arc;
use tracing::{debug, warn};

/// Builds resolved records from catalog identifiers.
#[derive(Clone)]
pub struct RecordAssembler {
    fetcher: Arc<dyn JsonFetcher>,
    resolver: NameResolver,
    base_url: String,
    batching: BatchingConfig,
}

impl RecordAssembler {
    pub fn new(fetcher: Arc<dyn JsonFetcher>, config: &Config) -> Self {
        Self {
            resolver: NameResolver::new(Arc::clone(&fetcher), &config.localization),
            fetcher,
            base_url: config.catalog.resolved_base_url(),
            batching: config.batching.clone(),
        }
    }

    /// URL of the primary record for `identifier`.
    ///
    /// The identifier always lands in a single, percent-encoded path segment.
    pub fn record_url(&self, identifier: &Identifier) -> Result<String> {
        let segment = identifier.as_str();
        if matches!(segment, "." | "..") {
            return Err(DexError::InvalidInput(format!(
                "identifier {segment:?} is not a record"
            )));
        }

        let mut url = Url::parse(&self.base_url)
            .map_err(|e| DexError::InvalidInput(format!("catalog base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| DexError::InvalidInput(format!("catalog base URL: {}", self.base_url)))?
            .pop_if_empty()
            .push(segment);
        Ok(url.into())
    }

    /// Assemble `identifier`, degrading any failure to a tombstone.
    pub async fn assemble(&self, identifier: &Identifier) -> RenderItem {
        match self.try_assemble(identifier).await {
            Ok(record) => RenderItem::Resolved(record),
            Err(e) => {
                warn!(identifier = %identifier, error = %e, "Record tombstoned");
                RenderItem::Tombstone(Tombstone::new(identifier.clone(), e))
            }
        }
    }

    /// Assemble `identifier`, returning the first unisolated failure.
    pub async fn try_assemble(&self, identifier: &Identifier) -> Result<ResolvedRecord> {
        let primary = self.fetch_primary(identifier).await?;

        debug!(
            identifier = %identifier,
            types = primary.type_refs.len(),
            abilities = primary.ability_refs.len(),
            moves = primary.move_refs.len(),
            "Resolving names"
        );

        let (types, abilities, moves) = futures::join!(
            self.resolve_direct(&primary.type_refs),
            self.resolve_direct(&primary.ability_refs),
            self.resolve_moves(&primary.move_refs),
        );

        Ok(ResolvedRecord::new(&primary, types?, abilities?, moves))
    }

    async fn fetch_primary(&self, identifier: &Identifier) -> Result<PrimaryRecord> {
        let not_found = |cause: String| DexError::RecordNotFound {
            identifier: identifier.to_string(),
            cause,
        };

        let url = self.record_url(identifier)?;
        let value = self
            .fetcher
            .fetch_json(&url)
            .await
            .map_err(|e| not_found(e.to_string()))?;

        PrimaryRecord::from_payload(value).map_err(not_found)
    }

    /// Concurrent fan-out over a short list (types, abilities).
    async fn resolve_direct(&self, refs: &[SubResourceRef]) -> Result<Vec<String>> {
        let settled = join_all(refs.iter().map(|r| self.resolver.resolve(&r.url))).await;

        match self.batching.fault_policy {
            FaultPolicy::Uniform => Ok(settled
                .into_iter()
                .map(|r| self.placeholder_on_error(r))
                .collect()),
            FaultPolicy::Strict => settled.into_iter().collect(),
        }
    }

    /// Batched fan-out over a possibly long list (moves).
    async fn resolve_moves(&self, refs: &[SubResourceRef]) -> Vec<String> {
        let tasks: Vec<_> = refs
            .iter()
            .map(|r| move || self.resolver.resolve(&r.url))
            .collect();

        run_batched(tasks, self.batching.move_batch_size)
            .await
            .into_iter()
            .map(|settled: Settled<String>| self.placeholder_on_error(settled.into_result()))
            .collect()
    }

    fn placeholder_on_error(&self, result: Result<String>) -> String {
        result.unwrap_or_else(|e| {
            debug!(error = %e, "Name unresolved, using placeholder");
            self.batching.placeholder.clone()
        })
    }
}
