//! dexcards - Batched, fault-tolerant fan-out over a creature catalog.
//!
//! ## Architecture
//!
//! A search names a handful of catalog identifiers. Each one fans out into
//! follow-up lookups for the localized names of its types, abilities and
//! moves:
//! - **Fetcher**: One GET per URL, decoded as JSON
//! - **Resolver**: Picks the display name for the configured language
//! - **Assembler**: Builds one record per identifier, or a tombstone
//! - **Orchestrator**: Runs a whole search and hands it to a renderer
//!
//! ## Epistemic Design
//!
//! - K_i (Knowledge): One render item per identifier, in input order
//! - B_i (Beliefs): Every remote lookup may fail (Result, Settled)
//! - I^R (Resolvable): Language chain, batch size, placeholder, random range
//! - I^B (Bounded): Network failures degrade to placeholders or tombstones

pub mod client;
pub mod models;
pub mod pipeline;
pub mod render;

// Re-exports for convenience
pub use client::{HttpFetcher, JsonFetcher};
pub use models::{Config, DexError, Identifier, RenderItem, Result, SearchRequest};
pub use pipeline::{BatchOrchestrator, BatchReport, NameResolver, RecordAssembler, SearchSession};
pub use render::{CardBoard, JsonLines, Renderer, TextCards};
