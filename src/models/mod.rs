//! Core data models for dexcards.
//!
//! Epistemic mapping:
//! - K_i (Knowledge): Concrete types with compile-time guarantees
//! - B_i (Beliefs): Wrapped in Result/Option
//! - I^R (Resolvable): Config parameters
//! - I^B (Bounded): Error variants turned into placeholders and tombstones

mod config;
mod error;
mod query;
mod record;

pub use config::*;
pub use error::*;
pub use query::*;
pub use record::*;
