//! Catalog client module.

pub mod fakes;
mod fetcher;

pub use fetcher::*;
