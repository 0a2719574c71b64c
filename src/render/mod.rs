//! Render collaborators.
//!
//! The pipeline only hands over ordered `RenderItem`s; how they are shown is
//! up to the `Renderer` it is given.

mod cards;

pub use cards::*;

use crate::models::{RenderItem, Result};
use indicatif::ProgressBar;

/// Consumer of orchestrated batches.
pub trait Renderer {
    /// Loading started (`true`) or finished (`false`).
    fn set_loading(&mut self, _loading: bool) {}

    /// Drop previously rendered items (replace mode).
    fn clear(&mut self) -> Result<()>;

    /// Show a batch, in order.
    fn render(&mut self, items: &[RenderItem]) -> Result<()>;

    /// Progress bar over `total` records, if this renderer wants one.
    fn progress(&self, _total: usize) -> Option<ProgressBar> {
        None
    }
}
