//! Card renderers: terminal text, JSON lines, and an in-memory board.

use super::Renderer;
use crate::models::{DexError, RenderItem, ResolvedRecord, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{IsTerminal, Write};

/// Text cards written to any `Write` (stdout in the CLI).
pub struct TextCards<W: Write> {
    writer: W,
    /// Show a progress bar on stderr while a batch loads
    show_progress: bool,
}

impl<W: Write> TextCards<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            show_progress: false,
        }
    }

    /// Enable the progress bar when stderr is a terminal.
    pub fn with_progress(mut self) -> Self {
        self.show_progress = std::io::stderr().is_terminal();
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_card(&mut self, record: &ResolvedRecord) -> std::io::Result<()> {
        let w = &mut self.writer;
        let none = "-".to_string();

        writeln!(w, "┌─ #{} {}", record.id, record.name)?;
        writeln!(
            w,
            "│ Normal form: {}",
            record.sprites.front.as_ref().unwrap_or(&none)
        )?;
        writeln!(
            w,
            "│ Shiny form:  {}",
            record.sprites.shiny.as_ref().unwrap_or(&none)
        )?;
        writeln!(w, "│ Height:    {}", format_height(record.height))?;
        writeln!(w, "│ Weight:    {}", format_weight(record.weight))?;
        writeln!(w, "│ Types:     {}", record.types.join(", "))?;
        writeln!(w, "│ Abilities: {}", record.abilities.join(", "))?;
        writeln!(w, "│ Moves:     {}", record.moves.join(", "))?;
        writeln!(w, "└─")
    }
}

/// Catalog heights are in decimetres.
pub fn format_height(decimetres: u32) -> String {
    format!("{:.1} m", decimetres as f64 / 10.0)
}

/// Catalog weights are in hectograms.
pub fn format_weight(hectograms: u32) -> String {
    format!("{:.1} kg", hectograms as f64 / 10.0)
}

fn io_err(context: &str) -> impl FnOnce(std::io::Error) -> DexError + '_ {
    move |e| DexError::io(context, e)
}

impl<W: Write> Renderer for TextCards<W> {
    fn clear(&mut self) -> Result<()> {
        writeln!(self.writer, "════════════════════════════════════════")
            .map_err(io_err("clearing cards"))
    }

    fn render(&mut self, items: &[RenderItem]) -> Result<()> {
        for item in items {
            let written = match item {
                RenderItem::Resolved(record) => self.write_card(record),
                RenderItem::Tombstone(tombstone) => writeln!(self.writer, "✗ {}", tombstone.reason),
            };
            written.map_err(io_err("writing card"))?;
        }
        self.writer.flush().map_err(io_err("flushing cards"))
    }

    fn progress(&self, total: usize) -> Option<ProgressBar> {
        if !self.show_progress || total < 2 {
            return None;
        }

        let pb = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} records")
        {
            pb.set_style(style.progress_chars("##-"));
        }
        Some(pb)
    }
}

/// One JSON object per item, newline separated.
pub struct JsonLines<W: Write> {
    writer: W,
}

impl<W: Write> JsonLines<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Renderer for JsonLines<W> {
    fn clear(&mut self) -> Result<()> {
        Ok(())
    }

    fn render(&mut self, items: &[RenderItem]) -> Result<()> {
        for item in items {
            let json = serde_json::to_string(item)
                .map_err(|e| DexError::Internal(format!("Failed to serialize item: {e}")))?;
            writeln!(self.writer, "{json}").map_err(io_err("writing output"))?;
        }
        self.writer.flush().map_err(io_err("flushing output"))
    }
}

/// In-memory renderer keeping every item on the board.
#[derive(Debug, Default)]
pub struct CardBoard {
    items: Vec<RenderItem>,
    loading: bool,
    loading_history: Vec<bool>,
    renders: usize,
}

impl CardBoard {
    pub fn items(&self) -> &[RenderItem] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Every `set_loading` call, in order.
    pub fn loading_history(&self) -> &[bool] {
        &self.loading_history
    }

    /// Number of non-empty batches rendered.
    pub fn renders(&self) -> usize {
        self.renders
    }
}

impl Renderer for CardBoard {
    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        self.loading_history.push(loading);
    }

    fn clear(&mut self) -> Result<()> {
        self.items.clear();
        Ok(())
    }

    fn render(&mut self, items: &[RenderItem]) -> Result<()> {
        self.items.extend_from_slice(items);
        self.renders += 1;
        Ok(())
    }
}
