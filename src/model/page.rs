//! Page-level types.

use super::TextBlock;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A single page delivered by a block source.
///
/// The order of [`blocks`](Self::blocks) carries no meaning for layout,
/// but it is the tie-breaker of last resort, so identical input always
/// yields identical output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page index (0-indexed)
    pub page_index: usize,

    /// Page width in points
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Text blocks on the page
    pub blocks: Vec<TextBlock>,
}

impl Page {
    /// Create a new empty page with the given dimensions.
    pub fn new(page_index: usize, width: f32, height: f32) -> Self {
        Self {
            page_index,
            width,
            height,
            blocks: Vec::new(),
        }
    }

    /// Create a new page with standard Letter size (8.5 x 11 inches).
    pub fn letter(page_index: usize) -> Self {
        Self::new(page_index, 612.0, 792.0)
    }

    /// Add a block, stamping it with this page's index.
    pub fn add_block(&mut self, block: TextBlock) {
        self.blocks.push(block.with_page(self.page_index));
    }

    /// Builder form of [`add_block`](Self::add_block).
    pub fn with_block(mut self, block: TextBlock) -> Self {
        self.add_block(block);
        self
    }

    /// Builder form taking many blocks.
    pub fn with_blocks<I>(mut self, blocks: I) -> Self
    where
        I: IntoIterator<Item = TextBlock>,
    {
        for block in blocks {
            self.add_block(block);
        }
        self
    }

    /// Get the number of blocks on the page.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Check page dimensions and block coordinates.
    ///
    /// Blocks may overshoot the page edges by at most `tolerance` points.
    pub fn validate(&self, tolerance: f32) -> Result<()> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(Error::geometry(
                self.page_index,
                format!("width must be positive, got {}", self.width),
            ));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(Error::geometry(
                self.page_index,
                format!("height must be positive, got {}", self.height),
            ));
        }

        for (i, block) in self.blocks.iter().enumerate() {
            let b = &block.bbox;
            if !b.is_finite() {
                return Err(Error::geometry(
                    self.page_index,
                    format!("block {} has non-finite coordinates", i),
                ));
            }
            if b.x0 > b.x1 || b.y0 > b.y1 {
                return Err(Error::geometry(
                    self.page_index,
                    format!(
                        "block {} is inverted: ({}, {}, {}, {})",
                        i, b.x0, b.y0, b.x1, b.y1
                    ),
                ));
            }
            if b.x0 < -tolerance
                || b.y0 < -tolerance
                || b.x1 > self.width + tolerance
                || b.y1 > self.height + tolerance
            {
                return Err(Error::geometry(
                    self.page_index,
                    format!(
                        "block {} ({}, {}, {}, {}) lies outside the {}x{} page",
                        i, b.x0, b.y0, b.x1, b.y1, self.width, self.height
                    ),
                ));
            }
        }

        Ok(())
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::letter(0)
    }
}
