//! Collaborator interfaces: where pages and region hints come from.
//!
//! OCR engines and PDF content-stream parsers live outside this crate.
//! They plug in by implementing [`BlockSource`]; table and figure detectors
//! plug in through [`RegionHintProvider`].
//!
//! # Example
//!
//! ```
//! use unlayout::source::{BlockSource, MemorySource};
//! use unlayout::{BBox, Page, TextBlock};
//!
//! let page = Page::letter(0).with_block(TextBlock::new(
//!     "Hello",
//!     BBox::new(72.0, 72.0, 200.0, 84.0),
//!     12.0,
//! ));
//! let source = MemorySource::new(vec![page]);
//! assert_eq!(source.page_count(), 1);
//! assert!(source.get_page(0).is_ok());
//! ```

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::model::{BBox, Page};

/// Trait for producers of positioned text blocks.
///
/// Implementations must return pages with page-local coordinates:
/// `0 <= x0 <= x1 <= width` and `0 <= y0 <= y1 <= height`.
pub trait BlockSource: Send + Sync {
    /// Number of pages available.
    fn page_count(&self) -> usize;

    /// Load a complete page.
    fn get_page(&self, page_index: usize) -> Result<Page>;
}

/// Trait for external table and figure detectors.
///
/// Both methods default to "no regions".
pub trait RegionHintProvider: Send + Sync {
    /// Bounding boxes of tables on the page.
    fn table_regions(&self, _page: &Page) -> Vec<BBox> {
        Vec::new()
    }

    /// Bounding boxes of figures on the page.
    fn figure_regions(&self, _page: &Page) -> Vec<BBox> {
        Vec::new()
    }
}

/// A hint provider that never reports any region.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRegionHints;

impl RegionHintProvider for NoRegionHints {}

/// Precomputed table and figure regions keyed by page index.
#[derive(Debug, Clone, Default)]
pub struct RegionHints {
    tables: HashMap<usize, Vec<BBox>>,
    figures: HashMap<usize, Vec<BBox>>,
}

impl RegionHints {
    /// Create an empty hint set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table region on a page.
    pub fn add_table(&mut self, page_index: usize, bbox: BBox) {
        self.tables.entry(page_index).or_default().push(bbox);
    }

    /// Register a figure region on a page.
    pub fn add_figure(&mut self, page_index: usize, bbox: BBox) {
        self.figures.entry(page_index).or_default().push(bbox);
    }

    /// Builder form of [`add_table`](Self::add_table).
    pub fn with_table(mut self, page_index: usize, bbox: BBox) -> Self {
        self.add_table(page_index, bbox);
        self
    }

    /// Builder form of [`add_figure`](Self::add_figure).
    pub fn with_figure(mut self, page_index: usize, bbox: BBox) -> Self {
        self.add_figure(page_index, bbox);
        self
    }

    /// Check if no hints are registered.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.figures.is_empty()
    }
}

impl RegionHintProvider for RegionHints {
    fn table_regions(&self, page: &Page) -> Vec<BBox> {
        self.tables
            .get(&page.page_index)
            .cloned()
            .unwrap_or_default()
    }

    fn figure_regions(&self, page: &Page) -> Vec<BBox> {
        self.figures
            .get(&page.page_index)
            .cloned()
            .unwrap_or_default()
    }
}

/// An in-memory block source over already-extracted pages.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pages: Vec<Page>,
}

impl MemorySource {
    /// Create a source from pages; each page is re-indexed by position.
    pub fn new(pages: Vec<Page>) -> Self {
        let pages = pages
            .into_iter()
            .enumerate()
            .map(|(i, mut page)| {
                page.page_index = i;
                for block in &mut page.blocks {
                    block.page_index = i;
                }
                page
            })
            .collect();
        Self { pages }
    }

    /// Append a page.
    pub fn push(&mut self, mut page: Page) {
        let index = self.pages.len();
        page.page_index = index;
        for block in &mut page.blocks {
            block.page_index = index;
        }
        self.pages.push(page);
    }
}

impl BlockSource for MemorySource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn get_page(&self, page_index: usize) -> Result<Page> {
        self.pages
            .get(page_index)
            .cloned()
            .ok_or(Error::PageOutOfRange(page_index, self.pages.len()))
    }
}
