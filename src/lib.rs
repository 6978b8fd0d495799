//! # unlayout
//!
//! Reading-order reconstruction for extracted document pages.
//!
//! Given the positioned text blocks of a page (from a PDF content stream
//! or an OCR engine), this library separates running headers, footers,
//! tables and figures from the body, detects 1-4 columns per vertical
//! region, groups blocks into rows and emits every block exactly once in
//! reading order.
//!
//! ## Quick Start
//!
//! ```
//! use unlayout::{reconstruct, BBox, Page, ReconstructOptions, TextBlock};
//!
//! fn main() -> unlayout::Result<()> {
//!     let mut page = Page::new(0, 600.0, 800.0);
//!     for i in 0..10 {
//!         let y = 100.0 + i as f32 * 20.0;
//!         page.add_block(TextBlock::new(format!("L{}", i), BBox::new(0.0, y, 250.0, y + 12.0), 12.0));
//!         page.add_block(TextBlock::new(format!("R{}", i), BBox::new(300.0, y, 550.0, y + 12.0), 12.0));
//!     }
//!
//!     let result = reconstruct(&page, &ReconstructOptions::default())?;
//!     assert_eq!(result.layout_decision.column_count, 2);
//!     assert_eq!(result.ordered_blocks[0].text, "L0");
//!     assert_eq!(result.ordered_blocks[10].text, "R0");
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Ensemble column detection**: clustering, width heuristic and density
//!   grid vote on the column count
//! - **Per-region layout**: full-width bands and wide tables split the page
//!   so the column count can change down the page
//! - **Lossless**: the output is a permutation of the input blocks
//! - **Parallel processing**: uses Rayon for estimators and multi-page documents

pub mod error;
pub mod layout;
pub mod model;
pub mod source;

pub use error::{Error, Result};
pub use layout::{ColumnTraversal, LayoutEngine, ReconstructOptions};
pub use model::{
    BBox, BlockKind, Column, ColumnProposal, DetectionMethod, Estimator, LayoutDecision,
    LayoutResult, LayoutStats, LayoutWarning, Page, RegionBlocks, RegionKind, RegionLayout, Row,
    TextBlock,
};
pub use source::{BlockSource, MemorySource, NoRegionHints, RegionHintProvider, RegionHints};

use rayon::prelude::*;

/// Reconstruct the reading order of one page.
///
/// # Example
///
/// ```
/// use unlayout::{reconstruct, BBox, Page, ReconstructOptions, TextBlock};
///
/// let page = Page::letter(0)
///     .with_block(TextBlock::new("second", BBox::new(72.0, 120.0, 300.0, 132.0), 11.0))
///     .with_block(TextBlock::new("first", BBox::new(72.0, 100.0, 300.0, 112.0), 11.0));
/// let result = reconstruct(&page, &ReconstructOptions::default()).unwrap();
/// assert_eq!(result.reading_order, vec![1, 0]);
/// ```
pub fn reconstruct(page: &Page, options: &ReconstructOptions) -> Result<LayoutResult> {
    LayoutEngine::new(options.clone())?.reconstruct(page)
}

/// Reconstruct one page using table and figure regions from a detector.
pub fn reconstruct_with_hints(
    page: &Page,
    hints: &dyn RegionHintProvider,
    options: &ReconstructOptions,
) -> Result<LayoutResult> {
    LayoutEngine::new(options.clone())?.reconstruct_with_hints(page, hints)
}

/// Reconstruct many pages independently.
///
/// Results are in input order; a failing page does not affect the others.
pub fn reconstruct_pages(pages: &[Page], options: &ReconstructOptions) -> Vec<Result<LayoutResult>> {
    let engine = match LayoutEngine::new(options.clone()) {
        Ok(engine) => engine,
        Err(e) => return pages.iter().map(|_| Err(e.clone())).collect(),
    };

    if options.parallel {
        pages.par_iter().map(|p| engine.reconstruct(p)).collect()
    } else {
        pages.iter().map(|p| engine.reconstruct(p)).collect()
    }
}

/// Reconstruct every page of a block source.
///
/// Pages that fail with a page-scoped error (bad geometry, source failure)
/// are logged and listed in [`DocumentLayout::skipped`]; the rest of the
/// document is still processed. Invalid options fail the whole call.
pub fn reconstruct_document(
    source: &dyn BlockSource,
    hints: &dyn RegionHintProvider,
    options: &ReconstructOptions,
) -> Result<DocumentLayout> {
    let engine = LayoutEngine::new(options.clone())?;
    let page_count = source.page_count();

    let process = |page_index: usize| {
        let result = source
            .get_page(page_index)
            .and_then(|page| engine.reconstruct_with_hints(&page, hints));
        (page_index, result)
    };
    let results: Vec<(usize, Result<LayoutResult>)> = if options.parallel {
        (0..page_count).into_par_iter().map(process).collect()
    } else {
        (0..page_count).map(process).collect()
    };

    let mut document = DocumentLayout::default();
    for (page_index, result) in results {
        match result {
            Ok(layout) => document.pages.push(layout),
            Err(e) if e.is_page_scoped() => {
                log::warn!("Skipping page {}: {}", page_index, e);
                document.skipped.push((page_index, e));
            }
            Err(e) => return Err(e),
        }
    }

    log::debug!(
        "Reconstructed {} of {} pages",
        document.pages.len(),
        page_count
    );
    Ok(document)
}

/// Result of reconstructing a whole document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentLayout {
    /// Successfully reconstructed pages, in page order
    pub pages: Vec<LayoutResult>,
    /// Pages that failed, with the reason
    pub skipped: Vec<(usize, Error)>,
}

impl DocumentLayout {
    /// Check whether every page was reconstructed.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Indices of pages flagged as ambiguous.
    pub fn low_confidence_pages(&self) -> Vec<usize> {
        self.pages
            .iter()
            .filter(|p| p.is_low_confidence())
            .map(|p| p.page_index)
            .collect()
    }

    /// Statistics summed over all reconstructed pages.
    pub fn stats(&self) -> LayoutStats {
        let mut total = LayoutStats::new();
        for page in &self.pages {
            total.merge(&page.stats);
        }
        total
    }

    /// Plain text of all pages, separated by blank lines.
    pub fn plain_text(&self) -> String {
        self.pages
            .iter()
            .map(LayoutResult::plain_text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_page(index: usize) -> Page {
        let mut page = Page::new(index, 600.0, 800.0);
        for i in 0..6 {
            let y = 100.0 + i as f32 * 20.0;
            page.add_block(TextBlock::new(
                format!("line {}", i),
                BBox::new(50.0, y, 550.0, y + 12.0),
                12.0,
            ));
        }
        page
    }

    #[test]
    fn test_reconstruct_pages_keeps_order() {
        let pages = vec![column_page(0), Page::new(1, 600.0, -1.0), column_page(2)];
        let results = reconstruct_pages(&pages, &ReconstructOptions::default());

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().page_index, 0);
        assert!(matches!(
            results[1],
            Err(Error::InvalidPageGeometry { page: 1, .. })
        ));
        assert_eq!(results[2].as_ref().unwrap().page_index, 2);
    }

    #[test]
    fn test_reconstruct_pages_invalid_options() {
        let pages = vec![column_page(0), column_page(1)];
        let options = ReconstructOptions::default().with_max_columns(0);
        let results = reconstruct_pages(&pages, &options);
        assert!(results
            .iter()
            .all(|r| matches!(r, Err(Error::InvalidOptions(_)))));
    }

    #[test]
    fn test_reconstruct_document_skips_bad_pages() {
        let source = MemorySource::new(vec![
            column_page(0),
            Page::new(0, 0.0, 800.0),
            column_page(0),
        ]);
        let document =
            reconstruct_document(&source, &NoRegionHints, &ReconstructOptions::default()).unwrap();

        assert_eq!(document.pages.len(), 2);
        assert_eq!(document.pages[1].page_index, 2);
        assert_eq!(document.skipped.len(), 1);
        assert_eq!(document.skipped[0].0, 1);
        assert!(!document.is_complete());
        assert_eq!(document.stats().block_count, 12);
    }

    #[test]
    fn test_document_plain_text() {
        let source = MemorySource::new(vec![column_page(0), column_page(1)]);
        let options = ReconstructOptions::default().sequential();
        let document = reconstruct_document(&source, &NoRegionHints, &options).unwrap();
        let text = document.plain_text();
        assert!(text.starts_with("line 0\nline 1"));
        assert_eq!(text.matches("\n\n").count(), 1);
        assert!(document.low_confidence_pages().is_empty());
    }
}
