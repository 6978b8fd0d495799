//! Reconstruction result with warnings and statistics.

use serde::{Deserialize, Serialize};

use super::{BlockKind, LayoutDecision, RegionLayout, Row, TextBlock};

/// Result of reconstructing one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    /// Index of the reconstructed page
    pub page_index: usize,

    /// Every input block exactly once, in reading order
    pub ordered_blocks: Vec<TextBlock>,

    /// Input index of each entry in [`ordered_blocks`](Self::ordered_blocks)
    pub reading_order: Vec<usize>,

    /// Decision of the dominant body region
    pub layout_decision: LayoutDecision,

    /// Blocks routed out of column analysis
    pub regions: RegionBlocks,

    /// Body regions, top to bottom
    pub body_regions: Vec<RegionLayout>,

    /// Non-fatal findings
    pub warnings: Vec<LayoutWarning>,

    /// Counters
    pub stats: LayoutStats,
}

impl LayoutResult {
    /// Plain text of the page in reading order, one block per line.
    pub fn plain_text(&self) -> String {
        self.ordered_blocks
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Like [`plain_text`](Self::plain_text) but without running headers and footers.
    pub fn body_text(&self) -> String {
        self.ordered_blocks
            .iter()
            .filter(|b| {
                !matches!(
                    b.kind,
                    BlockKind::CandidateHeader | BlockKind::CandidateFooter
                )
            })
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Body rows in region, column, row order.
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.body_regions
            .iter()
            .flat_map(|r| r.columns.iter())
            .flat_map(|c| c.rows.iter())
    }

    /// Whether any region was flagged as ambiguous.
    pub fn is_low_confidence(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, LayoutWarning::AmbiguousLayout { .. }))
    }
}

/// Blocks filtered out before column analysis, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionBlocks {
    /// Running headers
    pub header: Vec<TextBlock>,
    /// Running footers
    pub footer: Vec<TextBlock>,
    /// Table text
    pub table: Vec<TextBlock>,
    /// Figure text
    pub figure: Vec<TextBlock>,
}

impl RegionBlocks {
    /// Route a block into the bucket matching its kind.
    ///
    /// Body blocks are ignored.
    pub fn push(&mut self, block: TextBlock) {
        match block.kind {
            BlockKind::CandidateHeader => self.header.push(block),
            BlockKind::CandidateFooter => self.footer.push(block),
            BlockKind::CandidateTable => self.table.push(block),
            BlockKind::CandidateFigure => self.figure.push(block),
            BlockKind::Body => {}
        }
    }

    /// Total number of routed blocks.
    pub fn len(&self) -> usize {
        self.header.len() + self.footer.len() + self.table.len() + self.figure.len()
    }

    /// Check if nothing was routed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Non-fatal findings attached to a [`LayoutResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayoutWarning {
    /// Confidence stayed below the absolute floor after fallback
    AmbiguousLayout {
        /// Index into [`LayoutResult::body_regions`]
        region: usize,
        /// The low confidence value
        confidence: f32,
    },
}

/// Statistics collected during reconstruction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutStats {
    /// Total number of input blocks
    pub block_count: u32,
    /// Blocks that went through column analysis
    pub body_count: u32,
    /// Header blocks
    pub header_count: u32,
    /// Footer blocks
    pub footer_count: u32,
    /// Table blocks
    pub table_count: u32,
    /// Figure blocks
    pub figure_count: u32,
    /// Body regions
    pub region_count: u32,
    /// Columns across all regions
    pub column_count: u32,
    /// Rows across all columns
    pub row_count: u32,
}

impl LayoutStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a block by kind.
    pub fn add_block(&mut self, kind: BlockKind) {
        self.block_count += 1;
        match kind {
            BlockKind::Body => self.body_count += 1,
            BlockKind::CandidateHeader => self.header_count += 1,
            BlockKind::CandidateFooter => self.footer_count += 1,
            BlockKind::CandidateTable => self.table_count += 1,
            BlockKind::CandidateFigure => self.figure_count += 1,
        }
    }

    /// Count a resolved region.
    pub fn add_region(&mut self, region: &RegionLayout) {
        self.region_count += 1;
        self.column_count += region.columns.len() as u32;
        self.row_count += region
            .columns
            .iter()
            .map(|c| c.rows.len() as u32)
            .sum::<u32>();
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &LayoutStats) {
        self.block_count += other.block_count;
        self.body_count += other.body_count;
        self.header_count += other.header_count;
        self.footer_count += other.footer_count;
        self.table_count += other.table_count;
        self.figure_count += other.figure_count;
        self.region_count += other.region_count;
        self.column_count += other.column_count;
        self.row_count += other.row_count;
    }
}
