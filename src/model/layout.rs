//! Derived layout structures: rows, columns and column decisions.

use serde::{Deserialize, Serialize};

use super::{BBox, TextBlock};

/// Blocks sharing a baseline band, ordered left to right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Blocks in this row, sorted by `x0` then input order
    pub blocks: Vec<TextBlock>,
    /// Input indices of [`blocks`](Self::blocks), position for position
    pub indices: Vec<usize>,
    /// Vertical center of the row extent
    pub y_center: f32,
    /// Top and bottom of the row extent
    pub y_extent: (f32, f32),
}

impl Row {
    /// Number of blocks in the row.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the row has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Row text, blocks joined by a single space.
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A vertical band of a region, read top to bottom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Left and right boundary X coordinates
    pub x_range: (f32, f32),
    /// Rows, top to bottom
    pub rows: Vec<Row>,
    /// How well the blocks conform to the band (0.0-1.0)
    pub confidence: f32,
}

impl Column {
    /// Check if an X coordinate falls within this column.
    pub fn contains(&self, x: f32) -> bool {
        x >= self.x_range.0 && x <= self.x_range.1
    }

    /// Number of blocks across all rows.
    pub fn block_count(&self) -> usize {
        self.rows.iter().map(Row::len).sum()
    }
}

/// One of the three independent column-count estimators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Estimator {
    /// k-means over block horizontal centers
    Clustering,
    /// Median block width against page width
    Heuristic,
    /// Valleys in a 1-D coverage histogram
    DensityGrid,
}

/// A single estimator's proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProposal {
    /// Which estimator produced this
    pub estimator: Estimator,
    /// Proposed number of columns
    pub column_count: usize,
    /// Proposed split coordinates (`column_count - 1` of them, ascending)
    pub boundaries: Vec<f32>,
    /// The estimator's own confidence (0.0-1.0)
    pub score: f32,
}

impl ColumnProposal {
    /// A single-column proposal.
    pub fn single(estimator: Estimator, score: f32) -> Self {
        Self {
            estimator,
            column_count: 1,
            boundaries: Vec::new(),
            score,
        }
    }
}

/// Which path of the detector produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    /// All three estimators agreed
    Consensus,
    /// Two of three estimators agreed
    Majority,
    /// All estimators disagreed; the clustering answer was used
    ClusteringFallback,
    /// Confidence fell below the threshold; degraded to one column
    ConfidenceFallback,
    /// Too few blocks to analyse; single column
    InsufficientSignal,
    /// Full-width band carved out before detection
    FullWidth,
    /// Column detection switched off in the options
    Disabled,
}

/// The column decision for one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDecision {
    /// Number of columns (1-4)
    pub column_count: usize,
    /// Split X coordinates, strictly increasing
    pub column_boundaries: Vec<f32>,
    /// Certainty in this decision (0.0-1.0)
    pub confidence: f32,
    /// Path that produced the decision
    pub method_used: DetectionMethod,
    /// Raw estimator proposals, in estimator order
    pub proposals: Vec<ColumnProposal>,
}

impl LayoutDecision {
    /// A single-column decision without estimator input.
    pub fn single(method: DetectionMethod, confidence: f32) -> Self {
        Self {
            column_count: 1,
            column_boundaries: Vec::new(),
            confidence,
            method_used: method,
            proposals: Vec::new(),
        }
    }

    /// Whether more than one column was resolved.
    pub fn is_multi_column(&self) -> bool {
        self.column_count > 1
    }
}

/// Shape of a vertical body region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    /// Blocks spanning the body width, read as one column
    FullWidth,
    /// Blocks analysed for columns
    Columnar,
}

/// A vertically bounded part of the page body with its resolved layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionLayout {
    /// Region shape
    pub kind: RegionKind,
    /// Extent of the region's blocks
    pub bbox: BBox,
    /// Column decision for this region
    pub decision: LayoutDecision,
    /// Resolved columns, left to right
    pub columns: Vec<Column>,
}

impl RegionLayout {
    /// Number of blocks across all columns.
    pub fn block_count(&self) -> usize {
        self.columns.iter().map(Column::block_count).sum()
    }
}
