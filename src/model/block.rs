//! Positioned text blocks.

use serde::{Deserialize, Serialize};

use super::BBox;

/// Classification tag carried by a [`TextBlock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// Regular body text, subject to column analysis
    #[default]
    Body,
    /// Running header
    CandidateHeader,
    /// Running footer
    CandidateFooter,
    /// Text inside a table region
    CandidateTable,
    /// Text inside a figure region
    CandidateFigure,
}

impl BlockKind {
    /// Whether blocks of this kind take part in column analysis.
    pub fn is_body(&self) -> bool {
        matches!(self, BlockKind::Body)
    }
}

/// A positioned unit of extracted text.
///
/// Blocks are produced once by a block source and never mutated by the
/// engine; downstream stages only re-tag [`kind`](Self::kind) on a copy
/// and re-order them. The text is never re-segmented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Bounding box in page coordinates
    pub bbox: BBox,
    /// Raw text content
    pub text: String,
    /// Font size in points (0.0 when unknown)
    pub font_size: f32,
    /// Index of the page this block belongs to
    pub page_index: usize,
    /// Recognition confidence (1.0 for native PDF text)
    pub source_confidence: f32,
    /// Classification tag
    pub kind: BlockKind,
}

impl TextBlock {
    /// Create a body block with full source confidence.
    pub fn new(text: impl Into<String>, bbox: BBox, font_size: f32) -> Self {
        Self {
            bbox,
            text: text.into(),
            font_size,
            page_index: 0,
            source_confidence: 1.0,
            kind: BlockKind::Body,
        }
    }

    /// Set the page index.
    pub fn with_page(mut self, page_index: usize) -> Self {
        self.page_index = page_index;
        self
    }

    /// Set the recognition confidence.
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.source_confidence = confidence;
        self
    }

    /// Set the classification tag.
    pub fn with_kind(mut self, kind: BlockKind) -> Self {
        self.kind = kind;
        self
    }

    /// Left edge.
    pub fn x0(&self) -> f32 {
        self.bbox.x0
    }

    /// Baseline approximation (bottom edge).
    pub fn baseline(&self) -> f32 {
        self.bbox.y1
    }

    /// Vertical center.
    pub fn y_center(&self) -> f32 {
        self.bbox.y_center()
    }

    /// Horizontal center.
    pub fn x_center(&self) -> f32 {
        self.bbox.x_center()
    }
}
