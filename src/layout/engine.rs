//! Per-page layout reconstruction.

use crate::error::Result;
use crate::model::{
    BBox, BlockKind, Column, DetectionMethod, LayoutDecision, LayoutResult, LayoutStats,
    LayoutWarning, Page, RegionBlocks, RegionKind, RegionLayout,
};
use crate::source::{NoRegionHints, RegionHintProvider};

use super::columns::ColumnDetector;
use super::compose::ReadingOrderComposer;
use super::options::ReconstructOptions;
use super::region::{RegionFilter, Segment};
use super::rows::RowAligner;

/// Layout engine: turns one page of positioned blocks into reading order.
///
/// The engine holds nothing but validated options, so one instance can be
/// shared across threads and pages.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    options: ReconstructOptions,
}

impl LayoutEngine {
    /// Create an engine, validating the options.
    pub fn new(options: ReconstructOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    /// Create an engine with default options.
    pub fn with_defaults() -> Self {
        Self {
            options: ReconstructOptions::default(),
        }
    }

    /// Options in use.
    pub fn options(&self) -> &ReconstructOptions {
        &self.options
    }

    /// Reconstruct a page without table or figure hints.
    pub fn reconstruct(&self, page: &Page) -> Result<LayoutResult> {
        self.reconstruct_with_hints(page, &NoRegionHints)
    }

    /// Reconstruct a page using external table and figure regions.
    ///
    /// Fails only on malformed geometry. Every input block appears exactly
    /// once in the result, whatever the detected layout.
    pub fn reconstruct_with_hints(
        &self,
        page: &Page,
        hints: &dyn RegionHintProvider,
    ) -> Result<LayoutResult> {
        let options = &self.options;
        page.validate(options.bounds_tolerance)?;

        let tables = hints.table_regions(page);
        let figures = hints.figure_regions(page);

        let filter = RegionFilter::new(options);
        let filtered = filter.filter(page, &tables, &figures)?;

        let extent = filtered.body_extent(page);
        let wide: Vec<bool> = filtered
            .groups
            .iter()
            .map(|g| extent.map_or(true, |e| filter.is_wide(&g.bbox, e)))
            .collect();
        let separators: Vec<BBox> = filtered
            .groups
            .iter()
            .zip(&wide)
            .filter(|(g, w)| {
                **w && matches!(
                    g.kind,
                    BlockKind::CandidateTable | BlockKind::CandidateFigure
                )
            })
            .map(|(g, _)| g.bbox)
            .collect();

        let segments = filter.carve(page, &filtered, &separators);

        let mut body_regions = Vec::with_capacity(segments.len());
        let mut warnings = Vec::new();
        for region in segments
            .iter()
            .flat_map(|segment| self.resolve_segment(page, &filter, segment))
        {
            if region.decision.confidence < options.ambiguity_floor {
                log::warn!(
                    "Page {}: ambiguous layout in region {} (confidence {:.3})",
                    page.page_index,
                    body_regions.len(),
                    region.decision.confidence
                );
                warnings.push(LayoutWarning::AmbiguousLayout {
                    region: body_regions.len(),
                    confidence: region.decision.confidence,
                });
            }
            body_regions.push(region);
        }

        let reading_order =
            ReadingOrderComposer::new(options).compose(page, &body_regions, &filtered.groups, &wide);
        debug_assert_eq!(reading_order.len(), page.block_count());

        let mut stats = LayoutStats::new();
        let mut regions = RegionBlocks::default();
        let ordered_blocks: Vec<_> = reading_order
            .iter()
            .map(|&i| {
                let kind = filtered.kinds[i];
                stats.add_block(kind);
                let block = page.blocks[i].clone().with_kind(kind);
                if !kind.is_body() {
                    regions.push(block.clone());
                }
                block
            })
            .collect();
        for region in &body_regions {
            stats.add_region(region);
        }

        let layout_decision = dominant_decision(&body_regions);

        log::debug!(
            "Page {}: {} blocks, {} regions, {} column(s) via {:?}",
            page.page_index,
            ordered_blocks.len(),
            body_regions.len(),
            layout_decision.column_count,
            layout_decision.method_used
        );

        Ok(LayoutResult {
            page_index: page.page_index,
            ordered_blocks,
            reading_order,
            layout_decision,
            regions,
            body_regions,
            warnings,
            stats,
        })
    }

    /// Detect columns and rows for one carved segment.
    ///
    /// Blocks that reach across a detected column boundary are cut out as
    /// full-width bands, and the pieces between them are resolved again.
    fn resolve_segment(
        &self,
        page: &Page,
        filter: &RegionFilter<'_>,
        segment: &Segment,
    ) -> Vec<RegionLayout> {
        let boxes: Vec<BBox> = segment
            .members
            .iter()
            .map(|&i| page.blocks[i].bbox)
            .collect();

        let detector = ColumnDetector::new(&self.options);
        let mut decision = match segment.kind {
            RegionKind::FullWidth => LayoutDecision::single(DetectionMethod::FullWidth, 1.0),
            RegionKind::Columnar => detector.detect(&boxes, page.width),
        };

        let crossing: Vec<usize> = detector
            .crossing(&boxes, &decision)
            .into_iter()
            .map(|pos| segment.members[pos])
            .collect();
        if !crossing.is_empty() {
            return filter
                .split_segment(page, segment, &crossing)
                .iter()
                .flat_map(|part| self.resolve_segment(page, filter, part))
                .collect();
        }

        let bands = detector.assign(&boxes, &mut decision, page.width);

        let aligner = RowAligner::new(&self.options);
        let columns = bands
            .into_iter()
            .map(|band| {
                let members: Vec<usize> = band.members.iter().map(|&p| segment.members[p]).collect();
                Column {
                    x_range: band.x_range,
                    rows: aligner.align(page, &members),
                    confidence: band.confidence,
                }
            })
            .collect();

        vec![RegionLayout {
            kind: segment.kind,
            bbox: BBox::enclosing(boxes.iter()).unwrap_or_default(),
            decision,
            columns,
        }]
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Decision of the columnar region with the most blocks, else the first region.
fn dominant_decision(regions: &[RegionLayout]) -> LayoutDecision {
    let mut best: Option<&RegionLayout> = None;
    for region in regions.iter().filter(|r| r.kind == RegionKind::Columnar) {
        if best.map_or(true, |b| region.block_count() > b.block_count()) {
            best = Some(region);
        }
    }
    best.or_else(|| regions.first())
        .map(|r| r.decision.clone())
        .unwrap_or_else(|| LayoutDecision::single(DetectionMethod::InsufficientSignal, 1.0))
}
