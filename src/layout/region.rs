//! Region filtering and body carving.
//!
//! Headers, footers, tables and figures are tagged and pulled out of the
//! body before column analysis. The remaining body is then cut into
//! vertical segments: runs of blocks that span the body width, and runs of
//! narrower blocks that may sit in columns. Each segment is analysed on its
//! own, so the column count can change down the page.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::model::{BBox, BlockKind, Page, RegionKind, TextBlock};

use super::options::ReconstructOptions;

/// Page numbers, short all-caps titles, chapter markers and dates.
static HEADER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:\d+|[A-Z][A-Z\s&]{1,50}|(?:Chapter|Section|Part)\s+\d+.*|\d{1,2}[/-]\d{1,2}[/-]\d{2,4}|\d{4}-\d{2}-\d{2})$",
    )
    .expect("valid header regex")
});

/// Page indicators, dates, copyright lines, markings and file paths.
static FOOTER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:\d+$|Page\s+\d+|-\s*\d+\s*-$|\d{1,2}[/-]\d{1,2}[/-]\d{2,4}$|\d{4}-\d{2}-\d{2}$|©\s*\d{4}|Copyright\s+\d{4}|Confidential|Internal|Draft|[A-Z]:\\|/[a-zA-Z/]+$)",
    )
    .expect("valid footer regex")
});

/// Blocks routed out of the body that are re-inserted as one unit.
#[derive(Debug, Clone)]
pub struct RoutedGroup {
    /// Kind shared by all members
    pub kind: BlockKind,
    /// Input indices of the members
    pub members: Vec<usize>,
    /// Extent of the members (or of the hint region, if larger)
    pub bbox: BBox,
}

/// Output of [`RegionFilter::filter`].
#[derive(Debug, Clone)]
pub struct FilteredPage {
    /// Final kind of every input block, by input index
    pub kinds: Vec<BlockKind>,
    /// Input indices of body blocks
    pub body: Vec<usize>,
    /// Routed groups: header, footer, then tables and figures
    pub groups: Vec<RoutedGroup>,
}

impl FilteredPage {
    /// Horizontal extent of the body blocks, `None` for an empty body.
    pub fn body_extent(&self, page: &Page) -> Option<(f32, f32)> {
        BBox::enclosing(self.body.iter().map(|&i| &page.blocks[i].bbox)).map(|b| (b.x0, b.x1))
    }
}

/// A vertical run of body blocks analysed as one unit.
#[derive(Debug, Clone)]
pub struct Segment {
    /// Whether the blocks span the body or may sit in columns
    pub kind: RegionKind,
    /// Input indices of the members
    pub members: Vec<usize>,
}

/// Tags non-body blocks and carves the body into vertical segments.
pub struct RegionFilter<'a> {
    options: &'a ReconstructOptions,
}

impl<'a> RegionFilter<'a> {
    /// Create a region filter.
    pub fn new(options: &'a ReconstructOptions) -> Self {
        Self { options }
    }

    /// Classify every block of the page.
    ///
    /// Nothing is dropped: every input index ends up either in
    /// [`FilteredPage::body`] or in exactly one routed group.
    pub fn filter(&self, page: &Page, tables: &[BBox], figures: &[BBox]) -> Result<FilteredPage> {
        if !(page.height > 0.0) {
            return Err(Error::geometry(
                page.page_index,
                format!("height must be positive, got {}", page.height),
            ));
        }

        let mut kinds = Vec::with_capacity(page.blocks.len());
        let mut body = Vec::new();
        let mut headers = Vec::new();
        let mut footers = Vec::new();
        let mut table_hits: Vec<Vec<usize>> = vec![Vec::new(); tables.len()];
        let mut figure_hits: Vec<Vec<usize>> = vec![Vec::new(); figures.len()];
        let mut loose_tables = Vec::new();
        let mut loose_figures = Vec::new();

        for (i, block) in page.blocks.iter().enumerate() {
            let table = best_region(&block.bbox, tables);
            let figure = best_region(&block.bbox, figures);

            let kind = match block.kind {
                BlockKind::Body => {
                    if table.is_some() {
                        BlockKind::CandidateTable
                    } else if figure.is_some() {
                        BlockKind::CandidateFigure
                    } else if self.options.detect_headers_footers && self.is_header(block, page) {
                        BlockKind::CandidateHeader
                    } else if self.options.detect_headers_footers && self.is_footer(block, page) {
                        BlockKind::CandidateFooter
                    } else {
                        BlockKind::Body
                    }
                }
                tagged => tagged,
            };

            match kind {
                BlockKind::Body => body.push(i),
                BlockKind::CandidateHeader => headers.push(i),
                BlockKind::CandidateFooter => footers.push(i),
                BlockKind::CandidateTable => match table {
                    Some(r) => table_hits[r].push(i),
                    None => loose_tables.push(i),
                },
                BlockKind::CandidateFigure => match figure {
                    Some(r) => figure_hits[r].push(i),
                    None => loose_figures.push(i),
                },
            }
            kinds.push(kind);
        }

        let mut groups = Vec::new();
        for (kind, members) in [
            (BlockKind::CandidateHeader, headers),
            (BlockKind::CandidateFooter, footers),
        ] {
            if let Some(bbox) = members_bbox(page, &members) {
                groups.push(RoutedGroup {
                    kind,
                    members,
                    bbox,
                });
            }
        }
        push_hinted(
            &mut groups,
            page,
            BlockKind::CandidateTable,
            tables,
            table_hits,
        );
        push_hinted(
            &mut groups,
            page,
            BlockKind::CandidateFigure,
            figures,
            figure_hits,
        );
        push_loose(&mut groups, page, BlockKind::CandidateTable, loose_tables);
        push_loose(&mut groups, page, BlockKind::CandidateFigure, loose_figures);

        log::debug!(
            "Page {}: {} body blocks, {} routed groups",
            page.page_index,
            body.len(),
            groups.len()
        );

        Ok(FilteredPage {
            kinds,
            body,
            groups,
        })
    }

    /// Whether a box spans enough of the body extent to be read full-width.
    pub fn is_wide(&self, bbox: &BBox, extent: (f32, f32)) -> bool {
        let extent_width = extent.1 - extent.0;
        extent_width <= 0.0 || bbox.width() >= self.options.full_width_ratio * extent_width
    }

    /// Cut the body into vertical segments.
    ///
    /// `separators` are boxes of routed groups that span the body; they end
    /// the current segment. Column-candidate segments smaller than
    /// `min_blocks_for_columns` are folded into a neighbouring full-width
    /// segment.
    pub fn carve(&self, page: &Page, filtered: &FilteredPage, separators: &[BBox]) -> Vec<Segment> {
        let Some(extent) = filtered.body_extent(page) else {
            return Vec::new();
        };

        enum Item {
            Block(usize, bool),
            Separator,
        }

        let mut items: Vec<(f32, f32, usize, Item)> = filtered
            .body
            .iter()
            .map(|&i| {
                let b = &page.blocks[i].bbox;
                (b.y_center(), b.x0, i, Item::Block(i, self.is_wide(b, extent)))
            })
            .collect();
        items.extend(
            separators
                .iter()
                .map(|b| (b.y_center(), b.x0, usize::MAX, Item::Separator)),
        );
        items.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(Ordering::Equal)
                .then(a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
                .then(a.2.cmp(&b.2))
        });

        let mut segments: Vec<Segment> = Vec::new();
        let mut run: Vec<Segment> = Vec::new();
        let mut current: Option<Segment> = None;
        for (_, _, _, item) in items {
            match item {
                Item::Separator => {
                    if let Some(seg) = current.take() {
                        run.push(seg);
                    }
                    segments.extend(self.fold_small_segments(std::mem::take(&mut run)));
                }
                Item::Block(i, wide) => extend_run(&mut run, &mut current, i, wide),
            }
        }
        if let Some(seg) = current {
            run.push(seg);
        }
        segments.extend(self.fold_small_segments(run));

        log::debug!(
            "Page {}: carved {} body segments ({:?})",
            page.page_index,
            segments.len(),
            segments.iter().map(|s| s.kind).collect::<Vec<_>>()
        );
        segments
    }

    /// Split a columnar segment around blocks that cross its column boundaries.
    ///
    /// `crossing` holds input indices. Those blocks become full-width bands
    /// at their vertical position; the blocks between them form new
    /// segments, folded the same way as in [`carve`](Self::carve).
    pub fn split_segment(&self, page: &Page, segment: &Segment, crossing: &[usize]) -> Vec<Segment> {
        let mut members = segment.members.clone();
        members.sort_by(|&a, &b| {
            let (ba, bb) = (&page.blocks[a].bbox, &page.blocks[b].bbox);
            ba.y_center()
                .partial_cmp(&bb.y_center())
                .unwrap_or(Ordering::Equal)
                .then(ba.x0.partial_cmp(&bb.x0).unwrap_or(Ordering::Equal))
                .then(a.cmp(&b))
        });

        let mut run: Vec<Segment> = Vec::new();
        let mut current: Option<Segment> = None;
        for i in members {
            extend_run(&mut run, &mut current, i, crossing.contains(&i));
        }
        if let Some(seg) = current {
            run.push(seg);
        }

        let segments = self.fold_small_segments(run);
        log::debug!(
            "Page {}: {} block(s) cross column boundaries, split into {:?}",
            page.page_index,
            crossing.len(),
            segments.iter().map(|s| s.kind).collect::<Vec<_>>()
        );
        segments
    }

    /// Merge undersized columnar segments into a full-width neighbour, and
    /// adjacent full-width segments into one.
    ///
    /// Only called on segments between two separators.
    fn fold_small_segments(&self, segments: Vec<Segment>) -> Vec<Segment> {
        let min_blocks = self.options.min_blocks_for_columns;
        let mut out: Vec<Segment> = Vec::with_capacity(segments.len());
        let mut pending: Vec<usize> = Vec::new();

        for mut seg in segments {
            let small = seg.kind == RegionKind::Columnar && seg.members.len() < min_blocks;
            if small {
                match out.last_mut() {
                    Some(prev) if prev.kind == RegionKind::FullWidth => {
                        prev.members.extend(seg.members)
                    }
                    _ => pending.extend(seg.members),
                }
                continue;
            }

            if !pending.is_empty() {
                if seg.kind == RegionKind::FullWidth {
                    let mut members = std::mem::take(&mut pending);
                    members.extend(seg.members);
                    seg.members = members;
                } else {
                    out.push(Segment {
                        kind: RegionKind::Columnar,
                        members: std::mem::take(&mut pending),
                    });
                }
            }

            match out.last_mut() {
                Some(prev)
                    if prev.kind == RegionKind::FullWidth && seg.kind == RegionKind::FullWidth =>
                {
                    prev.members.extend(seg.members)
                }
                _ => out.push(seg),
            }
        }
        if !pending.is_empty() {
            out.push(Segment {
                kind: RegionKind::Columnar,
                members: pending,
            });
        }
        out
    }

    fn is_header(&self, block: &TextBlock, page: &Page) -> bool {
        if self.is_oversized(block, page) {
            return false;
        }
        let zone = page.height * self.options.header_zone;
        block.bbox.y0 < zone
            && block.bbox.y1 < zone * 2.0
            && looks_like_running_matter(block, page.width, &HEADER_PATTERN)
    }

    fn is_footer(&self, block: &TextBlock, page: &Page) -> bool {
        if self.is_oversized(block, page) {
            return false;
        }
        let zone = page.height * self.options.footer_zone;
        block.bbox.y1 > page.height - zone
            && block.bbox.y0 > page.height - zone * 2.0
            && looks_like_running_matter(block, page.width, &FOOTER_PATTERN)
    }

    fn is_oversized(&self, block: &TextBlock, page: &Page) -> bool {
        block.bbox.height() > page.height * 0.3 || block.bbox.width() > page.width * 0.8
    }
}

/// Append a block to the open segment, or start a new one on a kind change.
fn extend_run(run: &mut Vec<Segment>, current: &mut Option<Segment>, index: usize, wide: bool) {
    let kind = if wide {
        RegionKind::FullWidth
    } else {
        RegionKind::Columnar
    };
    match current.as_mut() {
        Some(seg) if seg.kind == kind => seg.members.push(index),
        _ => {
            if let Some(seg) = current.take() {
                run.push(seg);
            }
            *current = Some(Segment {
                kind,
                members: vec![index],
            });
        }
    }
}

/// Content check for running headers and footers.
///
/// Long text is never running matter. Short text qualifies when it matches
/// a typical pattern, is centred, or is set in a small font.
fn looks_like_running_matter(block: &TextBlock, page_width: f32, pattern: &Regex) -> bool {
    let text = block.text.trim();
    let len = text.chars().count();
    if !(2..=200).contains(&len) {
        return false;
    }
    if pattern.is_match(text) {
        return true;
    }
    if (block.x_center() - page_width / 2.0).abs() < page_width * 0.1 {
        return true;
    }
    block.font_size > 0.0 && block.font_size < 12.0
}

/// Index of the region holding most of the box, if it holds at least half.
fn best_region(bbox: &BBox, regions: &[BBox]) -> Option<usize> {
    let area = bbox.area();
    let mut best: Option<(usize, f32)> = None;
    for (r, region) in regions.iter().enumerate() {
        let covered = if area > 0.0 {
            bbox.intersection_area(region) / area
        } else if region.contains_point(bbox.x_center(), bbox.y_center()) {
            1.0
        } else {
            0.0
        };
        if covered >= 0.5 && best.map_or(true, |(_, c)| covered > c) {
            best = Some((r, covered));
        }
    }
    best.map(|(r, _)| r)
}

fn members_bbox(page: &Page, members: &[usize]) -> Option<BBox> {
    BBox::enclosing(members.iter().map(|&i| &page.blocks[i].bbox))
}

fn push_hinted(
    groups: &mut Vec<RoutedGroup>,
    page: &Page,
    kind: BlockKind,
    regions: &[BBox],
    hits: Vec<Vec<usize>>,
) {
    for (region, members) in regions.iter().zip(hits) {
        if let Some(bbox) = members_bbox(page, &members) {
            groups.push(RoutedGroup {
                kind,
                members,
                bbox: bbox.union(region),
            });
        }
    }
}

/// Group pre-tagged blocks without a hint region by vertical adjacency.
fn push_loose(groups: &mut Vec<RoutedGroup>, page: &Page, kind: BlockKind, mut members: Vec<usize>) {
    members.sort_by(|&a, &b| {
        let (ba, bb) = (&page.blocks[a].bbox, &page.blocks[b].bbox);
        ba.y0
            .partial_cmp(&bb.y0)
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut current: Option<RoutedGroup> = None;
    for i in members {
        let bbox = page.blocks[i].bbox;
        match current.as_mut() {
            Some(group) if bbox.y0 <= group.bbox.y1 + bbox.height() => {
                group.members.push(i);
                group.bbox = group.bbox.union(&bbox);
            }
            _ => {
                if let Some(group) = current.take() {
                    groups.push(group);
                }
                current = Some(RoutedGroup {
                    kind,
                    members: vec![i],
                    bbox,
                });
            }
        }
    }
    if let Some(group) = current {
        groups.push(group);
    }
}
