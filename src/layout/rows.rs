//! Row alignment within a column.

use std::cmp::Ordering;

use crate::model::{Page, Row};

use super::options::ReconstructOptions;

/// Groups the blocks of one column into rows.
///
/// A block joins the row above it when their vertical spans overlap by at
/// least `row_overlap_tolerance` of the smaller height, or when their
/// baselines are closer than `baseline_tolerance` times the column's median
/// font size. The grouping only depends on block geometry and input order.
pub struct RowAligner<'a> {
    options: &'a ReconstructOptions,
}

/// A row being built: input indices plus its running extent.
struct OpenRow {
    indices: Vec<usize>,
    top: f32,
    bottom: f32,
    baseline: f32,
}

impl<'a> RowAligner<'a> {
    /// Create a row aligner.
    pub fn new(options: &'a ReconstructOptions) -> Self {
        Self { options }
    }

    /// Group `members` (input indices into `page.blocks`) into rows,
    /// top to bottom.
    pub fn align(&self, page: &Page, members: &[usize]) -> Vec<Row> {
        if members.is_empty() {
            return Vec::new();
        }

        let mut sorted = members.to_vec();
        sorted.sort_by(|&a, &b| {
            let (ba, bb) = (&page.blocks[a].bbox, &page.blocks[b].bbox);
            ba.y0
                .partial_cmp(&bb.y0)
                .unwrap_or(Ordering::Equal)
                .then(ba.x0.partial_cmp(&bb.x0).unwrap_or(Ordering::Equal))
                .then(a.cmp(&b))
        });

        let baseline_slack = self.options.baseline_tolerance * median_font_size(page, members);

        let mut open: Vec<OpenRow> = Vec::new();
        for i in sorted {
            let bbox = page.blocks[i].bbox;
            let joins = open.last().is_some_and(|row| {
                let overlap = bbox.y1.min(row.bottom) - bbox.y0.max(row.top);
                let smaller = bbox.height().min(row.bottom - row.top);
                let overlaps =
                    overlap >= 0.0 && overlap >= self.options.row_overlap_tolerance * smaller;
                let same_baseline = (bbox.y1 - row.baseline).abs() < baseline_slack;
                overlaps || same_baseline
            });

            match open.last_mut() {
                Some(row) if joins => {
                    row.indices.push(i);
                    row.top = row.top.min(bbox.y0);
                    row.bottom = row.bottom.max(bbox.y1);
                }
                _ => open.push(OpenRow {
                    indices: vec![i],
                    top: bbox.y0,
                    bottom: bbox.y1,
                    baseline: bbox.y1,
                }),
            }
        }

        let mut rows: Vec<Row> = open
            .into_iter()
            .map(|mut row| {
                row.indices.sort_by(|&a, &b| {
                    page.blocks[a]
                        .bbox
                        .x0
                        .partial_cmp(&page.blocks[b].bbox.x0)
                        .unwrap_or(Ordering::Equal)
                        .then(a.cmp(&b))
                });
                Row {
                    blocks: row.indices.iter().map(|&i| page.blocks[i].clone()).collect(),
                    indices: row.indices,
                    y_center: (row.top + row.bottom) / 2.0,
                    y_extent: (row.top, row.bottom),
                }
            })
            .collect();

        rows.sort_by(|a, b| {
            a.y_center
                .partial_cmp(&b.y_center)
                .unwrap_or(Ordering::Equal)
                .then(row_left(a).partial_cmp(&row_left(b)).unwrap_or(Ordering::Equal))
                .then(a.indices.iter().min().cmp(&b.indices.iter().min()))
        });

        log::debug!("Aligned {} blocks into {} rows", members.len(), rows.len());
        rows
    }
}

fn row_left(row: &Row) -> f32 {
    row.blocks.iter().map(|b| b.bbox.x0).fold(f32::MAX, f32::min)
}

/// Median of the positive font sizes, 0.0 if there are none.
fn median_font_size(page: &Page, members: &[usize]) -> f32 {
    let mut sizes: Vec<f32> = members
        .iter()
        .map(|&i| page.blocks[i].font_size)
        .filter(|&s| s > 0.0)
        .collect();
    if sizes.is_empty() {
        return 0.0;
    }
    sizes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = sizes.len() / 2;
    if sizes.len() % 2 == 0 {
        (sizes[mid - 1] + sizes[mid]) / 2.0
    } else {
        sizes[mid]
    }
}
