//! Heuristic estimator: median block width against page width.
//!
//! Narrow blocks suggest columns. Every column count that the median width
//! can tile across the page is tried with evenly spaced boundaries. A
//! candidate scores the fraction of blocks that fit inside one band, scaled
//! by the fraction of bands that hold any block; ties go to the larger
//! count. If no candidate scores at least one half, the estimator falls
//! back to a single column.

use std::cmp::Ordering;

use crate::model::{BBox, ColumnProposal, Estimator};

use super::super::options::ReconstructOptions;

/// Gutter allowance added to the median width when tiling the page.
const GUTTER_FACTOR: f32 = 1.1;

/// Propose a column count from block widths.
pub fn estimate(boxes: &[BBox], page_width: f32, options: &ReconstructOptions) -> ColumnProposal {
    let Some(median_width) = median(boxes.iter().map(BBox::width)) else {
        return ColumnProposal::single(Estimator::Heuristic, 1.0);
    };
    let ratio = median_width / page_width;

    if ratio >= options.heuristic_width_ratio || options.max_columns < 2 {
        return ColumnProposal::single(Estimator::Heuristic, (0.5 + ratio / 2.0).min(1.0));
    }

    let tiles = if median_width > 0.0 {
        (page_width / (median_width * GUTTER_FACTOR)).floor() as usize
    } else {
        options.max_columns
    };
    let max_count = tiles.clamp(2, options.max_columns);

    let x_min = boxes.iter().map(|b| b.x0).fold(f32::MAX, f32::min);
    let x_max = boxes.iter().map(|b| b.x1).fold(f32::MIN, f32::max);

    let mut best: Option<(usize, Vec<f32>, f32)> = None;
    for count in 2..=max_count {
        let step = (x_max - x_min) / count as f32;
        let boundaries: Vec<f32> = (1..count).map(|i| x_min + step * i as f32).collect();
        let fit = fit_fraction(boxes, &boundaries, options.column_margin_tolerance)
            * occupancy(boxes, &boundaries);
        if best.as_ref().map_or(true, |(_, _, f)| fit >= *f) {
            best = Some((count, boundaries, fit));
        }
    }

    log::debug!(
        "Heuristic: width_ratio={:.3} tiles={} best={:?}",
        ratio,
        tiles,
        best.as_ref().map(|(c, _, f)| (*c, *f))
    );

    match best {
        Some((count, boundaries, fit)) if fit >= 0.5 => ColumnProposal {
            estimator: Estimator::Heuristic,
            column_count: count,
            boundaries,
            score: fit,
        },
        Some((_, _, fit)) => ColumnProposal::single(Estimator::Heuristic, 1.0 - fit),
        None => ColumnProposal::single(Estimator::Heuristic, 0.5),
    }
}

/// Fraction of boxes lying inside a single column band.
pub(super) fn fit_fraction(boxes: &[BBox], boundaries: &[f32], tolerance: f32) -> f32 {
    if boxes.is_empty() {
        return 1.0;
    }
    let fitting = boxes
        .iter()
        .filter(|b| !crosses_boundary(b, boundaries, tolerance))
        .count();
    fitting as f32 / boxes.len() as f32
}

/// Whether a box reaches more than `tolerance` past some boundary on both sides.
pub(super) fn crosses_boundary(bbox: &BBox, boundaries: &[f32], tolerance: f32) -> bool {
    boundaries
        .iter()
        .any(|&x| bbox.x0 < x - tolerance && bbox.x1 > x + tolerance)
}

/// Fraction of column bands whose range holds at least one box center.
fn occupancy(boxes: &[BBox], boundaries: &[f32]) -> f32 {
    let mut used = vec![false; boundaries.len() + 1];
    for b in boxes {
        used[boundaries.partition_point(|&x| x <= b.x_center())] = true;
    }
    used.iter().filter(|&&u| u).count() as f32 / used.len() as f32
}

fn median<I>(values: I) -> Option<f32>
where
    I: Iterator<Item = f32>,
{
    let mut values: Vec<f32> = values.collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    })
}
