//! Density-grid estimator: valleys in a horizontal coverage histogram.

use crate::model::{BBox, ColumnProposal, Estimator};

use super::super::options::ReconstructOptions;

/// A run of low-coverage bins between two populated areas.
#[derive(Debug, Clone, Copy)]
struct Valley {
    start: usize,
    end: usize,
    depth: f32,
}

impl Valley {
    fn width(&self) -> usize {
        self.end - self.start
    }
}

/// Propose a column count from gutters in the coverage histogram.
///
/// Each block adds its height to every bin it overlaps, scaled by the
/// overlapped fraction of the bin. Runs of bins at or below the valley
/// threshold that have coverage on both sides are gutters.
pub fn estimate(boxes: &[BBox], page_width: f32, options: &ReconstructOptions) -> ColumnProposal {
    let bins = options.density_bins;
    let bin_width = page_width / bins as f32;
    let coverage = histogram(boxes, bins, bin_width);

    let peak = coverage.iter().cloned().fold(0.0f32, f32::max);
    if peak <= 0.0 {
        return ColumnProposal::single(Estimator::DensityGrid, 1.0);
    }
    let threshold = peak * options.valley_threshold;

    let Some(first) = coverage.iter().position(|&c| c > threshold) else {
        return ColumnProposal::single(Estimator::DensityGrid, 1.0);
    };
    let last = coverage.iter().rposition(|&c| c > threshold).unwrap_or(first);

    // Running maxima from each side, for valley depth.
    let mut left_max = vec![0.0f32; bins];
    let mut right_max = vec![0.0f32; bins];
    let mut running = 0.0f32;
    for b in first..=last {
        running = running.max(coverage[b]);
        left_max[b] = running;
    }
    running = 0.0;
    for b in (first..=last).rev() {
        running = running.max(coverage[b]);
        right_max[b] = running;
    }

    let mut valleys: Vec<Valley> = Vec::new();
    let mut deepest_dip = 0.0f32;
    let mut b = first + 1;
    while b < last {
        if coverage[b] <= threshold {
            let start = b;
            while b < last && coverage[b] <= threshold {
                b += 1;
            }
            let run = &coverage[start..b];
            let mean = run.iter().sum::<f32>() / run.len() as f32;
            let shoulder = left_max[start - 1].min(right_max[b]);
            valleys.push(Valley {
                start,
                end: b,
                depth: 1.0 - mean / shoulder,
            });
        } else {
            let shoulder = left_max[b - 1].min(right_max[b + 1]);
            if shoulder > 0.0 {
                deepest_dip = deepest_dip.max(1.0 - coverage[b] / shoulder);
            }
            b += 1;
        }
    }

    let limit = options.max_columns.saturating_sub(1);
    if valleys.len() > limit {
        valleys.sort_by(|a, b| {
            b.depth
                .partial_cmp(&a.depth)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.width().cmp(&a.width()))
                .then(a.start.cmp(&b.start))
        });
        valleys.truncate(limit);
        valleys.sort_by_key(|v| v.start);
    }

    log::debug!(
        "Density: peak={:.1} valleys={:?} deepest_dip={:.3}",
        peak,
        valleys
            .iter()
            .map(|v| (v.start, v.end, v.depth))
            .collect::<Vec<_>>(),
        deepest_dip
    );

    if valleys.is_empty() {
        return ColumnProposal::single(
            Estimator::DensityGrid,
            (1.0 - deepest_dip * 0.5).clamp(0.0, 1.0),
        );
    }

    let boundaries = valleys
        .iter()
        .map(|v| (v.start + v.end) as f32 / 2.0 * bin_width)
        .collect();
    let score = valleys
        .iter()
        .map(|v| v.depth)
        .fold(1.0f32, f32::min)
        .clamp(0.0, 1.0);

    ColumnProposal {
        estimator: Estimator::DensityGrid,
        column_count: valleys.len() + 1,
        boundaries,
        score,
    }
}

fn histogram(boxes: &[BBox], bins: usize, bin_width: f32) -> Vec<f32> {
    let mut coverage = vec![0.0f32; bins];
    if bin_width <= 0.0 {
        return coverage;
    }
    for b in boxes {
        let weight = b.height().max(1.0);
        let first = ((b.x0 / bin_width).floor().max(0.0) as usize).min(bins - 1);
        let last = ((b.x1 / bin_width).floor().max(0.0) as usize).min(bins - 1);
        for (bin, slot) in coverage.iter_mut().enumerate().take(last + 1).skip(first) {
            let lo = bin as f32 * bin_width;
            let hi = lo + bin_width;
            let overlap = b.x1.min(hi) - b.x0.max(lo);
            if overlap > 0.0 {
                *slot += weight * overlap / bin_width;
            } else if b.width() == 0.0 {
                *slot += weight;
            }
        }
    }
    coverage
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(x0: f32, x1: f32, count: usize) -> Vec<BBox> {
        (0..count)
            .map(|i| {
                let y = i as f32 * 20.0;
                BBox::new(x0, y, x1, y + 12.0)
            })
            .collect()
    }

    #[test]
    fn test_two_column_gutter() {
        let mut boxes = band(0.0, 250.0, 10);
        boxes.extend(band(300.0, 550.0, 10));
        let p = estimate(&boxes, 600.0, &ReconstructOptions::default());

        assert_eq!(p.column_count, 2);
        assert!(p.boundaries[0] > 250.0 && p.boundaries[0] < 300.0);
        assert_eq!(p.score, 1.0);
    }

    #[test]
    fn test_three_column_gutters() {
        let mut boxes = band(0.0, 180.0, 6);
        boxes.extend(band(230.0, 370.0, 6));
        boxes.extend(band(420.0, 600.0, 6));
        let p = estimate(&boxes, 600.0, &ReconstructOptions::default());

        assert_eq!(p.column_count, 3);
        assert!(p.boundaries[0] > 180.0 && p.boundaries[0] < 230.0);
        assert!(p.boundaries[1] > 370.0 && p.boundaries[1] < 420.0);
    }

    #[test]
    fn test_single_block_run_has_no_valley() {
        let boxes = band(50.0, 550.0, 10);
        let p = estimate(&boxes, 600.0, &ReconstructOptions::default());
        assert_eq!(p.column_count, 1);
        assert_eq!(p.score, 1.0);
    }

    #[test]
    fn test_valleys_capped_by_max_columns() {
        let mut boxes = band(0.0, 180.0, 6);
        boxes.extend(band(230.0, 370.0, 6));
        boxes.extend(band(420.0, 600.0, 6));
        let options = ReconstructOptions::default().with_max_columns(2);
        let p = estimate(&boxes, 600.0, &options);
        assert_eq!(p.column_count, 2);
        assert_eq!(p.boundaries.len(), 1);
    }

    #[test]
    fn test_histogram_partial_bins() {
        let boxes = vec![BBox::new(0.0, 0.0, 15.0, 10.0)];
        let coverage = histogram(&boxes, 5, 10.0);
        assert_eq!(coverage, vec![10.0, 5.0, 0.0, 0.0, 0.0]);
    }
}
