//! Clustering estimator: 1-D k-means over block horizontal centers.
//!
//! For each k up to the column limit the centers are clustered with
//! Lloyd's algorithm from quantile seeds, which keeps the result a pure
//! function of the input. A larger k is accepted only when its clusters are
//! separated by a real gap and it cuts the spread of the current best fit
//! by more than the configured margin.

use std::cmp::Ordering;
use std::ops::Range;

use crate::model::{BBox, ColumnProposal, Estimator};

use super::super::options::ReconstructOptions;

const MAX_ITERATIONS: usize = 100;

/// A k-means fit over sorted centers: contiguous index ranges.
#[derive(Debug, Clone)]
struct Fit {
    clusters: Vec<Range<usize>>,
    sse: f32,
}

/// Propose a column count from block centers.
pub fn estimate(boxes: &[BBox], page_width: f32, options: &ReconstructOptions) -> ColumnProposal {
    let mut points: Vec<(f32, &BBox)> = boxes.iter().map(|b| (b.x_center(), b)).collect();
    points.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    let centers: Vec<f32> = points.iter().map(|p| p.0).collect();

    let n = centers.len();
    let total = sse(&centers);
    if n < 2 || total <= f32::EPSILON {
        return ColumnProposal::single(Estimator::Clustering, 1.0);
    }

    let min_gap = page_width * options.min_cluster_separation;
    let min_size = (n / 10).max(2);

    let mut best = Fit {
        clusters: vec![0..n],
        sse: total,
    };
    let mut rejected_gain = 0.0f32;

    for k in 2..=options.max_columns.min(n) {
        // Nothing left to explain.
        if best.sse <= f32::EPSILON {
            break;
        }
        let Some(fit) = kmeans(&centers, k) else {
            continue;
        };
        if !is_separated(&fit, &centers, min_gap, min_size) {
            continue;
        }
        let gain = split_gain(best.sse, fit.sse);
        if gain > options.clustering_margin {
            best = fit;
        } else {
            rejected_gain = rejected_gain.max(gain);
        }
    }

    let k = best.clusters.len();
    log::debug!(
        "Clustering: k={} spread={:.3} rejected_gain={:.3}",
        k,
        best.sse / total,
        rejected_gain
    );

    if k == 1 {
        return ColumnProposal::single(Estimator::Clustering, (1.0 - rejected_gain).clamp(0.0, 1.0));
    }

    let boundaries = best
        .clusters
        .windows(2)
        .map(|pair| {
            let left_edge = points[pair[0].clone()]
                .iter()
                .map(|p| p.1.x1)
                .fold(f32::MIN, f32::max);
            let right_edge = points[pair[1].clone()]
                .iter()
                .map(|p| p.1.x0)
                .fold(f32::MAX, f32::min);
            if left_edge < right_edge {
                (left_edge + right_edge) / 2.0
            } else {
                (centers[pair[0].end - 1] + centers[pair[1].start]) / 2.0
            }
        })
        .collect();

    ColumnProposal {
        estimator: Estimator::Clustering,
        column_count: k,
        boundaries,
        score: (1.0 - best.sse / total).clamp(0.0, 1.0),
    }
}

/// Relative spread reduction of a finer fit over the current best one.
fn split_gain(best_sse: f32, fit_sse: f32) -> f32 {
    if best_sse <= f32::EPSILON {
        return 0.0;
    }
    (best_sse - fit_sse) / best_sse
}

/// Lloyd's algorithm on sorted values with quantile seeds.
///
/// Returns `None` when a cluster ends up empty, i.e. the data does not
/// support `k` distinct groups.
fn kmeans(values: &[f32], k: usize) -> Option<Fit> {
    let n = values.len();
    let mut centroids: Vec<f32> = (0..k).map(|j| values[((2 * j + 1) * n) / (2 * k)]).collect();
    let mut assignment = vec![0usize; n];

    for iteration in 0..MAX_ITERATIONS {
        let mut changed = iteration == 0;
        for (slot, &v) in assignment.iter_mut().zip(values) {
            let nearest = nearest_centroid(&centroids, v);
            if *slot != nearest {
                *slot = nearest;
                changed = true;
            }
        }
        if !changed {
            break;
        }

        let mut sums = vec![0.0f32; k];
        let mut counts = vec![0usize; k];
        for (&c, &v) in assignment.iter().zip(values) {
            sums[c] += v;
            counts[c] += 1;
        }
        for j in 0..k {
            if counts[j] > 0 {
                centroids[j] = sums[j] / counts[j] as f32;
            }
        }
    }

    // Sorted values and sorted centroids give contiguous clusters.
    let mut clusters: Vec<Range<usize>> = Vec::with_capacity(k);
    let mut start = 0;
    for i in 1..=n {
        if i == n || assignment[i] != assignment[start] {
            clusters.push(start..i);
            start = i;
        }
    }
    if clusters.len() != k {
        return None;
    }

    let sse = clusters.iter().map(|r| sse(&values[r.clone()])).sum();
    Some(Fit { clusters, sse })
}

fn nearest_centroid(centroids: &[f32], v: f32) -> usize {
    let mut best = 0;
    let mut best_dist = f32::MAX;
    for (j, &c) in centroids.iter().enumerate() {
        let d = (v - c).abs();
        if d < best_dist {
            best = j;
            best_dist = d;
        }
    }
    best
}

fn is_separated(fit: &Fit, values: &[f32], min_gap: f32, min_size: usize) -> bool {
    fit.clusters.iter().all(|r| r.len() >= min_size)
        && fit
            .clusters
            .windows(2)
            .all(|pair| values[pair[1].start] - values[pair[0].end - 1] >= min_gap)
}

/// Sum of squared deviations from the mean.
fn sse(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f32>() / values.len() as f32;
    values.iter().map(|v| (v - mean) * (v - mean)).sum()
}
