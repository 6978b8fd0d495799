//! Column detection.
//!
//! Three independent estimators look at the same body blocks and each
//! propose a column count with boundaries and a score. The proposals are
//! reconciled into one [`LayoutDecision`] by majority vote; a decision that
//! is not confident enough degrades to a single column, which keeps every
//! block in a readable order.

mod clustering;
mod density;
mod heuristic;

use std::cmp::Ordering;

use crate::model::{BBox, ColumnProposal, DetectionMethod, Estimator, LayoutDecision};

use super::options::ReconstructOptions;

use heuristic::{crosses_boundary, fit_fraction};

/// Confidence cap when no two estimators agree.
const DISAGREEMENT_CAP: f32 = 0.5;

/// Confidence discount when only two estimators agree.
const MAJORITY_FACTOR: f32 = 0.9;

/// Boundaries closer than this (points) collapse into one.
const BOUNDARY_EPSILON: f32 = 1.0;

/// One column of a region after block assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnBand {
    /// Left and right X coordinates
    pub x_range: (f32, f32),
    /// Positions (into the detector input) of the assigned blocks
    pub members: Vec<usize>,
    /// Fraction of members that stay inside the band
    pub confidence: f32,
}

/// Column detector for one body region.
pub struct ColumnDetector<'a> {
    options: &'a ReconstructOptions,
}

impl<'a> ColumnDetector<'a> {
    /// Create a detector.
    pub fn new(options: &'a ReconstructOptions) -> Self {
        Self { options }
    }

    /// Decide the column count and boundaries for a set of body blocks.
    pub fn detect(&self, boxes: &[BBox], page_width: f32) -> LayoutDecision {
        if !self.options.detect_columns {
            return LayoutDecision::single(DetectionMethod::Disabled, 1.0);
        }
        if boxes.len() < self.options.min_blocks_for_columns || boxes.len() < 2 {
            log::debug!(
                "Column detection skipped: {} blocks (need {})",
                boxes.len(),
                self.options.min_blocks_for_columns
            );
            return LayoutDecision::single(DetectionMethod::InsufficientSignal, 1.0);
        }

        let proposals = self.propose(boxes, page_width);
        self.reconcile(proposals, page_width)
    }

    /// Run all three estimators, in parallel when enabled.
    ///
    /// Proposals come back in [`Estimator`] order regardless of scheduling.
    pub fn propose(&self, boxes: &[BBox], page_width: f32) -> Vec<ColumnProposal> {
        let options = self.options;
        let (c, (h, d)) = if options.parallel {
            rayon::join(
                || clustering::estimate(boxes, page_width, options),
                || {
                    rayon::join(
                        || heuristic::estimate(boxes, page_width, options),
                        || density::estimate(boxes, page_width, options),
                    )
                },
            )
        } else {
            (
                clustering::estimate(boxes, page_width, options),
                (
                    heuristic::estimate(boxes, page_width, options),
                    density::estimate(boxes, page_width, options),
                ),
            )
        };

        for p in [&c, &h, &d] {
            log::debug!(
                "{:?}: {} column(s) at {:?}, score {:.3}",
                p.estimator,
                p.column_count,
                p.boundaries,
                p.score
            );
        }
        vec![c, h, d]
    }

    /// Merge estimator proposals into one decision.
    ///
    /// This is a pure function of the proposals: the agreeing count wins
    /// with score-weighted boundaries, otherwise the clustering answer is
    /// used with capped confidence.
    pub fn reconcile(&self, proposals: Vec<ColumnProposal>, page_width: f32) -> LayoutDecision {
        let mut best: Option<(usize, usize)> = None;
        for p in &proposals {
            let votes = proposals
                .iter()
                .filter(|q| q.column_count == p.column_count)
                .count();
            let better = match best {
                None => true,
                Some((count, v)) => votes > v || (votes == v && p.column_count < count),
            };
            if better {
                best = Some((p.column_count, votes));
            }
        }

        let (column_count, method, confidence, boundaries) = match best {
            Some((count, votes)) if votes >= 2 => {
                let agreeing: Vec<&ColumnProposal> = proposals
                    .iter()
                    .filter(|p| p.column_count == count)
                    .collect();
                let mean = agreeing.iter().map(|p| p.score).sum::<f32>() / agreeing.len() as f32;
                let (method, confidence) = if votes == proposals.len() {
                    (DetectionMethod::Consensus, mean)
                } else {
                    (DetectionMethod::Majority, mean * MAJORITY_FACTOR)
                };
                (count, method, confidence, weighted_boundaries(&agreeing))
            }
            _ => match proposals.iter().find(|p| p.estimator == Estimator::Clustering) {
                Some(p) => (
                    p.column_count,
                    DetectionMethod::ClusteringFallback,
                    p.score.min(DISAGREEMENT_CAP),
                    p.boundaries.clone(),
                ),
                None => (1, DetectionMethod::ClusteringFallback, 0.0, Vec::new()),
            },
        };

        let boundaries = clean_boundaries(boundaries, page_width);
        let confidence = confidence.clamp(0.0, 1.0);

        let mut decision = LayoutDecision {
            column_count: if column_count > 1 {
                boundaries.len() + 1
            } else {
                1
            },
            column_boundaries: if column_count > 1 {
                boundaries
            } else {
                Vec::new()
            },
            confidence,
            method_used: method,
            proposals,
        };

        if decision.is_multi_column() && confidence < self.options.confidence_threshold {
            log::debug!(
                "Confidence {:.3} below threshold {:.3}, degrading {} columns to 1",
                confidence,
                self.options.confidence_threshold,
                decision.column_count
            );
            decision.column_count = 1;
            decision.column_boundaries.clear();
            decision.method_used = DetectionMethod::ConfidenceFallback;
        }

        log::debug!(
            "Decision: {} column(s) via {:?}, confidence {:.3}",
            decision.column_count,
            decision.method_used,
            decision.confidence
        );
        decision
    }

    /// Positions of boxes that reach across a resolved column boundary.
    ///
    /// A box counts when it extends more than `column_margin_tolerance`
    /// past the boundary on both sides.
    pub fn crossing(&self, boxes: &[BBox], decision: &LayoutDecision) -> Vec<usize> {
        boxes
            .iter()
            .enumerate()
            .filter(|(_, b)| {
                crosses_boundary(
                    b,
                    &decision.column_boundaries,
                    self.options.column_margin_tolerance,
                )
            })
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Assign blocks to columns by their horizontal center.
    ///
    /// Columns that receive no block are merged into a neighbour and the
    /// decision is updated to match.
    pub fn assign(
        &self,
        boxes: &[BBox],
        decision: &mut LayoutDecision,
        page_width: f32,
    ) -> Vec<ColumnBand> {
        loop {
            let mut members: Vec<Vec<usize>> = vec![Vec::new(); decision.column_boundaries.len() + 1];
            for (pos, b) in boxes.iter().enumerate() {
                let col = decision
                    .column_boundaries
                    .partition_point(|&x| x <= b.x_center());
                members[col].push(pos);
            }

            let empty = if members.len() > 1 {
                members.iter().position(Vec::is_empty)
            } else {
                None
            };
            if let Some(col) = empty {
                // Drop the boundary on the left, or the right one for the first column.
                let boundary = col.saturating_sub(1);
                log::debug!(
                    "Column {} is empty, removing boundary {:.1}",
                    col,
                    decision.column_boundaries[boundary]
                );
                decision.column_boundaries.remove(boundary);
                decision.column_count = decision.column_boundaries.len() + 1;
                continue;
            }

            let bounds = &decision.column_boundaries;
            return members
                .into_iter()
                .enumerate()
                .map(|(col, members)| {
                    let left = if col == 0 { 0.0 } else { bounds[col - 1] };
                    let right = bounds.get(col).copied().unwrap_or(page_width);
                    let edges: Vec<f32> = bounds
                        .iter()
                        .copied()
                        .filter(|&x| x == left || x == right)
                        .collect();
                    let column_boxes: Vec<BBox> = members.iter().map(|&p| boxes[p]).collect();
                    ColumnBand {
                        x_range: (left, right),
                        members,
                        confidence: fit_fraction(
                            &column_boxes,
                            &edges,
                            self.options.column_margin_tolerance,
                        ),
                    }
                })
                .collect();
        }
    }
}

/// Average the boundaries of agreeing proposals, weighted by score.
///
/// Only positions present in every proposal are averaged.
fn weighted_boundaries(agreeing: &[&ColumnProposal]) -> Vec<f32> {
    let Some(len) = agreeing.iter().map(|p| p.boundaries.len()).min() else {
        return Vec::new();
    };
    let total: f32 = agreeing.iter().map(|p| p.score).sum();
    (0..len)
        .map(|j| {
            if total > 0.0 {
                agreeing
                    .iter()
                    .map(|p| p.boundaries[j] * p.score)
                    .sum::<f32>()
                    / total
            } else {
                agreeing.iter().map(|p| p.boundaries[j]).sum::<f32>() / agreeing.len() as f32
            }
        })
        .collect()
}

/// Sort, drop out-of-page values and collapse near-duplicates.
fn clean_boundaries(mut boundaries: Vec<f32>, page_width: f32) -> Vec<f32> {
    boundaries.retain(|&x| x.is_finite() && x > 0.0 && x < page_width);
    boundaries.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    boundaries.dedup_by(|next, prev| *next - *prev < BOUNDARY_EPSILON);
    boundaries
}
