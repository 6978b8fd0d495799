//! Reconstruction options and configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Options for reconstructing reading order.
///
/// Every field has a default; deserializing a partial document fills in
/// the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructOptions {
    /// Below this, a multi-column decision degrades to one column
    pub confidence_threshold: f32,

    /// Below this (after fallback), the region is flagged ambiguous
    pub ambiguity_floor: f32,

    /// Maximum number of columns per region (1-4)
    pub max_columns: usize,

    /// Regions with fewer body blocks are always single-column
    pub min_blocks_for_columns: usize,

    /// Vertical overlap needed to share a row (fraction of the smaller height)
    pub row_overlap_tolerance: f32,

    /// Baseline distance allowed within a row (fraction of median font size)
    pub baseline_tolerance: f32,

    /// How far (points) a block may cross a column boundary and still fit it
    pub column_margin_tolerance: f32,

    /// Relative spread reduction needed to accept one more cluster
    pub clustering_margin: f32,

    /// Minimum gap between adjacent clusters (fraction of page width)
    pub min_cluster_separation: f32,

    /// Median width / page width below which the heuristic suggests columns
    pub heuristic_width_ratio: f32,

    /// Number of bins in the coverage histogram
    pub density_bins: usize,

    /// Coverage (fraction of the peak) at or below which a bin is a valley
    pub valley_threshold: f32,

    /// Top fraction of the page searched for running headers
    pub header_zone: f32,

    /// Bottom fraction of the page searched for running footers
    pub footer_zone: f32,

    /// Width (fraction of body extent) from which a block spans the body
    pub full_width_ratio: f32,

    /// Points a block may overshoot the page edge
    pub bounds_tolerance: f32,

    /// Whether to tag running headers and footers by position
    pub detect_headers_footers: bool,

    /// Whether to run column detection at all
    pub detect_columns: bool,

    /// How rows of sibling columns are linearized
    pub column_traversal: ColumnTraversal,

    /// Whether to use parallel processing
    pub parallel: bool,
}

impl ReconstructOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the confidence threshold.
    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Set the ambiguity floor.
    pub fn with_ambiguity_floor(mut self, floor: f32) -> Self {
        self.ambiguity_floor = floor;
        self
    }

    /// Set the maximum number of columns.
    pub fn with_max_columns(mut self, max_columns: usize) -> Self {
        self.max_columns = max_columns;
        self
    }

    /// Set the minimum block count for column analysis.
    pub fn with_min_blocks(mut self, min_blocks: usize) -> Self {
        self.min_blocks_for_columns = min_blocks;
        self
    }

    /// Set the row overlap tolerance.
    pub fn with_row_overlap_tolerance(mut self, tolerance: f32) -> Self {
        self.row_overlap_tolerance = tolerance;
        self
    }

    /// Set the baseline tolerance.
    pub fn with_baseline_tolerance(mut self, tolerance: f32) -> Self {
        self.baseline_tolerance = tolerance;
        self
    }

    /// Set the column margin tolerance.
    pub fn with_column_margin_tolerance(mut self, tolerance: f32) -> Self {
        self.column_margin_tolerance = tolerance;
        self
    }

    /// Set the header and footer zones.
    pub fn with_zones(mut self, header: f32, footer: f32) -> Self {
        self.header_zone = header;
        self.footer_zone = footer;
        self
    }

    /// Enable or disable header/footer tagging.
    pub fn with_headers_footers(mut self, detect: bool) -> Self {
        self.detect_headers_footers = detect;
        self
    }

    /// Enable or disable column detection.
    pub fn with_columns(mut self, detect: bool) -> Self {
        self.detect_columns = detect;
        self
    }

    /// Set the column traversal policy.
    pub fn with_traversal(mut self, traversal: ColumnTraversal) -> Self {
        self.column_traversal = traversal;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Check that every option is in range.
    pub fn validate(&self) -> Result<()> {
        fn unit(name: &str, value: f32) -> Result<()> {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(Error::InvalidOptions(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )))
            }
        }

        fn non_negative(name: &str, value: f32) -> Result<()> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(Error::InvalidOptions(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )))
            }
        }

        unit("confidence_threshold", self.confidence_threshold)?;
        unit("ambiguity_floor", self.ambiguity_floor)?;
        unit("row_overlap_tolerance", self.row_overlap_tolerance)?;
        unit("clustering_margin", self.clustering_margin)?;
        unit("min_cluster_separation", self.min_cluster_separation)?;
        unit("heuristic_width_ratio", self.heuristic_width_ratio)?;
        unit("valley_threshold", self.valley_threshold)?;
        unit("header_zone", self.header_zone)?;
        unit("footer_zone", self.footer_zone)?;
        unit("full_width_ratio", self.full_width_ratio)?;
        non_negative("baseline_tolerance", self.baseline_tolerance)?;
        non_negative("column_margin_tolerance", self.column_margin_tolerance)?;
        non_negative("bounds_tolerance", self.bounds_tolerance)?;

        if !(1..=4).contains(&self.max_columns) {
            return Err(Error::InvalidOptions(format!(
                "max_columns must be within 1..=4, got {}",
                self.max_columns
            )));
        }
        if self.density_bins < 3 {
            return Err(Error::InvalidOptions(format!(
                "density_bins must be at least 3, got {}",
                self.density_bins
            )));
        }
        if self.header_zone + self.footer_zone >= 1.0 {
            return Err(Error::InvalidOptions(
                "header_zone and footer_zone together must leave room for the body".into(),
            ));
        }

        Ok(())
    }
}

impl Default for ReconstructOptions {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.8,
            ambiguity_floor: 0.3,
            max_columns: 4,
            min_blocks_for_columns: 5,
            row_overlap_tolerance: 0.3,
            baseline_tolerance: 0.5,
            column_margin_tolerance: 4.0,
            clustering_margin: 0.15,
            min_cluster_separation: 0.04,
            heuristic_width_ratio: 0.55,
            density_bins: 50,
            valley_threshold: 0.15,
            header_zone: 0.05,
            footer_zone: 0.05,
            full_width_ratio: 0.6,
            bounds_tolerance: 1.0,
            detect_headers_footers: true,
            detect_columns: true,
            column_traversal: ColumnTraversal::ColumnMajor,
            parallel: true,
        }
    }
}

/// Order in which the rows of sibling columns are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnTraversal {
    /// Finish each column before starting the next (print order)
    #[default]
    ColumnMajor,
    /// Interleave rows of all columns top to bottom (parallel columns)
    RowInterleaved,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let options = ReconstructOptions::new()
            .with_confidence_threshold(0.7)
            .with_max_columns(2)
            .with_traversal(ColumnTraversal::RowInterleaved)
            .sequential();

        assert_eq!(options.confidence_threshold, 0.7);
        assert_eq!(options.max_columns, 2);
        assert_eq!(options.column_traversal, ColumnTraversal::RowInterleaved);
        assert!(!options.parallel);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_default_options() {
        let options = ReconstructOptions::default();
        assert_eq!(options.confidence_threshold, 0.8);
        assert_eq!(options.max_columns, 4);
        assert_eq!(options.row_overlap_tolerance, 0.3);
        assert!(options.parallel);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(ReconstructOptions::new().with_max_columns(0).validate().is_err());
        assert!(ReconstructOptions::new().with_max_columns(5).validate().is_err());
        assert!(ReconstructOptions::new()
            .with_confidence_threshold(1.5)
            .validate()
            .is_err());
        assert!(ReconstructOptions::new()
            .with_zones(0.6, 0.5)
            .validate()
            .is_err());
        assert!(ReconstructOptions::new()
            .with_column_margin_tolerance(-1.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let options: ReconstructOptions =
            serde_json::from_str(r#"{"max_columns": 2, "column_traversal": "row_interleaved"}"#)
                .unwrap();
        assert_eq!(options.max_columns, 2);
        assert_eq!(options.column_traversal, ColumnTraversal::RowInterleaved);
        assert_eq!(options.confidence_threshold, 0.8);
    }
}
