//! Layout reconstruction pipeline.
//!
//! A page goes through four stages:
//!
//! 1. [`RegionFilter`] tags headers, footers, tables and figures and carves
//!    the remaining body into vertical segments.
//! 2. [`ColumnDetector`] decides the columns of each segment.
//! 3. [`RowAligner`] groups each column's blocks into rows.
//! 4. [`ReadingOrderComposer`] merges everything back by vertical position.
//!
//! [`LayoutEngine`] runs the stages for one page.

mod columns;
mod compose;
mod engine;
mod options;
mod region;
mod rows;

pub use columns::{ColumnBand, ColumnDetector};
pub use compose::ReadingOrderComposer;
pub use engine::LayoutEngine;
pub use options::{ColumnTraversal, ReconstructOptions};
pub use region::{FilteredPage, RegionFilter, RoutedGroup, Segment};
pub use rows::RowAligner;
