//! Data model for layout reconstruction.
//!
//! Input types ([`Page`], [`TextBlock`]) are produced by a block source;
//! derived types ([`Row`], [`Column`], [`LayoutDecision`]) are rebuilt for
//! every page and never shared between pages.

mod block;
mod geometry;
mod layout;
mod page;
mod result;

pub use block::{BlockKind, TextBlock};
pub use geometry::BBox;
pub use layout::{
    Column, ColumnProposal, DetectionMethod, Estimator, LayoutDecision, RegionKind, RegionLayout,
    Row,
};
pub use page::Page;
pub use result::{LayoutResult, LayoutStats, LayoutWarning, RegionBlocks};
