//! Reading-order composition.
//!
//! Body regions and routed groups (headers, footers, tables, figures) are
//! merged back into one sequence by vertical position. A narrow table or
//! figure that sits inside a region is placed in the column holding its
//! center instead, between the rows around it.

use std::cmp::Ordering;

use crate::model::{BlockKind, Column, Page, RegionLayout, Row};

use super::options::{ColumnTraversal, ReconstructOptions};
use super::region::RoutedGroup;
use super::rows::RowAligner;

/// Top-level item of the page sequence.
#[derive(Debug, Clone, Copy)]
enum Unit {
    Region(usize),
    Group(usize),
}

/// Item of a column sequence.
#[derive(Debug, Clone, Copy)]
enum Entry {
    Row(usize),
    Group(usize),
}

/// Merges body regions and routed groups into the final reading order.
pub struct ReadingOrderComposer<'a> {
    options: &'a ReconstructOptions,
}

impl<'a> ReadingOrderComposer<'a> {
    /// Create a composer.
    pub fn new(options: &'a ReconstructOptions) -> Self {
        Self { options }
    }

    /// Produce the reading order as input indices into `page.blocks`.
    ///
    /// `wide[g]` tells whether `groups[g]` spans the body; wide groups are
    /// never placed inside a column. Every index held by a region row or a
    /// group appears exactly once.
    pub fn compose(
        &self,
        page: &Page,
        regions: &[RegionLayout],
        groups: &[RoutedGroup],
        wide: &[bool],
    ) -> Vec<usize> {
        let aligner = RowAligner::new(self.options);
        let group_rows: Vec<Vec<Row>> = groups
            .iter()
            .map(|g| aligner.align(page, &g.members))
            .collect();

        // (region, column) each inserted group lands in.
        let mut inserted: Vec<Vec<Vec<usize>>> = regions
            .iter()
            .map(|r| vec![Vec::new(); r.columns.len()])
            .collect();
        let mut units: Vec<(f32, Unit)> = Vec::with_capacity(regions.len() + groups.len());

        for (g, group) in groups.iter().enumerate() {
            let target = if wide.get(g).copied().unwrap_or(true)
                || matches!(
                    group.kind,
                    BlockKind::CandidateHeader | BlockKind::CandidateFooter
                ) {
                None
            } else {
                host_column(regions, group)
            };
            match target {
                Some((r, c)) => inserted[r][c].push(g),
                None => units.push((group.bbox.y_center(), Unit::Group(g))),
            }
        }
        units.extend(
            regions
                .iter()
                .enumerate()
                .map(|(r, region)| (region.bbox.y_center(), Unit::Region(r))),
        );
        units.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(Ordering::Equal)
                .then(unit_rank(&a.1).cmp(&unit_rank(&b.1)))
        });

        let mut order = Vec::new();
        for (_, unit) in units {
            match unit {
                Unit::Group(g) => extend_rows(&mut order, &group_rows[g]),
                Unit::Region(r) => {
                    self.emit_region(&mut order, &regions[r], &inserted[r], groups, &group_rows)
                }
            }
        }
        order
    }

    fn emit_region(
        &self,
        order: &mut Vec<usize>,
        region: &RegionLayout,
        inserted: &[Vec<usize>],
        groups: &[RoutedGroup],
        group_rows: &[Vec<Row>],
    ) {
        let columns: Vec<Vec<(f32, Entry)>> = region
            .columns
            .iter()
            .zip(inserted)
            .map(|(column, extra)| column_entries(column, extra, groups))
            .collect();

        let emit = |order: &mut Vec<usize>, c: usize, entry: Entry| match entry {
            Entry::Row(row) => order.extend_from_slice(&region.columns[c].rows[row].indices),
            Entry::Group(g) => extend_rows(order, &group_rows[g]),
        };

        match self.options.column_traversal {
            ColumnTraversal::ColumnMajor => {
                for (c, entries) in columns.into_iter().enumerate() {
                    for (_, entry) in entries {
                        emit(order, c, entry);
                    }
                }
            }
            ColumnTraversal::RowInterleaved => {
                let mut all: Vec<(f32, usize, usize, Entry)> = columns
                    .into_iter()
                    .enumerate()
                    .flat_map(|(c, entries)| {
                        entries
                            .into_iter()
                            .enumerate()
                            .map(move |(pos, (y, entry))| (y, c, pos, entry))
                    })
                    .collect();
                all.sort_by(|a, b| {
                    a.0.partial_cmp(&b.0)
                        .unwrap_or(Ordering::Equal)
                        .then(a.1.cmp(&b.1))
                        .then(a.2.cmp(&b.2))
                });
                for (_, c, _, entry) in all {
                    emit(order, c, entry);
                }
            }
        }
    }
}

/// Rows and inserted groups of a column, top to bottom.
fn column_entries(column: &Column, extra: &[usize], groups: &[RoutedGroup]) -> Vec<(f32, Entry)> {
    let mut entries: Vec<(f32, Entry)> = column
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| (row.y_center, Entry::Row(i)))
        .collect();
    entries.extend(
        extra
            .iter()
            .map(|&g| (groups[g].bbox.y_center(), Entry::Group(g))),
    );
    // Stable: rows keep their order, and come before groups on ties.
    entries.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    entries
}

/// Region and column that should host a narrow group, if any.
fn host_column(regions: &[RegionLayout], group: &RoutedGroup) -> Option<(usize, usize)> {
    let (x, y) = (group.bbox.x_center(), group.bbox.y_center());
    let r = regions
        .iter()
        .position(|region| y >= region.bbox.y0 && y <= region.bbox.y1)?;
    let columns = &regions[r].columns;
    let c = columns.iter().position(|c| c.contains(x)).or_else(|| {
        // Outside every band: the nearest one.
        columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let d = if x < c.x_range.0 {
                    c.x_range.0 - x
                } else {
                    x - c.x_range.1
                };
                (i, d)
            })
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
            .map(|(i, _)| i)
    })?;
    Some((r, c))
}

fn unit_rank(unit: &Unit) -> (u8, usize) {
    match unit {
        Unit::Region(r) => (0, *r),
        Unit::Group(g) => (1, *g),
    }
}

fn extend_rows(order: &mut Vec<usize>, rows: &[Row]) {
    for row in rows {
        order.extend_from_slice(&row.indices);
    }
}
