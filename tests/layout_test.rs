//! Integration tests for single-page layout reconstruction.

use unlayout::layout::{ColumnDetector, RowAligner};
use unlayout::{
    reconstruct, reconstruct_with_hints, BBox, BlockKind, ColumnTraversal, DetectionMethod,
    LayoutResult, Page, ReconstructOptions, RegionHints, RegionKind, TextBlock,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn block(text: impl Into<String>, x0: f32, y0: f32, x1: f32, y1: f32) -> TextBlock {
    TextBlock::new(text, BBox::new(x0, y0, x1, y1), 12.0)
}

/// 20 blocks in two bands: x in [0,250] and [300,550], page width 600.
fn two_column_page() -> Page {
    let mut page = Page::new(0, 600.0, 800.0);
    for i in 0..10 {
        let y = 100.0 + i as f32 * 30.0;
        page.add_block(block(format!("left {}", i), 0.0, y, 250.0, y + 12.0));
        page.add_block(block(format!("right {}", i), 300.0, y, 550.0, y + 12.0));
    }
    page
}

/// Running header, title, two columns, a narrow figure and a running footer.
fn journal_page() -> (Page, RegionHints) {
    let mut page = Page::new(0, 600.0, 800.0);
    page.add_block(block("Journal of Layouts", 200.0, 10.0, 400.0, 22.0));
    page.add_block(TextBlock::new(
        "On Reading Order",
        BBox::new(50.0, 50.0, 550.0, 74.0),
        20.0,
    ));
    for i in 0..10 {
        let y = 100.0 + i as f32 * 30.0;
        page.add_block(block(format!("left {}", i), 0.0, y, 250.0, y + 12.0));
        if i != 3 {
            page.add_block(block(format!("right {}", i), 300.0, y, 550.0, y + 12.0));
        }
    }
    page.add_block(block("Figure 1: pipeline", 320.0, 190.0, 520.0, 202.0));
    page.add_block(block("Page 1", 270.0, 780.0, 330.0, 792.0));

    let hints = RegionHints::new().with_figure(0, BBox::new(300.0, 185.0, 550.0, 210.0));
    (page, hints)
}

fn texts(result: &LayoutResult) -> Vec<&str> {
    result
        .ordered_blocks
        .iter()
        .map(|b| b.text.as_str())
        .collect()
}

fn assert_bijection(page: &Page, result: &LayoutResult) {
    assert_eq!(result.ordered_blocks.len(), page.blocks.len());
    assert_eq!(result.reading_order.len(), page.blocks.len());

    let mut seen = result.reading_order.clone();
    seen.sort_unstable();
    assert_eq!(seen, (0..page.blocks.len()).collect::<Vec<_>>());

    for (block, &i) in result.ordered_blocks.iter().zip(&result.reading_order) {
        assert_eq!(block.text, page.blocks[i].text);
        assert_eq!(block.bbox, page.blocks[i].bbox);
    }
}

#[test]
fn test_bijection_for_any_configuration() {
    init();
    let (page, hints) = journal_page();
    let configs = vec![
        ReconstructOptions::default(),
        ReconstructOptions::default().sequential(),
        ReconstructOptions::default().with_traversal(ColumnTraversal::RowInterleaved),
        ReconstructOptions::default().with_columns(false),
        ReconstructOptions::default().with_headers_footers(false),
        ReconstructOptions::default().with_max_columns(1),
        ReconstructOptions::default().with_confidence_threshold(0.0),
        ReconstructOptions::default().with_confidence_threshold(1.0),
        ReconstructOptions::default().with_row_overlap_tolerance(1.0),
        ReconstructOptions::default().with_min_blocks(100),
        ReconstructOptions::default().with_zones(0.4, 0.4),
    ];

    for options in &configs {
        let plain = reconstruct(&page, options).unwrap();
        assert_bijection(&page, &plain);
        let hinted = reconstruct_with_hints(&page, &hints, options).unwrap();
        assert_bijection(&page, &hinted);
    }
}

#[test]
fn test_determinism() {
    let (page, hints) = journal_page();
    let options = ReconstructOptions::default();

    let first = reconstruct_with_hints(&page, &hints, &options).unwrap();
    let second = reconstruct_with_hints(&page, &hints, &options).unwrap();
    assert_eq!(first, second);

    let sequential = reconstruct_with_hints(&page, &hints, &options.clone().sequential()).unwrap();
    assert_eq!(first, sequential);
}

#[test]
fn test_single_column_baseline() {
    let mut page = Page::new(0, 600.0, 800.0);
    for i in 0..30 {
        let y = 60.0 + i as f32 * 20.0;
        let width = 150.0 + ((i * 37) % 11) as f32 * 20.0;
        page.add_block(block(format!("line {}", i), 100.0, y, 100.0 + width, y + 12.0));
    }
    let result = reconstruct(&page, &ReconstructOptions::default()).unwrap();

    assert_eq!(result.layout_decision.column_count, 1);
    assert!(result
        .body_regions
        .iter()
        .all(|r| r.decision.column_count == 1));
    let expected: Vec<usize> = (0..30).collect();
    assert_eq!(result.reading_order, expected);
}

#[test]
fn test_two_column_separation() {
    let page = two_column_page();
    let result = reconstruct(&page, &ReconstructOptions::default()).unwrap();
    let decision = &result.layout_decision;

    assert_eq!(decision.column_count, 2);
    assert_eq!(decision.column_boundaries.len(), 1);
    assert!(decision.column_boundaries[0] >= 250.0 && decision.column_boundaries[0] <= 300.0);
    assert!(decision.confidence >= 0.8);
    assert_eq!(decision.method_used, DetectionMethod::Consensus);
    assert_eq!(decision.proposals.len(), 3);

    let order = texts(&result);
    assert_eq!(&order[..3], &["left 0", "left 1", "left 2"]);
    assert_eq!(order[10], "right 0");
    assert_eq!(order[19], "right 9");
}

#[test]
fn test_row_interleaved_traversal() {
    let page = two_column_page();
    let options = ReconstructOptions::default().with_traversal(ColumnTraversal::RowInterleaved);
    let result = reconstruct(&page, &options).unwrap();
    assert_eq!(&texts(&result)[..4], &["left 0", "right 0", "left 1", "right 1"]);
}

#[test]
fn test_row_ordering() {
    let page = Page::new(0, 600.0, 800.0).with_blocks([
        block("a", 100.0, 0.0, 200.0, 10.0),
        block("b", 100.0, 5.0, 200.0, 15.0),
        block("c", 100.0, 40.0, 200.0, 50.0),
    ]);
    let options = ReconstructOptions::default().with_headers_footers(false);

    let rows = RowAligner::new(&options).align(&page, &[0, 1, 2]);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].indices, vec![0, 1]);
    assert_eq!(rows[1].indices, vec![2]);
    assert!(rows[0].y_center < rows[1].y_center);

    let result = reconstruct(&page, &options).unwrap();
    assert_eq!(result.rows().count(), 2);
    assert_eq!(result.reading_order, vec![0, 1, 2]);
}

#[test]
fn test_row_blocks_ordered_left_to_right() {
    let page = Page::new(0, 600.0, 800.0).with_blocks([
        block("right", 300.0, 100.0, 400.0, 110.0),
        block("left", 100.0, 102.0, 200.0, 112.0),
    ]);
    let options = ReconstructOptions::default();
    let rows = RowAligner::new(&options).align(&page, &[0, 1]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].text(), "left right");
}

#[test]
fn test_fallback_under_jitter() {
    let mut page = Page::new(0, 600.0, 800.0);
    for i in 0..20 {
        let dx = ((i * 7919) % 31) as f32 - 15.0;
        let y = 80.0 + i as f32 * 25.0;
        page.add_block(block(format!("jitter {}", i), 200.0 + dx, y, 400.0 + dx, y + 12.0));
    }
    let result = reconstruct(&page, &ReconstructOptions::default()).unwrap();
    assert_eq!(result.layout_decision.column_count, 1);
    assert_bijection(&page, &result);

    let boxes: Vec<BBox> = page.blocks.iter().map(|b| b.bbox).collect();
    let options = ReconstructOptions::default();
    let decision = ColumnDetector::new(&options).detect(&boxes, page.width);
    assert_eq!(decision.column_count, 1);
    assert!(decision.column_boundaries.is_empty());
}

#[test]
fn test_forced_fallback_keeps_low_confidence() {
    let page = two_column_page();
    let mut boxes: Vec<BBox> = page.blocks.iter().map(|b| b.bbox).collect();
    // Blocks straddling the gutter pull the estimators apart.
    for i in 0..6 {
        let y = 500.0 + i as f32 * 20.0;
        boxes.push(BBox::new(120.0, y, 420.0, y + 12.0));
    }
    let options = ReconstructOptions::default();
    let decision = ColumnDetector::new(&options).detect(&boxes, 600.0);

    assert_eq!(decision.method_used, DetectionMethod::ConfidenceFallback);
    assert_eq!(decision.column_count, 1);
    assert!(decision.column_boundaries.is_empty());
    assert!(decision.confidence > 0.0 && decision.confidence < 0.8);
    assert_eq!(decision.proposals.len(), 3);
}

#[test]
fn test_header_interleaving() {
    let mut page = two_column_page();
    page.add_block(TextBlock::new(
        "A Full-Width Title",
        BBox::new(50.0, 50.0, 550.0, 74.0),
        20.0,
    ));
    let result = reconstruct(&page, &ReconstructOptions::default()).unwrap();

    assert_eq!(texts(&result)[0], "A Full-Width Title");
    assert_eq!(texts(&result)[1], "left 0");
    assert_eq!(result.layout_decision.column_count, 2);
    assert_eq!(result.body_regions[0].kind, RegionKind::FullWidth);
}

#[test]
fn test_running_header_footer_and_figure() {
    let (page, hints) = journal_page();
    let result = reconstruct_with_hints(&page, &hints, &ReconstructOptions::default()).unwrap();
    let order = texts(&result);

    assert_eq!(order[0], "Journal of Layouts");
    assert_eq!(order[1], "On Reading Order");
    assert_eq!(order[2], "left 0");
    assert_eq!(*order.last().unwrap(), "Page 1");

    let figure = order.iter().position(|t| *t == "Figure 1: pipeline").unwrap();
    assert_eq!(order[figure - 1], "right 2");
    assert_eq!(order[figure + 1], "right 4");

    assert_eq!(result.regions.header.len(), 1);
    assert_eq!(result.regions.footer.len(), 1);
    assert_eq!(result.regions.figure.len(), 1);
    assert_eq!(result.ordered_blocks[0].kind, BlockKind::CandidateHeader);
    assert!(!result.body_text().contains("Journal of Layouts"));
    assert!(result.plain_text().contains("Journal of Layouts"));
    assert_eq!(result.stats.header_count, 1);
    assert_eq!(result.stats.figure_count, 1);
}

#[test]
fn test_column_count_changes_down_the_page() {
    let mut page = Page::new(0, 600.0, 800.0);
    for i in 0..10 {
        let y = 100.0 + i as f32 * 20.0;
        page.add_block(block(format!("a{}", i), 0.0, y, 250.0, y + 12.0));
        page.add_block(block(format!("b{}", i), 300.0, y, 550.0, y + 12.0));
    }
    page.add_block(TextBlock::new(
        "Appendix",
        BBox::new(50.0, 320.0, 550.0, 340.0),
        16.0,
    ));
    for i in 0..6 {
        let y = 360.0 + i as f32 * 20.0;
        page.add_block(block(format!("x{}", i), 0.0, y, 180.0, y + 12.0));
        page.add_block(block(format!("y{}", i), 210.0, y, 390.0, y + 12.0));
        page.add_block(block(format!("z{}", i), 420.0, y, 600.0, y + 12.0));
    }

    let result = reconstruct(&page, &ReconstructOptions::default()).unwrap();
    let counts: Vec<usize> = result
        .body_regions
        .iter()
        .map(|r| r.decision.column_count)
        .collect();
    assert_eq!(counts, vec![2, 1, 3]);

    let order = texts(&result);
    assert_eq!(order[0], "a0");
    assert_eq!(order[10], "b0");
    assert_eq!(order[20], "Appendix");
    assert_eq!(order[21], "x0");
    assert_eq!(order[27], "y0");
    assert_eq!(order[33], "z0");
    assert_eq!(result.layout_decision.column_count, 2);
}

#[test]
fn test_wide_table_separates_regions() {
    let mut page = two_column_page();
    page.add_block(block("Quarter", 20.0, 405.0, 200.0, 418.0));
    page.add_block(block("Revenue", 350.0, 405.0, 530.0, 418.0));
    for block in page.blocks.iter_mut().skip(10).take(10) {
        block.bbox.y0 += 200.0;
        block.bbox.y1 += 200.0;
    }
    let hints = RegionHints::new().with_table(0, BBox::new(10.0, 400.0, 560.0, 440.0));

    let result = reconstruct_with_hints(&page, &hints, &ReconstructOptions::default()).unwrap();
    assert_bijection(&page, &result);
    assert_eq!(result.regions.table.len(), 2);
    assert_eq!(result.body_regions.len(), 2);

    let order = texts(&result);
    let quarter = order.iter().position(|t| *t == "Quarter").unwrap();
    assert_eq!(order[quarter + 1], "Revenue");
    assert_eq!(quarter, 10);
}

#[test]
fn test_detection_disabled() {
    let page = two_column_page();
    let options = ReconstructOptions::default().with_columns(false);
    let result = reconstruct(&page, &options).unwrap();

    assert_eq!(result.layout_decision.column_count, 1);
    assert_eq!(result.layout_decision.method_used, DetectionMethod::Disabled);
    // Single column: rows read across the gutter.
    assert_eq!(&texts(&result)[..2], &["left 0", "right 0"]);
}

#[test]
fn test_ambiguous_layout_is_a_warning() {
    let mut page = two_column_page();
    for i in 0..4 {
        let y = 420.0 + i as f32 * 20.0;
        page.add_block(block("straddle", 100.0 + i as f32 * 40.0, y, 400.0, y + 12.0));
    }
    let options = ReconstructOptions::default().with_ambiguity_floor(1.0);
    let result = reconstruct(&page, &options).unwrap();

    assert_bijection(&page, &result);
    assert!(result.is_low_confidence());
    assert_eq!(result.warnings.len(), 1);
}

#[test]
fn test_four_column_page() {
    init();
    let mut page = Page::new(0, 600.0, 800.0);
    for row in 0..10 {
        let y = 100.0 + row as f32 * 20.0;
        for (col, x) in [0.0, 150.0, 300.0, 450.0].into_iter().enumerate() {
            page.add_block(block(format!("c{}r{}", col, row), x, y, x + 130.0, y + 12.0));
        }
    }
    let result = reconstruct(&page, &ReconstructOptions::default()).unwrap();
    let decision = &result.layout_decision;

    assert_eq!(decision.column_count, 4);
    assert_eq!(decision.method_used, DetectionMethod::Consensus);
    assert!(decision.confidence >= 0.8);
    assert!(decision
        .proposals
        .iter()
        .all(|p| p.column_count == 4));

    let order = texts(&result);
    assert_eq!(&order[..3], &["c0r0", "c0r1", "c0r2"]);
    assert_eq!(order[10], "c1r0");
    assert_eq!(order[20], "c2r0");
    assert_eq!(order[30], "c3r0");
    assert_eq!(order[39], "c3r9");
    assert_bijection(&page, &result);
}

#[test]
fn test_centered_title_over_gutter_read_first() {
    let mut page = Page::new(0, 600.0, 800.0);
    page.add_block(block("Centered Title", 200.0, 60.0, 400.0, 80.0));
    for i in 0..10 {
        let y = 100.0 + i as f32 * 20.0;
        page.add_block(block(format!("L{}", i), 0.0, y, 250.0, y + 12.0));
        page.add_block(block(format!("R{}", i), 300.0, y, 550.0, y + 12.0));
    }
    let result = reconstruct(&page, &ReconstructOptions::default()).unwrap();
    let order = texts(&result);

    assert_eq!(order[0], "Centered Title");
    assert_eq!(order[1], "L0");
    assert_eq!(order[10], "L9");
    assert_eq!(order[11], "R0");
    assert_eq!(result.body_regions.len(), 2);
    assert_eq!(result.body_regions[0].kind, RegionKind::FullWidth);
    assert_eq!(result.body_regions[1].decision.column_count, 2);
    assert_eq!(result.layout_decision.column_count, 2);
    assert_bijection(&page, &result);
}
