use cvpress::{BlockKind, LayoutBlock, PageGeometry, PagePlan, PaginationRules, layout};

fn blocks(heights: &[f32]) -> Vec<LayoutBlock> {
    heights
        .iter()
        .enumerate()
        .map(|(i, &h)| LayoutBlock::blank(BlockKind::ExperienceItem, i, 180.0, h))
        .collect()
}

fn no_gap() -> PaginationRules {
    PaginationRules {
        section_gap_mm: 0.0,
        ..Default::default()
    }
}

fn pages(plan: &PagePlan) -> Vec<usize> {
    plan.placements.iter().map(|p| p.page_index).collect()
}

#[test]
fn twenty_thirty_and_three_hundreds() {
    let geometry = PageGeometry::a4(20.0);
    let plan = layout(
        &blocks(&[20.0, 30.0, 100.0, 100.0, 100.0]),
        &geometry,
        &PaginationRules::default(),
    );

    assert_eq!(pages(&plan), [0, 0, 0, 0, 1]);
    assert_eq!(plan.page_count(), 2);
    let first_on_page_two = plan.on_page(1).next().unwrap();
    assert_eq!(first_on_page_two.block, 4);
    assert_eq!(first_on_page_two.offset_y_mm, 20.0);
    assert_eq!(plan.placements[3].offset_y_mm, 20.0 + 150.0 + 3.0 * 2.0);
}

#[test]
fn order_is_preserved_and_blocks_never_overlap() {
    let geometry = PageGeometry::default();
    let rules = PaginationRules::default();
    let heights = [42.0, 17.5, 88.0, 120.0, 5.0, 64.0, 99.0, 140.0, 31.0, 12.0, 77.0];
    let plan = layout(&blocks(&heights), &geometry, &rules);

    assert_eq!(plan.placements.len(), heights.len());
    for (i, pair) in plan.placements.windows(2).enumerate() {
        let (a, b) = (pair[0], pair[1]);
        assert_eq!(a.block, i);
        assert!(b.page_index >= a.page_index);
        if a.page_index == b.page_index {
            assert!(a.bottom_mm() + rules.section_gap_mm <= b.offset_y_mm + 1e-3);
        }
    }
    for p in &plan.placements {
        assert_eq!(p.offset_x_mm, geometry.margin_mm);
        assert!(p.bottom_mm() <= geometry.page_height_mm() - geometry.margin_mm + 0.01);
    }
}

#[test]
fn a_new_page_starts_only_when_the_block_does_not_fit() {
    let geometry = PageGeometry::default();
    let rules = PaginationRules::default();
    let heights = [60.0, 90.0, 110.0, 30.0, 200.0, 45.0, 45.0, 45.0, 150.0];
    let all = blocks(&heights);
    let plan = layout(&all, &geometry, &rules);
    let top = geometry.margin_mm;
    let content = geometry.content_height_mm();

    for pair in plan.placements.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        if next.page_index != prev.page_index {
            let used = prev.bottom_mm() + rules.section_gap_mm - top;
            assert!(
                used + next.height_mm > content,
                "block {} would have fit on page {}",
                next.block,
                prev.page_index
            );
        }
    }
}

#[test]
fn exact_fit_does_not_break() {
    let geometry = PageGeometry::default();
    let content = geometry.content_height_mm();
    let plan = layout(&blocks(&[content - 50.0, 50.0]), &geometry, &no_gap());
    assert_eq!(pages(&plan), [0, 0]);
}

#[test]
fn oversized_block_gets_its_own_page() {
    let geometry = PageGeometry::default();
    let plan = layout(&blocks(&[40.0, 320.0, 10.0]), &geometry, &PaginationRules::default());

    assert_eq!(pages(&plan), [0, 1, 2]);
    let big = plan.placements[1];
    assert_eq!(big.offset_y_mm, geometry.margin_mm);
    assert!(big.bottom_mm() > geometry.page_height_mm() - geometry.margin_mm);
}

#[test]
fn oversized_first_block_stays_on_first_page() {
    let geometry = PageGeometry::default();
    let plan = layout(&blocks(&[400.0]), &geometry, &PaginationRules::default());
    assert_eq!(pages(&plan), [0]);
    assert_eq!(plan.page_count(), 1);
}

#[test]
fn no_blocks_no_pages() {
    let plan = layout(&[], &PageGeometry::default(), &PaginationRules::default());
    assert!(plan.placements.is_empty());
    assert_eq!(plan.page_count(), 0);
}

#[test]
fn section_gap_is_added_after_each_block() {
    let geometry = PageGeometry::a4(20.0);
    let plan = layout(&blocks(&[10.0, 10.0]), &geometry, &PaginationRules::default());
    assert_eq!(plan.placements[1].offset_y_mm, 20.0 + 10.0 + 2.0);
}

#[test]
fn standalone_heading_moves_with_its_content() {
    let geometry = PageGeometry::a4(20.0);
    let mut input = blocks(&[240.0, 8.0, 60.0]);
    input[1].kind = BlockKind::Heading;
    input[1].keep_with_next = true;
    let plan = layout(&input, &geometry, &PaginationRules::default());

    // 8mm would fit under the first block, but would leave under 20mm below it
    assert_eq!(pages(&plan), [0, 1, 1]);
}

#[test]
fn heading_with_room_below_stays() {
    let geometry = PageGeometry::a4(20.0);
    let mut input = blocks(&[100.0, 8.0, 60.0]);
    input[1].keep_with_next = true;
    let plan = layout(&input, &geometry, &PaginationRules::default());
    assert_eq!(pages(&plan), [0, 0, 0]);
}
