//! Greedy first-fit placement of measured blocks onto fixed-size pages.
//!
//! Blocks are opaque rectangles: they are placed whole, top to bottom, in
//! input order, and a block that does not fit in the space left on the
//! current page starts a new one. There is no backtracking and no slicing.

use image::RgbImage;

use crate::geometry::PageGeometry;
use crate::segment::BlockKind;

/// Absorbs the sub-pixel error of converting measured pixel heights back to
/// millimetres, so an exact fit is never pushed to the next page.
const FIT_TOLERANCE_MM: f32 = 0.01;

#[derive(Clone, Debug, PartialEq)]
pub struct PaginationRules {
    /// Vertical gap inserted after every block.
    pub section_gap_mm: f32,
    /// A `keep_with_next` block is moved to a fresh page when less than this
    /// would remain below it.
    pub min_space_after_heading_mm: f32,
}

impl Default for PaginationRules {
    fn default() -> Self {
        PaginationRules {
            section_gap_mm: 2.0,
            min_space_after_heading_mm: 20.0,
        }
    }
}

/// A measured, atomic block ready for placement.
#[derive(Clone, Debug)]
pub struct LayoutBlock {
    pub kind: BlockKind,
    pub source_index: usize,
    pub keep_with_next: bool,
    pub width_mm: f32,
    pub height_mm: f32,
    pub bitmap: RgbImage,
}

impl LayoutBlock {
    /// A plain white block of the given size, for callers that bring their
    /// own measurements.
    pub fn blank(kind: BlockKind, source_index: usize, width_mm: f32, height_mm: f32) -> LayoutBlock {
        LayoutBlock {
            kind,
            source_index,
            keep_with_next: false,
            width_mm,
            height_mm,
            bitmap: RgbImage::from_pixel(1, 1, image::Rgb([255, 255, 255])),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PagePlacement {
    pub page_index: usize,
    /// Index into the block list passed to [`layout`].
    pub block: usize,
    pub offset_x_mm: f32,
    /// Distance from the top edge of the page.
    pub offset_y_mm: f32,
    pub width_mm: f32,
    pub height_mm: f32,
}

impl PagePlacement {
    pub fn bottom_mm(&self) -> f32 {
        self.offset_y_mm + self.height_mm
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PagePlan {
    pub placements: Vec<PagePlacement>,
}

impl PagePlan {
    /// `max(page_index) + 1`, or 0 when nothing was placed.
    pub fn page_count(&self) -> usize {
        self.placements
            .iter()
            .map(|p| p.page_index + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn on_page(&self, page_index: usize) -> impl Iterator<Item = &PagePlacement> {
        self.placements
            .iter()
            .filter(move |p| p.page_index == page_index)
    }
}

pub fn layout(blocks: &[LayoutBlock], geometry: &PageGeometry, rules: &PaginationRules) -> PagePlan {
    let content_height = geometry.content_height_mm();
    let margin = geometry.margin_mm;

    let mut placements = Vec::with_capacity(blocks.len());
    let mut page = 0usize;
    let mut cursor = 0.0f32;
    let mut page_is_empty = true;

    for (index, block) in blocks.iter().enumerate() {
        let remaining = content_height - cursor;
        let fits = block.height_mm <= remaining + FIT_TOLERANCE_MM;
        let strands_heading = block.keep_with_next
            && remaining - block.height_mm - rules.section_gap_mm
                < rules.min_space_after_heading_mm;

        if !page_is_empty && (!fits || strands_heading) {
            page += 1;
            cursor = 0.0;
        }

        if block.height_mm > content_height + FIT_TOLERANCE_MM {
            log::warn!(
                "{} block {} is {:.1}mm tall, overflowing the {:.1}mm content area on page {}",
                block.kind,
                block.source_index,
                block.height_mm,
                content_height,
                page + 1
            );
        }

        let placement = PagePlacement {
            page_index: page,
            block: index,
            offset_x_mm: margin,
            offset_y_mm: margin + cursor,
            width_mm: block.width_mm,
            height_mm: block.height_mm,
        };
        log::debug!(
            "placed {} block {} on page {} at y={:.1}mm (h={:.1}mm)",
            block.kind,
            block.source_index,
            page + 1,
            placement.offset_y_mm,
            block.height_mm
        );
        placements.push(placement);

        cursor += block.height_mm + rules.section_gap_mm;
        page_is_empty = false;
    }

    PagePlan { placements }
}
