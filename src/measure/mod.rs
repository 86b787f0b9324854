mod text;

pub use text::TextRasterizer;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use image::RgbImage;
use rayon::prelude::*;

use crate::error::Error;
use crate::geometry::PageGeometry;
use crate::paginate::LayoutBlock;
use crate::segment::BlockDescriptor;

/// Renders one block in isolation at a fixed content width.
///
/// The returned bitmap must be exactly `width_px` wide (narrower bitmaps are
/// accepted and placed left-aligned) on an opaque white background. Its
/// height is the block's natural height. A zero-sized bitmap means "nothing
/// to show" and the block is dropped.
pub trait BlockRasterizer: Send + Sync {
    fn rasterize(
        &self,
        block: &BlockDescriptor,
        width_px: u32,
        geometry: &PageGeometry,
    ) -> Result<RgbImage, Error>;
}

impl<R: BlockRasterizer + ?Sized> BlockRasterizer for &R {
    fn rasterize(
        &self,
        block: &BlockDescriptor,
        width_px: u32,
        geometry: &PageGeometry,
    ) -> Result<RgbImage, Error> {
        (**self).rasterize(block, width_px, geometry)
    }
}

pub(crate) fn is_cancelled(cancel: Option<&Arc<AtomicBool>>) -> bool {
    cancel.is_some_and(|flag| flag.load(Ordering::Relaxed))
}

fn measure_one<R: BlockRasterizer + ?Sized>(
    rasterizer: &R,
    descriptor: &BlockDescriptor,
    geometry: &PageGeometry,
    cancel: Option<&Arc<AtomicBool>>,
) -> Result<Option<LayoutBlock>, Error> {
    if is_cancelled(cancel) {
        return Err(Error::Cancelled);
    }
    let width_px = geometry.content_width_px();
    let bitmap = match rasterizer.rasterize(descriptor, width_px, geometry) {
        Ok(bitmap) => bitmap,
        Err(e) => {
            log::warn!(
                "Skipping {} block {}: {e}",
                descriptor.kind,
                descriptor.source_index
            );
            return Ok(None);
        }
    };
    if bitmap.width() == 0 || bitmap.height() == 0 {
        log::debug!(
            "Skipping empty {} block {}",
            descriptor.kind,
            descriptor.source_index
        );
        return Ok(None);
    }

    Ok(Some(LayoutBlock {
        kind: descriptor.kind,
        source_index: descriptor.source_index,
        keep_with_next: descriptor.keep_with_next,
        width_mm: geometry.px_to_mm(bitmap.width()),
        height_mm: geometry.px_to_mm(bitmap.height()),
        bitmap,
    }))
}

/// Rasterizes every descriptor and keeps the ones that produced a bitmap.
/// Output order always matches input order, also when `parallel` is set.
pub fn measure_blocks<R: BlockRasterizer + ?Sized>(
    rasterizer: &R,
    descriptors: &[BlockDescriptor],
    geometry: &PageGeometry,
    parallel: bool,
    cancel: Option<&Arc<AtomicBool>>,
) -> Result<Vec<LayoutBlock>, Error> {
    let measured: Vec<Option<LayoutBlock>> = if parallel {
        descriptors
            .par_iter()
            .map(|d| measure_one(rasterizer, d, geometry, cancel))
            .collect::<Result<_, _>>()?
    } else {
        descriptors
            .iter()
            .map(|d| measure_one(rasterizer, d, geometry, cancel))
            .collect::<Result<_, _>>()?
    };
    Ok(measured.into_iter().flatten().collect())
}
