mod xobject;

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, TextStr};

use crate::error::Error;
use crate::geometry::PageGeometry;
use crate::logo::Logo;
use crate::paginate::{LayoutBlock, PagePlan};

/// Logo height on every page.
pub const LOGO_HEIGHT_MM: f32 = 12.0;

const CREATOR: &str = concat!("cvpress ", env!("CARGO_PKG_VERSION"));

/// Metadata written to the document information dictionary.
#[derive(Clone, Debug, Default)]
pub struct DocumentInfo {
    pub title: String,
}

/// Assembles the final PDF from measured blocks and their placements.
///
/// Every page of the plan becomes one PDF page (at least one, so an empty
/// plan yields a single blank page). Each placed block is embedded once as
/// an image XObject and drawn at its placement, converted from top-left
/// millimetres to bottom-left points.
pub fn render(
    blocks: &[LayoutBlock],
    plan: &PagePlan,
    geometry: &PageGeometry,
    logo: Option<&Logo>,
    info: &DocumentInfo,
) -> Result<Vec<u8>, Error> {
    let t0 = std::time::Instant::now();
    if let Some(bad) = plan.placements.iter().find(|p| p.block >= blocks.len()) {
        return Err(Error::Render(format!(
            "placement on page {} refers to block {} of {}",
            bad.page_index + 1,
            bad.block,
            blocks.len()
        )));
    }

    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let info_id = alloc();

    // Phase 1: one XObject per placed block, in block order
    let mut block_xobjects: Vec<Option<(String, Ref)>> = vec![None; blocks.len()];
    for placement in &plan.placements {
        let slot = &mut block_xobjects[placement.block];
        if slot.is_none() {
            let xobj_ref = alloc();
            xobject::embed_rgb(&mut pdf, xobj_ref, &blocks[placement.block].bitmap);
            *slot = Some((format!("Im{}", placement.block + 1), xobj_ref));
        }
    }

    let logo_xobject = logo.map(|logo| {
        let xobj_ref = alloc();
        xobject::embed_rgba(&mut pdf, xobj_ref, logo.pixels(), &mut alloc);
        (String::from("Logo"), xobj_ref, logo.aspect_ratio())
    });
    let t_images = t0.elapsed();

    // Phase 2: content streams
    let page_w = PageGeometry::mm_to_pt(geometry.page_width_mm());
    let page_h = PageGeometry::mm_to_pt(geometry.page_height_mm());
    let n = plan.page_count().max(1);
    let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

    for (page_index, &content_id) in content_ids.iter().enumerate() {
        let mut content = Content::new();
        for placement in plan.on_page(page_index) {
            let Some((name, _)) = &block_xobjects[placement.block] else {
                continue;
            };
            let w = PageGeometry::mm_to_pt(placement.width_mm);
            let h = PageGeometry::mm_to_pt(placement.height_mm);
            let x = PageGeometry::mm_to_pt(placement.offset_x_mm);
            let y = page_h - PageGeometry::mm_to_pt(placement.bottom_mm());
            content.save_state();
            content.transform([w, 0.0, 0.0, h, x, y]);
            content.x_object(Name(name.as_bytes()));
            content.restore_state();
        }

        if let Some((name, _, aspect)) = &logo_xobject {
            let h = PageGeometry::mm_to_pt(LOGO_HEIGHT_MM);
            let w = h * aspect;
            let margin = PageGeometry::mm_to_pt(geometry.margin_mm);
            content.save_state();
            content.transform([w, 0.0, 0.0, h, page_w - margin - w, page_h - margin - h]);
            content.x_object(Name(name.as_bytes()));
            content.restore_state();
        }

        let raw = content.finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
        pdf.stream(content_id, &compressed).filter(Filter::FlateDecode);
    }

    // Phase 3: page tree
    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(n as i32);

    for (page_index, &page_id) in page_ids.iter().enumerate() {
        let mut page = pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, page_w, page_h))
            .parent(pages_id)
            .contents(content_ids[page_index]);

        let mut resources = page.resources();
        let mut xobjects = resources.x_objects();
        for placement in plan.on_page(page_index) {
            if let Some((name, xobj_ref)) = &block_xobjects[placement.block] {
                xobjects.pair(Name(name.as_bytes()), *xobj_ref);
            }
        }
        if let Some((name, xobj_ref, _)) = &logo_xobject {
            xobjects.pair(Name(name.as_bytes()), *xobj_ref);
        }
    }

    {
        let mut doc_info = pdf.document_info(info_id);
        if !info.title.trim().is_empty() {
            doc_info.title(TextStr(info.title.trim()));
        }
        doc_info.creator(TextStr(CREATOR));
    }

    let bytes = pdf.finish();
    log::info!(
        "PDF assembly: images={:.1}ms, total={:.1}ms, {} pages, {} bytes",
        t_images.as_secs_f64() * 1000.0,
        t0.elapsed().as_secs_f64() * 1000.0,
        n,
        bytes.len(),
    );
    Ok(bytes)
}
