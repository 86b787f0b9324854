use image::{RgbImage, RgbaImage};
use pdf_writer::{Filter, Pdf, Ref};

fn write_rgb(pdf: &mut Pdf, id: Ref, width: u32, height: u32, rgb: &[u8], s_mask: Option<Ref>) {
    let compressed = miniz_oxide::deflate::compress_to_vec_zlib(rgb, 6);
    let mut xobj = pdf.image_xobject(id, &compressed);
    xobj.filter(Filter::FlateDecode);
    xobj.width(width as i32);
    xobj.height(height as i32);
    xobj.color_space().device_rgb();
    xobj.bits_per_component(8);
    if let Some(mask_ref) = s_mask {
        xobj.s_mask(mask_ref);
    }
}

/// Flate-compressed DeviceRGB image XObject for a block bitmap.
pub(super) fn embed_rgb(pdf: &mut Pdf, id: Ref, bitmap: &RgbImage) {
    write_rgb(
        pdf,
        id,
        bitmap.width(),
        bitmap.height(),
        bitmap.as_raw(),
        None,
    );
}

/// RGB XObject plus a DeviceGray soft mask when any pixel is not fully
/// opaque. `alloc` is only called for the mask.
pub(super) fn embed_rgba(pdf: &mut Pdf, id: Ref, pixels: &RgbaImage, alloc: &mut dyn FnMut() -> Ref) {
    let (w, h) = (pixels.width(), pixels.height());
    let has_alpha = pixels.pixels().any(|p| p.0[3] < 255);

    let smask_ref = if has_alpha {
        let alpha_data: Vec<u8> = pixels.pixels().map(|p| p.0[3]).collect();
        let compressed_alpha = miniz_oxide::deflate::compress_to_vec_zlib(&alpha_data, 6);
        let mask_ref = alloc();
        let mut mask = pdf.image_xobject(mask_ref, &compressed_alpha);
        mask.filter(Filter::FlateDecode);
        mask.width(w as i32);
        mask.height(h as i32);
        mask.color_space().device_gray();
        mask.bits_per_component(8);
        Some(mask_ref)
    } else {
        None
    };

    let rgb_data: Vec<u8> = pixels
        .pixels()
        .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
        .collect();
    write_rgb(pdf, id, w, h, &rgb_data, smask_ref);
}
