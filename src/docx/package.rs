use std::fmt::Write as _;
use std::io::{Cursor, Write};

use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use super::xml::{Justify, Para, R_NS, W_NS, mm_to_twips};
use crate::error::Error;
use crate::geometry::PageGeometry;
use crate::logo::Logo;

/// Widest the header logo is allowed to be, in pixels.
const LOGO_MAX_WIDTH_PX: f32 = 150.0;
const EMU_PER_PX: f32 = 9525.0;

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_STYLES: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const REL_HEADER: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/header";
const REL_IMAGE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const WP_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const A_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const PIC_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";

fn content_types(with_logo: bool) -> String {
    let mut xml = format!(
        r#"{XML_DECL}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#
    );
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    if with_logo {
        xml.push_str(r#"<Default Extension="png" ContentType="image/png"/>"#);
    }
    xml.push_str(r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#);
    xml.push_str(r#"<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#);
    if with_logo {
        xml.push_str(r#"<Override PartName="/word/header1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml"/>"#);
    }
    xml.push_str("</Types>");
    xml
}

fn relationships(rels: &[(&str, &str, &str)]) -> String {
    let mut xml = format!(r#"{XML_DECL}<Relationships xmlns="{REL_NS}">"#);
    for (id, kind, target) in rels {
        let _ = write!(
            xml,
            r#"<Relationship Id="{id}" Type="{kind}" Target="{target}"/>"#
        );
    }
    xml.push_str("</Relationships>");
    xml
}

fn styles() -> String {
    format!(
        concat!(
            r#"{decl}<w:styles xmlns:w="{w}">"#,
            r#"<w:docDefaults><w:rPrDefault><w:rPr>"#,
            r#"<w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:cs="Calibri"/>"#,
            r#"<w:sz w:val="22"/><w:szCs w:val="22"/><w:lang w:val="en-GB"/>"#,
            r#"</w:rPr></w:rPrDefault>"#,
            r#"<w:pPrDefault><w:pPr><w:spacing w:after="0" w:line="264" w:lineRule="auto"/></w:pPr></w:pPrDefault>"#,
            r#"</w:docDefaults>"#,
            r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>"#,
            r#"</w:styles>"#
        ),
        decl = XML_DECL,
        w = W_NS
    )
}

/// The logo scaled down to at most 150 px wide, in EMU.
fn logo_extent(logo: &Logo) -> (u64, u64) {
    let (w, h) = (logo.pixels().width() as f32, logo.pixels().height() as f32);
    let scale = (LOGO_MAX_WIDTH_PX / w).min(1.0);
    (
        (w * scale * EMU_PER_PX).round() as u64,
        (h * scale * EMU_PER_PX).round() as u64,
    )
}

fn header(logo: &Logo) -> String {
    let (cx, cy) = logo_extent(logo);
    let drawing = format!(
        concat!(
            r#"<w:r><w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0">"#,
            r#"<wp:extent cx="{cx}" cy="{cy}"/><wp:docPr id="1" name="Logo"/>"#,
            r#"<a:graphic xmlns:a="{a}"><a:graphicData uri="{pic}">"#,
            r#"<pic:pic xmlns:pic="{pic}"><pic:nvPicPr><pic:cNvPr id="0" name="logo.png"/><pic:cNvPicPr/></pic:nvPicPr>"#,
            r#"<pic:blipFill><a:blip r:embed="rIdLogo"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
            r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr></pic:pic>"#,
            r#"</a:graphicData></a:graphic></wp:inline></w:drawing></w:r>"#
        ),
        cx = cx,
        cy = cy,
        a = A_NS,
        pic = PIC_NS
    );
    let mut xml = format!(
        r#"{XML_DECL}<w:hdr xmlns:w="{W_NS}" xmlns:r="{R_NS}" xmlns:wp="{WP_NS}">"#
    );
    Para::new()
        .justify(Justify::Right)
        .raw(drawing)
        .write_xml(&mut xml);
    xml.push_str("</w:hdr>");
    xml
}

fn section_properties(geometry: &PageGeometry, with_logo: bool) -> String {
    let mut xml = String::from("<w:sectPr>");
    if with_logo {
        xml.push_str(r#"<w:headerReference w:type="default" r:id="rIdHeader1"/>"#);
    }
    let margin = mm_to_twips(geometry.margin_mm);
    let _ = write!(
        xml,
        concat!(
            r#"<w:pgSz w:w="{}" w:h="{}"/>"#,
            r#"<w:pgMar w:top="{m}" w:right="{m}" w:bottom="{m}" w:left="{m}" w:header="{h}" w:footer="{h}" w:gutter="0"/>"#
        ),
        mm_to_twips(geometry.page_width_mm()),
        mm_to_twips(geometry.page_height_mm()),
        m = margin,
        h = margin / 2,
    );
    xml.push_str("</w:sectPr>");
    xml
}

fn document(body: &[Para], geometry: &PageGeometry, with_logo: bool) -> String {
    let mut xml = format!(r#"{XML_DECL}<w:document xmlns:w="{W_NS}" xmlns:r="{R_NS}"><w:body>"#);
    for para in body {
        para.write_xml(&mut xml);
    }
    xml.push_str(&section_properties(geometry, with_logo));
    xml.push_str("</w:body></w:document>");
    xml
}

/// Zips the document body and its supporting parts into a `.docx` package.
pub(super) fn write_package(
    body: &[Para],
    geometry: &PageGeometry,
    logo: Option<&Logo>,
) -> Result<Vec<u8>, Error> {
    let logo_png = logo.map(|l| l.to_png().map(|png| (l, png))).transpose()?;
    let with_logo = logo_png.is_some();

    let mut doc_rels = vec![("rId1", REL_STYLES, "styles.xml")];
    if with_logo {
        doc_rels.push(("rIdHeader1", REL_HEADER, "header1.xml"));
    }

    let mut parts: Vec<(&str, Vec<u8>)> = vec![
        ("[Content_Types].xml", content_types(with_logo).into_bytes()),
        (
            "_rels/.rels",
            relationships(&[("rId1", REL_OFFICE_DOCUMENT, "word/document.xml")]).into_bytes(),
        ),
        (
            "word/document.xml",
            document(body, geometry, with_logo).into_bytes(),
        ),
        ("word/styles.xml", styles().into_bytes()),
        (
            "word/_rels/document.xml.rels",
            relationships(&doc_rels).into_bytes(),
        ),
    ];
    if let Some((logo, png)) = logo_png {
        parts.push(("word/header1.xml", header(logo).into_bytes()));
        parts.push((
            "word/_rels/header1.xml.rels",
            relationships(&[("rIdLogo", REL_IMAGE, "media/logo.png")]).into_bytes(),
        ));
        parts.push(("word/media/logo.png", png));
    }

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in &parts {
        zip.start_file(*name, options)?;
        zip.write_all(data)?;
    }
    Ok(zip.finish()?.into_inner())
}
