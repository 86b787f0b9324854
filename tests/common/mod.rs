#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::sync::Mutex;

use cvpress::model::{
    CandidateProfile, EducationEntry, ExperienceEntry, LanguageEntry, Link, SkillGroup,
};
use cvpress::{BlockDescriptor, BlockKind, BlockRasterizer, CvRecord, Error, PageGeometry};
use image::{Rgb, RgbImage};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn job(title: &str, company: &str) -> ExperienceEntry {
    ExperienceEntry {
        title: title.into(),
        company: company.into(),
        start_date: "2019-02".into(),
        end_date: "Present".into(),
        description: format!("Worked on {company} platform services."),
        highlights: vec!["Cut p99 latency by 40%".into()],
        tech: vec!["Rust".into(), "PostgreSQL".into()],
        ..Default::default()
    }
}

pub fn sample_record() -> CvRecord {
    CvRecord {
        candidate: CandidateProfile {
            full_name: "John Michael Doe".into(),
            title: "Senior Backend Engineer".into(),
            location: "London, UK".into(),
            email: "john.doe@example.com".into(),
            phone: "+44 20 1234 5678".into(),
            links: vec![Link {
                label: "GitHub".into(),
                url: "https://github.com/jdoe".into(),
            }],
        },
        summary: "Backend engineer with ten years of experience building payment systems.".into(),
        skills: vec![
            SkillGroup {
                category: "Languages".into(),
                items: vec!["Rust".into(), "Go".into(), "SQL".into()],
            },
            SkillGroup {
                category: "Cloud".into(),
                items: vec!["AWS".into(), "Kubernetes".into()],
            },
        ],
        experience: vec![
            job("Staff Engineer", "Acme Payments"),
            job("Senior Engineer", "Globex"),
            job("Engineer", "Initech"),
        ],
        education: vec![EducationEntry {
            degree: "BSc".into(),
            field: "Computer Science".into(),
            institution: "University of Manchester".into(),
            year: "2012".into(),
            ..Default::default()
        }],
        languages: vec![
            LanguageEntry {
                name: "English".into(),
                level: "Native".into(),
            },
            LanguageEntry {
                name: "German".into(),
                level: "B2".into(),
            },
        ],
        ..Default::default()
    }
}

/// Deterministic rasterizer: every block is a white rectangle of a fixed
/// height per kind. Kinds listed in `failing` return an error.
pub struct StubRasterizer {
    heights_mm: HashMap<BlockKind, f32>,
    default_mm: f32,
    failing: Vec<BlockKind>,
    seen: Mutex<Vec<String>>,
}

impl StubRasterizer {
    pub fn new(default_mm: f32) -> StubRasterizer {
        StubRasterizer {
            heights_mm: HashMap::new(),
            default_mm,
            failing: Vec::new(),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn height(mut self, kind: BlockKind, mm: f32) -> StubRasterizer {
        self.heights_mm.insert(kind, mm);
        self
    }

    pub fn failing(mut self, kind: BlockKind) -> StubRasterizer {
        self.failing.push(kind);
        self
    }

    /// Plain text of every block rasterized so far.
    pub fn seen_text(&self) -> String {
        self.seen.lock().unwrap().join("\n")
    }
}

impl BlockRasterizer for StubRasterizer {
    fn rasterize(
        &self,
        block: &BlockDescriptor,
        width_px: u32,
        geometry: &PageGeometry,
    ) -> Result<RgbImage, Error> {
        self.seen.lock().unwrap().push(block.content.plain_text());
        if self.failing.contains(&block.kind) {
            return Err(Error::Raster(format!("stub refuses {}", block.kind)));
        }
        let mm = self.heights_mm.get(&block.kind).copied().unwrap_or(self.default_mm);
        let height_px = geometry.mm_to_px(mm).round() as u32;
        Ok(RgbImage::from_pixel(width_px, height_px, Rgb([255, 255, 255])))
    }
}

pub fn pdf_page_count(bytes: &[u8]) -> usize {
    let doc = lopdf::Document::load_mem(bytes).expect("output should be a readable PDF");
    doc.get_pages().len()
}

fn decode_pdf_string(raw: &[u8]) -> String {
    if let Some(utf16) = raw.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        String::from_utf8_lossy(raw).into_owned()
    }
}

pub fn pdf_info(bytes: &[u8], key: &[u8]) -> Option<String> {
    let doc = lopdf::Document::load_mem(bytes).ok()?;
    let info = doc.trailer.get(b"Info").ok()?.as_reference().ok()?;
    let dict = doc.get_object(info).ok()?.as_dict().ok()?;
    match dict.get(key).ok()? {
        lopdf::Object::String(raw, _) => Some(decode_pdf_string(raw)),
        _ => None,
    }
}

pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

pub fn docx_part(bytes: &[u8], name: &str) -> Option<Vec<u8>> {
    let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).ok()?;
    let mut file = zip.by_name(name).ok()?;
    let mut out = Vec::new();
    file.read_to_end(&mut out).ok()?;
    Some(out)
}

pub fn docx_xml(bytes: &[u8], name: &str) -> Option<String> {
    docx_part(bytes, name).and_then(|b| String::from_utf8(b).ok())
}

/// Text of every `w:p` in the document body, runs concatenated.
pub fn docx_paragraphs(bytes: &[u8]) -> Vec<String> {
    let xml = docx_xml(bytes, "word/document.xml").expect("document.xml missing");
    let doc = roxmltree::Document::parse(&xml).expect("document.xml should be well-formed");
    doc.descendants()
        .filter(|n| n.has_tag_name("p"))
        .map(|p| {
            p.descendants()
                .filter(|n| n.has_tag_name("t"))
                .filter_map(|t| t.text())
                .collect::<String>()
        })
        .collect()
}

pub fn png_logo(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 30, 30, 128]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}
