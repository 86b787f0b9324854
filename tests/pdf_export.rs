mod common;

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use common::StubRasterizer;
use cvpress::pdf::{self, DocumentInfo};
use cvpress::{
    BlockKind, CvRecord, Error, ExportOptions, Exporter, LayoutBlock, LogoSource, OutputFormat,
    PageGeometry, PagePlacement, PagePlan,
};

fn jobs_only() -> CvRecord {
    let mut record = common::sample_record();
    record.skills.clear();
    record.education.clear();
    record.languages.clear();
    record
}

fn scenario_options() -> ExportOptions {
    ExportOptions {
        geometry: PageGeometry::a4(20.0),
        ..Default::default()
    }
}

fn scenario_stub() -> StubRasterizer {
    StubRasterizer::new(10.0)
        .height(BlockKind::Header, 20.0)
        .height(BlockKind::Summary, 30.0)
        .height(BlockKind::ExperienceItem, 100.0)
}

#[test]
fn three_jobs_break_before_the_last() {
    common::init_logging();
    let exporter = Exporter::new(scenario_stub());
    let (blocks, plan) = exporter.plan(&jobs_only(), &scenario_options()).unwrap();

    assert_eq!(blocks.len(), 5);
    let pages: Vec<usize> = plan.placements.iter().map(|p| p.page_index).collect();
    assert_eq!(pages, [0, 0, 0, 0, 1]);
    assert_eq!(blocks[4].source_index, 2);

    let bytes = exporter.export_pdf(&jobs_only(), &scenario_options()).unwrap();
    assert_eq!(common::pdf_page_count(&bytes), 2);
}

#[test]
fn page_count_matches_plan() {
    let exporter = Exporter::new(StubRasterizer::new(70.0));
    let options = ExportOptions::default();
    let record = common::sample_record();
    let (_, plan) = exporter.plan(&record, &options).unwrap();
    let bytes = exporter.export_pdf(&record, &options).unwrap();

    assert!(bytes.starts_with(b"%PDF-"));
    assert!(plan.page_count() > 1);
    assert_eq!(common::pdf_page_count(&bytes), plan.page_count());
}

#[test]
fn every_block_is_embedded_once() {
    let exporter = Exporter::new(StubRasterizer::new(40.0));
    let record = common::sample_record();
    let options = ExportOptions::default();
    let (blocks, _) = exporter.plan(&record, &options).unwrap();
    let bytes = exporter.export_pdf(&record, &options).unwrap();

    let doc = lopdf::Document::load_mem(&bytes).unwrap();
    let images = doc
        .objects
        .values()
        .filter_map(|o| o.as_stream().ok())
        .filter(|s| {
            s.dict
                .get(b"Subtype")
                .and_then(|v| v.as_name())
                .is_ok_and(|n| n == b"Image")
        })
        .count();
    assert_eq!(images, blocks.len());
}

#[test]
fn empty_record_still_yields_one_page() {
    let exporter = Exporter::new(StubRasterizer::new(40.0));
    let (blocks, plan) = exporter
        .plan(&CvRecord::default(), &ExportOptions::default())
        .unwrap();
    assert!(blocks.is_empty());
    assert!(plan.placements.is_empty());
    assert_eq!(plan.page_count(), 0);

    let bytes = exporter
        .export_pdf(&CvRecord::default(), &ExportOptions::default())
        .unwrap();
    assert_eq!(common::pdf_page_count(&bytes), 1);
}

#[test]
fn failing_block_is_skipped() {
    common::init_logging();
    let stub = StubRasterizer::new(40.0).failing(BlockKind::Summary);
    let exporter = Exporter::new(stub);
    let record = common::sample_record();
    let (blocks, _) = exporter.plan(&record, &ExportOptions::default()).unwrap();

    assert!(blocks.iter().all(|b| b.kind != BlockKind::Summary));
    assert!(blocks.iter().any(|b| b.kind == BlockKind::Skills));
    assert!(
        exporter
            .export_pdf(&record, &ExportOptions::default())
            .is_ok()
    );
}

#[test]
fn parallel_measurement_matches_sequential() {
    let stub = StubRasterizer::new(25.0)
        .height(BlockKind::ExperienceItem, 90.0)
        .height(BlockKind::Education, 35.0);
    let exporter = Exporter::new(stub);
    let record = common::sample_record();
    let sequential = exporter.plan(&record, &ExportOptions::default()).unwrap().1;
    let parallel = exporter
        .plan(
            &record,
            &ExportOptions {
                parallel_measure: true,
                ..Default::default()
            },
        )
        .unwrap()
        .1;
    assert_eq!(sequential, parallel);
}

#[test]
fn title_and_creator_are_recorded() {
    let exporter = Exporter::new(StubRasterizer::new(40.0));
    let bytes = exporter
        .export_pdf(&common::sample_record(), &ExportOptions::default())
        .unwrap();
    assert_eq!(
        common::pdf_info(&bytes, b"Title").as_deref(),
        Some("John Michael Doe")
    );
    assert!(common::pdf_info(&bytes, b"Creator").unwrap().starts_with("cvpress "));
}

#[test]
fn anonymized_pdf_never_sees_identifying_text() {
    let exporter = Exporter::new(StubRasterizer::new(40.0));
    let options = ExportOptions {
        anonymize: true,
        ..Default::default()
    };
    let bytes = exporter.export_pdf(&common::sample_record(), &options).unwrap();

    let seen = exporter.rasterizer().seen_text();
    assert!(seen.contains("J.M.D."));
    assert!(!seen.contains("John Michael Doe"));
    assert!(!seen.contains("john.doe@example.com"));
    assert!(!seen.contains("London"));
    assert_eq!(common::pdf_info(&bytes, b"Title").as_deref(), Some("J.M.D."));
}

#[test]
fn logo_is_drawn_on_every_page() {
    let exporter = Exporter::new(StubRasterizer::new(70.0));
    let options = ExportOptions {
        logo: Some(LogoSource::Bytes(common::png_logo(64, 32))),
        ..Default::default()
    };
    let bytes = exporter.export_pdf(&common::sample_record(), &options).unwrap();
    let doc = lopdf::Document::load_mem(&bytes).unwrap();

    assert!(doc.get_pages().len() > 1);
    for page_id in doc.get_pages().values() {
        let content = doc.get_page_content(*page_id).unwrap();
        assert!(common::contains(&content, b"/Logo Do"));
    }
    assert!(common::contains(&bytes, b"/SMask"));
}

#[test]
fn unreadable_logo_is_ignored() {
    common::init_logging();
    let exporter = Exporter::new(StubRasterizer::new(40.0));
    let record = common::sample_record();
    for logo in [
        LogoSource::Bytes(b"definitely not an image".to_vec()),
        LogoSource::Path("/nonexistent/logo.png".into()),
    ] {
        let options = ExportOptions {
            logo: Some(logo),
            ..Default::default()
        };
        let bytes = exporter.export_pdf(&record, &options).unwrap();
        assert!(!common::contains(&bytes, b"/Logo"));
    }
}

#[test]
fn cancelled_export_returns_cancelled() {
    let flag = Arc::new(AtomicBool::new(true));
    let exporter = Exporter::new(StubRasterizer::new(40.0));
    let options = ExportOptions {
        cancel: Some(flag),
        ..Default::default()
    };
    let record = common::sample_record();
    assert!(matches!(
        exporter.export_pdf(&record, &options),
        Err(Error::Cancelled)
    ));
    assert!(matches!(
        exporter.export(&record, OutputFormat::Word, &options),
        Err(Error::Cancelled)
    ));
    assert!(exporter.rasterizer().seen_text().is_empty());
}

#[test]
fn margin_larger_than_page_is_rejected() {
    let exporter = Exporter::new(StubRasterizer::new(40.0));
    let options = ExportOptions {
        geometry: PageGeometry::a4(200.0),
        ..Default::default()
    };
    assert!(matches!(
        exporter.export_pdf(&common::sample_record(), &options),
        Err(Error::InvalidGeometry(_))
    ));
}

#[test]
fn profile_pdf_has_title_block_and_paragraphs() {
    let exporter = Exporter::new(StubRasterizer::new(20.0));
    let bytes = exporter
        .export_profile_pdf(
            "Seasoned engineer.\nLeads small teams.",
            "Jane Roe",
            &ExportOptions::default(),
        )
        .unwrap();
    assert_eq!(common::pdf_page_count(&bytes), 1);
    assert_eq!(
        common::pdf_info(&bytes, b"Title").as_deref(),
        Some("Jane Roe Profile")
    );
    let seen = exporter.rasterizer().seen_text();
    assert!(seen.contains("Profile Description"));
    assert!(seen.contains("Leads small teams."));
}

#[test]
fn placement_for_missing_block_is_a_render_error() {
    let geometry = PageGeometry::default();
    let blocks = vec![LayoutBlock::blank(BlockKind::Header, 0, 180.0, 20.0)];
    let plan = PagePlan {
        placements: vec![PagePlacement {
            page_index: 0,
            block: 3,
            offset_x_mm: geometry.margin_mm,
            offset_y_mm: geometry.margin_mm,
            width_mm: 180.0,
            height_mm: 20.0,
        }],
    };
    let result = pdf::render(&blocks, &plan, &geometry, None, &DocumentInfo::default());
    assert!(matches!(result, Err(Error::Render(_))));
}

#[test]
fn output_format_follows_extension() {
    use std::path::Path;
    assert_eq!(
        OutputFormat::from_path(Path::new("cv.PDF")).unwrap(),
        OutputFormat::Pdf
    );
    assert_eq!(
        OutputFormat::from_path(Path::new("out/cv.docx")).unwrap(),
        OutputFormat::Word
    );
    assert!(matches!(
        OutputFormat::from_path(Path::new("cv.txt")),
        Err(Error::UnsupportedFormat(_))
    ));
}
