use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use crate::anonymize::{anonymize, initials};
use crate::coerce::record_from_untrusted_json;
use crate::docx;
use crate::error::Error;
use crate::geometry::PageGeometry;
use crate::logo::{self, LogoSource};
use crate::measure::{BlockRasterizer, TextRasterizer, is_cancelled, measure_blocks};
use crate::model::CvRecord;
use crate::paginate::{LayoutBlock, PagePlan, PaginationRules, layout};
use crate::pdf::{self, DocumentInfo};
use crate::segment::{BlockDescriptor, HeadingPolicy, segment, segment_profile};

/// Per-export settings. Nothing here outlives a single call.
#[derive(Clone, Debug, Default)]
pub struct ExportOptions {
    /// Mask identifying fields in every output format.
    pub anonymize: bool,
    pub logo: Option<LogoSource>,
    pub geometry: PageGeometry,
    pub rules: PaginationRules,
    pub heading_policy: HeadingPolicy,
    /// Rasterize blocks on the rayon thread pool.
    pub parallel_measure: bool,
    /// Checked between pipeline stages and between blocks; once set the
    /// export returns [`Error::Cancelled`].
    pub cancel: Option<Arc<AtomicBool>>,
}

impl ExportOptions {
    fn check_cancelled(&self) -> Result<(), Error> {
        if is_cancelled(self.cancel.as_ref()) {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    fn prepare<'a>(&self, record: &'a CvRecord) -> Cow<'a, CvRecord> {
        if self.anonymize {
            Cow::Owned(anonymize(record))
        } else {
            Cow::Borrowed(record)
        }
    }

    fn display_name(&self, candidate_name: &str) -> String {
        if self.anonymize {
            initials(candidate_name)
        } else {
            candidate_name.trim().to_string()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Pdf,
    Word,
    Json,
}

impl OutputFormat {
    /// `.pdf`, `.docx` or `.json`, case-insensitive.
    pub fn from_path(path: &Path) -> Result<OutputFormat, Error> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("pdf") => Ok(OutputFormat::Pdf),
            Some("docx") => Ok(OutputFormat::Word),
            Some("json") => Ok(OutputFormat::Json),
            _ => Err(Error::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// The paginated PDF pipeline around an injected rasterizer:
/// segment, measure, lay out, render.
pub struct Exporter<R> {
    rasterizer: R,
}

impl<R: BlockRasterizer> Exporter<R> {
    pub fn new(rasterizer: R) -> Exporter<R> {
        Exporter { rasterizer }
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    fn measure_and_layout(
        &self,
        descriptors: &[BlockDescriptor],
        options: &ExportOptions,
    ) -> Result<(Vec<LayoutBlock>, PagePlan), Error> {
        options.geometry.validate()?;
        options.check_cancelled()?;
        let t0 = Instant::now();
        let blocks = measure_blocks(
            &self.rasterizer,
            descriptors,
            &options.geometry,
            options.parallel_measure,
            options.cancel.as_ref(),
        )?;
        let t_measure = t0.elapsed();
        options.check_cancelled()?;

        let plan = layout(&blocks, &options.geometry, &options.rules);
        log::info!(
            "Timing: measure={:.1}ms ({} of {} blocks), layout={:.1}ms, {} pages",
            t_measure.as_secs_f64() * 1000.0,
            blocks.len(),
            descriptors.len(),
            (t0.elapsed() - t_measure).as_secs_f64() * 1000.0,
            plan.page_count(),
        );
        Ok((blocks, plan))
    }

    /// Measured blocks and their placements, without producing a document.
    pub fn plan(
        &self,
        record: &CvRecord,
        options: &ExportOptions,
    ) -> Result<(Vec<LayoutBlock>, PagePlan), Error> {
        let record = options.prepare(record);
        let descriptors = segment(&record, options.heading_policy);
        self.measure_and_layout(&descriptors, options)
    }

    fn render(
        &self,
        descriptors: &[BlockDescriptor],
        title: String,
        options: &ExportOptions,
    ) -> Result<Vec<u8>, Error> {
        let t0 = Instant::now();
        let (blocks, plan) = self.measure_and_layout(descriptors, options)?;
        let logo = logo::resolve(options.logo.as_ref());
        options.check_cancelled()?;
        let bytes = pdf::render(
            &blocks,
            &plan,
            &options.geometry,
            logo.as_ref(),
            &DocumentInfo { title },
        )?;
        options.check_cancelled()?;
        log::info!(
            "Timing: pdf total={:.1}ms (output {} bytes)",
            t0.elapsed().as_secs_f64() * 1000.0,
            bytes.len(),
        );
        Ok(bytes)
    }

    pub fn export_pdf(&self, record: &CvRecord, options: &ExportOptions) -> Result<Vec<u8>, Error> {
        options.check_cancelled()?;
        let record = options.prepare(record);
        let t0 = Instant::now();
        let descriptors = segment(&record, options.heading_policy);
        log::info!(
            "Timing: segmented into {} blocks in {:.1}ms",
            descriptors.len(),
            t0.elapsed().as_secs_f64() * 1000.0
        );
        self.render(&descriptors, record.candidate.full_name.clone(), options)
    }

    pub fn export_profile_pdf(
        &self,
        description: &str,
        candidate_name: &str,
        options: &ExportOptions,
    ) -> Result<Vec<u8>, Error> {
        options.check_cancelled()?;
        let name = options.display_name(candidate_name);
        let descriptors = segment_profile(description, &name);
        self.render(&descriptors, format!("{name} Profile"), options)
    }

    /// Dispatches on the output format. Only PDF uses the rasterizer.
    pub fn export(
        &self,
        record: &CvRecord,
        format: OutputFormat,
        options: &ExportOptions,
    ) -> Result<Vec<u8>, Error> {
        match format {
            OutputFormat::Pdf => self.export_pdf(record, options),
            OutputFormat::Word => export_word(record, options),
            OutputFormat::Json => export_json(record, options),
        }
    }
}

/// PDF export with the system-font [`TextRasterizer`].
pub fn export_pdf(record: &CvRecord, options: &ExportOptions) -> Result<Vec<u8>, Error> {
    Exporter::new(TextRasterizer::system()?).export_pdf(record, options)
}

pub fn export_word(record: &CvRecord, options: &ExportOptions) -> Result<Vec<u8>, Error> {
    options.geometry.validate()?;
    options.check_cancelled()?;
    let t0 = Instant::now();
    let record = options.prepare(record);
    let logo = logo::resolve(options.logo.as_ref());
    let bytes = docx::write_cv(&record, &options.geometry, logo.as_ref())?;
    log::info!(
        "Timing: docx={:.1}ms (output {} bytes)",
        t0.elapsed().as_secs_f64() * 1000.0,
        bytes.len(),
    );
    Ok(bytes)
}

pub fn export_profile_word(
    description: &str,
    candidate_name: &str,
    options: &ExportOptions,
) -> Result<Vec<u8>, Error> {
    options.geometry.validate()?;
    options.check_cancelled()?;
    let logo = logo::resolve(options.logo.as_ref());
    docx::write_profile(
        description,
        &options.display_name(candidate_name),
        &options.geometry,
        logo.as_ref(),
    )
}

/// Pretty-printed JSON of the (optionally anonymized) record.
pub fn export_json(record: &CvRecord, options: &ExportOptions) -> Result<Vec<u8>, Error> {
    options.check_cancelled()?;
    options.prepare(record).to_json()
}

/// Strict schema parse, or field-by-field coercion for extraction output.
pub fn read_record(bytes: &[u8], untrusted: bool) -> Result<CvRecord, Error> {
    if untrusted {
        record_from_untrusted_json(&String::from_utf8_lossy(bytes))
    } else {
        CvRecord::from_json(bytes)
    }
}

/// Strict schema parse first; on a JSON error the same bytes are coerced
/// leniently. `source` only names the input in the warning.
pub fn load_record(bytes: &[u8], source: &str) -> Result<CvRecord, Error> {
    match read_record(bytes, false) {
        Ok(record) => Ok(record),
        Err(Error::Json(e)) => {
            log::warn!("{source}: {e}; retrying as untrusted input");
            read_record(bytes, true)
        }
        Err(e) => Err(e),
    }
}

/// Reads a CV JSON file and writes it in the format implied by `output`'s
/// extension. Input that fails the strict parse is retried leniently.
pub fn convert_file(input: &Path, output: &Path, options: &ExportOptions) -> Result<(), Error> {
    let t0 = Instant::now();
    let format = OutputFormat::from_path(output)?;
    let bytes = std::fs::read(input)?;
    let record = load_record(&bytes, &input.display().to_string())?;
    let t_parse = t0.elapsed();

    let out = match format {
        OutputFormat::Pdf => export_pdf(&record, options)?,
        OutputFormat::Word => export_word(&record, options)?,
        OutputFormat::Json => export_json(&record, options)?,
    };
    let t_export = t0.elapsed();

    std::fs::write(output, &out)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: parse={:.1}ms, export={:.1}ms, write={:.1}ms, total={:.1}ms (output {} bytes)",
        t_parse.as_secs_f64() * 1000.0,
        (t_export - t_parse).as_secs_f64() * 1000.0,
        (t_total - t_export).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        out.len(),
    );
    Ok(())
}
