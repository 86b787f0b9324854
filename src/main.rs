use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};

use cvpress::{
    Error, ExportOptions, Exporter, FontSet, HeadingPolicy, LogoSource, OutputFormat,
    PageFormat, PageGeometry, TextRasterizer, export_profile_word, load_record, read_record,
};

/// Export structured CVs to paginated PDF, Word and JSON.
#[derive(Debug, Parser)]
#[command(name = "cvpress", about, version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Export a CV record
    Cv {
        /// CV record as JSON
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Skip the strict schema parse and coerce the input field by field
        #[arg(long)]
        untrusted: bool,

        /// Bind the experience heading into its first entry (default) or
        /// keep it as a separate block
        #[arg(long)]
        separate_headings: bool,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Export a profile description
    Profile {
        /// Plain-text description, one paragraph per line
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Candidate name shown under the title
        #[arg(long)]
        name: String,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Debug, Args)]
struct CommonArgs {
    /// Output file; the format follows the extension unless --format is given
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Mask name, email and phone; drop location and links
    #[arg(long)]
    anonymize: bool,

    /// Logo image drawn in the top-right corner
    #[arg(long, value_name = "FILE")]
    logo: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = PaperArg::A4)]
    paper: PaperArg,

    #[arg(long, default_value_t = cvpress::geometry::DEFAULT_MARGIN_MM)]
    margin_mm: f32,

    /// Raster scale over 96 DPI
    #[arg(long, default_value_t = cvpress::geometry::DEFAULT_SCALE)]
    scale: f32,

    /// Rasterize blocks in parallel
    #[arg(long)]
    parallel: bool,

    /// Regular font file; system fonts are searched when omitted
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,

    /// Bold font file, defaults to the regular one
    #[arg(long, value_name = "FILE", requires = "font")]
    bold_font: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Pdf,
    Docx,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PaperArg {
    A4,
    Letter,
}

impl CommonArgs {
    fn format(&self) -> Result<OutputFormat, Error> {
        match self.format {
            Some(FormatArg::Pdf) => Ok(OutputFormat::Pdf),
            Some(FormatArg::Docx) => Ok(OutputFormat::Word),
            Some(FormatArg::Json) => Ok(OutputFormat::Json),
            None => OutputFormat::from_path(&self.output),
        }
    }

    fn options(&self, heading_policy: HeadingPolicy) -> ExportOptions {
        ExportOptions {
            anonymize: self.anonymize,
            logo: self.logo.clone().map(LogoSource::Path),
            geometry: PageGeometry {
                format: match self.paper {
                    PaperArg::A4 => PageFormat::A4,
                    PaperArg::Letter => PageFormat::Letter,
                },
                margin_mm: self.margin_mm,
                scale: self.scale,
            },
            heading_policy,
            parallel_measure: self.parallel,
            ..Default::default()
        }
    }

    /// Font discovery only runs when a PDF is actually requested.
    fn exporter(&self) -> Result<Exporter<TextRasterizer>, Error> {
        let fonts = match &self.font {
            Some(regular) => FontSet::from_paths(regular, self.bold_font.as_deref())?,
            None => FontSet::discover()?,
        };
        Ok(Exporter::new(TextRasterizer::new(fonts)))
    }
}

fn write(path: &Path, bytes: &[u8]) -> Result<(), Error> {
    std::fs::write(path, bytes)?;
    log::info!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

fn run(cli: Cli) -> Result<(), Error> {
    match cli.command {
        Command::Cv {
            input,
            untrusted,
            separate_headings,
            common,
        } => {
            let bytes = std::fs::read(&input)?;
            let record = if untrusted {
                read_record(&bytes, true)?
            } else {
                load_record(&bytes, &input.display().to_string())?
            };
            let policy = if separate_headings {
                HeadingPolicy::Separate
            } else {
                HeadingPolicy::Bind
            };
            let options = common.options(policy);
            let bytes = match common.format()? {
                OutputFormat::Pdf => common.exporter()?.export_pdf(&record, &options)?,
                OutputFormat::Word => cvpress::export_word(&record, &options)?,
                OutputFormat::Json => cvpress::export_json(&record, &options)?,
            };
            write(&common.output, &bytes)
        }
        Command::Profile {
            input,
            name,
            common,
        } => {
            let description = std::fs::read_to_string(&input)?;
            let options = common.options(HeadingPolicy::default());
            let bytes = match common.format()? {
                OutputFormat::Pdf => {
                    common
                        .exporter()?
                        .export_profile_pdf(&description, &name, &options)?
                }
                OutputFormat::Word => export_profile_word(&description, &name, &options)?,
                OutputFormat::Json => {
                    return Err(Error::UnsupportedFormat(
                        "profile descriptions export to pdf or docx".into(),
                    ));
                }
            };
            write(&common.output, &bytes)
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
