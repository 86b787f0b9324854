//! Paginated CV export.
//!
//! A [`CvRecord`] is split into atomic blocks, each block is rasterized at
//! the page's content width, and a greedy first-fit pass places whole blocks
//! onto fixed-size pages. The PDF is assembled from those placements, so no
//! block is ever cut across a page break. Word and JSON exports are written
//! straight from the record.

pub mod anonymize;
pub mod coerce;
pub mod content;
pub mod docx;
mod error;
mod export;
mod fonts;
pub mod geometry;
mod logo;
pub mod measure;
pub mod model;
pub mod paginate;
pub mod pdf;
pub mod segment;

pub use error::Error;
pub use export::{
    ExportOptions, Exporter, OutputFormat, convert_file, export_json, export_pdf,
    export_profile_word, export_word, load_record, read_record,
};
pub use fonts::{FontFace, FontSet};
pub use geometry::{PageFormat, PageGeometry};
pub use logo::{Logo, LogoSource};
pub use measure::{BlockRasterizer, TextRasterizer, measure_blocks};
pub use model::CvRecord;
pub use paginate::{LayoutBlock, PagePlacement, PagePlan, PaginationRules, layout};
pub use segment::{BlockDescriptor, BlockKind, HeadingPolicy, segment, segment_profile};
