use thiserror::Error;

/// All errors an export can surface to the caller.
///
/// Measurement failures and logo failures never reach this type at the
/// façade level: they are logged and the export continues without the
/// affected block or logo.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid CV JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("DOCX packaging failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    /// No usable font face could be loaded
    #[error("font error: {0}")]
    Font(String),

    /// A single block could not be turned into a bitmap
    #[error("rasterization failed: {0}")]
    Raster(String),

    /// The output document could not be assembled
    #[error("render failed: {0}")]
    Render(String),

    #[error("invalid page geometry: {0}")]
    InvalidGeometry(String),

    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("export cancelled")]
    Cancelled,
}
