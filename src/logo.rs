use std::io::Cursor;
use std::path::PathBuf;

use image::RgbaImage;

use crate::error::Error;

/// Where the company logo comes from. Fetching remote URLs is left to the
/// caller; pass the downloaded bytes.
#[derive(Clone, Debug, PartialEq)]
pub enum LogoSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

/// A decoded logo, kept as RGBA so transparency survives into the PDF.
#[derive(Clone, Debug)]
pub struct Logo {
    pixels: RgbaImage,
}

impl Logo {
    pub fn decode(bytes: &[u8]) -> Result<Logo, Error> {
        let pixels = image::load_from_memory(bytes)?.to_rgba8();
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(Error::UnsupportedFormat("logo image has no pixels".into()));
        }
        Ok(Logo { pixels })
    }

    pub fn load(source: &LogoSource) -> Result<Logo, Error> {
        match source {
            LogoSource::Bytes(bytes) => Logo::decode(bytes),
            LogoSource::Path(path) => Logo::decode(&std::fs::read(path)?),
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Width over height.
    pub fn aspect_ratio(&self) -> f32 {
        self.pixels.width() as f32 / self.pixels.height() as f32
    }

    pub(crate) fn to_png(&self) -> Result<Vec<u8>, Error> {
        let mut out = Cursor::new(Vec::new());
        self.pixels.write_to(&mut out, image::ImageFormat::Png)?;
        Ok(out.into_inner())
    }
}

/// A logo that cannot be read or decoded is dropped with a warning; the
/// document is still produced.
pub(crate) fn resolve(source: Option<&LogoSource>) -> Option<Logo> {
    let source = source?;
    match Logo::load(source) {
        Ok(logo) => Some(logo),
        Err(e) => {
            log::warn!("Ignoring logo: {e}");
            None
        }
    }
}
