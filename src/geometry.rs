//! Physical page geometry and the unit conversions between millimetres,
//! PDF points and raster pixels.

use crate::error::Error;

/// CSS reference resolution: 96 px per inch.
pub const CSS_PX_PER_MM: f32 = 96.0 / 25.4;
pub const PT_PER_MM: f32 = 72.0 / 25.4;

pub const DEFAULT_MARGIN_MM: f32 = 15.0;
pub const DEFAULT_SCALE: f32 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageFormat {
    A4,
    Letter,
}

impl PageFormat {
    /// Portrait (width, height) in millimetres.
    pub fn size_mm(self) -> (f32, f32) {
        match self {
            PageFormat::A4 => (210.0, 297.0),
            PageFormat::Letter => (215.9, 279.4),
        }
    }
}

/// Page format, uniform margin and render scale. Pure values; every
/// derived quantity is computed on demand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    pub format: PageFormat,
    pub margin_mm: f32,
    /// Raster scale factor on top of the CSS reference resolution (2.0 for
    /// crisp output).
    pub scale: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        PageGeometry {
            format: PageFormat::A4,
            margin_mm: DEFAULT_MARGIN_MM,
            scale: DEFAULT_SCALE,
        }
    }
}

impl PageGeometry {
    pub fn a4(margin_mm: f32) -> Self {
        PageGeometry {
            margin_mm,
            ..Default::default()
        }
    }

    pub fn page_width_mm(&self) -> f32 {
        self.format.size_mm().0
    }

    pub fn page_height_mm(&self) -> f32 {
        self.format.size_mm().1
    }

    pub fn content_width_mm(&self) -> f32 {
        self.page_width_mm() - 2.0 * self.margin_mm
    }

    pub fn content_height_mm(&self) -> f32 {
        self.page_height_mm() - 2.0 * self.margin_mm
    }

    pub fn px_per_mm(&self) -> f32 {
        CSS_PX_PER_MM * self.scale
    }

    /// Fixed width every block is rasterized against.
    pub fn content_width_px(&self) -> u32 {
        (self.content_width_mm() * self.px_per_mm()).round().max(0.0) as u32
    }

    pub fn px_to_mm(&self, px: u32) -> f32 {
        px as f32 / self.px_per_mm()
    }

    pub fn mm_to_px(&self, mm: f32) -> f32 {
        mm * self.px_per_mm()
    }

    pub fn pt_to_px(&self, pt: f32) -> f32 {
        pt / PT_PER_MM * self.px_per_mm()
    }

    pub fn mm_to_pt(mm: f32) -> f32 {
        mm * PT_PER_MM
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(Error::InvalidGeometry(format!(
                "scale must be positive, got {}",
                self.scale
            )));
        }
        if !(self.margin_mm.is_finite() && self.margin_mm >= 0.0) {
            return Err(Error::InvalidGeometry(format!(
                "margin must be non-negative, got {}mm",
                self.margin_mm
            )));
        }
        if self.content_width_mm() <= 0.0 || self.content_height_mm() <= 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "a {}mm margin leaves no content area",
                self.margin_mm
            )));
        }
        Ok(())
    }
}
