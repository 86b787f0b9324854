//! Built-in rasterizer: lays out [`BlockContent`] with TrueType metrics and
//! fills the glyph outlines with tiny-skia.

use std::ops::Range;

use image::RgbImage;
use tiny_skia::{Color, FillRule, Paint, Path, PathBuilder, Pixmap, Rect, Transform};
use ttf_parser::{Face, GlyphId, OutlineBuilder};

use super::BlockRasterizer;
use crate::content::{Align, BlockContent, Item, Paragraph, Rgb, Run};
use crate::error::Error;
use crate::fonts::FontSet;
use crate::geometry::PageGeometry;
use crate::segment::BlockDescriptor;

/// Space between a paragraph's first line and its right-aligned trailing text.
const TRAILING_GAP_MM: f32 = 4.0;

pub struct TextRasterizer {
    fonts: FontSet,
}

impl TextRasterizer {
    pub fn new(fonts: FontSet) -> TextRasterizer {
        TextRasterizer { fonts }
    }

    /// Uses the first suitable family found in the system font directories.
    pub fn system() -> Result<TextRasterizer, Error> {
        Ok(TextRasterizer::new(FontSet::discover()?))
    }
}

impl BlockRasterizer for TextRasterizer {
    fn rasterize(
        &self,
        block: &BlockDescriptor,
        width_px: u32,
        geometry: &PageGeometry,
    ) -> Result<RgbImage, Error> {
        if block.content.is_empty() || width_px == 0 {
            return Ok(RgbImage::new(0, 0));
        }
        let faces = Faces {
            regular: self.fonts.regular.face()?,
            bold: self.fonts.bold.face()?,
        };

        let (ops, height) = layout_content(&block.content, &faces, width_px as f32, geometry);
        let height_px = height.ceil() as u32;
        if height_px == 0 {
            return Ok(RgbImage::new(0, 0));
        }

        let mut pixmap = Pixmap::new(width_px, height_px).ok_or_else(|| {
            Error::Raster(format!("invalid raster size {width_px}x{height_px}"))
        })?;
        pixmap.fill(Color::WHITE);
        for op in &ops {
            draw(&mut pixmap, op, &faces);
        }
        Ok(to_rgb(&pixmap))
    }
}

struct Faces<'a> {
    regular: Face<'a>,
    bold: Face<'a>,
}

impl<'a> Faces<'a> {
    fn get(&self, bold: bool) -> &Face<'a> {
        if bold { &self.bold } else { &self.regular }
    }
}

fn glyph(face: &Face, ch: char) -> GlyphId {
    face.glyph_index(ch)
        .or_else(|| face.glyph_index('?'))
        .unwrap_or(GlyphId(0))
}

fn advance(face: &Face, ch: char, size_px: f32) -> f32 {
    let units = face.units_per_em() as f32;
    face.glyph_hor_advance(glyph(face, ch))
        .map(|adv| adv as f32 * size_px / units)
        .unwrap_or(0.0)
}

fn text_width(face: &Face, text: &str, size_px: f32) -> f32 {
    text.chars().map(|ch| advance(face, ch, size_px)).sum()
}

/// One whitespace-delimited word of a paragraph, tagged with the run it
/// came from. `space_before` is set when whitespace separated it from the
/// previous word on the same hard line.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Token<'a> {
    text: &'a str,
    run: usize,
    space_before: bool,
}

/// Splits runs into hard lines (separated by `\n`) of words. Words of
/// adjacent runs with no whitespace between them stay separate tokens but
/// are drawn without a gap.
fn tokenize(runs: &[Run]) -> Vec<Vec<Token<'_>>> {
    let mut lines: Vec<Vec<Token>> = vec![Vec::new()];
    let mut pending_space = false;
    for (run_idx, run) in runs.iter().enumerate() {
        for (n, segment) in run.text.split('\n').enumerate() {
            if n > 0 {
                lines.push(Vec::new());
                pending_space = false;
            }
            let mut rest = segment;
            loop {
                let trimmed = rest.trim_start();
                if trimmed.len() != rest.len() {
                    pending_space = true;
                }
                if trimmed.is_empty() {
                    break;
                }
                let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
                if let Some(line) = lines.last_mut() {
                    line.push(Token {
                        text: &trimmed[..end],
                        run: run_idx,
                        space_before: pending_space && !line.is_empty(),
                    });
                }
                pending_space = false;
                rest = &trimmed[end..];
            }
        }
    }
    lines
}

/// Greedy line filling. `measure` returns (space before, word width) for a
/// token. A word wider than the line gets a line of its own. Always returns
/// at least one (possibly empty) line.
fn wrap<'a>(
    tokens: &[Token<'a>],
    first_width: f32,
    width: f32,
    measure: impl Fn(&Token<'a>) -> (f32, f32),
) -> Vec<Range<usize>> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut line_w = 0.0f32;
    for (i, token) in tokens.iter().enumerate() {
        let (space, w) = measure(token);
        if i == start {
            line_w = w;
            continue;
        }
        let limit = if lines.is_empty() { first_width } else { width };
        let next = line_w + space + w;
        if next > limit {
            lines.push(start..i);
            start = i;
            line_w = w;
        } else {
            line_w = next;
        }
    }
    lines.push(start..tokens.len());
    lines
}

enum Op<'a> {
    Text {
        x: f32,
        baseline: f32,
        size_px: f32,
        bold: bool,
        colour: Rgb,
        text: &'a str,
    },
    Fill {
        y: f32,
        height: f32,
        colour: Rgb,
    },
}

/// Positions every item of a block top to bottom. Returns the draw list and
/// the block's total height in pixels.
fn layout_content<'a>(
    content: &'a BlockContent,
    faces: &Faces,
    width: f32,
    geometry: &PageGeometry,
) -> (Vec<Op<'a>>, f32) {
    let px_per_mm = geometry.px_per_mm();
    let mut ops = Vec::new();
    let mut y = 0.0f32;
    for item in &content.items {
        match item {
            Item::Paragraph(p) => layout_paragraph(p, faces, width, geometry, &mut y, &mut ops),
            Item::Rule {
                thickness_mm,
                colour,
            } => {
                let height = (thickness_mm * px_per_mm).max(1.0);
                ops.push(Op::Fill {
                    y,
                    height,
                    colour: *colour,
                });
                y += height;
            }
            Item::Space(mm) => y += mm * px_per_mm,
        }
    }
    (ops, y)
}

/// Emits one span per word of a laid-out line, starting at `x`.
fn push_line<'a>(
    tokens: &[Token<'a>],
    runs: &'a [Run],
    faces: &Faces,
    geometry: &PageGeometry,
    mut x: f32,
    baseline: f32,
    ops: &mut Vec<Op<'a>>,
) {
    for (i, token) in tokens.iter().enumerate() {
        let run = &runs[token.run];
        let size_px = geometry.pt_to_px(run.size_pt);
        let face = faces.get(run.bold);
        if i > 0 && token.space_before {
            x += advance(face, ' ', size_px);
        }
        ops.push(Op::Text {
            x,
            baseline,
            size_px,
            bold: run.bold,
            colour: run.colour,
            text: token.text,
        });
        x += text_width(face, token.text, size_px);
    }
}

fn line_width(tokens: &[Token], runs: &[Run], faces: &Faces, geometry: &PageGeometry) -> f32 {
    tokens
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let (space, w) = token_metrics(t, runs, faces, geometry);
            if i > 0 { space + w } else { w }
        })
        .sum()
}

fn token_metrics(token: &Token, runs: &[Run], faces: &Faces, geometry: &PageGeometry) -> (f32, f32) {
    let run = &runs[token.run];
    let size_px = geometry.pt_to_px(run.size_pt);
    let face = faces.get(run.bold);
    let space = if token.space_before {
        advance(face, ' ', size_px)
    } else {
        0.0
    };
    (space, text_width(face, token.text, size_px))
}

fn layout_paragraph<'a>(
    p: &'a Paragraph,
    faces: &Faces,
    width: f32,
    geometry: &PageGeometry,
    y: &mut f32,
    ops: &mut Vec<Op<'a>>,
) {
    let px_per_mm = geometry.px_per_mm();
    let line_h = p.line_height_mm * px_per_mm;
    let indent = p.indent_mm * px_per_mm;
    let avail = (width - indent).max(1.0);

    let trailing: Vec<Token> = tokenize(&p.trailing).into_iter().flatten().collect();
    let trailing_w = line_width(&trailing, &p.trailing, faces, geometry);
    let first_avail = if trailing.is_empty() {
        avail
    } else {
        (avail - trailing_w - TRAILING_GAP_MM * px_per_mm).max(1.0)
    };

    let max_size_pt = p
        .runs
        .iter()
        .chain(&p.trailing)
        .map(|r| r.size_pt)
        .fold(0.0f32, f32::max);
    let size_px = geometry.pt_to_px(max_size_pt);
    let face = &faces.regular;
    let units = face.units_per_em() as f32;
    let ascent = face.ascender() as f32 / units * size_px;
    let descent = face.descender() as f32 / units * size_px;
    let baseline_offset = (line_h - (ascent - descent)) / 2.0 + ascent;

    let mut first_line = true;
    for hard_line in tokenize(&p.runs) {
        let measure = |t: &Token<'a>| token_metrics(t, &p.runs, faces, geometry);
        let lines = if first_line {
            wrap(&hard_line, first_avail, avail, measure)
        } else {
            wrap(&hard_line, avail, avail, measure)
        };
        for range in lines {
            let tokens = &hard_line[range];
            let baseline = *y + baseline_offset;
            let x = match p.align {
                Align::Left => indent,
                Align::Center => {
                    let w = line_width(tokens, &p.runs, faces, geometry);
                    indent + ((avail - w) / 2.0).max(0.0)
                }
            };
            push_line(tokens, &p.runs, faces, geometry, x, baseline, ops);
            if first_line && !trailing.is_empty() {
                let tx = (width - trailing_w).max(indent);
                push_line(&trailing, &p.trailing, faces, geometry, tx, baseline, ops);
            }
            first_line = false;
            *y += line_h;
        }
    }
}

fn paint(colour: Rgb) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(colour[0], colour[1], colour[2], 255);
    paint.anti_alias = true;
    paint
}

fn draw(pixmap: &mut Pixmap, op: &Op, faces: &Faces) {
    match *op {
        Op::Fill { y, height, colour } => {
            if let Some(rect) = Rect::from_xywh(0.0, y, pixmap.width() as f32, height) {
                pixmap.fill_rect(rect, &paint(colour), Transform::identity(), None);
            }
        }
        Op::Text {
            x,
            baseline,
            size_px,
            bold,
            colour,
            text,
        } => {
            let face = faces.get(bold);
            let scale = size_px / face.units_per_em() as f32;
            let paint = paint(colour);
            let mut pen = x;
            for ch in text.chars() {
                let gid = glyph(face, ch);
                let mut builder = GlyphPathBuilder::new(pen, baseline, scale);
                if face.outline_glyph(gid, &mut builder).is_some()
                    && let Some(path) = builder.finish()
                {
                    pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
                }
                pen += advance(face, ch, size_px);
            }
        }
    }
}

fn to_rgb(pixmap: &Pixmap) -> RgbImage {
    let mut out = RgbImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in out.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = image::Rgb([c.red(), c.green(), c.blue()]);
    }
    out
}

/// Font units are y-up; the pixmap is y-down.
struct GlyphPathBuilder {
    builder: PathBuilder,
    origin_x: f32,
    origin_y: f32,
    scale: f32,
}

impl GlyphPathBuilder {
    fn new(origin_x: f32, origin_y: f32, scale: f32) -> Self {
        Self {
            builder: PathBuilder::new(),
            origin_x,
            origin_y,
            scale,
        }
    }

    fn x(&self, x: f32) -> f32 {
        self.origin_x + x * self.scale
    }

    fn y(&self, y: f32) -> f32 {
        self.origin_y - y * self.scale
    }

    fn finish(self) -> Option<Path> {
        self.builder.finish()
    }
}

impl OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = (self.x(x), self.y(y));
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = (self.x(x), self.y(y));
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1, x, y) = (self.x(x1), self.y(y1), self.x(x), self.y(y));
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = (self.x(x1), self.y(y1));
        let (x2, y2) = (self.x(x2), self.y(y2));
        let (x, y) = (self.x(x), self.y(y));
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts<'a>(line: &[Token<'a>]) -> Vec<&'a str> {
        line.iter().map(|t| t.text).collect()
    }

    /// 10 units per character, 10 per space.
    fn fixed(t: &Token) -> (f32, f32) {
        let space = if t.space_before { 10.0 } else { 0.0 };
        (space, t.text.chars().count() as f32 * 10.0)
    }

    #[test]
    fn tokenize_joins_runs_and_splits_hard_breaks() {
        let runs = vec![Run::bold("Languages: ", 9.0), Run::regular("Rust, Go\nSQL", 9.0)];
        let lines = tokenize(&runs);
        assert_eq!(lines.len(), 2);
        assert_eq!(texts(&lines[0]), ["Languages:", "Rust,", "Go"]);
        assert!(!lines[0][0].space_before);
        assert!(lines[0][1].space_before);
        assert_eq!(lines[0][1].run, 1);
        assert_eq!(texts(&lines[1]), ["SQL"]);
        assert!(!lines[1][0].space_before);
    }

    #[test]
    fn adjacent_runs_without_whitespace_have_no_gap() {
        let runs = vec![Run::bold("2020", 9.0), Run::regular("-2021", 9.0)];
        let lines = tokenize(&runs);
        assert_eq!(texts(&lines[0]), ["2020", "-2021"]);
        assert!(!lines[0][1].space_before);
    }

    #[test]
    fn wrap_fills_lines_greedily() {
        let runs = vec![Run::regular("aaa bbb ccc dd", 9.0)];
        let tokens = &tokenize(&runs)[0];
        // "aaa bbb" is 70 wide, adding " ccc" makes 110
        let lines = wrap(tokens, 100.0, 100.0, fixed);
        assert_eq!(lines, vec![0..2, 2..4]);
    }

    #[test]
    fn wrap_uses_narrower_first_line() {
        let runs = vec![Run::regular("aaa bbb ccc", 9.0)];
        let tokens = &tokenize(&runs)[0];
        let lines = wrap(tokens, 50.0, 200.0, fixed);
        assert_eq!(lines, vec![0..1, 1..3]);
    }

    #[test]
    fn overlong_word_gets_its_own_line() {
        let runs = vec![Run::regular("a verylongword b", 9.0)];
        let tokens = &tokenize(&runs)[0];
        let lines = wrap(tokens, 60.0, 60.0, fixed);
        assert_eq!(lines, vec![0..1, 1..2, 2..3]);
    }

    #[test]
    fn empty_input_is_one_empty_line() {
        assert_eq!(wrap(&[], 10.0, 10.0, fixed), vec![0..0]);
    }
}
