//! Tiny WordprocessingML writer: just the paragraph and run properties the
//! exported documents use.

use std::fmt::Write;

pub(super) const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub(super) const R_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

pub(super) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // not allowed in XML 1.0
            c if (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r') => {}
            c => out.push(c),
        }
    }
    out
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) enum Justify {
    Left,
    Center,
    Right,
}

#[derive(Clone, Debug)]
pub(super) struct TextRun {
    text: String,
    bold: bool,
    /// Half-points, as in `w:sz`.
    size: u32,
    colour: Option<&'static str>,
}

impl TextRun {
    pub(super) fn new(text: impl Into<String>, size: u32) -> TextRun {
        TextRun {
            text: text.into(),
            bold: false,
            size,
            colour: None,
        }
    }

    pub(super) fn bold(mut self) -> TextRun {
        self.bold = true;
        self
    }

    pub(super) fn colour(mut self, hex: &'static str) -> TextRun {
        self.colour = Some(hex);
        self
    }

    fn write_xml(&self, out: &mut String) {
        out.push_str("<w:r><w:rPr>");
        if self.bold {
            out.push_str("<w:b/><w:bCs/>");
        }
        if let Some(colour) = self.colour {
            let _ = write!(out, r#"<w:color w:val="{colour}"/>"#);
        }
        let _ = write!(
            out,
            r#"<w:sz w:val="{0}"/><w:szCs w:val="{0}"/></w:rPr>"#,
            self.size
        );
        for (i, line) in self.text.split('\n').enumerate() {
            if i > 0 {
                out.push_str("<w:br/>");
            }
            let _ = write!(out, r#"<w:t xml:space="preserve">{}</w:t>"#, escape(line));
        }
        out.push_str("</w:r>");
    }
}

#[derive(Clone, Debug)]
pub(super) struct Para {
    justify: Justify,
    /// Twentieths of a point.
    before: u32,
    after: u32,
    runs: Vec<TextRun>,
    /// Raw run XML (drawings) appended after the text runs.
    raw: String,
}

impl Para {
    pub(super) fn new() -> Para {
        Para {
            justify: Justify::Left,
            before: 0,
            after: 0,
            runs: Vec::new(),
            raw: String::new(),
        }
    }

    pub(super) fn justify(mut self, justify: Justify) -> Para {
        self.justify = justify;
        self
    }

    pub(super) fn spacing(mut self, before: u32, after: u32) -> Para {
        self.before = before;
        self.after = after;
        self
    }

    pub(super) fn run(mut self, run: TextRun) -> Para {
        self.runs.push(run);
        self
    }

    pub(super) fn raw(mut self, xml: String) -> Para {
        self.raw.push_str(&xml);
        self
    }

    pub(super) fn write_xml(&self, out: &mut String) {
        out.push_str("<w:p><w:pPr>");
        if self.before > 0 || self.after > 0 {
            let _ = write!(
                out,
                r#"<w:spacing w:before="{}" w:after="{}"/>"#,
                self.before, self.after
            );
        }
        match self.justify {
            Justify::Left => {}
            Justify::Center => out.push_str(r#"<w:jc w:val="center"/>"#),
            Justify::Right => out.push_str(r#"<w:jc w:val="right"/>"#),
        }
        out.push_str("</w:pPr>");
        for run in &self.runs {
            run.write_xml(out);
        }
        out.push_str(&self.raw);
        out.push_str("</w:p>");
    }
}

/// Millimetres to twentieths of a point.
pub(super) fn mm_to_twips(mm: f32) -> u32 {
    (mm / 25.4 * 1440.0).round().max(0.0) as u32
}
