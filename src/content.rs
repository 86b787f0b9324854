//! Renderer-independent description of what a single layout block shows.
//!
//! A [`BlockContent`] is a vertical stack of wrapped paragraphs, rules and
//! spacing. The segmenter builds one per block; a rasterizer turns it into a
//! bitmap at a fixed content width.

use crate::model::{
    CandidateProfile, CertificationEntry, EducationEntry, ExperienceEntry, ExtraField,
    LanguageEntry, ProjectEntry, SkillGroup, is_blank,
};

pub type Rgb = [u8; 3];

pub const INK: Rgb = [30, 30, 30];
pub const MUTED: Rgb = [100, 100, 100];
pub const RULE: Rgb = [180, 180, 180];
pub const ACCENT: Rgb = [59, 130, 246];

#[derive(Clone, Debug, PartialEq)]
pub struct Run {
    pub text: String,
    pub size_pt: f32,
    pub bold: bool,
    pub colour: Rgb,
}

impl Run {
    pub fn regular(text: impl Into<String>, size_pt: f32) -> Run {
        Run {
            text: text.into(),
            size_pt,
            bold: false,
            colour: INK,
        }
    }

    pub fn bold(text: impl Into<String>, size_pt: f32) -> Run {
        Run {
            bold: true,
            ..Run::regular(text, size_pt)
        }
    }

    pub fn colour(mut self, colour: Rgb) -> Run {
        self.colour = colour;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Align {
    Left,
    Center,
}

/// Wrapped text. `trailing` is drawn right-aligned on the first line
/// (dates next to a job title) and narrows that line accordingly.
#[derive(Clone, Debug, PartialEq)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    pub trailing: Vec<Run>,
    pub align: Align,
    pub indent_mm: f32,
    pub line_height_mm: f32,
}

impl Paragraph {
    pub fn new(runs: Vec<Run>, line_height_mm: f32) -> Paragraph {
        Paragraph {
            runs,
            trailing: Vec::new(),
            align: Align::Left,
            indent_mm: 0.0,
            line_height_mm,
        }
    }

    pub fn trailing(mut self, runs: Vec<Run>) -> Paragraph {
        self.trailing = runs;
        self
    }

    pub fn centered(mut self) -> Paragraph {
        self.align = Align::Center;
        self
    }

    pub fn indent(mut self, indent_mm: f32) -> Paragraph {
        self.indent_mm = indent_mm;
        self
    }

    fn has_text(&self) -> bool {
        self.runs.iter().chain(&self.trailing).any(|r| !is_blank(&r.text))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Item {
    Paragraph(Paragraph),
    Rule { thickness_mm: f32, colour: Rgb },
    Space(f32),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BlockContent {
    pub items: Vec<Item>,
}

impl BlockContent {
    /// Nothing visible: no text and no rule. Leading/trailing spacing alone
    /// does not count.
    pub fn is_empty(&self) -> bool {
        !self.items.iter().any(|item| match item {
            Item::Paragraph(p) => p.has_text(),
            Item::Rule { .. } => true,
            Item::Space(_) => false,
        })
    }

    /// Plain text of every paragraph, one line per paragraph.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for item in &self.items {
            if let Item::Paragraph(p) = item {
                for run in p.runs.iter().chain(&p.trailing) {
                    out.push_str(&run.text);
                }
                out.push('\n');
            }
        }
        out
    }

    fn paragraph(&mut self, p: Paragraph) {
        if p.has_text() {
            self.items.push(Item::Paragraph(p));
        }
    }

    fn rule(&mut self, thickness_mm: f32, colour: Rgb) {
        self.items.push(Item::Rule {
            thickness_mm,
            colour,
        });
    }

    fn space(&mut self, mm: f32) {
        self.items.push(Item::Space(mm));
    }

    fn heading(&mut self, title: &str) {
        self.paragraph(Paragraph::new(vec![Run::bold(title.to_uppercase(), 12.0)], 7.0));
        self.rule(0.5, RULE);
        self.space(3.0);
    }
}

pub(crate) const SUMMARY_HEADING: &str = "Professional Summary";
pub(crate) const SKILLS_HEADING: &str = "Technical Skills";
pub(crate) const EXPERIENCE_HEADING: &str = "Professional Experience";
pub(crate) const PROJECTS_HEADING: &str = "Projects";
pub(crate) const EDUCATION_HEADING: &str = "Education";
pub(crate) const CERTIFICATIONS_HEADING: &str = "Certifications";
pub(crate) const LANGUAGES_HEADING: &str = "Languages";
pub(crate) const EXTRAS_HEADING: &str = "Additional Information";
pub(crate) const PROFILE_TITLE: &str = "Profile Description";

fn non_blank<'a>(parts: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    parts
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

pub(crate) fn header(candidate: &CandidateProfile) -> BlockContent {
    let mut c = BlockContent::default();
    c.paragraph(Paragraph::new(
        vec![Run::bold(candidate.full_name.trim(), 22.0)],
        10.0,
    ));
    c.paragraph(Paragraph::new(
        vec![Run::regular(candidate.title.trim(), 11.0).colour(MUTED)],
        6.0,
    ));

    let contact = non_blank([
        candidate.location.as_str(),
        candidate.email.as_str(),
        candidate.phone.as_str(),
    ]);
    if !contact.is_empty() {
        c.paragraph(Paragraph::new(
            vec![Run::regular(contact.join("  •  "), 9.0).colour(MUTED)],
            5.0,
        ));
    }

    let links: Vec<&str> = candidate
        .links
        .iter()
        .filter_map(|l| {
            if !is_blank(&l.url) {
                Some(l.url.trim())
            } else if !is_blank(&l.label) {
                Some(l.label.trim())
            } else {
                None
            }
        })
        .collect();
    if !links.is_empty() {
        c.paragraph(Paragraph::new(
            vec![Run::regular(links.join("  |  "), 8.5).colour(ACCENT)],
            4.5,
        ));
    }

    c.space(2.0);
    c.rule(0.5, ACCENT);
    c
}

pub(crate) fn summary(summary: &str) -> BlockContent {
    let mut c = BlockContent::default();
    c.heading(SUMMARY_HEADING);
    c.paragraph(Paragraph::new(vec![Run::regular(summary.trim(), 10.0)], 5.0));
    c
}

pub(crate) fn skills(groups: &[SkillGroup]) -> BlockContent {
    let mut c = BlockContent::default();
    c.heading(SKILLS_HEADING);
    for group in groups.iter().filter(|g| !g.is_blank()) {
        let items = non_blank(group.items.iter().map(String::as_str)).join(", ");
        let mut runs = Vec::new();
        if !is_blank(&group.category) {
            runs.push(Run::bold(format!("{}: ", group.category.trim()), 9.5));
        }
        runs.push(Run::regular(items, 9.5).colour(MUTED));
        c.paragraph(Paragraph::new(runs, 4.5));
        c.space(1.0);
    }
    c
}

pub(crate) fn standalone_heading(title: &str) -> BlockContent {
    let mut c = BlockContent::default();
    c.heading(title);
    c
}

/// One job entry. With `with_heading` the section heading is part of the
/// block so it can never be stranded at the bottom of a page.
pub(crate) fn experience(entry: &ExperienceEntry, with_heading: bool) -> BlockContent {
    let mut c = BlockContent::default();
    if with_heading {
        c.heading(EXPERIENCE_HEADING);
    }

    let period = entry.period();
    let trailing = if period.is_empty() {
        Vec::new()
    } else {
        vec![Run::regular(period, 9.0).colour(MUTED)]
    };
    c.paragraph(Paragraph::new(vec![Run::bold(entry.title.trim(), 10.5)], 5.5).trailing(trailing));

    let company = non_blank([
        entry.company.as_str(),
        entry.employment_type.as_str(),
        entry.location.as_str(),
    ]);
    c.paragraph(Paragraph::new(
        vec![Run::regular(company.join(" • "), 9.5).colour(ACCENT)],
        6.0,
    ));

    c.paragraph(Paragraph::new(vec![Run::regular(entry.description.trim(), 9.5)], 4.5).indent(2.0));
    for highlight in entry.highlights.iter().filter(|h| !is_blank(h)) {
        c.paragraph(
            Paragraph::new(vec![Run::regular(format!("• {}", highlight.trim()), 9.5)], 4.5)
                .indent(2.0),
        );
    }

    let tech = non_blank(entry.tech.iter().map(String::as_str));
    if !tech.is_empty() {
        c.paragraph(
            Paragraph::new(
                vec![
                    Run::bold("Tech: ", 9.0).colour(MUTED),
                    Run::regular(tech.join(", "), 9.0).colour(MUTED),
                ],
                4.5,
            )
            .indent(2.0),
        );
    }
    c.space(2.0);
    c
}

pub(crate) fn projects(entries: &[ProjectEntry]) -> BlockContent {
    let mut c = BlockContent::default();
    c.heading(PROJECTS_HEADING);
    for project in entries {
        c.paragraph(Paragraph::new(vec![Run::bold(project.name.trim(), 10.0)], 5.0));
        c.paragraph(Paragraph::new(vec![Run::regular(project.description.trim(), 9.5)], 4.5).indent(2.0));
        let tech = non_blank(project.tech.iter().map(String::as_str));
        if !tech.is_empty() {
            c.paragraph(
                Paragraph::new(vec![Run::regular(tech.join(", "), 9.0).colour(MUTED)], 4.5)
                    .indent(2.0),
            );
        }
        c.space(2.0);
    }
    c
}

pub(crate) fn education(entries: &[EducationEntry]) -> BlockContent {
    let mut c = BlockContent::default();
    c.heading(EDUCATION_HEADING);
    for edu in entries.iter().filter(|e| !e.is_blank()) {
        let degree = non_blank([edu.degree.as_str(), edu.field.as_str()]).join(", ");
        let period = edu.period();
        let trailing = if period.is_empty() {
            Vec::new()
        } else {
            vec![Run::regular(period, 9.0).colour(MUTED)]
        };
        c.paragraph(Paragraph::new(vec![Run::bold(degree, 10.0)], 5.0).trailing(trailing));
        c.paragraph(Paragraph::new(
            vec![Run::regular(edu.institution.trim(), 9.5).colour(MUTED)],
            5.0,
        ));
        c.space(2.0);
    }
    c
}

pub(crate) fn certifications(entries: &[CertificationEntry]) -> BlockContent {
    let mut c = BlockContent::default();
    c.heading(CERTIFICATIONS_HEADING);
    for cert in entries {
        let meta = non_blank([cert.issuer.as_str(), cert.date.as_str()]).join(" • ");
        let trailing = if meta.is_empty() {
            Vec::new()
        } else {
            vec![Run::regular(meta, 9.5).colour(MUTED)]
        };
        c.paragraph(Paragraph::new(vec![Run::bold(cert.name.trim(), 9.5)], 6.0).trailing(trailing));
    }
    c
}

pub(crate) fn languages(entries: &[LanguageEntry]) -> BlockContent {
    let mut c = BlockContent::default();
    c.heading(LANGUAGES_HEADING);
    let text: Vec<String> = entries
        .iter()
        .filter(|l| !is_blank(&l.name))
        .map(LanguageEntry::display)
        .collect();
    c.paragraph(Paragraph::new(vec![Run::regular(text.join("  •  "), 9.5)], 5.0));
    c
}

pub(crate) fn extras(entries: &[ExtraField]) -> BlockContent {
    let mut c = BlockContent::default();
    c.heading(EXTRAS_HEADING);
    for extra in entries.iter().filter(|e| !is_blank(&e.value)) {
        let mut runs = Vec::new();
        if !is_blank(&extra.label) {
            runs.push(Run::bold(format!("{}: ", extra.label.trim()), 9.5));
        }
        runs.push(Run::regular(extra.value.trim(), 9.5));
        c.paragraph(Paragraph::new(runs, 4.5));
        c.space(1.0);
    }
    c
}

pub(crate) fn profile_title(candidate_name: &str) -> BlockContent {
    let mut c = BlockContent::default();
    c.paragraph(Paragraph::new(vec![Run::bold(PROFILE_TITLE, 18.0)], 12.0).centered());
    c.paragraph(Paragraph::new(vec![Run::bold(candidate_name.trim(), 14.0)], 10.0).centered());
    c.space(4.0);
    c.rule(0.3, [150, 150, 150]);
    c.space(8.0);
    c
}

pub(crate) fn profile_paragraph(text: &str) -> BlockContent {
    let mut c = BlockContent::default();
    c.paragraph(Paragraph::new(vec![Run::regular(text.trim(), 11.0)], 6.0).centered());
    c.space(2.0);
    c
}
