//! Splits a CV record into the ordered sequence of atomic layout blocks.
//!
//! Segmentation happens before anything is measured: each block is
//! rasterized on its own, so a page break can only ever fall between two
//! blocks, never inside one.

use std::fmt;

use crate::content::{self, BlockContent, EXPERIENCE_HEADING};
use crate::model::{CvRecord, is_blank};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Header,
    Summary,
    Skills,
    /// A standalone section heading, only produced by [`HeadingPolicy::Separate`]
    Heading,
    ExperienceItem,
    Projects,
    Education,
    Certifications,
    Languages,
    Extras,
    ProfileTitle,
    ProfileParagraph,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlockKind::Header => "header",
            BlockKind::Summary => "summary",
            BlockKind::Skills => "skills",
            BlockKind::Heading => "heading",
            BlockKind::ExperienceItem => "experience-item",
            BlockKind::Projects => "projects",
            BlockKind::Education => "education",
            BlockKind::Certifications => "certifications",
            BlockKind::Languages => "languages",
            BlockKind::Extras => "extras",
            BlockKind::ProfileTitle => "profile-title",
            BlockKind::ProfileParagraph => "profile-paragraph",
        };
        f.write_str(name)
    }
}

/// How the "Professional Experience" heading is kept away from the bottom
/// of a page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HeadingPolicy {
    /// The heading is drawn inside the first experience block.
    #[default]
    Bind,
    /// The heading is its own block marked `keep_with_next`; the pagination
    /// engine defers it when too little room is left under it.
    Separate,
}

/// What to render for one block, before it has been measured.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockDescriptor {
    pub kind: BlockKind,
    /// Index into the record sequence the block came from (0 for blocks that
    /// gather a whole sequence).
    pub source_index: usize,
    pub keep_with_next: bool,
    pub content: BlockContent,
}

impl BlockDescriptor {
    fn new(kind: BlockKind, source_index: usize, content: BlockContent) -> BlockDescriptor {
        BlockDescriptor {
            kind,
            source_index,
            keep_with_next: false,
            content,
        }
    }
}

/// Fixed segmentation policy: header, summary, skills, one block per job,
/// projects, education, certifications, languages, extras. Empty sections
/// produce no block at all.
pub fn segment(record: &CvRecord, policy: HeadingPolicy) -> Vec<BlockDescriptor> {
    let mut blocks = Vec::new();

    if !record.candidate.is_blank() {
        blocks.push(BlockDescriptor::new(
            BlockKind::Header,
            0,
            content::header(&record.candidate),
        ));
    }

    if !is_blank(&record.summary) {
        blocks.push(BlockDescriptor::new(
            BlockKind::Summary,
            0,
            content::summary(&record.summary),
        ));
    }

    if record.skills.iter().any(|g| !g.is_blank()) {
        blocks.push(BlockDescriptor::new(
            BlockKind::Skills,
            0,
            content::skills(&record.skills),
        ));
    }

    let jobs: Vec<(usize, _)> = record
        .experience
        .iter()
        .enumerate()
        .filter(|(_, e)| !e.is_blank())
        .collect();
    if !jobs.is_empty() && policy == HeadingPolicy::Separate {
        blocks.push(BlockDescriptor {
            keep_with_next: true,
            ..BlockDescriptor::new(
                BlockKind::Heading,
                0,
                content::standalone_heading(EXPERIENCE_HEADING),
            )
        });
    }
    for (n, (index, entry)) in jobs.into_iter().enumerate() {
        let with_heading = n == 0 && policy == HeadingPolicy::Bind;
        blocks.push(BlockDescriptor::new(
            BlockKind::ExperienceItem,
            index,
            content::experience(entry, with_heading),
        ));
    }

    let projects: Vec<_> = record
        .projects
        .iter()
        .filter(|p| !is_blank(&p.name) || !is_blank(&p.description))
        .cloned()
        .collect();
    if !projects.is_empty() {
        blocks.push(BlockDescriptor::new(
            BlockKind::Projects,
            0,
            content::projects(&projects),
        ));
    }

    if record.education.iter().any(|e| !e.is_blank()) {
        blocks.push(BlockDescriptor::new(
            BlockKind::Education,
            0,
            content::education(&record.education),
        ));
    }

    let certifications: Vec<_> = record
        .certifications
        .iter()
        .filter(|c| !is_blank(&c.name))
        .cloned()
        .collect();
    if !certifications.is_empty() {
        blocks.push(BlockDescriptor::new(
            BlockKind::Certifications,
            0,
            content::certifications(&certifications),
        ));
    }

    if record.languages.iter().any(|l| !is_blank(&l.name)) {
        blocks.push(BlockDescriptor::new(
            BlockKind::Languages,
            0,
            content::languages(&record.languages),
        ));
    }

    if record.extras.iter().any(|e| !is_blank(&e.value)) {
        blocks.push(BlockDescriptor::new(
            BlockKind::Extras,
            0,
            content::extras(&record.extras),
        ));
    }

    blocks
}

/// Profile-description document: a title block, then one block per
/// non-blank line of the description.
pub fn segment_profile(description: &str, candidate_name: &str) -> Vec<BlockDescriptor> {
    let mut blocks = vec![BlockDescriptor::new(
        BlockKind::ProfileTitle,
        0,
        content::profile_title(candidate_name),
    )];
    blocks.extend(
        description
            .lines()
            .enumerate()
            .filter(|(_, line)| !is_blank(line))
            .map(|(i, line)| {
                BlockDescriptor::new(BlockKind::ProfileParagraph, i, content::profile_paragraph(line))
            }),
    );
    blocks
}
