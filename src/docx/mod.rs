//! Word export. The record is written straight into sequential headings
//! and paragraphs; Word does its own pagination.

mod package;
mod xml;

use xml::{Justify, Para, TextRun};

use crate::error::Error;
use crate::geometry::PageGeometry;
use crate::logo::Logo;
use crate::model::{CvRecord, is_blank};

// Sizes are half-points, spacing is twentieths of a point.
const NAME_SIZE: u32 = 48;
const TITLE_SIZE: u32 = 26;
const HEADING_SIZE: u32 = 28;
const ENTRY_SIZE: u32 = 24;
const BODY_SIZE: u32 = 22;
const SMALL_SIZE: u32 = 20;

const GREY: &str = "666666";
const HEADING_GREY: &str = "333333";
const ACCENT: &str = "3B82F6";

fn heading(title: &str) -> Para {
    Para::new()
        .spacing(400, 200)
        .run(TextRun::new(title, HEADING_SIZE).bold().colour(HEADING_GREY))
}

fn joined<'a>(parts: impl IntoIterator<Item = &'a str>, sep: &str) -> String {
    parts
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

fn candidate(record: &CvRecord, body: &mut Vec<Para>) {
    let c = &record.candidate;
    if !is_blank(&c.full_name) {
        body.push(
            Para::new()
                .justify(Justify::Center)
                .spacing(0, 200)
                .run(TextRun::new(c.full_name.trim(), NAME_SIZE).bold()),
        );
    }
    if !is_blank(&c.title) {
        body.push(
            Para::new()
                .justify(Justify::Center)
                .spacing(0, 100)
                .run(TextRun::new(c.title.trim(), TITLE_SIZE).colour(GREY)),
        );
    }
    let contact = joined([c.email.as_str(), c.phone.as_str(), c.location.as_str()], " | ");
    if !contact.is_empty() {
        body.push(
            Para::new()
                .justify(Justify::Center)
                .spacing(0, 200)
                .run(TextRun::new(contact, BODY_SIZE).colour(GREY)),
        );
    }
    let links = joined(
        c.links.iter().map(|l| {
            if is_blank(&l.url) {
                l.label.as_str()
            } else {
                l.url.as_str()
            }
        }),
        " | ",
    );
    if !links.is_empty() {
        body.push(
            Para::new()
                .justify(Justify::Center)
                .spacing(0, 200)
                .run(TextRun::new(links, SMALL_SIZE).colour(ACCENT)),
        );
    }
}

fn cv_body(record: &CvRecord) -> Vec<Para> {
    let mut body = Vec::new();
    candidate(record, &mut body);

    if !is_blank(&record.summary) {
        body.push(
            Para::new()
                .justify(Justify::Center)
                .spacing(200, 400)
                .run(TextRun::new(record.summary.trim(), ENTRY_SIZE)),
        );
    }

    let skills: Vec<_> = record.skills.iter().filter(|g| !g.is_blank()).collect();
    if !skills.is_empty() {
        body.push(heading("SKILLS"));
        for group in skills {
            let mut para = Para::new().spacing(0, 100);
            if !is_blank(&group.category) {
                para = para.run(TextRun::new(format!("{}: ", group.category.trim()), BODY_SIZE).bold());
            }
            let items = joined(group.items.iter().map(String::as_str), ", ");
            body.push(para.run(TextRun::new(items, BODY_SIZE)));
        }
    }

    let experience: Vec<_> = record.experience.iter().filter(|e| !e.is_blank()).collect();
    if !experience.is_empty() {
        body.push(heading("EXPERIENCE"));
        for exp in experience {
            body.push(
                Para::new()
                    .spacing(200, 50)
                    .run(TextRun::new(exp.title.trim(), ENTRY_SIZE).bold()),
            );
            let period = exp.period();
            let meta = joined(
                [
                    exp.company.as_str(),
                    exp.employment_type.as_str(),
                    exp.location.as_str(),
                    period.as_str(),
                ],
                " | ",
            );
            if !meta.is_empty() {
                body.push(
                    Para::new()
                        .spacing(0, 100)
                        .run(TextRun::new(meta, BODY_SIZE).colour(GREY)),
                );
            }
            if !is_blank(&exp.description) {
                body.push(
                    Para::new()
                        .spacing(0, 150)
                        .run(TextRun::new(exp.description.trim(), BODY_SIZE)),
                );
            }
            for highlight in exp.highlights.iter().filter(|h| !is_blank(h)) {
                body.push(
                    Para::new()
                        .spacing(0, 50)
                        .run(TextRun::new(format!("• {}", highlight.trim()), BODY_SIZE)),
                );
            }
            let tech = joined(exp.tech.iter().map(String::as_str), ", ");
            if !tech.is_empty() {
                body.push(
                    Para::new()
                        .spacing(50, 100)
                        .run(TextRun::new("Tech: ", SMALL_SIZE).bold().colour(GREY))
                        .run(TextRun::new(tech, SMALL_SIZE).colour(GREY)),
                );
            }
        }
    }

    let projects: Vec<_> = record
        .projects
        .iter()
        .filter(|p| !is_blank(&p.name) || !is_blank(&p.description))
        .collect();
    if !projects.is_empty() {
        body.push(heading("PROJECTS"));
        for project in projects {
            body.push(
                Para::new()
                    .spacing(100, 50)
                    .run(TextRun::new(project.name.trim(), ENTRY_SIZE).bold()),
            );
            if !is_blank(&project.description) {
                body.push(
                    Para::new()
                        .spacing(0, 100)
                        .run(TextRun::new(project.description.trim(), BODY_SIZE)),
                );
            }
            let tech = joined(project.tech.iter().map(String::as_str), ", ");
            if !tech.is_empty() {
                body.push(
                    Para::new()
                        .spacing(0, 100)
                        .run(TextRun::new(tech, SMALL_SIZE).colour(GREY)),
                );
            }
        }
    }

    let education: Vec<_> = record.education.iter().filter(|e| !e.is_blank()).collect();
    if !education.is_empty() {
        body.push(heading("EDUCATION"));
        for edu in education {
            body.push(
                Para::new()
                    .spacing(100, 50)
                    .run(TextRun::new(joined([edu.degree.as_str(), edu.field.as_str()], ", "), ENTRY_SIZE).bold()),
            );
            let period = edu.period();
            let meta = joined([edu.institution.as_str(), period.as_str()], " | ");
            if !meta.is_empty() {
                body.push(
                    Para::new()
                        .spacing(0, 150)
                        .run(TextRun::new(meta, BODY_SIZE).colour(GREY)),
                );
            }
        }
    }

    let certifications: Vec<_> = record
        .certifications
        .iter()
        .filter(|c| !is_blank(&c.name))
        .collect();
    if !certifications.is_empty() {
        body.push(heading("CERTIFICATIONS"));
        for cert in certifications {
            let mut para = Para::new()
                .spacing(0, 100)
                .run(TextRun::new(cert.name.trim(), BODY_SIZE).bold());
            let meta = joined([cert.issuer.as_str(), cert.date.as_str()], " | ");
            if !meta.is_empty() {
                para = para.run(TextRun::new(format!(" | {meta}"), BODY_SIZE).colour(GREY));
            }
            body.push(para);
        }
    }

    let languages: Vec<String> = record
        .languages
        .iter()
        .filter(|l| !is_blank(&l.name))
        .map(|l| l.display())
        .collect();
    if !languages.is_empty() {
        body.push(heading("LANGUAGES"));
        body.push(Para::new().run(TextRun::new(languages.join(", "), BODY_SIZE)));
    }

    let extras: Vec<_> = record.extras.iter().filter(|e| !is_blank(&e.value)).collect();
    if !extras.is_empty() {
        body.push(heading("ADDITIONAL INFORMATION"));
        for extra in extras {
            let mut para = Para::new().spacing(0, 100);
            if !is_blank(&extra.label) {
                para = para.run(TextRun::new(format!("{}: ", extra.label.trim()), BODY_SIZE).bold());
            }
            body.push(para.run(TextRun::new(extra.value.trim(), BODY_SIZE)));
        }
    }

    body
}

/// Word document for a full CV record.
pub fn write_cv(record: &CvRecord, geometry: &PageGeometry, logo: Option<&Logo>) -> Result<Vec<u8>, Error> {
    package::write_package(&cv_body(record), geometry, logo)
}

/// Word document for a profile description: title, candidate name, a
/// separator and one centred paragraph per line.
pub fn write_profile(
    description: &str,
    candidate_name: &str,
    geometry: &PageGeometry,
    logo: Option<&Logo>,
) -> Result<Vec<u8>, Error> {
    let mut body = vec![
        Para::new()
            .justify(Justify::Center)
            .spacing(0, 400)
            .run(TextRun::new("Profile Description", 32).bold()),
        Para::new()
            .justify(Justify::Center)
            .spacing(0, 400)
            .run(TextRun::new(candidate_name.trim(), HEADING_SIZE).bold()),
        Para::new()
            .justify(Justify::Center)
            .spacing(0, 400)
            .run(TextRun::new("─".repeat(40), BODY_SIZE).colour("999999")),
    ];
    body.extend(description.lines().map(|line| {
        Para::new()
            .justify(Justify::Center)
            .spacing(0, 200)
            .run(TextRun::new(line.trim(), ENTRY_SIZE))
    }));
    package::write_package(&body, geometry, logo)
}
