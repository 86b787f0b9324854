use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Link {
    pub label: String,
    pub url: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CandidateProfile {
    pub full_name: String,
    pub title: String,
    pub location: String,
    pub email: String,
    pub phone: String,
    pub links: Vec<Link>,
}

impl CandidateProfile {
    /// True when no field would produce visible output.
    pub fn is_blank(&self) -> bool {
        is_blank(&self.full_name)
            && is_blank(&self.title)
            && is_blank(&self.location)
            && is_blank(&self.email)
            && is_blank(&self.phone)
            && self
                .links
                .iter()
                .all(|l| is_blank(&l.label) && is_blank(&l.url))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExperienceEntry {
    #[serde(alias = "role")]
    pub title: String,
    pub company: String,
    pub employment_type: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
    pub highlights: Vec<String>,
    pub tech: Vec<String>,
}

impl ExperienceEntry {
    /// Display period, e.g. `Jan 2020 – Present`. Empty if neither date is set.
    pub fn period(&self) -> String {
        date_range(&self.start_date, &self.end_date)
    }

    pub fn is_blank(&self) -> bool {
        is_blank(&self.title)
            && is_blank(&self.company)
            && is_blank(&self.description)
            && self.highlights.iter().all(|h| is_blank(h))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EducationEntry {
    pub degree: String,
    pub field: String,
    pub institution: String,
    pub year: String,
    pub start_date: String,
    pub end_date: String,
}

impl EducationEntry {
    /// `year` wins over the start/end pair when both are present.
    pub fn period(&self) -> String {
        if !is_blank(&self.year) {
            return self.year.trim().to_string();
        }
        date_range(&self.start_date, &self.end_date)
    }

    pub fn is_blank(&self) -> bool {
        is_blank(&self.degree) && is_blank(&self.institution) && is_blank(&self.field)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SkillGroup {
    pub category: String,
    pub items: Vec<String>,
}

impl SkillGroup {
    pub fn is_blank(&self) -> bool {
        self.items.iter().all(|i| is_blank(i))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CertificationEntry {
    pub name: String,
    pub issuer: String,
    pub date: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectEntry {
    pub name: String,
    pub description: String,
    pub tech: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LanguageEntry {
    pub name: String,
    pub level: String,
}

impl LanguageEntry {
    /// `English (Fluent)`, or just the name when no level is given.
    pub fn display(&self) -> String {
        if is_blank(&self.level) {
            self.name.trim().to_string()
        } else {
            format!("{} ({})", self.name.trim(), self.level.trim())
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtraField {
    pub label: String,
    pub value: String,
}

/// The single unit passed between all components. Every sequence keeps its
/// insertion order through segmentation, layout and every export format.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CvRecord {
    pub candidate: CandidateProfile,
    pub summary: String,
    pub skills: Vec<SkillGroup>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub certifications: Vec<CertificationEntry>,
    pub projects: Vec<ProjectEntry>,
    pub languages: Vec<LanguageEntry>,
    pub extras: Vec<ExtraField>,
}

impl CvRecord {
    /// Strict re-import of a record previously written by `export_json`.
    pub fn from_json(bytes: &[u8]) -> Result<CvRecord, Error> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn to_json(&self) -> Result<Vec<u8>, Error> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

pub(crate) fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// `present` in any case becomes `Present`, `YYYY-MM` becomes `Mon YYYY`,
/// anything else is returned trimmed but otherwise untouched.
pub fn format_date(date: &str) -> String {
    let date = date.trim();
    if date.eq_ignore_ascii_case("present") {
        return "Present".to_string();
    }
    if let Some((year, month)) = date.split_once('-')
        && year.len() == 4
        && year.chars().all(|c| c.is_ascii_digit())
        && let Ok(m) = month.parse::<usize>()
        && (1..=12).contains(&m)
    {
        return format!("{} {}", MONTHS[m - 1], year);
    }
    date.to_string()
}

fn date_range(start: &str, end: &str) -> String {
    match (is_blank(start), is_blank(end)) {
        (true, true) => String::new(),
        (false, true) => format_date(start),
        (true, false) => format_date(end),
        (false, false) => format!("{} – {}", format_date(start), format_date(end)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_year_month_dates() {
        assert_eq!(format_date("2021-03"), "Mar 2021");
        assert_eq!(format_date("PRESENT"), "Present");
        assert_eq!(format_date("Spring 2019"), "Spring 2019");
        assert_eq!(format_date("2021-13"), "2021-13");
    }

    #[test]
    fn education_prefers_year() {
        let edu = EducationEntry {
            year: "2015".into(),
            start_date: "2011".into(),
            end_date: "2015".into(),
            ..Default::default()
        };
        assert_eq!(edu.period(), "2015");
    }

    #[test]
    fn experience_period_normalises_present() {
        let exp = ExperienceEntry {
            start_date: "2020-01".into(),
            end_date: "present".into(),
            ..Default::default()
        };
        assert_eq!(exp.period(), "Jan 2020 – Present");
    }

    #[test]
    fn role_is_accepted_as_title() {
        let exp: ExperienceEntry =
            serde_json::from_str(r#"{"role": "Engineer", "company": "Acme"}"#).unwrap();
        assert_eq!(exp.title, "Engineer");
    }
}
