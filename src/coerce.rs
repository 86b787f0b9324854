//! Lenient import of CV JSON produced by extraction tools and language
//! models. Every field is coerced on its own: a malformed value becomes an
//! empty one instead of failing the whole record.

use serde_json::{Map, Value};

use crate::error::Error;
use crate::model::{
    CandidateProfile, CertificationEntry, CvRecord, EducationEntry, ExperienceEntry, ExtraField,
    LanguageEntry, Link, ProjectEntry, SkillGroup,
};

/// Removes a surrounding Markdown code fence (```` ``` ```` or ```` ```json ````).
pub fn strip_code_fences(text: &str) -> &str {
    let mut s = text.trim();
    if let Some(rest) = s.strip_prefix("```") {
        // drop the info string ("json", "JSON", ...) up to the first newline
        s = match rest.find('\n') {
            Some(nl) if rest[..nl].chars().all(|c| c.is_ascii_alphanumeric()) => &rest[nl + 1..],
            _ => rest.strip_prefix("json").unwrap_or(rest),
        };
    }
    if let Some(rest) = s.trim_end().strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

/// Parses untrusted JSON into a record. Only text that is not JSON at all,
/// or JSON that is not an object, is an error.
pub fn record_from_untrusted_json(text: &str) -> Result<CvRecord, Error> {
    let value: Value = serde_json::from_str(strip_code_fences(text))?;
    // some extractors wrap the record: {"cvData": {...}}
    let root = match value.get("cvData") {
        Some(inner) if inner.is_object() => inner,
        _ => &value,
    };
    let root = root
        .as_object()
        .ok_or_else(|| Error::UnsupportedFormat("CV JSON must be an object".into()))?;
    Ok(record_from_map(root))
}

fn record_from_map(root: &Map<String, Value>) -> CvRecord {
    let candidate = match root.get("candidate").and_then(Value::as_object) {
        Some(obj) => candidate(obj),
        // flat records put the contact fields at the top level
        None => candidate(root),
    };
    CvRecord {
        candidate,
        summary: text(field(root, &["summary", "profile", "about"])),
        skills: skills(root.get("skills")),
        experience: objects(field(root, &["experience", "workExperience", "work_experience"]))
            .map(experience)
            .collect(),
        education: objects(root.get("education")).map(education).collect(),
        certifications: entries(root.get("certifications"), |obj| CertificationEntry {
            name: text(field(obj, &["name", "title"])),
            issuer: text(field(obj, &["issuer", "authority", "organization"])),
            date: text(field(obj, &["date", "year"])),
        }, |name| CertificationEntry {
            name,
            ..Default::default()
        }),
        projects: entries(root.get("projects"), |obj| ProjectEntry {
            name: text(field(obj, &["name", "title"])),
            description: text(obj.get("description")),
            tech: list(field(obj, &["tech", "technologies", "stack"])),
        }, |name| ProjectEntry {
            name,
            ..Default::default()
        }),
        languages: entries(root.get("languages"), |obj| LanguageEntry {
            name: text(field(obj, &["name", "language"])),
            level: text(field(obj, &["level", "proficiency"])),
        }, |name| LanguageEntry {
            name,
            ..Default::default()
        }),
        extras: extras(root.get("extras")),
    }
}

/// First present, non-null value among `keys`.
fn field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

/// Strings as-is, numbers and booleans printed, string arrays joined.
fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| text(Some(v)))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        _ => String::new(),
    }
}

/// Arrays element-wise, a single string split on commas, semicolons and
/// newlines.
fn list(value: Option<&Value>) -> Vec<String> {
    let items: Vec<String> = match value {
        Some(Value::Array(items)) => items.iter().map(|v| text(Some(v))).collect(),
        Some(Value::String(s)) => s.split([',', ';', '\n']).map(|p| p.trim().to_string()).collect(),
        Some(v @ Value::Number(_)) => vec![text(Some(v))],
        _ => Vec::new(),
    };
    items.into_iter().filter(|s| !s.is_empty()).collect()
}

fn objects(value: Option<&Value>) -> impl Iterator<Item = &Map<String, Value>> {
    let items: Vec<&Map<String, Value>> = match value {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_object).collect(),
        Some(Value::Object(obj)) => vec![obj],
        _ => Vec::new(),
    };
    items.into_iter()
}

/// A list whose elements may be objects or bare strings.
fn entries<T>(
    value: Option<&Value>,
    from_object: impl Fn(&Map<String, Value>) -> T,
    from_text: impl Fn(String) -> T,
) -> Vec<T> {
    let items: Vec<&Value> = match value {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(v @ Value::Object(_)) => vec![v],
        Some(Value::String(_)) => return list(value).into_iter().map(from_text).collect(),
        _ => Vec::new(),
    };
    items
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(obj) => Some(from_object(obj)),
            Value::String(_) | Value::Number(_) => {
                let s = text(Some(v));
                (!s.is_empty()).then(|| from_text(s))
            }
            _ => None,
        })
        .collect()
}

fn candidate(obj: &Map<String, Value>) -> CandidateProfile {
    let links = match obj.get("links") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| match v {
                Value::Object(link) => Some(Link {
                    label: text(field(link, &["label", "name"])),
                    url: text(field(link, &["url", "href"])),
                }),
                Value::String(url) if !url.trim().is_empty() => Some(Link {
                    label: String::new(),
                    url: url.trim().to_string(),
                }),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    CandidateProfile {
        full_name: text(field(obj, &["fullName", "full_name", "name"])),
        title: text(field(obj, &["title", "headline", "role"])),
        location: text(obj.get("location")),
        email: text(obj.get("email")),
        phone: text(field(obj, &["phone", "telephone", "mobile"])),
        links,
    }
}

fn skills(value: Option<&Value>) -> Vec<SkillGroup> {
    match value {
        Some(Value::Array(items)) => {
            let mut groups = Vec::new();
            let mut loose = Vec::new();
            for item in items {
                match item {
                    Value::Object(obj) => groups.push(SkillGroup {
                        category: text(field(obj, &["category", "name"])),
                        items: list(field(obj, &["items", "skills"])),
                    }),
                    other => loose.extend(list(Some(other))),
                }
            }
            if !loose.is_empty() {
                groups.push(SkillGroup {
                    category: "Technical Skills".to_string(),
                    items: loose,
                });
            }
            groups
        }
        // {"Languages": ["Rust", "Go"], "Cloud": "AWS, GCP"}
        Some(Value::Object(map)) => map
            .iter()
            .map(|(category, items)| SkillGroup {
                category: category.trim().to_string(),
                items: list(Some(items)),
            })
            .collect(),
        Some(v @ Value::String(_)) => vec![SkillGroup {
            category: "Technical Skills".to_string(),
            items: list(Some(v)),
        }],
        _ => Vec::new(),
    }
}

fn experience(obj: &Map<String, Value>) -> ExperienceEntry {
    ExperienceEntry {
        title: text(field(obj, &["title", "role", "position"])),
        company: text(field(obj, &["company", "employer", "organization"])),
        employment_type: text(field(obj, &["employmentType", "employment_type", "type"])),
        location: text(obj.get("location")),
        start_date: text(field(obj, &["startDate", "start_date", "start"])),
        end_date: text(field(obj, &["endDate", "end_date", "end"])),
        description: text(field(obj, &["description", "summary"])),
        highlights: list(field(obj, &["highlights", "achievements", "responsibilities"])),
        tech: list(field(obj, &["tech", "technologies", "stack"])),
    }
}

fn education(obj: &Map<String, Value>) -> EducationEntry {
    EducationEntry {
        degree: text(field(obj, &["degree", "qualification"])),
        field: text(field(obj, &["field", "fieldOfStudy", "major"])),
        institution: text(field(obj, &["institution", "school", "university"])),
        year: text(obj.get("year")),
        start_date: text(field(obj, &["startDate", "start_date"])),
        end_date: text(field(obj, &["endDate", "end_date"])),
    }
}

fn extras(value: Option<&Value>) -> Vec<ExtraField> {
    match value {
        Some(Value::Object(map)) => map
            .iter()
            .map(|(label, value)| ExtraField {
                label: label.trim().to_string(),
                value: text(Some(value)),
            })
            .filter(|e| !e.value.is_empty())
            .collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_object)
            .map(|obj| ExtraField {
                label: text(field(obj, &["label", "key", "name"])),
                value: text(obj.get("value")),
            })
            .filter(|e| !e.value.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn text_coerces_scalars() {
        assert_eq!(text(Some(&Value::from(2019))), "2019");
        assert_eq!(text(Some(&serde_json::json!(["a", "", "b"]))), "a, b");
        assert_eq!(text(None), "");
        assert_eq!(text(Some(&serde_json::json!({"x": 1}))), "");
    }

    #[test]
    fn list_splits_strings() {
        assert_eq!(list(Some(&Value::from("Rust, Go;SQL"))), ["Rust", "Go", "SQL"]);
    }
}
