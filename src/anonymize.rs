//! One-way masking of the fields that identify a candidate. Everything else
//! in the record passes through untouched.

use crate::model::CvRecord;

/// `John Michael Doe` -> `J.M.D.`
pub fn initials(full_name: &str) -> String {
    full_name
        .split_whitespace()
        .filter_map(|token| token.chars().next())
        .flat_map(|first| first.to_uppercase().chain(std::iter::once('.')))
        .collect()
}

/// `john@example.com` -> `j***@example.com`; `***@***.***` without a domain.
pub fn mask_email(email: &str) -> String {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !domain.is_empty() => {
            let first: String = local.chars().take(1).collect();
            format!("{first}***@{domain}")
        }
        _ => "***@***.***".to_string(),
    }
}

/// Every character but the last four becomes `*`; `***` when shorter.
pub fn mask_phone(phone: &str) -> String {
    let phone = phone.trim();
    let chars: Vec<char> = phone.chars().collect();
    if chars.len() < 4 {
        return "***".to_string();
    }
    let keep = chars.len() - 4;
    std::iter::repeat_n('*', keep)
        .chain(chars[keep..].iter().copied())
        .collect()
}

/// Returns a masked copy; the input is never modified. Empty fields stay
/// empty so no placeholder text appears in the output.
pub fn anonymize(record: &CvRecord) -> CvRecord {
    let mut out = record.clone();
    let candidate = &mut out.candidate;
    candidate.full_name = initials(&candidate.full_name);
    if !candidate.email.trim().is_empty() {
        candidate.email = mask_email(&candidate.email);
    }
    if !candidate.phone.trim().is_empty() {
        candidate.phone = mask_phone(&candidate.phone);
    }
    candidate.location.clear();
    candidate.links.clear();
    out
}
