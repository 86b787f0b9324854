mod common;

use cvpress::anonymize::anonymize;

#[test]
fn identifying_fields_are_masked() {
    let record = common::sample_record();
    let masked = anonymize(&record);
    let c = &masked.candidate;

    assert_eq!(c.full_name, "J.M.D.");
    assert_eq!(c.email, "j***@example.com");
    assert_eq!(c.phone, "************5678");
    assert!(c.location.is_empty());
    assert!(c.links.is_empty());
}

#[test]
fn caller_record_is_untouched() {
    let record = common::sample_record();
    let before = record.clone();
    let _ = anonymize(&record);
    assert_eq!(record, before);
}

#[test]
fn non_identifying_content_passes_through() {
    let record = common::sample_record();
    let masked = anonymize(&record);

    assert_eq!(masked.candidate.title, record.candidate.title);
    assert_eq!(masked.summary, record.summary);
    assert_eq!(masked.skills, record.skills);
    assert_eq!(masked.experience, record.experience);
    assert_eq!(masked.education, record.education);
    assert_eq!(masked.languages, record.languages);
}

#[test]
fn deterministic() {
    let record = common::sample_record();
    assert_eq!(anonymize(&record), anonymize(&record));
}

#[test]
fn missing_contact_fields_stay_empty() {
    let mut record = common::sample_record();
    record.candidate.email.clear();
    record.candidate.phone.clear();
    let masked = anonymize(&record);
    assert!(masked.candidate.email.is_empty());
    assert!(masked.candidate.phone.is_empty());
}

#[test]
fn email_without_domain_and_short_phone() {
    let mut record = common::sample_record();
    record.candidate.email = "john".into();
    record.candidate.phone = "12".into();
    let masked = anonymize(&record);
    assert_eq!(masked.candidate.email, "***@***.***");
    assert_eq!(masked.candidate.phone, "***");
}

#[test]
fn jane_marie_doe() {
    let mut record = common::sample_record();
    record.candidate.full_name = "Jane Marie Doe".into();
    record.candidate.email = "jane.doe@example.com".into();
    record.candidate.phone = "+1 555 123 4567".into();
    let masked = anonymize(&record);

    assert_eq!(masked.candidate.full_name, "J.M.D.");
    assert_eq!(masked.candidate.email, "j***@example.com");
    assert_eq!(masked.candidate.phone, "***********4567");
}
