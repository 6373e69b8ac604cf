//! Structural validation, repair and ASCII sanitisation of resume JSON.
//!
//! Errors make a resume invalid. ATS warnings are advisory and reported
//! separately so callers can surface them without rejecting the document.

use serde::Serialize;
use serde_json::{json, Map, Value};

pub const REQUIRED_SECTIONS: [&str; 5] =
    ["personal_info", "summary", "skills", "work_experience", "education"];
pub const SKILL_CATEGORIES: [&str; 3] = ["technical", "soft", "tools"];

const SUMMARY_MIN_CHARS: usize = 50;
const SUMMARY_MAX_CHARS: usize = 500;
const SUMMARY_MIN_WORDS: usize = 20;
const SUMMARY_MAX_WORDS: usize = 100;
const MIN_RESPONSIBILITIES: usize = 2;

pub const DEFAULT_SUMMARY: &str = "Professional with experience in various domains.";
const PLACEHOLDER_RESPONSIBILITY: &str = "Performed job duties";

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Missing, null, empty string, empty array or empty object.
fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
        Some(Value::Bool(b)) => !b,
        Some(Value::Number(_)) => false,
    }
}

fn require_fields(item: &Map<String, Value>, path: &str, fields: &[&str], errors: &mut Vec<String>) {
    for field in fields {
        if is_blank(item.get(*field)) {
            errors.push(format!("{path}.{field} is required"));
        }
    }
}

/// Each array element must be an object carrying `fields`.
fn validate_items(
    value: &Value,
    section: &str,
    fields: &[&str],
    mut extra: impl FnMut(&Map<String, Value>, &str, &mut Vec<String>),
) -> Vec<String> {
    let Some(items) = value.as_array() else {
        return vec![format!("{section} must be an array")];
    };
    let mut errors = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let path = format!("{section}[{i}]");
        match item.as_object() {
            Some(obj) => {
                require_fields(obj, &path, fields, &mut errors);
                extra(obj, &path, &mut errors);
            }
            None => errors.push(format!("{path} must be an object")),
        }
    }
    errors
}

fn validate_personal_info(value: &Value) -> Vec<String> {
    let Some(info) = value.as_object() else {
        return vec!["personal_info must be an object".to_string()];
    };
    let mut errors = Vec::new();
    if is_blank(info.get("full_name")) {
        errors.push("personal_info.full_name is required".to_string());
    }
    match info.get("email") {
        e if is_blank(e) => errors.push("personal_info.email is required".to_string()),
        Some(Value::String(email)) if email.contains('@') => {}
        _ => errors.push("personal_info.email must be a valid email address".to_string()),
    }
    errors
}

fn validate_summary(value: &Value) -> Vec<String> {
    let Some(summary) = value.as_str() else {
        return vec!["summary must be a string".to_string()];
    };
    let len = summary.chars().count();
    let mut errors = Vec::new();
    if len < SUMMARY_MIN_CHARS {
        errors.push(format!("summary must be at least {SUMMARY_MIN_CHARS} characters"));
    }
    if len > SUMMARY_MAX_CHARS {
        errors.push(format!("summary should not exceed {SUMMARY_MAX_CHARS} characters"));
    }
    errors
}

fn validate_skills(value: &Value) -> Vec<String> {
    let Some(skills) = value.as_object() else {
        return vec!["skills must be an object".to_string()];
    };
    let mut errors = Vec::new();
    let has_skills = SKILL_CATEGORIES
        .iter()
        .any(|c| skills.get(*c).and_then(Value::as_array).is_some_and(|a| !a.is_empty()));
    if !has_skills {
        errors.push(
            "skills must contain at least one category (technical, soft, or tools) with items"
                .to_string(),
        );
    }
    for category in SKILL_CATEGORIES {
        if skills.get(category).is_some_and(|v| !v.is_array()) {
            errors.push(format!("skills.{category} must be an array"));
        }
    }
    errors
}

fn validate_work_experience(value: &Value) -> Vec<String> {
    validate_items(
        value,
        "work_experience",
        &["title", "company", "duration", "responsibilities"],
        |exp, path, errors| match exp.get("responsibilities") {
            Some(Value::Array(items)) if items.len() < MIN_RESPONSIBILITIES => errors.push(format!(
                "{path}.responsibilities must have at least {MIN_RESPONSIBILITIES} items"
            )),
            Some(Value::Array(_)) | None => {}
            Some(_) => errors.push(format!("{path}.responsibilities must be an array")),
        },
    )
}

fn validate_education(value: &Value) -> Vec<String> {
    if value.as_array().is_some_and(Vec::is_empty) {
        return vec!["education must have at least one entry".to_string()];
    }
    validate_items(value, "education", &["degree", "institution", "year"], |_, _, _| {})
}

fn validate_projects(value: &Value) -> Vec<String> {
    validate_items(
        value,
        "projects",
        &["name", "description", "technologies"],
        |project, path, errors| {
            if project.get("technologies").is_some_and(|t| !t.is_array()) {
                errors.push(format!("{path}.technologies must be an array"));
            }
        },
    )
}

fn validate_certifications(value: &Value) -> Vec<String> {
    validate_items(value, "certifications", &["name", "issuer"], |_, _, _| {})
}

/// Checks a resume document. Missing top-level sections are reported alone.
pub fn validate_resume(resume: &Value) -> ValidationReport {
    let Some(doc) = resume.as_object() else {
        return ValidationReport {
            errors: vec!["Resume data must be an object".to_string()],
            warnings: Vec::new(),
        };
    };

    let missing: Vec<String> = REQUIRED_SECTIONS
        .iter()
        .filter(|s| !doc.contains_key(**s))
        .map(|s| format!("Missing required field: {s}"))
        .collect();
    if !missing.is_empty() {
        return ValidationReport {
            errors: missing,
            warnings: Vec::new(),
        };
    }

    let mut errors = Vec::new();
    errors.extend(validate_personal_info(&doc["personal_info"]));
    errors.extend(validate_summary(&doc["summary"]));
    errors.extend(validate_skills(&doc["skills"]));
    errors.extend(validate_work_experience(&doc["work_experience"]));
    errors.extend(validate_education(&doc["education"]));
    if let Some(projects) = doc.get("projects") {
        errors.extend(validate_projects(projects));
    }
    if let Some(certifications) = doc.get("certifications") {
        errors.extend(validate_certifications(certifications));
    }

    ValidationReport {
        errors,
        warnings: ats_warnings(resume),
    }
}

fn contains_non_ascii(value: &Value) -> bool {
    match value {
        Value::String(s) => !s.is_ascii(),
        Value::Array(items) => items.iter().any(contains_non_ascii),
        Value::Object(map) => map.values().any(contains_non_ascii),
        _ => false,
    }
}

pub fn ats_warnings(resume: &Value) -> Vec<String> {
    let mut warnings = Vec::new();
    if contains_non_ascii(resume) {
        warnings.push(
            "ATS Warning: Resume contains special characters or emojis that may not be ATS-friendly"
                .to_string(),
        );
    }
    let words = resume
        .get("summary")
        .and_then(Value::as_str)
        .map_or(0, |s| s.split_whitespace().count());
    if words < SUMMARY_MIN_WORDS {
        warnings.push("ATS Warning: Summary is too short (should be 20-100 words)".to_string());
    } else if words > SUMMARY_MAX_WORDS {
        warnings.push("ATS Warning: Summary is too long (should be 20-100 words)".to_string());
    }
    warnings
}

/// Drops every non-ASCII character from every string, recursively.
pub fn sanitize(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.chars().filter(char::is_ascii).collect()),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize).collect()),
        Value::Object(map) => Value::Object(map.into_iter().map(|(k, v)| (k, sanitize(v))).collect()),
        other => other,
    }
}

fn empty_skills() -> Value {
    json!({ "technical": [], "soft": [], "tools": [] })
}

/// Fills in missing sections and pads short responsibility lists so a
/// near-miss LLM response has a chance to validate.
pub fn repair(resume: Value) -> Value {
    let mut doc = match resume {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    doc.entry("personal_info").or_insert_with(|| json!({}));
    if is_blank(doc.get("summary")) {
        doc.insert("summary".to_string(), json!(DEFAULT_SUMMARY));
    }
    if !doc.get("skills").is_some_and(Value::is_object) {
        doc.insert("skills".to_string(), empty_skills());
    }
    for section in ["work_experience", "education", "projects", "certifications"] {
        doc.entry(section).or_insert_with(|| json!([]));
    }

    if let Some(Value::Array(experience)) = doc.get_mut("work_experience") {
        for exp in experience.iter_mut().filter_map(Value::as_object_mut) {
            match exp.get_mut("responsibilities") {
                Some(Value::Array(items)) => {
                    while items.len() < MIN_RESPONSIBILITIES {
                        items.push(json!(PLACEHOLDER_RESPONSIBILITY));
                    }
                }
                _ => {
                    exp.insert("responsibilities".to_string(), json!([]));
                }
            }
        }
    }

    Value::Object(doc)
}

/// Top-level merge used when a user edits a stored resume.
pub fn merge_content(base: &Value, patch: &Value) -> Value {
    let mut merged = base.as_object().cloned().unwrap_or_default();
    if let Some(patch) = patch.as_object() {
        for (key, value) in patch {
            merged.insert(key.clone(), value.clone());
        }
    }
    Value::Object(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_resume() -> Value {
        json!({
            "personal_info": { "full_name": "Ada Lovelace", "email": "ada@example.com" },
            "summary": "Backend engineer with eight years of experience building reliable \
                        distributed systems in Rust and Go, leading small teams and shipping \
                        payment infrastructure used by millions of customers every day.",
            "skills": { "technical": ["Rust", "Go"], "soft": [], "tools": ["Git"] },
            "work_experience": [{
                "title": "Senior Engineer",
                "company": "Acme",
                "duration": "2019 - Present",
                "responsibilities": ["Built the ledger", "Led on-call rotation"]
            }],
            "education": [{ "degree": "BSc Mathematics", "institution": "UCL", "year": "2015" }]
        })
    }

    #[test]
    fn test_valid_resume_passes_cleanly() {
        let report = validate_resume(&valid_resume());
        assert!(report.is_valid(), "{:?}", report.errors);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    }

    #[test]
    fn test_missing_sections_are_reported_alone() {
        let report = validate_resume(&json!({ "summary": "short" }));
        assert_eq!(report.errors.len(), 4);
        assert!(report.errors.iter().all(|e| e.starts_with("Missing required field")));
    }

    #[test]
    fn test_field_level_errors() {
        let mut resume = valid_resume();
        resume["personal_info"]["email"] = json!("not-an-email");
        resume["summary"] = json!("Too short.");
        resume["skills"] = json!({ "technical": "Rust" });
        resume["work_experience"][0]["responsibilities"] = json!(["Only one"]);
        resume["education"] = json!([]);
        resume["projects"] = json!([{ "name": "X", "description": "Y", "technologies": "Rust" }]);

        let errors = validate_resume(&resume).errors;
        for expected in [
            "personal_info.email must be a valid email address",
            "summary must be at least 50 characters",
            "skills must contain at least one category (technical, soft, or tools) with items",
            "skills.technical must be an array",
            "work_experience[0].responsibilities must have at least 2 items",
            "education must have at least one entry",
            "projects[0].technologies must be an array",
        ] {
            assert!(errors.iter().any(|e| e == expected), "missing {expected:?} in {errors:?}");
        }
    }

    #[test]
    fn test_warnings_do_not_invalidate() {
        let mut resume = valid_resume();
        resume["personal_info"]["full_name"] = json!("Zoë Ångström");
        let report = validate_resume(&resume);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_sanitize_strips_non_ascii_everywhere() {
        let dirty = json!({ "a": "caf\u{e9} \u{1F680}", "b": ["\u{2022} item"], "c": 3 });
        assert_eq!(sanitize(dirty), json!({ "a": "caf ", "b": [" item"], "c": 3 }));
    }

    #[test]
    fn test_repair_fills_gaps() {
        let repaired = repair(json!({
            "skills": ["Rust"],
            "work_experience": [{ "title": "Dev", "responsibilities": ["One"] }, { "title": "Ops" }]
        }));
        assert_eq!(repaired["summary"], json!(DEFAULT_SUMMARY));
        assert_eq!(repaired["skills"], empty_skills());
        assert_eq!(repaired["education"], json!([]));
        assert_eq!(
            repaired["work_experience"][0]["responsibilities"],
            json!(["One", "Performed job duties"])
        );
        assert_eq!(repaired["work_experience"][1]["responsibilities"], json!([]));
    }

    #[test]
    fn test_merge_content_replaces_top_level_keys() {
        let merged = merge_content(&valid_resume(), &json!({ "summary": "New" }));
        assert_eq!(merged["summary"], "New");
        assert_eq!(merged["personal_info"]["full_name"], "Ada Lovelace");
    }
}
