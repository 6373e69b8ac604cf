//! Text extraction and field parsing for uploaded PDF CVs.

use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::models::user::{EducationItem, ExperienceItem};

pub const MAX_BIO_CHARS: usize = 500;

#[derive(Debug, Error)]
pub enum CvParseError {
    #[error("Error extracting PDF text: {0}")]
    Extract(String),

    #[error("PDF contains no extractable text")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Contact,
    Summary,
    Experience,
    Education,
    Skills,
    Certifications,
    Projects,
    Achievements,
}

impl Section {
    const ALL: [Section; 8] = [
        Section::Contact,
        Section::Summary,
        Section::Experience,
        Section::Education,
        Section::Skills,
        Section::Certifications,
        Section::Projects,
        Section::Achievements,
    ];

    fn pattern(self) -> &'static str {
        match self {
            Section::Contact => r"(email|phone|mobile|address|linkedin|github)",
            Section::Summary => r"(summary|profile|objective|about)",
            Section::Experience => {
                r"(experience|employment|work history|professional experience)"
            }
            Section::Education => r"(education|academic|qualification)",
            Section::Skills => r"(skills|technical skills|competencies|expertise)",
            Section::Certifications => r"(certifications?|certificates?|licenses?)",
            Section::Projects => r"(projects?|portfolio)",
            Section::Achievements => r"(achievements?|accomplishments?|awards?)",
        }
    }
}

static SECTION_HEADERS: Lazy<Vec<(Section, Regex)>> = Lazy::new(|| {
    Section::ALL
        .into_iter()
        .map(|s| {
            let re = Regex::new(&format!(r"(?i)\b{}\b", s.pattern())).expect("valid regex");
            (s, re)
        })
        .collect()
});

static ANY_SECTION_HEADER: Lazy<Regex> = Lazy::new(|| {
    let alternatives: Vec<&str> = Section::ALL.iter().map(|s| s.pattern()).collect();
    Regex::new(&format!(r"(?i)\b({})\b", alternatives.join("|"))).expect("valid regex")
});

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid regex")
});

static PHONE_PATTERNS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"\+?[\d\s\-()]{10,}").expect("valid regex"),
        Regex::new(r"\(?\d{3}\)?[\s\-]?\d{3}[\s\-]?\d{4}").expect("valid regex"),
        Regex::new(r"\d{3}[\s\-]\d{3}[\s\-]\d{4}").expect("valid regex"),
    ]
});

static NOT_A_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@|http|www|\d{3}[\-\s]\d{3}").expect("valid regex"));

static LINKEDIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)linkedin\.com/in/[\w\-]+").expect("valid regex"));

static GITHUB: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)github\.com/[\w\-]+").expect("valid regex"));

static DATE_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d{4}|\w+\s\d{4})\s*[-–]\s*(\d{4}|\w+\s\d{4}|present|current)")
        .expect("valid regex")
});

/// Recognised skills as (lowercase term, display name).
const SKILL_TERMS: &[(&str, &str)] = &[
    ("python", "Python"),
    ("java", "Java"),
    ("javascript", "JavaScript"),
    ("typescript", "TypeScript"),
    ("c++", "C++"),
    ("c#", "C#"),
    ("ruby", "Ruby"),
    ("php", "PHP"),
    ("swift", "Swift"),
    ("kotlin", "Kotlin"),
    ("react", "React"),
    ("angular", "Angular"),
    ("vue", "Vue"),
    ("node", "Node"),
    ("django", "Django"),
    ("flask", "Flask"),
    ("spring", "Spring"),
    ("express", "Express"),
    ("sql", "SQL"),
    ("mysql", "MySQL"),
    ("postgresql", "PostgreSQL"),
    ("mongodb", "MongoDB"),
    ("redis", "Redis"),
    ("elasticsearch", "Elasticsearch"),
    ("aws", "AWS"),
    ("azure", "Azure"),
    ("gcp", "GCP"),
    ("docker", "Docker"),
    ("kubernetes", "Kubernetes"),
    ("jenkins", "Jenkins"),
    ("git", "Git"),
    ("machine learning", "Machine Learning"),
    ("deep learning", "Deep Learning"),
    ("ai", "AI"),
    ("data science", "Data Science"),
    ("nlp", "NLP"),
    ("agile", "Agile"),
    ("scrum", "Scrum"),
    ("devops", "DevOps"),
    ("ci/cd", "CI/CD"),
    ("tdd", "TDD"),
    ("rest", "REST"),
    ("graphql", "GraphQL"),
    ("api", "API"),
];

// Word boundaries are spelled out so terms ending in `+` or `#` still match.
static SKILL_MATCHERS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    SKILL_TERMS
        .iter()
        .map(|(term, display)| {
            let re = Regex::new(&format!(
                r"(?:^|[^\w+#]){}(?:$|[^\w+#])",
                regex::escape(term)
            ))
            .expect("valid regex");
            (re, *display)
        })
        .collect()
});

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CvSections {
    pub experience: String,
    pub education: String,
    pub certifications: String,
    pub projects: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsedCv {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub linkedin_url: String,
    pub github_url: String,
    pub skills: Vec<String>,
    pub bio: String,
    pub raw_text: String,
    pub sections: CvSections,
}

pub fn extract_text(pdf: &[u8]) -> Result<String, CvParseError> {
    let text =
        pdf_extract::extract_text_from_mem(pdf).map_err(|e| CvParseError::Extract(e.to_string()))?;
    if text.trim().is_empty() {
        return Err(CvParseError::Empty);
    }
    Ok(text)
}

/// Extracts and parses a PDF off the async runtime.
pub async fn parse_pdf(pdf: Bytes) -> Result<ParsedCv, CvParseError> {
    let text = tokio::task::spawn_blocking(move || extract_text(&pdf))
        .await
        .map_err(|e| CvParseError::Extract(e.to_string()))??;
    Ok(parse_text(&text))
}

pub fn parse_text(text: &str) -> ParsedCv {
    let name = extract_name(text);
    let mut names = name.split_whitespace();
    let first_name = names.next().unwrap_or_default().to_string();
    let last_name = names.collect::<Vec<_>>().join(" ");

    ParsedCv {
        first_name,
        last_name,
        email: extract_email(text).unwrap_or_default(),
        phone: extract_phone(text).unwrap_or_default(),
        linkedin_url: LINKEDIN
            .find(text)
            .map(|m| format!("https://{}", m.as_str()))
            .unwrap_or_default(),
        github_url: GITHUB
            .find(text)
            .map(|m| format!("https://{}", m.as_str()))
            .unwrap_or_default(),
        skills: extract_skills(text),
        bio: extract_section(text, Section::Summary)
            .chars()
            .take(MAX_BIO_CHARS)
            .collect(),
        raw_text: text.to_string(),
        sections: CvSections {
            experience: extract_section(text, Section::Experience),
            education: extract_section(text, Section::Education),
            certifications: extract_section(text, Section::Certifications),
            projects: extract_section(text, Section::Projects),
        },
    }
}

pub fn extract_email(text: &str) -> Option<String> {
    EMAIL.find(text).map(|m| m.as_str().to_string())
}

pub fn extract_phone(text: &str) -> Option<String> {
    PHONE_PATTERNS
        .iter()
        .flat_map(|re| re.find_iter(text))
        .map(|m| m.as_str().trim())
        .find(|candidate| {
            candidate
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '+')
                .count()
                >= 10
        })
        .map(str::to_string)
}

/// The name is taken from the first three lines: a short title-cased line
/// with no contact details in it.
pub fn extract_name(text: &str) -> String {
    text.trim()
        .lines()
        .take(3)
        .map(str::trim)
        .find(|line| {
            if line.is_empty() || line.chars().count() >= 50 || NOT_A_NAME.is_match(line) {
                return false;
            }
            let words: Vec<&str> = line.split_whitespace().collect();
            (1..=4).contains(&words.len())
                && words
                    .iter()
                    .all(|w| w.chars().next().is_some_and(char::is_uppercase))
        })
        .unwrap_or_default()
        .to_string()
}

pub fn extract_skills(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    SKILL_MATCHERS
        .iter()
        .filter(|(re, _)| re.is_match(&lower))
        .map(|(_, display)| display.to_string())
        .collect()
}

/// Text between the first header of `section` and the next header of any kind.
fn extract_section(text: &str, section: Section) -> String {
    let Some((_, header)) = SECTION_HEADERS.iter().find(|(s, _)| *s == section) else {
        return String::new();
    };
    let Some(start) = header.find(text) else {
        return String::new();
    };
    let remaining = &text[start.end()..];
    let end = ANY_SECTION_HEADER
        .find(remaining)
        .map(|m| m.start())
        .unwrap_or(remaining.len());
    remaining[..end].trim().to_string()
}

/// Splits an experience section into entries on blank lines. A line with a
/// date range is the period; the first two other lines are title and company.
pub fn experience_entries(section: &str) -> Vec<ExperienceItem> {
    paragraphs(section)
        .into_iter()
        .map(|lines| {
            let mut item = ExperienceItem::default();
            let mut description: Vec<&str> = Vec::new();
            for line in lines {
                if DATE_RANGE.is_match(line) {
                    item.duration = line.to_string();
                } else if item.title.is_empty() {
                    item.title = line.to_string();
                } else if item.company.is_empty() {
                    item.company = line.to_string();
                } else {
                    description.push(line);
                }
            }
            item.description = description.join(" ");
            item
        })
        .collect()
}

pub fn education_entries(section: &str) -> Vec<EducationItem> {
    paragraphs(section)
        .into_iter()
        .map(|lines| {
            let mut item = EducationItem::default();
            let mut details: Vec<&str> = Vec::new();
            for line in lines {
                if item.degree.is_empty() {
                    item.degree = line.to_string();
                } else if item.institution.is_empty() {
                    item.institution = line.to_string();
                } else {
                    details.push(line);
                }
            }
            item.field = details.join(" ");
            item
        })
        .collect()
}

fn paragraphs(text: &str) -> Vec<Vec<&str>> {
    let mut groups: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            if !current.is_empty() {
                groups.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CV: &str = "Jane Marie Doe
jane.doe@example.com | +1 (555) 123-4567
linkedin.com/in/jane-doe | github.com/janedoe

Summary
Backend engineer focused on reliable services.

Experience
Senior Engineer
Acme Corp
Jan 2020 - Present
Built payment APIs in Python and Go.

Engineer
Initech
2017 - 2019

Education
BSc Computer Science
State University

Certifications
AWS Certified Developer
";

    #[test]
    fn test_parse_contact_fields() {
        let cv = parse_text(SAMPLE_CV);
        assert_eq!(cv.first_name, "Jane");
        assert_eq!(cv.last_name, "Marie Doe");
        assert_eq!(cv.email, "jane.doe@example.com");
        assert_eq!(cv.phone, "+1 (555) 123-4567");
        assert_eq!(cv.linkedin_url, "https://linkedin.com/in/jane-doe");
        assert_eq!(cv.github_url, "https://github.com/janedoe");
    }

    #[test]
    fn test_summary_becomes_bio() {
        let cv = parse_text(SAMPLE_CV);
        assert_eq!(cv.bio, "Backend engineer focused on reliable services.");
    }

    #[test]
    fn test_sections_stop_at_next_header() {
        let cv = parse_text(SAMPLE_CV);
        assert!(cv.sections.experience.starts_with("Senior Engineer"));
        assert!(!cv.sections.experience.contains("State University"));
        assert_eq!(
            cv.sections.education,
            "BSc Computer Science\nState University"
        );
        assert_eq!(cv.sections.certifications, "AWS Certified Developer");
        assert!(cv.sections.projects.is_empty());
    }

    #[test]
    fn test_skill_detection_uses_display_names() {
        let skills = extract_skills("Shipped C++ and c# services on AWS with CI/CD; some Python.");
        assert_eq!(skills, vec!["Python", "C++", "C#", "AWS", "CI/CD"]);
        assert!(extract_skills("javascript").iter().all(|s| s != "Java"));
    }

    #[test]
    fn test_name_rejects_contact_lines() {
        assert_eq!(extract_name("jane@example.com\nJane Doe"), "Jane Doe");
        assert_eq!(extract_name("lowercase name\n555-123-4567"), "");
    }

    #[test]
    fn test_phone_requires_ten_digits() {
        assert_eq!(extract_phone("call 555-1234"), None);
        assert_eq!(
            extract_phone("phone: 555 123 4567").as_deref(),
            Some("555 123 4567")
        );
    }

    #[test]
    fn test_experience_entries_split_on_blank_lines() {
        let cv = parse_text(SAMPLE_CV);
        let entries = experience_entries(&cv.sections.experience);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Senior Engineer");
        assert_eq!(entries[0].company, "Acme Corp");
        assert_eq!(entries[0].duration, "Jan 2020 - Present");
        assert_eq!(entries[0].description, "Built payment APIs in Python and Go.");
        assert_eq!(entries[1].duration, "2017 - 2019");
    }

    #[test]
    fn test_education_entries() {
        let entries = education_entries("BSc Computer Science\nState University\nHonours");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].degree, "BSc Computer Science");
        assert_eq!(entries[0].institution, "State University");
        assert_eq!(entries[0].field, "Honours");
    }
}
