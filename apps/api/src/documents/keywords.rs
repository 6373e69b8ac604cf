//! Keyword extraction from job descriptions and matching against a profile.
//!
//! Pure functions, no I/O. Set-valued outputs are returned sorted.

use std::collections::{BTreeSet, HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const MAX_KEYWORDS: usize = 50;
pub const MAX_TECHNICAL_TERMS: usize = 20;

const SOFT_SKILLS: &[&str] = &[
    "leadership",
    "communication",
    "teamwork",
    "problem-solving",
    "analytical",
    "collaborative",
    "detail-oriented",
    "organized",
    "time management",
    "adaptable",
    "creative",
    "innovative",
];

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
        "from", "as", "is", "was", "are", "were", "been", "be", "have", "has", "had", "do",
        "does", "did", "will", "would", "should", "could", "may", "might", "must", "can",
        "this", "that", "these", "those", "our", "your", "their", "we", "you", "they", "it",
        "he", "she", "who", "what", "where", "when", "why", "how", "all", "each", "every",
        "both", "few", "more", "most", "other", "some", "such", "no", "not", "only", "own",
        "same", "so", "than", "too", "very", "just", "about", "into", "through", "during",
        "before", "after", "above", "below", "between", "under", "again", "further", "then",
        "once",
    ]
    .into_iter()
    .collect()
});

static DISALLOWED_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s\-+#.]").expect("valid regex"));

static BULLET_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[•\-*]\s*([^\n]+)").expect("valid regex"));

static SKILL_NOISE: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)experience (with|in)\s*",
        r"(?i)knowledge of\s*",
        r"(?i)proficiency in\s*",
        r"(?i)\d+\+?\s*years?",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

static SKILL_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,;]|\sand\s").expect("valid regex"));

static TECH_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\b(python|java|javascript|typescript|c\+\+|c#|ruby|go|rust|swift|kotlin|php)\b",
        r"(?i)\b(react|angular|vue|django|flask|spring|node\.?js|express|fastapi)\b",
        r"(?i)\b(sql|nosql|postgresql|mysql|mongodb|redis|elasticsearch|dynamodb)\b",
        r"(?i)\b(aws|azure|gcp|docker|kubernetes|jenkins|gitlab|github)\b",
        r"(?i)\b(rest|api|graphql|microservices|agile|scrum|devops|ci/cd)\b",
        r"(?i)\b(git|svn|jira|confluence|slack|teams)\b",
        r"(?i)\b(html|css|sass|less|webpack|babel|npm|yarn)\b",
        r"(?i)\b(tensorflow|pytorch|scikit-learn|pandas|numpy|jupyter)\b",
        r"(?i)\b(linux|unix|windows|macos|bash|shell|powershell)\b",
        // "python 3.11" style version mentions
        r"(?i)([a-z]+)\s+\d+[.\d]*",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// A section header and the words that end its section.
struct SectionRule {
    header: Lazy<Regex>,
    terminators: &'static [&'static str],
}

static REQUIRED_SECTIONS: [SectionRule; 4] = [
    SectionRule {
        header: Lazy::new(|| Regex::new(r"required skills?:?\s*").expect("valid regex")),
        terminators: &["preferred", "desired", "nice", "responsibilities", "qualifications"],
    },
    SectionRule {
        header: Lazy::new(|| Regex::new(r"must have:?\s*").expect("valid regex")),
        terminators: &["preferred", "desired", "nice", "responsibilities"],
    },
    SectionRule {
        header: Lazy::new(|| Regex::new(r"requirements?:?\s*").expect("valid regex")),
        terminators: &["preferred", "desired", "nice", "responsibilities"],
    },
    SectionRule {
        header: Lazy::new(|| Regex::new(r"required:?\s*").expect("valid regex")),
        terminators: &["preferred", "desired", "nice", "responsibilities"],
    },
];

static PREFERRED_SECTIONS: [SectionRule; 4] = [
    SectionRule {
        header: Lazy::new(|| Regex::new(r"preferred:?\s*").expect("valid regex")),
        terminators: &["responsibilities", "qualifications"],
    },
    SectionRule {
        header: Lazy::new(|| Regex::new(r"nice to have:?\s*").expect("valid regex")),
        terminators: &["responsibilities"],
    },
    SectionRule {
        header: Lazy::new(|| Regex::new(r"desired:?\s*").expect("valid regex")),
        terminators: &["responsibilities"],
    },
    SectionRule {
        header: Lazy::new(|| Regex::new(r"bonus:?\s*").expect("valid regex")),
        terminators: &["responsibilities"],
    },
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobKeywords {
    pub required_skills: Vec<String>,
    pub preferred_skills: Vec<String>,
    pub technical_terms: Vec<String>,
    pub soft_skills: Vec<String>,
    pub all_keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordMatch {
    pub match_score: f64,
    pub matched_required_skills: Vec<String>,
    pub matched_technical_terms: Vec<String>,
    pub missing_required_skills: Vec<String>,
    pub recommendations: Vec<String>,
}

pub fn extract_keywords(job_description: &str) -> JobKeywords {
    if job_description.trim().is_empty() {
        return JobKeywords::default();
    }

    let lowered = job_description.to_lowercase();
    let cleaned = clean_text(job_description);

    JobKeywords {
        required_skills: section_skills(&lowered, &REQUIRED_SECTIONS),
        preferred_skills: section_skills(&lowered, &PREFERRED_SECTIONS),
        technical_terms: technical_terms(&cleaned),
        soft_skills: SOFT_SKILLS
            .iter()
            .filter(|s| cleaned.contains(*s))
            .map(|s| s.to_string())
            .collect(),
        all_keywords: general_keywords(&cleaned, MAX_KEYWORDS),
    }
}

/// Lowercases, blanks out punctuation other than `- + # .` and collapses whitespace.
pub fn clean_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    DISALLOWED_CHARS
        .replace_all(&lowered, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Byte index of the first character boundary strictly after `index`.
fn next_boundary(text: &str, index: usize) -> usize {
    text[index..]
        .chars()
        .next()
        .map_or(text.len(), |c| index + c.len_utf8())
}

/// Every section introduced by one of `rules`, each running up to its
/// earliest terminator word or the end of the text.
fn sections<'a>(text: &'a str, rules: &[SectionRule]) -> Vec<&'a str> {
    let mut found = Vec::new();
    for rule in rules {
        let mut cursor = 0;
        while let Some(header) = rule.header.find_at(text, cursor) {
            let start = header.end();
            if start >= text.len() {
                break;
            }
            // A section holds at least one character before a terminator can end it.
            let search_from = next_boundary(text, start);
            let end = rule
                .terminators
                .iter()
                .filter_map(|t| text[search_from..].find(t).map(|i| search_from + i))
                .min()
                .unwrap_or(text.len());
            found.push(&text[start..end]);
            cursor = end.max(search_from);
        }
    }
    found
}

fn section_skills(lowered: &str, rules: &[SectionRule]) -> Vec<String> {
    let mut skills = BTreeSet::new();
    for section in sections(lowered, rules) {
        for item in BULLET_ITEM.captures_iter(section) {
            if let Some(skill) = skill_from_item(&item[1]) {
                skills.insert(skill);
            }
        }
    }
    skills.into_iter().collect()
}

/// Strips filler phrases and keeps the first clause of a bullet item.
pub fn skill_from_item(item: &str) -> Option<String> {
    let mut text = item.to_string();
    for noise in SKILL_NOISE.iter() {
        text = noise.replace_all(&text, "").into_owned();
    }
    let trimmed = text.trim_matches(|c| " .,;:-".contains(c));
    let first = SKILL_SPLIT.split(trimmed).next()?.trim();
    let len = first.chars().count();
    (len > 2 && len < 50).then(|| first.to_string())
}

fn technical_terms(cleaned: &str) -> Vec<String> {
    let mut terms = BTreeSet::new();
    for pattern in TECH_PATTERNS.iter() {
        for caps in pattern.captures_iter(cleaned) {
            terms.insert(caps[1].to_lowercase());
        }
    }
    terms.into_iter().take(MAX_TECHNICAL_TERMS).collect()
}

/// Most frequent meaningful words; ties keep first-appearance order.
fn general_keywords(cleaned: &str, limit: usize) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for word in cleaned.split_whitespace() {
        if STOP_WORDS.contains(word)
            || word.chars().count() <= 2
            || word.chars().all(|c| c.is_ascii_digit())
        {
            continue;
        }
        let count = counts.entry(word).or_insert(0);
        if *count == 0 {
            order.push(word);
        }
        *count += 1;
    }
    // Stable sort keeps first-appearance order among equal counts.
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order.into_iter().take(limit).map(String::from).collect()
}

fn overlaps(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

/// Compares extracted keywords with a user's skills (case-insensitive,
/// containment either way counts as a match).
pub fn match_keywords_with_profile(keywords: &JobKeywords, user_skills: &[String]) -> KeywordMatch {
    let skills: Vec<String> = user_skills.iter().map(|s| s.to_lowercase()).collect();
    let has = |term: &str| {
        let term = term.to_lowercase();
        skills.iter().any(|s| overlaps(&term, s))
    };

    let (matched_required, missing_required): (Vec<String>, Vec<String>) = keywords
        .required_skills
        .iter()
        .cloned()
        .partition(|s| has(s));
    let matched_technical: Vec<String> = keywords
        .technical_terms
        .iter()
        .filter(|t| has(t))
        .cloned()
        .collect();

    let total_required = keywords.required_skills.len().max(1);
    let score = matched_required.len() as f64 / total_required as f64 * 100.0;

    let mut recommendations = Vec::new();
    if !missing_required.is_empty() {
        recommendations.push(format!(
            "Consider highlighting experience with: {}",
            missing_required.iter().take(3).cloned().collect::<Vec<_>>().join(", ")
        ));
    }
    if !keywords.preferred_skills.is_empty() {
        recommendations.push(format!(
            "Adding these preferred skills would strengthen your application: {}",
            keywords
                .preferred_skills
                .iter()
                .take(3)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    KeywordMatch {
        match_score: (score * 100.0).round() / 100.0,
        matched_required_skills: matched_required,
        matched_technical_terms: matched_technical,
        missing_required_skills: missing_required,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JD: &str = "Senior Backend Engineer\n\
        Required Skills:\n\
        • 5+ years experience with Python\n\
        • Knowledge of PostgreSQL and Redis\n\
        • Docker, Kubernetes\n\
        Preferred:\n\
        - GraphQL\n\
        - Strong communication\n\
        Responsibilities:\n\
        - Build APIs with Python 3.11 and Django\n\
        - Mentor the team, show leadership";

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("C++ / C#,  Node.js!"), "c++ c# node.js");
    }

    #[test]
    fn test_skill_from_item_strips_filler() {
        assert_eq!(skill_from_item("5+ years experience with Python").as_deref(), Some("Python"));
        assert_eq!(skill_from_item("Knowledge of PostgreSQL and Redis").as_deref(), Some("PostgreSQL"));
        assert_eq!(skill_from_item("Go"), None);
        assert_eq!(skill_from_item(&"x".repeat(60)), None);
    }

    #[test]
    fn test_required_and_preferred_sections() {
        let keywords = extract_keywords(JD);
        assert!(keywords.required_skills.contains(&"python".to_string()));
        assert!(keywords.required_skills.contains(&"postgresql".to_string()));
        assert!(keywords.required_skills.contains(&"docker".to_string()));
        assert!(!keywords.required_skills.iter().any(|s| s.contains("graphql")));
        assert_eq!(keywords.preferred_skills, vec!["graphql", "strong communication"]);
    }

    #[test]
    fn test_technical_and_soft_terms() {
        let keywords = extract_keywords(JD);
        for term in ["python", "postgresql", "redis", "docker", "kubernetes", "django"] {
            assert!(keywords.technical_terms.contains(&term.to_string()), "{term}");
        }
        assert!(keywords.technical_terms.len() <= MAX_TECHNICAL_TERMS);
        assert_eq!(keywords.soft_skills, vec!["leadership", "communication"]);
    }

    #[test]
    fn test_general_keywords_rank_by_frequency() {
        let keywords = general_keywords("rust rust go tokio tokio tokio 2024 the axum", 3);
        assert_eq!(keywords, vec!["tokio", "rust", "axum"]);
    }

    #[test]
    fn test_empty_description_yields_nothing() {
        assert_eq!(extract_keywords("   "), JobKeywords::default());
    }

    #[test]
    fn test_match_with_profile() {
        let keywords = JobKeywords {
            required_skills: vec!["python".into(), "postgresql".into(), "kafka".into()],
            preferred_skills: vec!["graphql".into()],
            technical_terms: vec!["docker".into(), "python".into()],
            ..Default::default()
        };
        let result = match_keywords_with_profile(&keywords, &["Python".into(), "PostgreSQL 15".into()]);
        assert_eq!(result.matched_required_skills, vec!["python", "postgresql"]);
        assert_eq!(result.missing_required_skills, vec!["kafka"]);
        assert_eq!(result.matched_technical_terms, vec!["python"]);
        assert_eq!(result.match_score, 66.67);
        assert_eq!(result.recommendations.len(), 2);
        assert!(result.recommendations[0].ends_with("kafka"));
    }
}
