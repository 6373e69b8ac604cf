//! Ranks job postings against a user profile.
//!
//! The base score is TF-IDF cosine similarity between the profile text and each
//! posting, fitted per request over the candidate postings. Bonuses for skill
//! overlap, seniority fit, remote/hybrid work and a title match are added on top.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::ml::tfidf::{TfIdfBuilder, DEFAULT_TOKEN_PATTERN};
use crate::models::job::Job;
use crate::models::user::{EducationItem, ExperienceItem};

const MAX_FEATURES: usize = 500;
const SKILL_BONUS_WEIGHT: f64 = 0.3;
const EXPERIENCE_BONUS: f64 = 0.1;
const FLEXIBLE_WORK_BONUS: f64 = 0.05;
const TITLE_BONUS: f64 = 0.15;

/// The parts of a profile the matcher reads.
#[derive(Debug, Clone, Default)]
pub struct MatchProfile {
    pub target_role: Option<String>,
    pub skills: Vec<String>,
    pub bio: Option<String>,
    pub experience: Vec<ExperienceItem>,
    pub education: Vec<EducationItem>,
}

impl MatchProfile {
    /// Skills are repeated to weigh them above free text.
    pub fn text(&self) -> String {
        let skills = self.skills.join(" ");
        let mut parts: Vec<&str> = Vec::new();
        if let Some(role) = self.target_role.as_deref().filter(|r| !r.is_empty()) {
            parts.push(role);
        }
        if !self.skills.is_empty() {
            parts.push(&skills);
            parts.push(&skills);
        }
        if let Some(bio) = self.bio.as_deref().filter(|b| !b.is_empty()) {
            parts.push(bio);
        }
        for exp in &self.experience {
            if !exp.title.is_empty() {
                parts.push(&exp.title);
            }
            if !exp.description.is_empty() {
                parts.push(&exp.description);
            }
        }
        for edu in &self.education {
            if !edu.degree.is_empty() {
                parts.push(&edu.degree);
            }
            if !edu.field.is_empty() {
                parts.push(&edu.field);
            }
        }
        parts.join(" ")
    }

    fn skill_set(&self) -> BTreeSet<String> {
        self.skills.iter().map(|s| s.trim().to_lowercase()).collect()
    }

    fn target_role_lower(&self) -> Option<String> {
        self.target_role
            .as_deref()
            .map(|r| r.trim().to_lowercase())
            .filter(|r| !r.is_empty())
    }
}

/// Title and skills are repeated to weigh them above the prose.
pub fn job_text(job: &Job) -> String {
    let skills = job.skills_required.join(" ");
    [
        job.title.as_str(),
        job.title.as_str(),
        &skills,
        &skills,
        &job.description,
        &job.requirements.join(" "),
        &job.responsibilities.join(" "),
    ]
    .into_iter()
    .filter(|p| !p.is_empty())
    .collect::<Vec<_>>()
    .join(" ")
}

/// Narrowing applied before scoring. Empty fields do not filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_salary: Option<i32>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl JobFilters {
    pub fn matches(&self, job: &Job) -> bool {
        if let Some(location) = non_empty(&self.location) {
            if !location.eq_ignore_ascii_case("any")
                && !job
                    .location
                    .to_lowercase()
                    .contains(&location.to_lowercase())
            {
                return false;
            }
        }
        if non_empty(&self.experience_level).is_some_and(|v| v != job.experience_level) {
            return false;
        }
        if non_empty(&self.work_type).is_some_and(|v| v != job.work_type) {
            return false;
        }
        if non_empty(&self.job_type).is_some_and(|v| v != job.job_type) {
            return false;
        }
        if let Some(min_salary) = self.min_salary.filter(|s| *s > 0) {
            if job.salary_min < min_salary {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobMatch {
    #[serde(flatten)]
    pub job: Job,
    pub match_score: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MatchExplanation {
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub experience_match: bool,
    pub title_match: bool,
}

/// Entry ≤ 2 roles, mid 2..=5, senior ≥ 5. Lead never matches.
fn experience_fits(level: &str, roles_held: usize) -> bool {
    match level.to_lowercase().as_str() {
        "entry" => roles_held <= 2,
        "mid" => (2..=5).contains(&roles_held),
        "senior" => roles_held >= 5,
        _ => false,
    }
}

fn title_matches(profile: &MatchProfile, job: &Job) -> bool {
    profile
        .target_role_lower()
        .is_some_and(|role| job.title.to_lowercase().contains(&role))
}

fn enhance(profile: &MatchProfile, job: &Job, base: f64) -> f64 {
    let mut score = base;

    let user_skills = profile.skill_set();
    let job_skills: BTreeSet<String> = job
        .skills_required
        .iter()
        .map(|s| s.to_lowercase())
        .collect();
    if !user_skills.is_empty() && !job_skills.is_empty() {
        let overlap = user_skills.intersection(&job_skills).count();
        score += overlap as f64 / job_skills.len() as f64 * SKILL_BONUS_WEIGHT;
    }

    if experience_fits(&job.experience_level, profile.experience.len()) {
        score += EXPERIENCE_BONUS;
    }

    let work_type = job.work_type.to_lowercase();
    if work_type.contains("remote") || work_type.contains("hybrid") {
        score += FLEXIBLE_WORK_BONUS;
    }

    if title_matches(profile, job) {
        score += TITLE_BONUS;
    }

    score.min(1.0)
}

/// Scores `jobs` against `profile` and returns the best `limit`, highest first.
/// `match_score` is a percentage rounded to two decimals.
pub fn match_jobs(profile: &MatchProfile, jobs: Vec<Job>, limit: usize) -> Vec<JobMatch> {
    if jobs.is_empty() {
        return Vec::new();
    }

    let mut builder = match TfIdfBuilder::new(DEFAULT_TOKEN_PATTERN) {
        Ok(builder) => builder
            .english_stop_words()
            .ngrams(2)
            .max_features(MAX_FEATURES),
        Err(e) => {
            error!(error = %e, "Job matcher tokenizer failed to build");
            return Vec::new();
        }
    };
    for job in &jobs {
        builder.add(job_text(job));
    }
    let model = builder.build();
    let similarities = model.similarities(&profile.text());

    let mut scored: Vec<(Job, f64)> = jobs
        .into_iter()
        .zip(similarities)
        .map(|(job, base)| {
            let score = enhance(profile, &job, base);
            (job, score)
        })
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    scored
        .into_iter()
        .take(limit)
        .map(|(job, score)| JobMatch {
            job,
            match_score: (score * 10_000.0).round() / 100.0,
        })
        .collect()
}

/// Score of `job` as it ranks within `board`, the same corpus `match_jobs`
/// fits on an unfiltered request. `job` joins the corpus when absent.
pub fn score_job(profile: &MatchProfile, mut board: Vec<Job>, job: &Job) -> f64 {
    if !board.iter().any(|j| j.id == job.id) {
        board.push(job.clone());
    }
    let limit = board.len();
    match_jobs(profile, board, limit)
        .into_iter()
        .find(|m| m.job.id == job.id)
        .map(|m| m.match_score)
        .unwrap_or(0.0)
}

pub fn explain(profile: &MatchProfile, job: &Job) -> MatchExplanation {
    let user_skills = profile.skill_set();
    let job_skills: BTreeSet<String> = job
        .skills_required
        .iter()
        .map(|s| s.to_lowercase())
        .collect();

    MatchExplanation {
        matched_skills: job_skills.intersection(&user_skills).cloned().collect(),
        missing_skills: job_skills.difference(&user_skills).cloned().collect(),
        experience_match: experience_fits(&job.experience_level, profile.experience.len()),
        title_match: title_matches(profile, job),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::board::generate_jobs;
    use chrono::Utc;

    fn job(title: &str, skills: &[&str], level: &str, work_type: &str) -> Job {
        let mut job = generate_jobs(1, 1, Utc::now()).remove(0);
        job.title = title.to_string();
        job.skills_required = skills.iter().map(|s| s.to_string()).collect();
        job.experience_level = level.to_string();
        job.work_type = work_type.to_string();
        job.location = if work_type == "Remote" { "Remote".into() } else { "Austin, TX".into() };
        job
    }

    fn profile(role: Option<&str>, skills: &[&str], roles_held: usize) -> MatchProfile {
        MatchProfile {
            target_role: role.map(String::from),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            experience: vec![ExperienceItem::default(); roles_held],
            ..Default::default()
        }
    }

    #[test]
    fn test_experience_buckets() {
        assert!(experience_fits("Entry", 0));
        assert!(experience_fits("Mid", 2));
        assert!(experience_fits("Entry", 2));
        assert!(!experience_fits("Senior", 4));
        assert!(experience_fits("senior", 5));
        assert!(!experience_fits("Lead", 10));
    }

    #[test]
    fn test_enhancement_bonuses_add_up() {
        let posting = job("Senior Rust Engineer", &["Rust", "Go"], "Senior", "Remote");
        let user = profile(Some("rust engineer"), &["rust"], 5);
        // 0.15 skills + 0.1 seniority + 0.05 remote + 0.15 title
        assert!((enhance(&user, &posting, 0.0) - 0.45).abs() < 1e-9);
        assert_eq!(enhance(&user, &posting, 0.9), 1.0);
    }

    #[test]
    fn test_match_prefers_relevant_postings() {
        let jobs = vec![
            job("Security Analyst", &["SIEM", "Networking"], "Lead", "On-site"),
            job("DevOps Engineer", &["Kubernetes", "Docker", "Terraform"], "Lead", "On-site"),
        ];
        let user = profile(Some("DevOps"), &["Kubernetes", "Docker", "Terraform"], 0);
        let matches = match_jobs(&user, jobs, 10);
        assert_eq!(matches[0].job.title, "DevOps Engineer");
        assert!(matches[0].match_score > matches[1].match_score);
        assert!(matches.iter().all(|m| m.match_score <= 100.0));
    }

    #[test]
    fn test_single_job_score_matches_board_ranking() {
        let board = generate_jobs(20, 7, Utc::now());
        let user = profile(Some("Data Scientist"), &["Python", "SQL", "Pandas"], 3);
        let ranked = match_jobs(&user, board.clone(), board.len());

        for posting in board.iter().take(5) {
            let listed = ranked.iter().find(|m| m.job.id == posting.id).unwrap();
            assert_eq!(score_job(&user, board.clone(), posting), listed.match_score);
        }
    }

    #[test]
    fn test_single_job_score_outside_board() {
        let board = generate_jobs(5, 3, Utc::now());
        let mut extra = generate_jobs(1, 11, Utc::now()).remove(0);
        extra.id = 9_999;
        let user = profile(None, &["Python"], 1);
        let score = score_job(&user, board, &extra);
        assert!((0.0..=100.0).contains(&score));
    }

    #[test]
    fn test_limit_truncates() {
        let jobs = generate_jobs(12, 9, Utc::now());
        let user = profile(None, &["Python"], 1);
        assert_eq!(match_jobs(&user, jobs, 5).len(), 5);
        assert!(match_jobs(&user, Vec::new(), 5).is_empty());
    }

    #[test]
    fn test_filters() {
        let posting = job("Cloud Engineer", &["AWS"], "Mid", "Remote");
        let mut filters = JobFilters {
            location: Some("any".into()),
            ..Default::default()
        };
        assert!(filters.matches(&posting));
        filters.location = Some("remote".into());
        assert!(filters.matches(&posting));
        filters.experience_level = Some("Senior".into());
        assert!(!filters.matches(&posting));
        filters.experience_level = None;
        filters.min_salary = Some(posting.salary_min + 1);
        assert!(!filters.matches(&posting));
    }

    #[test]
    fn test_explanation() {
        let posting = job("Data Scientist", &["Python", "SQL", "R"], "Entry", "On-site");
        let user = profile(Some("data scientist"), &["python", "Rust"], 1);
        let explanation = explain(&user, &posting);
        assert_eq!(explanation.matched_skills, vec!["python"]);
        assert_eq!(explanation.missing_skills, vec!["r", "sql"]);
        assert!(explanation.experience_match);
        assert!(explanation.title_match);
    }
}
