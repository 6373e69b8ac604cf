//! ATS resume pipeline.
//!
//! Flow: extract keywords → build prompt → LLM → parse JSON → validate →
//!       repair and revalidate → sanitise.
//!
//! Any failure along the way is reported to the caller, which falls back to
//! `mock_resume` built from the profile alone.

use serde_json::{json, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::documents::candidate::CandidateProfile;
use crate::documents::keywords::{self, JobKeywords};
use crate::documents::prompts;
use crate::documents::schema;
use crate::llm_client::prompts::RESUME_WRITER_SYSTEM;
use crate::llm_client::{
    find_json_object, strip_json_fences, CompletionProvider, CompletionRequest, LlmError,
};
use crate::models::user::{EducationItem, ExperienceItem};

const MAX_TOKENS: u32 = 2000;
const MOCK_TECHNICAL_SKILLS: usize = 10;
const MOCK_EXPERIENCE_ITEMS: usize = 5;
const MOCK_EDUCATION_ITEMS: usize = 3;

#[derive(Debug, Error)]
pub enum ResumeGenerationError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("LLM response contained no resume JSON")]
    NoResumeJson,

    #[error("Resume validation failed: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Where the stored content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeSource {
    Llm,
    Template,
}

#[derive(Debug, Clone)]
pub struct GeneratedResume {
    pub content: Value,
    pub source: ResumeSource,
    pub warnings: Vec<String>,
}

fn looks_like_resume(value: &Value) -> bool {
    value.get("personal_info").is_some() || value.get("summary").is_some()
}

/// Parses the model output as a JSON object, falling back to the first
/// embedded object that looks like a resume.
pub fn parse_resume_json(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(strip_json_fences(text)) {
        Ok(value) if value.is_object() => Some(value),
        _ => find_json_object(text, looks_like_resume),
    }
}

pub async fn generate_ats_resume(
    provider: &dyn CompletionProvider,
    profile: &CandidateProfile,
    job_description: Option<&str>,
    target_role: Option<&str>,
) -> Result<GeneratedResume, ResumeGenerationError> {
    let keywords: Option<JobKeywords> = job_description.map(keywords::extract_keywords);
    let prompt =
        prompts::build_resume_prompt(profile, job_description, target_role, keywords.as_ref());

    let text = provider
        .complete(CompletionRequest {
            system: RESUME_WRITER_SYSTEM,
            prompt: &prompt,
            max_tokens: MAX_TOKENS,
            json_mode: true,
        })
        .await?;

    let mut resume = parse_resume_json(&text).ok_or(ResumeGenerationError::NoResumeJson)?;

    let mut report = schema::validate_resume(&resume);
    if !report.is_valid() {
        warn!(errors = ?report.errors, "Generated resume failed validation, repairing");
        resume = schema::repair(resume);
        report = schema::validate_resume(&resume);
        if !report.is_valid() {
            return Err(ResumeGenerationError::Invalid(report.errors));
        }
    }

    Ok(GeneratedResume {
        content: schema::sanitize(resume),
        source: ResumeSource::Llm,
        warnings: report.warnings,
    })
}

fn experience_entry(exp: &ExperienceItem) -> Value {
    let responsibilities: Vec<String> = if !exp.achievements.is_empty() {
        exp.achievements.clone()
    } else if !exp.description.trim().is_empty() {
        vec![exp.description.trim().to_string()]
    } else {
        Vec::new()
    };
    json!({
        "title": exp.title,
        "company": exp.company,
        "location": exp.location,
        "duration": exp.period(),
        "responsibilities": responsibilities,
    })
}

fn education_entry(edu: &EducationItem) -> Value {
    let degree = if edu.field.trim().is_empty() {
        edu.degree.clone()
    } else {
        format!("{} in {}", edu.degree, edu.field)
    };
    json!({
        "degree": degree,
        "institution": edu.institution,
        "location": edu.location,
        "year": edu.year,
        "gpa": edu.gpa,
    })
}

/// Deterministic resume assembled from the profile without the LLM.
pub fn mock_resume(profile: &CandidateProfile, target_role: Option<&str>) -> Value {
    let summary = if profile.bio.trim().is_empty() {
        format!(
            "Experienced professional seeking {}. Skilled in various technologies and committed to delivering high-quality results.",
            target_role.unwrap_or("new opportunities")
        )
    } else {
        profile.bio.trim().to_string()
    };

    let resume = json!({
        "personal_info": {
            "full_name": profile.full_name(),
            "email": profile.email,
            "phone": profile.phone,
            "location": profile.location,
            "linkedin": profile.linkedin_url,
            "github": profile.github_url,
            "portfolio": profile.portfolio_url,
        },
        "summary": summary,
        "skills": {
            "technical": profile.skills.iter().take(MOCK_TECHNICAL_SKILLS).collect::<Vec<_>>(),
            "soft": ["Communication", "Problem-solving", "Team collaboration"],
            "tools": ["Git", "VS Code", "Jira"],
        },
        "work_experience": profile
            .experience
            .iter()
            .take(MOCK_EXPERIENCE_ITEMS)
            .map(experience_entry)
            .collect::<Vec<_>>(),
        "projects": [],
        "education": profile
            .education
            .iter()
            .take(MOCK_EDUCATION_ITEMS)
            .map(education_entry)
            .collect::<Vec<_>>(),
        "certifications": [],
    });
    schema::sanitize(resume)
}

/// Runs the pipeline and substitutes the template resume on any failure.
pub async fn resume_or_mock(
    provider: &dyn CompletionProvider,
    profile: &CandidateProfile,
    job_description: Option<&str>,
    target_role: Option<&str>,
) -> GeneratedResume {
    match generate_ats_resume(provider, profile, job_description, target_role).await {
        Ok(generated) => {
            info!("LLM resume generated and validated");
            generated
        }
        Err(e) => {
            warn!(error = %e, "Resume generation failed, using template resume");
            let content = mock_resume(profile, target_role);
            GeneratedResume {
                warnings: schema::ats_warnings(&content),
                content,
                source: ResumeSource::Template,
            }
        }
    }
}
