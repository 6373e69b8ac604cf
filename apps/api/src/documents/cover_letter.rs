//! Cover-letter generation, tone catalogue and ATS text clean-up.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::documents::candidate::CandidateProfile;
use crate::documents::prompts;
use crate::llm_client::prompts::COVER_LETTER_SYSTEM;
use crate::llm_client::{CompletionProvider, CompletionRequest, LlmError};

const MAX_TOKENS: u32 = 1000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Friendly,
    Formal,
    Enthusiastic,
}

impl Tone {
    pub const ALL: [Tone; 4] = [
        Tone::Professional,
        Tone::Friendly,
        Tone::Formal,
        Tone::Enthusiastic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Friendly => "friendly",
            Tone::Formal => "formal",
            Tone::Enthusiastic => "enthusiastic",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == raw)
    }

    pub fn style(&self) -> &'static str {
        match self {
            Tone::Professional => "Polished and confident, focused on results",
            Tone::Friendly => "Warm and approachable while staying professional",
            Tone::Formal => "Traditional business correspondence",
            Tone::Enthusiastic => "Energetic and passionate about the role",
        }
    }

    pub fn greeting(&self) -> &'static str {
        match self {
            Tone::Professional => "Dear Hiring Manager,",
            Tone::Friendly => "Hello Hiring Team,",
            Tone::Formal => "Dear Sir or Madam,",
            Tone::Enthusiastic => "Dear Hiring Team,",
        }
    }

    pub fn closing(&self) -> &'static str {
        match self {
            Tone::Professional => "Sincerely,",
            Tone::Friendly => "Best regards,",
            Tone::Formal => "Yours faithfully,",
            Tone::Enthusiastic => "With enthusiasm,",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToneInfo {
    pub name: &'static str,
    pub style: &'static str,
    pub greeting: &'static str,
    pub closing: &'static str,
}

pub fn tone_catalogue() -> Vec<ToneInfo> {
    Tone::ALL
        .iter()
        .map(|t| ToneInfo {
            name: t.as_str(),
            style: t.style(),
            greeting: t.greeting(),
            closing: t.closing(),
        })
        .collect()
}

/// The position a letter is written for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobDetails {
    pub company_name: String,
    pub job_title: String,
    pub job_description: String,
    pub requirements: Vec<String>,
}

pub fn letter_title(job: &JobDetails) -> String {
    format!("Cover Letter - {} at {}", job.job_title, job.company_name)
}

pub fn custom_letter_title(job: Option<&JobDetails>, now: DateTime<Utc>) -> String {
    match job {
        Some(job) if !job.company_name.is_empty() => {
            format!("Custom Cover Letter - {}", job.company_name)
        }
        _ => format!("Custom Cover Letter - {}", now.format("%B %Y")),
    }
}

/// ASCII only, at most one blank line between paragraphs, trimmed.
pub fn sanitize_letter(text: &str) -> String {
    let ascii: String = text.chars().filter(char::is_ascii).collect();
    let ascii = ascii.replace("\r\n", "\n");
    let mut out = String::with_capacity(ascii.len());
    let mut newlines = 0;
    for c in ascii.chars() {
        if c == '\n' {
            newlines += 1;
            if newlines > 2 {
                continue;
            }
        } else {
            newlines = 0;
        }
        out.push(c);
    }
    out.trim().to_string()
}

async fn complete_letter(provider: &dyn CompletionProvider, prompt: &str) -> Result<String, LlmError> {
    let text = provider
        .complete(CompletionRequest {
            system: COVER_LETTER_SYSTEM,
            prompt,
            max_tokens: MAX_TOKENS,
            json_mode: false,
        })
        .await?;
    let letter = sanitize_letter(&text);
    if letter.is_empty() {
        return Err(LlmError::EmptyContent);
    }
    Ok(letter)
}

pub async fn generate_cover_letter(
    provider: &dyn CompletionProvider,
    profile: &CandidateProfile,
    job: &JobDetails,
    tone: Tone,
) -> Result<String, LlmError> {
    let prompt = prompts::build_cover_letter_prompt(profile, job, tone);
    complete_letter(provider, &prompt).await
}

pub async fn generate_custom_cover_letter(
    provider: &dyn CompletionProvider,
    profile: &CandidateProfile,
    custom_prompt: &str,
    job: Option<&JobDetails>,
    tone: Tone,
) -> Result<String, LlmError> {
    let prompt = prompts::build_custom_cover_letter_prompt(profile, custom_prompt, job, tone);
    complete_letter(provider, &prompt).await
}

/// Template letter used when the LLM is unavailable.
pub fn mock_cover_letter(
    profile: &CandidateProfile,
    job: &JobDetails,
    tone: Tone,
    now: DateTime<Utc>,
) -> String {
    let skills = if profile.skills.is_empty() {
        "various technologies".to_string()
    } else {
        profile
            .skills
            .iter()
            .take(3)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    };
    let experience = profile
        .experience
        .first()
        .map(|exp| {
            let title = if exp.title.is_empty() { "Position" } else { exp.title.as_str() };
            let company = if exp.company.is_empty() { "Company" } else { exp.company.as_str() };
            format!("In my role as {title} at {company}, I built the experience this position calls for.")
        })
        .unwrap_or_else(|| {
            "My professional experience has equipped me with the skills necessary for this role."
                .to_string()
        });

    let letter = format!(
        "{date}\n\n\
         {greeting}\n\n\
         I am writing to express my strong interest in the {title} position at {company}. \
         With my background and experience, I am confident in my ability to contribute effectively to your team.\n\n\
         Throughout my career, I have developed expertise in {skills}. I am particularly drawn to {company} \
         because of your commitment to innovation and excellence in the industry.\n\n\
         {experience}\n\n\
         I am excited about the opportunity to bring my skills and passion to your team. \
         I would welcome the chance to discuss how my background aligns with your needs.\n\n\
         Thank you for considering my application. I look forward to the possibility of contributing to {company}.\n\n\
         {closing}\n\
         {name}",
        date = now.format("%B %d, %Y"),
        greeting = tone.greeting(),
        title = job.job_title,
        company = job.company_name,
        closing = tone.closing(),
        name = profile.full_name(),
    );
    sanitize_letter(&letter)
}

/// Generates a letter, falling back to the template on any LLM failure.
pub async fn cover_letter_or_mock(
    provider: &dyn CompletionProvider,
    profile: &CandidateProfile,
    job: &JobDetails,
    tone: Tone,
) -> String {
    match generate_cover_letter(provider, profile, job, tone).await {
        Ok(letter) => letter,
        Err(e) => {
            warn!(error = %e, "Cover letter generation failed, using template letter");
            mock_cover_letter(profile, job, tone, Utc::now())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;

    struct FixedProvider(Result<&'static str, ()>);

    #[async_trait]
    impl CompletionProvider for FixedProvider {
        async fn complete(&self, _request: CompletionRequest<'_>) -> Result<String, LlmError> {
            match self.0 {
                Ok(text) => Ok(text.to_string()),
                Err(()) => Err(LlmError::RetriesExhausted { retries: 3 }),
            }
        }
    }

    fn job() -> JobDetails {
        JobDetails {
            company_name: "Initech".into(),
            job_title: "Platform Engineer".into(),
            ..Default::default()
        }
    }

    fn profile() -> CandidateProfile {
        CandidateProfile {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            skills: vec!["Rust".into(), "Go".into(), "SQL".into(), "Kafka".into()],
            ..Default::default()
        }
    }

    #[test]
    fn test_tone_parsing_is_exact() {
        assert_eq!(Tone::parse("formal"), Some(Tone::Formal));
        assert_eq!(Tone::parse("Formal"), None);
        assert_eq!(Tone::parse("casual"), None);
        assert_eq!(tone_catalogue().len(), 4);
    }

    #[test]
    fn test_sanitize_letter() {
        let raw = "  Dear team 👋,\r\n\r\n\r\n\r\nI’m keen.\n\n\n\nThanks  ";
        assert_eq!(sanitize_letter(raw), "Dear team ,\n\nIm keen.\n\nThanks");
    }

    #[test]
    fn test_titles() {
        assert_eq!(letter_title(&job()), "Cover Letter - Platform Engineer at Initech");
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
        assert_eq!(custom_letter_title(None, now), "Custom Cover Letter - March 2024");
        assert_eq!(
            custom_letter_title(Some(&job()), now),
            "Custom Cover Letter - Initech"
        );
    }

    #[test]
    fn test_mock_letter_content() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
        let letter = mock_cover_letter(&profile(), &job(), Tone::Friendly, now);
        assert!(letter.starts_with("March 05, 2024\n\nHello Hiring Team,"));
        assert!(letter.contains("expertise in Rust, Go, SQL."));
        assert!(!letter.contains("Kafka"));
        assert!(letter.contains("equipped me with the skills"));
        assert!(letter.ends_with("Best regards,\nAda Lovelace"));
    }

    #[tokio::test]
    async fn test_llm_letter_is_sanitized() {
        let provider = FixedProvider(Ok("Dear Hiring Manager,\n\n\n\nHello ✓ world"));
        let letter = generate_cover_letter(&provider, &profile(), &job(), Tone::Professional)
            .await
            .unwrap();
        assert_eq!(letter, "Dear Hiring Manager,\n\nHello  world");
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_template() {
        let provider = FixedProvider(Err(()));
        let letter = cover_letter_or_mock(&provider, &profile(), &job(), Tone::Formal).await;
        assert!(letter.contains("Dear Sir or Madam,"));
        assert!(letter.contains("Platform Engineer position at Initech"));
    }

    #[tokio::test]
    async fn test_blank_llm_output_is_an_error() {
        let provider = FixedProvider(Ok("🙂🙂"));
        let result = generate_cover_letter(&provider, &profile(), &job(), Tone::Formal).await;
        assert!(matches!(result, Err(LlmError::EmptyContent)));
    }
}
