// Prompt builders for resume and cover-letter generation.
// Cross-cutting fragments live in llm_client::prompts.

use crate::documents::candidate::CandidateProfile;
use crate::documents::cover_letter::{JobDetails, Tone};
use crate::documents::keywords::JobKeywords;
use crate::llm_client::prompts::ATS_TEXT_RULES;

const RESUME_JD_CHARS: usize = 1000;
const LETTER_JD_CHARS: usize = 800;
const LETTER_EXPERIENCE_ITEMS: usize = 3;
const LETTER_DESCRIPTION_CHARS: usize = 150;

pub const RESUME_INSTRUCTIONS: &str = "You are an expert ATS (Applicant Tracking System) resume writer. \
Your task is to create a strictly ATS-compliant resume that will pass automated screening systems.

**CRITICAL ATS RULES - MUST FOLLOW**:
1. Single-column layout (no tables, columns, or complex formatting)
2. Standard section headings ONLY: SUMMARY, SKILLS, WORK EXPERIENCE, PROJECTS, EDUCATION, CERTIFICATIONS
3. Use simple bullet points for lists, never tables or graphics
4. No special characters, emojis, or icons
5. Include relevant keywords naturally (no keyword stuffing)
6. Use action verbs and quantified achievements
7. Output as structured JSON only

**ATS BEST PRACTICES**:
- Use standard job titles and skill names
- Quantify achievements with numbers, percentages, or metrics
- Use present tense for current roles, past tense for previous roles
- Match keywords from the job description when applicable";

pub const RESUME_JSON_SCHEMA: &str = r#"**REQUIRED JSON OUTPUT SCHEMA**:
{
  "personal_info": {
    "full_name": "string (required)",
    "email": "string (required)",
    "phone": "string (optional)",
    "location": "string (optional)",
    "linkedin": "string (optional)",
    "github": "string (optional)",
    "portfolio": "string (optional)"
  },
  "summary": "string (50-500 chars, professional summary tailored to role)",
  "skills": {
    "technical": ["array of technical skills"],
    "soft": ["array of soft skills"],
    "tools": ["array of tools/technologies"]
  },
  "work_experience": [
    {
      "title": "string",
      "company": "string",
      "location": "string (optional)",
      "duration": "string (e.g. 'Jan 2020 - Present')",
      "responsibilities": ["at least 2 bullet points with action verbs and impact"]
    }
  ],
  "projects": [
    {
      "name": "string",
      "description": "string",
      "technologies": ["array of technologies used"],
      "link": "string (optional)"
    }
  ],
  "education": [
    {
      "degree": "string",
      "institution": "string",
      "location": "string (optional)",
      "year": "string (graduation year or expected)",
      "gpa": "string (optional, only if > 3.5)"
    }
  ],
  "certifications": [
    {
      "name": "string",
      "issuer": "string",
      "year": "string",
      "credential_id": "string (optional)"
    }
  ]
}"#;

pub const RESUME_GENERATION_RULES: &str = "**GENERATION INSTRUCTIONS**:
1. Summary: 50-100 words highlighting qualifications for the target role.
2. Skills: split into technical, soft and tools; prioritise skills the job asks for.
3. Work experience: 3-5 bullets per role, strong action verbs, quantified results.
4. Projects: only projects that demonstrate relevant skills.
5. Education: degree, institution, graduation year; GPA only if 3.5 or higher.
6. Certifications: only current, industry-recognised certifications.

**CRITICAL**:
- Output ONLY the JSON object, no markdown and no code blocks
- Ensure all required fields are present
- Be honest: only use information from the user profile
- If information is missing, use empty strings or empty arrays";

/// Cuts `text` to at most `max` characters.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn profile_block(profile: &CandidateProfile) -> String {
    let mut lines = vec![
        "**USER PROFILE DATA**:".to_string(),
        format!("Name: {}", profile.full_name()),
        format!("Email: {}", profile.email),
    ];
    let optional = [
        ("Phone", &profile.phone),
        ("Location", &profile.location),
        ("LinkedIn", &profile.linkedin_url),
        ("GitHub", &profile.github_url),
        ("Portfolio", &profile.portfolio_url),
    ];
    for (label, value) in optional {
        if !value.is_empty() {
            lines.push(format!("{label}: {value}"));
        }
    }

    if !profile.bio.is_empty() {
        lines.push(format!("\nBio: {}", profile.bio));
    }
    if !profile.skills.is_empty() {
        lines.push(format!("\nSkills: {}", profile.skills.join(", ")));
    }
    if !profile.experience.is_empty() {
        lines.push("\nWork Experience:".to_string());
        for exp in &profile.experience {
            lines.push(format!("- {} at {}", or_na(&exp.title), or_na(&exp.company)));
            lines.push(format!("  Duration: {}", or_na(&exp.period())));
            if !exp.description.is_empty() {
                lines.push(format!("  Description: {}", exp.description));
            }
            for achievement in &exp.achievements {
                lines.push(format!("  Achievement: {achievement}"));
            }
        }
    }
    if !profile.education.is_empty() {
        lines.push("\nEducation:".to_string());
        for edu in &profile.education {
            lines.push(format!(
                "- {} from {}",
                or_na(&edu.degree),
                or_na(&edu.institution)
            ));
            lines.push(format!("  Year: {}", or_na(&edu.year)));
        }
    }
    lines.join("\n")
}

fn or_na(value: &str) -> &str {
    if value.trim().is_empty() {
        "N/A"
    } else {
        value
    }
}

fn keywords_block(keywords: &JobKeywords) -> String {
    let mut lines = vec!["**KEYWORDS TO EMPHASIZE**:".to_string()];
    let groups = [
        ("Required Skills", &keywords.required_skills, 10),
        ("Technical Terms", &keywords.technical_terms, 10),
        ("Soft Skills", &keywords.soft_skills, 5),
    ];
    for (label, terms, limit) in groups {
        if !terms.is_empty() {
            let shown: Vec<&str> = terms.iter().take(limit).map(String::as_str).collect();
            lines.push(format!("{label}: {}", shown.join(", ")));
        }
    }
    lines.push(
        "\nNaturally incorporate these keywords where they match the user's experience."
            .to_string(),
    );
    lines.join("\n")
}

pub fn build_resume_prompt(
    profile: &CandidateProfile,
    job_description: Option<&str>,
    target_role: Option<&str>,
    keywords: Option<&JobKeywords>,
) -> String {
    let mut parts = vec![RESUME_INSTRUCTIONS.to_string(), profile_block(profile)];
    if let Some(role) = target_role {
        parts.push(format!("**TARGET ROLE**: {role}"));
    }
    if let Some(jd) = job_description {
        parts.push(format!(
            "**JOB DESCRIPTION**:\n{}",
            truncate_chars(jd, RESUME_JD_CHARS)
        ));
    }
    if let Some(keywords) = keywords {
        parts.push(keywords_block(keywords));
    }
    parts.push(RESUME_JSON_SCHEMA.to_string());
    parts.push(RESUME_GENERATION_RULES.to_string());
    parts.push(ATS_TEXT_RULES.to_string());
    parts.join("\n\n")
}

fn recent_experience(profile: &CandidateProfile) -> String {
    if profile.experience.is_empty() {
        return "No experience listed".to_string();
    }
    let mut lines = Vec::new();
    for exp in profile.experience.iter().take(LETTER_EXPERIENCE_ITEMS) {
        lines.push(format!(
            "- {} at {} ({})",
            or_na(&exp.title),
            or_na(&exp.company),
            or_na(&exp.period())
        ));
        if !exp.description.is_empty() {
            lines.push(format!(
                "  {}",
                truncate_chars(&exp.description, LETTER_DESCRIPTION_CHARS)
            ));
        }
    }
    lines.join("\n")
}

fn letter_profile_block(profile: &CandidateProfile) -> String {
    format!(
        "**USER PROFILE**:\nName: {}\nEmail: {}\nPhone: {}\nLocation: {}\n\nBio: {}\n\nSkills: {}\n\nRecent Experience:\n{}",
        profile.full_name(),
        profile.email,
        profile.phone,
        profile.location,
        profile.bio,
        profile.skills.join(", "),
        recent_experience(profile),
    )
}

fn tone_block(tone: Tone) -> String {
    format!(
        "**TONE**: {} ({}). Open with \"{}\" and close with \"{}\".",
        tone.as_str(),
        tone.style(),
        tone.greeting(),
        tone.closing()
    )
}

fn target_block(job: &JobDetails) -> String {
    let mut block = format!(
        "**TARGET POSITION**:\nCompany: {}\nJob Title: {}\nJob Description: {}",
        job.company_name,
        job.job_title,
        truncate_chars(&job.job_description, LETTER_JD_CHARS)
    );
    if !job.requirements.is_empty() {
        block.push_str(&format!("\nKey Requirements: {}", job.requirements.join("; ")));
    }
    block
}

const LETTER_FORMAT: &str = "**OUTPUT FORMAT**:
Return ONLY plain text in standard business letter format: date, hiring manager or \
recruiting team, company name, body paragraphs and a professional closing. \
Keep it between 250 and 400 words.";

pub fn build_cover_letter_prompt(profile: &CandidateProfile, job: &JobDetails, tone: Tone) -> String {
    [
        "You are a professional cover letter writer. Create an ATS-friendly cover letter \
         tailored to the specific job and company, focused on value proposition and relevant experience."
            .to_string(),
        letter_profile_block(profile),
        target_block(job),
        tone_block(tone),
        "**COVER LETTER STRUCTURE**:\n1. Opening: interest in the specific role and company\n\
         2. Body (2-3 paragraphs): relevant achievements, skills matched to requirements, knowledge of the company\n\
         3. Closing: enthusiasm and a call to action"
            .to_string(),
        LETTER_FORMAT.to_string(),
        ATS_TEXT_RULES.to_string(),
    ]
    .join("\n\n")
}

pub fn build_custom_cover_letter_prompt(
    profile: &CandidateProfile,
    custom_prompt: &str,
    job: Option<&JobDetails>,
    tone: Tone,
) -> String {
    let mut parts = vec![
        "You are a professional cover letter writer. Write an ATS-friendly cover letter \
         that follows the candidate's own instructions."
            .to_string(),
        letter_profile_block(profile),
    ];
    if let Some(job) = job {
        parts.push(target_block(job));
    }
    parts.push(format!("**CANDIDATE INSTRUCTIONS**:\n{}", custom_prompt.trim()));
    parts.push(tone_block(tone));
    parts.push(LETTER_FORMAT.to_string());
    parts.push(ATS_TEXT_RULES.to_string());
    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::ExperienceItem;

    fn profile() -> CandidateProfile {
        CandidateProfile {
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            email: "grace@example.com".into(),
            skills: vec!["COBOL".into(), "Compilers".into()],
            experience: vec![ExperienceItem {
                title: "Rear Admiral".into(),
                company: "US Navy".into(),
                start_date: "1943".into(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn test_resume_prompt_sections() {
        let keywords = JobKeywords {
            required_skills: vec!["Python".into()],
            technical_terms: vec!["docker".into()],
            ..Default::default()
        };
        let jd = "x".repeat(1500);
        let prompt = build_resume_prompt(&profile(), Some(&jd), Some("Engineer"), Some(&keywords));

        assert!(prompt.contains("Name: Grace Hopper"));
        assert!(prompt.contains("- Rear Admiral at US Navy"));
        assert!(prompt.contains("Duration: 1943 - Present"));
        assert!(prompt.contains("**TARGET ROLE**: Engineer"));
        assert!(prompt.contains("Required Skills: Python"));
        assert!(!prompt.contains("Soft Skills:"));
        assert!(prompt.contains(&"x".repeat(1000)));
        assert!(!prompt.contains(&"x".repeat(1001)));
        assert!(!prompt.contains("Phone:"));
    }

    #[test]
    fn test_cover_letter_prompt_mentions_tone_and_target() {
        let job = JobDetails {
            company_name: "Initech".into(),
            job_title: "Engineer".into(),
            job_description: "Build things".into(),
            requirements: vec!["Rust".into()],
        };
        let prompt = build_cover_letter_prompt(&profile(), &job, Tone::Formal);
        assert!(prompt.contains("Company: Initech"));
        assert!(prompt.contains("Key Requirements: Rust"));
        assert!(prompt.contains(Tone::Formal.greeting()));
        assert!(prompt.contains("- Rear Admiral at US Navy (1943 - Present)"));
    }

    #[test]
    fn test_custom_prompt_without_job() {
        let prompt =
            build_custom_cover_letter_prompt(&profile(), "  Stress leadership. ", None, Tone::Friendly);
        assert!(prompt.contains("**CANDIDATE INSTRUCTIONS**:\nStress leadership."));
        assert!(!prompt.contains("TARGET POSITION"));
    }
}
