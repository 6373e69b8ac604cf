//! The profile snapshot that resume and cover-letter generation work from.

use crate::documents::cv_parser::{self, ParsedCv};
use crate::models::user::{EducationItem, ExperienceItem, User, UserProfile};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub linkedin_url: String,
    pub github_url: String,
    pub portfolio_url: String,
    pub bio: String,
    pub skills: Vec<String>,
    pub experience: Vec<ExperienceItem>,
    pub education: Vec<EducationItem>,
}

impl CandidateProfile {
    pub fn new(user: &User, profile: Option<&UserProfile>) -> Self {
        let mut candidate = CandidateProfile {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            ..Default::default()
        };
        if let Some(p) = profile {
            let text = |v: &Option<String>| v.clone().unwrap_or_default();
            candidate.phone = text(&p.phone);
            candidate.location = text(&p.location);
            candidate.linkedin_url = text(&p.linkedin_url);
            candidate.github_url = text(&p.github_url);
            candidate.portfolio_url = text(&p.portfolio_url);
            candidate.bio = text(&p.bio);
            candidate.skills = p.skills.clone();
            candidate.experience = p.experience.0.clone();
            candidate.education = p.education.0.clone();
        }
        candidate
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Copies CV data into fields the profile left empty. Populated fields win.
    pub fn fill_gaps_from_cv(&mut self, cv: &ParsedCv) {
        fn fill(target: &mut String, source: &str) {
            if target.trim().is_empty() && !source.trim().is_empty() {
                *target = source.trim().to_string();
            }
        }

        fill(&mut self.first_name, &cv.first_name);
        fill(&mut self.last_name, &cv.last_name);
        fill(&mut self.email, &cv.email);
        fill(&mut self.phone, &cv.phone);
        fill(&mut self.linkedin_url, &cv.linkedin_url);
        fill(&mut self.github_url, &cv.github_url);
        fill(&mut self.bio, &cv.bio);

        if self.skills.is_empty() {
            self.skills = cv.skills.clone();
        }
        if self.experience.is_empty() {
            self.experience = cv_parser::experience_entries(&cv.sections.experience);
        }
        if self.education.is_empty() {
            self.education = cv_parser::education_entries(&cv.sections.education);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::cv_parser::CvSections;

    fn candidate() -> CandidateProfile {
        CandidateProfile {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            skills: vec!["Rust".into()],
            ..Default::default()
        }
    }

    #[test]
    fn test_cv_fills_only_empty_fields() {
        let mut profile = candidate();
        let cv = ParsedCv {
            first_name: "Augusta".into(),
            phone: "+44 20 7946 0958".into(),
            bio: "Analyst.".into(),
            skills: vec!["Python".into()],
            sections: CvSections {
                experience: "Analyst\nBabbage & Co\n1842 - 1843".into(),
                ..Default::default()
            },
            ..Default::default()
        };

        profile.fill_gaps_from_cv(&cv);

        assert_eq!(profile.first_name, "Ada");
        assert_eq!(profile.phone, "+44 20 7946 0958");
        assert_eq!(profile.bio, "Analyst.");
        assert_eq!(profile.skills, vec!["Rust".to_string()]);
        assert_eq!(profile.experience.len(), 1);
        assert_eq!(profile.experience[0].company, "Babbage & Co");
        assert!(profile.education.is_empty());
    }

    #[test]
    fn test_full_name_trims_missing_parts() {
        let profile = CandidateProfile {
            first_name: "Ada".into(),
            ..Default::default()
        };
        assert_eq!(profile.full_name(), "Ada");
    }
}
