//! Partial profile updates.
//!
//! A `ProfileUpdate` only touches the fields present in the request body.
//! Text fields sent as an empty string are cleared.

use serde::Deserialize;

use crate::errors::AppError;
use crate::models::user::{EducationItem, ExperienceItem, Theme, User, UserProfile};
use sqlx::types::Json;

#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
    pub skills: Option<Vec<String>>,
    pub experience: Option<Vec<ExperienceItem>>,
    pub education: Option<Vec<EducationItem>>,
    pub interests: Option<Vec<String>>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub target_role: Option<String>,
    pub theme_preference: Option<String>,
}

fn optional_text(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Trims entries, drops blanks and case-insensitive duplicates, keeps order.
pub fn clean_list(values: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && seen.insert(v.to_lowercase()))
        .collect()
}

impl ProfileUpdate {
    /// Validates the whole update before mutating anything.
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(theme) = &self.theme_preference {
            if Theme::parse(theme).is_none() {
                return Err(AppError::UnprocessableEntity(
                    "Theme must be 'light' or 'dark'".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn apply(self, user: &mut User, profile: &mut UserProfile) -> Result<(), AppError> {
        self.validate()?;

        if let Some(first_name) = self.first_name {
            user.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = self.last_name {
            user.last_name = last_name.trim().to_string();
        }
        if let Some(bio) = self.bio {
            profile.bio = optional_text(bio);
        }
        if let Some(phone) = self.phone {
            profile.phone = optional_text(phone);
        }
        if let Some(location) = self.location {
            profile.location = optional_text(location);
        }
        if let Some(avatar_url) = self.avatar_url {
            profile.avatar_url = optional_text(avatar_url);
        }
        if let Some(skills) = self.skills {
            profile.skills = clean_list(skills);
        }
        if let Some(experience) = self.experience {
            profile.experience = Json(experience);
        }
        if let Some(education) = self.education {
            profile.education = Json(education);
        }
        if let Some(interests) = self.interests {
            profile.interests = clean_list(interests);
        }
        if let Some(url) = self.linkedin_url {
            profile.linkedin_url = optional_text(url);
        }
        if let Some(url) = self.github_url {
            profile.github_url = optional_text(url);
        }
        if let Some(url) = self.portfolio_url {
            profile.portfolio_url = optional_text(url);
        }
        if let Some(target_role) = self.target_role {
            profile.target_role = optional_text(target_role);
        }
        if let Some(theme) = self.theme_preference {
            profile.theme_preference = theme;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn make_user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: "ada@example.com".into(),
            password_hash: String::new(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            role: "user".into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_partial_update_leaves_other_fields_alone() {
        let mut user = make_user();
        let mut profile = UserProfile::empty(user.id);
        profile.bio = Some("Original bio".into());
        profile.skills = vec!["Rust".into()];

        let update: ProfileUpdate =
            serde_json::from_str(r#"{"location": "Berlin", "interests": ["AI"]}"#).unwrap();
        update.apply(&mut user, &mut profile).unwrap();

        assert_eq!(profile.location.as_deref(), Some("Berlin"));
        assert_eq!(profile.interests, vec!["AI".to_string()]);
        assert_eq!(profile.bio.as_deref(), Some("Original bio"));
        assert_eq!(profile.skills, vec!["Rust".to_string()]);
        assert_eq!(user.first_name, "Ada");
    }

    #[test]
    fn test_profile_round_trips_through_json() {
        let mut user = make_user();
        let mut profile = UserProfile::empty(user.id);
        let update: ProfileUpdate = serde_json::from_str(
            r#"{
                "first_name": "Grace",
                "bio": "Compiler pioneer",
                "skills": ["COBOL", "Compilers"],
                "experience": [{"title": "Rear Admiral", "company": "US Navy", "achievements": ["A-0"]}],
                "education": [{"degree": "PhD", "institution": "Yale", "year": "1934"}],
                "theme_preference": "dark"
            }"#,
        )
        .unwrap();
        update.apply(&mut user, &mut profile).unwrap();

        let stored = serde_json::to_string(&profile).unwrap();
        let reloaded: UserProfile = serde_json::from_str(&stored).unwrap();

        assert_eq!(reloaded.bio, profile.bio);
        assert_eq!(reloaded.skills, profile.skills);
        assert_eq!(reloaded.experience.0, profile.experience.0);
        assert_eq!(reloaded.education.0[0].institution, "Yale");
        assert_eq!(reloaded.theme_preference, "dark");
        assert_eq!(user.first_name, "Grace");
    }

    #[test]
    fn test_invalid_theme_is_rejected_without_side_effects() {
        let mut user = make_user();
        let mut profile = UserProfile::empty(user.id);
        let update = ProfileUpdate {
            bio: Some("changed".into()),
            theme_preference: Some("sepia".into()),
            ..Default::default()
        };
        let result = update.apply(&mut user, &mut profile);

        assert!(matches!(result, Err(AppError::UnprocessableEntity(_))));
        assert!(profile.bio.is_none());
        assert_eq!(profile.theme_preference, "light");
    }

    #[test]
    fn test_empty_strings_clear_text_fields() {
        let mut user = make_user();
        let mut profile = UserProfile::empty(user.id);
        profile.phone = Some("555-0100".into());
        let update = ProfileUpdate {
            phone: Some("   ".into()),
            ..Default::default()
        };
        update.apply(&mut user, &mut profile).unwrap();
        assert!(profile.phone.is_none());
    }

    #[test]
    fn test_clean_list_dedupes_case_insensitively() {
        let cleaned = clean_list(vec![
            " Python ".into(),
            "python".into(),
            "".into(),
            "SQL".into(),
        ]);
        assert_eq!(cleaned, vec!["Python".to_string(), "SQL".to_string()]);
    }
}
