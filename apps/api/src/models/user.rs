use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
    Employer,
    Candidate,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::User, Role::Admin, Role::Employer, Role::Candidate];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Employer => "employer",
            Role::Candidate => "candidate",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == raw)
    }

    /// Admin accounts are provisioned out of band, never through sign-up.
    pub fn is_self_registrable(&self) -> bool {
        !matches!(self, Role::Admin)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// One entry of a profile's work history. Every field is optional on input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceItem {
    pub title: String,
    pub company: String,
    pub location: String,
    pub duration: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
    pub achievements: Vec<String>,
    pub technologies: Vec<String>,
}

impl ExperienceItem {
    /// Human-readable period: explicit duration, else "start - end".
    pub fn period(&self) -> String {
        if !self.duration.trim().is_empty() {
            return self.duration.clone();
        }
        match (self.start_date.trim(), self.end_date.trim()) {
            ("", "") => String::new(),
            (start, "") => format!("{start} - Present"),
            ("", end) => end.to_string(),
            (start, end) => format!("{start} - {end}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationItem {
    pub degree: String,
    pub institution: String,
    pub field: String,
    pub location: String,
    pub year: String,
    pub gpa: String,
    pub honors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
    pub skills: Vec<String>,
    pub experience: Json<Vec<ExperienceItem>>,
    pub education: Json<Vec<EducationItem>>,
    pub interests: Vec<String>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub target_role: Option<String>,
    pub theme_preference: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// A blank profile as created at sign-up.
    pub fn empty(user_id: Uuid) -> Self {
        let now = Utc::now();
        UserProfile {
            id: Uuid::new_v4(),
            user_id,
            bio: None,
            phone: None,
            location: None,
            avatar_url: None,
            skills: Vec::new(),
            experience: Json(Vec::new()),
            education: Json(Vec::new()),
            interests: Vec::new(),
            linkedin_url: None,
            github_url: None,
            portfolio_url: None,
            target_role: None,
            theme_preference: Theme::Light.as_str().to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A user together with their profile, as returned by `/me` and admin lookups.
#[derive(Debug, Clone, Serialize)]
pub struct UserWithProfile {
    #[serde(flatten)]
    pub user: User,
    pub profile: Option<UserProfile>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!(Role::parse("employer"), Some(Role::Employer));
        assert_eq!(Role::parse("Employer"), None);
        assert!(!Role::Admin.is_self_registrable());
        assert!(Role::Candidate.is_self_registrable());
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: "ada@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            role: "user".into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(user.full_name(), "Ada Lovelace");
    }

    #[test]
    fn test_experience_period() {
        let mut item = ExperienceItem {
            start_date: "2021".into(),
            ..Default::default()
        };
        assert_eq!(item.period(), "2021 - Present");
        item.end_date = "2023".into();
        assert_eq!(item.period(), "2021 - 2023");
        item.duration = "2 years".into();
        assert_eq!(item.period(), "2 years");
    }

    #[test]
    fn test_experience_item_tolerates_partial_input() {
        let item: ExperienceItem =
            serde_json::from_str(r#"{"title": "Engineer", "unknown": 3}"#).unwrap();
        assert_eq!(item.title, "Engineer");
        assert!(item.achievements.is_empty());
    }
}
