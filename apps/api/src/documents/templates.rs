//! Resume template catalogue and per-role template recommendation.

use serde::Serialize;

pub const DEFAULT_TEMPLATE: &str = "ats_professional";

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ResumeTemplate {
    pub name: &'static str,
    pub sections: &'static [&'static str],
    pub style: &'static str,
}

pub static TEMPLATES: [ResumeTemplate; 5] = [
    ResumeTemplate {
        name: DEFAULT_TEMPLATE,
        sections: &[
            "personal_info",
            "summary",
            "skills",
            "work_experience",
            "projects",
            "education",
            "certifications",
        ],
        style: "single-column plain text optimised for applicant tracking systems",
    },
    ResumeTemplate {
        name: "professional",
        sections: &["contact", "summary", "experience", "education", "skills", "certifications"],
        style: "clean and professional",
    },
    ResumeTemplate {
        name: "modern",
        sections: &["contact", "summary", "skills", "experience", "education", "projects"],
        style: "modern with emphasis on skills",
    },
    ResumeTemplate {
        name: "creative",
        sections: &["contact", "summary", "portfolio", "experience", "skills", "education"],
        style: "creative and visually appealing",
    },
    ResumeTemplate {
        name: "executive",
        sections: &["contact", "executive_summary", "key_achievements", "experience", "education"],
        style: "executive level with achievements focus",
    },
];

pub fn find_template(name: &str) -> Option<&'static ResumeTemplate> {
    TEMPLATES.iter().find(|t| t.name == name)
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateRecommendation {
    pub template: &'static str,
    pub description: &'static str,
    pub best_for: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleRecommendations {
    pub role: String,
    pub recommended: TemplateRecommendation,
    pub all_templates: &'static [ResumeTemplate],
}

/// Every role is steered to the ATS template; the rest are listed for choice.
pub fn recommend_for_role(role: &str) -> RoleRecommendations {
    RoleRecommendations {
        role: role.trim().to_string(),
        recommended: TemplateRecommendation {
            template: DEFAULT_TEMPLATE,
            description: "ATS-optimized professional format",
            best_for: "All roles - optimized for Applicant Tracking Systems",
        },
        all_templates: &TEMPLATES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_is_listed_first() {
        assert_eq!(TEMPLATES[0].name, DEFAULT_TEMPLATE);
        assert!(find_template("modern").is_some());
        assert!(find_template("fancy").is_none());
    }

    #[test]
    fn test_recommendation_payload() {
        let rec = recommend_for_role("  Data Scientist ");
        assert_eq!(rec.role, "Data Scientist");
        assert_eq!(rec.recommended.template, "ats_professional");
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["all_templates"].as_array().unwrap().len(), 5);
        assert_eq!(json["all_templates"][2]["sections"][2], "skills");
    }
}
