//! Career recommendations from TF-IDF similarity between a user's skills and
//! each career's skill list, with skill-gap analysis and learning plans.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::career::data::{find_career, CareerPath, CAREER_PATHS};
use crate::ml::tfidf::{TfIdfBuilder, TfIdfModel, SKILL_TOKEN_PATTERN};

pub const DEFAULT_TOP_N: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillGaps {
    pub missing_required: Vec<String>,
    pub missing_optional: Vec<String>,
    pub matched_required: Vec<String>,
    pub matched_optional: Vec<String>,
    pub required_match_percentage: f64,
    pub total_match_percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareerRecommendation {
    pub role: String,
    pub category: String,
    pub similarity_score: f64,
    pub skill_match_percentage: f64,
    pub description: String,
    pub average_salary: String,
    pub growth_rate: String,
    pub required_skills: Vec<String>,
    pub optional_skills: Vec<String>,
    pub skill_gaps: SkillGaps,
    pub reasoning: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningPhase {
    pub phase: String,
    pub priority: String,
    pub skills: Vec<String>,
    pub timeline: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillPlan {
    pub career: String,
    pub category: String,
    pub current_match: String,
    pub skills_you_have: Vec<String>,
    pub skills_needed: Vec<String>,
    pub bonus_skills: Vec<String>,
    pub learning_path: Vec<LearningPhase>,
    pub estimated_time_to_ready: String,
}

/// Fitted once at startup and shared read-only across requests.
#[derive(Debug, Clone)]
pub struct CareerRecommender {
    model: TfIdfModel,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn lowered(skills: &[String]) -> HashSet<String> {
    skills.iter().map(|s| s.trim().to_lowercase()).collect()
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

impl CareerRecommender {
    pub fn new() -> Result<Self, regex::Error> {
        let mut builder = TfIdfBuilder::new(SKILL_TOKEN_PATTERN)?;
        for career in CAREER_PATHS {
            builder.add(career.all_skills().collect::<Vec<_>>().join(" "));
        }
        Ok(Self {
            model: builder.build(),
        })
    }

    /// Share of the career's required skills the user already has, 0-100.
    pub fn skill_match(user_skills: &[String], career_skills: &[&str]) -> f64 {
        let have = lowered(user_skills);
        let matched = career_skills
            .iter()
            .filter(|s| have.contains(&s.to_lowercase()))
            .count();
        percentage(matched, career_skills.len())
    }

    pub fn skill_gaps(user_skills: &[String], career: &CareerPath) -> SkillGaps {
        let have = lowered(user_skills);
        let split = |skills: &[&str]| -> (Vec<String>, Vec<String>) {
            let (matched, missing): (Vec<&str>, Vec<&str>) = skills
                .iter()
                .partition(|s| have.contains(&s.to_lowercase()));
            (
                matched.into_iter().map(String::from).collect(),
                missing.into_iter().map(String::from).collect(),
            )
        };

        let (matched_required, missing_required) = split(career.required_skills);
        let (matched_optional, missing_optional) = split(career.optional_skills);
        let total = career.required_skills.len() + career.optional_skills.len();

        SkillGaps {
            required_match_percentage: percentage(
                matched_required.len(),
                career.required_skills.len(),
            ),
            total_match_percentage: percentage(
                matched_required.len() + matched_optional.len(),
                total,
            ),
            missing_required,
            missing_optional,
            matched_required,
            matched_optional,
        }
    }

    /// Ranks careers by similarity to `skills` + `interests`, best first.
    pub fn recommend(
        &self,
        skills: &[String],
        interests: &[String],
        top_n: usize,
    ) -> Vec<CareerRecommendation> {
        let user_text = skills
            .iter()
            .chain(interests.iter())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        let similarities = self.model.similarities(&user_text);

        let mut recommendations: Vec<CareerRecommendation> = CAREER_PATHS
            .iter()
            .zip(similarities)
            .map(|(career, similarity)| {
                let skill_match = Self::skill_match(skills, career.required_skills);
                let gaps = Self::skill_gaps(skills, career);
                let reasoning = reasoning(career, &gaps, similarity);
                CareerRecommendation {
                    role: career.role.to_string(),
                    category: career.category.to_string(),
                    similarity_score: round2(similarity * 100.0),
                    skill_match_percentage: round2(skill_match),
                    description: career.description.to_string(),
                    average_salary: career.average_salary.to_string(),
                    growth_rate: career.growth_rate.to_string(),
                    required_skills: career.required_skills.iter().map(|s| s.to_string()).collect(),
                    optional_skills: career.optional_skills.iter().map(|s| s.to_string()).collect(),
                    skill_gaps: gaps,
                    reasoning,
                }
            })
            .collect();

        // Stable sort keeps catalogue order among ties.
        recommendations.sort_by(|a, b| {
            b.similarity_score
                .total_cmp(&a.similarity_score)
                .then(b.skill_match_percentage.total_cmp(&a.skill_match_percentage))
        });
        recommendations.truncate(top_n.clamp(1, CAREER_PATHS.len()));
        recommendations
    }

    /// Phased learning plan towards `target_role`; `None` when the role is unknown.
    pub fn skill_plan(&self, user_skills: &[String], target_role: &str) -> Option<SkillPlan> {
        let career = find_career(target_role)?;
        let gaps = Self::skill_gaps(user_skills, career);

        let mut learning_path = Vec::new();
        if !gaps.missing_required.is_empty() {
            learning_path.push(LearningPhase {
                phase: "Phase 1: Essential Skills".to_string(),
                priority: "High".to_string(),
                skills: gaps.missing_required.iter().take(5).cloned().collect(),
                timeline: "3-6 months".to_string(),
            });
        }
        if gaps.missing_required.len() > 5 {
            learning_path.push(LearningPhase {
                phase: "Phase 2: Core Competencies".to_string(),
                priority: "Medium".to_string(),
                skills: gaps.missing_required[5..].to_vec(),
                timeline: "6-12 months".to_string(),
            });
        }
        if !gaps.missing_optional.is_empty() {
            learning_path.push(LearningPhase {
                phase: "Phase 3: Advanced Skills".to_string(),
                priority: "Low".to_string(),
                skills: gaps.missing_optional.iter().take(5).cloned().collect(),
                timeline: "12+ months".to_string(),
            });
        }

        let mut skills_you_have = gaps.matched_required.clone();
        skills_you_have.extend(gaps.matched_optional.iter().cloned());

        Some(SkillPlan {
            career: career.role.to_string(),
            category: career.category.to_string(),
            current_match: format!("{:.1}%", gaps.required_match_percentage),
            skills_you_have,
            skills_needed: gaps.missing_required.clone(),
            bonus_skills: gaps.missing_optional.clone(),
            learning_path,
            estimated_time_to_ready: readiness(gaps.missing_required.len()).to_string(),
        })
    }
}

fn reasoning(career: &CareerPath, gaps: &SkillGaps, similarity: f64) -> String {
    let mut reasons: Vec<String> = Vec::new();

    reasons.push(
        if similarity > 0.7 {
            "Excellent fit based on your skills and interests"
        } else if similarity > 0.5 {
            "Good match for your profile"
        } else if similarity > 0.3 {
            "Potential career path with some skill development"
        } else {
            "Emerging opportunity requiring skill building"
        }
        .to_string(),
    );

    let matched = gaps.matched_required.len();
    if matched > 0 {
        reasons.push(format!(
            "You already have {matched} out of {} required skills ({:.0}%)",
            career.required_skills.len(),
            gaps.required_match_percentage
        ));
    }

    let first_three = gaps
        .missing_required
        .iter()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    match gaps.missing_required.len() {
        0 => reasons.push("You meet all required skill criteria!".to_string()),
        n if n <= 3 => reasons.push(format!("Focus on learning: {first_three}")),
        n => reasons.push(format!(
            "Need to develop {n} key skills including: {first_three}"
        )),
    }

    match career.growth_rate {
        "Very High" => reasons.push("High demand career with excellent growth prospects".to_string()),
        "High" => reasons.push("Strong job market demand".to_string()),
        _ => {}
    }

    format!("{}.", reasons.join(". "))
}

fn readiness(missing_required: usize) -> &'static str {
    match missing_required {
        0 => "You're ready now!",
        1..=3 => "3-6 months with focused learning",
        4..=7 => "6-12 months of dedicated study",
        _ => "12-18 months to build strong foundation",
    }
}
