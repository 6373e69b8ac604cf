//! In-memory job board seeded with generated postings.
//!
//! Generation is deterministic for a given seed so ids and contents are stable
//! across restarts.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use tokio::sync::RwLock;
use tracing::info;

use crate::jobs::matcher::JobFilters;
use crate::models::job::Job;

const COMPANIES: &[(&str, &str)] = &[
    ("Google", "https://logo.clearbit.com/google.com"),
    ("Microsoft", "https://logo.clearbit.com/microsoft.com"),
    ("Amazon", "https://logo.clearbit.com/amazon.com"),
    ("Meta", "https://logo.clearbit.com/meta.com"),
    ("Apple", "https://logo.clearbit.com/apple.com"),
    ("Netflix", "https://logo.clearbit.com/netflix.com"),
    ("Tesla", "https://logo.clearbit.com/tesla.com"),
    ("Spotify", "https://logo.clearbit.com/spotify.com"),
    ("Airbnb", "https://logo.clearbit.com/airbnb.com"),
    ("Uber", "https://logo.clearbit.com/uber.com"),
    ("LinkedIn", "https://logo.clearbit.com/linkedin.com"),
    ("Salesforce", "https://logo.clearbit.com/salesforce.com"),
    ("Adobe", "https://logo.clearbit.com/adobe.com"),
    ("IBM", "https://logo.clearbit.com/ibm.com"),
    ("Oracle", "https://logo.clearbit.com/oracle.com"),
    ("Nvidia", "https://logo.clearbit.com/nvidia.com"),
    ("Intel", "https://logo.clearbit.com/intel.com"),
    ("Cisco", "https://logo.clearbit.com/cisco.com"),
    ("Shopify", "https://logo.clearbit.com/shopify.com"),
    ("Stripe", "https://logo.clearbit.com/stripe.com"),
];

const LOCATIONS: &[&str] = &[
    "San Francisco, CA",
    "New York, NY",
    "Seattle, WA",
    "Austin, TX",
    "Boston, MA",
    "Chicago, IL",
    "Los Angeles, CA",
    "Denver, CO",
    "Remote",
    "Hybrid - San Francisco",
    "Hybrid - New York",
];

const JOB_TYPES: &[&str] = &["Full-time", "Full-time", "Full-time", "Contract"];
const EXPERIENCE_LEVELS: &[&str] = &["Entry", "Mid", "Senior", "Lead"];

const BENEFITS: &[&str] = &[
    "Health insurance",
    "401(k) matching",
    "Flexible PTO",
    "Remote work options",
    "Professional development budget",
    "Stock options",
];

const SKILLS_PER_JOB: usize = 6;

/// One family of related roles and the text used to describe them.
struct RoleFamily {
    titles: &'static [&'static str],
    skills: &'static [&'static str],
    requirements: &'static [&'static str],
    responsibilities: &'static [&'static str],
}

fn describe(family_key: usize, title: &str, company: &str) -> String {
    match family_key {
        0 => format!(
            "{company} is seeking a talented {title} to join our growing engineering team. You will work on building scalable systems that serve millions of users worldwide.\n\n\
             We're looking for someone passionate about clean code, system design, and delivering high-quality software. You'll collaborate with cross-functional teams to ship features that make a real impact.\n\n\
             This is an excellent opportunity to work with cutting-edge technologies and grow your skills in a supportive, innovative environment."
        ),
        1 => format!(
            "Join {company} as a {title} and help us leverage data to drive business decisions. You'll build machine learning models, analyze complex datasets, and create insights that shape product strategy.\n\n\
             We're looking for someone with strong analytical skills and a passion for solving challenging problems with data. You'll work with large-scale datasets and state-of-the-art ML tools.\n\n\
             This role offers the opportunity to work on impactful projects and collaborate with talented data scientists and engineers."
        ),
        2 => format!(
            "{company} is looking for an experienced {title} to lead product initiatives and drive strategy. You'll work closely with engineering, design, and business teams to build products users love.\n\n\
             We need someone who can balance user needs with business goals, make data-driven decisions, and communicate effectively with stakeholders at all levels.\n\n\
             This is a high-impact role where you'll shape the future of our products and mentor junior team members."
        ),
        3 => format!(
            "As a {title} at {company}, you'll build and maintain the infrastructure that powers our services. You'll work on automation, monitoring, and ensuring our systems are reliable and scalable.\n\n\
             We're looking for someone with strong technical skills and a passion for improving developer productivity. You'll implement CI/CD pipelines, manage cloud infrastructure, and respond to incidents.\n\n\
             This role offers the opportunity to work with modern DevOps tools and practices in a fast-paced environment."
        ),
        _ => format!(
            "{company} is hiring a {title} to help protect our systems and data. You'll identify vulnerabilities, implement security controls, and ensure we follow best practices.\n\n\
             We need someone with deep security knowledge and the ability to think like an attacker. You'll conduct security assessments, respond to incidents, and work with teams across the company.\n\n\
             This is a critical role where you'll help keep our users' data safe and secure."
        ),
    }
}

const ROLE_FAMILIES: &[RoleFamily] = &[
    RoleFamily {
        titles: &[
            "Software Engineer",
            "Senior Software Engineer",
            "Staff Software Engineer",
            "Backend Engineer",
            "Frontend Engineer",
            "Full Stack Engineer",
        ],
        skills: &[
            "Python", "Java", "JavaScript", "TypeScript", "React", "Node.js", "SQL", "Git", "AWS",
            "Docker",
        ],
        requirements: &[
            "3+ years of software development experience",
            "Strong programming skills in Python, Java, or JavaScript",
            "Experience with web frameworks and APIs",
            "Understanding of data structures and algorithms",
            "Experience with Git and version control",
            "Bachelor's degree in Computer Science or related field",
        ],
        responsibilities: &[
            "Design and implement scalable backend services",
            "Write clean, maintainable, and well-tested code",
            "Collaborate with product and design teams",
            "Participate in code reviews and technical discussions",
            "Debug and resolve production issues",
            "Contribute to technical documentation",
        ],
    },
    RoleFamily {
        titles: &[
            "Data Scientist",
            "Senior Data Scientist",
            "Machine Learning Engineer",
            "AI Engineer",
            "Data Analyst",
            "ML Research Scientist",
        ],
        skills: &[
            "Python", "R", "Machine Learning", "Deep Learning", "TensorFlow", "PyTorch", "SQL",
            "Pandas", "NumPy", "Statistics",
        ],
        requirements: &[
            "2+ years of data science or ML experience",
            "Strong programming skills in Python or R",
            "Experience with ML frameworks (TensorFlow, PyTorch, scikit-learn)",
            "Solid understanding of statistics and probability",
            "Experience with SQL and data manipulation",
            "Master's degree in Computer Science, Statistics, or related field",
        ],
        responsibilities: &[
            "Build and deploy machine learning models",
            "Analyze complex datasets to extract insights",
            "Develop data pipelines and workflows",
            "Collaborate with engineering teams on model integration",
            "Present findings to stakeholders",
            "Stay current with latest ML research and techniques",
        ],
    },
    RoleFamily {
        titles: &[
            "Product Manager",
            "Senior Product Manager",
            "Product Designer",
            "UX Designer",
            "UI/UX Designer",
            "Product Lead",
        ],
        skills: &[
            "Product Strategy", "User Research", "Agile", "Jira", "Roadmapping", "Analytics",
            "Figma", "Stakeholder Management",
        ],
        requirements: &[
            "4+ years of product management experience",
            "Track record of shipping successful products",
            "Strong analytical and problem-solving skills",
            "Excellent communication and stakeholder management",
            "Experience with Agile methodologies",
            "Bachelor's degree in relevant field",
        ],
        responsibilities: &[
            "Define product vision and strategy",
            "Prioritize features and manage roadmap",
            "Work with design to create user-centric solutions",
            "Analyze metrics and user feedback",
            "Communicate with stakeholders and executives",
            "Lead cross-functional product initiatives",
        ],
    },
    RoleFamily {
        titles: &[
            "DevOps Engineer",
            "Site Reliability Engineer",
            "Cloud Engineer",
            "Infrastructure Engineer",
            "Platform Engineer",
        ],
        skills: &[
            "Kubernetes", "Docker", "AWS", "Azure", "Terraform", "CI/CD", "Jenkins", "Monitoring",
            "Linux", "Python",
        ],
        requirements: &[
            "3+ years of DevOps or SRE experience",
            "Strong knowledge of cloud platforms (AWS, Azure, or GCP)",
            "Experience with containerization (Docker, Kubernetes)",
            "Proficiency in scripting (Python, Bash, or Go)",
            "Understanding of CI/CD pipelines and automation",
            "Experience with monitoring and logging tools",
        ],
        responsibilities: &[
            "Manage cloud infrastructure and services",
            "Implement CI/CD pipelines and automation",
            "Monitor system performance and reliability",
            "Respond to incidents and outages",
            "Optimize infrastructure costs and performance",
            "Collaborate with development teams",
        ],
    },
    RoleFamily {
        titles: &[
            "Security Engineer",
            "Security Analyst",
            "Cybersecurity Specialist",
            "Application Security Engineer",
            "Security Architect",
        ],
        skills: &[
            "Security Analysis", "Penetration Testing", "SIEM", "Vulnerability Assessment",
            "Cloud Security", "Python", "Networking",
        ],
        requirements: &[
            "3+ years of security engineering experience",
            "Strong understanding of security principles and best practices",
            "Experience with security tools and frameworks",
            "Knowledge of common vulnerabilities (OWASP Top 10)",
            "Experience with penetration testing or security assessments",
            "Relevant security certifications preferred (CISSP, CEH, etc.)",
        ],
        responsibilities: &[
            "Conduct security assessments and penetration tests",
            "Implement security controls and best practices",
            "Monitor for security threats and incidents",
            "Respond to security incidents and vulnerabilities",
            "Develop security policies and procedures",
            "Train teams on security awareness",
        ],
    },
];

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn work_type_for(location: &str) -> &'static str {
    if location.contains("Remote") {
        "Remote"
    } else if location.contains("Hybrid") {
        "Hybrid"
    } else {
        "On-site"
    }
}

/// Generates `count` postings with ids `1..=count`.
pub fn generate_jobs(count: usize, seed: u64, now: DateTime<Utc>) -> Vec<Job> {
    let mut rng = StdRng::seed_from_u64(seed);

    (1..=count)
        .map(|id| {
            let family_key = rng.gen_range(0..ROLE_FAMILIES.len());
            let family = &ROLE_FAMILIES[family_key];
            let (company, logo) = COMPANIES[rng.gen_range(0..COMPANIES.len())];
            let title = family.titles[rng.gen_range(0..family.titles.len())];
            let location = LOCATIONS[rng.gen_range(0..LOCATIONS.len())];
            let job_type = JOB_TYPES[rng.gen_range(0..JOB_TYPES.len())];
            let experience_level = EXPERIENCE_LEVELS[rng.gen_range(0..EXPERIENCE_LEVELS.len())];
            let salary_min = rng.gen_range(80..=150) * 1000;
            let salary_max = rng.gen_range(150..=250) * 1000;
            let skills: Vec<String> = family
                .skills
                .choose_multiple(&mut rng, SKILLS_PER_JOB.min(family.skills.len()))
                .map(|s| s.to_string())
                .collect();
            let listing = rng.gen_range(1_000_000..=9_999_999);
            let posted_days_ago = rng.gen_range(0..=30);
            let deadline_days = rng.gen_range(14..=60);

            Job {
                id: id as i32,
                title: title.to_string(),
                company: company.to_string(),
                company_logo: logo.to_string(),
                location: location.to_string(),
                work_type: work_type_for(location).to_string(),
                job_type: job_type.to_string(),
                experience_level: experience_level.to_string(),
                salary_min,
                salary_max,
                description: describe(family_key, title, company),
                requirements: to_strings(family.requirements),
                responsibilities: to_strings(family.responsibilities),
                skills_required: skills,
                benefits: to_strings(BENEFITS),
                source: "LinkedIn".to_string(),
                source_url: format!("https://linkedin.com/jobs/{listing}"),
                posted_date: now - Duration::days(posted_days_ago),
                application_deadline: now + Duration::days(deadline_days),
                is_active: true,
            }
        })
        .collect()
}

/// Shared, lazily filled set of postings.
#[derive(Clone)]
pub struct JobBoard {
    jobs: Arc<RwLock<Vec<Job>>>,
    count: usize,
    seed: u64,
}

/// Result of `JobBoard::initialize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seeded {
    Created(usize),
    AlreadyPresent(usize),
}

impl JobBoard {
    pub fn new(count: usize, seed: u64) -> Self {
        Self {
            jobs: Arc::new(RwLock::new(Vec::new())),
            count,
            seed,
        }
    }

    /// Fills the board when it is empty; otherwise leaves it untouched.
    pub async fn initialize(&self) -> Seeded {
        let mut jobs = self.jobs.write().await;
        if !jobs.is_empty() {
            return Seeded::AlreadyPresent(jobs.len());
        }
        *jobs = generate_jobs(self.count, self.seed, Utc::now());
        info!("Seeded job board with {} postings", jobs.len());
        Seeded::Created(jobs.len())
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn get(&self, id: i32) -> Option<Job> {
        self.jobs.read().await.iter().find(|j| j.id == id).cloned()
    }

    /// Active postings that pass `filters`.
    pub async fn active(&self, filters: &JobFilters) -> Vec<Job> {
        self.jobs
            .read()
            .await
            .iter()
            .filter(|j| j.is_active && filters.matches(j))
            .cloned()
            .collect()
    }

    /// Case-insensitive text search over title, description and company,
    /// newest first. Returns one page and the total number of hits.
    pub async fn search(
        &self,
        query: Option<&str>,
        filters: &JobFilters,
        limit: usize,
        offset: usize,
    ) -> (Vec<Job>, usize) {
        let needle = query
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());

        let mut hits: Vec<Job> = self
            .active(filters)
            .await
            .into_iter()
            .filter(|job| match &needle {
                Some(q) => {
                    job.title.to_lowercase().contains(q)
                        || job.description.to_lowercase().contains(q)
                        || job.company.to_lowercase().contains(q)
                }
                None => true,
            })
            .collect();
        hits.sort_by(|a, b| b.posted_date.cmp(&a.posted_date).then(a.id.cmp(&b.id)));

        let total = hits.len();
        let page = hits.into_iter().skip(offset).take(limit).collect();
        (page, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_is_deterministic_for_a_seed() {
        let now = Utc::now();
        let a = generate_jobs(20, 7, now);
        let b = generate_jobs(20, 7, now);
        assert_eq!(a, b);
        assert_ne!(a, generate_jobs(20, 8, now));
    }

    #[test]
    fn test_generated_fields_are_consistent() {
        let now = Utc::now();
        for job in generate_jobs(100, 42, now) {
            assert_eq!(job.work_type, work_type_for(&job.location));
            assert_eq!(job.skills_required.len(), 6);
            assert!((80_000..=150_000).contains(&job.salary_min));
            assert!((150_000..=250_000).contains(&job.salary_max));
            assert!(job.posted_date <= now && job.application_deadline > now);
            assert!(job.description.contains(&job.company));
            assert_eq!(job.benefits.len(), 6);
        }
    }

    #[test]
    fn test_work_type_derivation() {
        assert_eq!(work_type_for("Remote"), "Remote");
        assert_eq!(work_type_for("Hybrid - New York"), "Hybrid");
        assert_eq!(work_type_for("Austin, TX"), "On-site");
    }

    #[tokio::test]
    async fn test_initialize_only_fills_an_empty_board() {
        let board = JobBoard::new(10, 1);
        assert_eq!(board.initialize().await, Seeded::Created(10));
        assert_eq!(board.initialize().await, Seeded::AlreadyPresent(10));
        assert_eq!(board.len().await, 10);
        assert!(board.get(10).await.is_some());
        assert!(board.get(11).await.is_none());
    }

    #[tokio::test]
    async fn test_search_pages_newest_first() {
        let board = JobBoard::new(30, 3);
        board.initialize().await;
        let (page, total) = board.search(None, &JobFilters::default(), 10, 5).await;
        assert_eq!(total, 30);
        assert_eq!(page.len(), 10);
        assert!(page.windows(2).all(|w| w[0].posted_date >= w[1].posted_date));

        let (hits, total) = board
            .search(Some("ENGINEER"), &JobFilters::default(), 100, 0)
            .await;
        assert_eq!(hits.len(), total);
        assert!(hits.iter().all(|j| {
            let text = format!("{} {} {}", j.title, j.description, j.company).to_lowercase();
            text.contains("engineer")
        }));
    }
}
