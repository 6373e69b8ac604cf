// ATS resume and cover letter generation, CV parsing, keyword analysis and
// the versioned document store behind the /api/documents handlers.

pub mod ats;
pub mod candidate;
pub mod cover_letter;
pub mod cv_parser;
pub mod handlers;
pub mod keywords;
pub mod prompts;
pub mod schema;
pub mod templates;
pub mod versioning;
