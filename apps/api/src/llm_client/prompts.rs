// Shared prompt constants.
// Each generator that needs LLM calls builds its own prompts alongside it
// (see documents/prompts.rs). This file holds the cross-cutting fragments.

/// System prompt for resume generation.
pub const RESUME_WRITER_SYSTEM: &str = "You are an expert ATS resume writer. \
    Output only valid JSON, no additional text.";

/// System prompt for cover letter generation.
pub const COVER_LETTER_SYSTEM: &str = "You are a professional cover letter writer. \
    Create ATS-friendly, professional cover letters without emojis or special formatting.";

/// Instruction appended to every generation prompt.
pub const ATS_TEXT_RULES: &str = "\
    Use plain ASCII text only: no emojis, icons, tables, columns or decorative symbols. \
    Use standard section names and simple hyphen bullets. \
    Never invent employers, degrees, dates or certifications that are not in the profile.";
