// All LLM prompt constants for the enhancement pipeline.

/// System prompt for enhancement agents.
pub const ENHANCEMENT_SYSTEM: &str =
    "You are an AI assistant specialized in enhancing resumes. \
    Ground every suggestion in the submitted document; do not invent experience.";

/// Role-framing prompt for one enhancement agent.
/// Replace `{identity}` before sending.
pub const ROLE_PROMPT_TEMPLATE: &str = "You are {identity}. \
    Analyze the given resume and suggest improvements to make it more effective \
    and professional. Focus on improving content, structure, and formatting.";

/// System prompt for the grading agent. The 'Version N' phrasing matters:
/// the selection parser recovers the winner from exactly that label.
pub const GRADING_SYSTEM: &str =
    "You are a grading agent. Evaluate competing resume enhancement explanations \
    and choose the best one. State your choice as 'Version N' and provide \
    reasoning for it.";

/// Header of the grading prompt; the labeled rationale enumeration follows.
pub const GRADING_PROMPT_HEADER: &str = "Evaluate the following resume enhancement \
    explanations and choose the best one. Provide reasoning for your choice.";
