//! Instruction templates for the two evaluation modes.
//!
//! Both prompts live here so they can be inspected by tests and changed in
//! one place. They are fixed at compile time; the job description is sent
//! alongside them, never spliced into them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Qualitative fit review, written from a hiring manager's perspective.
pub const REVIEW_PROMPT: &str = r#"
You are an experienced Technical Human Resource Manager. Your task is to review the provided resume against the job description.
Please share your professional evaluation on whether the candidate's profile aligns with the role.
Highlight the strengths and weaknesses of the applicant in relation to the specified job requirements.
"#;

/// Quantitative ATS scan: percentage, missing keywords, final thoughts.
pub const MATCH_PROMPT: &str = r#"
You are a skilled ATS (Applicant Tracking System) scanner with a deep understanding of data science and ATS functionality.
Your task is to evaluate the resume against the provided job description. Give me the percentage of match if the resume matches
the job description. First the output should come as percentage and then keywords missing and last final thoughts.
"#;

/// Which evaluation the user asked for.
///
/// The mode only selects the instruction text; both modes go through the
/// same preparation and invocation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMode {
    /// Strengths and weaknesses of the candidate for the role.
    Review,
    /// Match percentage, missing keywords, final thoughts.
    MatchPercentage,
}

impl EvaluationMode {
    pub const ALL: [EvaluationMode; 2] = [EvaluationMode::Review, EvaluationMode::MatchPercentage];

    /// The fixed instruction template for this mode.
    pub fn instruction(self) -> &'static str {
        match self {
            EvaluationMode::Review => REVIEW_PROMPT,
            EvaluationMode::MatchPercentage => MATCH_PROMPT,
        }
    }

    /// Section heading shown above the result.
    pub fn heading(self) -> &'static str {
        match self {
            EvaluationMode::Review => "Resume Evaluation",
            EvaluationMode::MatchPercentage => "ATS Match Result",
        }
    }
}

impl fmt::Display for EvaluationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EvaluationMode::Review => "review",
            EvaluationMode::MatchPercentage => "match",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_select_distinct_templates() {
        assert_ne!(
            EvaluationMode::Review.instruction(),
            EvaluationMode::MatchPercentage.instruction()
        );
        assert!(EvaluationMode::Review.instruction().contains("Human Resource Manager"));
        assert!(EvaluationMode::MatchPercentage.instruction().contains("percentage of match"));
    }

    #[test]
    fn headings() {
        assert_eq!(EvaluationMode::Review.heading(), "Resume Evaluation");
        assert_eq!(EvaluationMode::MatchPercentage.heading(), "ATS Match Result");
    }

    #[test]
    fn mode_serialises_snake_case() {
        let json = serde_json::to_string(&EvaluationMode::MatchPercentage).unwrap();
        assert_eq!(json, "\"match_percentage\"");
    }
}
