//! Result type returned by an evaluation.

use crate::prompts::EvaluationMode;
use serde::{Deserialize, Serialize};

/// Outcome of one evaluation action.
///
/// `text` is exactly what the provider returned. It is never trimmed,
/// parsed or scored; the other fields are bookkeeping for callers that
/// want to log or display them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub mode: EvaluationMode,
    /// Section heading for display ("Resume Evaluation" / "ATS Match Result").
    pub heading: String,
    /// Provider output, verbatim.
    pub text: String,
    pub provider: String,
    pub model: String,
    /// Pages in the uploaded resume; only the first was evaluated.
    pub source_pages: usize,
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
    pub preparation_duration_ms: u64,
    pub provider_duration_ms: u64,
    pub total_duration_ms: u64,
}

impl EvaluationResult {
    /// True when pages after the first were not evaluated.
    pub fn was_truncated(&self) -> bool {
        self.source_pages > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EvaluationResult {
        EvaluationResult {
            mode: EvaluationMode::MatchPercentage,
            heading: "ATS Match Result".into(),
            text: "  72%\n".into(),
            provider: "gemini".into(),
            model: "gemini-1.5-flash".into(),
            source_pages: 3,
            input_tokens: Some(1200),
            output_tokens: None,
            preparation_duration_ms: 80,
            provider_duration_ms: 2100,
            total_duration_ms: 2180,
        }
    }

    #[test]
    fn truncation_flag() {
        let mut r = sample();
        assert!(r.was_truncated());
        r.source_pages = 1;
        assert!(!r.was_truncated());
    }

    #[test]
    fn json_keeps_text_verbatim() {
        let r = sample();
        let json = serde_json::to_string(&r).unwrap();
        let back: EvaluationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.text, "  72%\n");
        assert!(json.contains("\"mode\":\"match_percentage\""));
    }
}
