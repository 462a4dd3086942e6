//! Evaluation invocation: one instruction, one page image, one provider call.
//!
//! The instruction is chosen by [`EvaluationMode`]; the job description is
//! passed through untouched, even when empty. Whatever text the provider
//! returns is handed back as-is. There is no retry and no post-processing;
//! a failed call fails the action.

use crate::config::EvaluationConfig;
use crate::error::HireMeterError;
use crate::pipeline::encode::EncodedPayload;
use crate::prompts::EvaluationMode;
use crate::provider::{EvaluationProvider, EvaluationRequest, ProviderResponse};
use std::time::Instant;
use tracing::{debug, warn};

/// Build the provider request for `mode`.
pub fn build_request(
    mode: EvaluationMode,
    payload: &EncodedPayload,
    context: &str,
    config: &EvaluationConfig,
) -> EvaluationRequest {
    EvaluationRequest {
        instruction: mode.instruction().to_string(),
        payload: payload.clone(),
        context: context.to_string(),
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    }
}

/// Send exactly one request to `provider`.
pub async fn invoke(
    provider: &dyn EvaluationProvider,
    mode: EvaluationMode,
    payload: &EncodedPayload,
    context: &str,
    config: &EvaluationConfig,
) -> Result<ProviderResponse, HireMeterError> {
    if payload.is_empty() {
        return Err(HireMeterError::EmptyPayload);
    }

    let request = build_request(mode, payload, context, config);
    let start = Instant::now();

    match provider.complete(&request).await {
        Ok(response) => {
            debug!(
                "{} ({} / {}): {:?} input tokens, {:?} output tokens, {:?}",
                mode,
                provider.name(),
                provider.model(),
                response.input_tokens,
                response.output_tokens,
                start.elapsed()
            );
            Ok(response)
        }
        Err(e) => {
            warn!("{} via {} failed: {}", mode, provider.name(), e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        seen: Mutex<Vec<EvaluationRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl EvaluationProvider for Recording {
        fn name(&self) -> &str {
            "recording"
        }
        fn model(&self) -> &str {
            "rec-1"
        }
        async fn complete(&self, request: &EvaluationRequest) -> Result<ProviderResponse, HireMeterError> {
            self.seen.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(HireMeterError::ProviderFailed {
                    provider: "recording".into(),
                    message: "quota exceeded".into(),
                });
            }
            Ok(ProviderResponse {
                text: "\n 85% match \n".into(),
                ..Default::default()
            })
        }
    }

    fn payload() -> EncodedPayload {
        EncodedPayload::from_jpeg_bytes(b"\xFF\xD8\xFF\xE0jpeg")
    }

    #[tokio::test]
    async fn one_call_with_mode_instruction() {
        let provider = Recording::default();
        let config = EvaluationConfig::default();

        let out = invoke(&provider, EvaluationMode::MatchPercentage, &payload(), "Go developer", &config)
            .await
            .unwrap();

        assert_eq!(out.text, "\n 85% match \n");
        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].instruction, EvaluationMode::MatchPercentage.instruction());
        assert_eq!(seen[0].context, "Go developer");
        assert_eq!(seen[0].payload, payload());
    }

    #[tokio::test]
    async fn empty_context_still_calls() {
        let provider = Recording::default();
        invoke(&provider, EvaluationMode::Review, &payload(), "", &EvaluationConfig::default())
            .await
            .unwrap();
        assert_eq!(provider.seen.lock().unwrap()[0].context, "");
    }

    #[tokio::test]
    async fn empty_payload_is_rejected_before_calling() {
        let provider = Recording::default();
        let empty = EncodedPayload::from_jpeg_bytes(b"");
        let err = invoke(&provider, EvaluationMode::Review, &empty, "jd", &EvaluationConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, HireMeterError::EmptyPayload));
        assert!(provider.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failure_is_not_retried() {
        let provider = Recording {
            fail: true,
            ..Default::default()
        };
        let err = invoke(&provider, EvaluationMode::Review, &payload(), "jd", &EvaluationConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, HireMeterError::ProviderFailed { .. }));
        assert_eq!(provider.seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn invoke_from_sync_code() {
        let provider = Recording::default();
        let out = tokio_test::block_on(invoke(
            &provider,
            EvaluationMode::Review,
            &payload(),
            "jd",
            &EvaluationConfig::default(),
        ))
        .unwrap();
        assert_eq!(out.text, "\n 85% match \n");
    }

    #[test]
    fn request_carries_sampling_options() {
        let config = EvaluationConfig::builder()
            .temperature(0.4)
            .max_tokens(1024)
            .build()
            .unwrap();
        let req = build_request(EvaluationMode::Review, &payload(), "jd", &config);
        assert_eq!(req.temperature, Some(0.4));
        assert_eq!(req.max_tokens, Some(1024));
        assert_eq!(req.instruction, EvaluationMode::Review.instruction());
    }
}
