//! The external text-generation provider, behind one trait.
//!
//! [`EvaluationProvider`] is the only way the library talks to a language
//! model. Two adapters ship with the crate:
//!
//! * [`gemini::GeminiProvider`]: direct REST client for Google's Gemini
//!   `generateContent` endpoint. Takes its API key as a constructor argument.
//! * [`edgequake::EdgequakeProvider`]: wraps any `edgequake-llm` provider
//!   (OpenAI, Anthropic, Ollama, Mistral, …).
//!
//! Neither adapter retries, caches or rate-limits: one call in, one call out.

pub mod edgequake;
pub mod gemini;

use crate::config::EvaluationConfig;
use crate::error::HireMeterError;
use crate::pipeline::encode::EncodedPayload;
use async_trait::async_trait;
use edgequake_llm::ProviderFactory;
use std::sync::Arc;
use tracing::debug;

pub use edgequake::EdgequakeProvider;
pub use gemini::GeminiProvider;

/// Everything a provider needs for one evaluation.
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    /// Fixed instruction template for the requested mode.
    pub instruction: String,
    /// First page of the resume.
    pub payload: EncodedPayload,
    /// Job description. May be empty.
    pub context: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<usize>,
}

/// Raw provider output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderResponse {
    pub text: String,
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
}

/// A text-generation service that can look at one image.
#[async_trait]
pub trait EvaluationProvider: Send + Sync {
    /// Short provider name for logs and results, e.g. "gemini".
    fn name(&self) -> &str;

    /// Model identifier in use.
    fn model(&self) -> &str;

    /// Send one request and return the provider's text.
    async fn complete(&self, request: &EvaluationRequest) -> Result<ProviderResponse, HireMeterError>;
}

/// Default vision model for a provider name, if we know one.
pub fn default_model_for(provider: &str) -> Option<&'static str> {
    match provider {
        "gemini" => Some(gemini::DEFAULT_MODEL),
        "openai" | "azure" => Some("gpt-4.1-nano"),
        "anthropic" => Some("claude-sonnet-4-20250514"),
        "mistral" => Some("pixtral-12b-2409"),
        "ollama" | "lmstudio" => Some("llava"),
        _ => None,
    }
}

/// Resolve the provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`): used as-is.
/// 2. **Named provider** (`config.provider_name`): `"gemini"` builds a
///    [`GeminiProvider`] from `config.api_key`; any other name goes through
///    [`ProviderFactory::create_llm_provider`], which reads that provider's
///    own key variable.
/// 3. **API key only**: a configured key with no name means Gemini.
/// 4. **Auto-detection**: [`ProviderFactory::from_env`].
pub fn resolve_provider(
    config: &EvaluationConfig,
) -> Result<Arc<dyn EvaluationProvider>, HireMeterError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let name = name.trim().to_ascii_lowercase();
        if name == "gemini" {
            return gemini_from_config(config).map(|p| Arc::new(p) as Arc<dyn EvaluationProvider>);
        }
        let model = match config.model.as_deref().or_else(|| default_model_for(&name)) {
            Some(m) => m.to_string(),
            None => {
                return Err(HireMeterError::ProviderNotConfigured {
                    provider: name,
                    hint: "No default vision model is known for this provider; set a model.".into(),
                })
            }
        };
        let inner = ProviderFactory::create_llm_provider(&name, &model).map_err(|e| {
            HireMeterError::ProviderNotConfigured {
                provider: name.clone(),
                hint: format!("{e}"),
            }
        })?;
        debug!("Using {} / {} via edgequake-llm", name, model);
        return Ok(Arc::new(EdgequakeProvider::new(inner, name, model)));
    }

    if config.api_key.is_some() {
        return gemini_from_config(config).map(|p| Arc::new(p) as Arc<dyn EvaluationProvider>);
    }

    let (inner, _embedding) =
        ProviderFactory::from_env().map_err(|e| HireMeterError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected.\n\
                 Set GOOGLE_API_KEY (Gemini), OPENAI_API_KEY or ANTHROPIC_API_KEY.\n\
                 Error: {}",
                e
            ),
        })?;
    let model = config.model.clone().unwrap_or_else(|| "auto".to_string());
    Ok(Arc::new(EdgequakeProvider::new(inner, "auto", model)))
}

fn gemini_from_config(config: &EvaluationConfig) -> Result<GeminiProvider, HireMeterError> {
    let key = config
        .api_key
        .as_deref()
        .ok_or_else(|| HireMeterError::ProviderNotConfigured {
            provider: "gemini".into(),
            hint: "Set GOOGLE_API_KEY or pass --api-key <KEY>.".into(),
        })?;
    let model = config.model.as_deref().unwrap_or(gemini::DEFAULT_MODEL);
    Ok(GeminiProvider::new(key, model)?.with_base_url(&config.api_base_url))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    #[async_trait]
    impl EvaluationProvider for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }
        fn model(&self) -> &str {
            "fixed-1"
        }
        async fn complete(&self, _r: &EvaluationRequest) -> Result<ProviderResponse, HireMeterError> {
            Ok(ProviderResponse::default())
        }
    }

    #[test]
    fn prebuilt_provider_wins() {
        let config = EvaluationConfig::builder()
            .provider(Arc::new(Fixed))
            .provider_name("gemini")
            .build()
            .unwrap();
        let p = resolve_provider(&config).unwrap();
        assert_eq!(p.name(), "fixed");
    }

    #[test]
    fn gemini_requires_key() {
        let config = EvaluationConfig::builder()
            .provider_name("gemini")
            .build()
            .unwrap();
        let err = resolve_provider(&config).err().unwrap();
        assert!(matches!(err, HireMeterError::ProviderNotConfigured { .. }));
        assert!(err.to_string().contains("GOOGLE_API_KEY"));
    }

    #[test]
    fn api_key_alone_selects_gemini() {
        let config = EvaluationConfig::builder().api_key("k").build().unwrap();
        let p = resolve_provider(&config).unwrap();
        assert_eq!(p.name(), "gemini");
        assert_eq!(p.model(), gemini::DEFAULT_MODEL);
    }

    #[test]
    fn model_override_reaches_gemini() {
        let config = EvaluationConfig::builder()
            .provider_name("Gemini")
            .api_key("k")
            .model("gemini-2.0-flash")
            .build()
            .unwrap();
        let p = resolve_provider(&config).unwrap();
        assert_eq!(p.model(), "gemini-2.0-flash");
    }

    #[test]
    fn unknown_provider_without_model_is_not_configured() {
        let config = EvaluationConfig::builder()
            .provider_name("somevendor")
            .build()
            .unwrap();
        let err = resolve_provider(&config).err().unwrap();
        assert!(err.to_string().contains("somevendor"));
    }

    #[test]
    fn default_models() {
        assert_eq!(default_model_for("gemini"), Some("gemini-1.5-flash"));
        assert_eq!(default_model_for("ollama"), Some("llava"));
        assert_eq!(default_model_for("nope"), None);
    }
}
