//! Configuration for resume evaluation.
//!
//! Everything an [`crate::Evaluator`] needs is collected in
//! [`EvaluationConfig`], built with [`EvaluationConfigBuilder`]. The config
//! is read once when the evaluator is constructed and never mutated after,
//! including the provider credential, which is passed in explicitly rather
//! than read from process-global state.

use crate::error::HireMeterError;
use crate::pipeline::render::PageRasterizer;
use crate::progress::ProgressCallback;
use crate::provider::EvaluationProvider;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Public Gemini REST endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Configuration for an [`crate::Evaluator`].
///
/// # Example
/// ```rust
/// use hiremeter::EvaluationConfig;
///
/// let config = EvaluationConfig::builder()
///     .provider_name("gemini")
///     .api_key("AIza...")
///     .jpeg_quality(85)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct EvaluationConfig {
    /// Longest edge of the rendered page, in pixels. Default: 2000.
    ///
    /// Vision models downscale large inputs anyway; 2000 px keeps body text
    /// legible on an A4/Letter page while bounding memory.
    pub max_rendered_pixels: u32,

    /// JPEG quality for the encoded page (1–100). Default: 75.
    pub jpeg_quality: u8,

    /// PDF user password for encrypted resumes.
    pub password: Option<String>,

    /// Explicit PDFium library file or directory.
    pub pdfium_library_path: Option<PathBuf>,

    /// Download PDFium when no local copy is found. Default: true.
    pub allow_pdfium_download: bool,

    /// Provider name (e.g. "gemini", "openai", "anthropic", "ollama").
    pub provider_name: Option<String>,

    /// Model identifier. If None, the provider's default is used.
    pub model: Option<String>,

    /// Credential for the Gemini REST provider.
    pub api_key: Option<String>,

    /// Base URL for the Gemini REST provider.
    pub api_base_url: String,

    /// Sampling temperature. None leaves the provider default in place.
    pub temperature: Option<f32>,

    /// Output token limit. None leaves the provider default in place.
    pub max_tokens: Option<usize>,

    /// Pre-constructed provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn EvaluationProvider>>,

    /// Pre-constructed rasterizer. Skips PDFium discovery when set.
    pub rasterizer: Option<Arc<dyn PageRasterizer>>,

    /// Stage notifications.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            max_rendered_pixels: 2000,
            jpeg_quality: 75,
            password: None,
            pdfium_library_path: None,
            allow_pdfium_download: true,
            provider_name: None,
            model: None,
            api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            temperature: None,
            max_tokens: None,
            provider: None,
            rasterizer: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for EvaluationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluationConfig")
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("pdfium_library_path", &self.pdfium_library_path)
            .field("allow_pdfium_download", &self.allow_pdfium_download)
            .field("provider_name", &self.provider_name)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("provider", &self.provider.as_ref().map(|p| p.name().to_string()))
            .field("rasterizer", &self.rasterizer.as_ref().map(|_| "<dyn PageRasterizer>"))
            .finish()
    }
}

impl EvaluationConfig {
    pub fn builder() -> EvaluationConfigBuilder {
        EvaluationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`EvaluationConfig`].
pub struct EvaluationConfigBuilder {
    config: EvaluationConfig,
}

impl EvaluationConfigBuilder {
    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn jpeg_quality(mut self, q: u8) -> Self {
        self.config.jpeg_quality = q.clamp(1, 100);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    pub fn allow_pdfium_download(mut self, v: bool) -> Self {
        self.config.allow_pdfium_download = v;
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = Some(n);
        self
    }

    pub fn provider(mut self, provider: Arc<dyn EvaluationProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn rasterizer(mut self, rasterizer: Arc<dyn PageRasterizer>) -> Self {
        self.config.rasterizer = Some(rasterizer);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<EvaluationConfig, HireMeterError> {
        let c = &self.config;
        if c.max_tokens == Some(0) {
            return Err(HireMeterError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if !(c.api_base_url.starts_with("http://") || c.api_base_url.starts_with("https://")) {
            return Err(HireMeterError::InvalidConfig(format!(
                "api_base_url must be an http(s) URL, got '{}'",
                c.api_base_url
            )));
        }
        if c.api_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
            return Err(HireMeterError::InvalidConfig("api_key is empty".into()));
        }
        Ok(self.config)
    }
}
