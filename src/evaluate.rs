//! Evaluation entry points.
//!
//! An [`Evaluator`] owns the two collaborators every action needs, a
//! [`PageRasterizer`] and an [`EvaluationProvider`], both resolved once at
//! construction. Each call to [`Evaluator::evaluate`] is one action:
//!
//! ```text
//! SourceDocument ──▶ render page 1 ──▶ JPEG/base64 ──▶ provider ──▶ text
//!                    (blocking pool)                   (one call)
//! ```
//!
//! The stages run strictly in sequence. Nothing is shared between actions
//! except the read-only collaborators.

use crate::config::EvaluationConfig;
use crate::error::HireMeterError;
use crate::output::EvaluationResult;
use crate::pipeline::encode::{self, EncodedPayload};
use crate::pipeline::input::SourceDocument;
use crate::pipeline::llm;
use crate::pipeline::render::{PageRasterizer, PdfiumRasterizer};
use crate::prompts::EvaluationMode;
use crate::provider::{resolve_provider, EvaluationProvider};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Renders resumes and sends them to the configured provider.
///
/// # Example
/// ```rust,no_run
/// use hiremeter::{EvaluationConfig, EvaluationMode, Evaluator};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = EvaluationConfig::builder().api_key("AIza...").build()?;
/// let evaluator = Evaluator::new(config).await?;
/// let result = evaluator
///     .evaluate_file(EvaluationMode::MatchPercentage, "resume.pdf", "Senior Go developer")
///     .await?;
/// println!("{}\n{}", result.heading, result.text);
/// # Ok(())
/// # }
/// ```
pub struct Evaluator {
    config: EvaluationConfig,
    rasterizer: Arc<dyn PageRasterizer>,
    provider: Arc<dyn EvaluationProvider>,
}

impl Evaluator {
    /// Resolve the provider and the PDF engine from `config`.
    ///
    /// The provider is resolved first so a missing credential fails before
    /// any engine download is attempted.
    pub async fn new(config: EvaluationConfig) -> Result<Self, HireMeterError> {
        let provider = resolve_provider(&config)?;

        let rasterizer: Arc<dyn PageRasterizer> = match config.rasterizer {
            Some(ref r) => Arc::clone(r),
            None => {
                let cfg = config.clone();
                let located = tokio::task::spawn_blocking(move || PdfiumRasterizer::locate(&cfg))
                    .await
                    .map_err(|e| HireMeterError::Internal(format!("PDF engine task: {}", e)))??;
                Arc::new(located)
            }
        };

        info!("Evaluator ready: {} / {}", provider.name(), provider.model());
        Ok(Self::with_parts(config, rasterizer, provider))
    }

    /// Build from explicit collaborators. `config` still supplies encoding
    /// and sampling options.
    pub fn with_parts(
        config: EvaluationConfig,
        rasterizer: Arc<dyn PageRasterizer>,
        provider: Arc<dyn EvaluationProvider>,
    ) -> Self {
        Self {
            config,
            rasterizer,
            provider,
        }
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    pub fn provider(&self) -> &dyn EvaluationProvider {
        self.provider.as_ref()
    }

    /// Turn a resume into the image payload sent to the provider.
    ///
    /// Only the first page is used. Calling this with `None` is the
    /// "nothing uploaded" case and returns [`HireMeterError::MissingDocument`].
    pub async fn prepare(
        &self,
        document: Option<SourceDocument>,
    ) -> Result<EncodedPayload, HireMeterError> {
        let document = document.ok_or(HireMeterError::MissingDocument)?;
        prepare_document(&self.rasterizer, document, &self.config)
            .await
            .map(|prepared| prepared.payload)
    }

    /// Run one evaluation action.
    ///
    /// A missing document returns before anything is rendered or sent.
    pub async fn evaluate(
        &self,
        mode: EvaluationMode,
        document: Option<SourceDocument>,
        job_description: &str,
    ) -> Result<EvaluationResult, HireMeterError> {
        let outcome = self.evaluate_inner(mode, document, job_description).await;
        if let (Err(e), Some(cb)) = (&outcome, &self.config.progress_callback) {
            cb.on_evaluation_error(&e.to_string());
        }
        outcome
    }

    /// Read `path` and evaluate it.
    pub async fn evaluate_file(
        &self,
        mode: EvaluationMode,
        path: impl AsRef<Path>,
        job_description: &str,
    ) -> Result<EvaluationResult, HireMeterError> {
        let document = SourceDocument::from_path(path).await?;
        self.evaluate(mode, Some(document), job_description).await
    }

    /// Blocking wrapper around [`Evaluator::evaluate`].
    ///
    /// Creates a temporary tokio runtime; do not call from async code.
    pub fn evaluate_sync(
        &self,
        mode: EvaluationMode,
        document: Option<SourceDocument>,
        job_description: &str,
    ) -> Result<EvaluationResult, HireMeterError> {
        tokio::runtime::Runtime::new()
            .map_err(|e| HireMeterError::Internal(format!("Failed to create tokio runtime: {}", e)))?
            .block_on(self.evaluate(mode, document, job_description))
    }

    async fn evaluate_inner(
        &self,
        mode: EvaluationMode,
        document: Option<SourceDocument>,
        job_description: &str,
    ) -> Result<EvaluationResult, HireMeterError> {
        let total_start = Instant::now();
        let document = document.ok_or(HireMeterError::MissingDocument)?;

        let prep_start = Instant::now();
        let PreparedDocument {
            payload,
            page_count: source_pages,
        } = prepare_document(&self.rasterizer, document, &self.config).await?;
        let preparation_duration_ms = prep_start.elapsed().as_millis() as u64;

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_provider_call(mode, self.provider.name());
        }

        let call_start = Instant::now();
        let response = llm::invoke(
            self.provider.as_ref(),
            mode,
            &payload,
            job_description,
            &self.config,
        )
        .await?;
        let provider_duration_ms = call_start.elapsed().as_millis() as u64;

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_evaluation_complete(response.text.len());
        }

        let result = EvaluationResult {
            mode,
            heading: mode.heading().to_string(),
            text: response.text,
            provider: self.provider.name().to_string(),
            model: self.provider.model().to_string(),
            source_pages,
            input_tokens: response.input_tokens,
            output_tokens: response.output_tokens,
            preparation_duration_ms,
            provider_duration_ms,
            total_duration_ms: total_start.elapsed().as_millis() as u64,
        };
        info!(
            "{} complete: {} chars in {}ms",
            mode,
            result.text.len(),
            result.total_duration_ms
        );
        Ok(result)
    }
}

/// The first page of a resume, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedDocument {
    pub payload: EncodedPayload,
    /// Pages in the source document; only the first is in `payload`.
    pub page_count: usize,
}

/// Document Preparation without a provider: validate, render page 1 on the
/// blocking pool, compress and wrap it.
pub async fn prepare_document(
    rasterizer: &Arc<dyn PageRasterizer>,
    document: SourceDocument,
    config: &EvaluationConfig,
) -> Result<PreparedDocument, HireMeterError> {
    if let Some(ref cb) = config.progress_callback {
        cb.on_preparation_start(document.name());
    }
    document.validate()?;

    let name = document.name().to_string();
    let rasterizer = Arc::clone(rasterizer);
    let page = tokio::task::spawn_blocking(move || rasterizer.render_page(&document, 0))
        .await
        .map_err(|e| HireMeterError::Internal(format!("render task: {}", e)))??;

    if page.page_count > 1 {
        warn!(
            "{}: {} pages, only page 1 is evaluated",
            name, page.page_count
        );
    }

    let payload = encode::encode_page(&page.image, config.jpeg_quality)?;
    info!(
        "Prepared '{}': page 1 of {}, {} base64 chars",
        name,
        page.page_count,
        payload.data.len()
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_document_prepared(page.page_count, payload.data.len());
    }
    Ok(PreparedDocument {
        payload,
        page_count: page.page_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::render::RenderedPage;
    use crate::provider::{EvaluationRequest, ProviderResponse};
    use async_trait::async_trait;
    use image::{DynamicImage, Rgb, RgbImage};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Blank {
        pages: usize,
    }

    impl PageRasterizer for Blank {
        fn render_page(
            &self,
            _document: &SourceDocument,
            index: usize,
        ) -> Result<RenderedPage, HireMeterError> {
            Ok(RenderedPage {
                index,
                page_count: self.pages,
                image: DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 60, Rgb([255, 255, 255]))),
            })
        }
    }

    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EvaluationProvider for Counting {
        fn name(&self) -> &str {
            "counting"
        }
        fn model(&self) -> &str {
            "c-1"
        }
        async fn complete(&self, _r: &EvaluationRequest) -> Result<ProviderResponse, HireMeterError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ProviderResponse {
                text: "ok".into(),
                input_tokens: Some(10),
                output_tokens: Some(2),
            })
        }
    }

    fn evaluator(pages: usize, provider: Arc<Counting>) -> Evaluator {
        Evaluator::with_parts(EvaluationConfig::default(), Arc::new(Blank { pages }), provider)
    }

    fn pdf() -> SourceDocument {
        SourceDocument::from_bytes("cv.pdf", b"%PDF-1.4 stub".to_vec())
    }

    #[tokio::test]
    async fn missing_document_makes_no_call() {
        let provider = Arc::new(Counting::default());
        let err = evaluator(1, provider.clone())
            .evaluate(EvaluationMode::Review, None, "jd")
            .await
            .unwrap_err();
        assert!(matches!(err, HireMeterError::MissingDocument));
        assert!(err.is_warning());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn result_carries_bookkeeping() {
        let provider = Arc::new(Counting::default());
        let result = evaluator(3, provider.clone())
            .evaluate(EvaluationMode::MatchPercentage, Some(pdf()), "jd")
            .await
            .unwrap();

        assert_eq!(result.text, "ok");
        assert_eq!(result.heading, "ATS Match Result");
        assert_eq!(result.provider, "counting");
        assert_eq!(result.source_pages, 3);
        assert!(result.was_truncated());
        assert_eq!(result.input_tokens, Some(10));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn prepare_yields_jpeg_payload() {
        let provider = Arc::new(Counting::default());
        let payload = evaluator(1, provider.clone()).prepare(Some(pdf())).await.unwrap();
        assert_eq!(payload.mime_type, "image/jpeg");
        assert!(payload.decode().unwrap().starts_with(&[0xFF, 0xD8]));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn non_pdf_is_rejected_before_rendering() {
        let provider = Arc::new(Counting::default());
        let doc = SourceDocument::from_bytes("cv.docx", b"PK\x03\x04zip".to_vec());
        let err = evaluator(1, provider.clone())
            .evaluate(EvaluationMode::Review, Some(doc), "jd")
            .await
            .unwrap_err();
        assert!(matches!(err, HireMeterError::NotAPdf { .. }));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn sync_wrapper_runs_outside_a_runtime() {
        let provider = Arc::new(Counting::default());
        let result = evaluator(1, provider)
            .evaluate_sync(EvaluationMode::Review, Some(pdf()), "")
            .unwrap();
        assert_eq!(result.heading, "Resume Evaluation");
    }
}
