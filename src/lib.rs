//! # hiremeter
//!
//! Evaluate a resume against a job description with a vision language model.
//!
//! The first page of a PDF resume is rendered to an image and sent, together
//! with a fixed instruction and the job description, to a model such as
//! Gemini. The model reads the page the way a recruiter would, so layout,
//! columns and typography survive without any text extraction.
//!
//! Two actions are offered, selected by [`EvaluationMode`]:
//!
//! | Mode | Heading | Output |
//! |------|---------|--------|
//! | `Review` | Resume Evaluation | strengths and weaknesses for the role |
//! | `MatchPercentage` | ATS Match Result | match %, missing keywords, final thoughts |
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    validate the upload (%PDF header, non-empty)
//!  ├─ 2. Render   rasterise page 1 via PDFium (spawn_blocking)
//!  ├─ 3. Encode   JPEG → base64, media type image/jpeg
//!  └─ 4. Invoke   one call: instruction + image + job description → text
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hiremeter::{EvaluationConfig, EvaluationMode, Evaluator, SourceDocument};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EvaluationConfig::builder()
//!         .api_key(std::env::var("GOOGLE_API_KEY")?)
//!         .build()?;
//!     let evaluator = Evaluator::new(config).await?;
//!
//!     let resume = SourceDocument::from_path("resume.pdf").await?;
//!     let result = evaluator
//!         .evaluate(EvaluationMode::Review, Some(resume), "Backend engineer, Go, Kubernetes")
//!         .await?;
//!     println!("{}\n\n{}", result.heading, result.text);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `hiremeter` binary (clap + anyhow + tracing-subscriber + dotenvy) |
//!
//! ```toml
//! hiremeter = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod evaluate;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod provider;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{EvaluationConfig, EvaluationConfigBuilder};
pub use error::{ErrorKind, HireMeterError};
pub use evaluate::{prepare_document, Evaluator, PreparedDocument};
pub use output::EvaluationResult;
pub use pipeline::encode::EncodedPayload;
pub use pipeline::input::SourceDocument;
pub use pipeline::render::{PageRasterizer, PdfiumRasterizer, RenderedPage};
pub use progress::{EvaluationProgressCallback, NoopProgressCallback, ProgressCallback};
pub use prompts::EvaluationMode;
pub use provider::{EvaluationProvider, EvaluationRequest, ProviderResponse};
