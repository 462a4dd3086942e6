//! Error type for the hiremeter library.
//!
//! Every action ends in one of three failure classes, exposed through
//! [`HireMeterError::kind`]:
//!
//! * [`ErrorKind::MissingInput`]: no resume, or an empty one. The user can fix
//!   this; front-ends show it as a warning and carry on.
//! * [`ErrorKind::Conversion`]: the resume could not be turned into an image.
//! * [`ErrorKind::Provider`]: the language-model call failed.
//!
//! Nothing is retried at any layer. Each error ends the current action only.

use std::path::PathBuf;
use thiserror::Error;

/// Broad classification of a [`HireMeterError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingInput,
    Conversion,
    Provider,
    Configuration,
    Internal,
}

/// All errors returned by the hiremeter library.
#[derive(Debug, Error)]
pub enum HireMeterError {
    // ── Missing input ─────────────────────────────────────────────────────
    /// The action was triggered without a resume.
    #[error("No resume was supplied.\nPlease upload your resume.")]
    MissingDocument,

    /// A resume was supplied but contains nothing to evaluate.
    #[error("The resume '{name}' is empty: {detail}")]
    EmptyDocument { name: String, detail: String },

    /// Resume path does not exist.
    #[error("Resume file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    // ── Conversion ────────────────────────────────────────────────────────
    /// The resume exists but this process cannot read it.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The bytes are not a PDF.
    #[error("'{name}' is not a valid PDF\nFirst bytes: {magic:?}")]
    NotAPdf { name: String, magic: Vec<u8> },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{name}' is corrupt: {detail}\nTry repairing with: qpdf input.pdf output.pdf")]
    CorruptPdf { name: String, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{name}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { name: String },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{name}'")]
    WrongPassword { name: String },

    /// The PDF engine failed on the first page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// The rendered page could not be compressed.
    #[error("Image encoding failed: {0}")]
    EncodingFailed(String),

    /// An evaluation was attempted with an empty image payload.
    #[error("The encoded resume payload is empty")]
    EmptyPayload,

    // ── Provider ──────────────────────────────────────────────────────────
    /// The configured provider cannot be built (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The provider call failed. Not retried.
    #[error("LLM provider '{provider}' failed: {message}")]
    ProviderFailed { provider: String, message: String },

    // ── Config ────────────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No usable PDFium engine.
    #[error(
        "Failed to load the PDF engine: {0}\n\n\
PDFium is normally downloaded automatically on first run.\n\
If that failed you can:\n\
  • Check your internet connection and try again.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n\
  • Pass --pdfium-lib <PATH>.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HireMeterError {
    pub fn kind(&self) -> ErrorKind {
        use HireMeterError::*;
        match self {
            MissingDocument | EmptyDocument { .. } | FileNotFound { .. } => ErrorKind::MissingInput,
            PermissionDenied { .. }
            | NotAPdf { .. }
            | CorruptPdf { .. }
            | PasswordRequired { .. }
            | WrongPassword { .. }
            | RasterisationFailed { .. }
            | EncodingFailed(_)
            | EmptyPayload => ErrorKind::Conversion,
            ProviderNotConfigured { .. } | ProviderFailed { .. } => ErrorKind::Provider,
            InvalidConfig(_) | PdfiumBindingFailed(_) => ErrorKind::Configuration,
            Internal(_) => ErrorKind::Internal,
        }
    }

    /// True for user-correctable problems that should be shown as a warning
    /// rather than a failure.
    pub fn is_warning(&self) -> bool {
        self.kind() == ErrorKind::MissingInput
    }
}

impl From<hiremeter_pdfium::PdfiumError> for HireMeterError {
    fn from(e: hiremeter_pdfium::PdfiumError) -> Self {
        HireMeterError::PdfiumBindingFailed(e.to_string())
    }
}
