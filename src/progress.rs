//! Progress-callback trait for evaluation stages.
//!
//! Inject an [`Arc<dyn EvaluationProgressCallback>`] via
//! [`crate::config::EvaluationConfigBuilder::progress_callback`] to be told
//! when each stage of an action starts and ends. The CLI drives its spinner
//! from these events; a web front-end could forward them to a socket.
//!
//! # Example
//!
//! ```rust
//! use hiremeter::{EvaluationConfig, EvaluationProgressCallback};
//! use std::sync::Arc;
//!
//! struct Log;
//!
//! impl EvaluationProgressCallback for Log {
//!     fn on_evaluation_complete(&self, text_len: usize) {
//!         eprintln!("provider returned {text_len} bytes");
//!     }
//! }
//!
//! let config = EvaluationConfig::builder()
//!     .progress_callback(Arc::new(Log) as Arc<dyn EvaluationProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::prompts::EvaluationMode;
use std::sync::Arc;

/// Stage notifications for one evaluation. All methods default to no-ops.
pub trait EvaluationProgressCallback: Send + Sync {
    /// Called before the resume is rendered.
    fn on_preparation_start(&self, document_name: &str) {
        let _ = document_name;
    }

    /// Called once the first page has been encoded.
    ///
    /// # Arguments
    /// * `page_count` : pages in the source document (only the first is used)
    /// * `payload_len`: length of the base64 payload
    fn on_document_prepared(&self, page_count: usize, payload_len: usize) {
        let _ = (page_count, payload_len);
    }

    /// Called just before the provider request is sent.
    fn on_provider_call(&self, mode: EvaluationMode, provider: &str) {
        let _ = (mode, provider);
    }

    /// Called when the provider returned text.
    fn on_evaluation_complete(&self, text_len: usize) {
        let _ = text_len;
    }

    /// Called when any stage failed.
    fn on_evaluation_error(&self, error: &str) {
        let _ = error;
    }
}

/// Callback that ignores every event.
pub struct NoopProgressCallback;

impl EvaluationProgressCallback for NoopProgressCallback {}

/// Type stored in [`crate::config::EvaluationConfig`].
pub type ProgressCallback = Arc<dyn EvaluationProgressCallback>;
