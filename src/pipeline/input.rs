//! Input handling: the uploaded resume as owned bytes.
//!
//! PDFium opens documents straight from memory, so there is no temp file.
//! The bytes are checked for emptiness and the `%PDF` magic before the
//! engine sees them, so callers get a meaningful error instead of an opaque
//! PDFium failure code.

use crate::error::HireMeterError;
use std::fmt;
use std::io::ErrorKind as IoErrorKind;
use std::path::Path;
use tracing::debug;

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Raw content of one uploaded resume. Lives for a single request.
#[derive(Clone, PartialEq, Eq)]
pub struct SourceDocument {
    name: String,
    bytes: Vec<u8>,
}

impl SourceDocument {
    /// Wrap bytes that arrived from somewhere other than the file system.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a resume from disk.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, HireMeterError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            IoErrorKind::NotFound => HireMeterError::FileNotFound {
                path: path.to_path_buf(),
            },
            IoErrorKind::PermissionDenied => HireMeterError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => HireMeterError::Internal(format!("reading {}: {e}", path.display())),
        })?;

        debug!("Read {} bytes from {}", bytes.len(), path.display());
        Ok(Self::from_bytes(path.display().to_string(), bytes))
    }

    /// Display name, used in error messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Cheap checks that run before the PDF engine is involved.
    pub fn validate(&self) -> Result<(), HireMeterError> {
        if self.bytes.is_empty() {
            return Err(HireMeterError::EmptyDocument {
                name: self.name.clone(),
                detail: "file has 0 bytes".into(),
            });
        }

        if !self.bytes.starts_with(PDF_MAGIC) {
            let magic = self.bytes.iter().take(PDF_MAGIC.len()).copied().collect();
            return Err(HireMeterError::NotAPdf {
                name: self.name.clone(),
                magic,
            });
        }

        Ok(())
    }
}

impl fmt::Debug for SourceDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceDocument")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn empty_bytes_are_missing_input() {
        let doc = SourceDocument::from_bytes("cv.pdf", Vec::new());
        let err = doc.validate().unwrap_err();
        assert!(matches!(err, HireMeterError::EmptyDocument { .. }));
        assert_eq!(err.kind(), ErrorKind::MissingInput);
    }

    #[test]
    fn non_pdf_is_rejected() {
        let doc = SourceDocument::from_bytes("cv.docx", b"PK\x03\x04rest".to_vec());
        match doc.validate().unwrap_err() {
            HireMeterError::NotAPdf { name, magic } => {
                assert_eq!(name, "cv.docx");
                assert_eq!(magic, b"PK\x03\x04".to_vec());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn short_input_is_not_a_pdf() {
        let doc = SourceDocument::from_bytes("x", b"%P".to_vec());
        assert!(matches!(
            doc.validate(),
            Err(HireMeterError::NotAPdf { .. })
        ));
    }

    #[test]
    fn pdf_magic_passes() {
        let doc = SourceDocument::from_bytes("cv.pdf", b"%PDF-1.7\n...".to_vec());
        assert!(doc.validate().is_ok());
        assert_eq!(doc.len(), 12);
    }

    #[test]
    fn debug_omits_content() {
        let doc = SourceDocument::from_bytes("cv.pdf", b"%PDF-secret".to_vec());
        let dbg = format!("{doc:?}");
        assert!(!dbg.contains("secret"));
        assert!(dbg.contains("len: 11"));
    }

    #[tokio::test]
    async fn from_path_missing_file() {
        let err = SourceDocument::from_path("/definitely/not/here.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, HireMeterError::FileNotFound { .. }));
        assert!(err.is_warning());
    }

    #[tokio::test]
    async fn from_path_reads_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.pdf");
        std::fs::write(&path, b"%PDF-1.4 test").unwrap();

        let doc = SourceDocument::from_path(&path).await.unwrap();
        assert_eq!(doc.bytes(), b"%PDF-1.4 test");
        assert!(doc.name().ends_with("cv.pdf"));
    }
}
