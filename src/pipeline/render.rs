//! PDF rasterisation: turn one page of a resume into a `DynamicImage`.
//!
//! Rendering is a pluggable capability behind [`PageRasterizer`]. The
//! default, [`PdfiumRasterizer`], binds the PDFium library that
//! `hiremeter-pdfium` located at startup. Tests and alternative engines
//! implement the trait directly.
//!
//! All methods are blocking. PDFium keeps thread-local state and must not
//! run on async worker threads; callers go through `spawn_blocking`.

use crate::config::EvaluationConfig;
use crate::error::HireMeterError;
use crate::pipeline::input::SourceDocument;
use hiremeter_pdfium::{LocateOptions, PdfiumLibrary};
use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::debug;

/// One rasterised page plus the size of the document it came from.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// 0-based page index.
    pub index: usize,
    /// Total pages in the source document.
    pub page_count: usize,
    pub image: DynamicImage,
}

/// Converts document pages to images.
pub trait PageRasterizer: Send + Sync {
    /// Render page `index` (0-based) of `document`.
    ///
    /// A document with no pages is [`HireMeterError::EmptyDocument`]; an
    /// index past the end is [`HireMeterError::RasterisationFailed`].
    fn render_page(
        &self,
        document: &SourceDocument,
        index: usize,
    ) -> Result<RenderedPage, HireMeterError>;
}

/// [`PageRasterizer`] backed by the PDFium engine.
#[derive(Debug, Clone)]
pub struct PdfiumRasterizer {
    library: PdfiumLibrary,
    max_rendered_pixels: u32,
    password: Option<String>,
}

impl PdfiumRasterizer {
    pub fn new(library: PdfiumLibrary, config: &EvaluationConfig) -> Self {
        Self {
            library,
            max_rendered_pixels: config.max_rendered_pixels,
            password: config.password.clone(),
        }
    }

    /// Locate PDFium per the config and build a rasterizer around it.
    ///
    /// Blocking: may download the engine on first use.
    pub fn locate(config: &EvaluationConfig) -> Result<Self, HireMeterError> {
        let options = LocateOptions {
            explicit_path: config.pdfium_library_path.clone(),
            allow_download: config.allow_pdfium_download,
        };
        let library = hiremeter_pdfium::locate(&options)?;
        debug!("PDF engine: {}", library);
        Ok(Self::new(library, config))
    }

    pub fn library(&self) -> &PdfiumLibrary {
        &self.library
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn render_page(
        &self,
        document: &SourceDocument,
        index: usize,
    ) -> Result<RenderedPage, HireMeterError> {
        let pdfium = self.library.bind()?;

        let pdf = pdfium
            .load_pdf_from_byte_slice(document.bytes(), self.password.as_deref())
            .map_err(|e| classify_load_error(document.name(), self.password.is_some(), e))?;

        let pages = pdf.pages();
        let page_count = pages.len() as usize;
        debug!("{}: {} page(s)", document.name(), page_count);

        if page_count == 0 {
            return Err(HireMeterError::EmptyDocument {
                name: document.name().to_string(),
                detail: "PDF has no pages".into(),
            });
        }
        if index >= page_count {
            return Err(HireMeterError::RasterisationFailed {
                page: index + 1,
                detail: format!("document has only {page_count} page(s)"),
            });
        }

        let render_config = PdfRenderConfig::new()
            .set_target_width(self.max_rendered_pixels as i32)
            .set_maximum_height(self.max_rendered_pixels as i32);

        let page = pages
            .get(index as u16)
            .map_err(|e| HireMeterError::RasterisationFailed {
                page: index + 1,
                detail: format!("{:?}", e),
            })?;

        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            HireMeterError::RasterisationFailed {
                page: index + 1,
                detail: format!("{:?}", e),
            }
        })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            index + 1,
            image.width(),
            image.height()
        );

        Ok(RenderedPage {
            index,
            page_count,
            image,
        })
    }
}

/// Map a PDFium load failure onto the password / corruption variants.
fn classify_load_error(name: &str, had_password: bool, e: PdfiumError) -> HireMeterError {
    let detail = format!("{:?}", e);
    if detail.to_ascii_lowercase().contains("password") {
        if had_password {
            HireMeterError::WrongPassword { name: name.into() }
        } else {
            HireMeterError::PasswordRequired { name: name.into() }
        }
    } else {
        HireMeterError::CorruptPdf {
            name: name.into(),
            detail,
        }
    }
}
