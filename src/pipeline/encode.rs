//! Image encoding: `DynamicImage` → JPEG → base64 [`EncodedPayload`].
//!
//! Every provider accepts inline images as a media type plus base64 text.
//! The payload is always JPEG: a resume page is mostly white space and
//! dark glyphs, so a mid-quality JPEG stays small without losing legibility.

use crate::error::HireMeterError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Media type carried by every payload.
pub const PAYLOAD_MIME_TYPE: &str = "image/jpeg";

/// A single encoded page ready to embed in a provider request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedPayload {
    pub mime_type: String,
    /// Base64 (standard alphabet, padded) of the JPEG bytes.
    pub data: String,
}

impl EncodedPayload {
    /// Wrap already-compressed JPEG bytes.
    pub fn from_jpeg_bytes(jpeg: &[u8]) -> Self {
        Self {
            mime_type: PAYLOAD_MIME_TYPE.to_string(),
            data: STANDARD.encode(jpeg),
        }
    }

    /// Decode back to the raw JPEG bytes.
    pub fn decode(&self) -> Result<Vec<u8>, HireMeterError> {
        STANDARD
            .decode(&self.data)
            .map_err(|e| HireMeterError::EncodingFailed(format!("invalid base64: {e}")))
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Convert to the attachment type used by `edgequake-llm` providers.
    pub fn to_image_data(&self) -> ImageData {
        ImageData::new(self.data.clone(), self.mime_type.clone()).with_detail("high")
    }
}

/// Compress a rendered page to JPEG at `quality` (1–100).
///
/// Alpha is dropped first; the JPEG encoder only takes opaque images.
pub fn compress_page(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, HireMeterError> {
    let rgb = img.to_rgb8();
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100))
        .encode_image(&rgb)
        .map_err(|e| HireMeterError::EncodingFailed(e.to_string()))?;
    Ok(buf)
}

/// Compress and base64-wrap a rendered page.
pub fn encode_page(img: &DynamicImage, quality: u8) -> Result<EncodedPayload, HireMeterError> {
    let jpeg = compress_page(img, quality)?;
    let payload = EncodedPayload::from_jpeg_bytes(&jpeg);
    debug!(
        "Encoded {}x{} page → {} JPEG bytes, {} base64 chars",
        img.width(),
        img.height(),
        jpeg.len(),
        payload.data.len()
    );
    Ok(payload)
}
