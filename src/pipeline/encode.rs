//! Image encoding: `DynamicImage` → base64 JPEG wrapped in a [`DocumentEnvelope`].
//!
//! The envelope is the `{mime_type, data}` pair the model API accepts for an
//! inline image. JPEG keeps a 200-DPI A4 page well under upload limits; the
//! CV only needs to be legible, not pixel-exact.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use tracing::debug;

/// MIME type of every envelope produced by [`encode_page`].
pub const JPEG_MIME: &str = "image/jpeg";

/// One rasterised page ready for the model call. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentEnvelope {
    pub mime_type: String,
    /// Standard base64 of the encoded image bytes.
    pub data: String,
}

impl DocumentEnvelope {
    /// Wrap already-encoded JPEG bytes.
    pub fn from_jpeg_bytes(bytes: &[u8]) -> Self {
        Self {
            mime_type: JPEG_MIME.to_string(),
            data: STANDARD.encode(bytes),
        }
    }

    /// Convert into the provider crate's image attachment.
    pub fn to_image_data(&self) -> ImageData {
        ImageData::new(self.data.clone(), self.mime_type.as_str()).with_detail("high")
    }
}

/// Encode a rasterised page as a base64 JPEG envelope.
///
/// pdfium renders RGBA; JPEG has no alpha channel, so the page is flattened
/// to RGB first.
pub fn encode_page(img: &DynamicImage) -> Result<DocumentEnvelope, image::ImageError> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buf = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)?;

    let envelope = DocumentEnvelope::from_jpeg_bytes(&buf);
    debug!("Encoded page → {} bytes base64", envelope.data.len());

    Ok(envelope)
}
