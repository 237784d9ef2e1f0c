//! The document seams: PDF in, page image out; résumé text in, PDF out.
//!
//! Workflows only see the [`DocumentExtractor`] and [`ResumeExporter`]
//! traits. [`PdfiumEngine`] implements both on top of pdfium; tests inject
//! in-memory fakes so no native library is needed.

use crate::config::ScorerConfig;
use crate::error::AtsError;
use crate::pipeline::{encode, layout, render};
use async_trait::async_trait;
use tracing::debug;

/// Turns an uploaded CV into the image envelope sent to the model.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// Rasterise page 1 of `pdf` and encode it.
    ///
    /// Empty, non-PDF, zero-page or unrenderable input fails with
    /// [`AtsError::DocumentConversion`].
    async fn extract(&self, pdf: Vec<u8>) -> Result<encode::DocumentEnvelope, AtsError>;
}

/// Lays out a cleaned résumé rewrite as a PDF.
#[async_trait]
pub trait ResumeExporter: Send + Sync {
    async fn export(&self, text: &str) -> Result<Vec<u8>, AtsError>;
}

/// pdfium-backed extractor and exporter.
#[derive(Debug, Clone)]
pub struct PdfiumEngine {
    config: ScorerConfig,
}

impl PdfiumEngine {
    pub fn new(config: ScorerConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DocumentExtractor for PdfiumEngine {
    async fn extract(&self, pdf: Vec<u8>) -> Result<encode::DocumentEnvelope, AtsError> {
        let image = render::render_first_page(pdf, &self.config).await?;
        let envelope =
            encode::encode_page(&image).map_err(|e| AtsError::DocumentConversion {
                detail: format!("image encoding failed: {e}"),
            })?;
        debug!("Extracted page 1 as {}", envelope.mime_type);
        Ok(envelope)
    }
}

#[async_trait]
impl ResumeExporter for PdfiumEngine {
    async fn export(&self, text: &str) -> Result<Vec<u8>, AtsError> {
        layout::write_resume_pdf(text.to_string(), &self.config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_upload_is_rejected_before_pdfium() {
        let engine = PdfiumEngine::new(ScorerConfig::default());
        let err = engine.extract(Vec::new()).await.unwrap_err();
        assert!(matches!(err, AtsError::DocumentConversion { .. }));
    }
}
