//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use ats_scorer::pipeline::input::validate_pdf_bytes;
use ats_scorer::{
    AtsError, DocumentEnvelope, DocumentExtractor, InMemoryLeaderboard, ModelClient, Pipeline,
    ResumeExporter, ScorerConfig,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Smallest byte string the fake extractor accepts as a PDF.
pub const FAKE_PDF: &[u8] = b"%PDF-1.4\n%fake\n";

/// One recorded model call.
#[derive(Debug, Clone)]
pub struct ModelCall {
    pub system_text: String,
    pub prompt: String,
    pub mime_type: String,
}

/// Model that answers every call with the same scripted reply.
pub struct ScriptedModel {
    reply: Result<String, String>,
    calls: Mutex<Vec<ModelCall>>,
}

impl ScriptedModel {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<ModelCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn invoke(
        &self,
        system_text: &str,
        document: &DocumentEnvelope,
        prompt: &str,
    ) -> Result<String, AtsError> {
        self.calls.lock().unwrap().push(ModelCall {
            system_text: system_text.to_string(),
            prompt: prompt.to_string(),
            mime_type: document.mime_type.clone(),
        });
        self.reply
            .clone()
            .map_err(|message| AtsError::ModelInvocation { message })
    }
}

/// Extractor that applies the real upload checks but skips pdfium.
#[derive(Default)]
pub struct FakeExtractor {
    calls: AtomicUsize,
}

impl FakeExtractor {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentExtractor for FakeExtractor {
    async fn extract(&self, pdf: Vec<u8>) -> Result<DocumentEnvelope, AtsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        validate_pdf_bytes(&pdf)?;
        Ok(DocumentEnvelope::from_jpeg_bytes(&[0xFF, 0xD8, 0xFF, 0xD9]))
    }
}

/// Exporter that records the text it was given.
#[derive(Default)]
pub struct FakeExporter {
    texts: Mutex<Vec<String>>,
}

impl FakeExporter {
    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResumeExporter for FakeExporter {
    async fn export(&self, text: &str) -> Result<Vec<u8>, AtsError> {
        self.texts.lock().unwrap().push(text.to_string());
        let mut pdf = b"%PDF-1.7\n".to_vec();
        pdf.extend_from_slice(text.as_bytes());
        Ok(pdf)
    }
}

/// A pipeline over fakes, with handles to inspect them.
pub struct Harness {
    pub pipeline: Pipeline,
    pub model: Arc<ScriptedModel>,
    pub extractor: Arc<FakeExtractor>,
    pub exporter: Arc<FakeExporter>,
    pub store: Arc<InMemoryLeaderboard>,
}

impl Harness {
    pub fn with_model(model: Arc<ScriptedModel>) -> Self {
        let extractor = Arc::new(FakeExtractor::default());
        let exporter = Arc::new(FakeExporter::default());
        let store = Arc::new(InMemoryLeaderboard::new());
        let pipeline = Pipeline::new(
            ScorerConfig::default(),
            model.clone(),
            extractor.clone(),
            exporter.clone(),
            store.clone(),
        );
        Self {
            pipeline,
            model,
            extractor,
            exporter,
            store,
        }
    }

    pub fn replying(reply: &str) -> Self {
        Self::with_model(ScriptedModel::replying(reply))
    }
}
