//! The three submission workflows and the leaderboard view.
//!
//! ```text
//! ResumeRequest ──▶ extract ──▶ invoke(job description, page, matching prompt) ──▶ text
//! ResumeRequest ──▶ extract ──▶ invoke(job description, page, optimisation prompt)
//!                                   ──▶ clean_resume_text ──▶ export ──▶ PDF
//! ScholarshipApplication ──▶ extract ──▶ invoke(jury persona, page, evaluation prompt)
//!                                   ──▶ extract_score ──▶ append (only when scored)
//! ```
//!
//! Requests arrive already validated, so every step here is a real unit of
//! work. Collaborators are injected at construction; nothing is global.

use crate::application::{ResumeRequest, ScholarshipApplication};
use crate::config::ScorerConfig;
use crate::engine::{DocumentExtractor, PdfiumEngine, ResumeExporter};
use crate::error::AtsError;
use crate::leaderboard::{ranked, CsvLeaderboard, LeaderboardStore, ScoredRecord};
use crate::pipeline::llm::{LlmModelClient, ModelClient};
use crate::pipeline::postprocess::clean_resume_text;
use crate::pipeline::score::extract_score;
use crate::prompts::{
    matching_prompt, optimization_prompt, scholarship_prompt, SCHOLARSHIP_SYSTEM_TEXT,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Result of the optimisation workflow.
#[derive(Debug, Clone)]
pub struct OptimizedResume {
    /// The cleaned rewrite.
    pub text: String,
    /// The rewrite laid out as a PDF.
    pub pdf: Vec<u8>,
}

/// Result of the scholarship workflow.
#[derive(Debug, Clone, Serialize)]
pub struct ScholarshipOutcome {
    /// The model's evaluation, shown verbatim.
    pub evaluation: String,
    /// Score found in the evaluation, if any.
    pub score: Option<u8>,
    /// Whether a leaderboard row was written.
    pub recorded: bool,
}

/// Runs submissions against injected collaborators.
#[derive(Clone)]
pub struct Pipeline {
    config: ScorerConfig,
    model: Arc<dyn ModelClient>,
    extractor: Arc<dyn DocumentExtractor>,
    exporter: Arc<dyn ResumeExporter>,
    store: Arc<dyn LeaderboardStore>,
}

impl Pipeline {
    pub fn new(
        config: ScorerConfig,
        model: Arc<dyn ModelClient>,
        extractor: Arc<dyn DocumentExtractor>,
        exporter: Arc<dyn ResumeExporter>,
        store: Arc<dyn LeaderboardStore>,
    ) -> Self {
        Self {
            config,
            model,
            extractor,
            exporter,
            store,
        }
    }

    /// Production wiring: provider from config, pdfium engine, CSV store.
    pub fn from_config(config: ScorerConfig) -> Result<Self, AtsError> {
        let model = Arc::new(LlmModelClient::from_config(&config)?);
        let engine = Arc::new(PdfiumEngine::new(config.clone()));
        let store = Arc::new(CsvLeaderboard::new(config.leaderboard_path.clone()));
        info!(
            "Pipeline ready: provider={}, model={}, leaderboard={}",
            config.effective_provider(),
            config.effective_model(),
            config.leaderboard_path.display()
        );
        Ok(Self::new(config, model, engine.clone(), engine, store))
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// Score the CV against the job description.
    pub async fn analyze_matching(&self, request: ResumeRequest) -> Result<String, AtsError> {
        let start = Instant::now();
        let prompt = matching_prompt(&request.job_description);
        let document = self.extractor.extract(request.cv).await?;
        let analysis = self
            .model
            .invoke(&request.job_description, &document, &prompt)
            .await?;
        info!("Matching analysis done in {:?}", start.elapsed());
        Ok(analysis)
    }

    /// Rewrite the CV for the job and lay the rewrite out as a PDF.
    pub async fn optimize_resume(&self, request: ResumeRequest) -> Result<OptimizedResume, AtsError> {
        let start = Instant::now();
        let prompt = optimization_prompt(&request.job_description);
        let document = self.extractor.extract(request.cv).await?;
        let raw = self
            .model
            .invoke(&request.job_description, &document, &prompt)
            .await?;

        let text = clean_resume_text(&raw);
        if text.len() < raw.trim().len() {
            info!(
                "Dropped {} bytes of model commentary from the rewrite",
                raw.trim().len() - text.len()
            );
        }

        let pdf = self.exporter.export(&text).await?;
        info!(
            "Résumé optimised in {:?} ({} bytes PDF)",
            start.elapsed(),
            pdf.len()
        );
        Ok(OptimizedResume { text, pdf })
    }

    /// Evaluate the application and record it when the reply carries a score.
    ///
    /// A reply without a usable score is still returned for display; only
    /// the leaderboard write is skipped. A store failure is fatal.
    pub async fn evaluate_scholarship(
        &self,
        application: ScholarshipApplication,
    ) -> Result<ScholarshipOutcome, AtsError> {
        let start = Instant::now();
        let prompt = scholarship_prompt(&application);
        let document = self.extractor.extract(application.cv.clone()).await?;
        let evaluation = self
            .model
            .invoke(SCHOLARSHIP_SYSTEM_TEXT, &document, &prompt)
            .await?;

        let score = match extract_score(&evaluation) {
            Ok(Some(score)) => Some(score),
            Ok(None) => {
                warn!("Evaluation for {} carries no score marker", application.name);
                None
            }
            Err(e) => {
                warn!("Evaluation for {} has a malformed score: {}", application.name, e);
                None
            }
        };

        let recorded = match score {
            Some(score) => {
                self.store
                    .append(&ScoredRecord::from_application(&application, score))?;
                true
            }
            None => false,
        };

        info!(
            "Scholarship evaluated in {:?}: score={:?}, recorded={}",
            start.elapsed(),
            score,
            recorded
        );
        Ok(ScholarshipOutcome {
            evaluation,
            score,
            recorded,
        })
    }

    /// All scored applications, best first.
    pub fn leaderboard(&self) -> Result<Vec<ScoredRecord>, AtsError> {
        Ok(ranked(self.store.load_all()?))
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
