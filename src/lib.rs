//! # ats-scorer
//!
//! Score résumés against job descriptions and rank scholarship applications
//! with a vision-capable LLM.
//!
//! Two browser forms share one pipeline: the uploaded CV's first page is
//! rasterised, sent to the model as an image together with a fixed French
//! prompt, and the reply is shown, exported as a PDF, or scored and appended
//! to a CSV leaderboard.
//!
//! ## Pipeline Overview
//!
//! ```text
//! form
//!  │
//!  ├─ 1. Validate  required fields present, before any expensive work
//!  ├─ 2. Render    page 1 via pdfium (spawn_blocking)
//!  ├─ 3. Encode    JPEG → base64 envelope
//!  ├─ 4. Model     one call, no retry
//!  └─ 5. Output    Markdown → HTML, résumé → PDF, or score → leaderboard
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ats_scorer::{Pipeline, ResumeRequest, ScorerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider defaults to gemini; reads GEMINI_API_KEY
//!     let pipeline = Pipeline::from_config(ScorerConfig::default())?;
//!     let request = ResumeRequest::new(
//!         Some("Développeur Rust senior".into()),
//!         Some(std::fs::read("cv.pdf")?),
//!     )?;
//!     println!("{}", pipeline.analyze_matching(request).await?);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ats-scorer` binary (clap + anyhow + indicatif + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod application;
pub mod config;
pub mod engine;
pub mod error;
pub mod leaderboard;
pub mod pipeline;
pub mod prompts;
pub mod web;
pub mod workflow;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use application::{EducationLevel, ResumeRequest, ScholarshipApplication, ScholarshipForm};
pub use config::{require_credential, ScorerConfig, ScorerConfigBuilder, ServerConfig};
pub use engine::{DocumentExtractor, PdfiumEngine, ResumeExporter};
pub use error::{AtsError, ScoreParseError, StoreError};
pub use leaderboard::{ranked, CsvLeaderboard, InMemoryLeaderboard, LeaderboardStore, ScoredRecord};
pub use pipeline::encode::DocumentEnvelope;
pub use pipeline::llm::{LlmModelClient, ModelClient};
pub use workflow::{OptimizedResume, Pipeline, ScholarshipOutcome};
