//! Error types for the ats-scorer library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`AtsError`] is **fatal for one submission**: the pipeline cannot produce
//!   a result (missing field, unreadable PDF, model unreachable). Web handlers
//!   catch it and re-render the form with [`AtsError::user_message`].
//!
//! * [`ScoreParseError`] is **soft**: the model answered, but its text does not
//!   carry a well-formed score. The evaluation is still shown; only the
//!   leaderboard write is skipped.

use thiserror::Error;

/// All submission-level errors returned by the ats-scorer library.
#[derive(Debug, Error)]
pub enum AtsError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// A required form field or the uploaded file is absent.
    #[error("Missing required input: {field}")]
    MissingInput { field: &'static str },

    /// A field is present but outside its allowed domain.
    #[error("Invalid value for '{field}': {reason}")]
    InvalidInput { field: &'static str, reason: String },

    // ── Document errors ───────────────────────────────────────────────────
    /// The upload is empty, not a PDF, has no pages or failed to rasterise.
    #[error("Document conversion failed: {detail}")]
    DocumentConversion { detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install libpdfium system-wide."
    )]
    PdfiumBinding(String),

    /// Laying out the optimised résumé as a PDF failed.
    #[error("PDF generation failed: {0}")]
    PdfGeneration(String),

    // ── Model errors ──────────────────────────────────────────────────────
    /// Transport, authentication or quota failure from the model service.
    #[error("Model invocation failed: {message}")]
    ModelInvocation { message: String },

    /// The configured provider could not be created.
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The API credential for the configured provider is absent.
    #[error("Required environment variable '{var}' is not set")]
    MissingCredential { var: String },

    // ── Storage errors ────────────────────────────────────────────────────
    #[error("Leaderboard store error: {0}")]
    Leaderboard(#[from] StoreError),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AtsError {
    /// Message shown to the person filling the form.
    ///
    /// Validation errors name the missing field exactly; infrastructure
    /// errors carry their detail so a resubmission can be attempted knowingly.
    pub fn user_message(&self) -> String {
        match self {
            AtsError::MissingInput { field } => match *field {
                "job_description" => "Veuillez entrer une description de poste".to_string(),
                "cv" => "Veuillez télécharger votre CV".to_string(),
                other => format!("Veuillez renseigner le champ « {} »", field_label(other)),
            },
            AtsError::InvalidInput { field, reason } => {
                format!("Valeur invalide pour « {} » : {}", field_label(field), reason)
            }
            AtsError::DocumentConversion { detail } => {
                format!("Une erreur est survenue lors de la lecture du CV : {detail}")
            }
            AtsError::ModelInvocation { message } => {
                format!("Une erreur est survenue lors de l'appel au modèle : {message}")
            }
            other => format!("Une erreur est survenue : {other}"),
        }
    }

    /// True for errors caused by the submitted data rather than the system.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AtsError::MissingInput { .. } | AtsError::InvalidInput { .. }
        )
    }
}

fn field_label(field: &str) -> &str {
    match field {
        "name" => "Nom",
        "email" => "Email",
        "education_level" => "Niveau d'études",
        "income" => "Revenu mensuel de la famille",
        "motivation" => "Lettre de motivation",
        "cv" => "CV",
        "job_description" => "Description du poste",
        other => other,
    }
}

/// The model response did not contain a well-formed score.
///
/// Never shown to the user; the caller logs it and skips persistence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreParseError {
    /// The marker was found but no `/` follows it.
    #[error("score marker found but no '/' delimiter follows it")]
    MissingDelimiter,

    /// The text between the marker and `/` is not an integer.
    #[error("score '{raw}' is not an integer")]
    NotAnInteger { raw: String },

    /// The integer is outside 0–100.
    #[error("score {value} is outside 0–100")]
    OutOfRange { value: i64 },
}

/// Failure of the leaderboard backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}
