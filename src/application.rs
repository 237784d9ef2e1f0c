//! Submission types collected by the two forms.
//!
//! Raw form input arrives as optional strings and bytes. The constructors in
//! this module are the single validation point: a [`ResumeRequest`] or
//! [`ScholarshipApplication`] only exists once every required field is
//! present, so the pipeline never starts a rasterisation or a model call for
//! an incomplete submission.

use crate::error::AtsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upper bound of the monthly family income slider.
pub const INCOME_MAX: u32 = 1_000_000;

/// Granularity of the monthly family income slider.
pub const INCOME_STEP: u32 = 5_000;

/// Highest completed degree, as offered by the form's dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EducationLevel {
    Bac,
    Licence,
    Master,
    Doctorat,
}

impl EducationLevel {
    /// Dropdown order.
    pub const ALL: [EducationLevel; 4] = [
        EducationLevel::Bac,
        EducationLevel::Licence,
        EducationLevel::Master,
        EducationLevel::Doctorat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EducationLevel::Bac => "Bac",
            EducationLevel::Licence => "Licence",
            EducationLevel::Master => "Master",
            EducationLevel::Doctorat => "Doctorat",
        }
    }
}

impl fmt::Display for EducationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EducationLevel {
    type Err = AtsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EducationLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AtsError::InvalidInput {
                field: "education_level",
                reason: format!("« {s} » n'est pas un niveau proposé"),
            })
    }
}

/// A job description plus the CV to score or rewrite against it.
#[derive(Clone)]
pub struct ResumeRequest {
    pub job_description: String,
    /// Raw upload; content is validated by the document extractor.
    pub cv: Vec<u8>,
}

impl ResumeRequest {
    /// Validate presence of both inputs, job description first.
    pub fn new(job_description: Option<String>, cv: Option<Vec<u8>>) -> Result<Self, AtsError> {
        let job_description = required_text(job_description, "job_description")?;
        let cv = cv.ok_or(AtsError::MissingInput { field: "cv" })?;
        Ok(Self {
            job_description,
            cv,
        })
    }
}

impl fmt::Debug for ResumeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResumeRequest")
            .field("job_description_len", &self.job_description.len())
            .field("cv_bytes", &self.cv.len())
            .finish()
    }
}

/// A complete scholarship submission. Immutable once built.
#[derive(Clone)]
pub struct ScholarshipApplication {
    pub name: String,
    pub email: String,
    pub education_level: EducationLevel,
    /// Monthly family income, 0–[`INCOME_MAX`] in steps of [`INCOME_STEP`].
    pub income: u32,
    pub motivation: String,
    pub cv: Vec<u8>,
}

impl fmt::Debug for ScholarshipApplication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScholarshipApplication")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("education_level", &self.education_level)
            .field("income", &self.income)
            .field("motivation_len", &self.motivation.len())
            .field("cv_bytes", &self.cv.len())
            .finish()
    }
}

/// Raw scholarship form input, every field optional.
#[derive(Debug, Clone, Default)]
pub struct ScholarshipForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub education_level: Option<String>,
    pub income: Option<String>,
    pub motivation: Option<String>,
    pub cv: Option<Vec<u8>>,
}

impl ScholarshipForm {
    /// Validate in form order and build the application.
    pub fn validate(self) -> Result<ScholarshipApplication, AtsError> {
        let name = required_text(self.name, "name")?;
        let email = required_text(self.email, "email")?;
        if !email.contains('@') {
            return Err(AtsError::InvalidInput {
                field: "email",
                reason: "adresse email invalide".into(),
            });
        }
        let education_level: EducationLevel =
            required_text(self.education_level, "education_level")?.parse()?;
        let income = parse_income(&required_text(self.income, "income")?)?;
        let motivation = required_text(self.motivation, "motivation")?;
        let cv = self.cv.ok_or(AtsError::MissingInput { field: "cv" })?;

        Ok(ScholarshipApplication {
            name,
            email,
            education_level,
            income,
            motivation,
            cv,
        })
    }
}

fn required_text(value: Option<String>, field: &'static str) -> Result<String, AtsError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(AtsError::MissingInput { field }),
    }
}

/// Parse and bound-check the monthly income.
pub fn parse_income(raw: &str) -> Result<u32, AtsError> {
    let income: u32 = raw.trim().parse().map_err(|_| AtsError::InvalidInput {
        field: "income",
        reason: format!("« {} » n'est pas un nombre entier positif", raw.trim()),
    })?;
    if income > INCOME_MAX {
        return Err(AtsError::InvalidInput {
            field: "income",
            reason: format!("doit être compris entre 0 et {INCOME_MAX}"),
        });
    }
    if income % INCOME_STEP != 0 {
        return Err(AtsError::InvalidInput {
            field: "income",
            reason: format!("doit être un multiple de {INCOME_STEP}"),
        });
    }
    Ok(income)
}
