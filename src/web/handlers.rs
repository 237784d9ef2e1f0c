//! Route handlers. Every failure is rendered back into the form; nothing
//! escapes as a bare error response.

use super::views::{
    leaderboard_rows, level_options, markdown_to_html, IndexPage, ResumePage, ScholarshipPage,
};
use super::AppState;
use crate::application::{ResumeRequest, ScholarshipForm};
use crate::error::AtsError;
use crate::pipeline::layout::RESUME_FILE_NAME;
use askama::Template;
use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{error, warn};

/// Text fields plus the optional CV upload of one multipart form.
#[derive(Debug, Default)]
pub(crate) struct FormData {
    fields: HashMap<String, String>,
    cv: Option<Vec<u8>>,
}

impl FormData {
    fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }

    fn text_or_empty(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }
}

/// Drain the multipart body.
///
/// A `cv` part without a file name is what browsers send when no file was
/// chosen; it counts as no upload.
pub(crate) async fn read_form(mut multipart: Multipart) -> Result<FormData, AtsError> {
    let mut form = FormData::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_err)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "cv" {
            let has_file = field.file_name().is_some_and(|f| !f.is_empty());
            let bytes = field.bytes().await.map_err(multipart_err)?;
            if has_file {
                form.cv = Some(bytes.to_vec());
            }
        } else {
            let value = field.text().await.map_err(multipart_err)?;
            form.fields.insert(name, value);
        }
    }
    Ok(form)
}

fn multipart_err(e: axum::extract::multipart::MultipartError) -> AtsError {
    warn!("Multipart read error: {}", e);
    AtsError::InvalidInput {
        field: "cv",
        reason: format!("formulaire illisible ou fichier trop volumineux ({e})"),
    }
}

/// Status code for a failed submission.
pub(crate) fn error_status(err: &AtsError) -> StatusCode {
    match err {
        AtsError::MissingInput { .. } | AtsError::InvalidInput { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        AtsError::DocumentConversion { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        AtsError::ModelInvocation { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn log_failure(route: &str, err: &AtsError) {
    if err.is_validation() {
        warn!("{}: rejected submission: {}", route, err);
    } else {
        error!("{}: submission failed: {}", route, err);
    }
}

fn render_page<T: Template>(status: StatusCode, page: &T) -> Response {
    match page.render() {
        Ok(body) => (status, Html(body)).into_response(),
        Err(e) => {
            error!("Template rendering failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Une erreur est survenue lors de l'affichage de la page",
            )
                .into_response()
        }
    }
}

/// GET /
pub async fn index() -> Response {
    render_page(StatusCode::OK, &IndexPage)
}

/// GET /healthz
pub async fn healthz() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "ats-scorer"
    }))
}

/// GET /resume
pub async fn resume_form() -> Response {
    render_page(StatusCode::OK, &ResumePage::default())
}

fn resume_error(job_description: String, err: &AtsError) -> Response {
    let page = ResumePage {
        job_description,
        error: Some(err.user_message()),
        analysis_html: None,
    };
    render_page(error_status(err), &page)
}

/// POST /resume/analyze
pub async fn resume_analyze(State(state): State<AppState>, multipart: Multipart) -> Response {
    let form = match read_form(multipart).await {
        Ok(form) => form,
        Err(e) => return resume_error(String::new(), &e),
    };
    let job_description = form.text_or_empty("job_description");

    let result = match ResumeRequest::new(form.text("job_description"), form.cv) {
        Ok(request) => state.pipeline.analyze_matching(request).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(analysis) => render_page(
            StatusCode::OK,
            &ResumePage {
                job_description,
                error: None,
                analysis_html: Some(markdown_to_html(&analysis)),
            },
        ),
        Err(e) => {
            log_failure("/resume/analyze", &e);
            resume_error(job_description, &e)
        }
    }
}

/// POST /resume/optimize
///
/// Success is a PDF download, not a page.
pub async fn resume_optimize(State(state): State<AppState>, multipart: Multipart) -> Response {
    let form = match read_form(multipart).await {
        Ok(form) => form,
        Err(e) => return resume_error(String::new(), &e),
    };
    let job_description = form.text_or_empty("job_description");

    let result = match ResumeRequest::new(form.text("job_description"), form.cv) {
        Ok(request) => state.pipeline.optimize_resume(request).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(optimized) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{RESUME_FILE_NAME}\""),
                ),
            ],
            optimized.pdf,
        )
            .into_response(),
        Err(e) => {
            log_failure("/resume/optimize", &e);
            resume_error(job_description, &e)
        }
    }
}

/// Leaderboard rows, or an error message to show in their place.
fn load_rows(state: &AppState) -> (Vec<super::views::LeaderboardRow>, Option<String>) {
    match state.pipeline.leaderboard() {
        Ok(records) => (leaderboard_rows(&records), None),
        Err(e) => {
            error!("Leaderboard unavailable: {}", e);
            (Vec::new(), Some(e.user_message()))
        }
    }
}

/// GET /scholarship
pub async fn scholarship_page(State(state): State<AppState>) -> Response {
    let (rows, error) = load_rows(&state);
    render_page(
        StatusCode::OK,
        &ScholarshipPage {
            rows,
            error,
            ..Default::default()
        },
    )
}

/// POST /scholarship
pub async fn scholarship_submit(State(state): State<AppState>, multipart: Multipart) -> Response {
    let form = match read_form(multipart).await {
        Ok(form) => form,
        Err(e) => {
            let (rows, _) = load_rows(&state);
            return render_page(
                error_status(&e),
                &ScholarshipPage {
                    rows,
                    error: Some(e.user_message()),
                    ..Default::default()
                },
            );
        }
    };

    let level = form.text("education_level");
    let mut page = ScholarshipPage {
        name: form.text_or_empty("name"),
        email: form.text_or_empty("email"),
        levels: level_options(level.as_deref()),
        income: form.text("income").unwrap_or_else(|| "0".to_string()),
        motivation: form.text_or_empty("motivation"),
        ..Default::default()
    };

    let submission = ScholarshipForm {
        name: form.text("name"),
        email: form.text("email"),
        education_level: level,
        income: form.text("income"),
        motivation: form.text("motivation"),
        cv: form.cv,
    };

    let result = match submission.validate() {
        Ok(application) => state.pipeline.evaluate_scholarship(application).await,
        Err(e) => Err(e),
    };

    let status = match result {
        Ok(outcome) => {
            page.evaluation_html = Some(markdown_to_html(&outcome.evaluation));
            page.score = outcome.score;
            StatusCode::OK
        }
        Err(e) => {
            log_failure("/scholarship", &e);
            page.error = Some(e.user_message());
            error_status(&e)
        }
    };

    let (rows, board_error) = load_rows(&state);
    page.rows = rows;
    if page.error.is_none() {
        page.error = board_error;
    }
    render_page(status, &page)
}
