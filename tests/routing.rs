//! Router tests: multipart forms through the full axum stack, fakes behind it.

mod common;

use ats_scorer::web::{build_router, AppState};
use ats_scorer::{LeaderboardStore, ServerConfig};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use common::{Harness, ScriptedModel, FAKE_PDF};
use tower::ServiceExt;

const BOUNDARY: &str = "ats-scorer-test-boundary";

/// Build a multipart body. `cv` is `(file name, bytes)`; an empty file name
/// mimics a browser submitting the form with no file chosen.
fn multipart_body(fields: &[(&str, &str)], cv: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = cv {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"cv\"; filename=\"{file_name}\"\r\nContent-Type: application/pdf\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn post(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::post(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn router(h: &Harness) -> Router {
    build_router(AppState::new(h.pipeline.clone()), &ServerConfig::default())
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn scholarship_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("name", "Awa Diop"),
        ("email", "awa@example.com"),
        ("education_level", "Master"),
        ("income", "200000"),
        ("motivation", "Je souhaite poursuivre un doctorat."),
    ]
}

#[tokio::test]
async fn healthz_reports_ok() {
    let h = Harness::replying("unused");
    let response = router(&h)
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn forms_render() {
    let h = Harness::replying("unused");
    for (uri, needle) in [
        ("/", "/scholarship"),
        ("/resume", "Optimiser mon CV"),
        ("/scholarship", "Doctorat"),
    ] {
        let response = router(&h)
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        assert!(body_text(response).await.contains(needle), "{uri}");
    }
}

#[tokio::test]
async fn analyze_without_job_description_names_the_field() {
    let h = Harness::replying("unused");
    let body = multipart_body(&[("job_description", "  ")], Some(("cv.pdf", FAKE_PDF)));

    let response = router(&h).oneshot(post("/resume/analyze", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response)
        .await
        .contains("Veuillez entrer une description de poste"));
    assert_eq!(h.extractor.calls(), 0);
    assert!(h.model.calls().is_empty());
}

#[tokio::test]
async fn analyze_without_chosen_file_asks_for_cv() {
    let h = Harness::replying("unused");
    let body = multipart_body(&[("job_description", "Dev Rust")], Some(("", &b""[..])));

    let response = router(&h).oneshot(post("/resume/analyze", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("Veuillez télécharger votre CV"));
    // The job description is kept in the form.
    assert!(html.contains("Dev Rust"));
    assert_eq!(h.extractor.calls(), 0);
}

#[tokio::test]
async fn analyze_with_empty_file_is_a_conversion_error() {
    let h = Harness::replying("unused");
    let body = multipart_body(&[("job_description", "Dev Rust")], Some(("cv.pdf", &b""[..])));

    let response = router(&h).oneshot(post("/resume/analyze", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("lors de la lecture du CV"));
    assert!(!html.contains("Document conversion failed"));
    assert!(h.model.calls().is_empty());
}

#[tokio::test]
async fn analyze_renders_markdown_reply() {
    let h = Harness::replying("**Score: 80/100**\n\nPoints forts:\n- Rust");
    let body = multipart_body(&[("job_description", "Dev Rust")], Some(("cv.pdf", FAKE_PDF)));

    let response = router(&h).oneshot(post("/resume/analyze", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<strong>Score: 80/100</strong>"));
    assert!(html.contains("<li>Rust</li>"));
}

#[tokio::test]
async fn optimize_downloads_the_cleaned_pdf() {
    let h = Harness::replying("Jean Dupont\nRust\n**ATS Optimization:** keywords added");
    let body = multipart_body(&[("job_description", "Dev Rust")], Some(("cv.pdf", FAKE_PDF)));

    let response = router(&h).oneshot(post("/resume/optimize", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/pdf"
    );
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("CV_Optimise.pdf"));

    let pdf = body_text(response).await;
    assert!(pdf.starts_with("%PDF"));
    assert!(!pdf.contains("ATS Optimization"));
    assert_eq!(h.exporter.texts(), vec!["Jean Dupont\nRust".to_string()]);
}

#[tokio::test]
async fn model_failure_is_rendered_in_the_form() {
    let h = Harness::with_model(ScriptedModel::failing("invalid API key"));
    let body = multipart_body(&[("job_description", "Dev Rust")], Some(("cv.pdf", FAKE_PDF)));

    let response = router(&h).oneshot(post("/resume/optimize", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let html = body_text(response).await;
    assert!(html.contains("Une erreur est survenue"));
    assert!(html.contains("invalid API key"));
    assert!(h.exporter.texts().is_empty());
}

#[tokio::test]
async fn scholarship_submission_is_scored_and_listed() {
    let h = Harness::replying("Dossier solide.\nNote : 85/100");
    let body = multipart_body(&scholarship_fields(), Some(("cv.pdf", FAKE_PDF)));

    let response = router(&h).oneshot(post("/scholarship", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Dossier solide."));
    assert!(html.contains("Note : 85/100"));
    assert!(html.contains("<td>Awa Diop</td>"));

    let rows = h.store.load_all().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].score, Some(85));
}

#[tokio::test]
async fn scholarship_missing_field_keeps_input_and_skips_model() {
    let h = Harness::replying("Note : 85/100");
    let fields: Vec<_> = scholarship_fields()
        .into_iter()
        .filter(|(name, _)| *name != "email")
        .collect();
    let body = multipart_body(&fields, Some(("cv.pdf", FAKE_PDF)));

    let response = router(&h).oneshot(post("/scholarship", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("Email"));
    assert!(html.contains("value=\"Awa Diop\""));
    assert!(h.model.calls().is_empty());
    assert!(h.store.load_all().unwrap().is_empty());
}

#[tokio::test]
async fn unscored_reply_writes_nothing() {
    let h = Harness::replying("Bon dossier, environ 90 sur 100.");
    let body = multipart_body(&scholarship_fields(), Some(("cv.pdf", FAKE_PDF)));

    let response = router(&h).oneshot(post("/scholarship", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Aucune candidature notée"));
    assert!(h.store.load_all().unwrap().is_empty());
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let h = Harness::replying("unused");
    let server = ServerConfig {
        max_upload_bytes: 1024,
        ..ServerConfig::default()
    };
    let app = build_router(AppState::new(h.pipeline.clone()), &server);
    let big = vec![b'x'; 4096];
    let body = multipart_body(&[("job_description", "Dev Rust")], Some(("cv.pdf", big.as_slice())));

    let response = app.oneshot(post("/resume/analyze", body)).await.unwrap();
    assert_ne!(response.status(), StatusCode::OK);
    assert_eq!(h.extractor.calls(), 0);
}
