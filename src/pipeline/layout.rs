//! Résumé PDF layout: turn the cleaned rewrite into a downloadable A4 PDF.
//!
//! The layout is deliberately plain: a bold title, then one paragraph per
//! non-empty line of the rewrite. Markdown heading hashes and `**` emphasis
//! are stripped; heading lines are set in bold instead. Lines are wrapped by
//! an average Helvetica glyph width, which errs on the narrow side so text
//! never runs into the right margin.
//!
//! Like rasterisation, writing goes through pdfium and therefore runs on the
//! blocking pool.

use crate::config::ScorerConfig;
use crate::error::AtsError;
use crate::pipeline::render::bind_pdfium;
use once_cell::sync::Lazy;
use pdfium_render::prelude::*;
use regex::Regex;
use std::path::Path;
use tracing::{debug, info};

/// Title printed at the top of the first page.
pub const RESUME_TITLE: &str = "Curriculum Vitae Optimisé";

/// File name offered for the download.
pub const RESUME_FILE_NAME: &str = "CV_Optimise.pdf";

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 56.0;
const TITLE_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 11.0;
const LINE_HEIGHT: f32 = 14.0;
const PARAGRAPH_GAP: f32 = 4.0;
/// Average Helvetica advance width as a fraction of the font size, rounded up.
const AVG_GLYPH_EM: f32 = 0.55;

static RE_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*#{1,6}\s*").unwrap());

/// One laid-out paragraph: its wrapped lines and weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub lines: Vec<String>,
    pub bold: bool,
}

/// Characters that fit on one body line.
pub fn body_line_capacity() -> usize {
    ((PAGE_WIDTH - 2.0 * MARGIN) / (BODY_SIZE * AVG_GLYPH_EM)).floor() as usize
}

/// Split `text` into paragraphs: one per non-empty line, markup stripped,
/// wrapped to `max_chars`.
pub fn layout_paragraphs(text: &str, max_chars: usize) -> Vec<Paragraph> {
    text.lines()
        .filter_map(|line| {
            let bold = RE_HEADING.is_match(line);
            let plain = RE_HEADING.replace(line, "").replace("**", "");
            let plain = plain.trim();
            if plain.is_empty() {
                return None;
            }
            Some(Paragraph {
                lines: wrap_line(plain, max_chars),
                bold,
            })
        })
        .collect()
}

/// Greedy word wrap. Words longer than `max_chars` are split hard.
pub fn wrap_line(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        while word.len() > max_chars {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let needed = if current_len == 0 {
            word.len()
        } else {
            current_len + 1 + word.len()
        };
        if needed > max_chars && current_len > 0 {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current_len += word.len();
        current.extend(word);
    }

    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Lay out `text` as an A4 PDF and return its bytes.
pub async fn write_resume_pdf(text: String, config: &ScorerConfig) -> Result<Vec<u8>, AtsError> {
    let lib_path = config.pdfium_lib_path.clone();
    tokio::task::spawn_blocking(move || write_resume_pdf_blocking(&text, lib_path.as_deref()))
        .await
        .map_err(|e| AtsError::PdfGeneration(format!("layout task panicked: {e}")))?
}

fn write_resume_pdf_blocking(text: &str, lib_path: Option<&Path>) -> Result<Vec<u8>, AtsError> {
    let pdfium = bind_pdfium(lib_path)?;
    let paragraphs = layout_paragraphs(text, body_line_capacity());

    let mut document = pdfium.create_new_pdf().map_err(pdf_err)?;
    let regular = document.fonts_mut().helvetica();
    let bold = document.fonts_mut().helvetica_bold();

    let mut page = document
        .pages_mut()
        .create_page_at_end(PdfPagePaperSize::a4())
        .map_err(pdf_err)?;
    let mut page_count = 1;

    let mut y = PAGE_HEIGHT - MARGIN - TITLE_SIZE;
    page.objects_mut()
        .create_text_object(
            PdfPoints::new(MARGIN),
            PdfPoints::new(y),
            RESUME_TITLE,
            bold,
            PdfPoints::new(TITLE_SIZE),
        )
        .map_err(pdf_err)?;
    y -= TITLE_SIZE + 2.0 * PARAGRAPH_GAP;

    for paragraph in &paragraphs {
        let font = if paragraph.bold { bold } else { regular };
        for line in &paragraph.lines {
            y -= LINE_HEIGHT;
            if y < MARGIN {
                page = document
                    .pages_mut()
                    .create_page_at_end(PdfPagePaperSize::a4())
                    .map_err(pdf_err)?;
                page_count += 1;
                y = PAGE_HEIGHT - MARGIN - LINE_HEIGHT;
            }
            page.objects_mut()
                .create_text_object(
                    PdfPoints::new(MARGIN),
                    PdfPoints::new(y),
                    line,
                    font,
                    PdfPoints::new(BODY_SIZE),
                )
                .map_err(pdf_err)?;
        }
        y -= PARAGRAPH_GAP;
    }

    let bytes = document.save_to_bytes().map_err(pdf_err)?;
    info!(
        "Résumé PDF written: {} paragraphs, {} pages, {} bytes",
        paragraphs.len(),
        page_count,
        bytes.len()
    );
    debug!("Body line capacity: {} chars", body_line_capacity());
    Ok(bytes)
}

fn pdf_err(e: PdfiumError) -> AtsError {
    AtsError::PdfGeneration(format!("{e:?}"))
}
