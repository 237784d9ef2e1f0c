//! PDF rasterisation: render the first page of an uploaded CV via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and blocks for the whole render. Running it on Tokio's blocking pool
//! keeps the form server responsive, and a panic inside pdfium comes back as
//! a `JoinError` that is turned into a visible error instead of taking the
//! process down.
//!
//! Only page 1 is ever rendered: the model sees one image per submission.

use crate::config::ScorerConfig;
use crate::error::AtsError;
use crate::pipeline::input::validate_pdf_bytes;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Bind to a pdfium library.
///
/// Search order: the explicit `lib_path`, then `./libpdfium.*`, then the
/// system library search path.
pub fn bind_pdfium(lib_path: Option<&Path>) -> Result<Pdfium, AtsError> {
    let bindings = match lib_path {
        Some(path) => Pdfium::bind_to_library(resolve_library_path(path)),
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| AtsError::PdfiumBinding(format!("{e:?}")))?;

    Ok(Pdfium::new(bindings))
}

/// Rasterise page 1 of `bytes`.
///
/// Empty or non-PDF uploads are rejected before pdfium is bound, so they fail
/// with [`AtsError::DocumentConversion`] even on hosts without pdfium.
pub async fn render_first_page(
    bytes: Vec<u8>,
    config: &ScorerConfig,
) -> Result<DynamicImage, AtsError> {
    validate_pdf_bytes(&bytes)?;

    let dpi = config.dpi;
    let max_pixels = config.max_rendered_pixels;
    let lib_path = config.pdfium_lib_path.clone();

    tokio::task::spawn_blocking(move || {
        render_first_page_blocking(bytes, dpi, max_pixels, lib_path.as_deref())
    })
    .await
    .map_err(|e| AtsError::DocumentConversion {
        detail: format!("render task panicked: {e}"),
    })?
}

/// Blocking implementation of first-page rendering.
fn render_first_page_blocking(
    bytes: Vec<u8>,
    dpi: u32,
    max_pixels: u32,
    lib_path: Option<&Path>,
) -> Result<DynamicImage, AtsError> {
    let pdfium = bind_pdfium(lib_path)?;

    let document = pdfium
        .load_pdf_from_byte_vec(bytes, None)
        .map_err(|e| AtsError::DocumentConversion {
            detail: format!("PDF illisible: {e:?}"),
        })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    if total_pages == 0 {
        return Err(AtsError::DocumentConversion {
            detail: "le PDF ne contient aucune page".into(),
        });
    }
    info!("PDF loaded: {} pages, rendering page 1", total_pages);

    let page = pages.get(0).map_err(|e| AtsError::DocumentConversion {
        detail: format!("page 1 inaccessible: {e:?}"),
    })?;

    let render_config = PdfRenderConfig::new()
        .scale_page_by_factor(dpi as f32 / 72.0)
        .set_maximum_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| AtsError::DocumentConversion {
            detail: format!("rasterisation failed: {e:?}"),
        })?;

    let image = bitmap.as_image();
    debug!("Rendered page 1 → {}x{} px", image.width(), image.height());

    Ok(image)
}

/// Resolve the pdfium library path from an optional override.
///
/// A directory is expanded to the platform library name inside it.
pub fn resolve_library_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        Pdfium::pdfium_platform_library_name_at_path(path)
    } else {
        path.to_path_buf()
    }
}
