//! Upload validation: cheap checks before pdfium sees the bytes.
//!
//! pdfium reports a garbage buffer as a generic load failure. Checking the
//! `%PDF` magic first gives the user a precise message and keeps obviously
//! wrong uploads (images, Word files, empty parts) out of the blocking pool.

use crate::error::AtsError;
use tracing::debug;

/// Magic bytes every PDF starts with.
pub const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Check that `bytes` plausibly holds a PDF document.
pub fn validate_pdf_bytes(bytes: &[u8]) -> Result<(), AtsError> {
    if bytes.is_empty() {
        return Err(AtsError::DocumentConversion {
            detail: "le fichier téléchargé est vide".into(),
        });
    }

    if bytes.len() < PDF_MAGIC.len() || &bytes[..PDF_MAGIC.len()] != PDF_MAGIC {
        let mut magic = [0u8; 4];
        let n = bytes.len().min(4);
        magic[..n].copy_from_slice(&bytes[..n]);
        return Err(AtsError::DocumentConversion {
            detail: format!("le fichier n'est pas un PDF valide (premiers octets: {magic:?})"),
        });
    }

    debug!("Upload looks like a PDF ({} bytes)", bytes.len());
    Ok(())
}
