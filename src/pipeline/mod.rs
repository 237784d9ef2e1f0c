//! Pipeline stages shared by the résumé and scholarship workflows.
//!
//! Each submodule implements exactly one transformation step, so each is
//! independently testable and the pdfium- or network-backed ones can be
//! replaced by fakes.
//!
//! ## Data Flow
//!
//! ```text
//! upload ──▶ render ──▶ encode ──▶ llm ──▶ postprocess / score
//! (bytes)    (pdfium)   (JPEG b64)  (VLM)   (cleanup / "Note :")
//! ```
//!
//! 1. [`input`]: reject empty or non-PDF uploads before pdfium sees them
//! 2. [`render`]: rasterise page 1 only; runs in `spawn_blocking` because
//!    pdfium is not async-safe
//! 3. [`encode`]: JPEG-encode and base64-wrap the page into a
//!    [`encode::DocumentEnvelope`]
//! 4. [`llm`]: one model call per submission, no retry
//! 5. [`postprocess`]: truncate résumé rewrites at known chatter markers
//! 6. [`score`]: pull the `Note : X/100` score out of a scholarship evaluation
//! 7. [`layout`]: lay the cleaned résumé out as an A4 PDF

pub mod encode;
pub mod input;
pub mod layout;
pub mod llm;
pub mod postprocess;
pub mod render;
pub mod score;
