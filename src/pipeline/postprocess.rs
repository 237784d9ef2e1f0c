//! Post-processing of résumé rewrites.
//!
//! Asked to rewrite a CV, the model often appends a commentary section after
//! the résumé itself ("**Wording:** I changed...", "**ATS Optimization:** ...").
//! None of that belongs in the downloadable PDF, so the text is cut at the
//! first chatter marker.
//!
//! ## Rule
//!
//! For each marker in [`RESUME_MARKERS`], in order, keep the text before its
//! first occurrence. Because each cut only ever shortens the text, the result
//! is the prefix before the earliest marker of any kind, and running the
//! cleanup twice gives the same result as running it once.

/// Phrases that start model commentary rather than résumé content.
pub const RESUME_MARKERS: [&str; 5] = [
    "Okay, here's a revised resume",
    "**Wording:**",
    "**ATS Optimization:**",
    "**Conciseness:**",
    "**French to English**",
];

/// Truncate `raw` at the chatter markers and trim surrounding whitespace.
pub fn clean_resume_text(raw: &str) -> String {
    RESUME_MARKERS
        .iter()
        .fold(raw, |text, marker| match text.find(marker) {
            Some(pos) => &text[..pos],
            None => text,
        })
        .trim()
        .to_string()
}
