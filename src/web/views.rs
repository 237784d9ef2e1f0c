//! Page templates and the view models behind them.

use crate::application::{EducationLevel, INCOME_MAX, INCOME_STEP};
use crate::leaderboard::ScoredRecord;
use askama::Template;
use pulldown_cmark::{html, Event, Parser, Tag};

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage;

#[derive(Template, Default)]
#[template(path = "resume.html")]
pub struct ResumePage {
    pub job_description: String,
    pub error: Option<String>,
    pub analysis_html: Option<String>,
}

#[derive(Template)]
#[template(path = "scholarship.html")]
pub struct ScholarshipPage {
    pub name: String,
    pub email: String,
    pub levels: Vec<LevelOption>,
    pub income: String,
    pub income_max: u32,
    pub income_step: u32,
    pub motivation: String,
    pub error: Option<String>,
    pub evaluation_html: Option<String>,
    pub score: Option<u8>,
    pub rows: Vec<LeaderboardRow>,
}

impl Default for ScholarshipPage {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            levels: level_options(None),
            income: "0".to_string(),
            income_max: INCOME_MAX,
            income_step: INCOME_STEP,
            motivation: String::new(),
            error: None,
            evaluation_html: None,
            score: None,
            rows: Vec::new(),
        }
    }
}

pub struct LevelOption {
    pub value: &'static str,
    pub selected: bool,
}

/// Dropdown entries, with `selected` (case-insensitive) pre-selected.
pub fn level_options(selected: Option<&str>) -> Vec<LevelOption> {
    EducationLevel::ALL
        .iter()
        .map(|level| LevelOption {
            value: level.as_str(),
            selected: selected.is_some_and(|s| s.trim().eq_ignore_ascii_case(level.as_str())),
        })
        .collect()
}

pub struct LeaderboardRow {
    pub rank: usize,
    pub name: String,
    pub email: String,
    pub education_level: String,
    pub income: u32,
    pub score: String,
}

/// Rows for an already-ranked leaderboard.
pub fn leaderboard_rows(records: &[ScoredRecord]) -> Vec<LeaderboardRow> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| LeaderboardRow {
            rank: i + 1,
            name: r.name.clone(),
            email: r.email.clone(),
            education_level: r.education_level.clone(),
            income: r.income,
            score: r.score.map_or_else(|| "-".to_string(), |s| s.to_string()),
        })
        .collect()
}

/// Render model Markdown as HTML.
///
/// Raw HTML in the model output is emitted as text, so it is escaped. Links
/// and images whose target is not http(s) or relative keep only their text.
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new(markdown).filter_map(|event| match event {
        Event::Html(raw) => Some(Event::Text(raw)),
        Event::Start(Tag::Link(_, ref dest, _) | Tag::Image(_, ref dest, _))
        | Event::End(Tag::Link(_, ref dest, _) | Tag::Image(_, ref dest, _))
            if !is_web_target(dest) =>
        {
            None
        }
        other => Some(other),
    });
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

fn is_web_target(dest: &str) -> bool {
    // Browsers ignore whitespace and control characters inside a scheme.
    let dest: String = dest
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    match dest.find(':') {
        Some(colon) if !dest[..colon].contains(['/', '?', '#']) => {
            matches!(&dest[..colon], "http" | "https")
        }
        _ => true,
    }
}
