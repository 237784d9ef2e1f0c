//! Scholarship leaderboard: every scored application, ranked by score.
//!
//! The store is a trait so workflows can be exercised against
//! [`InMemoryLeaderboard`]; production uses [`CsvLeaderboard`], a flat file
//! with the header `Name,Email,EducationLevel,Income,Motivation,Score`.
//!
//! Appends within one process are serialised by a mutex. Nothing guards
//! against a second process writing the same file.

use crate::application::ScholarshipApplication;
use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "EducationLevel")]
    pub education_level: String,
    #[serde(rename = "Income")]
    pub income: u32,
    #[serde(rename = "Motivation")]
    pub motivation: String,
    /// Empty in hand-edited rows; such rows rank last.
    #[serde(rename = "Score")]
    pub score: Option<u8>,
}

impl ScoredRecord {
    pub fn from_application(application: &ScholarshipApplication, score: u8) -> Self {
        Self {
            name: application.name.clone(),
            email: application.email.clone(),
            education_level: application.education_level.to_string(),
            income: application.income,
            motivation: application.motivation.clone(),
            score: Some(score),
        }
    }
}

/// Storage abstraction for scored applications.
pub trait LeaderboardStore: Send + Sync {
    fn append(&self, record: &ScoredRecord) -> Result<(), StoreError>;
    fn load_all(&self) -> Result<Vec<ScoredRecord>, StoreError>;
}

/// Sort by score descending. Stable, so ties keep insertion order; rows
/// without a score go last.
pub fn ranked(mut records: Vec<ScoredRecord>) -> Vec<ScoredRecord> {
    records.sort_by(|a, b| b.score.cmp(&a.score));
    records
}

/// CSV file store.
#[derive(Debug)]
pub struct CsvLeaderboard {
    path: PathBuf,
    lock: Mutex<()>,
}

impl CsvLeaderboard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl LeaderboardStore for CsvLeaderboard {
    fn append(&self, record: &ScoredRecord) -> Result<(), StoreError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| StoreError::Unavailable("leaderboard lock poisoned".into()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_err(e))?;
        let needs_header = file.metadata().map_err(|e| self.io_err(e))?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush().map_err(|e| self.io_err(e))?;

        info!(
            "Leaderboard: recorded {} with score {:?} in {}",
            record.name,
            record.score,
            self.path.display()
        );
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<ScoredRecord>, StoreError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| StoreError::Unavailable("leaderboard lock poisoned".into()))?;

        if !self.path.exists() {
            debug!("Leaderboard file {} absent, empty board", self.path.display());
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)?;
        let records = reader
            .deserialize::<ScoredRecord>()
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Leaderboard: loaded {} rows", records.len());
        Ok(records)
    }
}

/// Process-local store for tests and dry runs.
#[derive(Debug, Default)]
pub struct InMemoryLeaderboard {
    records: Mutex<Vec<ScoredRecord>>,
}

impl InMemoryLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LeaderboardStore for InMemoryLeaderboard {
    fn append(&self, record: &ScoredRecord) -> Result<(), StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("leaderboard lock poisoned".into()))?
            .push(record.clone());
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<ScoredRecord>, StoreError> {
        Ok(self
            .records
            .lock()
            .map_err(|_| StoreError::Unavailable("leaderboard lock poisoned".into()))?
            .clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(name: &str, score: Option<u8>) -> ScoredRecord {
        ScoredRecord {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            education_level: "Master".to_string(),
            income: 200_000,
            motivation: "Je veux apprendre, \"vraiment\".\nDeuxième ligne".to_string(),
            score,
        }
    }

    #[test]
    fn appended_rows_load_back_ranked() {
        let dir = tempdir().unwrap();
        let store = CsvLeaderboard::new(dir.path().join("candidatures.csv"));
        for (name, score) in [("A", 50), ("B", 90), ("C", 70)] {
            store.append(&record(name, Some(score))).unwrap();
        }

        let scores: Vec<_> = ranked(store.load_all().unwrap())
            .into_iter()
            .map(|r| r.score)
            .collect();
        assert_eq!(scores, vec![Some(90), Some(70), Some(50)]);
    }

    #[test]
    fn header_is_written_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("board.csv");
        let store = CsvLeaderboard::new(&path);
        store.append(&record("A", Some(10))).unwrap();
        store.append(&record("B", Some(20))).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let header = "Name,Email,EducationLevel,Income,Motivation,Score";
        assert!(contents.starts_with(header));
        assert_eq!(contents.matches(header).count(), 1);

        let records = csv::Reader::from_path(&path)
            .unwrap()
            .records()
            .count();
        assert_eq!(records, 2);
        assert_eq!(store.load_all().unwrap().len(), 2);
    }

    #[test]
    fn empty_existing_file_gets_a_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("board.csv");
        fs::write(&path, "").unwrap();
        let store = CsvLeaderboard::new(&path);
        store.append(&record("A", Some(42))).unwrap();
        assert_eq!(store.load_all().unwrap().len(), 1);
    }

    #[test]
    fn parent_directory_is_created() {
        let dir = tempdir().unwrap();
        let store = CsvLeaderboard::new(dir.path().join("data/nested/board.csv"));
        store.append(&record("A", Some(1))).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn missing_file_is_an_empty_board() {
        let dir = tempdir().unwrap();
        let store = CsvLeaderboard::new(dir.path().join("absent.csv"));
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn multiline_motivation_survives() {
        let dir = tempdir().unwrap();
        let store = CsvLeaderboard::new(dir.path().join("board.csv"));
        let original = record("A", Some(64));
        store.append(&original).unwrap();
        assert_eq!(store.load_all().unwrap(), vec![original]);
    }

    #[test]
    fn ranking_is_stable_with_unscored_rows_last() {
        let records = vec![
            record("A", None),
            record("B", Some(70)),
            record("C", Some(90)),
            record("D", Some(70)),
        ];
        let names: Vec<_> = ranked(records).into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["C", "B", "D", "A"]);
    }

    #[test]
    fn in_memory_store_round_trips() {
        let store = InMemoryLeaderboard::new();
        store.append(&record("A", Some(5))).unwrap();
        assert_eq!(store.load_all().unwrap().len(), 1);
    }
}
