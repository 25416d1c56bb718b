/// Understat dump — Logger
/// JSONL event stream (logs/<date>.jsonl), jeden řádek = jedna událost běhu

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

pub struct EventLogger {
    log_dir: PathBuf,
}

impl EventLogger {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        let dir = log_dir.into();
        fs::create_dir_all(&dir).ok();
        Self { log_dir: dir }
    }

    /// Soubor pro dnešní den
    pub fn current_path(&self) -> PathBuf {
        let date = Utc::now().format("%Y-%m-%d").to_string();
        self.log_dir.join(format!("{date}.jsonl"))
    }

    pub fn log<T: Serialize>(&self, event: &T) -> Result<()> {
        let path  = self.current_path();
        let line  = serde_json::to_string(event)?;
        let mut f = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(f, "{line}")?;
        Ok(())
    }
}

pub fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

// ── Event typy ────────────────────────────────────────────────────────────────

#[derive(Serialize, Debug)]
pub struct DumpStartedEvent {
    pub ts:         String,
    pub event:      &'static str,   // "DUMP_STARTED"
    pub league:     String,
    pub season:     u32,
    pub out_dir:    String,
    pub dump_shots: bool,
}

#[derive(Serialize, Debug)]
pub struct FetchStatusEvent {
    pub ts:      String,
    pub event:   &'static str,      // "FETCH_STATUS"
    pub source:  String,            // "understat"
    pub scope:   String,            // "league" | "match"
    pub ok:      bool,
    pub message: String,
    pub items:   usize,
}

#[derive(Serialize, Debug)]
pub struct RecordSkippedEvent {
    pub ts:       String,
    pub event:    &'static str,     // "RECORD_SKIPPED"
    pub league:   String,
    pub season:   u32,
    pub match_id: Option<i64>,
    pub reason:   String,
}

#[derive(Serialize, Debug)]
pub struct RunSummaryEvent {
    pub ts:              String,
    pub event:           &'static str,   // "RUN_SUMMARY"
    pub league:          String,
    pub season:          u32,
    pub teams:           usize,
    pub team_files:      usize,
    pub alias_files:     usize,
    pub fixtures:        usize,
    pub records_skipped: usize,
    pub shots_fetched:   usize,
    pub shots_present:   usize,
    pub duration_ms:     u64,
}
