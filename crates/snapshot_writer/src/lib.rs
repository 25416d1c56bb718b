//! Statické JSON snapshoty pro front-end
//!
//!   league/<LEAGUE>/<SEASON>.json  → { "teams":   [ { id, title, slug } ] }
//!   team/<slug>/<SEASON>.json      → { "history": [ { id, h_a, scored, conceded, date } ] }
//!   match/<id>.json                → shot payload z upstreamu, zapsaný jen jednou

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use team_history::{TeamEntry, TeamHistoryRecord};
use tempfile::NamedTempFile;
use tracing::debug;

#[derive(Serialize)]
struct LeagueFile<'a> {
    teams: &'a [TeamEntry],
}

#[derive(Serialize)]
struct TeamFile<'a> {
    history: &'a [TeamHistoryRecord],
}

pub struct SnapshotWriter {
    out_dir: PathBuf,
    league:  String,
    season:  u32,
}

impl SnapshotWriter {
    pub fn new(out_dir: impl Into<PathBuf>, league: impl Into<String>, season: u32) -> Self {
        Self {
            out_dir: out_dir.into(),
            league:  league.into(),
            season,
        }
    }

    pub fn league_path(&self) -> PathBuf {
        self.out_dir
            .join("league")
            .join(&self.league)
            .join(format!("{}.json", self.season))
    }

    pub fn team_path(&self, slug: &str) -> PathBuf {
        self.out_dir
            .join("team")
            .join(slug)
            .join(format!("{}.json", self.season))
    }

    pub fn match_path(&self, match_id: i64) -> PathBuf {
        self.out_dir.join("match").join(format!("{match_id}.json"))
    }

    /// Přepíše soubor ligy
    pub fn write_league(&self, teams: &[TeamEntry]) -> Result<PathBuf> {
        let path = self.league_path();
        write_json(&path, &LeagueFile { teams })?;
        Ok(path)
    }

    /// Přepíše historii týmu. Prázdný slug by skončil o adresář výš → chyba.
    pub fn write_team_history(&self, slug: &str, history: &[TeamHistoryRecord]) -> Result<PathBuf> {
        if slug.is_empty() {
            bail!("refusing to write team history under an empty slug");
        }
        let path = self.team_path(slug);
        write_json(&path, &TeamFile { history })?;
        Ok(path)
    }

    pub fn has_match(&self, match_id: i64) -> bool {
        self.match_path(match_id).exists()
    }

    /// Zapíše shot data jen pokud soubor ještě neexistuje.
    /// `Ok(false)` = soubor už byl, nic se nepřepsalo.
    ///
    /// Zapisuje se přes temp soubor ve stejném adresáři; cílové jméno dostane
    /// až kompletní soubor.
    pub fn write_match<T: Serialize>(&self, match_id: i64, payload: &T) -> Result<bool> {
        let path = self.match_path(match_id);
        if path.exists() {
            debug!("{} already present", path.display());
            return Ok(false);
        }
        let dir = self.out_dir.join("match");
        fs::create_dir_all(&dir).with_context(|| format!("create dir {}", dir.display()))?;

        let mut tmp = NamedTempFile::new_in(&dir)
            .with_context(|| format!("create temp file in {}", dir.display()))?;
        {
            let mut w = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer(&mut w, payload).with_context(|| format!("serialize {}", path.display()))?;
            w.flush().with_context(|| format!("flush {}", path.display()))?;
        }

        match tmp.persist_noclobber(&path) {
            Ok(_) => Ok(true),
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                debug!("{} appeared concurrently", path.display());
                Ok(false)
            }
            Err(e) => Err(e.error).with_context(|| format!("persist {}", path.display())),
        }
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    }
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    serde_json::to_writer(&mut w, value).with_context(|| format!("serialize {}", path.display()))?;
    w.flush().with_context(|| format!("flush {}", path.display()))?;
    debug!("wrote {}", path.display());
    Ok(())
}
