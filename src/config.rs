use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use understat_client::DEFAULT_BASE_URL;

/// Vše, co dump potřebuje vědět. Žádné globály — předává se do `run_dump`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpConfig {
    pub league:               String,
    pub season:               u32,
    pub out_dir:              PathBuf,
    pub dump_shots:           bool,
    pub log_dir:              PathBuf,
    pub base_url:             String,
    pub min_request_interval: Duration,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            league:               "EPL".to_string(),
            season:               2025,
            out_dir:              PathBuf::from("public"),
            dump_shots:           true,
            log_dir:              PathBuf::from("logs"),
            base_url:             DEFAULT_BASE_URL.to_string(),
            min_request_interval: Duration::from_millis(1500),
        }
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("{key}: expected a boolean, got {other:?}"),
    }
}

impl DumpConfig {
    /// Načte z procesu (po `dotenv()`)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Testovatelná varianta — `lookup` vrací hodnotu proměnné
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("UNDERSTAT_LEAGUE") {
            cfg.league = v.trim().to_string();
        }
        if let Some(v) = get("UNDERSTAT_SEASON") {
            cfg.season = v
                .trim()
                .parse()
                .with_context(|| format!("UNDERSTAT_SEASON: invalid season {v:?}"))?;
        }
        if let Some(v) = get("DUMP_OUT_DIR") {
            cfg.out_dir = PathBuf::from(v);
        }
        if let Some(v) = get("DUMP_SHOTS") {
            cfg.dump_shots = parse_bool("DUMP_SHOTS", &v)?;
        }
        if let Some(v) = get("DUMP_LOG_DIR") {
            cfg.log_dir = PathBuf::from(v);
        }
        if let Some(v) = get("UNDERSTAT_BASE_URL") {
            cfg.base_url = v.trim().to_string();
        }
        if let Some(v) = get("UNDERSTAT_MIN_INTERVAL_MS") {
            let ms: u64 = v
                .trim()
                .parse()
                .with_context(|| format!("UNDERSTAT_MIN_INTERVAL_MS: invalid value {v:?}"))?;
            cfg.min_request_interval = Duration::from_millis(ms);
        }

        if cfg.league.contains(['/', '\\']) {
            bail!("UNDERSTAT_LEAGUE must not contain path separators: {:?}", cfg.league);
        }

        Ok(cfg)
    }
}
