//! Understat.com klient pro dump sezóny
//!
//! Zdroje:
//!   https://understat.com/league/<LEAGUE>/<SEASON>  → datesData, teamsData
//!   https://understat.com/match/<id>                → shotsData
//!
//! Když stránka data neobsahuje (Understat je občas přesouvá do XHR), fallback na
//!   /getLeagueData/<LEAGUE>/<SEASON> a /getMatchData/<id>

pub mod embedded;
pub mod wire;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, USER_AGENT};
use serde_json::Value;
use std::time::{Duration, Instant};
use team_history::{RawMatch, TeamEntry};
use tokio::time::sleep;
use tracing::{debug, info, warn};

pub use embedded::{decode_js_string, extract_embedded_json, present_vars};

pub const DEFAULT_BASE_URL: &str = "https://understat.com";

/// Jedna liga × sezóna, tak jak ji vrací upstream
#[derive(Debug, Clone, Default)]
pub struct LeaguePage {
    pub matches: Vec<RawMatch>,
    pub teams:   Vec<TeamEntry>,
}

impl LeaguePage {
    /// Jen odehrané zápasy (`isResult`), neznámý stav necháme na validaci
    pub fn results(&self) -> Vec<RawMatch> {
        self.matches
            .iter()
            .filter(|m| m.is_result != Some(false))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct EndpointReport {
    pub url:                       String,
    pub html_len:                  usize,
    pub vars_found:                Vec<&'static str>,
    pub looks_like_challenge_page: bool,
}

/// Zdroj dat pro dump. Produkčně `UnderstatClient`, v testech fake.
#[async_trait]
pub trait StatsSource: Send {
    async fn league_page(&mut self, league: &str, season: u32) -> Result<LeaguePage>;
    async fn match_shots(&mut self, match_id: i64) -> Result<Value>;
}

/// Understat klient s rate limitem a rotací user-agentů
pub struct UnderstatClient {
    client:               reqwest::Client,
    base_url:             String,
    user_agents:          Vec<&'static str>,
    current_ua_index:     usize,
    last_request:         Option<Instant>,
    min_request_interval: Duration,
}

impl UnderstatClient {
    pub fn new(base_url: impl Into<String>, min_request_interval: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,application/json;q=0.8,*/*;q=0.7"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(20))
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_agents: vec![
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36",
            ],
            current_ua_index: 0,
            last_request: None,
            min_request_interval,
        })
    }

    pub fn league_url(&self, league: &str, season: u32) -> String {
        format!("{}/league/{}/{}", self.base_url, league, season)
    }

    pub fn match_url(&self, match_id: i64) -> String {
        format!("{}/match/{}", self.base_url, match_id)
    }

    fn rotate_user_agent(&mut self) {
        self.current_ua_index = (self.current_ua_index + 1) % self.user_agents.len();
    }

    fn current_user_agent(&self) -> &'static str {
        self.user_agents[self.current_ua_index]
    }

    async fn wait_for_rate_limit(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_request_interval {
                sleep(self.min_request_interval - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
    }

    async fn fetch_text(&mut self, url: &str, xhr: bool) -> Result<String> {
        self.wait_for_rate_limit().await;

        let mut req = self.client.get(url).header(USER_AGENT, self.current_user_agent());
        if xhr {
            req = req.header("X-Requested-With", "XMLHttpRequest");
        }

        let resp = req
            .send()
            .await
            .with_context(|| format!("Understat request failed for {url}"))?;

        let status = resp.status();
        if !status.is_success() {
            bail!("Understat HTTP {} for {}", status, url);
        }

        let body = resp.text().await.with_context(|| format!("Understat body read failed for {url}"))?;
        self.rotate_user_agent();
        debug!("GET {} -> {} bytes", url, body.len());
        Ok(body)
    }

    async fn fetch_json(&mut self, url: &str) -> Result<Value> {
        let raw = self.fetch_text(url, true).await?;
        serde_json::from_str(&raw).with_context(|| format!("Understat JSON parse failed for {url}"))
    }

    /// Výsledky + týmy ligy v jedné stránce
    pub async fn fetch_league_page(&mut self, league: &str, season: u32) -> Result<LeaguePage> {
        let url = self.league_url(league, season);
        let html = self.fetch_text(&url, false).await?;

        let (dates, teams) = match extract_embedded_json(&html, "datesData")? {
            Some(dates) => (dates, extract_embedded_json(&html, "teamsData")?),
            None => {
                warn!("datesData not embedded in {}, trying getLeagueData", url);
                let data_url = format!("{}/getLeagueData/{}/{}", self.base_url, league, season);
                let mut data = self.fetch_json(&data_url).await?;
                let dates = data
                    .get_mut("dates")
                    .map(Value::take)
                    .ok_or_else(|| anyhow!("getLeagueData response has no `dates`"))?;
                (dates, data.get_mut("teams").map(Value::take))
            }
        };

        let matches = wire::parse_matches(dates)?;
        let teams = match teams {
            Some(t) => wire::parse_teams(t)?,
            None => Vec::new(),
        };

        info!("Understat {} {}: {} matches, {} teams", league, season, matches.len(), teams.len());
        Ok(LeaguePage { matches, teams })
    }

    /// Shot data zápasu `{ "h": [...], "a": [...] }`, payload neinterpretujeme
    pub async fn fetch_match_shots(&mut self, match_id: i64) -> Result<Value> {
        let url = self.match_url(match_id);
        let html = self.fetch_text(&url, false).await?;

        if let Some(shots) = extract_embedded_json(&html, "shotsData")? {
            return Ok(shots);
        }

        warn!("shotsData not embedded in {}, trying getMatchData", url);
        let data_url = format!("{}/getMatchData/{}", self.base_url, match_id);
        let mut data = self.fetch_json(&data_url).await?;
        data.get_mut("shots")
            .map(Value::take)
            .ok_or_else(|| anyhow!("getMatchData response for {} has no `shots`", match_id))
    }

    pub async fn check_endpoint(&mut self, url: &str) -> Result<EndpointReport> {
        let html = self.fetch_text(url, false).await?;
        let lower = html.to_lowercase();
        let looks_like_challenge_page = lower.contains("just a moment")
            || lower.contains("cf-challenge")
            || lower.contains("captcha")
            || lower.contains("cloudflare");

        Ok(EndpointReport {
            url: url.to_string(),
            html_len: html.len(),
            vars_found: present_vars(&html),
            looks_like_challenge_page,
        })
    }
}

#[async_trait]
impl StatsSource for UnderstatClient {
    async fn league_page(&mut self, league: &str, season: u32) -> Result<LeaguePage> {
        self.fetch_league_page(league, season).await
    }

    async fn match_shots(&mut self, match_id: i64) -> Result<Value> {
        self.fetch_match_shots(match_id).await
    }
}
