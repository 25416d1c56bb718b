//! Diagnostická binárka pro Understat endpointy
//! Spustit: cargo run --bin understat-check
//!
//! Ověří, že stránka ligy a jednoho zápasu obsahují data, která dump čte.

use anyhow::Result;
use dotenv::dotenv;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use understat_client::UnderstatClient;
use understat_dump::DumpConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cfg = DumpConfig::from_env()?;
    let mut client = UnderstatClient::new(&cfg.base_url, cfg.min_request_interval)?;

    info!("🩺 Checking Understat for {} {}...", cfg.league, cfg.season);
    let league_url = client.league_url(&cfg.league, cfg.season);
    match client.check_endpoint(&league_url).await {
        Ok(report) => info!(
            "Check {} -> html_len={}, vars={:?}, challenge_page={}",
            report.url, report.html_len, report.vars_found, report.looks_like_challenge_page
        ),
        Err(e) => warn!("Check {} failed: {}", league_url, e),
    }

    let page = client.fetch_league_page(&cfg.league, cfg.season).await?;
    let results = page.results();
    info!(
        "League page: {} matches ({} played), {} teams",
        page.matches.len(),
        results.len(),
        page.teams.len()
    );

    let Some(last_id) = results.iter().filter_map(|m| m.id).max() else {
        warn!("No played matches yet, skipping match check");
        return Ok(());
    };

    let match_url = client.match_url(last_id);
    match client.check_endpoint(&match_url).await {
        Ok(report) => info!(
            "Check {} -> html_len={}, vars={:?}, challenge_page={}",
            report.url, report.html_len, report.vars_found, report.looks_like_challenge_page
        ),
        Err(e) => warn!("Check {} failed: {}", match_url, e),
    }

    match client.fetch_match_shots(last_id).await {
        Ok(shots) => {
            let count = |side: &str| shots.get(side).and_then(|v| v.as_array()).map_or(0, Vec::len);
            info!("Match {} shots: h={} a={}", last_id, count("h"), count("a"));
        }
        Err(e) => warn!("Match {} shots failed: {}", last_id, e),
    }

    info!("Check finished.");
    Ok(())
}
