/// Understat dump — sezónní snapshoty pro front-end
///
/// Co dělá:
///   1. Stáhne výsledky + týmy ligy (jeden request na stránku ligy)
///   2. Zapíše league/<LEAGUE>/<SEASON>.json
///   3. Postaví historii každého týmu a zapíše team/<slug>/<SEASON>.json (+ aliasy)
///   4. Volitelně stáhne shot data zápasů, které ještě nemají match/<id>.json
///
/// Žádné retry — chyba upstreamu běh ukončí.
///
/// Spuštění:
///   cargo run --bin dump-understat

use anyhow::{Context, Result};
use dotenv::dotenv;
use logger::EventLogger;
use std::env;
use std::fs::File;
use team_history::AliasTable;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use understat_client::UnderstatClient;
use understat_dump::{run_dump, DumpConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cfg = DumpConfig::from_env().context("invalid configuration")?;

    info!("=== Understat dump — {} {} ===", cfg.league, cfg.season);
    info!("Output: {}", cfg.out_dir.display());
    info!("Shots: {}", if cfg.dump_shots { "ON" } else { "OFF" });
    info!("Logs: {}", cfg.log_dir.display());

    // Single instance lock — dva dumpy do stejného stromu nechceme
    let lock_file_path = env::temp_dir().join("understat_dump.lock");
    let lock_file = File::create(&lock_file_path)
        .with_context(|| format!("failed to create lock file at {}", lock_file_path.display()))?;

    let mut lock = fd_lock::RwLock::new(lock_file);
    let _write_guard = match lock.try_write() {
        Ok(guard) => {
            info!("Acquired single-instance lock.");
            guard
        }
        Err(_) => {
            warn!("Another dump is already running! Exiting.");
            return Ok(());
        }
    };

    let events = EventLogger::new(&cfg.log_dir);
    let aliases = AliasTable::builtin();
    let mut client = UnderstatClient::new(&cfg.base_url, cfg.min_request_interval)?;

    let summary = run_dump(&cfg, &mut client, &aliases, &events).await?;

    info!(
        "✅ Done: {} teams, {} team files (+{} aliases), {} fixtures, {} skipped records, shots {} new / {} cached",
        summary.teams,
        summary.team_files,
        summary.alias_files,
        summary.fixtures,
        summary.records_skipped,
        summary.shots_fetched,
        summary.shots_present,
    );
    Ok(())
}
