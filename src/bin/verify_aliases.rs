//! Offline kontrola slugů a aliasů — bez sítě.
//!
//! Vypíše uzávěr alias tabulky a slug pro vzorová jména. Pokud existuje
//! league soubor z minulého dumpu, ohlásí jména, jejichž slug ani alias
//! v něm není.

use anyhow::{Context, Result};
use dotenv::dotenv;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use team_history::{slugify, AliasTable, TeamEntry};
use understat_dump::DumpConfig;

#[derive(Deserialize)]
struct LeagueFile {
    teams: Vec<TeamEntry>,
}

fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
        .init();

    let cfg = DumpConfig::from_env()?;
    let aliases = AliasTable::builtin();

    tracing::info!("=== Alias table ({} slugs) ===", aliases.len());
    for (slug, others) in aliases.iter() {
        let others: Vec<_> = others.iter().map(String::as_str).collect();
        tracing::info!("{:<26} -> {}", slug, others.join(", "));
    }

    let samples = [
        "Manchester City",
        "Manchester United",
        "Tottenham",
        "Wolverhampton Wanderers",
        "West Ham",
        "Nottingham Forest",
        "Nott'm Forest",
        "Brighton & Hove Albion",
        "Newcastle United",
        "Crystal Palace",
    ];

    let league_path = cfg
        .out_dir
        .join("league")
        .join(&cfg.league)
        .join(format!("{}.json", cfg.season));

    let known: Option<BTreeSet<String>> = if league_path.exists() {
        let raw = fs::read_to_string(&league_path)
            .with_context(|| format!("read {}", league_path.display()))?;
        let file: LeagueFile = serde_json::from_str(&raw)
            .with_context(|| format!("parse {}", league_path.display()))?;
        Some(file.teams.into_iter().map(|t| t.slug).collect())
    } else {
        tracing::warn!("{} not found, skipping league cross-check", league_path.display());
        None
    };

    tracing::info!("=== Sample names ===");
    for name in samples {
        let slug = slugify(name);
        let alias_set = aliases.aliases_of(&slug);
        let resolved = known.as_ref().map(|known| {
            known.contains(&slug) || alias_set.iter().any(|a| known.contains(a))
        });

        match resolved {
            Some(false) => tracing::warn!("{:<26} -> {:<26} NOT IN LEAGUE FILE", name, slug),
            _ => tracing::info!("{:<26} -> {:<26} aliases={:?}", name, slug, alias_set),
        }
    }

    Ok(())
}
