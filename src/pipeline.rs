use crate::config::DumpConfig;
use anyhow::{Context, Result};
use logger::{
    now_iso, DumpStartedEvent, EventLogger, FetchStatusEvent, RecordSkippedEvent, RunSummaryEvent,
};
use snapshot_writer::SnapshotWriter;
use std::collections::BTreeMap;
use std::time::Instant;
use team_history::{build_histories, AliasTable, RawMatch, SkipReason, TeamEntry};
use tracing::{debug, info, warn};
use understat_client::StatsSource;

/// Co se během běhu stalo
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpSummary {
    pub teams:           usize,
    pub team_files:      usize,
    pub alias_files:     usize,
    /// zápasy bez výsledku (`isResult: false`), nejde o chybu dat
    pub fixtures:        usize,
    pub records_skipped: usize,
    pub shots_fetched:   usize,
    pub shots_present:   usize,
}

/// Seznam týmů odvozený ze zápasů, když upstream nedodá teamsData
pub fn teams_from_matches(matches: &[RawMatch]) -> Vec<TeamEntry> {
    let mut by_title: BTreeMap<String, String> = BTreeMap::new();
    for m in matches {
        let sides = [
            (&m.home_team_id, &m.home_team_name),
            (&m.away_team_id, &m.away_team_name),
        ];
        for (id, title) in sides {
            if let (Some(id), Some(title)) = (id, title) {
                by_title.entry(title.clone()).or_insert_with(|| id.clone());
            }
        }
    }
    by_title.into_iter().map(|(title, id)| TeamEntry::new(id, title)).collect()
}

/// Jeden kompletní dump: liga → týmy → (volitelně) shot data.
/// Chyba upstreamu nebo zápisu běh ukončí.
pub async fn run_dump<S: StatsSource + ?Sized>(
    cfg: &DumpConfig,
    source: &mut S,
    aliases: &AliasTable,
    events: &EventLogger,
) -> Result<DumpSummary> {
    let started = Instant::now();
    let writer = SnapshotWriter::new(&cfg.out_dir, &cfg.league, cfg.season);
    let mut summary = DumpSummary::default();

    let _ = events.log(&DumpStartedEvent {
        ts:         now_iso(),
        event:      "DUMP_STARTED",
        league:     cfg.league.clone(),
        season:     cfg.season,
        out_dir:    cfg.out_dir.display().to_string(),
        dump_shots: cfg.dump_shots,
    });

    // 1) Liga — jediný fetch, ze kterého se odvodí vše ostatní
    let page = match source.league_page(&cfg.league, cfg.season).await {
        Ok(page) => page,
        Err(e) => {
            let _ = events.log(&FetchStatusEvent {
                ts:      now_iso(),
                event:   "FETCH_STATUS",
                source:  "understat".to_string(),
                scope:   "league".to_string(),
                ok:      false,
                message: format!("{e:#}"),
                items:   0,
            });
            return Err(e).with_context(|| format!("league fetch {} {}", cfg.league, cfg.season));
        }
    };
    let _ = events.log(&FetchStatusEvent {
        ts:      now_iso(),
        event:   "FETCH_STATUS",
        source:  "understat".to_string(),
        scope:   "league".to_string(),
        ok:      true,
        message: "ok".to_string(),
        items:   page.matches.len(),
    });

    // 2) Soubor ligy
    let mut teams = if page.teams.is_empty() {
        warn!("No teamsData from upstream, deriving team list from results");
        teams_from_matches(&page.matches)
    } else {
        page.teams.clone()
    };
    teams.sort_by(|a, b| a.title.cmp(&b.title));
    summary.teams = teams.len();
    let league_path = writer.write_league(&teams)?;
    info!("League file: {} ({} teams)", league_path.display(), teams.len());

    // 3) Historie týmů
    let build = build_histories(&page.matches, aliases);
    for (match_id, reason) in &build.skipped {
        if *reason == SkipReason::NotPlayed {
            debug!(match_id = ?match_id, "Fixture without result");
            summary.fixtures += 1;
            continue;
        }
        summary.records_skipped += 1;
        warn!(match_id = ?match_id, reason = %reason, "Skipping match record");
        let _ = events.log(&RecordSkippedEvent {
            ts:       now_iso(),
            event:    "RECORD_SKIPPED",
            league:   cfg.league.clone(),
            season:   cfg.season,
            match_id: *match_id,
            reason:   reason.to_string(),
        });
    }

    for (slug, history) in &build.histories {
        if slug.is_empty() {
            warn!("Team name without alphanumerics, {} records not written", history.len());
            continue;
        }
        writer.write_team_history(slug, history)?;
        if build.is_alias(slug) {
            summary.alias_files += 1;
        } else {
            summary.team_files += 1;
        }
    }
    info!(
        "Team files: {} canonical + {} alias, {} fixtures, {} records skipped",
        summary.team_files, summary.alias_files, summary.fixtures, summary.records_skipped
    );

    // 4) Shot data — sekvenčně, existující soubor = hotovo
    if cfg.dump_shots {
        for match_id in build.match_ids() {
            if writer.has_match(match_id) {
                summary.shots_present += 1;
                continue;
            }
            let shots = source
                .match_shots(match_id)
                .await
                .with_context(|| format!("shots fetch for match {match_id}"))?;
            if writer.write_match(match_id, &shots)? {
                summary.shots_fetched += 1;
            } else {
                summary.shots_present += 1;
            }
        }
        info!(
            "Shot files: {} fetched, {} already present",
            summary.shots_fetched, summary.shots_present
        );
    }

    let _ = events.log(&RunSummaryEvent {
        ts:              now_iso(),
        event:           "RUN_SUMMARY",
        league:          cfg.league.clone(),
        season:          cfg.season,
        teams:           summary.teams,
        team_files:      summary.team_files,
        alias_files:     summary.alias_files,
        fixtures:        summary.fixtures,
        records_skipped: summary.records_skipped,
        shots_fetched:   summary.shots_fetched,
        shots_present:   summary.shots_present,
        duration_ms:     started.elapsed().as_millis() as u64,
    });

    Ok(summary)
}
