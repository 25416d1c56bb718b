//! End-to-end dump proti fake zdroji, výstup do tempdir

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use logger::EventLogger;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use team_history::{AliasTable, RawMatch, TeamEntry};
use understat_client::{LeaguePage, StatsSource};
use understat_dump::{run_dump, DumpConfig};

struct FakeSource {
    page:        Option<LeaguePage>,
    shots:       HashMap<i64, Value>,
    shot_calls:  Vec<i64>,
    league_calls: usize,
}

impl FakeSource {
    fn new(page: LeaguePage) -> Self {
        Self { page: Some(page), shots: HashMap::new(), shot_calls: Vec::new(), league_calls: 0 }
    }

    fn failing() -> Self {
        Self { page: None, shots: HashMap::new(), shot_calls: Vec::new(), league_calls: 0 }
    }
}

#[async_trait]
impl StatsSource for FakeSource {
    async fn league_page(&mut self, _league: &str, _season: u32) -> Result<LeaguePage> {
        self.league_calls += 1;
        self.page.clone().ok_or_else(|| anyhow!("upstream down"))
    }

    async fn match_shots(&mut self, match_id: i64) -> Result<Value> {
        self.shot_calls.push(match_id);
        self.shots
            .get(&match_id)
            .cloned()
            .ok_or_else(|| anyhow!("no shots for {match_id}"))
    }
}

fn played(id: i64, date: &str, home: (&str, &str), away: (&str, &str), hg: i64, ag: i64) -> RawMatch {
    RawMatch {
        id:             Some(id),
        is_result:      Some(true),
        datetime:       Some(date.to_string()),
        home_team_id:   Some(home.0.to_string()),
        home_team_name: Some(home.1.to_string()),
        away_team_id:   Some(away.0.to_string()),
        away_team_name: Some(away.1.to_string()),
        home_goals:     Some(hg),
        away_goals:     Some(ag),
    }
}

const CITY: (&str, &str) = ("88", "Manchester City");
const SPURS: (&str, &str) = ("82", "Tottenham");
const WEST_HAM: (&str, &str) = ("81", "West Ham");

fn sample_page() -> LeaguePage {
    let mut broken = played(103, "2025-08-30 12:30:00", WEST_HAM, CITY, 0, 0);
    broken.away_goals = None;

    let fixture = RawMatch {
        is_result:  Some(false),
        home_goals: None,
        away_goals: None,
        ..played(200, "2026-05-24 16:00:00", SPURS, CITY, 0, 0)
    };

    LeaguePage {
        matches: vec![
            played(101, "2025-08-24 14:00:00", SPURS, WEST_HAM, 3, 0),
            played(100, "2025-08-17 15:30:00", CITY, SPURS, 2, 1),
            played(102, "2025-08-10 17:30:00", WEST_HAM, CITY, 1, 4),
            broken,
            fixture,
        ],
        teams: vec![
            TeamEntry::new("82", "Tottenham"),
            TeamEntry::new("88", "Manchester City"),
            TeamEntry::new("81", "West Ham"),
        ],
    }
}

fn config(out: &Path, dump_shots: bool) -> DumpConfig {
    DumpConfig {
        out_dir: out.join("public"),
        log_dir: out.join("logs"),
        dump_shots,
        min_request_interval: Duration::from_millis(0),
        ..DumpConfig::default()
    }
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn writes_league_teams_and_aliases() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), false);
    let events = EventLogger::new(&cfg.log_dir);
    let mut source = FakeSource::new(sample_page());

    let summary = run_dump(&cfg, &mut source, &AliasTable::builtin(), &events).await.unwrap();

    assert_eq!(summary.teams, 3);
    assert_eq!(summary.team_files, 3);
    // man-city, spurs, west-ham-united
    assert_eq!(summary.alias_files, 3);
    // fixture 200 se počítá zvlášť, chybějící góly 103 jsou chyba dat
    assert_eq!(summary.fixtures, 1);
    assert_eq!(summary.records_skipped, 1);
    assert_eq!(summary.shots_fetched, 0);
    assert!(source.shot_calls.is_empty());

    let public = cfg.out_dir.clone();
    let league = read_json(&public.join("league/EPL/2025.json"));
    assert_eq!(
        league,
        json!({"teams": [
            {"id": "88", "title": "Manchester City", "slug": "manchester-city"},
            {"id": "82", "title": "Tottenham", "slug": "tottenham"},
            {"id": "81", "title": "West Ham", "slug": "west-ham"}
        ]})
    );

    let city = read_json(&public.join("team/manchester-city/2025.json"));
    assert_eq!(
        city,
        json!({"history": [
            {"id": 102, "h_a": "a", "scored": 4, "conceded": 1, "date": "2025-08-10 17:30:00"},
            {"id": 100, "h_a": "h", "scored": 2, "conceded": 1, "date": "2025-08-17 15:30:00"}
        ]})
    );

    let spurs = read_json(&public.join("team/spurs/2025.json"));
    assert_eq!(spurs["history"][0], json!({"id": 100, "h_a": "a", "scored": 1, "conceded": 2, "date": "2025-08-17 15:30:00"}));

    // alias = byte-identický obsah
    let canonical = fs::read(public.join("team/west-ham/2025.json")).unwrap();
    let alias = fs::read(public.join("team/west-ham-united/2025.json")).unwrap();
    assert_eq!(canonical, alias);
    assert_eq!(
        fs::read(public.join("team/manchester-city/2025.json")).unwrap(),
        fs::read(public.join("team/man-city/2025.json")).unwrap()
    );
}

#[tokio::test]
async fn shots_are_fetched_once_per_match() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), true);
    let events = EventLogger::new(&cfg.log_dir);

    // 100 už z minulého běhu existuje
    let match_dir = cfg.out_dir.join("match");
    fs::create_dir_all(&match_dir).unwrap();
    fs::write(match_dir.join("100.json"), r#"{"h":["old"],"a":[]}"#).unwrap();

    let mut source = FakeSource::new(sample_page());
    for id in [100, 101, 102] {
        source.shots.insert(id, json!({"h": [{"id": id}], "a": []}));
    }

    let summary = run_dump(&cfg, &mut source, &AliasTable::builtin(), &events).await.unwrap();
    assert_eq!(source.shot_calls, vec![101, 102]);
    assert_eq!(summary.shots_fetched, 2);
    assert_eq!(summary.shots_present, 1);

    assert_eq!(read_json(&match_dir.join("100.json")), json!({"h": ["old"], "a": []}));
    assert_eq!(read_json(&match_dir.join("101.json")), json!({"h": [{"id": 101}], "a": []}));
    // neplatný zápas a fixture se nestahují
    assert!(!match_dir.join("103.json").exists());
    assert!(!match_dir.join("200.json").exists());

    // druhý běh: nic nového
    let mut again = FakeSource::new(sample_page());
    let summary = run_dump(&cfg, &mut again, &AliasTable::builtin(), &events).await.unwrap();
    assert!(again.shot_calls.is_empty());
    assert_eq!(summary.shots_present, 3);
}

#[tokio::test]
async fn upstream_failure_aborts_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), true);
    let events = EventLogger::new(&cfg.log_dir);
    let mut source = FakeSource::failing();

    let err = run_dump(&cfg, &mut source, &AliasTable::builtin(), &events).await.unwrap_err();
    assert!(format!("{err:#}").contains("upstream down"));
    assert_eq!(source.league_calls, 1);
    assert!(!cfg.out_dir.join("league").exists());
    assert!(!cfg.out_dir.join("team").exists());
}

#[tokio::test]
async fn shot_failure_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), true);
    let events = EventLogger::new(&cfg.log_dir);
    let mut source = FakeSource::new(sample_page());
    source.shots.insert(100, json!({"h": [], "a": []}));

    let err = run_dump(&cfg, &mut source, &AliasTable::builtin(), &events).await.unwrap_err();
    assert!(format!("{err:#}").contains("match 101"));
    assert!(cfg.out_dir.join("match/100.json").exists());
    assert!(!cfg.out_dir.join("match/101.json").exists());
}

#[tokio::test]
async fn team_list_falls_back_to_results_and_events_are_logged() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), false);
    let events = EventLogger::new(&cfg.log_dir);
    let mut page = sample_page();
    page.teams.clear();
    let mut source = FakeSource::new(page);

    let summary = run_dump(&cfg, &mut source, &AliasTable::builtin(), &events).await.unwrap();
    assert_eq!(summary.teams, 3);

    let league = read_json(&cfg.out_dir.join("league/EPL/2025.json"));
    let slugs: Vec<_> = league["teams"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["slug"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(slugs, vec!["manchester-city", "tottenham", "west-ham"]);

    let log = fs::read_to_string(events.current_path()).unwrap();
    let kinds: Vec<String> = log
        .lines()
        .map(|l| serde_json::from_str::<Value>(l).unwrap()["event"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(kinds, vec!["DUMP_STARTED", "FETCH_STATUS", "RECORD_SKIPPED", "RUN_SUMMARY"]);
    assert!(log.contains("missing_away_goals"));
    assert!(!log.contains("not_played"));
    let run: Value = serde_json::from_str(log.lines().last().unwrap()).unwrap();
    assert_eq!(run["fixtures"], 1);
    assert_eq!(run["records_skipped"], 1);
}
