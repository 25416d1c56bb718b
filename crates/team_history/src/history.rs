use crate::aliases::AliasTable;
use crate::model::{RawMatch, TeamHistoryRecord};
use crate::slug::slugify;
use crate::validate::{validate, SkipReason};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Výsledek jednoho průchodu přes seznam zápasů
#[derive(Debug, Clone, Default)]
pub struct HistoryBuild {
    /// slug → historie (kanonické i aliasové slugy)
    pub histories: BTreeMap<String, Vec<TeamHistoryRecord>>,
    /// slugy, které se opravdu vyskytly v datech
    pub canonical: BTreeSet<String>,
    /// (id zápasu pokud bylo, důvod)
    pub skipped:   Vec<(Option<i64>, SkipReason)>,
}

impl HistoryBuild {
    pub fn is_alias(&self, slug: &str) -> bool {
        self.histories.contains_key(slug) && !self.canonical.contains(slug)
    }

    pub fn alias_count(&self) -> usize {
        self.histories.keys().filter(|s| !self.canonical.contains(*s)).count()
    }

    /// Unikátní id platných zápasů, vzestupně
    pub fn match_ids(&self) -> Vec<i64> {
        let ids: BTreeSet<i64> = self
            .canonical
            .iter()
            .filter_map(|slug| self.histories.get(slug))
            .flatten()
            .map(|r| r.id)
            .collect();
        ids.into_iter().collect()
    }
}

/// Datum jako timestamp. RFC 3339 se zónou se převede na UTC.
fn parse_date(date: &str) -> Option<NaiveDateTime> {
    let trimmed = date.trim();
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.naive_utc())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Seřadí historii vzestupně podle data (stabilně).
/// Když jde naparsovat každé datum, řadí se podle timestampu, jinak celá
/// historie lexikograficky podle syrového stringu.
pub fn sort_history(history: &mut [TeamHistoryRecord]) {
    let parsed: Option<Vec<NaiveDateTime>> = history.iter().map(|r| parse_date(&r.date)).collect();
    match parsed {
        Some(keys) => {
            let mut keyed: Vec<(NaiveDateTime, TeamHistoryRecord)> =
                keys.into_iter().zip(history.iter().cloned()).collect();
            keyed.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.date.cmp(&b.1.date)));
            for (slot, (_, record)) in history.iter_mut().zip(keyed) {
                *slot = record;
            }
        }
        None => history.sort_by(|a, b| a.date.cmp(&b.date)),
    }
}

/// Postaví historie pro všechny týmy ze seznamu výsledků.
///
/// Neplatné záznamy skončí v `skipped`, ne v historii. Každý kanonický slug
/// s neprázdnou historií se zkopíruje pod všechny své aliasy; alias, který má
/// vlastní historii z dat, se nepřepisuje.
pub fn build_histories(results: &[RawMatch], aliases: &AliasTable) -> HistoryBuild {
    let mut build = HistoryBuild::default();

    for raw in results {
        let m = match validate(raw) {
            Ok(m) => m,
            Err(reason) => {
                build.skipped.push((raw.id, reason));
                continue;
            }
        };

        let [home, away] = m.to_records();
        for (name, record) in [(&m.home_team_name, home), (&m.away_team_name, away)] {
            let slug = slugify(name);
            build.canonical.insert(slug.clone());
            build.histories.entry(slug).or_default().push(record);
        }
    }

    for history in build.histories.values_mut() {
        sort_history(history);
    }

    // alias, na který míří víc kanonických spellingů, dostane sloučenou historii
    let mut mirrored: BTreeMap<String, Vec<TeamHistoryRecord>> = BTreeMap::new();
    for slug in &build.canonical {
        let Some(history) = build.histories.get(slug) else { continue };
        if history.is_empty() {
            continue;
        }
        for alias in aliases.aliases_of(slug) {
            if build.canonical.contains(&alias) {
                continue;
            }
            match mirrored.get_mut(&alias) {
                Some(existing) => {
                    warn!(
                        "alias {} is fed by several spellings in the data, merging {} + {} records",
                        alias,
                        existing.len(),
                        history.len()
                    );
                    for record in history {
                        if !existing.iter().any(|r| r.id == record.id && r.h_a == record.h_a) {
                            existing.push(record.clone());
                        }
                    }
                    sort_history(existing);
                }
                None => {
                    mirrored.insert(alias, history.clone());
                }
            }
        }
    }

    for (alias, history) in mirrored {
        debug!("alias {} <- {} records", alias, history.len());
        build.histories.insert(alias, history);
    }

    build
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Venue;

    fn raw(id: i64, date: &str, home: &str, away: &str, hg: i64, ag: i64) -> RawMatch {
        RawMatch {
            id:             Some(id),
            is_result:      Some(true),
            datetime:       Some(date.to_string()),
            home_team_id:   None,
            home_team_name: Some(home.to_string()),
            away_team_id:   None,
            away_team_name: Some(away.to_string()),
            home_goals:     Some(hg),
            away_goals:     Some(ag),
        }
    }

    #[test]
    fn city_spurs_example() {
        let build = build_histories(
            &[raw(100, "2025-08-17 15:30:00", "Manchester City", "Tottenham", 2, 1)],
            &AliasTable::builtin(),
        );

        let city = TeamHistoryRecord {
            id:       100,
            h_a:      Venue::Home,
            scored:   2,
            conceded: 1,
            date:     "2025-08-17 15:30:00".into(),
        };
        let spurs = TeamHistoryRecord {
            id:       100,
            h_a:      Venue::Away,
            scored:   1,
            conceded: 2,
            date:     "2025-08-17 15:30:00".into(),
        };

        assert_eq!(build.histories["manchester-city"], vec![city.clone()]);
        assert_eq!(build.histories["tottenham"], vec![spurs.clone()]);
        assert_eq!(build.histories["man-city"], vec![city]);
        assert_eq!(build.histories["spurs"], vec![spurs]);
        assert!(build.is_alias("spurs"));
        assert!(!build.is_alias("tottenham"));
        assert_eq!(build.alias_count(), 2);
    }

    #[test]
    fn sorted_by_date_ascending() {
        let build = build_histories(
            &[
                raw(2, "2025-08-17", "Arsenal", "Leeds", 1, 0),
                raw(1, "2025-08-10", "Chelsea", "Arsenal", 0, 0),
                raw(3, "2025-08-24", "Arsenal", "Fulham", 2, 2),
            ],
            &AliasTable::default(),
        );
        let dates: Vec<_> = build.histories["arsenal"].iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2025-08-10", "2025-08-17", "2025-08-24"]);
    }

    #[test]
    fn mixed_iso_forms_sort_by_time() {
        let build = build_histories(
            &[
                raw(1, "2025-08-10 17:30:00", "Arsenal", "Leeds", 1, 0),
                raw(2, "2025-08-24T14:00:00Z", "Arsenal", "Fulham", 1, 0),
                raw(3, "2025-08-17 15:30:00.000", "Chelsea", "Arsenal", 0, 2),
            ],
            &AliasTable::default(),
        );
        let dates: Vec<_> = build.histories["arsenal"].iter().map(|r| r.date.as_str()).collect();
        assert_eq!(
            dates,
            vec!["2025-08-10 17:30:00", "2025-08-17 15:30:00.000", "2025-08-24T14:00:00Z"]
        );
    }

    #[test]
    fn offset_dates_are_compared_in_utc() {
        let build = build_histories(
            &[
                raw(1, "2025-08-10T20:00:00+02:00", "Arsenal", "Leeds", 1, 0),
                raw(2, "2025-08-10 19:00:00", "Arsenal", "Fulham", 1, 0),
            ],
            &AliasTable::default(),
        );
        let ids: Vec<_> = build.histories["arsenal"].iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn unparseable_date_falls_back_to_lexicographic() {
        let build = build_histories(
            &[
                raw(1, "2025-08-17 12:00:00", "Arsenal", "Leeds", 1, 0),
                raw(2, "TBD", "Arsenal", "Fulham", 1, 0),
                raw(3, "2025-08-10 12:00:00", "Arsenal", "Chelsea", 1, 0),
            ],
            &AliasTable::default(),
        );
        let ids: Vec<_> = build.histories["arsenal"].iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn alias_fed_by_two_spellings_gets_merged_history() {
        let build = build_histories(
            &[
                raw(1, "2025-08-17", "Man Utd", "Leeds", 1, 0),
                raw(2, "2025-08-10", "Manchester United", "Fulham", 0, 1),
            ],
            &AliasTable::builtin(),
        );
        let ids: Vec<_> = build.histories["man-united"].iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(build.histories["man-utd"].len(), 1);
        assert_eq!(build.histories["manchester-united"].len(), 1);
        assert_eq!(build.alias_count(), 1);
    }

    #[test]
    fn history_length_matches_participation() {
        let results = vec![
            raw(1, "2025-08-10", "Arsenal", "Leeds", 1, 0),
            raw(2, "2025-08-17", "Leeds", "Fulham", 0, 3),
            raw(3, "2025-08-24", "Fulham", "Arsenal", 1, 1),
            raw(4, "2025-08-31", "Arsenal", "Leeds", 2, 0),
        ];
        let build = build_histories(&results, &AliasTable::builtin());
        assert_eq!(build.histories["arsenal"].len(), 3);
        assert_eq!(build.histories["leeds"].len(), 3);
        assert_eq!(build.histories["fulham"].len(), 2);
        assert_eq!(build.match_ids(), vec![1, 2, 3, 4]);
        assert!(build.skipped.is_empty());
    }

    #[test]
    fn goal_accounting_is_reciprocal() {
        let results = vec![
            raw(1, "2025-08-10", "Arsenal", "Leeds", 4, 1),
            raw(2, "2025-08-17", "Leeds", "Arsenal", 2, 2),
        ];
        let build = build_histories(&results, &AliasTable::default());
        for id in [1, 2] {
            let a = build.histories["arsenal"].iter().find(|r| r.id == id).unwrap();
            let l = build.histories["leeds"].iter().find(|r| r.id == id).unwrap();
            assert_eq!(a.scored, l.conceded);
            assert_eq!(a.conceded, l.scored);
            assert_ne!(a.h_a, l.h_a);
        }
    }

    #[test]
    fn invalid_records_are_reported_not_defaulted() {
        let mut broken = raw(5, "2025-08-10", "Arsenal", "Leeds", 1, 0);
        broken.away_goals = None;
        let fixture = RawMatch {
            is_result: Some(false),
            home_goals: None,
            away_goals: None,
            ..raw(6, "2025-12-01", "Arsenal", "Leeds", 0, 0)
        };

        let build = build_histories(
            &[broken, fixture, raw(7, "2025-08-17", "Arsenal", "Leeds", 1, 1)],
            &AliasTable::default(),
        );
        assert_eq!(
            build.skipped,
            vec![(Some(5), SkipReason::MissingAwayGoals), (Some(6), SkipReason::NotPlayed)]
        );
        assert_eq!(build.histories["arsenal"].len(), 1);
        assert_eq!(build.match_ids(), vec![7]);
    }

    #[test]
    fn alias_with_own_data_is_not_overwritten() {
        let table = AliasTable::from_pairs([("west-ham", "west-ham-united")]);
        let build = build_histories(
            &[
                raw(1, "2025-08-10", "West Ham", "Leeds", 1, 0),
                raw(2, "2025-08-17", "West Ham United", "Fulham", 0, 1),
            ],
            &table,
        );
        assert_eq!(build.histories["west-ham"].len(), 1);
        assert_eq!(build.histories["west-ham-united"].len(), 1);
        assert_eq!(build.histories["west-ham-united"][0].id, 2);
        assert_eq!(build.alias_count(), 0);
    }

    #[test]
    fn alias_copy_is_identical_when_serialized() {
        let table = AliasTable::from_pairs([("west-ham", "west-ham-united")]);
        let build = build_histories(
            &[
                raw(1, "2025-08-17", "West Ham", "Leeds", 1, 0),
                raw(2, "2025-08-10", "Fulham", "West Ham", 0, 1),
            ],
            &table,
        );
        let canonical = serde_json::to_string(&build.histories["west-ham"]).unwrap();
        let alias = serde_json::to_string(&build.histories["west-ham-united"]).unwrap();
        assert_eq!(canonical, alias);
    }
}
