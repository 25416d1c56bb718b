//! Understat JSON struktury. Id a góly chodí jako stringy (`"2"`), někdy jako čísla.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use team_history::{RawMatch, TeamEntry};

fn de_opt_i64<'de, D>(d: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v: Option<Value> = Option::deserialize(d)?;
    Ok(v.and_then(|v| match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }))
}

fn de_opt_string<'de, D>(d: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v: Option<Value> = Option::deserialize(d)?;
    Ok(v.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

#[derive(Deserialize, Debug, Default)]
pub struct UnderstatSide {
    #[serde(default, deserialize_with = "de_opt_string")]
    pub id:    Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct UnderstatGoals {
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub h: Option<i64>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub a: Option<i64>,
}

/// Položka `datesData`
#[derive(Deserialize, Debug)]
pub struct UnderstatMatch {
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub id:        Option<i64>,
    #[serde(default, rename = "isResult")]
    pub is_result: Option<bool>,
    #[serde(default)]
    pub h:         Option<UnderstatSide>,
    #[serde(default)]
    pub a:         Option<UnderstatSide>,
    #[serde(default)]
    pub goals:     Option<UnderstatGoals>,
    #[serde(default)]
    pub datetime:  Option<String>,
}

impl From<UnderstatMatch> for RawMatch {
    fn from(m: UnderstatMatch) -> Self {
        let h = m.h.unwrap_or_default();
        let a = m.a.unwrap_or_default();
        let goals = m.goals.unwrap_or_default();
        RawMatch {
            id:             m.id,
            is_result:      m.is_result,
            datetime:       m.datetime,
            home_team_id:   h.id,
            home_team_name: h.title,
            away_team_id:   a.id,
            away_team_name: a.title,
            home_goals:     goals.h,
            away_goals:     goals.a,
        }
    }
}

/// Položka `teamsData` (historii týmu z upstreamu nepotřebujeme, stavíme vlastní)
#[derive(Deserialize, Debug)]
pub struct UnderstatTeam {
    #[serde(default, deserialize_with = "de_opt_string")]
    pub id:    Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// `datesData` → syrové zápasy
pub fn parse_matches(value: Value) -> Result<Vec<RawMatch>> {
    let matches: Vec<UnderstatMatch> =
        serde_json::from_value(value).context("datesData has unexpected shape")?;
    Ok(matches.into_iter().map(RawMatch::from).collect())
}

/// `teamsData` je objekt `{ "<id>": {...} }`, nové API občas vrací pole
pub fn parse_teams(value: Value) -> Result<Vec<TeamEntry>> {
    let items: Vec<Value> = match value {
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => anyhow::bail!("teamsData has unexpected shape: {}", other),
    };

    let mut teams = Vec::with_capacity(items.len());
    for item in items {
        let team: UnderstatTeam = serde_json::from_value(item).context("teamsData item")?;
        if let (Some(id), Some(title)) = (team.id, team.title) {
            teams.push(TeamEntry::new(id, title));
        }
    }
    Ok(teams)
}
