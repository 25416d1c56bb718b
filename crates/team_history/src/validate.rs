use crate::model::{MatchResult, RawMatch};
use std::fmt;

/// Proč byl syrový záznam zahozen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    NotPlayed,
    MissingId,
    MissingDate,
    MissingHomeTeam,
    MissingAwayTeam,
    MissingHomeGoals,
    MissingAwayGoals,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NotPlayed        => "not_played",
            SkipReason::MissingId        => "missing_id",
            SkipReason::MissingDate      => "missing_date",
            SkipReason::MissingHomeTeam  => "missing_home_team",
            SkipReason::MissingAwayTeam  => "missing_away_team",
            SkipReason::MissingHomeGoals => "missing_home_goals",
            SkipReason::MissingAwayGoals => "missing_away_goals",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn present(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Pass/fail pro jeden záznam. Částečná data se zahazují, nikdy se nedoplňují defaulty.
pub fn validate(raw: &RawMatch) -> Result<MatchResult, SkipReason> {
    if raw.is_result == Some(false) {
        return Err(SkipReason::NotPlayed);
    }

    let id = raw.id.ok_or(SkipReason::MissingId)?;
    let datetime = present(&raw.datetime).ok_or(SkipReason::MissingDate)?;
    let home = present(&raw.home_team_name).ok_or(SkipReason::MissingHomeTeam)?;
    let away = present(&raw.away_team_name).ok_or(SkipReason::MissingAwayTeam)?;
    let home_goals = raw.home_goals.ok_or(SkipReason::MissingHomeGoals)?;
    let away_goals = raw.away_goals.ok_or(SkipReason::MissingAwayGoals)?;

    Ok(MatchResult {
        id,
        datetime:       datetime.to_string(),
        home_team_name: home.to_string(),
        away_team_name: away.to_string(),
        home_goals,
        away_goals,
    })
}
