use serde::{Deserialize, Serialize};

/// Zápas tak, jak přišel z upstreamu — cokoliv může chybět
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMatch {
    pub id:             Option<i64>,
    pub is_result:      Option<bool>,
    pub datetime:       Option<String>,
    pub home_team_id:   Option<String>,
    pub home_team_name: Option<String>,
    pub away_team_id:   Option<String>,
    pub away_team_name: Option<String>,
    pub home_goals:     Option<i64>,
    pub away_goals:     Option<i64>,
}

/// Zvalidovaný výsledek, všechna pole přítomná
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub id:             i64,
    pub datetime:       String,
    pub home_team_name: String,
    pub away_team_name: String,
    pub home_goals:     i64,
    pub away_goals:     i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Venue {
    #[serde(rename = "h")]
    Home,
    #[serde(rename = "a")]
    Away,
}

/// Jeden řádek `history` v `team/<slug>/<season>.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamHistoryRecord {
    pub id:       i64,
    pub h_a:      Venue,
    pub scored:   i64,
    pub conceded: i64,
    pub date:     String,
}

/// Řádek `teams` v `league/<LEAGUE>/<season>.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamEntry {
    pub id:    String,
    pub title: String,
    pub slug:  String,
}

impl TeamEntry {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            id:   id.into(),
            slug: crate::slugify(&title),
            title,
        }
    }
}

impl MatchResult {
    /// Dva záznamy — domácí a hosté, góly prohozené
    pub fn to_records(&self) -> [TeamHistoryRecord; 2] {
        [
            TeamHistoryRecord {
                id:       self.id,
                h_a:      Venue::Home,
                scored:   self.home_goals,
                conceded: self.away_goals,
                date:     self.datetime.clone(),
            },
            TeamHistoryRecord {
                id:       self.id,
                h_a:      Venue::Away,
                scored:   self.away_goals,
                conceded: self.home_goals,
                date:     self.datetime.clone(),
            },
        ]
    }
}
