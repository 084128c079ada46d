use serde::{Deserialize, Serialize};

/// Which side of the box score a team occupies in its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    Points,
    Rebounds,
    Assists,
    Steals,
    Blocks,
}

impl Counter {
    pub const ALL: [Counter; 5] = [
        Counter::Points,
        Counter::Rebounds,
        Counter::Assists,
        Counter::Steals,
        Counter::Blocks,
    ];
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatLine {
    pub points: u32,
    pub rebounds: u32,
    pub assists: u32,
    pub steals: u32,
    pub blocks: u32,
}

impl StatLine {
    pub fn get(&self, counter: Counter) -> u32 {
        match counter {
            Counter::Points => self.points,
            Counter::Rebounds => self.rebounds,
            Counter::Assists => self.assists,
            Counter::Steals => self.steals,
            Counter::Blocks => self.blocks,
        }
    }

    /// Raises `counter` to `value` if it is larger; never lowers it.
    pub fn merge_max(&mut self, counter: Counter, value: u32) {
        let slot = match counter {
            Counter::Points => &mut self.points,
            Counter::Rebounds => &mut self.rebounds,
            Counter::Assists => &mut self.assists,
            Counter::Steals => &mut self.steals,
            Counter::Blocks => &mut self.blocks,
        };
        *slot = (*slot).max(value);
    }

    pub fn merge_line(&mut self, other: &StatLine) {
        for counter in Counter::ALL {
            self.merge_max(counter, other.get(counter));
        }
    }

    /// Number of the five counters at or above `threshold`.
    pub fn counters_at_least(&self, threshold: u32) -> usize {
        Counter::ALL
            .iter()
            .filter(|c| self.get(**c) >= threshold)
            .count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStat {
    /// Primary-source athlete id; empty for rows only the secondary source knows.
    pub stable_id: String,
    pub given_name: String,
    pub family_name: String,
    pub display_name: String,
    /// Profile slug on the secondary site, when the row came from there.
    #[serde(default)]
    pub profile_slug: Option<String>,
    pub stats: StatLine,
}

impl PlayerStat {
    pub fn new(stable_id: &str, display_name: &str) -> Self {
        let (given_name, family_name) = split_display_name(display_name);
        Self {
            stable_id: stable_id.to_string(),
            given_name,
            family_name,
            display_name: display_name.trim().to_string(),
            profile_slug: None,
            stats: StatLine::default(),
        }
    }

    /// Merge key used while accumulating rows: the stable id, else the display name.
    pub fn merge_key(&self) -> String {
        if self.stable_id.is_empty() {
            self.display_name.to_lowercase()
        } else {
            self.stable_id.clone()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamResult {
    pub team_code: String,
    pub localized_name: String,
    pub score: u32,
    #[serde(default)]
    pub record: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalEvent {
    pub event_id: String,
    pub home: TeamResult,
    pub away: TeamResult,
    pub home_players: Vec<PlayerStat>,
    pub away_players: Vec<PlayerStat>,
    /// Number of overtime periods, when the game went past regulation.
    #[serde(default)]
    pub overtime: Option<u32>,
    #[serde(default)]
    pub completed: bool,
}

impl CanonicalEvent {
    pub fn team(&self, side: Side) -> &TeamResult {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    pub fn players(&self, side: Side) -> &[PlayerStat] {
        match side {
            Side::Home => &self.home_players,
            Side::Away => &self.away_players,
        }
    }

    pub fn players_mut(&mut self, side: Side) -> &mut Vec<PlayerStat> {
        match side {
            Side::Home => &mut self.home_players,
            Side::Away => &mut self.away_players,
        }
    }

    pub fn is_winner(&self, side: Side) -> bool {
        match side {
            Side::Home => self.home.score > self.away.score,
            Side::Away => self.away.score > self.home.score,
        }
    }

    pub fn player_rows(&self) -> usize {
        self.home_players.len() + self.away_players.len()
    }

    /// Side whose canonical code equals `code`, if any.
    pub fn side_of(&self, code: &str) -> Option<Side> {
        if self.home.team_code == code {
            Some(Side::Home)
        } else if self.away.team_code == code {
            Some(Side::Away)
        } else {
            None
        }
    }

    /// Identity of the game: the primary event id, else the sorted code pair.
    pub fn identity(&self) -> String {
        if !self.event_id.is_empty() {
            return self.event_id.clone();
        }
        let mut codes = [self.home.team_code.as_str(), self.away.team_code.as_str()];
        codes.sort_unstable();
        format!("{}-{}", codes[0], codes[1])
    }
}

/// Splits a display name into (given, family): first and last whitespace
/// tokens. A single token is treated as a family name.
pub fn split_display_name(raw: &str) -> (String, String) {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    match tokens.as_slice() {
        [] => (String::new(), String::new()),
        [only] => (String::new(), (*only).to_string()),
        [first, .., last] => ((*first).to_string(), (*last).to_string()),
    }
}
