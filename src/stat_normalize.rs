use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::model::{Counter, PlayerStat};

/// Case-insensitive counter-name aliases, many-to-one. Both sources feed
/// through this table: the primary's JSON keys and the secondary's Russian
/// table headers.
const COUNTER_ALIASES: &[(&str, Counter)] = &[
    ("pts", Counter::Points),
    ("points", Counter::Points),
    ("очки", Counter::Points),
    ("очк", Counter::Points),
    ("reb", Counter::Rebounds),
    ("rebounds", Counter::Rebounds),
    ("totalrebounds", Counter::Rebounds),
    ("trb", Counter::Rebounds),
    ("подб", Counter::Rebounds),
    ("подборы", Counter::Rebounds),
    ("ast", Counter::Assists),
    ("assists", Counter::Assists),
    ("пер", Counter::Assists),
    ("передачи", Counter::Assists),
    ("stl", Counter::Steals),
    ("steals", Counter::Steals),
    ("перехв", Counter::Steals),
    ("перехваты", Counter::Steals),
    ("blk", Counter::Blocks),
    ("blocks", Counter::Blocks),
    ("blockedshots", Counter::Blocks),
    ("бш", Counter::Blocks),
    ("блок-шоты", Counter::Blocks),
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawAthlete {
    pub id: String,
    pub display_name: String,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub profile_slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GroupValues {
    /// Values positionally aligned with the group's key list.
    Aligned(Vec<Value>),
    /// Values keyed by stat name; the group's key list is not consulted.
    Keyed(Map<String, Value>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupRow {
    pub athlete: RawAthlete,
    pub values: GroupValues,
}

/// The shapes one team's player statistics arrive in.
#[derive(Debug, Clone, PartialEq)]
pub enum StatPayload {
    Grouped { keys: Vec<String>, rows: Vec<GroupRow> },
    Direct { athlete: RawAthlete, stats: Map<String, Value> },
    Totals { athlete: RawAthlete, totals: Map<String, Value> },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTeamPayload {
    pub team_code: String,
    pub payloads: Vec<StatPayload>,
}

pub fn counter_for_key(key: &str) -> Option<Counter> {
    let folded = key.trim().to_lowercase();
    COUNTER_ALIASES
        .iter()
        .find(|(alias, _)| *alias == folded)
        .map(|(_, counter)| *counter)
}

/// Reads a counter value from a JSON number or numeric string.
pub fn count_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                return u32::try_from(v).ok();
            }
            let f = n.as_f64()?;
            if f.is_finite() && f >= 0.0 {
                Some(f.round() as u32)
            } else {
                None
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed == "-" {
                return None;
            }
            trimmed.parse::<u32>().ok()
        }
        _ => None,
    }
}

/// Accumulates athletes in first-seen order, merging counters by maximum.
#[derive(Debug, Default)]
struct Accumulator {
    order: Vec<String>,
    rows: HashMap<String, PlayerStat>,
}

impl Accumulator {
    fn from_rows(rows: Vec<PlayerStat>) -> Self {
        let mut acc = Self::default();
        for row in rows {
            let key = row.merge_key();
            if !acc.rows.contains_key(&key) {
                acc.order.push(key.clone());
            }
            acc.rows.insert(key, row);
        }
        acc
    }

    fn entry(&mut self, athlete: &RawAthlete) -> &mut PlayerStat {
        let mut fresh = PlayerStat::new(&athlete.id, &athlete.display_name);
        if let Some(given) = athlete.given_name.as_deref().filter(|g| !g.trim().is_empty()) {
            fresh.given_name = given.trim().to_string();
        }
        if let Some(family) = athlete.family_name.as_deref().filter(|f| !f.trim().is_empty()) {
            fresh.family_name = family.trim().to_string();
        }
        fresh.profile_slug = athlete.profile_slug.clone();

        let key = fresh.merge_key();
        if !self.rows.contains_key(&key) {
            self.order.push(key.clone());
        }
        let row = self.rows.entry(key).or_insert_with(|| fresh.clone());
        if row.given_name.is_empty() {
            row.given_name = fresh.given_name;
        }
        if row.family_name.is_empty() {
            row.family_name = fresh.family_name;
        }
        if row.display_name.is_empty() {
            row.display_name = fresh.display_name;
        }
        if row.profile_slug.is_none() {
            row.profile_slug = fresh.profile_slug;
        }
        row
    }

    fn merge_pair(&mut self, athlete: &RawAthlete, key: &str, value: &Value) {
        let Some(counter) = counter_for_key(key) else {
            return;
        };
        let Some(count) = count_value(value) else {
            return;
        };
        self.entry(athlete).stats.merge_max(counter, count);
    }

    fn merge_map(&mut self, athlete: &RawAthlete, map: &Map<String, Value>) {
        // Touch the athlete even when no counter is recognised so the row exists.
        self.entry(athlete);
        for (key, value) in map {
            self.merge_pair(athlete, key, value);
        }
    }

    fn apply(&mut self, payload: &StatPayload) {
        match payload {
            StatPayload::Grouped { keys, rows } => self.apply_grouped(keys, rows),
            StatPayload::Direct { athlete, stats } => self.merge_map(athlete, stats),
            StatPayload::Totals { athlete, totals } => self.merge_map(athlete, totals),
        }
    }

    fn apply_grouped(&mut self, keys: &[String], rows: &[GroupRow]) {
        for row in rows {
            match &row.values {
                GroupValues::Aligned(values) => {
                    self.entry(&row.athlete);
                    for (key, value) in keys.iter().zip(values) {
                        self.merge_pair(&row.athlete, key, value);
                    }
                }
                GroupValues::Keyed(map) => self.merge_map(&row.athlete, map),
            }
        }
    }

    fn finish(mut self) -> Vec<PlayerStat> {
        self.order
            .iter()
            .filter_map(|key| self.rows.remove(key))
            .collect()
    }
}

/// Canonical per-player stat records for one team's payloads.
pub fn normalize(payload: &RawTeamPayload) -> Vec<PlayerStat> {
    let mut acc = Accumulator::default();
    for item in &payload.payloads {
        acc.apply(item);
    }
    acc.finish()
}

/// Folds a second, more detailed fetch into already-normalized rows.
/// Counters only move up; athletes missing from `rows` are appended.
pub fn augment(rows: &mut Vec<PlayerStat>, detail: &RawTeamPayload) {
    let mut acc = Accumulator::from_rows(std::mem::take(rows));
    for item in &detail.payloads {
        acc.apply(item);
    }
    *rows = acc.finish();
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{count_value, counter_for_key};
    use crate::model::Counter;

    #[test]
    fn counter_aliases_are_case_insensitive() {
        assert_eq!(counter_for_key("PTS"), Some(Counter::Points));
        assert_eq!(counter_for_key("totalRebounds"), Some(Counter::Rebounds));
        assert_eq!(counter_for_key("БШ"), Some(Counter::Blocks));
        assert_eq!(counter_for_key("minutes"), None);
    }

    #[test]
    fn count_value_accepts_numeric_strings() {
        assert_eq!(count_value(&json!(12)), Some(12));
        assert_eq!(count_value(&json!("7")), Some(7));
        assert_eq!(count_value(&json!(3.0)), Some(3));
        assert_eq!(count_value(&json!("-")), None);
        assert_eq!(count_value(&json!("DNP")), None);
        assert_eq!(count_value(&json!(-2)), None);
    }
}
