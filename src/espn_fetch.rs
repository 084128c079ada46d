use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::http_client::PageSource;
use crate::model::{CanonicalEvent, Side, TeamResult};
use crate::stat_normalize::{
    GroupRow, GroupValues, RawAthlete, RawTeamPayload, StatPayload, augment, normalize,
};
use crate::teams::{canonical_team_code, localized_team_name};

const ESPN_NBA_BASE: &str = "https://site.api.espn.com/apis/site/v2/sports/basketball/nba";
const REGULATION_PERIODS: u32 = 4;

pub fn scoreboard_url(date: NaiveDate) -> String {
    format!("{ESPN_NBA_BASE}/scoreboard?dates={}", date.format("%Y%m%d"))
}

pub fn summary_url(event_id: &str) -> String {
    format!("{ESPN_NBA_BASE}/summary?event={event_id}")
}

/// A primary event with whatever player rows the scoreboard carried.
#[derive(Debug, Clone)]
pub struct PrimaryEvent {
    pub event: CanonicalEvent,
    pub payloads: Vec<RawTeamPayload>,
}

/// Day scoreboard from the primary source. An unreachable or unreadable
/// scoreboard is "no games", not an error.
pub fn fetch_primary_events(source: &dyn PageSource, date: NaiveDate) -> Vec<PrimaryEvent> {
    let url = scoreboard_url(date);
    let body = match source.fetch(&url) {
        Ok(Some(body)) => body,
        Ok(None) => {
            warn!(url = %url, "primary scoreboard missing");
            return Vec::new();
        }
        Err(err) => {
            warn!(url = %url, "primary scoreboard fetch failed: {err:#}");
            return Vec::new();
        }
    };
    match parse_scoreboard_json(&body) {
        Ok(events) => {
            info!(count = events.len(), "loaded primary events");
            events
        }
        Err(err) => {
            warn!("primary scoreboard unparsable: {err:#}");
            Vec::new()
        }
    }
}

/// Per-team payloads from the detailed summary of one event. Failures
/// contribute nothing.
pub fn fetch_event_detail(source: &dyn PageSource, event_id: &str) -> Vec<RawTeamPayload> {
    let url = summary_url(event_id);
    let body = match source.fetch(&url) {
        Ok(Some(body)) => body,
        Ok(None) => return Vec::new(),
        Err(err) => {
            warn!(event_id, "primary summary fetch failed: {err:#}");
            return Vec::new();
        }
    };
    parse_summary_json(&body).unwrap_or_else(|err| {
        warn!(event_id, "primary summary unparsable: {err:#}");
        Vec::new()
    })
}

/// Applies summary payloads to the event's rows, side by side, using the
/// max-merge rule.
pub fn apply_detail(event: &mut CanonicalEvent, detail: &[RawTeamPayload]) {
    for payload in detail {
        let code = canonical_team_code(&payload.team_code);
        let Some(side) = event.side_of(&code) else {
            debug!(code = %code, "summary team not in event");
            continue;
        };
        augment(event.players_mut(side), payload);
    }
}

pub fn parse_scoreboard_json(raw: &str) -> Result<Vec<PrimaryEvent>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let root: Value = serde_json::from_str(trimmed).context("invalid scoreboard json")?;
    let Some(events) = root.get("events").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };
    Ok(events.iter().filter_map(parse_scoreboard_event).collect())
}

fn parse_scoreboard_event(v: &Value) -> Option<PrimaryEvent> {
    let event_id = v.get("id").and_then(as_string_any)?;
    let competition = v
        .get("competitions")
        .and_then(Value::as_array)
        .and_then(|list| list.first())?;
    let competitors = competition.get("competitors").and_then(Value::as_array)?;

    let mut home = None;
    let mut away = None;
    let mut payloads = Vec::new();
    for competitor in competitors {
        let side = match competitor.get("homeAway").and_then(Value::as_str) {
            Some("home") => Side::Home,
            Some("away") => Side::Away,
            _ => continue,
        };
        let team = parse_competitor(competitor)?;
        let payload = parse_team_payload(&team.team_code, competitor);
        if !payload.payloads.is_empty() {
            payloads.push(payload);
        }
        match side {
            Side::Home => home = Some(team),
            Side::Away => away = Some(team),
        }
    }
    let (home, away) = (home?, away?);

    let status = competition.get("status").or_else(|| v.get("status"));
    let completed = status
        .and_then(|s| s.get("type"))
        .and_then(|t| t.get("completed"))
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let period = status
        .and_then(|s| s.get("period"))
        .and_then(as_u32_any)
        .unwrap_or(0);
    let overtime = period
        .checked_sub(REGULATION_PERIODS)
        .filter(|extra| *extra > 0);

    let mut event = CanonicalEvent {
        event_id,
        home,
        away,
        home_players: Vec::new(),
        away_players: Vec::new(),
        overtime,
        completed,
    };
    for payload in &payloads {
        if let Some(side) = event.side_of(&payload.team_code) {
            *event.players_mut(side) = normalize(payload);
        }
    }
    Some(PrimaryEvent { event, payloads })
}

fn parse_competitor(v: &Value) -> Option<TeamResult> {
    let team = v.get("team")?;
    let abbr = team
        .get("abbreviation")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())?;
    let team_code = canonical_team_code(abbr);
    let score = v.get("score").and_then(as_u32_any).unwrap_or(0);
    let record = v
        .get("records")
        .and_then(Value::as_array)
        .and_then(|list| list.first())
        .and_then(|r| r.get("summary"))
        .and_then(Value::as_str)
        .or_else(|| v.get("record").and_then(Value::as_str))
        .map(str::to_string);
    Some(TeamResult {
        localized_name: localized_team_name(&team_code),
        team_code,
        score,
        record,
    })
}

/// Box-score payloads of the summary endpoint, one per team.
pub fn parse_summary_json(raw: &str) -> Result<Vec<RawTeamPayload>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let root: Value = serde_json::from_str(trimmed).context("invalid summary json")?;
    let Some(teams) = root
        .get("boxscore")
        .and_then(|b| b.get("players"))
        .and_then(Value::as_array)
    else {
        return Ok(Vec::new());
    };
    let mut out = Vec::with_capacity(teams.len());
    for team in teams {
        let Some(abbr) = team
            .get("team")
            .and_then(|t| t.get("abbreviation"))
            .and_then(Value::as_str)
        else {
            continue;
        };
        out.push(parse_team_payload(&canonical_team_code(abbr), team));
    }
    Ok(out)
}

/// Classifies the stat shapes present in one team object:
/// `statistics[]` groups (aligned lists or keyed maps), `athletes[].stats`
/// direct maps and `athletes[].totals` maps.
pub fn parse_team_payload(team_code: &str, v: &Value) -> RawTeamPayload {
    let mut payloads = Vec::new();

    if let Some(groups) = v.get("statistics").and_then(Value::as_array) {
        for group in groups {
            let Some(athletes) = group.get("athletes").and_then(Value::as_array) else {
                continue;
            };
            let keys = group
                .get("keys")
                .or_else(|| group.get("names"))
                .and_then(Value::as_array)
                .map(|keys| keys.iter().filter_map(as_string_any).collect())
                .unwrap_or_default();
            let rows = athletes
                .iter()
                .filter_map(|entry| {
                    let athlete = parse_athlete(entry)?;
                    let values = match entry.get("stats") {
                        Some(Value::Array(list)) => GroupValues::Aligned(list.clone()),
                        Some(Value::Object(map)) => GroupValues::Keyed(map.clone()),
                        _ => return None,
                    };
                    Some(GroupRow { athlete, values })
                })
                .collect::<Vec<_>>();
            if !rows.is_empty() {
                payloads.push(StatPayload::Grouped { keys, rows });
            }
        }
    }

    if let Some(athletes) = v.get("athletes").and_then(Value::as_array) {
        for entry in athletes {
            let Some(athlete) = parse_athlete(entry) else {
                continue;
            };
            if let Some(stats) = entry.get("stats").and_then(Value::as_object) {
                payloads.push(StatPayload::Direct {
                    athlete: athlete.clone(),
                    stats: stats.clone(),
                });
            }
            if let Some(totals) = entry.get("totals").and_then(Value::as_object) {
                payloads.push(StatPayload::Totals {
                    athlete,
                    totals: totals.clone(),
                });
            }
        }
    }

    RawTeamPayload {
        team_code: team_code.to_string(),
        payloads,
    }
}

fn parse_athlete(entry: &Value) -> Option<RawAthlete> {
    let athlete = entry.get("athlete").unwrap_or(entry);
    let id = athlete.get("id").and_then(as_string_any).unwrap_or_default();
    let display_name = pick_string(athlete, &["displayName", "fullName", "name"])?;
    Some(RawAthlete {
        id,
        display_name,
        given_name: pick_string(athlete, &["firstName"]),
        family_name: pick_string(athlete, &["lastName"]),
        profile_slug: None,
    })
}

fn pick_string(v: &Value, keys: &[&str]) -> Option<String> {
    let map: &Map<String, Value> = v.as_object()?;
    keys.iter()
        .filter_map(|key| map.get(*key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn as_string_any(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_u32_any(v: &Value) -> Option<u32> {
    if let Some(n) = v.as_u64() {
        return u32::try_from(n).ok();
    }
    v.as_str()?.trim().parse::<u32>().ok()
}
