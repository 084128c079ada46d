//! Russian sports site: day index, match pages, player profiles, search.
//!
//! Match page layout the parser relies on:
//!
//! ```text
//! .match-summary__team--home  .match-summary__team-name   "Бостон"
//!                             .match-summary__team-abbr   "BOS"   (optional)
//! .match-summary__score                                   "118 : 112"
//! .match-summary__team--away  ...
//! table.stat-table[data-side=home|away]
//!     thead th: Игрок | Очк | Подб | Пер | Перехв | БШ
//!     tbody tr: <a href="/basketball/person/<slug>/">Имя Фамилия</a> | 30 | ...
//! ```

use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::http_client::PageSource;
use crate::model::{CanonicalEvent, PlayerStat, Side, TeamResult};
use crate::stat_normalize::{GroupRow, GroupValues, RawAthlete, RawTeamPayload, StatPayload, normalize};
use crate::teams::{canonical_team_code, code_for_localized_name};

pub const SITE_ROOT: &str = "https://www.sports.ru";
const DAY_INDEX_URL: &str = "https://www.sports.ru/basketball/tournament/nba/calendar/";
const SEARCH_URL: &str = "https://www.sports.ru/search/";
const PERSON_PATH: &str = "/basketball/person/";
const MATCH_PATH: &str = "/basketball/match/";

pub fn day_index_url(date: NaiveDate) -> String {
    format!("{DAY_INDEX_URL}?date={}", date.format("%Y-%m-%d"))
}

/// The two profile URL roots a player slug may live under.
pub fn profile_urls(slug: &str) -> [String; 2] {
    [
        format!("{SITE_ROOT}{PERSON_PATH}{slug}/"),
        format!("{SITE_ROOT}/{slug}/"),
    ]
}

pub fn search_url(query: &str) -> Result<String> {
    let url = Url::parse_with_params(SEARCH_URL, &[("query", query.trim())])
        .map_err(|err| anyhow!("bad search url: {err}"))?;
    Ok(url.to_string())
}

/// Every match page of the day, as reconciled candidates. Pages that fail
/// to load or parse are skipped; the whole source failing yields nothing.
pub fn fetch_secondary_events(source: &dyn PageSource, date: NaiveDate) -> Vec<CanonicalEvent> {
    let index_url = day_index_url(date);
    let index = match source.fetch(&index_url) {
        Ok(Some(html)) => html,
        Ok(None) => {
            warn!(url = %index_url, "secondary day index missing");
            return Vec::new();
        }
        Err(err) => {
            warn!(url = %index_url, "secondary day index fetch failed: {err:#}");
            return Vec::new();
        }
    };
    let links = match parse_day_index(&index) {
        Ok(links) => links,
        Err(err) => {
            warn!("secondary day index unparsable: {err:#}");
            return Vec::new();
        }
    };

    let mut events = Vec::with_capacity(links.len());
    for link in links {
        let html = match source.fetch(&link) {
            Ok(Some(html)) => html,
            Ok(None) => continue,
            Err(err) => {
                warn!(url = %link, "secondary match fetch failed: {err:#}");
                continue;
            }
        };
        match parse_match_page(&html, &link) {
            Ok(Some(event)) => events.push(event),
            Ok(None) => debug!(url = %link, "skipped match page without team header"),
            Err(err) => warn!(url = %link, "secondary match page unparsable: {err:#}"),
        }
    }
    info!(count = events.len(), "loaded secondary events");
    events
}

/// Absolute match page URLs in page order, deduplicated.
pub fn parse_day_index(html: &str) -> Result<Vec<String>> {
    let doc = Html::parse_document(html);
    let links = selector("a[href]")?;
    let mut out: Vec<String> = Vec::new();
    for a in doc.select(&links) {
        let Some(href) = a.value().attr("href") else {
            continue;
        };
        if !href.contains(MATCH_PATH) {
            continue;
        }
        let url = absolutize(href);
        if !out.contains(&url) {
            out.push(url);
        }
    }
    Ok(out)
}

/// One secondary event, or `None` when the team header is not recognisable.
pub fn parse_match_page(html: &str, url: &str) -> Result<Option<CanonicalEvent>> {
    let doc = Html::parse_document(html);

    let Some(home) = parse_team_header(&doc, Side::Home)? else {
        return Ok(None);
    };
    let Some(away) = parse_team_header(&doc, Side::Away)? else {
        return Ok(None);
    };

    let score_sel = selector(".match-summary__score")?;
    let (home_score, away_score) = doc
        .select(&score_sel)
        .next()
        .map(|el| element_text(&el))
        .and_then(|raw| parse_score_pair(&raw))
        .unwrap_or((0, 0));

    let home_players = parse_player_table(&doc, Side::Home, &home.0)?;
    let away_players = parse_player_table(&doc, Side::Away, &away.0)?;

    Ok(Some(CanonicalEvent {
        event_id: url.to_string(),
        home: TeamResult {
            team_code: home.0,
            localized_name: home.1,
            score: home_score,
            record: None,
        },
        away: TeamResult {
            team_code: away.0,
            localized_name: away.1,
            score: away_score,
            record: None,
        },
        home_players,
        away_players,
        overtime: None,
        completed: true,
    }))
}

/// The primary heading of a profile page, whitespace-collapsed.
pub fn parse_profile_heading(html: &str) -> Result<Option<String>> {
    let doc = Html::parse_document(html);
    let h1 = selector("h1")?;
    Ok(doc
        .select(&h1)
        .map(|el| element_text(&el))
        .find(|text| !text.is_empty()))
}

/// First player profile link on a search results page.
pub fn parse_first_profile_link(html: &str) -> Result<Option<String>> {
    let doc = Html::parse_document(html);
    let links = selector("a[href]")?;
    Ok(doc
        .select(&links)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| href.contains(PERSON_PATH))
        .map(absolutize))
}

fn parse_team_header(doc: &Html, side: Side) -> Result<Option<(String, String)>> {
    let modifier = side_modifier(side);
    let name_sel = selector(&format!(".match-summary__team--{modifier} .match-summary__team-name"))?;
    let abbr_sel = selector(&format!(".match-summary__team--{modifier} .match-summary__team-abbr"))?;

    let Some(name) = doc
        .select(&name_sel)
        .next()
        .map(|el| element_text(&el))
        .filter(|name| !name.is_empty())
    else {
        return Ok(None);
    };
    let code = doc
        .select(&abbr_sel)
        .next()
        .map(|el| element_text(&el))
        .filter(|abbr| !abbr.is_empty())
        .map(|abbr| canonical_team_code(&abbr))
        .or_else(|| code_for_localized_name(&name).map(str::to_string));
    Ok(code.map(|code| (code, name)))
}

fn parse_player_table(doc: &Html, side: Side, team_code: &str) -> Result<Vec<PlayerStat>> {
    let table_sel = selector(&format!("table.stat-table[data-side=\"{}\"]", side_modifier(side)))?;
    let head_sel = selector("thead th")?;
    let row_sel = selector("tbody tr")?;
    let cell_sel = selector("td")?;
    let link_sel = selector("a[href]")?;

    let Some(table) = doc.select(&table_sel).next() else {
        return Ok(Vec::new());
    };
    let keys: Vec<String> = table
        .select(&head_sel)
        .skip(1)
        .map(|th| element_text(&th))
        .collect();

    let mut rows = Vec::new();
    for tr in table.select(&row_sel) {
        let cells: Vec<ElementRef> = tr.select(&cell_sel).collect();
        let Some((name_cell, value_cells)) = cells.split_first() else {
            continue;
        };
        let name = element_text(name_cell);
        if name.is_empty() {
            continue;
        }
        let profile_slug = name_cell
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(slug_from_href);
        let values = value_cells
            .iter()
            .map(|cell| Value::String(element_text(cell)))
            .collect();
        rows.push(GroupRow {
            athlete: RawAthlete {
                display_name: name,
                profile_slug,
                ..RawAthlete::default()
            },
            values: GroupValues::Aligned(values),
        });
    }

    Ok(normalize(&RawTeamPayload {
        team_code: team_code.to_string(),
        payloads: vec![StatPayload::Grouped { keys, rows }],
    }))
}

fn side_modifier(side: Side) -> &'static str {
    match side {
        Side::Home => "home",
        Side::Away => "away",
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|err| anyhow!("bad selector {css}: {err}"))
}

fn element_text(el: &ElementRef) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn absolutize(href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{SITE_ROOT}{href}")
    } else {
        format!("{SITE_ROOT}/{href}")
    }
}

fn slug_from_href(href: &str) -> Option<String> {
    let start = href.find(PERSON_PATH)? + PERSON_PATH.len();
    let slug = href[start..].split(['/', '?', '#']).next()?;
    if slug.is_empty() {
        None
    } else {
        Some(slug.to_string())
    }
}

/// First two digit runs of a score cell, e.g. "118 : 112" or "ОТ 120-118".
pub fn parse_score_pair(raw: &str) -> Option<(u32, u32)> {
    let mut nums = raw
        .split(|ch: char| !ch.is_ascii_digit())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<u32>().ok());
    let home = nums.next()?;
    let away = nums.next()?;
    Some((home, away))
}

#[cfg(test)]
mod tests {
    use super::{absolutize, parse_score_pair, profile_urls, search_url, slug_from_href};

    #[test]
    fn parse_score_pair_works() {
        assert_eq!(parse_score_pair("118 : 112"), Some((118, 112)));
        assert_eq!(parse_score_pair("19:30"), Some((19, 30)));
        assert_eq!(parse_score_pair("—"), None);
    }

    #[test]
    fn slugs_and_urls() {
        assert_eq!(
            slug_from_href("/basketball/person/lebron-james/"),
            Some("lebron-james".to_string())
        );
        assert_eq!(slug_from_href("/basketball/person/"), None);
        assert_eq!(
            absolutize("/basketball/match/1/"),
            "https://www.sports.ru/basketball/match/1/"
        );
        assert_eq!(
            profile_urls("nikola-jokic")[0],
            "https://www.sports.ru/basketball/person/nikola-jokic/"
        );
        assert_eq!(
            search_url("Nikola Jokic").unwrap(),
            "https://www.sports.ru/search/?query=Nikola+Jokic"
        );
    }
}
