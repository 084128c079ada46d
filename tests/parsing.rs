use std::fs;
use std::path::PathBuf;

use nba_digest::espn_fetch::{parse_scoreboard_json, parse_summary_json};
use nba_digest::secondary_fetch::{
    parse_day_index, parse_first_profile_link, parse_match_page, parse_profile_heading,
};
use nba_digest::stat_normalize::normalize;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_espn_scoreboard_fixture() {
    let raw = read_fixture("espn_scoreboard.json");
    let events = parse_scoreboard_json(&raw).expect("fixture should parse");
    assert_eq!(events.len(), 3);

    let bos = &events[0].event;
    assert_eq!(bos.event_id, "401705100");
    assert_eq!(bos.home.team_code, "BOS");
    assert_eq!(bos.home.localized_name, "Бостон");
    assert_eq!(bos.home.score, 118);
    assert_eq!(bos.home.record.as_deref(), Some("30-10"));
    assert_eq!(bos.away.team_code, "LAL");
    assert_eq!(bos.away.score, 112);
    assert!(bos.completed);
    assert_eq!(bos.overtime, None);
    assert!(events[0].payloads.is_empty());

    let gs = &events[1].event;
    assert_eq!(gs.away.team_code, "GS");
    assert_eq!(gs.away.localized_name, "Голден Стэйт");
    assert_eq!(gs.away.score, 120);
    assert_eq!(gs.away.record.as_deref(), Some("21-19"));
    assert_eq!(gs.overtime, Some(1));

    assert!(!events[2].event.completed);
}

#[test]
fn parses_espn_summary_fixture() {
    let raw = read_fixture("espn_summary.json");
    let teams = parse_summary_json(&raw).expect("fixture should parse");
    assert_eq!(teams.len(), 2);
    assert_eq!(teams[0].team_code, "BOS");

    let rows = normalize(&teams[0]);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].stable_id, "4065648");
    assert_eq!(rows[0].given_name, "Jayson");
    assert_eq!(rows[0].family_name, "Tatum");
    assert_eq!(rows[0].stats.points, 34);
    assert_eq!(rows[0].stats.rebounds, 8);
    assert_eq!(rows[2].family_name, "Horford");
    assert_eq!(rows[2].stats.points, 0);
}

#[test]
fn espn_null_is_empty() {
    assert!(parse_scoreboard_json("null").expect("null should parse").is_empty());
    assert!(parse_scoreboard_json("  ").expect("blank should parse").is_empty());
    assert!(parse_summary_json("{}").expect("empty object should parse").is_empty());
    assert!(parse_scoreboard_json("{not json").is_err());
}

#[test]
fn parses_day_index_links_once() {
    let raw = read_fixture("sportsru_day.html");
    let links = parse_day_index(&raw).expect("fixture should parse");
    assert_eq!(
        links,
        vec![
            "https://www.sports.ru/basketball/match/1001/".to_string(),
            "https://www.sports.ru/basketball/match/1002/".to_string(),
        ]
    );
}

#[test]
fn parses_match_page_fixture() {
    let raw = read_fixture("sportsru_match.html");
    let event = parse_match_page(&raw, "https://www.sports.ru/basketball/match/1001/")
        .expect("fixture should parse")
        .expect("fixture has a team header");
    assert_eq!(event.home.team_code, "BOS");
    assert_eq!(event.away.team_code, "LAL");
    assert_eq!(event.away.localized_name, "Лейкерс");
    assert_eq!((event.home.score, event.away.score), (118, 112));

    assert_eq!(event.home_players.len(), 2);
    let tatum = &event.home_players[0];
    assert_eq!(tatum.display_name, "Джейсон Тейтум");
    assert_eq!(tatum.family_name, "Тейтум");
    assert_eq!(tatum.profile_slug.as_deref(), Some("jayson-tatum"));
    assert_eq!(tatum.stats.points, 33);
    assert!(tatum.stable_id.is_empty());

    assert_eq!(event.away_players.len(), 3);
    let christie = &event.away_players[2];
    assert_eq!(christie.family_name, "Кристи");
    assert_eq!(christie.stats.points, 0);
}

#[test]
fn match_page_without_header_is_skipped() {
    let raw = read_fixture("sportsru_match_preview.html");
    let parsed = parse_match_page(&raw, "https://www.sports.ru/basketball/match/1002/")
        .expect("page should parse");
    assert!(parsed.is_none());
}

#[test]
fn parses_profile_and_search_pages() {
    let profile = read_fixture("sportsru_profile.html");
    assert_eq!(
        parse_profile_heading(&profile).expect("profile should parse"),
        Some("Леброн Джеймс".to_string())
    );

    let search = read_fixture("sportsru_search.html");
    assert_eq!(
        parse_first_profile_link(&search).expect("search should parse"),
        Some("https://www.sports.ru/basketball/person/jaylen-brown-1996/".to_string())
    );
    assert_eq!(parse_first_profile_link("<p>ничего</p>").expect("should parse"), None);
}
