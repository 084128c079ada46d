use nba_digest::model::{CanonicalEvent, StatLine, TeamResult};
use nba_digest::render::{
    EntityKind, GameView, IconMap, PlayerLine, format_player_line, render_digest, utf16_len,
};

fn team(code: &str, name: &str, score: u32) -> TeamResult {
    TeamResult {
        team_code: code.to_string(),
        localized_name: name.to_string(),
        score,
        record: None,
    }
}

fn line(given: &str, family: &str, points: u32) -> PlayerLine {
    PlayerLine {
        given: given.to_string(),
        given_foreign: String::new(),
        family: family.to_string(),
        stats: StatLine {
            points,
            ..StatLine::default()
        },
    }
}

#[test]
fn away_winner_goes_first_and_offsets_track_utf16() {
    let game = GameView {
        event: CanonicalEvent {
            event_id: "1".into(),
            home: team("MIA", "Майами", 99),
            away: team("DEN", "Денвер", 101),
            overtime: Some(2),
            completed: true,
            ..CanonicalEvent::default()
        },
        home_lines: vec![line("Тайлер", "Хирро", 21)],
        away_lines: vec![line("Никола", "Йокич", 32)],
    };
    let mut icons = IconMap::new();
    icons.insert("MIA".into(), "mia-icon".into());

    let msg = render_digest(Some("🏀 НБА"), &[game], &icons);
    assert_eq!(
        msg.text,
        "🏀 НБА\n\n🏀 Денвер 101 (2ОТ)\nН. Йокич: 32 очка\n\n⭐ Майами 99\nТ. Хирро: 21 очко"
    );

    let emoji = msg
        .entities
        .iter()
        .find(|e| matches!(e.kind, EntityKind::CustomEmoji(_)))
        .expect("icon span");
    let prefix = msg.text.split('⭐').next().unwrap_or_default();
    assert_eq!(emoji.offset, utf16_len(prefix));
    assert_eq!(emoji.length, 1);

    let bold: Vec<_> = msg
        .entities
        .iter()
        .filter(|e| e.kind == EntityKind::Bold)
        .map(|e| (e.offset, e.length))
        .collect();
    let score_at = utf16_len("🏀 НБА\n\n🏀 Денвер ");
    assert_eq!(bold, vec![(0, 6), (score_at, 3)]);
}

#[test]
fn plural_agreement_in_lines() {
    assert_eq!(format_player_line(&line("Лука", "Дончич", 21)), "Л. Дончич: 21 очко");
    assert_eq!(format_player_line(&line("Лука", "Дончич", 23)), "Л. Дончич: 23 очка");
    assert_eq!(format_player_line(&line("Лука", "Дончич", 11)), "Л. Дончич: 11 очков");
    assert_eq!(format_player_line(&line("", "Doe", 1)), "Doe: 1 очко");
}

#[test]
fn empty_digest_is_empty() {
    let msg = render_digest(None, &[], &IconMap::new());
    assert!(msg.text.is_empty());
    assert!(msg.entities.is_empty());
}
