use crate::model::{PlayerStat, StatLine};

pub const HIGHLIGHT_POINTS: u32 = 30;
pub const DOUBLE_DIGITS: u32 = 10;
pub const HIGHLIGHT_REBOUNDS: u32 = 15;
pub const HIGHLIGHT_ASSISTS: u32 = 12;
pub const HIGHLIGHT_STEALS: u32 = 4;
pub const HIGHLIGHT_BLOCKS: u32 = 4;
pub const EXCEPTIONAL_POINTS: u32 = 35;
pub const MAX_HIGHLIGHTS: usize = 2;

/// Ordering key, compared descending: scoring first, then the
/// rebound+assist and steal+block sums.
pub fn composite_key(stats: &StatLine) -> (u32, u32, u32) {
    (
        stats.points,
        stats.rebounds + stats.assists,
        stats.steals + stats.blocks,
    )
}

pub fn qualifies(stats: &StatLine) -> bool {
    stats.points >= HIGHLIGHT_POINTS
        || stats.counters_at_least(DOUBLE_DIGITS) >= 2
        || stats.rebounds >= HIGHLIGHT_REBOUNDS
        || stats.assists >= HIGHLIGHT_ASSISTS
        || stats.steals >= HIGHLIGHT_STEALS
        || stats.blocks >= HIGHLIGHT_BLOCKS
}

pub fn is_exceptional(stats: &StatLine) -> bool {
    let double_digits = stats.counters_at_least(DOUBLE_DIGITS);
    stats.points >= EXCEPTIONAL_POINTS
        || double_digits >= 3
        || (stats.points >= HIGHLIGHT_POINTS && double_digits >= 2)
}

/// Rows by composite key, best first. Equal keys keep row order.
pub fn rank(players: &[PlayerStat]) -> Vec<&PlayerStat> {
    let mut ranked: Vec<&PlayerStat> = players.iter().collect();
    ranked.sort_by(|a, b| composite_key(&b.stats).cmp(&composite_key(&a.stats)));
    ranked
}

/// Case-insensitive suffix match against the row's family name or the
/// last part of its display name.
pub fn matches_spotlight(player: &PlayerStat, family_suffix: &str) -> bool {
    let needle = family_suffix.trim().to_lowercase();
    if needle.is_empty() {
        return false;
    }
    [&player.family_name, &player.display_name]
        .iter()
        .any(|name| !name.is_empty() && name.to_lowercase().ends_with(&needle))
}

/// Players whose lines go into the team block.
///
/// Up to [`MAX_HIGHLIGHTS`] qualifying players in rank order; with no
/// qualifier the single best player. A spotlighted player takes the
/// second slot unless already picked.
pub fn select_highlights<'a>(
    players: &'a [PlayerStat],
    spotlight: Option<&str>,
) -> Vec<&'a PlayerStat> {
    let ranked = rank(players);
    let mut picks: Vec<&PlayerStat> = ranked
        .iter()
        .copied()
        .filter(|p| qualifies(&p.stats))
        .take(MAX_HIGHLIGHTS)
        .collect();
    if picks.is_empty() {
        picks.extend(ranked.first().copied());
    }

    let Some(suffix) = spotlight else {
        return picks;
    };
    let Some(featured) = ranked
        .iter()
        .copied()
        .find(|p| matches_spotlight(p, suffix))
    else {
        return picks;
    };
    if picks.iter().any(|p| std::ptr::eq(*p, featured)) {
        return picks;
    }
    picks.truncate(MAX_HIGHLIGHTS - 1);
    picks.push(featured);
    picks
}

#[cfg(test)]
mod tests {
    use super::{is_exceptional, qualifies, select_highlights};
    use crate::model::{PlayerStat, StatLine};

    fn player(name: &str, points: u32, rebounds: u32, assists: u32) -> PlayerStat {
        let mut p = PlayerStat::new("", name);
        p.stats = StatLine {
            points,
            rebounds,
            assists,
            ..StatLine::default()
        };
        p
    }

    #[test]
    fn thresholds() {
        assert!(qualifies(&StatLine {
            points: 30,
            ..StatLine::default()
        }));
        assert!(qualifies(&StatLine {
            points: 12,
            rebounds: 10,
            ..StatLine::default()
        }));
        assert!(!qualifies(&StatLine {
            points: 29,
            rebounds: 9,
            assists: 11,
            steals: 3,
            blocks: 3,
        }));
        assert!(is_exceptional(&StatLine {
            points: 35,
            ..StatLine::default()
        }));
        assert!(is_exceptional(&StatLine {
            points: 31,
            rebounds: 10,
            assists: 10,
            ..StatLine::default()
        }));
        assert!(!is_exceptional(&StatLine {
            points: 31,
            rebounds: 10,
            ..StatLine::default()
        }));
    }

    #[test]
    fn spotlight_takes_second_slot() {
        let rows = vec![
            player("Jayson Tatum", 34, 8, 5),
            player("Jaylen Brown", 31, 4, 3),
            player("Derrick White", 12, 3, 4),
        ];
        let picks = select_highlights(&rows, None);
        assert_eq!(picks.len(), 2);
        assert_eq!(picks[1].family_name, "Brown");

        let picks = select_highlights(&rows, Some("white"));
        assert_eq!(picks[0].family_name, "Tatum");
        assert_eq!(picks[1].family_name, "White");

        let picks = select_highlights(&rows, Some("Tatum"));
        assert_eq!(picks.len(), 2);
        assert_eq!(picks[1].family_name, "Brown");
    }

    #[test]
    fn fallback_and_empty() {
        let rows = vec![player("A B", 10, 2, 2), player("C D", 14, 1, 1)];
        let picks = select_highlights(&rows, None);
        assert_eq!(picks.len(), 1);
        assert_eq!(picks[0].family_name, "D");
        assert!(select_highlights(&[], Some("D")).is_empty());
    }
}
