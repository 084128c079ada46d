use tracing::{debug, warn};

use crate::model::{CanonicalEvent, PlayerStat, Side};
use crate::name_resolver::slugify;
use crate::teams::canonical_team_code;

/// No single team plausibly scores more than this in one game.
pub const MAX_TEAM_SCORE: u32 = 200;
/// Plausible combined score range for a finished game.
pub const MIN_PLAUSIBLE_TOTAL: u32 = 100;
pub const MAX_PLAUSIBLE_TOTAL: u32 = 400;

/// Heuristic: placeholder (0:0), one impossible side, or a combined total no
/// finished game produces (a kickoff time read as a score, for instance).
pub fn is_suspicious_score(a: u32, b: u32) -> bool {
    if a == 0 && b == 0 {
        return true;
    }
    if a > MAX_TEAM_SCORE || b > MAX_TEAM_SCORE {
        return true;
    }
    let total = a + b;
    !(MIN_PLAUSIBLE_TOTAL..=MAX_PLAUSIBLE_TOTAL).contains(&total)
}

fn code_pair(event: &CanonicalEvent) -> [String; 2] {
    let mut pair = [
        canonical_team_code(&event.home.team_code),
        canonical_team_code(&event.away.team_code),
    ];
    pair.sort_unstable();
    pair
}

/// `candidate`'s scores laid out as (primary home, primary away).
fn aligned_scores(candidate: &CanonicalEvent, primary: &CanonicalEvent) -> (u32, u32) {
    let primary_home = canonical_team_code(&primary.home.team_code);
    if canonical_team_code(&candidate.home.team_code) == primary_home {
        (candidate.home.score, candidate.away.score)
    } else {
        (candidate.away.score, candidate.home.score)
    }
}

/// Side of `candidate` that plays as `primary`'s `side`.
fn aligned_side(candidate: &CanonicalEvent, primary: &CanonicalEvent, side: Side) -> Side {
    let code = canonical_team_code(&primary.team(side).team_code);
    if canonical_team_code(&candidate.home.team_code) == code {
        Side::Home
    } else {
        Side::Away
    }
}

/// The secondary event describing the same game as `primary`, if any.
///
/// Candidates share the unordered canonical code pair. An exact, plausible
/// score agreement wins; otherwise the candidate with the most player rows.
/// Remaining ties go to the smallest event id so input order never matters.
pub fn match_event<'a>(
    secondary: &'a [CanonicalEvent],
    primary: &CanonicalEvent,
) -> Option<&'a CanonicalEvent> {
    let target = code_pair(primary);
    let candidates: Vec<&CanonicalEvent> = secondary
        .iter()
        .filter(|event| code_pair(event) == target)
        .collect();
    if candidates.is_empty() {
        return None;
    }

    let exact = candidates
        .iter()
        .copied()
        .filter(|c| {
            let (home, away) = aligned_scores(c, primary);
            !is_suspicious_score(home, away)
                && home == primary.home.score
                && away == primary.away.score
        })
        .min_by(|a, b| a.event_id.cmp(&b.event_id));
    if exact.is_some() {
        return exact;
    }

    candidates.into_iter().max_by(|a, b| {
        a.player_rows()
            .cmp(&b.player_rows())
            .then_with(|| b.event_id.cmp(&a.event_id))
    })
}

/// The event to render: primary identity, the best plausible score, and
/// primary player rows enriched by the matched secondary event. Without a
/// matching secondary event the result carries scores only.
pub fn reconcile(primary: &CanonicalEvent, secondary: &[CanonicalEvent]) -> CanonicalEvent {
    let mut out = primary.clone();
    out.home_players.clear();
    out.away_players.clear();

    let Some(matched) = match_event(secondary, primary) else {
        warn!(
            event = %primary.identity(),
            "no secondary match, posting score only"
        );
        return out;
    };
    debug!(event = %primary.identity(), secondary = %matched.event_id, "matched secondary event");

    let (home, away) = aligned_scores(matched, primary);
    if is_suspicious_score(home, away) {
        warn!(
            event = %primary.identity(),
            home,
            away,
            "suspicious secondary score, keeping primary"
        );
    } else {
        out.home.score = home;
        out.away.score = away;
    }

    for side in [Side::Home, Side::Away] {
        let other = aligned_side(matched, primary, side);
        let team = matched.team(other);
        let slot = match side {
            Side::Home => &mut out.home,
            Side::Away => &mut out.away,
        };
        if slot.localized_name == slot.team_code && !team.localized_name.is_empty() {
            slot.localized_name = team.localized_name.clone();
        }
        if matched.players(other).is_empty() && !primary.players(side).is_empty() {
            debug!(event = %primary.identity(), ?side, "secondary side has no rows, using primary");
        }
        *out.players_mut(side) = link_rows(matched.players(other), primary.players(side));
    }
    out
}

/// Primary rows in order, each enriched by the secondary row with the same
/// profile slug (Cyrillic display name, slug, max-merged counters), followed
/// by the secondary rows no primary row claimed. Each row links at most once.
pub fn link_rows(secondary: &[PlayerStat], primary: &[PlayerStat]) -> Vec<PlayerStat> {
    let mut merged: Vec<PlayerStat> = primary.to_vec();
    let primary_slugs: Vec<String> = primary
        .iter()
        .map(|p| slugify(&format!("{} {}", p.given_name, p.family_name)))
        .collect();
    let display_slugs: Vec<String> = primary.iter().map(|p| slugify(&p.display_name)).collect();
    let mut used = vec![false; primary.len()];
    let mut unlinked = Vec::new();

    for row in secondary {
        let hit = row
            .profile_slug
            .as_deref()
            .filter(|s| !s.is_empty())
            .and_then(|slug| {
                (0..primary.len()).find(|idx| {
                    !used[*idx] && (primary_slugs[*idx] == slug || display_slugs[*idx] == slug)
                })
            });
        let Some(idx) = hit else {
            unlinked.push(row.clone());
            continue;
        };
        used[idx] = true;
        let target = &mut merged[idx];
        if !row.display_name.is_empty() {
            target.display_name = row.display_name.clone();
        }
        target.profile_slug = row.profile_slug.clone();
        target.stats.merge_line(&row.stats);
    }

    merged.extend(unlinked);
    merged
}

#[cfg(test)]
mod tests {
    use super::is_suspicious_score;

    #[test]
    fn suspicious_scores() {
        assert!(is_suspicious_score(0, 0));
        assert!(is_suspicious_score(250, 10));
        assert!(is_suspicious_score(10, 5));
        assert!(is_suspicious_score(19, 30));
        assert!(!is_suspicious_score(112, 108));
        assert!(!is_suspicious_score(150, 148));
    }
}
