use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::espn_fetch::{apply_detail, fetch_event_detail, fetch_primary_events};
use crate::highlights::select_highlights;
use crate::http_client::PageSource;
use crate::identity_cache::IdentityCache;
use crate::matcher::reconcile;
use crate::model::{CanonicalEvent, PlayerStat, Side};
use crate::name_resolver::NameResolver;
use crate::render::{GameView, PlayerLine, RenderedMessage, render_digest};
use crate::secondary_fetch::fetch_secondary_events;
use crate::telegram::Publisher;

#[derive(Debug, Clone, Default)]
pub struct Digest {
    pub games: Vec<GameView>,
    pub message: RenderedMessage,
    /// Games posted score-only because no secondary match was found.
    pub degraded: usize,
}

impl Digest {
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

/// One full run: load the cache, build the digest, save the cache, publish.
/// The cache is saved before publishing so a failed send keeps the names
/// learned during the run.
pub fn run(config: &Config, source: &dyn PageSource, publisher: &dyn Publisher) -> Result<Digest> {
    let mut cache = match &config.cache_dir {
        Some(dir) => IdentityCache::load(dir),
        None => {
            warn!("no cache directory available, names will not persist");
            IdentityCache::in_memory()
        }
    };

    let digest = build_digest(config, source, &mut cache);

    if cache.is_dirty() {
        if let Err(err) = cache.save() {
            error!("identity cache not saved: {err:#}");
        }
    }

    if digest.is_empty() {
        info!(date = %config.report_date, "no finished games, nothing to publish");
        return Ok(digest);
    }
    publisher
        .publish(&digest.message)
        .context("failed to publish digest")?;
    Ok(digest)
}

/// Fetches both sources for the report date and renders the digest.
/// Source failures degrade the output; they never abort it.
pub fn build_digest(config: &Config, source: &dyn PageSource, cache: &mut IdentityCache) -> Digest {
    let mut primaries = fetch_primary_events(source, config.report_date);
    if let Some(only) = config.single_event.as_deref() {
        primaries.retain(|p| p.event.event_id == only);
        info!(event_id = only, kept = primaries.len(), "single event mode");
    }
    primaries.retain(|p| {
        if !p.event.completed {
            info!(event = %p.event.identity(), "skipping unfinished game");
        }
        p.event.completed
    });
    if primaries.is_empty() {
        return Digest {
            message: render_digest(None, &[], &config.icons),
            ..Digest::default()
        };
    }

    let secondary = fetch_secondary_events(source, config.report_date);
    let resolver = NameResolver::new(source);

    let mut games = Vec::with_capacity(primaries.len());
    let mut degraded = 0;
    for primary in primaries {
        let mut event = primary.event;
        let detail = fetch_event_detail(source, &event.event_id);
        apply_detail(&mut event, &detail);

        let reconciled = reconcile(&event, &secondary);
        if reconciled.player_rows() == 0 {
            degraded += 1;
        }
        games.push(game_view(reconciled, config, &resolver, cache));
    }

    let message = render_digest(config.title.as_deref(), &games, &config.icons);
    info!(games = games.len(), degraded, "built digest");
    Digest {
        games,
        message,
        degraded,
    }
}

fn game_view(
    event: CanonicalEvent,
    config: &Config,
    resolver: &NameResolver,
    cache: &mut IdentityCache,
) -> GameView {
    let mut lines = [Vec::new(), Vec::new()];
    for (slot, side) in [Side::Home, Side::Away].into_iter().enumerate() {
        let spotlight = config
            .spotlight
            .get(&event.team(side).team_code)
            .map(String::as_str);
        lines[slot] = select_highlights(event.players(side), spotlight)
            .into_iter()
            .map(|player| player_line(player, resolver, cache))
            .collect();
    }
    let [home_lines, away_lines] = lines;
    GameView {
        event,
        home_lines,
        away_lines,
    }
}

fn player_line(player: &PlayerStat, resolver: &NameResolver, cache: &mut IdentityCache) -> PlayerLine {
    let name = resolver.resolve(
        cache,
        &player.given_name,
        &player.family_name,
        &player.stable_id,
    );
    PlayerLine {
        given: name.given,
        given_foreign: player.given_name.clone(),
        family: name.family,
        stats: player.stats.clone(),
    }
}
