//! Russian digest text plus inline annotation spans.
//!
//! Span offsets and lengths are counted in UTF-16 code units, the unit the
//! messaging API addresses text in. `MessageBuilder` keeps the running count
//! as text is pushed, so astral characters (emoji) emitted earlier shift
//! later spans correctly.

use std::collections::BTreeMap;

use crate::highlights::is_exceptional;
use crate::identity_cache::is_localized;
use crate::model::{CanonicalEvent, Side, StatLine, TeamResult};
use crate::name_tables::latin_initial;

/// Team code → custom emoji id.
pub type IconMap = BTreeMap<String, String>;

pub const BALL_ICON: &str = "🏀";
/// One UTF-16 unit, replaced client-side by the custom emoji span over it.
pub const ICON_PLACEHOLDER: &str = "⭐";
pub const EXCEPTIONAL_MARKER: &str = " 🔥";
pub const OVERTIME_MARKER: &str = "ОТ";

pub const REBOUNDS_SHOWN_ABOVE: u32 = 5;
pub const ASSISTS_SHOWN_ABOVE: u32 = 5;
pub const STEALS_SHOWN_ABOVE: u32 = 4;
pub const BLOCKS_SHOWN_ABOVE: u32 = 4;

const POINT_FORMS: [&str; 3] = ["очко", "очка", "очков"];
const REBOUND_FORMS: [&str; 3] = ["подбор", "подбора", "подборов"];
const ASSIST_FORMS: [&str; 3] = ["передача", "передачи", "передач"];
const STEAL_FORMS: [&str; 3] = ["перехват", "перехвата", "перехватов"];
const BLOCK_FORMS: [&str; 3] = ["блок-шот", "блок-шота", "блок-шотов"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKind {
    Bold,
    CustomEmoji(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub offset: usize,
    pub length: usize,
    pub kind: EntityKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedMessage {
    pub text: String,
    pub entities: Vec<Entity>,
}

pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

#[derive(Debug, Default)]
pub struct MessageBuilder {
    text: String,
    utf16: usize,
    entities: Vec<Entity>,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn utf16_offset(&self) -> usize {
        self.utf16
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn push(&mut self, text: &str) -> &mut Self {
        self.utf16 += utf16_len(text);
        self.text.push_str(text);
        self
    }

    pub fn push_bold(&mut self, text: &str) -> &mut Self {
        let offset = self.utf16;
        self.push(text);
        if !text.is_empty() {
            self.entities.push(Entity {
                offset,
                length: self.utf16 - offset,
                kind: EntityKind::Bold,
            });
        }
        self
    }

    /// Team icon: the custom emoji when the map knows the team, else the
    /// literal ball.
    pub fn push_icon(&mut self, team_code: &str, icons: &IconMap) -> &mut Self {
        match icons.get(team_code) {
            Some(id) => {
                let offset = self.utf16;
                self.push(ICON_PLACEHOLDER);
                self.entities.push(Entity {
                    offset,
                    length: self.utf16 - offset,
                    kind: EntityKind::CustomEmoji(id.clone()),
                });
                self
            }
            None => self.push(BALL_ICON),
        }
    }

    pub fn newline(&mut self) -> &mut Self {
        self.push("\n")
    }

    pub fn finish(self) -> RenderedMessage {
        RenderedMessage {
            text: self.text,
            entities: self.entities,
        }
    }
}

/// Index into a `[one, few, many]` form table for `n`.
pub fn plural_form(n: u32) -> usize {
    let tens = n % 100;
    if (11..=19).contains(&tens) {
        return 2;
    }
    match n % 10 {
        1 => 0,
        2..=4 => 1,
        _ => 2,
    }
}

fn phrase(n: u32, forms: &[&str; 3]) -> String {
    format!("{n} {}", forms[plural_form(n)])
}

pub fn stat_phrases(stats: &StatLine) -> Vec<String> {
    let mut out = vec![phrase(stats.points, &POINT_FORMS)];
    let optional = [
        (stats.rebounds, REBOUNDS_SHOWN_ABOVE, &REBOUND_FORMS),
        (stats.assists, ASSISTS_SHOWN_ABOVE, &ASSIST_FORMS),
        (stats.steals, STEALS_SHOWN_ABOVE, &STEAL_FORMS),
        (stats.blocks, BLOCKS_SHOWN_ABOVE, &BLOCK_FORMS),
    ];
    for (value, above, forms) in optional {
        if value > above {
            out.push(phrase(value, forms));
        }
    }
    out
}

/// A selected player with the names to print.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerLine {
    pub given: String,
    pub given_foreign: String,
    pub family: String,
    pub stats: StatLine,
}

impl PlayerLine {
    pub fn initial(&self) -> Option<String> {
        let given = self.given.trim();
        if is_localized(given) {
            return given
                .chars()
                .next()
                .map(|c| c.to_uppercase().collect::<String>());
        }
        let latin = if given.is_empty() {
            self.given_foreign.as_str()
        } else {
            given
        };
        latin_initial(latin).map(str::to_string)
    }
}

pub fn format_player_line(line: &PlayerLine) -> String {
    let mut out = String::new();
    if let Some(initial) = line.initial() {
        out.push_str(&initial);
        out.push_str(". ");
    }
    out.push_str(line.family.trim());
    out.push_str(": ");
    out.push_str(&stat_phrases(&line.stats).join(", "));
    if is_exceptional(&line.stats) {
        out.push_str(EXCEPTIONAL_MARKER);
    }
    out
}

/// A reconciled game with resolved highlight lines per side.
#[derive(Debug, Clone, Default)]
pub struct GameView {
    pub event: CanonicalEvent,
    pub home_lines: Vec<PlayerLine>,
    pub away_lines: Vec<PlayerLine>,
}

impl GameView {
    fn lines(&self, side: Side) -> &[PlayerLine] {
        match side {
            Side::Home => &self.home_lines,
            Side::Away => &self.away_lines,
        }
    }
}

fn overtime_label(periods: u32) -> String {
    if periods > 1 {
        format!("{periods}{OVERTIME_MARKER}")
    } else {
        OVERTIME_MARKER.to_string()
    }
}

fn render_team_header(
    b: &mut MessageBuilder,
    team: &TeamResult,
    winner: bool,
    overtime: Option<u32>,
    icons: &IconMap,
) {
    b.push_icon(&team.team_code, icons).push(" ");
    b.push(team.localized_name.trim()).push(" ");
    let score = team.score.to_string();
    if winner {
        b.push_bold(&score);
    } else {
        b.push(&score);
    }
    if let Some(record) = team.record.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        b.push(" (").push(record).push(")");
    }
    if let Some(periods) = overtime {
        b.push(" (").push(&overtime_label(periods)).push(")");
    }
}

/// Winner first; the overtime marker rides on the first team's header.
pub fn render_event(b: &mut MessageBuilder, game: &GameView, icons: &IconMap) {
    let order = if game.event.is_winner(Side::Away) {
        [Side::Away, Side::Home]
    } else {
        [Side::Home, Side::Away]
    };
    for (idx, side) in order.into_iter().enumerate() {
        if idx > 0 {
            b.newline().newline();
        }
        let overtime = if idx == 0 { game.event.overtime } else { None };
        render_team_header(
            b,
            game.event.team(side),
            game.event.is_winner(side),
            overtime,
            icons,
        );
        for line in game.lines(side) {
            b.newline().push(&format_player_line(line));
        }
    }
}

pub fn render_digest(title: Option<&str>, games: &[GameView], icons: &IconMap) -> RenderedMessage {
    let mut b = MessageBuilder::new();
    if let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) {
        b.push_bold(title);
    }
    for game in games {
        if !b.is_empty() {
            b.newline().newline();
        }
        render_event(&mut b, game, icons);
    }
    b.finish()
}
