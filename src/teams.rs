//! Static team tables: code aliases and Russian team names.
//!
//! Canonical codes follow the primary source's vocabulary (`GS`, `NO`,
//! `NY`, `SA`, `UTAH`, `WSH`). Everything else funnels into them through
//! [`canonical_team_code`].

const CODE_ALIASES: &[(&str, &str)] = &[
    ("GSW", "GS"),
    ("NOP", "NO"),
    ("NOH", "NO"),
    ("NOK", "NO"),
    ("NYK", "NY"),
    ("SAS", "SA"),
    ("UTA", "UTAH"),
    ("WAS", "WSH"),
    ("BRK", "BKN"),
    ("NJN", "BKN"),
    ("NJ", "BKN"),
    ("PHO", "PHX"),
    ("CHO", "CHA"),
    ("CHH", "CHA"),
    ("SEA", "OKC"),
    ("VAN", "MEM"),
];

pub struct TeamInfo {
    pub code: &'static str,
    pub name_ru: &'static str,
    /// Extra spellings seen on the secondary site, lowercase.
    pub aliases_ru: &'static [&'static str],
}

pub const TEAMS: &[TeamInfo] = &[
    TeamInfo { code: "ATL", name_ru: "Атланта", aliases_ru: &["атланта хокс"] },
    TeamInfo { code: "BOS", name_ru: "Бостон", aliases_ru: &["бостон селтикс"] },
    TeamInfo { code: "BKN", name_ru: "Бруклин", aliases_ru: &["бруклин нетс"] },
    TeamInfo { code: "CHA", name_ru: "Шарлотт", aliases_ru: &["шарлотт хорнетс"] },
    TeamInfo { code: "CHI", name_ru: "Чикаго", aliases_ru: &["чикаго буллз"] },
    TeamInfo { code: "CLE", name_ru: "Кливленд", aliases_ru: &["кливленд кавальерс"] },
    TeamInfo { code: "DAL", name_ru: "Даллас", aliases_ru: &["даллас маверикс"] },
    TeamInfo { code: "DEN", name_ru: "Денвер", aliases_ru: &["денвер наггетс"] },
    TeamInfo { code: "DET", name_ru: "Детройт", aliases_ru: &["детройт пистонс"] },
    TeamInfo { code: "GS", name_ru: "Голден Стэйт", aliases_ru: &["голден стейт", "голден стэйт уорриорз", "голден стейт уорриорз"] },
    TeamInfo { code: "HOU", name_ru: "Хьюстон", aliases_ru: &["хьюстон рокетс"] },
    TeamInfo { code: "IND", name_ru: "Индиана", aliases_ru: &["индиана пэйсерс"] },
    TeamInfo { code: "LAC", name_ru: "Клипперс", aliases_ru: &["ла клипперс", "лос-анджелес клипперс"] },
    TeamInfo { code: "LAL", name_ru: "Лейкерс", aliases_ru: &["ла лейкерс", "лос-анджелес лейкерс"] },
    TeamInfo { code: "MEM", name_ru: "Мемфис", aliases_ru: &["мемфис гриззлис"] },
    TeamInfo { code: "MIA", name_ru: "Майами", aliases_ru: &["майами хит"] },
    TeamInfo { code: "MIL", name_ru: "Милуоки", aliases_ru: &["милуоки бакс"] },
    TeamInfo { code: "MIN", name_ru: "Миннесота", aliases_ru: &["миннесота тимбервулвз"] },
    TeamInfo { code: "NO", name_ru: "Новый Орлеан", aliases_ru: &["нью-орлеан", "нью-орлеан пеликанс"] },
    TeamInfo { code: "NY", name_ru: "Нью-Йорк", aliases_ru: &["нью-йорк никс"] },
    TeamInfo { code: "OKC", name_ru: "Оклахома-Сити", aliases_ru: &["оклахома", "оклахома-сити тандер"] },
    TeamInfo { code: "ORL", name_ru: "Орландо", aliases_ru: &["орландо мэджик"] },
    TeamInfo { code: "PHI", name_ru: "Филадельфия", aliases_ru: &["филадельфия сиксерс"] },
    TeamInfo { code: "PHX", name_ru: "Финикс", aliases_ru: &["финикс санз"] },
    TeamInfo { code: "POR", name_ru: "Портленд", aliases_ru: &["портленд трэйл блэйзерс"] },
    TeamInfo { code: "SAC", name_ru: "Сакраменто", aliases_ru: &["сакраменто кингз"] },
    TeamInfo { code: "SA", name_ru: "Сан-Антонио", aliases_ru: &["сан-антонио сперс"] },
    TeamInfo { code: "TOR", name_ru: "Торонто", aliases_ru: &["торонто рэпторс"] },
    TeamInfo { code: "UTAH", name_ru: "Юта", aliases_ru: &["юта джаз"] },
    TeamInfo { code: "WSH", name_ru: "Вашингтон", aliases_ru: &["вашингтон уизардс"] },
];

/// Uppercases, trims and folds known aliases onto one canonical code.
///
/// Unknown codes pass through uppercased, so two sources that agree on an
/// unknown code still match each other.
pub fn canonical_team_code(raw: &str) -> String {
    let code = raw.trim().to_ascii_uppercase();
    CODE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == code)
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or(code)
}

pub fn team_info(code: &str) -> Option<&'static TeamInfo> {
    let code = canonical_team_code(code);
    TEAMS.iter().find(|team| team.code == code)
}

/// Russian display name for a canonical code; falls back to the code.
pub fn localized_team_name(code: &str) -> String {
    team_info(code)
        .map(|team| team.name_ru.to_string())
        .unwrap_or_else(|| canonical_team_code(code))
}

/// Resolves a Russian team name as printed on the secondary site to a code.
pub fn code_for_localized_name(raw: &str) -> Option<&'static str> {
    let needle = fold_name(raw);
    if needle.is_empty() {
        return None;
    }
    TEAMS
        .iter()
        .find(|team| {
            fold_name(team.name_ru) == needle
                || team.aliases_ru.iter().any(|alias| fold_name(alias) == needle)
        })
        .map(|team| team.code)
}

fn fold_name(raw: &str) -> String {
    raw.to_lowercase()
        .replace('ё', "е")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::{canonical_team_code, code_for_localized_name, localized_team_name};

    #[test]
    fn aliases_fold_to_one_code() {
        for raw in ["NO", "nop", "NOH"] {
            assert_eq!(canonical_team_code(raw), "NO");
        }
        assert_eq!(canonical_team_code("utA"), "UTAH");
        assert_eq!(canonical_team_code("XYZ"), "XYZ");
    }

    #[test]
    fn localized_names_round_trip_through_codes() {
        assert_eq!(localized_team_name("GSW"), "Голден Стэйт");
        assert_eq!(code_for_localized_name("Голден Стейт"), Some("GS"));
        assert_eq!(code_for_localized_name("  бостон  "), Some("BOS"));
        assert_eq!(code_for_localized_name("Спартак"), None);
    }
}
