use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::PathBuf;

use chrono::{Duration, NaiveDate, Utc};
use thiserror::Error;

use crate::identity_cache::default_cache_dir;
use crate::render::IconMap;
use crate::teams::canonical_team_code;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),
    #[error("REPORT_DATE must be YYYYMMDD or YYYY-MM-DD, got {0:?}")]
    InvalidDate(String),
    #[error("cannot read icon map {path:?}: {source}")]
    IconMapRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("icon map {path:?} is not a JSON object of strings: {source}")]
    IconMapParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("SPOTLIGHT entry {0:?} must look like CODE:Family")]
    InvalidSpotlight(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramTarget {
    pub token: String,
    pub chat_id: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Absent only in dry runs.
    pub telegram: Option<TelegramTarget>,
    pub icons: IconMap,
    pub report_date: NaiveDate,
    pub debug: bool,
    pub dry_run: bool,
    pub single_event: Option<String>,
    pub cache_dir: Option<PathBuf>,
    /// Canonical team code → family-name suffix.
    pub spotlight: BTreeMap<String, String>,
    pub title: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let today = Utc::now().date_naive();
        Self::from_lookup(opt_env, today)
    }

    /// Builds the configuration from any key lookup; `today` anchors the
    /// default report date (the day before).
    pub fn from_lookup<F>(lookup: F, today: NaiveDate) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let flag = |key: &str| get(key).is_some_and(|v| is_truthy(&v));

        let dry_run = flag("DRY_RUN");
        let telegram = match (get("TELEGRAM_BOT_TOKEN"), get("TELEGRAM_CHAT_ID")) {
            (Some(token), Some(chat_id)) => Some(TelegramTarget { token, chat_id }),
            _ if dry_run => None,
            (None, _) => return Err(ConfigError::Missing("TELEGRAM_BOT_TOKEN")),
            (_, None) => return Err(ConfigError::Missing("TELEGRAM_CHAT_ID")),
        };

        let report_date = match get("REPORT_DATE") {
            Some(raw) => parse_report_date(&raw)?,
            None => today - Duration::days(1),
        };

        let icons = match get("ICON_MAP_PATH") {
            Some(path) => load_icon_map(PathBuf::from(path))?,
            None => IconMap::new(),
        };

        let spotlight = match get("SPOTLIGHT") {
            Some(raw) => parse_spotlight(&raw)?,
            None => BTreeMap::new(),
        };

        Ok(Self {
            telegram,
            icons,
            report_date,
            debug: flag("DEBUG"),
            dry_run,
            single_event: get("SINGLE_EVENT"),
            cache_dir: get("NBA_DIGEST_CACHE_DIR")
                .map(PathBuf::from)
                .or_else(default_cache_dir),
            spotlight,
            title: get("DIGEST_TITLE"),
        })
    }
}

pub fn parse_report_date(raw: &str) -> Result<NaiveDate, ConfigError> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y-%m-%d"))
        .map_err(|_| ConfigError::InvalidDate(trimmed.to_string()))
}

/// `LAL:Джеймс,GSW:Curry` → {LAL: Джеймс, GS: Curry}.
pub fn parse_spotlight(raw: &str) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut out = BTreeMap::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((code, family)) = entry.split_once(':') else {
            return Err(ConfigError::InvalidSpotlight(entry.to_string()));
        };
        let (code, family) = (code.trim(), family.trim());
        if code.is_empty() || family.is_empty() {
            return Err(ConfigError::InvalidSpotlight(entry.to_string()));
        }
        out.insert(canonical_team_code(code), family.to_string());
    }
    Ok(out)
}

pub fn load_icon_map(path: PathBuf) -> Result<IconMap, ConfigError> {
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(source) => return Err(ConfigError::IconMapRead { path, source }),
    };
    let parsed: BTreeMap<String, String> = match serde_json::from_str(&raw) {
        Ok(map) => map,
        Err(source) => return Err(ConfigError::IconMapParse { path, source }),
    };
    Ok(parsed
        .into_iter()
        .map(|(code, id)| (canonical_team_code(&code), id))
        .collect())
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|val| {
        if val.trim().is_empty() {
            None
        } else {
            Some(val)
        }
    })
}

fn is_truthy(raw: &str) -> bool {
    let t = raw.trim().to_ascii_lowercase();
    !(t.is_empty() || t == "0" || t == "false" || t == "off" || t == "no")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::NaiveDate;

    use super::{Config, ConfigError, parse_report_date, parse_spotlight};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 16).unwrap()
    }

    fn lookup(pairs: &[(&str, &str)]) -> Box<dyn Fn(&str) -> Option<String>> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Box::new(move |key: &str| map.get(key).cloned())
    }

    #[test]
    fn dry_run_needs_no_credentials() {
        let cfg = Config::from_lookup(lookup(&[("DRY_RUN", "1")]), today()).unwrap();
        assert!(cfg.dry_run);
        assert!(cfg.telegram.is_none());
        assert_eq!(cfg.report_date, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
    }

    #[test]
    fn missing_token_is_fatal() {
        let err = Config::from_lookup(lookup(&[("TELEGRAM_CHAT_ID", "1")]), today()).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TELEGRAM_BOT_TOKEN")));
    }

    #[test]
    fn dates_and_spotlight() {
        assert_eq!(
            parse_report_date("20250115").unwrap(),
            parse_report_date("2025-01-15").unwrap()
        );
        assert!(parse_report_date("15.01.2025").is_err());

        let spot = parse_spotlight("LAL:Джеймс, GSW:Curry").unwrap();
        assert_eq!(spot.get("LAL").map(String::as_str), Some("Джеймс"));
        assert_eq!(spot.get("GS").map(String::as_str), Some("Curry"));
        assert!(parse_spotlight("LAL").is_err());
    }

    #[test]
    fn malformed_icon_map_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("icons.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        let path_str = path.to_string_lossy().to_string();
        let err = Config::from_lookup(
            lookup(&[("DRY_RUN", "yes"), ("ICON_MAP_PATH", &path_str)]),
            today(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::IconMapParse { .. }));
    }
}
