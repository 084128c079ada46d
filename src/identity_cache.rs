use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::name_tables::is_generational_suffix;

const CACHE_DIR: &str = "nba_digest";
const NAMES_FILE: &str = "names_cache.json";
const PENDING_FILE: &str = "pending_names.json";

/// One cached localized name. Older cache generations stored only the
/// family name as a bare string; both forms load and save unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CacheEntry {
    Structured { given: String, family: String },
    Legacy(String),
}

impl CacheEntry {
    pub fn given(&self) -> &str {
        match self {
            CacheEntry::Structured { given, .. } => given,
            CacheEntry::Legacy(_) => "",
        }
    }

    pub fn family(&self) -> &str {
        match self {
            CacheEntry::Structured { family, .. } => family,
            CacheEntry::Legacy(family) => family,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingEntry {
    pub id: String,
    #[serde(default)]
    pub given: String,
    #[serde(default)]
    pub family: String,
}

/// True when every alphabetic character is Cyrillic and there is at least
/// one. Generational suffix tokens (`Jr.`, `III`) are skipped, so
/// "Нэнс Jr." counts as localized.
pub fn is_localized(text: &str) -> bool {
    let mut seen = false;
    let letters = text
        .split_whitespace()
        .filter(|token| !is_generational_suffix(token))
        .flat_map(str::chars)
        .filter(|c| c.is_alphabetic());
    for ch in letters {
        if !is_cyrillic(ch) {
            return false;
        }
        seen = true;
    }
    seen
}

fn is_cyrillic(ch: char) -> bool {
    matches!(ch, '\u{0400}'..='\u{04FF}' | '\u{0500}'..='\u{052F}')
}

/// Whether a cache slot is worth another live resolution attempt.
pub fn needs_improvement(entry: Option<&CacheEntry>) -> bool {
    match entry {
        None => true,
        Some(CacheEntry::Legacy(family)) => !is_localized(family),
        Some(CacheEntry::Structured { given, family }) => {
            !is_localized(family) || given.trim().is_empty()
        }
    }
}

#[derive(Debug, Clone)]
struct CachePaths {
    names: PathBuf,
    pending: PathBuf,
}

/// Stable athlete id → localized name, plus the queue of ids still waiting
/// for an offline fix. The only state that survives between runs.
#[derive(Debug, Default)]
pub struct IdentityCache {
    entries: BTreeMap<String, CacheEntry>,
    pending: Vec<PendingEntry>,
    queued_this_run: HashSet<String>,
    paths: Option<CachePaths>,
    dirty: bool,
}

impl IdentityCache {
    /// A cache that never touches disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn with_entries(
        entries: impl IntoIterator<Item = (String, CacheEntry)>,
        pending: Vec<PendingEntry>,
    ) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            pending,
            ..Self::default()
        }
    }

    /// Loads both documents from `dir`. Missing or unreadable documents
    /// start empty; a broken cache must not stop the digest.
    pub fn load(dir: &Path) -> Self {
        let paths = CachePaths {
            names: dir.join(NAMES_FILE),
            pending: dir.join(PENDING_FILE),
        };
        let entries: BTreeMap<String, CacheEntry> =
            read_json_or_default(&paths.names, "names cache");
        let pending: Vec<PendingEntry> = read_json_or_default(&paths.pending, "pending queue");
        info!(
            entries = entries.len(),
            pending = pending.len(),
            "loaded identity cache"
        );
        Self {
            entries,
            pending,
            queued_this_run: HashSet::new(),
            paths: Some(paths),
            dirty: false,
        }
    }

    /// Writes both documents atomically (temp file, then rename).
    pub fn save(&self) -> Result<()> {
        let Some(paths) = &self.paths else {
            return Ok(());
        };
        if let Some(dir) = paths.names.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("create cache dir {}", dir.display()))?;
        }
        write_json_atomic(&paths.names, &self.entries).context("save names cache")?;
        write_json_atomic(&paths.pending, &self.pending).context("save pending queue")?;
        debug!(
            entries = self.entries.len(),
            pending = self.pending.len(),
            "saved identity cache"
        );
        Ok(())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, stable_id: &str) -> Option<&CacheEntry> {
        self.entries.get(stable_id)
    }

    pub fn needs_improvement(&self, stable_id: &str) -> bool {
        needs_improvement(self.lookup(stable_id))
    }

    /// Stores a structured entry. A Cyrillic family name is never replaced
    /// by a foreign one, and a known given name is kept when the new one is
    /// empty. Returns whether the stored value changed.
    pub fn upsert(&mut self, stable_id: &str, given: &str, family: &str) -> bool {
        let given = given.trim();
        let family = family.trim();
        if stable_id.is_empty() || family.is_empty() {
            return false;
        }

        let mut next_given = given.to_string();
        if let Some(existing) = self.entries.get(stable_id) {
            if is_localized(existing.family()) && !is_localized(family) {
                debug!(stable_id, family, "kept localized cache entry");
                return false;
            }
            if next_given.is_empty() && existing.family() == family {
                next_given = existing.given().to_string();
            }
        }

        let entry = CacheEntry::Structured {
            given: next_given,
            family: family.to_string(),
        };
        if self.entries.get(stable_id) == Some(&entry) {
            return false;
        }
        self.entries.insert(stable_id.to_string(), entry);
        self.dirty = true;
        true
    }

    pub fn pending(&self) -> &[PendingEntry] {
        &self.pending
    }

    /// Queues an id for offline resolution. No-op when the id already has a
    /// satisfactory entry, was queued earlier this run, or is already in
    /// the persisted queue.
    pub fn enqueue_pending(&mut self, stable_id: &str, given: &str, family: &str) -> bool {
        if stable_id.is_empty() {
            return false;
        }
        if !needs_improvement(self.lookup(stable_id)) {
            return false;
        }
        if self.queued_this_run.contains(stable_id) {
            return false;
        }
        if self.pending.iter().any(|p| p.id == stable_id) {
            return false;
        }
        self.queued_this_run.insert(stable_id.to_string());
        self.pending.push(PendingEntry {
            id: stable_id.to_string(),
            given: given.trim().to_string(),
            family: family.trim().to_string(),
        });
        self.dirty = true;
        true
    }
}

/// `$XDG_CACHE_HOME/nba_digest`, else `~/.cache/nba_digest`.
pub fn default_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path, what: &str) -> T {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return T::default(),
    };
    if raw.trim().is_empty() {
        return T::default();
    }
    match serde_json::from_str::<T>(&raw) {
        Ok(value) => value,
        Err(err) => {
            warn!(path = %path.display(), "ignoring unreadable {what}: {err}");
            T::default()
        }
    }
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(value).context("serialize")?;
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{CacheEntry, IdentityCache, is_localized, needs_improvement};

    #[test]
    fn localized_alphabet_check() {
        assert!(is_localized("Йокич"));
        assert!(is_localized("Гилджес-Александер"));
        assert!(is_localized("Трент мл."));
        assert!(!is_localized("Jokic"));
        assert!(is_localized("Нэнс Jr."));
        assert!(is_localized("Гриффи III"));
        assert!(!is_localized("Nance Jr."));
        assert!(!is_localized("Jr."));
        assert!(!is_localized(""));
        assert!(!is_localized("--"));
    }

    #[test]
    fn needs_improvement_rules() {
        assert!(needs_improvement(None));
        assert!(needs_improvement(Some(&CacheEntry::Legacy("James".into()))));
        assert!(!needs_improvement(Some(&CacheEntry::Legacy("Джеймс".into()))));
        assert!(needs_improvement(Some(&CacheEntry::Structured {
            given: String::new(),
            family: "Джеймс".into(),
        })));
        assert!(needs_improvement(Some(&CacheEntry::Structured {
            given: "Леброн".into(),
            family: "James".into(),
        })));
        assert!(!needs_improvement(Some(&CacheEntry::Structured {
            given: "Леброн".into(),
            family: "Джеймс".into(),
        })));
        assert!(!needs_improvement(Some(&CacheEntry::Structured {
            given: "Ларри".into(),
            family: "Нэнс Jr.".into(),
        })));
    }

    #[test]
    fn suffixed_family_is_not_downgraded() {
        let mut cache = IdentityCache::in_memory();
        assert!(cache.upsert("42", "Ларри", "Нэнс Jr."));
        assert!(!cache.upsert("42", "", "Nance"));
        assert_eq!(cache.lookup("42").map(CacheEntry::family), Some("Нэнс Jr."));
    }
}
