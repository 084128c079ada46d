use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::http_client::PageSource;
use crate::identity_cache::{IdentityCache, is_localized};
use crate::name_tables::{is_generational_suffix, name_exception};
use crate::secondary_fetch::{parse_first_profile_link, parse_profile_heading, profile_urls, search_url};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocalizedName {
    pub given: String,
    pub family: String,
}

impl LocalizedName {
    fn new(given: &str, family: &str) -> Self {
        Self {
            given: given.trim().to_string(),
            family: family.trim().to_string(),
        }
    }
}

/// Turns foreign-alphabet player names into Russian ones, tier by tier:
/// identity cache, live profile lookup, exception table, untranslated.
pub struct NameResolver<'a> {
    source: &'a dyn PageSource,
}

impl<'a> NameResolver<'a> {
    pub fn new(source: &'a dyn PageSource) -> Self {
        Self { source }
    }

    pub fn resolve(
        &self,
        cache: &mut IdentityCache,
        given_foreign: &str,
        family_foreign: &str,
        stable_id: &str,
    ) -> LocalizedName {
        if is_localized(family_foreign) {
            return LocalizedName::new(given_foreign, family_foreign);
        }

        if stable_id.is_empty() {
            if let Some(name) = self.live_or_exception(given_foreign, family_foreign) {
                return name;
            }
            return LocalizedName::new("", family_foreign);
        }

        if cache.needs_improvement(stable_id) {
            match self.live_or_exception(given_foreign, family_foreign) {
                Some(name) => {
                    cache.upsert(stable_id, &name.given, &name.family);
                }
                None => {
                    debug!(stable_id, family_foreign, "no localized name, caching placeholder");
                    cache.upsert(stable_id, "", family_foreign);
                    cache.enqueue_pending(stable_id, given_foreign, family_foreign);
                }
            }
        }

        match cache.lookup(stable_id) {
            Some(entry) => LocalizedName::new(entry.given(), entry.family()),
            None => LocalizedName::new("", family_foreign),
        }
    }

    fn live_or_exception(&self, given: &str, family: &str) -> Option<LocalizedName> {
        if let Some(name) = self.resolve_live(given, family) {
            return Some(name);
        }
        name_exception(family).map(|(g, f)| LocalizedName::new(g, f))
    }

    /// Profile probes first, then the site search. Any failure is a miss.
    pub fn resolve_live(&self, given: &str, family: &str) -> Option<LocalizedName> {
        let full = format!("{} {}", given.trim(), family.trim());
        let full = full.trim();
        let slug = slugify(full);
        if slug.is_empty() {
            return None;
        }

        for url in profile_urls(&slug) {
            if let Some(name) = self.name_at(&url) {
                debug!(url = %url, "resolved name from profile");
                return Some(name);
            }
        }

        let search = match search_url(full) {
            Ok(url) => url,
            Err(err) => {
                warn!("search url for {full}: {err:#}");
                return None;
            }
        };
        let html = self.page(&search)?;
        let link = match parse_first_profile_link(&html) {
            Ok(Some(link)) => link,
            Ok(None) => return None,
            Err(err) => {
                warn!("search page unparsable: {err:#}");
                return None;
            }
        };
        let name = self.name_at(&link);
        if name.is_some() {
            debug!(url = %link, "resolved name from search");
        }
        name
    }

    fn name_at(&self, url: &str) -> Option<LocalizedName> {
        let html = self.page(url)?;
        let heading = match parse_profile_heading(&html) {
            Ok(heading) => heading?,
            Err(err) => {
                warn!(url, "profile page unparsable: {err:#}");
                return None;
            }
        };
        split_heading(&heading).filter(|name| is_localized(&name.family))
    }

    fn page(&self, url: &str) -> Option<String> {
        match self.source.fetch(url) {
            Ok(body) => body,
            Err(err) => {
                debug!(url, "page fetch failed: {err:#}");
                None
            }
        }
    }
}

/// Given name = first token, family = last token; a trailing generational
/// suffix stays attached to the family name.
pub fn split_heading(heading: &str) -> Option<LocalizedName> {
    let tokens: Vec<&str> = heading.split_whitespace().collect();
    match tokens.as_slice() {
        [] => None,
        [only] => Some(LocalizedName::new("", only)),
        [first, last] if is_generational_suffix(last) => {
            Some(LocalizedName::new("", &format!("{first} {last}")))
        }
        [first, .., family, last] if is_generational_suffix(last) => {
            Some(LocalizedName::new(first, &format!("{family} {last}")))
        }
        [first, .., last] => Some(LocalizedName::new(first, last)),
    }
}

/// Lowercase ASCII slug: diacritics stripped, every run of other
/// characters collapsed to a single `-`.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;
    for ch in name.nfd().filter(|c| !is_combining_mark(*c)) {
        let folded: Option<&str> = match ch {
            'đ' | 'Đ' => Some("d"),
            'ø' | 'Ø' => Some("o"),
            'ł' | 'Ł' => Some("l"),
            'ß' => Some("ss"),
            'æ' | 'Æ' => Some("ae"),
            _ => None,
        };
        if let Some(text) = folded {
            if pending_sep && !out.is_empty() {
                out.push('-');
            }
            pending_sep = false;
            out.push_str(text);
        } else if ch.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('-');
            }
            pending_sep = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}
