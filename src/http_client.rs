use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT_LANGUAGE, USER_AGENT};
use tracing::debug;

const REQUEST_TIMEOUT_SECS: u64 = 10;
const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_BASE_MS: u64 = 300;

static CLIENT: OnceCell<Client> = OnceCell::new();

pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build http client")
    })
}

/// Anything that can hand back the body of a page by URL.
///
/// `Ok(None)` means the page does not exist (404 and friends); transport
/// failures are `Err`. Callers in the core treat both as "no data".
pub trait PageSource {
    fn fetch(&self, url: &str) -> Result<Option<String>>;
}

/// Blocking HTTP source with bounded exponential backoff on transient errors.
pub struct HttpPageSource {
    client: &'static Client,
}

impl HttpPageSource {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: http_client()?,
        })
    }

    fn fetch_once(&self, url: &str) -> Result<Attempt> {
        let resp = self
            .client
            .get(url)
            .header(USER_AGENT, "Mozilla/5.0")
            .header(ACCEPT_LANGUAGE, "ru-RU,ru;q=0.9,en;q=0.8")
            .send()
            .context("request failed")?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Ok(Attempt::Missing);
        }
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Ok(Attempt::Retry(format!("http {status}")));
        }
        if !status.is_success() {
            return Ok(Attempt::Missing);
        }
        let body = resp.text().context("failed reading body")?;
        Ok(Attempt::Body(body))
    }
}

enum Attempt {
    Body(String),
    Missing,
    Retry(String),
}

impl PageSource for HttpPageSource {
    fn fetch(&self, url: &str) -> Result<Option<String>> {
        let mut last_err = None;
        for attempt in 0..MAX_ATTEMPTS {
            match self.fetch_once(url) {
                Ok(Attempt::Body(body)) => return Ok(Some(body)),
                Ok(Attempt::Missing) => return Ok(None),
                Ok(Attempt::Retry(reason)) => {
                    last_err = Some(anyhow::anyhow!("{reason}"));
                }
                Err(err) => last_err = Some(err),
            }
            if attempt + 1 < MAX_ATTEMPTS {
                let delay = backoff_delay(attempt);
                debug!(url, attempt, ?delay, "retrying page fetch");
                std::thread::sleep(delay);
            }
        }
        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("page fetch failed")))
            .with_context(|| format!("fetching {url}"))
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(BACKOFF_BASE_MS << attempt.min(6))
}

/// In-memory page source keyed by exact URL. Used by tests and dry runs
/// replayed from saved pages.
#[derive(Debug, Default, Clone)]
pub struct StaticPageSource {
    pages: HashMap<String, String>,
}

impl StaticPageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }
}

impl PageSource for StaticPageSource {
    fn fetch(&self, url: &str) -> Result<Option<String>> {
        Ok(self.pages.get(url).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::{PageSource, StaticPageSource, backoff_delay};
    use std::time::Duration;

    #[test]
    fn backoff_doubles() {
        assert_eq!(backoff_delay(0), Duration::from_millis(300));
        assert_eq!(backoff_delay(1), Duration::from_millis(600));
        assert_eq!(backoff_delay(2), Duration::from_millis(1200));
    }

    #[test]
    fn static_source_misses_are_none() {
        let source = StaticPageSource::new().with_page("https://a/", "body");
        assert_eq!(source.fetch("https://a/").unwrap().as_deref(), Some("body"));
        assert!(source.fetch("https://b/").unwrap().is_none());
    }
}
