use std::cell::RefCell;

use anyhow::{Context, Result, bail};
use reqwest::blocking::Client;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::http_client::http_client;
use crate::render::{Entity, EntityKind, RenderedMessage, utf16_len};

const TELEGRAM_API: &str = "https://api.telegram.org";
/// Maximum message length, in UTF-16 code units.
pub const MESSAGE_LIMIT: usize = 4096;
const BLOCK_SEPARATOR: &str = "\n\n";

pub trait Publisher {
    fn publish(&self, message: &RenderedMessage) -> Result<()>;
}

pub struct TelegramPublisher {
    client: &'static Client,
    token: String,
    chat_id: String,
}

impl TelegramPublisher {
    pub fn new(token: &str, chat_id: &str) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            token: token.to_string(),
            chat_id: chat_id.to_string(),
        })
    }

    fn send_chunk(&self, chunk: &RenderedMessage) -> Result<i64> {
        let url = format!("{TELEGRAM_API}/bot{}/sendMessage", self.token);
        let body = send_message_body(&self.chat_id, chunk);
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .context("telegram request failed")?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            warn!("Telegram sendMessage failed: {status} {text}");
            bail!("Telegram sendMessage failed: {status} {text}");
        }
        let reply: Value = resp.json().context("invalid telegram reply")?;
        Ok(reply["result"]["message_id"].as_i64().unwrap_or(0))
    }
}

impl Publisher for TelegramPublisher {
    fn publish(&self, message: &RenderedMessage) -> Result<()> {
        let chunks = split_message(message, MESSAGE_LIMIT);
        let total = chunks.len();
        for (idx, chunk) in chunks.iter().enumerate() {
            let message_id = self
                .send_chunk(chunk)
                .with_context(|| format!("sending part {} of {total}", idx + 1))?;
            info!(message_id, part = idx + 1, total, "published digest");
        }
        Ok(())
    }
}

/// Dry runs: prints each request body instead of sending it.
pub struct StdoutPublisher {
    chat_id: String,
}

impl StdoutPublisher {
    pub fn new(chat_id: Option<&str>) -> Self {
        Self {
            chat_id: chat_id.unwrap_or("dry-run").to_string(),
        }
    }
}

impl Publisher for StdoutPublisher {
    fn publish(&self, message: &RenderedMessage) -> Result<()> {
        for chunk in split_message(message, MESSAGE_LIMIT) {
            let body = send_message_body(&self.chat_id, &chunk);
            println!("{}", chunk.text);
            println!(
                "{}",
                serde_json::to_string_pretty(&body["entities"]).context("encode entities")?
            );
        }
        Ok(())
    }
}

/// Keeps every published message in memory.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    sent: RefCell<Vec<RenderedMessage>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<RenderedMessage> {
        self.sent.borrow().clone()
    }
}

impl Publisher for RecordingPublisher {
    fn publish(&self, message: &RenderedMessage) -> Result<()> {
        self.sent.borrow_mut().push(message.clone());
        Ok(())
    }
}

pub fn send_message_body(chat_id: &str, message: &RenderedMessage) -> Value {
    let entities: Vec<Value> = message.entities.iter().map(entity_json).collect();
    let mut body = json!({
        "chat_id": chat_id,
        "text": message.text,
        "disable_web_page_preview": true,
    });
    if !entities.is_empty() {
        body["entities"] = Value::Array(entities);
    }
    body
}

pub fn entity_json(entity: &Entity) -> Value {
    match &entity.kind {
        EntityKind::Bold => json!({
            "type": "bold",
            "offset": entity.offset,
            "length": entity.length,
        }),
        EntityKind::CustomEmoji(id) => json!({
            "type": "custom_emoji",
            "offset": entity.offset,
            "length": entity.length,
            "custom_emoji_id": id,
        }),
    }
}

/// Splits at blank lines so each part stays within `limit` UTF-16 units;
/// spans are rebased onto their part. A single block longer than `limit`
/// is cut at character boundaries.
pub fn split_message(message: &RenderedMessage, limit: usize) -> Vec<RenderedMessage> {
    let text = message.text.as_str();
    if limit == 0 || utf16_len(text) <= limit {
        return vec![message.clone()];
    }

    let mut blocks = Vec::new();
    let mut start = 0;
    for (pos, _) in text.match_indices(BLOCK_SEPARATOR) {
        blocks.push((start, pos));
        start = pos + BLOCK_SEPARATOR.len();
    }
    blocks.push((start, text.len()));

    let mut ranges: Vec<(usize, usize)> = Vec::new();
    let mut current: Option<(usize, usize)> = None;
    for (bs, be) in blocks {
        if let Some((cs, ce)) = current {
            if utf16_len(&text[cs..be]) <= limit {
                current = Some((cs, be));
                continue;
            }
            ranges.push((cs, ce));
            current = None;
        }
        if utf16_len(&text[bs..be]) <= limit {
            current = Some((bs, be));
        } else {
            ranges.extend(hard_split(text, bs, be, limit));
        }
    }
    ranges.extend(current);

    ranges
        .into_iter()
        .filter(|(s, e)| s < e)
        .map(|(s, e)| slice_message(message, s, e))
        .collect()
}

fn hard_split(text: &str, start: usize, end: usize, limit: usize) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut piece_start = start;
    let mut units = 0;
    for (idx, ch) in text[start..end].char_indices() {
        let at = start + idx;
        if units + ch.len_utf16() > limit && at > piece_start {
            out.push((piece_start, at));
            piece_start = at;
            units = 0;
        }
        units += ch.len_utf16();
    }
    if piece_start < end {
        out.push((piece_start, end));
    }
    out
}

fn slice_message(message: &RenderedMessage, start: usize, end: usize) -> RenderedMessage {
    let text = &message.text[start..end];
    let base = utf16_len(&message.text[..start]);
    let limit = base + utf16_len(text);
    let entities = message
        .entities
        .iter()
        .filter(|e| e.offset >= base && e.offset < limit)
        .map(|e| Entity {
            offset: e.offset - base,
            length: e.length.min(limit - e.offset),
            kind: e.kind.clone(),
        })
        .collect();
    RenderedMessage {
        text: text.to_string(),
        entities,
    }
}

#[cfg(test)]
mod tests {
    use super::{send_message_body, split_message};
    use crate::render::{Entity, EntityKind, RenderedMessage};

    fn message() -> RenderedMessage {
        RenderedMessage {
            text: "🏀 Бостон 118\n\n⭐ Лейкерс 112".to_string(),
            entities: vec![
                Entity {
                    offset: 10,
                    length: 3,
                    kind: EntityKind::Bold,
                },
                Entity {
                    offset: 15,
                    length: 1,
                    kind: EntityKind::CustomEmoji("42".into()),
                },
            ],
        }
    }

    #[test]
    fn short_message_is_untouched() {
        let msg = message();
        assert_eq!(split_message(&msg, 4096), vec![msg]);
    }

    #[test]
    fn split_rebases_entities() {
        let parts = split_message(&message(), 16);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].text, "🏀 Бостон 118");
        assert_eq!(parts[0].entities[0].offset, 10);
        assert_eq!(parts[1].text, "⭐ Лейкерс 112");
        assert_eq!(parts[1].entities.len(), 1);
        assert_eq!(parts[1].entities[0].offset, 0);
        assert_eq!(
            parts[1].entities[0].kind,
            EntityKind::CustomEmoji("42".into())
        );
    }

    #[test]
    fn body_carries_entities() {
        let body = send_message_body("@nba", &message());
        assert_eq!(body["chat_id"], "@nba");
        assert_eq!(body["entities"][0]["type"], "bold");
        assert_eq!(body["entities"][1]["custom_emoji_id"], "42");
    }
}
