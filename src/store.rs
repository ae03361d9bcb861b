//! Persistence boundary for analyzed messages.
//!
//! The analyzer only needs hash-based dedup, message-ID allocation and a
//! place to save the final record. `MemoryStore` serializes its own writes
//! behind a mutex and can be persisted to a JSON file between runs.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

pub trait Store: Send + Sync {
    /// Local ID of a previously saved message with this hash, if any.
    fn has_message_hash(&self, hash: &str) -> Result<Option<String>>;
    /// Allocate the next local message ID for the prefix, e.g. "TUE-100P".
    fn next_message_id(&self, prefix: &str) -> Result<String>;
    fn save_message(&self, record: &MessageRecord) -> Result<()>;
}

/// The committed result of analyzing one received message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub local_id: String,
    pub hash: String,
    pub delivery_time: Option<DateTime<FixedOffset>>,
    pub message: String,
    pub session: i64,
    pub from_address: String,
    pub from_call_sign: String,
    pub from_bbs: String,
    pub to_bbs: String,
    pub jurisdiction: String,
    pub message_type: String,
    pub subject: String,
    /// Fired problem codes, sorted.
    pub problems: Vec<String>,
    pub score: u32,
    pub out_of: u32,
    pub summary: String,
    pub counted: bool,
}

/// One outgoing message generated in reply to a received message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub local_id: String,
    /// Local ID of the message this responds to.
    pub response_to: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub send_time: Option<DateTime<FixedOffset>>,
    pub sender_call: String,
    pub sender_bbs: String,
}

impl Response {
    /// Stamp the send time once the transport has delivered the response.
    pub fn mark_sent(&mut self, when: DateTime<FixedOffset>) {
        self.send_time = Some(when);
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct MemoryState {
    messages: Vec<MessageRecord>,
    next_ids: HashMap<String, u32>,
}

#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    first_id: u32,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_first_id(1)
    }

    /// Start message numbering for every prefix at `first_id`.
    pub fn with_first_id(first_id: u32) -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            first_id,
        }
    }

    /// Load a store previously written with `save`. A missing file yields an
    /// empty store.
    pub fn load(path: &str) -> Result<Self> {
        let store = Self::new();
        if !std::path::Path::new(path).exists() {
            log::debug!("Store file {path} not found, starting empty");
            return Ok(store);
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("reading store {path}"))?;
        let state: MemoryState =
            serde_json::from_str(&content).with_context(|| format!("parsing store {path}"))?;
        log::debug!("Loaded {} messages from {path}", state.messages.len());
        *store.lock()? = state;
        Ok(store)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = serde_json::to_string_pretty(&*self.lock()?)?;
        std::fs::write(path, content).with_context(|| format!("writing store {path}"))?;
        Ok(())
    }

    pub fn messages(&self) -> Result<Vec<MessageRecord>> {
        Ok(self.lock()?.messages.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))
    }
}

impl Store for MemoryStore {
    fn has_message_hash(&self, hash: &str) -> Result<Option<String>> {
        Ok(self
            .lock()?
            .messages
            .iter()
            .find(|m| m.hash == hash)
            .map(|m| m.local_id.clone()))
    }

    fn next_message_id(&self, prefix: &str) -> Result<String> {
        let mut state = self.lock()?;
        let next = state
            .next_ids
            .entry(prefix.to_string())
            .or_insert(self.first_id);
        let id = format!("{prefix}-{:03}P", *next);
        *next += 1;
        Ok(id)
    }

    fn save_message(&self, record: &MessageRecord) -> Result<()> {
        let mut state = self.lock()?;
        if let Some(existing) = state.messages.iter().find(|m| m.hash == record.hash) {
            bail!(
                "message {} has the same hash as already stored {}",
                record.local_id,
                existing.local_id
            );
        }
        state.messages.push(record.clone());
        Ok(())
    }
}
