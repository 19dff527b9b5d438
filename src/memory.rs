//! Short-term conversational memory, keyed by sender.
//!
//! Two holders live here: the `HistoryLedger` (ordered turns per sender,
//! read through a sliding window at prompt-build time) and the `DayTracker`
//! (last calendar day a sender was heard from, driving the fresh-greeting
//! prefix). Both are process-lifetime state owned by the orchestrator
//! instance and capped by sender count; the least recently active sender is
//! evicted when the cap is exceeded.

use std::collections::HashMap;

use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::llm::ChatMessage;

/// Default cap on distinct senders tracked per holder.
pub const DEFAULT_MAX_SENDERS: usize = 1024;

struct HistoryEntry {
    turns: Vec<ChatMessage>,
    last_used: u64,
}

struct LedgerInner {
    entries: HashMap<String, HistoryEntry>,
    tick: u64,
}

/// Per-sender ordered log of prior conversation turns.
///
/// Storage grows with the conversation; readers only ever take the most
/// recent `n` turns. Entries are created lazily on first append.
pub struct HistoryLedger {
    inner: Mutex<LedgerInner>,
    max_senders: usize,
}

impl HistoryLedger {
    pub fn new(max_senders: usize) -> Self {
        Self {
            inner: Mutex::new(LedgerInner {
                entries: HashMap::new(),
                tick: 0,
            }),
            max_senders: max_senders.max(1),
        }
    }

    /// Clone the last `n` turns for a sender; empty when unseen.
    pub async fn recent(&self, sender: &str, n: usize) -> Vec<ChatMessage> {
        let mut inner = self.inner.lock().await;
        inner.tick += 1;
        let tick = inner.tick;
        match inner.entries.get_mut(sender) {
            Some(entry) => {
                entry.last_used = tick;
                let start = entry.turns.len().saturating_sub(n);
                entry.turns[start..].to_vec()
            }
            None => Vec::new(),
        }
    }

    /// Append one user/assistant exchange to a sender's history.
    pub async fn append_exchange(&self, sender: &str, user: ChatMessage, assistant: ChatMessage) {
        let mut inner = self.inner.lock().await;
        inner.tick += 1;
        let tick = inner.tick;
        let entry = inner
            .entries
            .entry(sender.to_string())
            .or_insert_with(|| HistoryEntry {
                turns: Vec::new(),
                last_used: tick,
            });
        entry.last_used = tick;
        entry.turns.push(user);
        entry.turns.push(assistant);

        if inner.entries.len() > self.max_senders {
            evict_least_recent(&mut inner.entries, |e| e.last_used);
        }
    }

    /// Number of stored turns for a sender.
    pub async fn len(&self, sender: &str) -> usize {
        let inner = self.inner.lock().await;
        inner.entries.get(sender).map_or(0, |e| e.turns.len())
    }

    /// Number of distinct senders currently tracked.
    pub async fn sender_count(&self) -> usize {
        self.inner.lock().await.entries.len()
    }
}

struct DayEntry {
    day: NaiveDate,
    last_used: u64,
}

struct TrackerInner {
    entries: HashMap<String, DayEntry>,
    tick: u64,
}

/// Last calendar day each sender was heard from.
pub struct DayTracker {
    inner: Mutex<TrackerInner>,
    max_senders: usize,
}

impl DayTracker {
    pub fn new(max_senders: usize) -> Self {
        Self {
            inner: Mutex::new(TrackerInner {
                entries: HashMap::new(),
                tick: 0,
            }),
            max_senders: max_senders.max(1),
        }
    }

    /// Record that `sender` was heard from on `today`.
    ///
    /// Returns true when this is the sender's first message of that day
    /// (stored day differs, or sender was never seen). The stored marker is
    /// updated unconditionally; callers invoke this before any other
    /// processing so a failure later in the handler never leaves it stale.
    pub async fn mark(&self, sender: &str, today: NaiveDate) -> bool {
        let mut inner = self.inner.lock().await;
        inner.tick += 1;
        let tick = inner.tick;

        let is_new = match inner.entries.get_mut(sender) {
            Some(entry) => {
                let changed = entry.day != today;
                entry.day = today;
                entry.last_used = tick;
                changed
            }
            None => {
                inner.entries.insert(
                    sender.to_string(),
                    DayEntry {
                        day: today,
                        last_used: tick,
                    },
                );
                true
            }
        };

        if inner.entries.len() > self.max_senders {
            evict_least_recent(&mut inner.entries, |e| e.last_used);
        }

        is_new
    }
}

fn evict_least_recent<V>(entries: &mut HashMap<String, V>, last_used: impl Fn(&V) -> u64) {
    let oldest = entries
        .iter()
        .min_by_key(|(_, v)| last_used(v))
        .map(|(k, _)| k.clone());
    if let Some(key) = oldest {
        tracing::debug!(sender = %key, "Evicting least recently active sender");
        entries.remove(&key);
    }
}
