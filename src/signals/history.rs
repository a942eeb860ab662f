//! Append-only log of emitted signals.

use crate::models::Signal;
use tokio::sync::RwLock;

/// Ordered record of every signal the engine has fired, insertion order =
/// chronological order. Two consecutive entries with the same direction
/// and trigger level cannot occur: the engine only emits on a state
/// transition.
#[derive(Debug, Default)]
pub struct SignalHistory {
    entries: RwLock<Vec<Signal>>,
}

impl SignalHistory {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Append one signal. Never rejects, never reorders.
    pub async fn append(&self, signal: Signal) {
        self.entries.write().await.push(signal);
    }

    /// Chronological snapshot of the full log.
    pub async fn all(&self) -> Vec<Signal> {
        self.entries.read().await.clone()
    }

    /// The trailing `limit` entries, oldest first.
    pub async fn recent(&self, limit: usize) -> Vec<Signal> {
        let entries = self.entries.read().await;
        let skip = entries.len().saturating_sub(limit);
        entries[skip..].to_vec()
    }

    /// Most recent signal, or `None` when nothing has fired yet.
    pub async fn latest(&self) -> Option<Signal> {
        self.entries.read().await.last().copied()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Retention hook for an external policy; the scanner itself never
    /// trims. Keeps the newest `max_entries`.
    pub async fn trim(&self, max_entries: usize) {
        let mut entries = self.entries.write().await;
        let excess = entries.len().saturating_sub(max_entries);
        if excess > 0 {
            entries.drain(..excess);
        }
    }
}
