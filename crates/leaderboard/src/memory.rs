//! In-process store, used for offline play and tests.

use std::sync::Arc;

use anyhow::{bail, Result};
use tokio::sync::Mutex;

use crate::entry::{top_n, ScoreEntry};
use crate::store::ScoreStore;

#[derive(Debug, Default)]
struct Inner {
    entries: Vec<ScoreEntry>,
    failure: Option<String>,
}

/// Scores kept in memory for the lifetime of the process.
///
/// Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<ScoreEntry>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                entries,
                failure: None,
            })),
        }
    }

    /// Make every subsequent call fail with `message` (`None` restores normal operation).
    pub async fn set_failure(&self, message: Option<&str>) {
        self.inner.lock().await.failure = message.map(str::to_string);
    }

    pub async fn entries(&self) -> Vec<ScoreEntry> {
        self.inner.lock().await.entries.clone()
    }
}

impl ScoreStore for MemoryStore {
    async fn submit(&self, entry: ScoreEntry) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if let Some(msg) = &inner.failure {
            bail!("{msg}");
        }
        inner.entries.push(entry);
        Ok(())
    }

    async fn fetch_top(&self, limit: usize) -> Result<Vec<ScoreEntry>> {
        let inner = self.inner.lock().await;
        if let Some(msg) = &inner.failure {
            bail!("{msg}");
        }
        Ok(top_n(inner.entries.clone(), limit))
    }

    fn describe(&self) -> String {
        "offline (memory)".to_string()
    }
}
