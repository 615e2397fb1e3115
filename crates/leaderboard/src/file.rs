//! JSON file store for an offline, persistent leaderboard.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::entry::{top_n, ScoreEntry};
use crate::store::ScoreStore;

/// Scores kept as a JSON array in a single file.
///
/// A missing file is an empty leaderboard. Writes go through a temporary file
/// and a rename so a crash never leaves a truncated list.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<ScoreEntry>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", self.path.display()))
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&bytes)
            .with_context(|| format!("{} is not a score list", self.path.display()))
    }

    async fn save(&self, entries: &[ScoreEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }

        let json = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

impl ScoreStore for FileStore {
    async fn submit(&self, entry: ScoreEntry) -> Result<()> {
        let mut entries = self.load().await?;
        entries.push(entry);
        self.save(&entries).await
    }

    async fn fetch_top(&self, limit: usize) -> Result<Vec<ScoreEntry>> {
        Ok(top_n(self.load().await?, limit))
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}
