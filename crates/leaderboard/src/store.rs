//! Score store abstraction.

use std::future::Future;

use anyhow::Result;

use crate::entry::ScoreEntry;

/// External persistence for scores.
///
/// Stores are trust-on-write: callers validate names before submitting, and no
/// authentication beyond what the backend requires is attempted.
pub trait ScoreStore: Send + Sync {
    /// Persist one score.
    fn submit(&self, entry: ScoreEntry) -> impl Future<Output = Result<()>> + Send;

    /// Best `limit` scores, highest first.
    fn fetch_top(&self, limit: usize) -> impl Future<Output = Result<Vec<ScoreEntry>>> + Send;

    /// Short human-readable description for logs and the status line.
    fn describe(&self) -> String;
}
