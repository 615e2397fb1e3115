//! Leaderboard runtime integration.
//!
//! Bridges the sync game loop with the async score stores: requests go to a worker
//! task on a private tokio runtime, and results come back as events the loop
//! polls with [`Leaderboard::try_recv`]. Nothing here ever blocks a frame.

use std::fmt;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use log::{info, warn};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::config::{LeaderboardConfig, StoreConfig};
use crate::entry::{sort_by_score, ScoreEntry};
use crate::file::FileStore;
use crate::memory::MemoryStore;
use crate::names::validate_player_name;
use crate::rest::RestStore;
use crate::store::ScoreStore;
use crate::types::LEADERBOARD_TOP_N;

/// Result of a leaderboard request, delivered to the game loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaderboardEvent {
    Submitted(ScoreEntry),
    SubmitFailed(String),
    /// Top scores, highest first
    Fetched(Vec<ScoreEntry>),
    FetchFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaderboardStatus {
    /// Worker running against the described store
    Ready(String),
    /// Leaderboard off; the game is still playable
    Unavailable(String),
}

impl fmt::Display for LeaderboardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeaderboardStatus::Ready(store) => write!(f, "leaderboard: {store}"),
            LeaderboardStatus::Unavailable(reason) => write!(f, "leaderboard unavailable: {reason}"),
        }
    }
}

#[derive(Debug)]
enum Request {
    Submit(ScoreEntry),
    Refresh { limit: usize },
}

struct Worker {
    rt: Runtime,
    req_tx: mpsc::UnboundedSender<Request>,
    event_rx: mpsc::UnboundedReceiver<LeaderboardEvent>,
}

/// Running leaderboard instance.
pub struct Leaderboard {
    worker: Option<Worker>,
    status: LeaderboardStatus,
}

impl Leaderboard {
    /// Start from environment variables.
    pub fn start_from_env() -> Self {
        Self::start_from_config(&LeaderboardConfig::from_env())
    }

    pub fn start_from_config(config: &LeaderboardConfig) -> Self {
        let store = match config.resolve() {
            Ok(store) => store,
            Err(reason) => {
                info!("leaderboard unavailable: {reason}");
                return Self::unavailable(reason);
            }
        };

        match store {
            StoreConfig::Rest { url, key, table } => match RestStore::new(&url, &key, &table) {
                Ok(store) => Self::start(store, config.timeout),
                Err(e) => {
                    warn!("leaderboard misconfigured: {e:#}");
                    Self::unavailable(format!("{e:#}"))
                }
            },
            StoreConfig::File { path } => Self::start(FileStore::new(path), config.timeout),
            StoreConfig::Memory => Self::start(MemoryStore::new(), config.timeout),
        }
    }

    /// Start a worker for `store`. Every request is bounded by `timeout`.
    pub fn start<S: ScoreStore + 'static>(store: S, timeout: Duration) -> Self {
        let rt = match Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                warn!("failed to start leaderboard runtime: {e}");
                return Self::unavailable(format!("runtime failed to start: {e}"));
            }
        };

        let description = store.describe();
        let (req_tx, req_rx) = mpsc::unbounded_channel::<Request>();
        let (event_tx, event_rx) = mpsc::unbounded_channel::<LeaderboardEvent>();
        rt.spawn(run_worker(store, timeout, req_rx, event_tx));
        info!("leaderboard started ({description})");

        Self {
            worker: Some(Worker {
                rt,
                req_tx,
                event_rx,
            }),
            status: LeaderboardStatus::Ready(description),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            worker: None,
            status: LeaderboardStatus::Unavailable(reason.into()),
        }
    }

    pub fn status(&self) -> &LeaderboardStatus {
        &self.status
    }

    pub fn is_available(&self) -> bool {
        self.worker.is_some()
    }

    /// Validate the name and queue a submission.
    ///
    /// Fails without touching the store when the name is blank or the
    /// leaderboard is unavailable.
    pub fn submit(&self, name: &str, score: u32, level: u32, lines: u32) -> Result<()> {
        let name = validate_player_name(name)?;
        let worker = self.worker()?;
        worker
            .req_tx
            .send(Request::Submit(ScoreEntry::new(name, score, level, lines)))
            .map_err(|_| anyhow!("leaderboard worker stopped"))
    }

    /// Queue a fetch of the top scores.
    pub fn refresh(&self) -> Result<()> {
        let worker = self.worker()?;
        worker
            .req_tx
            .send(Request::Refresh {
                limit: LEADERBOARD_TOP_N,
            })
            .map_err(|_| anyhow!("leaderboard worker stopped"))
    }

    pub fn try_recv(&mut self) -> Option<LeaderboardEvent> {
        self.worker.as_mut()?.event_rx.try_recv().ok()
    }

    /// Block until the next event or `timeout`. For shutdown paths and tests; the
    /// game loop uses [`Self::try_recv`].
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<LeaderboardEvent> {
        let worker = self.worker.as_mut()?;
        let rx = &mut worker.event_rx;
        worker
            .rt
            .block_on(async { tokio::time::timeout(timeout, rx.recv()).await })
            .ok()
            .flatten()
    }

    fn worker(&self) -> Result<&Worker> {
        match &self.worker {
            Some(worker) => Ok(worker),
            None => match &self.status {
                LeaderboardStatus::Unavailable(reason) => bail!("leaderboard unavailable: {reason}"),
                LeaderboardStatus::Ready(_) => bail!("leaderboard worker stopped"),
            },
        }
    }
}

/// Process requests one at a time, in arrival order, so a refresh queued after a
/// submit sees the new score.
async fn run_worker<S: ScoreStore>(
    store: S,
    timeout: Duration,
    mut req_rx: mpsc::UnboundedReceiver<Request>,
    event_tx: mpsc::UnboundedSender<LeaderboardEvent>,
) {
    while let Some(req) = req_rx.recv().await {
        let event = match req {
            Request::Submit(entry) => {
                match tokio::time::timeout(timeout, store.submit(entry.clone())).await {
                    Ok(Ok(())) => {
                        info!("score submitted: {} {}", entry.name, entry.score);
                        LeaderboardEvent::Submitted(entry)
                    }
                    Ok(Err(e)) => {
                        warn!("score submission failed: {e:#}");
                        LeaderboardEvent::SubmitFailed(format!("{e:#}"))
                    }
                    Err(_) => {
                        warn!("score submission timed out");
                        LeaderboardEvent::SubmitFailed(timeout_message(timeout))
                    }
                }
            }
            Request::Refresh { limit } => {
                match tokio::time::timeout(timeout, store.fetch_top(limit)).await {
                    Ok(Ok(mut entries)) => {
                        sort_by_score(&mut entries);
                        entries.truncate(limit);
                        LeaderboardEvent::Fetched(entries)
                    }
                    Ok(Err(e)) => {
                        warn!("leaderboard fetch failed: {e:#}");
                        LeaderboardEvent::FetchFailed(format!("{e:#}"))
                    }
                    Err(_) => {
                        warn!("leaderboard fetch timed out");
                        LeaderboardEvent::FetchFailed(timeout_message(timeout))
                    }
                }
            }
        };

        if event_tx.send(event).is_err() {
            break;
        }
    }
}

fn timeout_message(timeout: Duration) -> String {
    format!("request timed out after {}ms", timeout.as_millis())
}
