//! Runtime configuration: environment variables plus a few command-line flags.

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::core::clock_seed;
use crate::leaderboard::LeaderboardConfig;

pub const USAGE: &str = "\
usage: classic-tetris [--seed N] [--offline]

  --seed N     piece sequence seed (env TETRIS_SEED)
  --offline    keep the leaderboard in memory for this session
  -h, --help   show this help

environment:
  TETRIS_LOG_PATH                 write logs to this file (RUST_LOG filters, default info)
  TETRIS_LEADERBOARD_URL / _KEY   PostgREST/Supabase endpoint (https:// or http://) and anon key
  TETRIS_LEADERBOARD_TABLE        table name (default scores)
  TETRIS_LEADERBOARD_FILE         JSON file leaderboard when no URL is set
  TETRIS_LEADERBOARD_TIMEOUT_MS   per-request timeout (default 5000)
  TETRIS_LEADERBOARD_DISABLED     1/true turns the leaderboard off";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Fixed seed; `None` derives one from the clock
    pub seed: Option<u32>,
    pub log_path: Option<PathBuf>,
    pub leaderboard: LeaderboardConfig,
    pub help: bool,
}

impl AppConfig {
    pub fn from_env_and_args() -> Result<Self> {
        Self::parse(env::args().skip(1), |name| env::var(name).ok())
    }

    /// Parse `args` (without the program name) over variables from `lookup`.
    /// Flags win over the environment.
    pub fn parse<I>(args: I, lookup: impl Fn(&str) -> Option<String>) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let non_empty = |name: &str| {
            lookup(name)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let mut seed = match non_empty("TETRIS_SEED") {
            Some(raw) => Some(parse_seed(&raw).context("invalid TETRIS_SEED")?),
            None => None,
        };
        let log_path = non_empty("TETRIS_LOG_PATH").map(PathBuf::from);
        let mut leaderboard = LeaderboardConfig::from_lookup(|name| lookup(name));
        let mut help = false;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--seed" => {
                    let Some(raw) = args.next() else {
                        bail!("--seed needs a value");
                    };
                    seed = Some(parse_seed(&raw).context("invalid --seed")?);
                }
                "--offline" => leaderboard.offline = true,
                "-h" | "--help" => help = true,
                other => match other.strip_prefix("--seed=") {
                    Some(raw) => seed = Some(parse_seed(raw).context("invalid --seed")?),
                    None => bail!("unknown argument {other:?}\n\n{USAGE}"),
                },
            }
        }

        Ok(Self {
            seed,
            log_path,
            leaderboard,
            help,
        })
    }

    pub fn seed(&self) -> u32 {
        self.seed.unwrap_or_else(clock_seed)
    }
}

fn parse_seed(raw: &str) -> Result<u32> {
    raw.trim()
        .parse::<u32>()
        .with_context(|| format!("{raw:?} is not a number between 0 and {}", u32::MAX))
}
