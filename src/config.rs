//! Command-line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::poll::DEFAULT_POLL_INTERVAL;
use crate::source::{Category, DEFAULT_BASE_URL};

/// Page through Hacker News and watch for new stories.
#[derive(Debug, Clone, Parser)]
#[command(name = "hn-live", version, about)]
pub struct Config {
    /// API root serving `/{category}.json` and `/item/{id}.json`.
    #[arg(long, env = "HN_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Items taken from each category per "load more".
    #[arg(
        long,
        env = "HN_PAGE_SIZE",
        default_value_t = 10,
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub page_size: u16,

    /// Categories to load and poll, in order.
    #[arg(
        long,
        env = "HN_CATEGORIES",
        value_delimiter = ',',
        default_values_t = Category::DEFAULT
    )]
    pub categories: Vec<Category>,

    /// Seconds between live update checks.
    #[arg(
        long,
        env = "HN_POLL_INTERVAL",
        default_value_t = DEFAULT_POLL_INTERVAL.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub poll_interval: u64,

    /// Seconds a live update banner stays on screen.
    #[arg(long, env = "HN_NOTIFY_SECS", default_value_t = 3)]
    pub notify_secs: u64,

    /// How many live discoveries to remember.
    #[arg(long, env = "HN_LIVE_BUFFER", default_value_t = 50)]
    pub live_buffer: usize,

    /// Write logs here.  Without it logs are discarded, since the terminal
    /// belongs to the UI.
    #[arg(long, env = "HN_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn page_size(&self) -> usize {
        usize::from(self.page_size)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }

    pub fn notify_duration(&self) -> Duration {
        Duration::from_secs(self.notify_secs)
    }
}
