//! Background live polling.
//!
//! Runs as a tokio task, checking the head of every configured category on a
//! fixed interval and prepending anything the feed has not seen yet.
//!
//! ## Overlap
//!
//! Each tick is awaited inside the interval loop, so a slow tick delays the
//! next one instead of running alongside it.  Ticks that fall due while one
//! is still running are skipped, not queued.  A tick may still interleave
//! with a paginated load; the load appends at the tail and the poller
//! prepends at the head, so the two never clobber each other.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::FeedResult;
use crate::feed::{lock, SharedState};
use crate::present::Presenter;
use crate::source::{DataSource, Item};

/// How often the poller checks for new items.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

pub struct LivePoller<S, P> {
    source: Arc<S>,
    presenter: Arc<P>,
    state: SharedState,
}

impl<S, P> LivePoller<S, P>
where
    S: DataSource + 'static,
    P: Presenter + 'static,
{
    pub fn new(source: Arc<S>, presenter: Arc<P>, state: SharedState) -> Self {
        Self {
            source,
            presenter,
            state,
        }
    }

    /// Spawn the polling loop on the current runtime.
    ///
    /// The task runs until aborted or until the runtime shuts down.
    pub fn spawn(self, period: Duration) -> JoinHandle<()> {
        tokio::spawn(self.run(period))
    }

    /// Tick forever.  The first tick fires one `period` after the call, so
    /// the initial page load lands before anything is judged new.
    pub async fn run(self, period: Duration) {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }

    /// One freshness check across all categories.
    ///
    /// Either every new item found is applied, or (on any fetch error)
    /// nothing is.  Errors are logged and dropped.
    pub async fn tick(&self) {
        debug!("checking for live updates");
        let fresh = match self.collect_new().await {
            Ok(fresh) => fresh,
            Err(e) => {
                warn!(
                    source = self.source.name(),
                    transport = e.is_transport(),
                    error = %e,
                    "live update check failed"
                );
                return;
            }
        };
        if fresh.is_empty() {
            return;
        }

        let inserted = lock(&self.state).prepend_live(fresh);
        if let Some(head) = inserted.first() {
            info!(count = inserted.len(), head = head.id, "live update");
            self.presenter.notify(head);
        }
    }

    async fn collect_new(&self) -> FeedResult<Vec<Item>> {
        let categories = lock(&self.state).categories.clone();
        let mut fresh: Vec<Item> = Vec::new();

        for category in categories {
            let ids = self.source.fetch_id_list(category).await?;
            let Some(&newest) = ids.first() else {
                continue;
            };

            let known = lock(&self.state).contains(newest) || fresh.iter().any(|i| i.id == newest);
            if known {
                continue;
            }

            debug!(%category, id = newest, "new head item");
            if let Some(item) = self.source.fetch_item(newest).await? {
                fresh.push(item);
            }
        }

        Ok(fresh)
    }
}
