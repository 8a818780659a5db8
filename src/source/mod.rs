//! Data source abstraction layer.
//!
//! This module defines the [`DataSource`] trait and the common [`Item`]
//! type.  The only concrete implementation is [`HackerNewsSource`], which
//! talks to the public Firebase-backed API.
//!
//! ## For contributors — adding a new source
//!
//! 1. Create a new file in this directory (e.g. `lobsters.rs`).
//! 2. Define a struct and implement [`DataSource`] for it.  Only the two
//!    single-request methods are required; batching comes for free.
//! 3. Add `mod lobsters;` below and re-export your struct.
//! 4. Construct it in `main.rs` instead of `HackerNewsSource`.
//!
//! The feed accumulator, live poller and UI are all source-agnostic.

mod category;
mod hacker_news;
mod item;

pub use category::Category;
pub use hacker_news::{HackerNewsSource, DEFAULT_BASE_URL};
pub use item::{sort_newest_first, Item, ItemId};

#[cfg(test)]
pub(crate) use item::make_item;

use async_trait::async_trait;
use futures::future::join_all;

use crate::error::FeedResult;

/// Trait that every data source must implement.
///
/// The feed accumulator and the live poller share one source and call it
/// from spawned tasks, so implementations must be [`Send`] + [`Sync`].
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Label used in log lines.
    fn name(&self) -> &str;

    /// The full ranked ID list for `category`.
    ///
    /// A payload that is not a list of IDs yields an empty list rather than
    /// an error.
    async fn fetch_id_list(&self, category: Category) -> FeedResult<Vec<ItemId>>;

    /// One item record.  `Ok(None)` means the source has no record for this
    /// ID (deleted or not yet visible), which callers skip silently.
    async fn fetch_item(&self, id: ItemId) -> FeedResult<Option<Item>>;

    /// Fetch every ID concurrently and wait for all of them.
    ///
    /// The result is aligned with `ids`.  If any single fetch failed the
    /// whole batch fails, but only after every request has settled.
    async fn fetch_items(&self, ids: &[ItemId]) -> FeedResult<Vec<Option<Item>>> {
        join_all(ids.iter().map(|&id| self.fetch_item(id)))
            .await
            .into_iter()
            .collect()
    }
}
