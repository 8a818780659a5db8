//! Test utilities
//!
//! In-memory stand-ins for the two seams of the feed logic: a scriptable
//! [`DataSource`] and a [`Presenter`] that records what it was asked to draw.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::Notify;

use crate::error::{FeedError, FeedResult};
use crate::present::Presenter;
use crate::source::{make_item, Category, DataSource, Item, ItemId};

// ============================================================================
// In-Memory Source
// ============================================================================

#[derive(Default)]
pub struct InMemorySource {
    lists: Mutex<HashMap<Category, Vec<ItemId>>>,
    items: Mutex<HashMap<ItemId, Item>>,
    failing_lists: Mutex<HashSet<Category>>,
    failing_items: Mutex<HashSet<ItemId>>,
    list_calls: Mutex<Vec<Category>>,
    item_calls: Mutex<Vec<ItemId>>,
    gate: Option<Arc<Notify>>,
    list_delays: Mutex<VecDeque<Duration>>,
    lists_in_flight: AtomicUsize,
    max_lists_in_flight: AtomicUsize,
}

fn injected_failure(what: String) -> FeedError {
    FeedError::Status {
        url: what,
        status: StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `ids` as the ranked list for `category`, each backed by a
    /// story whose timestamp equals its id.
    pub fn with_stories(self, category: Category, ids: &[ItemId]) -> Self {
        for &id in ids {
            self.put_item(make_item(id, &format!("Story {id}"), id as i64));
        }
        self.set_list(category, ids.to_vec());
        self
    }

    pub fn with_list(self, category: Category, ids: &[ItemId]) -> Self {
        self.set_list(category, ids.to_vec());
        self
    }

    pub fn with_item(self, item: Item) -> Self {
        self.put_item(item);
        self
    }

    pub fn failing_list(self, category: Category) -> Self {
        self.failing_lists.lock().unwrap().insert(category);
        self
    }

    pub fn failing_item(self, id: ItemId) -> Self {
        self.failing_items.lock().unwrap().insert(id);
        self
    }

    /// Every id-list fetch parks until the returned handle is notified.
    pub fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(gate.clone());
        (self, gate)
    }

    /// The next id-list fetches sleep for these durations, one per call.
    pub fn with_slow_lists(self, delays: &[Duration]) -> Self {
        self.list_delays.lock().unwrap().extend(delays);
        self
    }

    pub fn set_list(&self, category: Category, ids: Vec<ItemId>) {
        self.lists.lock().unwrap().insert(category, ids);
    }

    pub fn put_item(&self, item: Item) {
        self.items.lock().unwrap().insert(item.id, item);
    }

    pub fn list_calls(&self) -> Vec<Category> {
        self.list_calls.lock().unwrap().clone()
    }

    pub fn item_calls(&self) -> Vec<ItemId> {
        self.item_calls.lock().unwrap().clone()
    }

    /// Highest number of id-list fetches seen running at once.
    pub fn max_concurrent_lists(&self) -> usize {
        self.max_lists_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataSource for InMemorySource {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn fetch_id_list(&self, category: Category) -> FeedResult<Vec<ItemId>> {
        self.list_calls.lock().unwrap().push(category);
        let running = self.lists_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_lists_in_flight.fetch_max(running, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let delay = self.list_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.lists_in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_lists.lock().unwrap().contains(&category) {
            return Err(injected_failure(category.to_string()));
        }
        Ok(self
            .lists
            .lock()
            .unwrap()
            .get(&category)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_item(&self, id: ItemId) -> FeedResult<Option<Item>> {
        self.item_calls.lock().unwrap().push(id);
        if self.failing_items.lock().unwrap().contains(&id) {
            return Err(injected_failure(format!("item/{id}")));
        }
        Ok(self.items.lock().unwrap().get(&id).cloned())
    }
}

// ============================================================================
// Recording Presenter
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Batch(Vec<ItemId>),
    Detail { item: ItemId, comments: Vec<ItemId> },
    Notify(ItemId),
}

#[derive(Default)]
pub struct RecordingPresenter {
    calls: Mutex<Vec<Rendered>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Rendered> {
        self.calls.lock().unwrap().clone()
    }
}

fn ids(items: &[Item]) -> Vec<ItemId> {
    items.iter().map(|i| i.id).collect()
}

impl Presenter for RecordingPresenter {
    fn render_batch(&self, items: &[Item]) {
        self.calls.lock().unwrap().push(Rendered::Batch(ids(items)));
    }

    fn show_detail(&self, item: &Item, comments: &[Item]) {
        self.calls.lock().unwrap().push(Rendered::Detail {
            item: item.id,
            comments: ids(comments),
        });
    }

    fn notify(&self, item: &Item) {
        self.calls.lock().unwrap().push(Rendered::Notify(item.id));
    }
}
