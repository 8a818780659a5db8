//! The accumulated feed and the paginated load that grows it.
//!
//! [`FeedState`] is the single per-session list of loaded items.  It is
//! shared by `Arc<Mutex<_>>` between [`Feed`] (which appends whole pages)
//! and [`crate::poll::LivePoller`] (which prepends live discoveries).  The
//! lock is only ever held for in-memory bookkeeping, never across a fetch.
//!
//! ## Ordering
//!
//! Each page is sorted newest-first on its own and appended at the tail.
//! Live items go to the head.  Neither path re-sorts history, so the list as
//! a whole is only roughly chronological.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info, warn};

use crate::error::FeedResult;
use crate::present::Presenter;
use crate::source::{sort_newest_first, Category, DataSource, Item, ItemId};

pub type SharedState = Arc<Mutex<FeedState>>;

/// Lock the shared state, ignoring poisoning: every critical section leaves
/// the state consistent before it can panic.
pub fn lock(state: &SharedState) -> MutexGuard<'_, FeedState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
pub struct FeedState {
    /// Every item loaded this session, in merge order.
    pub items: Vec<Item>,
    /// Page offset shared by all categories.
    pub page: usize,
    /// Categories to load and poll, in iteration order.
    pub categories: Vec<Category>,
    /// Set while a paginated load is running.
    pub loading: bool,
    /// Live discoveries, newest first, capped at `live_capacity`.
    pub live_updates: VecDeque<Item>,
    live_capacity: usize,
    /// Fast membership lookup for the live poller.
    seen: HashSet<ItemId>,
}

impl FeedState {
    pub fn new(categories: Vec<Category>, live_capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            page: 0,
            categories,
            loading: false,
            live_updates: VecDeque::with_capacity(live_capacity),
            live_capacity,
            seen: HashSet::new(),
        }
    }

    pub fn into_shared(self) -> SharedState {
        Arc::new(Mutex::new(self))
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.seen.contains(&id)
    }

    /// Append a loaded page and advance the offset.
    ///
    /// No dedup: an id that is already loaded, or that appears in two
    /// categories' windows, is appended again.
    pub fn append_page(&mut self, batch: &[Item]) {
        self.seen.extend(batch.iter().map(|i| i.id));
        self.items.extend_from_slice(batch);
        self.page += 1;
    }

    /// Prepend live discoveries, in the order given, to both the list and
    /// the live buffer.  Ids that are already loaded are dropped.
    ///
    /// Returns what was actually inserted.
    pub fn prepend_live(&mut self, fresh: Vec<Item>) -> Vec<Item> {
        let mut inserted = Vec::with_capacity(fresh.len());
        for item in fresh {
            if self.seen.insert(item.id) {
                inserted.push(item);
            }
        }

        for item in inserted.iter().rev() {
            self.live_updates.push_front(item.clone());
        }
        self.live_updates.truncate(self.live_capacity);
        self.items.splice(0..0, inserted.iter().cloned());

        inserted
    }
}

/// Holds the in-flight flag for as long as it lives.  Dropping it clears
/// the flag on every exit path, including a cancelled task.
struct LoadingGuard<'a> {
    state: &'a SharedState,
}

impl<'a> LoadingGuard<'a> {
    fn acquire(state: &'a SharedState) -> Option<Self> {
        let mut s = lock(state);
        if s.loading {
            return None;
        }
        s.loading = true;
        Some(Self { state })
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        lock(self.state).loading = false;
    }
}

/// The ids of `page` when `ids` is cut into pages of `page_size`.
/// Pages past the end are empty.
pub fn page_window(ids: &[ItemId], page: usize, page_size: usize) -> &[ItemId] {
    let start = page.saturating_mul(page_size).min(ids.len());
    let end = start.saturating_add(page_size).min(ids.len());
    &ids[start..end]
}

/// Paginated loading and drill-down over the shared [`FeedState`].
pub struct Feed<S, P> {
    source: Arc<S>,
    presenter: Arc<P>,
    state: SharedState,
    page_size: usize,
}

// Manual impl: cloning only bumps reference counts, so `S` and `P` need not
// be `Clone` themselves.
impl<S, P> Clone for Feed<S, P> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            presenter: Arc::clone(&self.presenter),
            state: Arc::clone(&self.state),
            page_size: self.page_size,
        }
    }
}

impl<S: DataSource, P: Presenter> Feed<S, P> {
    pub fn new(source: Arc<S>, presenter: Arc<P>, state: SharedState, page_size: usize) -> Self {
        Self {
            source,
            presenter,
            state,
            page_size,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// Load the next page of every category and append it.
    ///
    /// Does nothing if a load is already running.  A failure anywhere leaves
    /// the list and the offset untouched; it is logged and dropped.
    pub async fn load_next_page(&self) {
        let Some(guard) = LoadingGuard::acquire(&self.state) else {
            debug!("page load already in flight, ignoring request");
            return;
        };

        let (page, categories) = {
            let s = lock(&self.state);
            (s.page, s.categories.clone())
        };

        match self.fetch_page(page, &categories).await {
            Ok(batch) => {
                lock(&self.state).append_page(&batch);
                drop(guard);
                info!(page, count = batch.len(), "page loaded");
                self.presenter.render_batch(&batch);
            }
            Err(e) => error!(
                page,
                source = self.source.name(),
                transport = e.is_transport(),
                error = %e,
                "page load failed"
            ),
        }
    }

    async fn fetch_page(&self, page: usize, categories: &[Category]) -> FeedResult<Vec<Item>> {
        let mut batch = Vec::new();
        for &category in categories {
            let ids = self.source.fetch_id_list(category).await?;
            let window = page_window(&ids, page, self.page_size);
            debug!(%category, page, count = window.len(), "fetching page window");

            let items = self.source.fetch_items(window).await?;
            batch.extend(items.into_iter().flatten());
        }
        sort_newest_first(&mut batch);
        Ok(batch)
    }

    /// Fetch `item`'s comments and open its detail view.
    pub async fn open_detail(&self, item: &Item) {
        match self.fetch_comments(item).await {
            Ok(comments) => self.presenter.show_detail(item, &comments),
            Err(e) => warn!(id = item.id, error = %e, "could not load comments"),
        }
    }

    async fn fetch_comments(&self, item: &Item) -> FeedResult<Vec<Item>> {
        if item.kids.is_empty() {
            return Ok(Vec::new());
        }
        let mut comments: Vec<Item> = self
            .source
            .fetch_items(&item.kids)
            .await?
            .into_iter()
            .flatten()
            .collect();
        sort_newest_first(&mut comments);
        Ok(comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::make_item;
    use crate::test_utils::{InMemorySource, RecordingPresenter, Rendered};

    fn feed_over(
        source: InMemorySource,
        categories: &[Category],
        page_size: usize,
    ) -> (Feed<InMemorySource, RecordingPresenter>, Arc<InMemorySource>, Arc<RecordingPresenter>) {
        let source = Arc::new(source);
        let presenter = Arc::new(RecordingPresenter::new());
        let state = FeedState::new(categories.to_vec(), 50).into_shared();
        let feed = Feed::new(source.clone(), presenter.clone(), state, page_size);
        (feed, source, presenter)
    }

    fn loaded_ids(feed: &Feed<InMemorySource, RecordingPresenter>) -> Vec<ItemId> {
        lock(feed.state()).items.iter().map(|i| i.id).collect()
    }

    // -- page_window ---------------------------------------------------------

    #[test]
    fn page_window_slices_and_clamps() {
        let ids: Vec<ItemId> = (0..25).collect();
        assert_eq!(page_window(&ids, 0, 10), &ids[0..10]);
        assert_eq!(page_window(&ids, 2, 10), &ids[20..25]);
        assert!(page_window(&ids, 3, 10).is_empty());
        assert!(page_window(&[], 0, 10).is_empty());
    }

    // -- FeedState -----------------------------------------------------------

    #[test]
    fn prepend_live_skips_known_ids_and_caps_buffer() {
        let mut state = FeedState::new(vec![Category::Top], 2);
        state.append_page(&[make_item(1, "Loaded", 10)]);

        let inserted = state.prepend_live(vec![
            make_item(4, "A", 40),
            make_item(1, "Dup", 10),
            make_item(3, "B", 30),
            make_item(2, "C", 20),
        ]);

        assert_eq!(inserted.iter().map(|i| i.id).collect::<Vec<_>>(), vec![4, 3, 2]);
        let ids: Vec<_> = state.items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![4, 3, 2, 1]);
        let live: Vec<_> = state.live_updates.iter().map(|i| i.id).collect();
        assert_eq!(live, vec![4, 3], "buffer keeps the newest entries");
    }

    // -- load_next_page ------------------------------------------------------

    #[tokio::test]
    async fn first_load_takes_first_window_sorted_newest_first() {
        // Timestamps deliberately disagree with rank order.
        let ids: Vec<ItemId> = (100..125).collect();
        let mut source = InMemorySource::new().with_list(Category::Top, &ids);
        for (rank, &id) in ids.iter().enumerate() {
            source = source.with_item(make_item(id, "s", (rank as i64 * 7) % 11));
        }
        let (feed, source, presenter) = feed_over(source, &[Category::Top], 10);

        feed.load_next_page().await;

        let state = lock(feed.state());
        assert_eq!(state.page, 1);
        assert_eq!(state.items.len(), 10);
        assert!(!state.loading);
        assert!(state.items.windows(2).all(|w| w[0].time >= w[1].time));

        let mut fetched = source.item_calls();
        fetched.sort_unstable();
        assert_eq!(fetched, ids[0..10].to_vec());

        let expected: Vec<ItemId> = state.items.iter().map(|i| i.id).collect();
        assert_eq!(presenter.calls(), vec![Rendered::Batch(expected)]);
    }

    #[tokio::test]
    async fn nth_load_fetches_nth_window_of_each_category() {
        let source = InMemorySource::new()
            .with_stories(Category::Top, &(1..=30).collect::<Vec<_>>())
            .with_stories(Category::Job, &(101..=130).collect::<Vec<_>>());
        let (feed, source, _) = feed_over(source, &[Category::Top, Category::Job], 10);

        feed.load_next_page().await;
        feed.load_next_page().await;

        let mut second: Vec<ItemId> = source.item_calls()[20..].to_vec();
        second.sort_unstable();
        let expected: Vec<ItemId> = (11..=20).chain(111..=120).collect();
        assert_eq!(second, expected);
        assert_eq!(lock(feed.state()).page, 2);
    }

    #[tokio::test]
    async fn each_load_grows_by_categories_times_page_size() {
        let source = InMemorySource::new()
            .with_stories(Category::Top, &(1..=40).collect::<Vec<_>>())
            .with_stories(Category::Job, &(101..=140).collect::<Vec<_>>())
            .with_stories(Category::New, &(201..=240).collect::<Vec<_>>());
        let (feed, _, _) = feed_over(source, &Category::DEFAULT, 5);

        for n in 1..=3 {
            feed.load_next_page().await;
            assert_eq!(lock(feed.state()).items.len(), n * 15);
        }
    }

    #[tokio::test]
    async fn batch_is_appended_after_existing_items() {
        let source = InMemorySource::new().with_stories(Category::Top, &[1, 2, 3, 4]);
        let (feed, _, _) = feed_over(source, &[Category::Top], 2);

        feed.load_next_page().await;
        feed.load_next_page().await;

        // Each page sorted on its own; history is not re-sorted.
        assert_eq!(loaded_ids(&feed), vec![2, 1, 4, 3]);
    }

    #[tokio::test]
    async fn category_shared_item_is_not_deduplicated() {
        let source = InMemorySource::new()
            .with_stories(Category::Top, &[1, 2])
            .with_stories(Category::New, &[2, 3]);
        let (feed, _, _) = feed_over(source, &[Category::Top, Category::New], 2);

        feed.load_next_page().await;

        assert_eq!(loaded_ids(&feed), vec![3, 2, 2, 1]);
    }

    #[tokio::test]
    async fn null_records_are_left_out_of_the_batch() {
        let source = InMemorySource::new()
            .with_stories(Category::Top, &[1, 3])
            .with_list(Category::Top, &[1, 2, 3]);
        let (feed, _, presenter) = feed_over(source, &[Category::Top], 10);

        feed.load_next_page().await;

        assert_eq!(loaded_ids(&feed), vec![3, 1]);
        assert_eq!(presenter.calls(), vec![Rendered::Batch(vec![3, 1])]);
    }

    #[tokio::test]
    async fn load_while_in_flight_is_a_noop() {
        let source = InMemorySource::new().with_stories(Category::Top, &[1, 2, 3]);
        let (feed, source, presenter) = feed_over(source, &[Category::Top], 10);
        lock(feed.state()).loading = true;

        feed.load_next_page().await;

        let state = lock(feed.state());
        assert!(state.items.is_empty());
        assert_eq!(state.page, 0);
        assert!(source.list_calls().is_empty());
        assert!(presenter.calls().is_empty());
    }

    #[tokio::test]
    async fn concurrent_second_load_is_ignored() {
        let (source, gate) = InMemorySource::new()
            .with_stories(Category::Top, &[1, 2, 3])
            .gated();
        let (feed, source, _) = feed_over(source, &[Category::Top], 10);

        tokio::join!(feed.load_next_page(), async {
            // The first load is parked inside its id-list fetch.
            feed.load_next_page().await;
            assert_eq!(source.list_calls().len(), 1);
            gate.notify_one();
        });

        let state = lock(feed.state());
        assert_eq!(state.page, 1);
        assert_eq!(state.items.len(), 3);
        assert_eq!(source.list_calls().len(), 1);
    }

    #[tokio::test]
    async fn failure_leaves_state_untouched_and_clears_guard() {
        let source = InMemorySource::new()
            .with_stories(Category::Top, &[1, 2])
            .with_stories(Category::New, &[3, 4])
            .failing_item(4);
        let (feed, source, presenter) = feed_over(source, &[Category::Top, Category::New], 10);

        feed.load_next_page().await;

        {
            let state = lock(feed.state());
            assert!(state.items.is_empty());
            assert_eq!(state.page, 0);
            assert!(!state.loading);
        }
        assert!(presenter.calls().is_empty());

        // Later loads still run.
        source.set_list(Category::New, vec![3]);
        feed.load_next_page().await;
        assert_eq!(loaded_ids(&feed), vec![3, 2, 1]);
        assert_eq!(lock(feed.state()).page, 1);
    }

    #[tokio::test]
    async fn id_list_failure_aborts_before_later_categories() {
        let source = InMemorySource::new()
            .with_stories(Category::Job, &[5])
            .failing_list(Category::Top);
        let (feed, source, _) = feed_over(source, &[Category::Top, Category::Job], 10);

        feed.load_next_page().await;

        assert_eq!(source.list_calls(), vec![Category::Top]);
        assert!(loaded_ids(&feed).is_empty());
    }

    // -- open_detail ---------------------------------------------------------

    #[tokio::test]
    async fn detail_shows_comments_newest_first_without_nulls() {
        let mut story = make_item(1, "Story", 100);
        story.kids = vec![10, 11, 12];
        let source = InMemorySource::new()
            .with_item(make_item(10, "", 150))
            .with_item(make_item(12, "", 180));
        let (feed, _, presenter) = feed_over(source, &[Category::Top], 10);

        feed.open_detail(&story).await;

        assert_eq!(
            presenter.calls(),
            vec![Rendered::Detail {
                item: 1,
                comments: vec![12, 10]
            }]
        );
    }

    #[tokio::test]
    async fn detail_without_kids_fetches_nothing() {
        let (feed, source, presenter) = feed_over(InMemorySource::new(), &[Category::Top], 10);

        feed.open_detail(&make_item(1, "Story", 100)).await;

        assert!(source.item_calls().is_empty());
        assert_eq!(
            presenter.calls(),
            vec![Rendered::Detail {
                item: 1,
                comments: vec![]
            }]
        );
    }

    #[tokio::test]
    async fn detail_failure_is_swallowed() {
        let mut story = make_item(1, "Story", 100);
        story.kids = vec![10];
        let (feed, _, presenter) =
            feed_over(InMemorySource::new().failing_item(10), &[Category::Top], 10);

        feed.open_detail(&story).await;

        assert!(presenter.calls().is_empty());
    }
}
