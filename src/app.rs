use std::time::{Duration, Instant};

use ratatui::widgets::ListState;

use crate::present::UiEvent;
use crate::source::Item;

/// The open detail view.
pub struct Detail {
    pub item: Item,
    /// Newest first.
    pub comments: Vec<Item>,
    /// Line offset into the rendered view.
    pub scroll: u16,
}

/// A transient live-update banner.
pub struct Notification {
    pub text: String,
    pub expires_at: Instant,
}

/// Work a key press asks of the async side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    LoadMore,
    OpenDetail(Item),
}

pub struct App {
    /// Summary rows, built only from deltas the feed logic hands over.
    pub rows: Vec<Item>,
    /// List selection state for scrolling.
    pub list_state: ListState,
    pub detail: Option<Detail>,
    pub notification: Option<Notification>,
    /// How long a banner stays up.
    notify_for: Duration,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Last status message.
    pub status: String,
}

impl App {
    pub fn new(notify_for: Duration) -> Self {
        Self {
            rows: Vec::new(),
            list_state: ListState::default(),
            detail: None,
            notification: None,
            notify_for,
            quit: false,
            status: "Loading…".into(),
        }
    }

    /// Apply one event from the presenter channel.
    pub fn apply(&mut self, event: UiEvent, now: Instant) {
        match event {
            UiEvent::Batch(items) => self.append_batch(items),
            UiEvent::Live(item) => self.push_live(item, now),
            UiEvent::Detail { item, comments } => self.open_detail(item, comments),
        }
    }

    pub fn append_batch(&mut self, items: Vec<Item>) {
        self.status = format!("Loaded {} items", items.len());
        self.rows.extend(items);
        if self.list_state.selected().is_none() && !self.rows.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    /// Prepend a live item and raise the banner.  The selection is shifted so
    /// it stays on the same row.
    pub fn push_live(&mut self, item: Item, now: Instant) {
        self.notification = Some(Notification {
            text: format!("New story: {}", item.display_title()),
            expires_at: now + self.notify_for,
        });
        self.rows.insert(0, item);
        if let Some(i) = self.list_state.selected() {
            self.list_state.select(Some(i + 1));
        }
    }

    pub fn open_detail(&mut self, item: Item, comments: Vec<Item>) {
        self.detail = Some(Detail {
            item,
            comments,
            scroll: 0,
        });
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    /// Hide the banner once its time is up.
    pub fn expire_notification(&mut self, now: Instant) {
        if self
            .notification
            .as_ref()
            .is_some_and(|n| now >= n.expires_at)
        {
            self.notification = None;
        }
    }

    pub fn selected_item(&self) -> Option<&Item> {
        self.list_state.selected().and_then(|i| self.rows.get(i))
    }

    /// The action for "open": fetch comments for the selected row.
    pub fn open_selected(&self) -> Option<Action> {
        self.selected_item().cloned().map(Action::OpenDetail)
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        if let Some(detail) = &mut self.detail {
            detail.scroll = detail.scroll.saturating_add(1);
            return;
        }
        if self.rows.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(self.rows.len() - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if let Some(detail) = &mut self.detail {
            detail.scroll = detail.scroll.saturating_sub(1);
            return;
        }
        if self.rows.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if let Some(detail) = &mut self.detail {
            detail.scroll = 0;
        } else if !self.rows.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if self.detail.is_none() && !self.rows.is_empty() {
            self.list_state.select(Some(self.rows.len() - 1));
        }
    }
}
