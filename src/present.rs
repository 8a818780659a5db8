//! The seam between the feed logic and whatever draws it.
//!
//! The accumulator and the live poller never touch the terminal.  They hand
//! deltas to a [`Presenter`]; in the running app that is a
//! [`ChannelPresenter`] whose events the UI thread drains every frame.

use std::sync::mpsc;

use crate::source::Item;

/// Rendering capability handed to the feed logic.
pub trait Presenter: Send + Sync {
    /// A page load finished; append these rows.
    fn render_batch(&self, items: &[Item]);

    /// Open the detail view for `item` with its comments, newest first.
    fn show_detail(&self, item: &Item, comments: &[Item]);

    /// The live poller found `item`; prepend it and announce it.
    fn notify(&self, item: &Item);
}

/// Messages sent from the async side to the UI thread.
#[derive(Debug)]
pub enum UiEvent {
    Batch(Vec<Item>),
    Detail { item: Item, comments: Vec<Item> },
    Live(Item),
}

pub struct ChannelPresenter {
    tx: mpsc::Sender<UiEvent>,
}

impl ChannelPresenter {
    /// Returns the presenter and the receiver the main loop should drain on
    /// every tick.
    pub fn new() -> (Self, mpsc::Receiver<UiEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: UiEvent) {
        // If the receiver is gone the UI has exited; drop the event.
        let _ = self.tx.send(event);
    }
}

impl Presenter for ChannelPresenter {
    fn render_batch(&self, items: &[Item]) {
        self.send(UiEvent::Batch(items.to_vec()));
    }

    fn show_detail(&self, item: &Item, comments: &[Item]) {
        self.send(UiEvent::Detail {
            item: item.clone(),
            comments: comments.to_vec(),
        });
    }

    fn notify(&self, item: &Item) {
        self.send(UiEvent::Live(item.clone()));
    }
}
