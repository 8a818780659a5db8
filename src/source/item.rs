//! The record type shared by stories, jobs, polls and comments.
//!
//! `Item` mirrors the JSON object served at `/item/{id}.json`.  Stories and
//! comments use the same shape; fields a given kind does not carry are simply
//! absent, so almost everything is optional.
//!
//! ## For contributors
//!
//! Only add a field here if something renders or merges on it.  Unknown JSON
//! keys are ignored by serde, so the upstream API growing new fields never
//! breaks decoding.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Stable identifier assigned by the data source.
pub type ItemId = u64;

/// The `type` field of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Story,
    Comment,
    Job,
    Poll,
    PollOpt,
    /// Anything the API adds later.
    #[serde(other)]
    Unknown,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Story => "story",
            Self::Comment => "comment",
            Self::Job => "job",
            Self::Poll => "poll",
            Self::PollOpt => "pollopt",
            Self::Unknown => "unknown",
        }
    }
}

/// A single post or comment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Item {
    /// Unique identifier, used for membership tests by the live poller.
    pub id: ItemId,

    #[serde(rename = "type")]
    pub kind: ItemKind,

    /// Author handle.  Missing on deleted items.
    pub by: Option<String>,

    /// Creation time in epoch seconds, used for sorting.
    #[serde(default)]
    pub time: i64,

    /// Headline (stories, jobs and polls only).
    pub title: Option<String>,

    /// Body text as HTML.
    pub text: Option<String>,

    /// External link.
    pub url: Option<String>,

    /// Child comment IDs, in ranked order.
    #[serde(default)]
    pub kids: Vec<ItemId>,

    pub score: Option<i64>,

    /// Total comment count for stories.
    pub descendants: Option<u64>,

    #[serde(default)]
    pub deleted: bool,

    #[serde(default)]
    pub dead: bool,
}

impl Item {
    /// `time` as a UTC timestamp, if it is in range.
    pub fn published(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.time, 0)
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("(untitled)")
    }

    pub fn author(&self) -> &str {
        self.by.as_deref().unwrap_or("anonymous")
    }
}

/// Sort newest first.  The sort is stable, so items sharing a timestamp keep
/// their fetch order.
pub fn sort_newest_first(items: &mut [Item]) {
    items.sort_by(|a, b| b.time.cmp(&a.time));
}

#[cfg(test)]
pub(crate) fn make_item(id: ItemId, title: &str, time: i64) -> Item {
    Item {
        id,
        kind: ItemKind::Story,
        by: Some("tester".to_string()),
        time,
        title: Some(title.to_string()),
        text: None,
        url: None,
        kids: Vec::new(),
        score: None,
        descendants: None,
        deleted: false,
        dead: false,
    }
}
