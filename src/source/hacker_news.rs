//! Hacker News data source.
//!
//! The API is a read-only Firebase export: every ranked list is a single
//! JSON array of item IDs, and every item lives at its own URL.  There are
//! no server-side pagination parameters, so callers page by slicing the ID
//! list themselves.

use async_trait::async_trait;
use tracing::debug;

use super::{Category, DataSource, Item, ItemId};
use crate::error::{FeedError, FeedResult};

pub const DEFAULT_BASE_URL: &str = "https://hacker-news.firebaseio.com/v0";

/// Hacker News over HTTP.
///
/// Cloning is cheap: the underlying [`reqwest::Client`] is reference
/// counted and keeps one connection pool for all requests.
#[derive(Clone)]
pub struct HackerNewsSource {
    client: reqwest::Client,
    base_url: String,
}

impl HackerNewsSource {
    /// Create a source rooted at `base_url` (e.g. [`DEFAULT_BASE_URL`]).
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn list_url(&self, category: Category) -> String {
        format!("{}/{}.json", self.base_url, category.path())
    }

    fn item_url(&self, id: ItemId) -> String {
        format!("{}/item/{id}.json", self.base_url)
    }

    /// GET `url` and return the body of a successful response.
    async fn get_text(&self, url: &str) -> FeedResult<String> {
        debug!(url, "GET");
        let transport = |source| FeedError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                url: url.to_string(),
                status,
            });
        }
        response.text().await.map_err(transport)
    }
}

#[async_trait]
impl DataSource for HackerNewsSource {
    fn name(&self) -> &str {
        "hacker-news"
    }

    async fn fetch_id_list(&self, category: Category) -> FeedResult<Vec<ItemId>> {
        let url = self.list_url(category);
        let body = self.get_text(&url).await?;

        match serde_json::from_str::<Vec<ItemId>>(&body) {
            Ok(ids) => Ok(ids),
            Err(e) => {
                debug!(%url, error = %e, "id list is not an array of ids, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    async fn fetch_item(&self, id: ItemId) -> FeedResult<Option<Item>> {
        let url = self.item_url(id);
        let body = self.get_text(&url).await?;
        serde_json::from_str(&body).map_err(|source| FeedError::Malformed { url, source })
    }
}
