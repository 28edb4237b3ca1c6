//! Draft box operations.

use serde_json::json;
use tracing::info;

use super::WxClient;
use crate::error::PublishError;
use crate::types::{ApiStatus, DraftArticle, DraftList, DraftResult};

impl WxClient {
    /// Create a draft holding `articles`.
    pub fn add_draft(
        &self,
        articles: &[DraftArticle],
        token: &str,
    ) -> Result<DraftResult, PublishError> {
        let url = format!("{}?access_token={}", self.api_url("draft/add"), token);
        let payload = json!({ "articles": articles });

        info!("Creating draft with {} article(s)", articles.len());

        let result: DraftResult = self.post_json(&url, &payload)?;
        result.status.check()?;
        info!(
            "Created draft {}",
            result.media_id.as_deref().unwrap_or_default()
        );
        Ok(result)
    }

    /// Replace the article at `index` of an existing draft.
    pub fn update_draft(
        &self,
        media_id: &str,
        index: u32,
        article: &DraftArticle,
        token: &str,
    ) -> Result<(), PublishError> {
        let url = format!("{}?access_token={}", self.api_url("draft/update"), token);
        let payload = json!({
            "media_id": media_id,
            "index": index,
            "articles": article,
        });

        info!("Updating draft {} (index {})", media_id, index);

        let status: ApiStatus = self.post_json(&url, &payload)?;
        status.check()
    }

    /// List drafts, newest first.
    pub fn drafts(&self, token: &str, offset: u32, count: u32) -> Result<DraftList, PublishError> {
        let url = format!("{}?access_token={}", self.api_url("draft/batchget"), token);
        let payload = json!({ "offset": offset, "count": count, "no_content": 1 });

        info!("Listing drafts (offset={}, count={})", offset, count);

        let list: DraftList = self.post_json(&url, &payload)?;
        list.status.check()?;
        Ok(list)
    }
}
