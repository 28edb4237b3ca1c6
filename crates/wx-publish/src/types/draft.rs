//! Draft box types.

use serde::{Deserialize, Serialize};

use super::ApiStatus;

/// One article of a draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DraftArticle {
    /// Article title.
    pub title: String,
    /// Author shown under the title.
    pub author: String,
    /// Summary shown in share cards.
    pub digest: String,
    /// Article HTML.
    pub content: String,
    /// "Read more" link.
    pub content_source_url: String,
    /// Permanent media id of the cover image.
    pub thumb_media_id: String,
    /// `1` to open comments.
    pub need_open_comment: u8,
    /// `1` to restrict comments to followers.
    pub only_fans_can_comment: u8,
    /// Cover crop for the 2.35:1 share card, `X1_Y1_X2_Y2`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pic_crop_235_1: String,
    /// Cover crop for the 1:1 share card.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pic_crop_1_1: String,
}

/// Response of draft creation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DraftResult {
    /// Media id of the new draft.
    #[serde(default)]
    pub media_id: Option<String>,
    /// Error fields.
    #[serde(flatten)]
    pub status: ApiStatus,
}

/// One page of the draft box.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DraftList {
    /// Drafts in the account.
    #[serde(default)]
    pub total_count: u32,
    /// Drafts in this page.
    #[serde(default)]
    pub item_count: u32,
    /// The drafts.
    #[serde(default)]
    pub item: Vec<DraftItem>,
    /// Error fields.
    #[serde(flatten)]
    pub status: ApiStatus,
}

impl DraftList {
    /// Media id of the first draft whose first article has this title.
    pub fn find_by_title(&self, title: &str) -> Option<&str> {
        self.item
            .iter()
            .find(|draft| {
                draft
                    .content
                    .news_item
                    .first()
                    .is_some_and(|news| !news.title.is_empty() && news.title == title)
            })
            .map(|draft| draft.media_id.as_str())
    }
}

/// A stored draft.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DraftItem {
    /// Draft media id.
    pub media_id: String,
    /// Draft articles.
    #[serde(default)]
    pub content: DraftContent,
}

/// Articles of a stored draft.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DraftContent {
    /// The articles, in order.
    #[serde(default)]
    pub news_item: Vec<NewsItem>,
}

/// Stored article. Only the fields used for matching are kept.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsItem {
    /// Article title.
    #[serde(default)]
    pub title: String,
}
