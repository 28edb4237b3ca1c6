//! Collaborator traits implemented by [`WxClient`].

use wx_images::{FetchedImage, ImageError, ImageUploader, RemoteFetcher, UploadResult};

use crate::client::WxClient;
use crate::error::PublishError;
use crate::types::{DraftArticle, DraftResult};

/// Number of drafts searched when looking for one to update.
const DRAFT_SEARCH_COUNT: u32 = 20;

/// Draft box of an account.
pub trait DraftPublisher {
    /// Create a new draft.
    fn create_draft(&self, articles: &[DraftArticle], token: &str)
    -> Result<DraftResult, PublishError>;

    /// Media id of a recent draft whose first article has `title`.
    fn find_draft(&self, title: &str, token: &str) -> Result<Option<String>, PublishError>;

    /// Replace the article at `index` of draft `media_id`.
    fn update_draft(
        &self,
        media_id: &str,
        index: u32,
        article: &DraftArticle,
        token: &str,
    ) -> Result<(), PublishError>;

    /// Media id of the newest image in the material library, used as the
    /// cover when the article names none.
    fn default_cover(&self, token: &str) -> Result<Option<String>, PublishError>;
}

impl DraftPublisher for WxClient {
    fn create_draft(
        &self,
        articles: &[DraftArticle],
        token: &str,
    ) -> Result<DraftResult, PublishError> {
        self.add_draft(articles, token)
    }

    fn find_draft(&self, title: &str, token: &str) -> Result<Option<String>, PublishError> {
        let list = self.drafts(token, 0, DRAFT_SEARCH_COUNT)?;
        Ok(list.find_by_title(title).map(ToOwned::to_owned))
    }

    fn update_draft(
        &self,
        media_id: &str,
        index: u32,
        article: &DraftArticle,
        token: &str,
    ) -> Result<(), PublishError> {
        WxClient::update_draft(self, media_id, index, article, token)
    }

    fn default_cover(&self, token: &str) -> Result<Option<String>, PublishError> {
        let list = self.image_materials(token, 0, 1)?;
        Ok(list.item.into_iter().next().map(|item| item.media_id))
    }
}

impl ImageUploader for WxClient {
    fn upload(&self, data: &[u8], filename: &str, token: &str) -> Result<UploadResult, ImageError> {
        // API-level failures come back inside the result.
        self.upload_material(data, filename, token)
            .map_err(Into::into)
    }
}

impl RemoteFetcher for WxClient {
    fn fetch(&self, url: &str) -> Result<FetchedImage, ImageError> {
        self.download(url).map_err(|err| ImageError::Fetch {
            url: url.to_owned(),
            message: err.to_string(),
        })
    }
}
