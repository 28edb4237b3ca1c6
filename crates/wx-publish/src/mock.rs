//! In-memory draft box for testing.

use std::sync::RwLock;

use crate::error::PublishError;
use crate::publisher::DraftPublisher;
use crate::types::{ApiStatus, DraftArticle, DraftResult};

/// Mock draft box.
///
/// Created drafts get media ids `draft-1`, `draft-2`, ... and can be found
/// again by the title of their first article.
#[derive(Debug, Default)]
pub struct MockPublisher {
    drafts: RwLock<Vec<(String, Vec<DraftArticle>)>>,
    updates: RwLock<Vec<(String, DraftArticle)>>,
    cover: Option<String>,
}

impl MockPublisher {
    /// Create an empty draft box.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend the material library holds an image with this media id.
    #[must_use]
    pub fn with_library_cover(mut self, media_id: impl Into<String>) -> Self {
        self.cover = Some(media_id.into());
        self
    }

    /// Drafts created so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn drafts(&self) -> Vec<(String, Vec<DraftArticle>)> {
        self.drafts.read().unwrap().clone()
    }

    /// Draft updates applied so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn updates(&self) -> Vec<(String, DraftArticle)> {
        self.updates.read().unwrap().clone()
    }
}

impl DraftPublisher for MockPublisher {
    fn create_draft(
        &self,
        articles: &[DraftArticle],
        _token: &str,
    ) -> Result<DraftResult, PublishError> {
        let mut drafts = self.drafts.write().unwrap();
        let media_id = format!("draft-{}", drafts.len() + 1);
        drafts.push((media_id.clone(), articles.to_vec()));
        Ok(DraftResult {
            media_id: Some(media_id),
            status: ApiStatus::default(),
        })
    }

    fn find_draft(&self, title: &str, _token: &str) -> Result<Option<String>, PublishError> {
        Ok(self
            .drafts
            .read()
            .unwrap()
            .iter()
            .rev()
            .find(|(_, articles)| articles.first().is_some_and(|a| a.title == title))
            .map(|(id, _)| id.clone()))
    }

    fn update_draft(
        &self,
        media_id: &str,
        _index: u32,
        article: &DraftArticle,
        _token: &str,
    ) -> Result<(), PublishError> {
        self.updates
            .write()
            .unwrap()
            .push((media_id.to_owned(), article.clone()));
        Ok(())
    }

    fn default_cover(&self, _token: &str) -> Result<Option<String>, PublishError> {
        Ok(self.cover.clone())
    }
}
