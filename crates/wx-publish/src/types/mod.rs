//! Request and response types of the publishing API.

mod draft;
mod material;

pub use draft::{DraftArticle, DraftContent, DraftItem, DraftList, DraftResult, NewsItem};
pub use material::{MaterialItem, MaterialList};

use serde::Deserialize;

use crate::error::PublishError;

/// Error fields every API response may carry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiStatus {
    /// `0` on success.
    #[serde(default)]
    pub errcode: i64,
    /// Error message.
    #[serde(default)]
    pub errmsg: String,
}

impl ApiStatus {
    /// Turn a non-zero `errcode` into [`PublishError::Api`].
    pub fn check(&self) -> Result<(), PublishError> {
        if self.errcode == 0 {
            Ok(())
        } else {
            Err(PublishError::Api {
                errcode: self.errcode,
                errmsg: self.errmsg.clone(),
            })
        }
    }
}

/// Access token response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Bearer token for subsequent calls; empty on failure.
    #[serde(default)]
    pub access_token: String,
    /// Lifetime in seconds.
    #[serde(default)]
    pub expires_in: u64,
    /// Error fields.
    #[serde(flatten)]
    pub status: ApiStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response() {
        let res: TokenResponse =
            serde_json::from_str(r#"{"access_token":"TOKEN","expires_in":7200}"#).unwrap();
        assert_eq!(res.access_token, "TOKEN");
        assert_eq!(res.expires_in, 7200);
        assert!(res.status.check().is_ok());
    }

    #[test]
    fn test_token_error() {
        let res: TokenResponse =
            serde_json::from_str(r#"{"errcode":40013,"errmsg":"invalid appid"}"#).unwrap();
        assert!(res.access_token.is_empty());
        let err = res.status.check().unwrap_err();
        assert_eq!(err.to_string(), "API error 40013: invalid appid");
    }
}
