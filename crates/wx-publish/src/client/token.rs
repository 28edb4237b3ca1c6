//! Access token.

use tracing::info;

use super::{WxClient, read_json};
use crate::error::PublishError;
use crate::types::TokenResponse;

impl WxClient {
    /// Exchange the account credentials for an access token.
    pub fn access_token(&self, app_id: &str, secret: &str) -> Result<String, PublishError> {
        let url = format!(
            "{}?grant_type=client_credential&appid={}&secret={}",
            self.api_url("token"),
            app_id,
            secret
        );

        info!("Requesting access token for {}", app_id);

        let response = self
            .agent
            .get(&url)
            .header("Accept", "application/json")
            .call()?;

        let token: TokenResponse = read_json(response)?;
        token.status.check()?;
        if token.access_token.is_empty() {
            return Err(PublishError::Api {
                errcode: -1,
                errmsg: "empty access token".to_owned(),
            });
        }

        info!("Got access token, expires in {}s", token.expires_in);
        Ok(token.access_token)
    }
}
