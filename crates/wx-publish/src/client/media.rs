//! Image uploads, the material library and remote downloads.

use rand::RngExt;
use serde_json::json;
use tracing::info;
use wx_images::{FetchedImage, UploadResult, mime};

use super::{WxClient, read_json};
use crate::error::PublishError;
use crate::types::MaterialList;

impl WxClient {
    /// Upload an image as permanent material.
    ///
    /// The result carries both a `media_id` (usable as an article cover) and
    /// the hosted URL.
    pub fn upload_material(
        &self,
        data: &[u8],
        filename: &str,
        token: &str,
    ) -> Result<UploadResult, PublishError> {
        let url = format!(
            "{}?access_token={}&type=image",
            self.api_url("material/add_material"),
            token
        );
        info!("Uploading material '{}' ({} bytes)", filename, data.len());
        self.post_image(&url, data, filename)
    }

    /// Upload an image for use inside article content.
    ///
    /// These images only get a URL and do not count against the material
    /// quota.
    pub fn upload_content_image(
        &self,
        data: &[u8],
        filename: &str,
        token: &str,
    ) -> Result<UploadResult, PublishError> {
        let url = format!(
            "{}?access_token={}",
            self.api_url("media/uploadimg"),
            token
        );
        info!("Uploading content image '{}' ({} bytes)", filename, data.len());
        self.post_image(&url, data, filename)
    }

    /// List permanent image materials, newest first.
    pub fn image_materials(
        &self,
        token: &str,
        offset: u32,
        count: u32,
    ) -> Result<MaterialList, PublishError> {
        let url = format!(
            "{}?access_token={}",
            self.api_url("material/batchget_material"),
            token
        );
        let payload = json!({ "type": "image", "offset": offset, "count": count });
        info!("Listing image materials (offset={}, count={})", offset, count);

        let list: MaterialList = self.post_json(&url, &payload)?;
        list.status.check()?;
        Ok(list)
    }

    /// Download an image from anywhere on the web.
    pub fn download(&self, url: &str) -> Result<FetchedImage, PublishError> {
        info!("Downloading {}", url);

        let response = self.agent.get(url).call()?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned);
        let mut body_reader = response.into_body();

        if status >= 400 {
            let error_body = body_reader
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(PublishError::HttpResponse {
                status,
                body: error_body,
            });
        }

        Ok(FetchedImage {
            bytes: body_reader.read_to_vec()?,
            content_type,
        })
    }

    fn post_image(
        &self,
        url: &str,
        data: &[u8],
        filename: &str,
    ) -> Result<UploadResult, PublishError> {
        let boundary = format!("----WxFormBoundary{:016x}", rand::rng().random::<u64>());
        let body = multipart_body(&boundary, filename, mime::mime_for_path(filename), data);

        let response = self
            .agent
            .post(url)
            .header(
                "Content-Type",
                &format!("multipart/form-data; boundary={boundary}"),
            )
            .header("Accept", "application/json")
            .send(&body[..])?;

        read_json(response)
    }
}

/// `multipart/form-data` body with the file in the `media` field.
pub(crate) fn multipart_body(
    boundary: &str,
    filename: &str,
    content_type: &str,
    data: &[u8],
) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + 256);

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"media\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(b"\r\n");

    // End boundary
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}
