//! `wx publish` command implementation.

use clap::Args;
use tracing::warn;
use wx_article::{ArticleRenderer, PublishOutcome};
use wx_config::{Config, WechatConfig};
use wx_images::{ImageServices, ImageTranscoder, VaultReader};
use wx_publish::WxClient;
use wx_renderer::AssetResolver;

use super::{NoteArgs, Session};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the publish command.
#[derive(Args)]
pub(crate) struct PublishArgs {
    #[command(flatten)]
    note: NoteArgs,
}

impl PublishArgs {
    /// Execute the publish command.
    ///
    /// # Errors
    ///
    /// Returns an error if the note fails to render, the `[wechat]` section
    /// is missing, or the API rejects the token, cover or draft.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let session = self.note.open()?;
        let wechat = require_wechat_config(&session.config, &output)?;

        let mut renderer = session.renderer()?;
        if let Some(watermark) = load_watermark(&session, &output) {
            renderer = renderer.with_watermark(watermark);
        }
        let mut article = session.render(&mut renderer, &output);

        let client = WxClient::new(&wechat.base_url);
        let token = client.access_token(&wechat.app_id, &wechat.app_secret)?;
        let transcoder = ImageTranscoder::default();
        let services = ImageServices {
            uploader: &client,
            fetcher: &client,
            reader: &session.vault,
            transcoder: &transcoder,
        };

        output.info("Uploading images...");
        let outcome = renderer.publish(&mut article, &token, services, &client)?;
        print_outcome(&output, &renderer, &outcome);
        Ok(())
    }
}

fn require_wechat_config<'a>(
    config: &'a Config,
    output: &Output,
) -> Result<&'a WechatConfig, CliError> {
    config.require_wechat().map_err(|err| {
        output.info("\nAdd the following to your wx.toml:");
        output.info("\n[wechat]");
        output.info(r#"app_id = "${WX_APP_ID}""#);
        output.info(r#"app_secret = "${WX_APP_SECRET}""#);
        err.into()
    })
}

/// Watermark image bytes. A configured watermark missing from the vault is
/// reported and publishing continues without it.
fn load_watermark(session: &Session, output: &Output) -> Option<Vec<u8>> {
    let name = session.config.images.watermark.as_deref()?;
    let data = session
        .vault
        .search_file(name)
        .ok_or_else(|| format!("not found in vault: {name}"))
        .and_then(|path| session.vault.read_bytes(&path).map_err(|err| err.to_string()));
    match data {
        Ok(data) => Some(data),
        Err(err) => {
            warn!("Watermark unavailable: {err}");
            output.warning(&format!("Watermark skipped: {err}"));
            None
        }
    }
}

fn print_outcome(output: &Output, renderer: &ArticleRenderer<'_>, outcome: &PublishOutcome) {
    if outcome.updated {
        output.success("\nDraft updated successfully!");
    } else {
        output.success("\nDraft created successfully!");
    }
    output.field("Media ID", &outcome.media_id);
    output.field("Images uploaded", &outcome.uploaded.to_string());

    if outcome.failed > 0 {
        output.warning(&format!(
            "\nWarning: {} image(s) could not be uploaded:",
            outcome.failed
        ));
        for warning in renderer.images().warnings() {
            output.info(&format!("  - {warning}"));
        }
    }
}
