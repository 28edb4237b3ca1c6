//! `wx export` command implementation.

use std::path::PathBuf;

use clap::Args;
use wx_images::{ImageServices, ImageTranscoder};
use wx_publish::WxClient;

use super::{NoteArgs, render_failed, write_html};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the export command.
#[derive(Args)]
pub(crate) struct ExportArgs {
    #[command(flatten)]
    note: NoteArgs,

    /// Output file (default: stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl ExportArgs {
    /// Execute the export command.
    ///
    /// Vault and remote images are embedded as data URIs so the file opens
    /// anywhere.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration, vault or note cannot be
    /// loaded, or the note fails to render.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let session = self.note.open()?;
        let mut renderer = session.renderer()?;

        let article = session.render(&mut renderer, &output);

        // Only used to download remote images.
        let client = WxClient::default();
        let transcoder = ImageTranscoder::default();
        let services = ImageServices {
            uploader: &client,
            fetcher: &client,
            reader: &session.vault,
            transcoder: &transcoder,
        };
        let html = renderer.export(&article, services);

        write_html(&html, self.output.as_deref(), &output)?;
        render_failed(&article)
    }
}
