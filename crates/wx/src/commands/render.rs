//! `wx render` command implementation.

use std::path::PathBuf;

use clap::Args;

use super::{NoteArgs, render_failed, write_html};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    #[command(flatten)]
    note: NoteArgs,

    /// Output file (default: stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// The HTML keeps local images as `file://` URLs; nothing is uploaded.
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
        write_html(&renderer.content(&article), self.output.as_deref(), &output)?;
        render_failed(&article)
    }
}
