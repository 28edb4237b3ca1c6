//! CLI command implementations.

mod export;
mod publish;
mod render;

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use wx_article::{Article, ArticleRenderer, ArticleStyle, FsVault, render_settings};
use wx_config::{CliSettings, Config, LinkStyle};
use wx_renderer::AssetResolver;

use crate::error::CliError;
use crate::output::Output;

pub(crate) use export::ExportArgs;
pub(crate) use publish::PublishArgs;
pub(crate) use render::RenderArgs;

/// `--link-style` values.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum LinkStyleArg {
    /// Target in brackets after the link text.
    Inline,
    /// Numbered footnotes at the end of the article.
    Footnote,
}

impl From<LinkStyleArg> for LinkStyle {
    fn from(arg: LinkStyleArg) -> Self {
        match arg {
            LinkStyleArg::Inline => Self::Inline,
            LinkStyleArg::Footnote => Self::Footnote,
        }
    }
}

/// Arguments shared by every command that renders a note.
#[derive(Args)]
pub(crate) struct NoteArgs {
    /// Note to render: a file path, or a path or name inside the vault.
    note: PathBuf,

    /// Path to configuration file (default: auto-discover wx.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Vault root directory (overrides config).
    #[arg(long)]
    vault: Option<PathBuf>,

    /// Theme stylesheet (overrides config).
    #[arg(long)]
    theme: Option<PathBuf>,

    /// How links to other sites are rendered (overrides config).
    #[arg(long, value_enum)]
    link_style: Option<LinkStyleArg>,

    /// Render images with their alt text as a caption.
    #[arg(long)]
    figcaption: bool,

    /// Hide line numbers in code blocks.
    #[arg(long)]
    no_line_number: bool,
}

impl NoteArgs {
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            vault_root: self.vault.clone(),
            theme: self.theme.clone(),
            link_style: self.link_style.map(Into::into),
            use_figcaption: self.figcaption.then_some(true),
            line_number: self.no_line_number.then_some(false),
        }
    }

    /// Load the configuration, open the vault and locate the note.
    fn open(&self) -> Result<Session, CliError> {
        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;

        let mut vault = FsVault::open(&config.vault_resolved.root)?;
        if let Some(attachments) = &config.vault_resolved.attachments {
            vault = vault.with_attachments(attachments);
        }
        let note = resolve_note(&vault, &self.note)?;
        let vault = vault.with_active(note.clone());

        Ok(Session {
            config,
            vault,
            note,
        })
    }
}

/// Loaded configuration and vault for one note.
pub(crate) struct Session {
    config: Config,
    vault: FsVault,
    note: String,
}

impl Session {
    fn renderer(&self) -> Result<ArticleRenderer<'_>, CliError> {
        let style = ArticleStyle::from_config(&self.config)?;
        Ok(ArticleRenderer::new(
            &self.vault,
            render_settings(&self.config),
            style,
        ))
    }

    /// Render the note, reporting a failed render.
    fn render(&self, renderer: &mut ArticleRenderer<'_>, output: &Output) -> Article {
        output.info(&format!("Rendering {}...", self.note));
        let article = renderer.render_note(&self.note);
        if let Some(error) = &article.error {
            output.warning(&format!("Render failed: {error}"));
        }
        for warning in diagram_warnings(renderer) {
            output.warning(&warning);
        }
        article
    }
}

/// One warning per mermaid diagram left as an empty placeholder.
fn diagram_warnings(renderer: &ArticleRenderer<'_>) -> Vec<String> {
    renderer
        .deferred_diagrams()
        .into_iter()
        .map(|id| format!("Mermaid diagram {id} is not rendered and will be empty in the article"))
        .collect()
}

/// Vault path of the note named on the command line.
///
/// Existing files are taken relative to the working directory; anything else
/// is looked up in the vault, with `.md` appended when missing.
fn resolve_note(vault: &FsVault, note: &Path) -> Result<String, CliError> {
    if note.is_file() {
        return Ok(vault.vault_path(note)?);
    }

    let name = note.to_string_lossy().into_owned();
    let candidates = if name.ends_with(".md") {
        vec![name.clone()]
    } else {
        vec![name.clone(), format!("{name}.md")]
    };
    candidates
        .iter()
        .find_map(|candidate| vault.search_file(candidate))
        .ok_or_else(|| CliError::Validation(format!("Note not found in vault: {name}")))
}

/// Write `html` to `path`, or to stdout when no path is given.
fn write_html(html: &str, path: Option<&Path>, output: &Output) -> Result<(), CliError> {
    match path {
        Some(path) => {
            std::fs::write(path, html)?;
            output.success(&format!("Wrote {}", path.display()));
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(html.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

/// Error for a note that rendered as the error block.
fn render_failed(article: &Article) -> Result<(), CliError> {
    match &article.error {
        Some(error) => Err(CliError::Validation(format!(
            "Failed to render {}: {error}",
            article.name
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn vault() -> (tempfile::TempDir, FsVault) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("posts")).unwrap();
        fs::write(dir.path().join("posts/Hello.md"), "# Hello").unwrap();
        fs::write(dir.path().join("Hello"), "not a note").unwrap();
        let vault = FsVault::open(dir.path()).unwrap();
        (dir, vault)
    }

    #[test]
    fn test_resolve_note_by_file_path() {
        let (dir, vault) = vault();
        let note = resolve_note(&vault, &dir.path().join("posts/Hello.md")).unwrap();
        assert_eq!(note, "posts/Hello.md");
    }

    #[test]
    fn test_resolve_note_by_name() {
        let (_dir, vault) = vault();
        assert_eq!(
            resolve_note(&vault, Path::new("posts/Hello.md")).unwrap(),
            "posts/Hello.md"
        );
        assert_eq!(resolve_note(&vault, Path::new("Hello.md")).unwrap(), "posts/Hello.md");
    }

    #[test]
    fn test_resolve_note_missing() {
        let (_dir, vault) = vault();
        let err = resolve_note(&vault, Path::new("Nope")).unwrap_err();
        assert_eq!(err.to_string(), "Note not found in vault: Nope");
    }

    #[test]
    fn test_diagram_warnings_name_each_diagram() {
        let (dir, vault) = vault();
        fs::write(dir.path().join("Flow.md"), "```mermaid\ngraph TD\n```\n").unwrap();
        let mut renderer =
            ArticleRenderer::new(&vault, wx_renderer::RenderSettings::default(), ArticleStyle::default());

        renderer.render_note("posts/Hello.md");
        assert!(diagram_warnings(&renderer).is_empty());

        renderer.render_note("Flow.md");
        assert_eq!(
            diagram_warnings(&renderer),
            vec!["Mermaid diagram mermaid-0 is not rendered and will be empty in the article".to_owned()]
        );
    }

    #[test]
    fn test_cli_settings() {
        let args = NoteArgs {
            note: PathBuf::from("a.md"),
            config: None,
            vault: Some(PathBuf::from("/vault")),
            theme: None,
            link_style: Some(LinkStyleArg::Footnote),
            figcaption: false,
            no_line_number: true,
        };
        let settings = args.cli_settings();
        assert_eq!(settings.vault_root, Some(PathBuf::from("/vault")));
        assert_eq!(settings.link_style, Some(LinkStyle::Footnote));
        assert_eq!(settings.use_figcaption, None);
        assert_eq!(settings.line_number, Some(false));
    }
}
