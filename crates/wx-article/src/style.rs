//! Render options and stylesheet derived from the configuration.

use std::fs;

use wx_config::{Config, EmbedStyle as ConfigEmbed, LinkStyle as ConfigLink, MathSyntax as ConfigMath};
use wx_css::DEFAULT_STYLESHEET;
use wx_renderer::{EmbedStyle, LinkStyle, MathSyntax, RenderSettings};

use crate::error::ArticleError;

/// Renderer options for the `[render]` section.
pub fn render_settings(config: &Config) -> RenderSettings {
    let render = &config.render;
    RenderSettings {
        line_number: render.line_number,
        embed_style: match render.embed_style {
            ConfigEmbed::Content => EmbedStyle::Content,
            ConfigEmbed::Quote => EmbedStyle::Quote,
        },
        use_figcaption: render.use_figcaption,
        math: match render.math {
            ConfigMath::Latex => MathSyntax::Latex,
            ConfigMath::Asciimath => MathSyntax::AsciiMath,
        },
        enable_topics: render.enable_topics,
        link_style: match render.link_style {
            ConfigLink::Inline => LinkStyle::Inline,
            ConfigLink::Footnote => LinkStyle::Footnote,
        },
    }
}

/// CSS inlined into an article.
///
/// The built-in stylesheet comes first so the theme and custom CSS can
/// override it.
#[derive(Debug, Clone, Default)]
pub struct ArticleStyle {
    /// Theme stylesheet.
    pub theme: String,
    /// CSS appended after the theme.
    pub custom: String,
}

impl ArticleStyle {
    /// Load the `[style]` section. A configured theme file must exist.
    pub fn from_config(config: &Config) -> Result<Self, ArticleError> {
        let theme = match &config.style_resolved.theme {
            Some(path) => fs::read_to_string(path)?,
            None => String::new(),
        };
        Ok(Self {
            theme,
            custom: config.style_resolved.custom_css.clone(),
        })
    }

    /// Same style with another theme.
    #[must_use]
    pub fn with_theme(&self, theme: String) -> Self {
        Self {
            theme,
            custom: self.custom.clone(),
        }
    }

    /// The combined stylesheet.
    pub fn css(&self) -> String {
        format!("{DEFAULT_STYLESHEET}\n\n{}\n\n{}", self.theme, self.custom)
    }
}
