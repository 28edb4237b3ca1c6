//! Configuration management for wx.
//!
//! Parses `wx.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! Credentials should not live in the vault, so these fields support
//! `${VAR}` (error if unset) and `${VAR:-default}`:
//!
//! - `wechat.base_url`
//! - `wechat.app_id`
//! - `wechat.app_secret`
//!
//! ## Example
//!
//! ```toml
//! [vault]
//! root = "."
//! attachments = "attachments"
//!
//! [render]
//! link_style = "footnote"
//!
//! [style]
//! theme = "themes/default.css"
//!
//! [wechat]
//! app_id = "${WX_APP_ID}"
//! app_secret = "${WX_APP_SECRET}"
//! ```

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override vault root directory.
    pub vault_root: Option<PathBuf>,
    /// Override theme stylesheet.
    pub theme: Option<PathBuf>,
    /// Override link rendering.
    pub link_style: Option<LinkStyle>,
    /// Override figcaption rendering.
    pub use_figcaption: Option<bool>,
    /// Override code line numbers.
    pub line_number: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "wx.toml";

/// Public API endpoint used when `wechat.base_url` is not set.
const DEFAULT_BASE_URL: &str = "https://api.weixin.qq.com";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Vault configuration (paths are relative strings from TOML).
    vault: VaultConfigRaw,
    /// Rendering options.
    pub render: RenderConfig,
    /// Stylesheet configuration (paths are relative strings from TOML).
    style: StyleConfigRaw,
    /// Image options.
    pub images: ImagesConfig,
    /// Publishing account (optional section, required to publish).
    pub wechat: Option<WechatConfig>,

    /// Resolved vault configuration (set after loading).
    #[serde(skip)]
    pub vault_resolved: VaultConfig,
    /// Resolved stylesheet configuration (set after loading).
    #[serde(skip)]
    pub style_resolved: StyleConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw vault configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct VaultConfigRaw {
    root: Option<String>,
    attachments: Option<String>,
}

/// Resolved vault configuration with absolute paths.
#[derive(Debug, Default)]
pub struct VaultConfig {
    /// Vault directory. Note and attachment paths are relative to it.
    pub root: PathBuf,
    /// Folder searched first when resolving attachments.
    pub attachments: Option<PathBuf>,
}

/// Wrapper of embedded notes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedStyle {
    /// Plain `<section>`.
    #[default]
    Content,
    /// `<blockquote>`.
    Quote,
}

/// Default syntax of math expressions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MathSyntax {
    /// LaTeX.
    #[default]
    Latex,
    /// AsciiMath.
    Asciimath,
}

/// Rendering of links the platform does not allow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStyle {
    /// Target in brackets after the link text.
    #[default]
    Inline,
    /// Numbered footnotes at the end of the article.
    Footnote,
}

/// Rendering options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Show a line-number gutter in code blocks.
    pub line_number: bool,
    /// Wrapper of embedded notes.
    pub embed_style: EmbedStyle,
    /// Render markdown images as `<figure>` with a caption.
    pub use_figcaption: bool,
    /// Default math syntax.
    pub math: MathSyntax,
    /// Turn `#tag` into topic links.
    pub enable_topics: bool,
    /// Rendering of external links.
    pub link_style: LinkStyle,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            line_number: true,
            embed_style: EmbedStyle::Content,
            use_figcaption: false,
            math: MathSyntax::Latex,
            enable_topics: true,
            link_style: LinkStyle::Inline,
        }
    }
}

/// Raw stylesheet configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct StyleConfigRaw {
    theme: Option<String>,
    custom_css: String,
}

/// Resolved stylesheet configuration.
#[derive(Debug, Default)]
pub struct StyleConfig {
    /// Theme stylesheet file.
    pub theme: Option<PathBuf>,
    /// CSS appended after the theme.
    pub custom_css: String,
}

/// Image options.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ImagesConfig {
    /// Vault path of an image stamped onto every upload.
    pub watermark: Option<String>,
}

/// Publishing account configuration.
#[derive(Debug, Deserialize)]
pub struct WechatConfig {
    /// API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Account app id.
    pub app_id: String,
    /// Account app secret.
    pub app_secret: String,
}

impl WechatConfig {
    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or has invalid format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.base_url, "wechat.base_url")?;
        require_http_url(&self.base_url, "wechat.base_url")?;
        require_non_empty(&self.app_id, "wechat.app_id")?;
        require_non_empty(&self.app_secret, "wechat.app_secret")?;
        Ok(())
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`wechat.app_secret`").
        field: String,
        /// Error message (e.g., "${`WX_APP_SECRET`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `wx.toml` in current directory and parents.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(root) = &settings.vault_root {
            self.vault_resolved.root.clone_from(root);
        }
        if let Some(theme) = &settings.theme {
            self.style_resolved.theme = Some(theme.clone());
        }
        if let Some(link_style) = settings.link_style {
            self.render.link_style = link_style;
        }
        if let Some(use_figcaption) = settings.use_figcaption {
            self.render.use_figcaption = use_figcaption;
        }
        if let Some(line_number) = settings.line_number {
            self.render.line_number = line_number;
        }
    }

    /// Get validated publishing account configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the section is missing or invalid.
    pub fn require_wechat(&self) -> Result<&WechatConfig, ConfigError> {
        let wechat = self
            .wechat
            .as_ref()
            .ok_or_else(|| ConfigError::Validation("[wechat] section required in config".into()))?;
        wechat.validate()?;
        Ok(wechat)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with the vault at the current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with the vault at `base`.
    fn default_with_base(base: &Path) -> Self {
        Self {
            vault: VaultConfigRaw::default(),
            render: RenderConfig::default(),
            style: StyleConfigRaw::default(),
            images: ImagesConfig::default(),
            wechat: None,
            vault_resolved: VaultConfig {
                root: base.to_path_buf(),
                attachments: None,
            },
            style_resolved: StyleConfig::default(),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// The `[wechat]` section is only checked by
    /// [`require_wechat`](Self::require_wechat), so rendering works without
    /// credentials.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(watermark) = &self.images.watermark {
            require_non_empty(watermark, "images.watermark")?;
        }
        if let Some(attachments) = &self.vault.attachments
            && Path::new(attachments).is_absolute()
        {
            return Err(ConfigError::Validation(
                "vault.attachments must be relative to the vault root".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref mut wechat) = self.wechat {
            wechat.base_url = expand::expand_env(&wechat.base_url, "wechat.base_url")?;
            wechat.app_id = expand::expand_env(&wechat.app_id, "wechat.app_id")?;
            wechat.app_secret = expand::expand_env(&wechat.app_secret, "wechat.app_secret")?;
        }
        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let root = config_dir.join(self.vault.root.as_deref().unwrap_or("."));
        self.vault_resolved = VaultConfig {
            attachments: self.vault.attachments.as_ref().map(|a| root.join(a)),
            root,
        };

        self.style_resolved = StyleConfig {
            theme: self.style.theme.as_ref().map(|t| config_dir.join(t)),
            custom_css: self.style.custom_css.clone(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/vault"));
        assert_eq!(config.vault_resolved.root, PathBuf::from("/vault"));
        assert!(config.vault_resolved.attachments.is_none());
        assert!(config.render.line_number);
        assert_eq!(config.render.embed_style, EmbedStyle::Content);
        assert_eq!(config.render.link_style, LinkStyle::Inline);
        assert!(config.render.enable_topics);
        assert!(config.wechat.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.render.math, MathSyntax::Latex);
        assert!(!config.render.use_figcaption);
    }

    #[test]
    fn test_parse_render_config() {
        let toml = r#"
[render]
line_number = false
embed_style = "quote"
use_figcaption = true
math = "asciimath"
enable_topics = false
link_style = "footnote"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(!config.render.line_number);
        assert_eq!(config.render.embed_style, EmbedStyle::Quote);
        assert!(config.render.use_figcaption);
        assert_eq!(config.render.math, MathSyntax::Asciimath);
        assert!(!config.render.enable_topics);
        assert_eq!(config.render.link_style, LinkStyle::Footnote);
    }

    #[test]
    fn test_unknown_link_style_rejected() {
        let toml = r#"
[render]
link_style = "sidebar"
"#;
        assert!(toml::from_str::<Config>(toml).is_err());
    }

    #[test]
    fn test_parse_wechat_config_default_base_url() {
        let toml = r#"
[wechat]
app_id = "wx123"
app_secret = "secret"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let wechat = config.require_wechat().unwrap();
        assert_eq!(wechat.base_url, "https://api.weixin.qq.com");
        assert_eq!(wechat.app_id, "wx123");
    }

    #[test]
    fn test_require_wechat_missing_section() {
        let config = Config::default_with_base(Path::new("/vault"));
        let err = config.require_wechat().unwrap_err();
        assert!(err.to_string().contains("[wechat]"));
    }

    #[test]
    fn test_require_wechat_invalid_url() {
        let toml = r#"
[wechat]
base_url = "api.weixin.qq.com"
app_id = "wx123"
app_secret = "secret"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let err = config.require_wechat().unwrap_err();
        assert!(err.to_string().contains("wechat.base_url"));
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[vault]
root = "notes"
attachments = "assets"

[style]
theme = "themes/light.css"
custom_css = "p { color: red; }"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.vault_resolved.root, PathBuf::from("/project/notes"));
        assert_eq!(
            config.vault_resolved.attachments,
            Some(PathBuf::from("/project/notes/assets"))
        );
        assert_eq!(
            config.style_resolved.theme,
            Some(PathBuf::from("/project/themes/light.css"))
        );
        assert_eq!(config.style_resolved.custom_css, "p { color: red; }");
    }

    #[test]
    fn test_validate_rejects_empty_watermark() {
        let toml = r#"
[images]
watermark = ""
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/vault"));
        let overrides = CliSettings {
            vault_root: Some(PathBuf::from("/other")),
            link_style: Some(LinkStyle::Footnote),
            line_number: Some(false),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.vault_resolved.root, PathBuf::from("/other"));
        assert_eq!(config.render.link_style, LinkStyle::Footnote);
        assert!(!config.render.line_number);
        assert!(!config.render.use_figcaption); // Unchanged
        assert!(config.style_resolved.theme.is_none()); // Unchanged
    }

    #[test]
    fn test_expand_env_vars_wechat() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("WX_CONFIG_TEST_ID", "wx-from-env");
            std::env::set_var("WX_CONFIG_TEST_SECRET", "s3cret");
        }

        let toml = r#"
[wechat]
app_id = "${WX_CONFIG_TEST_ID}"
app_secret = "${WX_CONFIG_TEST_SECRET}"
base_url = "${WX_CONFIG_TEST_URL:-https://proxy.example.com}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        let wechat = config.wechat.unwrap();
        assert_eq!(wechat.app_id, "wx-from-env");
        assert_eq!(wechat.app_secret, "s3cret");
        assert_eq!(wechat.base_url, "https://proxy.example.com");

        unsafe {
            std::env::remove_var("WX_CONFIG_TEST_ID");
            std::env::remove_var("WX_CONFIG_TEST_SECRET");
        }
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wx.toml");
        std::fs::write(
            &path,
            "[vault]\nroot = \"vault\"\n\n[render]\nuse_figcaption = true\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.vault_resolved.root, dir.path().join("vault"));
        assert!(config.render.use_figcaption);
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_applies_cli_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wx.toml");
        std::fs::write(&path, "[render]\nlink_style = \"footnote\"\n").unwrap();

        let settings = CliSettings {
            link_style: Some(LinkStyle::Inline),
            ..Default::default()
        };
        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert_eq!(config.render.link_style, LinkStyle::Inline);
    }
}
