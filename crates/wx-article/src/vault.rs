//! Obsidian vault on the local filesystem.
//!
//! The vault is scanned once when opened. Links are resolved the way
//! Obsidian resolves them: an exact vault path wins, otherwise the shortest
//! match by file name, with the attachment folder searched first.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use wx_images::{ImageError, VaultReader};
use wx_renderer::{AssetResolver, RenderError, ResolvedResource};

use crate::error::ArticleError;

/// Characters escaped in `file://` URLs.
const PATH_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Vault rooted at a directory.
#[derive(Debug)]
pub struct FsVault {
    root: PathBuf,
    attachments: Option<String>,
    files: Vec<String>,
    active: Option<String>,
}

impl FsVault {
    /// Open and scan the vault at `root`.
    ///
    /// Hidden files and directories (`.obsidian`, `.git`, ...) are skipped.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, ArticleError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(ArticleError::VaultNotFound(root));
        }
        let root = root.canonicalize()?;

        let mut files = Vec::new();
        scan_directory(&root, "", &mut files);
        files.sort();

        Ok(Self {
            root,
            attachments: None,
            files,
            active: None,
        })
    }

    /// Search this folder first when resolving attachments.
    ///
    /// Absolute paths inside the vault are accepted and made relative.
    #[must_use]
    pub fn with_attachments(mut self, folder: &Path) -> Self {
        let folder = folder.canonicalize().unwrap_or_else(|_| folder.to_path_buf());
        let relative = folder.strip_prefix(&self.root).unwrap_or(&folder);
        let relative = to_vault_path(relative);
        self.attachments = (!relative.is_empty()).then_some(relative);
        self
    }

    /// Set the note being rendered (vault path).
    #[must_use]
    pub fn with_active(mut self, path: impl Into<String>) -> Self {
        self.active = Some(path.into());
        self
    }

    /// Vault root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of files in the vault.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the vault holds no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Vault path of a file on disk.
    pub fn vault_path(&self, path: &Path) -> Result<String, ArticleError> {
        let absolute = path.canonicalize()?;
        absolute
            .strip_prefix(&self.root)
            .map(to_vault_path)
            .map_err(|_| ArticleError::OutsideVault(path.to_path_buf()))
    }

    fn absolute(&self, vault_path: &str) -> PathBuf {
        self.root.join(vault_path)
    }

    fn in_attachments(&self, file: &str) -> bool {
        self.attachments
            .as_deref()
            .is_some_and(|folder| file.strip_prefix(folder).is_some_and(|r| r.starts_with('/')))
    }
}

impl AssetResolver for FsVault {
    fn resolve_path(&self, name: &str) -> Option<ResolvedResource> {
        let file_path = self.search_file(name)?;
        let absolute = self.absolute(&file_path);
        let res_url = format!(
            "file://{}",
            utf8_percent_encode(&absolute.to_string_lossy(), PATH_ENCODE_SET)
        );
        Some(ResolvedResource { res_url, file_path })
    }

    fn read_text(&self, path: &str) -> Result<String, RenderError> {
        match fs::read_to_string(self.absolute(path)) {
            Ok(text) => Ok(text),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(RenderError::NotFound(path.to_owned()))
            }
            Err(err) if err.kind() == ErrorKind::InvalidData => {
                Err(RenderError::InvalidUtf8(path.to_owned()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn search_file(&self, name: &str) -> Option<String> {
        let name = name.trim().trim_start_matches("./").trim_start_matches('/');
        if name.is_empty() {
            return None;
        }
        if self.files.binary_search_by(|f| f.as_str().cmp(name)).is_ok() {
            return Some(name.to_owned());
        }

        let suffix = format!("/{name}");
        let mut matches: Vec<&String> = self.files.iter().filter(|f| f.ends_with(&suffix)).collect();
        matches.sort_by_key(|f| (!self.in_attachments(f), f.len()));
        matches.first().map(|f| (*f).clone())
    }

    fn active_file(&self) -> Option<String> {
        self.active.clone()
    }

    fn load_icon(&self, name: &str) -> String {
        self.search_file(&format!("{name}.svg"))
            .and_then(|path| self.read_text(&path).ok())
            .unwrap_or_default()
    }
}

impl VaultReader for FsVault {
    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, ImageError> {
        match fs::read(self.absolute(path)) {
            Ok(data) => Ok(data),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(ImageError::NotFound(path.to_owned()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Collect the vault paths of all visible files below `dir_path`.
fn scan_directory(dir_path: &Path, prefix: &str, files: &mut Vec<String>) {
    let Ok(entries) = fs::read_dir(dir_path) else {
        return;
    };

    for entry in entries.filter_map(Result::ok) {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let vault_path = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}/{name}")
        };
        if entry.file_type().is_ok_and(|t| t.is_dir()) {
            scan_directory(&entry.path(), &vault_path, files);
        } else {
            files.push(vault_path);
        }
    }
}

/// `/`-separated form of a relative path.
fn to_vault_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
