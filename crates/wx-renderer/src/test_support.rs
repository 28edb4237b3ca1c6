//! In-memory vault and context for renderer tests.

use std::collections::HashMap;

use wx_images::{ImageError, LocalImageManager, VaultReader};

use crate::card::CardDataManager;
use crate::context::{
    AssetResolver, ElementCache, PlainMathRenderer, RenderContext, RenderSettings,
    ResolvedResource,
};
use crate::error::RenderError;

/// Vault backed by a map of path to contents.
#[derive(Default)]
pub(crate) struct MockResolver {
    files: HashMap<String, Vec<u8>>,
    icons: HashMap<String, String>,
    active: Option<String>,
}

impl MockResolver {
    pub(crate) fn with_text(mut self, path: &str, text: &str) -> Self {
        self.files.insert(path.to_owned(), text.as_bytes().to_vec());
        self
    }

    pub(crate) fn with_bytes(mut self, path: &str, data: &[u8]) -> Self {
        self.files.insert(path.to_owned(), data.to_vec());
        self
    }

    pub(crate) fn with_icon(mut self, name: &str, svg: &str) -> Self {
        self.icons.insert(name.to_owned(), svg.to_owned());
        self
    }

    pub(crate) fn with_active(mut self, path: &str) -> Self {
        self.active = Some(path.to_owned());
        self
    }
}

impl VaultReader for MockResolver {
    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, ImageError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| ImageError::NotFound(path.to_owned()))
    }
}

impl AssetResolver for MockResolver {
    fn resolve_path(&self, name: &str) -> Option<ResolvedResource> {
        self.search_file(name).map(|path| ResolvedResource {
            res_url: format!("app://vault/{path}"),
            file_path: path,
        })
    }

    fn read_text(&self, path: &str) -> Result<String, RenderError> {
        let bytes = self
            .files
            .get(path)
            .ok_or_else(|| RenderError::NotFound(path.to_owned()))?;
        String::from_utf8(bytes.clone()).map_err(|_| RenderError::InvalidUtf8(path.to_owned()))
    }

    fn search_file(&self, name: &str) -> Option<String> {
        if self.files.contains_key(name) {
            return Some(name.to_owned());
        }
        let suffix = format!("/{name}");
        let mut matches: Vec<&String> = self
            .files
            .keys()
            .filter(|path| path.ends_with(&suffix))
            .collect();
        matches.sort();
        matches.first().map(|path| (*path).clone())
    }

    fn active_file(&self) -> Option<String> {
        self.active.clone()
    }

    fn load_icon(&self, name: &str) -> String {
        self.icons.get(name).cloned().unwrap_or_default()
    }
}

/// Owns everything a [`RenderContext`] borrows.
pub(crate) struct TestEnv {
    pub(crate) settings: RenderSettings,
    pub(crate) resolver: MockResolver,
    pub(crate) images: LocalImageManager,
    pub(crate) cards: CardDataManager,
    pub(crate) elements: ElementCache,
}

impl TestEnv {
    pub(crate) fn new() -> Self {
        Self::with_resolver(MockResolver::default())
    }

    pub(crate) fn with_resolver(resolver: MockResolver) -> Self {
        Self {
            settings: RenderSettings {
                line_number: false,
                ..RenderSettings::default()
            },
            resolver,
            images: LocalImageManager::new(),
            cards: CardDataManager::new(),
            elements: ElementCache::new(),
        }
    }

    pub(crate) fn context(&mut self) -> RenderContext<'_> {
        RenderContext {
            settings: &self.settings,
            resolver: &self.resolver,
            math: &PlainMathRenderer,
            images: &mut self.images,
            cards: &mut self.cards,
            elements: &mut self.elements,
        }
    }
}
