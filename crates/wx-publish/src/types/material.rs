//! Permanent material types.

use serde::Deserialize;

use super::ApiStatus;

/// One page of the permanent image library.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MaterialList {
    /// Materials of the requested type.
    #[serde(default)]
    pub total_count: u32,
    /// Materials in this page.
    #[serde(default)]
    pub item_count: u32,
    /// The materials.
    #[serde(default)]
    pub item: Vec<MaterialItem>,
    /// Error fields.
    #[serde(flatten)]
    pub status: ApiStatus,
}

/// A stored material.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MaterialItem {
    /// Media id.
    pub media_id: String,
    /// File name.
    #[serde(default)]
    pub name: String,
    /// Hosted URL.
    #[serde(default)]
    pub url: String,
}
