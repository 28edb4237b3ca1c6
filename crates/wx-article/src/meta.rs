//! Article metadata from note front matter.

use serde::{Deserialize, Deserializer};
use tracing::warn;
use wx_publish::DraftArticle;

/// Cover crops applied when `crop` is set: top half for the wide card, the
/// left part of the lower half for the square one.
const CROP_235_1: &str = "0_0_1_0.5";
const CROP_1_1: &str = "0_0.525_0.404_1";

/// Longest digest derived from the title.
const DIGEST_LEN: usize = 100;

/// Front matter fields understood by the publisher.
///
/// Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ArticleMeta {
    /// Article title.
    pub title: Option<String>,
    /// Author.
    pub author: Option<String>,
    /// Summary.
    pub digest: Option<String>,
    /// "Read more" link.
    pub content_source_url: Option<String>,
    /// Cover image: `![[name]]` or a vault path.
    pub cover: Option<String>,
    /// Media id of an already uploaded cover.
    pub thumb_media_id: Option<String>,
    /// Open comments.
    #[serde(deserialize_with = "truthy")]
    pub need_open_comment: bool,
    /// Restrict comments to followers.
    #[serde(deserialize_with = "truthy")]
    pub only_fans_can_comment: bool,
    /// Crop the cover for share cards.
    #[serde(deserialize_with = "truthy")]
    pub crop: bool,
    /// Vault path of a stylesheet replacing the configured theme.
    pub theme: Option<String>,
}

impl ArticleMeta {
    /// Metadata of a note. Notes without front matter, or with front matter
    /// that is not valid YAML, get empty metadata.
    pub fn from_markdown(markdown: &str) -> Self {
        let Some(yaml) = front_matter(markdown) else {
            return Self::default();
        };
        if yaml.trim().is_empty() {
            return Self::default();
        }
        serde_yaml::from_str(yaml).unwrap_or_else(|err| {
            warn!("Ignoring invalid front matter: {err}");
            Self::default()
        })
    }

    /// Title, falling back to `fallback` (the note name).
    pub fn title_or(&self, fallback: &str) -> String {
        non_empty(self.title.as_ref()).unwrap_or(fallback).to_owned()
    }

    /// Draft article for `content` with cover `thumb_media_id`.
    pub fn to_draft(&self, fallback_title: &str, content: String, thumb_media_id: &str) -> DraftArticle {
        let title = self.title_or(fallback_title);
        let digest = non_empty(self.digest.as_ref())
            .map_or_else(|| title.chars().take(DIGEST_LEN).collect(), ToOwned::to_owned);
        let (pic_crop_235_1, pic_crop_1_1) = if self.crop {
            (CROP_235_1.to_owned(), CROP_1_1.to_owned())
        } else {
            (String::new(), String::new())
        };

        DraftArticle {
            author: self.author.clone().unwrap_or_default(),
            digest,
            content,
            content_source_url: self.content_source_url.clone().unwrap_or_default(),
            thumb_media_id: thumb_media_id.to_owned(),
            need_open_comment: u8::from(self.need_open_comment),
            only_fans_can_comment: u8::from(self.only_fans_can_comment),
            pic_crop_235_1,
            pic_crop_1_1,
            title,
        }
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

/// YAML between a leading `---` line and the next `---` line.
fn front_matter(markdown: &str) -> Option<&str> {
    let rest = markdown
        .strip_prefix("---")
        .and_then(|rest| rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n")))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some(&rest[..offset]);
        }
        offset += line.len();
    }
    None
}

/// Any YAML value, read the way a note author means it: `false`, `0`,
/// empty strings and `null` are false, everything else is true.
fn truthy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = serde_yaml::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_yaml::Value::Null => false,
        serde_yaml::Value::Bool(b) => b,
        serde_yaml::Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        serde_yaml::Value::String(s) => !s.is_empty() && s != "false" && s != "0",
        _ => true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_no_front_matter() {
        assert_eq!(ArticleMeta::from_markdown("# Title\ntext"), ArticleMeta::default());
        assert_eq!(ArticleMeta::from_markdown("---\nunclosed"), ArticleMeta::default());
    }

    #[test]
    fn test_parse_fields() {
        let md = "---\ntitle: 我的文章\nauthor: Ann\ncover: \"![[cover.png]]\"\nneed_open_comment: 1\ncrop: true\ntags: [a, b]\n---\n# Body";
        let meta = ArticleMeta::from_markdown(md);
        assert_eq!(meta.title.as_deref(), Some("我的文章"));
        assert_eq!(meta.author.as_deref(), Some("Ann"));
        assert_eq!(meta.cover.as_deref(), Some("![[cover.png]]"));
        assert!(meta.need_open_comment);
        assert!(!meta.only_fans_can_comment);
        assert!(meta.crop);
    }

    #[test]
    fn test_invalid_yaml_ignored() {
        let meta = ArticleMeta::from_markdown("---\ntitle: [unclosed\n---\nbody");
        assert_eq!(meta, ArticleMeta::default());
    }

    #[test]
    fn test_to_draft_defaults() {
        let meta = ArticleMeta::default();
        let draft = meta.to_draft("Note Name", "<p>x</p>".to_owned(), "thumb");
        assert_eq!(draft.title, "Note Name");
        assert_eq!(draft.digest, "Note Name");
        assert_eq!(draft.thumb_media_id, "thumb");
        assert_eq!(draft.need_open_comment, 0);
        assert!(draft.pic_crop_1_1.is_empty());
    }

    #[test]
    fn test_to_draft_uses_meta() {
        let meta = ArticleMeta {
            title: Some("T".to_owned()),
            digest: Some("D".to_owned()),
            only_fans_can_comment: true,
            crop: true,
            ..Default::default()
        };
        let draft = meta.to_draft("fallback", String::new(), "m");
        assert_eq!(draft.title, "T");
        assert_eq!(draft.digest, "D");
        assert_eq!(draft.only_fans_can_comment, 1);
        assert_eq!(draft.pic_crop_235_1, "0_0_1_0.5");
        assert_eq!(draft.pic_crop_1_1, "0_0.525_0.404_1");
    }

    #[test]
    fn test_digest_truncated_by_chars() {
        let title = "长".repeat(150);
        let draft = ArticleMeta::default().to_draft(&title, String::new(), "");
        assert_eq!(draft.digest.chars().count(), 100);
    }
}
