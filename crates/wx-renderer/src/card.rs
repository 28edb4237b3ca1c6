//! Official-account cards (`mpcard` code blocks).
//!
//! A card is written as raw HTML in an `mpcard` fence. The renderer shows a
//! styled placeholder in its place; after CSS inlining the placeholder is
//! swapped back for the original markup, which must reach the publishing
//! API untouched.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{NoExpand, Regex};
use tracing::warn;

static ID_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data-id="([^"]+)""#).expect("invalid card id regex"));
static HEADIMG_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"data-headimg="([^"]+)""#).expect("invalid card headimg regex")
});
static NICKNAME_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"data-nickname="([^"]+)""#).expect("invalid card nickname regex")
});
static SIGNATURE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"data-signature="([^"]+)""#).expect("invalid card signature regex")
});

/// Card fields shown in the placeholder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardFields {
    /// Account id; empty when missing.
    pub id: String,
    /// Avatar URL.
    pub headimg: String,
    /// Account name.
    pub nickname: String,
    /// Account description.
    pub signature: String,
}

/// Extract the card fields from raw card markup.
pub fn parse_card(raw: &str) -> CardFields {
    let capture = |re: &Regex| {
        re.captures(raw)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_owned())
    };
    CardFields {
        id: capture(&ID_ATTR).unwrap_or_default(),
        headimg: capture(&HEADIMG_ATTR).unwrap_or_default(),
        nickname: capture(&NICKNAME_ATTR).unwrap_or_else(|| "公众号名称".to_owned()),
        signature: capture(&SIGNATURE_ATTR).unwrap_or_else(|| "公众号介绍".to_owned()),
    }
}

/// Placeholder markup for a card.
pub fn card_placeholder(card: &CardFields) -> String {
    format!(
        concat!(
            r#"<section data-id="{id}" class="note-mpcard-wrapper">"#,
            r#"<div class="note-mpcard-content">"#,
            r#"<img class="note-mpcard-headimg" width="54" height="54" src="{headimg}"></img>"#,
            r#"<div class="note-mpcard-info">"#,
            r#"<div class="note-mpcard-nickname">{nickname}</div>"#,
            r#"<div class="note-mpcard-signature">{signature}</div>"#,
            r#"</div></div>"#,
            r#"<div class="note-mpcard-foot">公众号</div>"#,
            r#"</section>"#,
        ),
        id = card.id,
        headimg = card.headimg,
        nickname = card.nickname,
        signature = card.signature,
    )
}

/// Raw card markup keyed by card id.
#[derive(Clone, Debug, Default)]
pub struct CardDataManager {
    cards: BTreeMap<String, String>,
}

impl CardDataManager {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the raw markup of card `id`. A later call for the same id
    /// replaces the markup.
    pub fn set_card_data(&mut self, id: impl Into<String>, raw: impl Into<String>) {
        self.cards.insert(id.into(), raw.into());
    }

    /// Raw markup of card `id`.
    pub fn get(&self, id: &str) -> Option<&str> {
        self.cards.get(id).map(String::as_str)
    }

    /// Replace every card placeholder in `html` with the stored raw markup.
    ///
    /// Cards whose placeholder is not found are skipped with a warning.
    pub fn restore_card(&self, html: &str) -> String {
        let mut html = html.to_owned();
        for (id, raw) in &self.cards {
            let pattern = format!(
                r#"(?s)<section[^>]*\sdata-id="{}"[^>]*>(.*?)</section>"#,
                regex::escape(id)
            );
            let re = match Regex::new(&pattern) {
                Ok(re) => re,
                Err(err) => {
                    warn!("Invalid card pattern for {id}: {err}");
                    continue;
                }
            };
            if !re.is_match(&html) {
                warn!("没有公众号信息：{id}");
                continue;
            }
            html = re.replace_all(&html, NoExpand(raw)).into_owned();
        }
        html
    }

    /// Forget all cards.
    pub fn cleanup(&mut self) {
        self.cards.clear();
    }
}
