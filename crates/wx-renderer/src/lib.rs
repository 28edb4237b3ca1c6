//! Obsidian-flavoured markdown renderer for WeChat articles.
//!
//! [`MarkedParser`] turns a note into article HTML. On top of standard
//! markdown it understands:
//!
//! - callouts (`> [!type] Title`), rendered as styled sections;
//! - `![[...]]` embeds of vault images, SVG drawings, notes, note sections
//!   (`Note#Heading`) and referenced blocks (`Note#^id`);
//! - fenced math (`latex`, `asciimath`), `mermaid` diagrams and `mpcard`
//!   account cards, plus `$...$` math;
//! - `==highlights==`, `%%comments%%`, `#topics` and block ids.
//!
//! Everything the renderer reads or records goes through a
//! [`RenderContext`]: the vault ([`AssetResolver`]), math typesetting
//! ([`MathRenderer`]), and the registries of images
//! ([`LocalImageManager`](wx_images::LocalImageManager)), cards
//! ([`CardDataManager`]) and client-side elements ([`ElementCache`]) that
//! later pipeline stages consume.

mod callout;
mod card;
mod code;
mod context;
mod embed;
mod error;
mod extension;
mod fence;
mod link;
mod parser;
mod preprocess;
mod state;
#[cfg(test)]
mod test_support;

pub use callout::{CalloutInfo, CalloutParts, CalloutRenderer, builtin_callout, parse_callout};
pub use card::{CardDataManager, CardFields, card_placeholder, parse_card};
pub use code::CodeRenderer;
pub use context::{
    AssetResolver, ElementCache, EmbedStyle, LinkStyle, MathRenderer, MathSyntax,
    PlainMathRenderer, RenderContext, RenderSettings, ResolvedResource,
};
pub use embed::EmbedRenderer;
pub use error::RenderError;
pub use extension::{Extension, RenderedBlock};
pub use link::LinkRenderer;
pub use parser::MarkedParser;
pub use state::escape_html;
