//! CSS inlining for WeChat articles.
//!
//! The publishing host strips `<style>` blocks and ignores classes, so the
//! rendered article must carry its appearance in `style` attributes. This
//! crate parses a stylesheet with lightningcss into a small AST
//! ([`Stylesheet`]) and cascades it into an HTML fragment with [`apply_css`].
//!
//! # Example
//!
//! ```
//! use wx_css::apply_css;
//!
//! let html = apply_css(r#"<p style="color:red">Hi</p>"#, "p { color: blue; margin: 0 }");
//! assert_eq!(html, r#"<p style="color:red;margin:0">Hi</p>"#);
//! ```

mod ast;
pub mod dom;
mod error;
mod inline;

pub use ast::{Declaration, Rule, Stylesheet, parse_declarations};
pub use error::CssError;
pub use inline::{TOPIC_LINK_CLASS, apply_css};

/// Stylesheet for the markup produced by the renderer's extensions
/// (callouts, math blocks, embedded SVG alignment).
///
/// Placed before the theme so themes and custom CSS can override it.
pub const DEFAULT_STYLESHEET: &str = include_str!("default.css");
