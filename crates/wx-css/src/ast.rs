//! Stylesheet AST built on top of lightningcss.
//!
//! Only the subset of CSS that matters for inline styling is modelled: plain
//! style rules with a selector list and a declaration block. At-rules
//! (`@media`, `@font-face`, `@import`, `@keyframes`, ...) and nested rules are
//! dropped, since the target host cannot evaluate them on inline styles.
//!
//! Values come back in lightningcss' serialized form, so `rgb(236, 117, 0)`
//! is read as `#ec7500`.

use std::sync::{Arc, RwLock};

use lightningcss::declaration::DeclarationBlock;
use lightningcss::properties::Property;
use lightningcss::rules::CssRule;
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::traits::ToCss;
use tracing::debug;

use crate::error::CssError;

/// One `property: value [!important]` pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    /// Lowercased property name.
    pub property: String,
    /// Value with the `!important` flag removed.
    pub value: String,
    /// Whether the declaration carried `!important`.
    pub important: bool,
}

impl Declaration {
    /// Create a normal-priority declaration.
    #[must_use]
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
            important: false,
        }
    }
}

/// A rule: selector list plus declarations.
///
/// Normal declarations come first in source order, followed by the
/// `!important` ones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule {
    /// Individual selectors from the comma separated list.
    pub selectors: Vec<String>,
    /// Declarations of the rule.
    pub declarations: Vec<Declaration>,
}

/// Parsed stylesheet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stylesheet {
    /// Rules in source order.
    pub rules: Vec<Rule>,
    /// Problems encountered while parsing. The affected rule or declaration
    /// was dropped, the rest of the stylesheet is still usable.
    pub errors: Vec<CssError>,
}

impl Stylesheet {
    /// Parse a stylesheet, recovering from malformed rules.
    #[must_use]
    pub fn parse(css: &str) -> Self {
        let warnings = Arc::new(RwLock::new(Vec::new()));
        let options = ParserOptions {
            error_recovery: true,
            warnings: Some(Arc::clone(&warnings)),
            ..ParserOptions::default()
        };

        let sheet = match StyleSheet::parse(css, options) {
            Ok(sheet) => sheet,
            Err(err) => {
                return Self {
                    rules: Vec::new(),
                    errors: vec![CssError::Parse(err.to_string())],
                };
            }
        };

        let mut errors = Vec::new();
        let mut rules = Vec::new();
        for rule in &sheet.rules.0 {
            let CssRule::Style(style) = rule else {
                debug!("Skipping non-style rule");
                continue;
            };
            if !style.rules.0.is_empty() {
                debug!("Skipping {} nested rule(s)", style.rules.0.len());
            }

            let mut selectors = Vec::new();
            for selector in &style.selectors.0 {
                match selector.to_css_string(PrinterOptions::default()) {
                    Ok(text) => selectors.push(text),
                    Err(err) => errors.push(CssError::Print(err.to_string())),
                }
            }
            if selectors.is_empty() {
                continue;
            }

            rules.push(Rule {
                selectors,
                declarations: collect_declarations(&style.declarations, &mut errors),
            });
        }

        errors.extend(recovered(&warnings));
        Self { rules, errors }
    }
}

/// Parse the contents of a declaration block (or a `style` attribute).
///
/// Returns the declarations together with errors for the entries that had
/// to be dropped.
#[must_use]
pub fn parse_declarations(block: &str) -> (Vec<Declaration>, Vec<CssError>) {
    let warnings = Arc::new(RwLock::new(Vec::new()));
    let options = ParserOptions {
        error_recovery: true,
        warnings: Some(Arc::clone(&warnings)),
        ..ParserOptions::default()
    };

    let mut errors = Vec::new();
    let declarations = match DeclarationBlock::parse_string(block, options) {
        Ok(parsed) => collect_declarations(&parsed, &mut errors),
        Err(err) => {
            errors.push(CssError::Parse(format!("{err:?}")));
            Vec::new()
        }
    };
    errors.extend(recovered(&warnings));
    (declarations, errors)
}

fn collect_declarations(block: &DeclarationBlock<'_>, errors: &mut Vec<CssError>) -> Vec<Declaration> {
    let normal = block.declarations.iter().map(|property| (property, false));
    let important = block.important_declarations.iter().map(|property| (property, true));

    normal
        .chain(important)
        .filter_map(|(property, important)| match to_declaration(property, important) {
            Ok(declaration) => Some(declaration),
            Err(err) => {
                errors.push(err);
                None
            }
        })
        .collect()
}

fn to_declaration(property: &Property<'_>, important: bool) -> Result<Declaration, CssError> {
    let text = property
        .to_css_string(false, PrinterOptions::default())
        .map_err(|err| CssError::Print(err.to_string()))?;
    let (name, value) = text
        .split_once(':')
        .ok_or_else(|| CssError::Print(text.clone()))?;
    Ok(Declaration {
        property: name.trim().to_ascii_lowercase(),
        value: value.trim().to_owned(),
        important,
    })
}

/// Drain the warnings lightningcss collected while recovering.
fn recovered<T: std::fmt::Display>(warnings: &Arc<RwLock<Vec<T>>>) -> Vec<CssError> {
    warnings
        .read()
        .map(|list| {
            list.iter()
                .map(|warning| CssError::Recovered(warning.to_string()))
                .collect()
        })
        .unwrap_or_default()
}
