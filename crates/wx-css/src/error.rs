//! Error types for stylesheet parsing and selector compilation.

/// Error raised while reading a stylesheet or compiling a selector.
///
/// Parsing is lenient: a malformed rule is skipped and the error is recorded
/// on the [`Stylesheet`](crate::Stylesheet) instead of aborting the parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CssError {
    /// The input could not be parsed at all.
    #[error("invalid stylesheet: {0}")]
    Parse(String),

    /// A rule or declaration the parser dropped while recovering.
    #[error("skipped invalid CSS: {0}")]
    Recovered(String),

    /// A parsed selector or value that could not be serialized back.
    #[error("cannot serialize CSS: {0}")]
    Print(String),

    /// A selector the matching engine does not understand.
    #[error("unsupported selector `{0}`")]
    InvalidSelector(String),
}
