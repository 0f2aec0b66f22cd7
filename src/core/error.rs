use thiserror::Error;

/// Errors surfaced by parsing, loading and pattern lookup.
///
/// Parsing/loading failures are fatal for the whole call: nothing is
/// partially applied to the model. A failed single-pattern lookup leaves
/// model state untouched.
#[derive(Debug, Error)]
pub enum BpError {
    /// Malformed network specification or weight file.
    #[error("format error: {0}")]
    Format(String),

    /// Pattern vector width disagrees with the declared architecture.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Single-pattern reference matched nothing.
    #[error("invalid pattern reference: {0:?}")]
    PatternReference(String),

    /// Training or testing was requested before any patterns were loaded.
    #[error("no patterns loaded")]
    NoPatterns,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BpError>;
