//! Errors raised by the query and result parsers

/// The scanner reached a position its grammar does not allow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (at byte {position})")]
pub struct LexError {
    /// Human readable description of what was expected
    pub message: String,
    /// Byte offset in the input where scanning stopped
    pub position: usize,
}

impl LexError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

/// Failure of a parse or serialization call.
///
/// Every variant aborts the whole call; no partial result is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),

    /// A `name:` flag whose name is neither `file` nor `case`
    #[error("unsupported flag: {0}")]
    UnsupportedFlag(String),

    /// A flag at the end of the query with nothing after it
    #[error("flag `{0}` is missing a value")]
    MissingFlagValue(String),

    /// Building runner arguments from a query without terms
    #[error("no query to run")]
    EmptyQuery,
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lex_error_display() {
        let err = LexError::new("expected a filename", 10);
        assert_eq!(err.to_string(), "expected a filename (at byte 10)");
        assert_eq!(
            Error::from(err).to_string(),
            "lex error: expected a filename (at byte 10)"
        );
    }
}
