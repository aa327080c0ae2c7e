//! # Error Types

/// Errors from nettrans operations.
#[derive(Debug, thiserror::Error)]
pub enum NetTransError {
    /// A caller-supplied argument is out of its valid range.
    ///
    /// Raised before any oracle invocation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A symbol has no entry in the table (only under strict vectorization).
    #[error("unknown symbol: {0:?}")]
    UnknownSymbol(String),

    /// An index has no entry in the table.
    ///
    /// This indicates a corrupt table, or a model/vocab mismatch.
    #[error("unknown index: {0}")]
    UnknownIndex(u64),

    /// The scoring oracle failed, or returned malformed output.
    #[error("oracle failure: {0}")]
    Oracle(String),

    /// A corpus record could not be split into a source and target symbols.
    #[error("corpus format error at line {line}: {message}")]
    CorpusFormat {
        /// The 1-based line number of the bad record.
        line: usize,

        /// What was wrong with the record.
        message: String,
    },

    /// A persisted symbol table is internally inconsistent.
    #[error("corrupt symbol table: {0}")]
    CorruptTable(String),

    /// No transliterator is registered for the language.
    #[error("unsupported language: {0:?}")]
    UnknownLanguage(String),

    /// Index value out of range for the target index type.
    #[error("index out of range: {0}")]
    IndexOutOfRange(usize),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type for nettrans operations.
pub type NTResult<T> = core::result::Result<T, NetTransError>;

impl NetTransError {
    /// Build an [`NetTransError::InvalidArgument`].
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Build an [`NetTransError::Oracle`].
    pub fn oracle<S: Into<String>>(message: S) -> Self {
        Self::Oracle(message.into())
    }

    /// Build an [`NetTransError::CorruptTable`].
    pub fn corrupt_table<S: Into<String>>(message: S) -> Self {
        Self::CorruptTable(message.into())
    }

    /// Is this a caller error (bad arguments) rather than a runtime failure?
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NetTransError::CorpusFormat {
            line: 3,
            message: "missing target symbols".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "corpus format error at line 3: missing target symbols"
        );

        let err = NetTransError::invalid_argument("beam_size must be >= 1");
        assert!(err.is_invalid_argument());
        assert_eq!(err.to_string(), "invalid argument: beam_size must be >= 1");

        assert!(!NetTransError::UnknownIndex(7).is_invalid_argument());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: NetTransError = io.into();
        assert!(matches!(err, NetTransError::Io(_)));
    }
}
