use std::path::PathBuf;
use thiserror::Error;

/// Per-file SSIS ingestion failures. Every variant is recoverable: the
/// caller logs it and continues with the next file.
#[derive(Debug, Error)]
pub enum SsisParseError {
    #[error("failed to parse {file}: {cause}")]
    ParseError { file: PathBuf, cause: String },

    #[error("{file}: required element/attribute missing: {what}")]
    MissingEndpoint { file: PathBuf, what: String },

    #[error("{file}: unrecognized {field} value {value:?}, falling back to a default")]
    UnknownKind {
        file: PathBuf,
        field: &'static str,
        value: String,
    },
}
