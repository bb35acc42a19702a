use std::path::PathBuf;
use thiserror::Error;

/// Per-file Informatica ingestion failures. Every variant is recoverable:
/// the caller logs it and continues with the next file.
#[derive(Debug, Error)]
pub enum InformaticaParseError {
    #[error("failed to parse {file}: {cause}")]
    ParseError { file: PathBuf, cause: String },

    #[error("{workflow}: could not locate a mapping file for session {session:?} (tried {candidate})")]
    MissingMapping {
        workflow: PathBuf,
        session: String,
        candidate: String,
    },

    #[error("{file}: unrecognized {field} value {value:?}, falling back to a default")]
    UnknownKind {
        file: PathBuf,
        field: &'static str,
        value: String,
    },
}
