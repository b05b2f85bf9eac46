use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Schema lookup with a field name outside the schema.
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// A document lacked a field the schema marks required. The build that
    /// hit it is abandoned; no partial index is published.
    #[error("document {doc_ord} is missing required field '{field}'")]
    MissingRequiredField { doc_ord: u32, field: String },

    /// The query tokenized to nothing in every searched field.
    #[error("query produced no terms in any searched field")]
    EmptyQuery,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The on-disk index was written by an incompatible format version.
    #[error("index format version {found} unsupported (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Encode(#[from] bincode::Error),
}
