use std::path::PathBuf;

use thiserror::Error;

use crate::record::RecordId;

/// Failures raised by a record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("schema violation in {collection}: {message}")]
    Schema {
        collection: &'static str,
        message: String,
    },

    #[error("record {id} already exists in {collection}")]
    DuplicateId {
        collection: &'static str,
        id: RecordId,
    },

    #[error("record {actual} cannot be written to {collection} as {expected}")]
    IdMismatch {
        collection: &'static str,
        expected: RecordId,
        actual: RecordId,
    },

    #[error("snapshot i/o failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot encoding failed for {collection}: {source}")]
    Serialization {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;
