//! Error types for the re-identification process.

use thiserror::Error;

/// Errors that can occur in the reid library.
#[derive(Error, Debug)]
pub enum ReidError {
    /// Tried to cut a re-id chain at an id it does not contain.
    #[error("cannot cut chain {chain:?} at id {id}: id is not in the chain")]
    IdNotInChain { id: u64, chain: Vec<u64> },

    /// Tried to cut a re-id chain at its last element.
    #[error("cannot cut chain at id {id}: it is the last element, nothing to cut")]
    CutOnLastId { id: u64 },

    /// A raw tracker id ended up in two live re-id chains.
    #[error("tracker id {id} belongs to more than one live object")]
    DuplicateId { id: u64 },

    /// Invalid input/output position schema.
    #[error("invalid data positions: {0}")]
    InvalidSchema(String),

    /// The input block has fewer columns than the configured positions require.
    #[error("input rows have {got} columns but positions require at least {required}")]
    InputTooNarrow { required: usize, got: usize },

    /// Failure writing to the output sink.
    #[error("sink error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, ReidError>;
