//! Error types for rekor-merkle

use thiserror::Error;

/// Which tree snapshot of a consistency proof failed to reconstruct
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Snapshot {
    /// The older, smaller tree
    First,
    /// The newer, larger tree
    Last,
}

impl std::fmt::Display for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Snapshot::First => write!(f, "first"),
            Snapshot::Last => write!(f, "last"),
        }
    }
}

/// Broad classification of an [`Error`]
///
/// Structural errors mean the input was ill-shaped and no hash was combined.
/// Mismatch errors mean a well-formed proof did not reproduce the trusted root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Structural,
    Mismatch,
}

/// Errors that can occur in Merkle tree operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Tree size is zero where leaves are required, or sizes are out of order
    #[error("Invalid tree size: {0}")]
    InvalidTreeSize(String),

    /// Leaf index outside of the tree
    #[error("Invalid leaf index: leaf index {index} >= tree size {tree_size}")]
    InvalidLeafIndex { index: u64, tree_size: u64 },

    /// A hash does not have the width produced by the hasher
    #[error("Invalid hash width for {field}: expected {expected} bytes, got {actual}")]
    InvalidHashWidth {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Proof has the wrong number of hashes for the claimed tree shape
    #[error("Invalid proof length: expected {expected} hashes, got {actual}")]
    InvalidProofLength { expected: usize, actual: usize },

    /// Input could not be decoded into a hash
    #[error("Malformed input: {0}")]
    Malformed(String),

    /// Reconstructed root does not match the trusted root
    #[error("Root hash mismatch: expected {expected}, calculated {actual}")]
    RootMismatch { expected: String, actual: String },

    /// One side of a consistency proof does not reconstruct its root
    #[error("Consistency proof mismatch on {which} root: expected {expected}, calculated {actual}")]
    ConsistencyMismatch {
        which: Snapshot,
        expected: String,
        actual: String,
    },
}

impl Error {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::RootMismatch { .. } | Error::ConsistencyMismatch { .. } => ErrorKind::Mismatch,
            Error::InvalidTreeSize(_)
            | Error::InvalidLeafIndex { .. }
            | Error::InvalidHashWidth { .. }
            | Error::InvalidProofLength { .. }
            | Error::Malformed(_) => ErrorKind::Structural,
        }
    }

    pub fn is_structural(&self) -> bool {
        self.kind() == ErrorKind::Structural
    }

    pub fn is_mismatch(&self) -> bool {
        self.kind() == ErrorKind::Mismatch
    }
}

/// Result type for Merkle tree operations
pub type Result<T> = std::result::Result<T, Error>;
