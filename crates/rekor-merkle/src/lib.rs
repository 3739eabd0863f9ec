//! RFC 6962 Merkle tree verification for transparency logs
//!
//! This crate implements the proof-verification engine used to audit a
//! Rekor-style log: leaf and node hashing, the tree math that fixes the
//! shape of a proof, and inclusion and consistency proof verification.
//!
//! Every operation takes a [`Hasher`] so the hashing convention is supplied
//! by the caller. Nothing here performs I/O or keeps state between calls.

pub mod builder;
pub mod error;
pub mod hash;
pub mod hasher;
pub mod proof;
pub mod tree;

pub use builder::MerkleTree;
pub use error::{Error, ErrorKind, Result, Snapshot};
pub use hash::Hash;
pub use hasher::{DefaultHasher, Hasher, Rfc6962Hasher, LEAF_HASH_PREFIX, NODE_HASH_PREFIX};
pub use proof::{
    root_from_inclusion_proof, verify_consistency, verify_inclusion, ConsistencyProof,
    InclusionProof,
};
pub use tree::{ConsistencyShape, InclusionShape};
