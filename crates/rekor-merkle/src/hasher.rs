//! Merkle tree hashing
//!
//! Implements RFC 6962 compliant Merkle tree hashing with:
//! - Domain separation via prefixes (0x00 for leaf, 0x01 for node)
//! - A pluggable digest, SHA-256 by default

use crate::error::{Error, Result};
use crate::hash::Hash;
use sha2::{Digest, Sha256};
use std::marker::PhantomData;

/// Prefix for leaf nodes in RFC 6962 Merkle tree
pub const LEAF_HASH_PREFIX: u8 = 0x00;

/// Prefix for internal nodes in RFC 6962 Merkle tree
pub const NODE_HASH_PREFIX: u8 = 0x01;

/// The hashing convention of a log
///
/// Verifiers never hardcode a digest or prefix; they receive one of these.
pub trait Hasher {
    /// Width in bytes of every hash this hasher produces
    fn size(&self) -> usize;

    /// Hash a leaf's raw bytes
    fn hash_leaf(&self, data: &[u8]) -> Hash;

    /// Hash two child digests without checking their width
    ///
    /// Callers must have validated both inputs with [`Hasher::check_width`].
    fn node_digest(&self, left: &[u8], right: &[u8]) -> Hash;

    /// Root hash of a tree with no leaves
    fn empty_root(&self) -> Hash;

    /// Ensure `hash` has the width this hasher produces
    fn check_width(&self, field: &'static str, hash: &Hash) -> Result<()> {
        if hash.len() != self.size() {
            return Err(Error::InvalidHashWidth {
                field,
                expected: self.size(),
                actual: hash.len(),
            });
        }
        Ok(())
    }

    /// Hash two child nodes to create a parent node
    fn hash_children(&self, left: &Hash, right: &Hash) -> Result<Hash> {
        self.check_width("left child", left)?;
        self.check_width("right child", right)?;
        Ok(self.node_digest(left.as_bytes(), right.as_bytes()))
    }
}

/// RFC 6962 hasher over any `sha2`-family digest
///
/// Leaves hash as `D(leaf_prefix || data)`, nodes as
/// `D(node_prefix || left || right)`.
pub struct Rfc6962Hasher<D = Sha256> {
    leaf_prefix: u8,
    node_prefix: u8,
    digest: PhantomData<fn() -> D>,
}

// Manual impls: the digest type is a marker and need not be Clone or Debug.
impl<D> Clone for Rfc6962Hasher<D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D> Copy for Rfc6962Hasher<D> {}

impl<D> std::fmt::Debug for Rfc6962Hasher<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rfc6962Hasher")
            .field("leaf_prefix", &self.leaf_prefix)
            .field("node_prefix", &self.node_prefix)
            .finish()
    }
}

/// SHA-256 RFC 6962 hasher, the convention used by Rekor
pub type DefaultHasher = Rfc6962Hasher<Sha256>;

impl<D: Digest> Rfc6962Hasher<D> {
    /// Hasher with the standard RFC 6962 prefixes
    pub fn new() -> Self {
        Self::with_prefixes(LEAF_HASH_PREFIX, NODE_HASH_PREFIX)
    }

    /// Hasher with custom domain separation prefixes
    pub fn with_prefixes(leaf_prefix: u8, node_prefix: u8) -> Self {
        Self {
            leaf_prefix,
            node_prefix,
            digest: PhantomData,
        }
    }

    pub fn leaf_prefix(&self) -> u8 {
        self.leaf_prefix
    }

    pub fn node_prefix(&self) -> u8 {
        self.node_prefix
    }
}

impl<D: Digest> Default for Rfc6962Hasher<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Digest> Hasher for Rfc6962Hasher<D> {
    fn size(&self) -> usize {
        <D as Digest>::output_size()
    }

    fn hash_leaf(&self, data: &[u8]) -> Hash {
        let mut hasher = D::new();
        hasher.update([self.leaf_prefix]);
        hasher.update(data);
        Hash::from_bytes(hasher.finalize().to_vec())
    }

    fn node_digest(&self, left: &[u8], right: &[u8]) -> Hash {
        let mut hasher = D::new();
        hasher.update([self.node_prefix]);
        hasher.update(left);
        hasher.update(right);
        Hash::from_bytes(hasher.finalize().to_vec())
    }

    fn empty_root(&self) -> Hash {
        Hash::from_bytes(D::digest(b"").to_vec())
    }
}
