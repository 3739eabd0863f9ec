//! In-memory reference Merkle tree
//!
//! Computes roots and proofs directly from the recursive definitions in
//! RFC 6962 section 2.1 (`MTH`, `PATH`, `PROOF`). Every call recomputes the
//! subtree roots it needs from the leaf hashes.

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::hasher::Hasher;
use crate::tree::split_point;

/// A Merkle tree over leaves held in memory
#[derive(Debug, Clone)]
pub struct MerkleTree<H: Hasher> {
    hasher: H,
    leaves: Vec<Hash>,
}

impl<H: Hasher> MerkleTree<H> {
    /// Create an empty tree
    pub fn new(hasher: H) -> Self {
        Self {
            hasher,
            leaves: Vec::new(),
        }
    }

    /// Build a tree from raw leaf data
    pub fn from_leaves<I, T>(hasher: H, data: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let mut tree = Self::new(hasher);
        for leaf in data {
            tree.push(leaf.as_ref());
        }
        tree
    }

    /// Append a leaf and return its index
    pub fn push(&mut self, data: &[u8]) -> u64 {
        self.leaves.push(self.hasher.hash_leaf(data));
        self.leaves.len() as u64 - 1
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Number of leaves
    pub fn size(&self) -> u64 {
        self.leaves.len() as u64
    }

    /// Leaf hash at `index`
    pub fn leaf_hash(&self, index: u64) -> Option<&Hash> {
        self.leaves.get(usize::try_from(index).ok()?)
    }

    /// Root of the whole tree
    pub fn root(&self) -> Hash {
        self.subtree_root(&self.leaves)
    }

    /// Root of the tree formed by the first `size` leaves
    pub fn root_at(&self, size: u64) -> Result<Hash> {
        Ok(self.subtree_root(self.prefix(size)?))
    }

    /// Inclusion proof for leaf `index` in the tree of the first `size` leaves
    pub fn inclusion_proof(&self, index: u64, size: u64) -> Result<Vec<Hash>> {
        let leaves = self.prefix(size)?;
        if index >= size {
            return Err(Error::InvalidLeafIndex {
                index,
                tree_size: size,
            });
        }
        let mut proof = Vec::new();
        self.path(index as usize, leaves, &mut proof);
        Ok(proof)
    }

    /// Consistency proof between the first `first_size` and `last_size` leaves
    pub fn consistency_proof(&self, first_size: u64, last_size: u64) -> Result<Vec<Hash>> {
        let leaves = self.prefix(last_size)?;
        if first_size == 0 || first_size > last_size {
            return Err(Error::InvalidTreeSize(format!(
                "cannot prove consistency from {} to {}",
                first_size, last_size
            )));
        }
        let mut proof = Vec::new();
        if first_size < last_size {
            self.subproof(first_size as usize, leaves, true, &mut proof);
        }
        Ok(proof)
    }

    fn prefix(&self, size: u64) -> Result<&[Hash]> {
        usize::try_from(size)
            .ok()
            .and_then(|size| self.leaves.get(..size))
            .ok_or_else(|| {
                Error::InvalidTreeSize(format!(
                    "size {} exceeds the {} leaves in the tree",
                    size,
                    self.leaves.len()
                ))
            })
    }

    /// MTH(D[n])
    fn subtree_root(&self, leaves: &[Hash]) -> Hash {
        match leaves.len() {
            0 => self.hasher.empty_root(),
            1 => leaves[0].clone(),
            n => {
                let k = split_point(n as u64) as usize;
                let left = self.subtree_root(&leaves[..k]);
                let right = self.subtree_root(&leaves[k..]);
                self.hasher.node_digest(left.as_bytes(), right.as_bytes())
            }
        }
    }

    /// PATH(m, D[n])
    fn path(&self, m: usize, leaves: &[Hash], proof: &mut Vec<Hash>) {
        let n = leaves.len();
        if n <= 1 {
            return;
        }
        let k = split_point(n as u64) as usize;
        if m < k {
            self.path(m, &leaves[..k], proof);
            proof.push(self.subtree_root(&leaves[k..]));
        } else {
            self.path(m - k, &leaves[k..], proof);
            proof.push(self.subtree_root(&leaves[..k]));
        }
    }

    /// SUBPROOF(m, D[n], b)
    fn subproof(&self, m: usize, leaves: &[Hash], complete: bool, proof: &mut Vec<Hash>) {
        let n = leaves.len();
        if m == n {
            if !complete {
                proof.push(self.subtree_root(leaves));
            }
            return;
        }
        let k = split_point(n as u64) as usize;
        if m <= k {
            self.subproof(m, &leaves[..k], complete, proof);
            proof.push(self.subtree_root(&leaves[k..]));
        } else {
            self.subproof(m - k, &leaves[k..], false, proof);
            proof.push(self.subtree_root(&leaves[..k]));
        }
    }
}
