//! Merkle proof verification
//!
//! Implements inclusion proof and consistency proof verification as specified in RFC 6962.
//! All structural checks (sizes, indices, hash widths, proof lengths) run before any
//! hash is combined, so a structural error never hides a mismatch and vice versa.

use crate::error::{Error, Result, Snapshot};
use crate::hash::Hash;
use crate::hasher::Hasher;
use crate::tree::{decompose_consistency_proof, decompose_inclusion_proof};
use serde::{Deserialize, Serialize};

/// Claim that a leaf is part of a tree with a given root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InclusionProof {
    /// Index of the leaf in the tree (0-based)
    pub leaf_index: u64,
    /// Total number of leaves in the tree
    pub tree_size: u64,
    /// Sibling hashes from the leaf up to the root
    pub hashes: Vec<Hash>,
    /// Root hash the proof commits to
    pub root_hash: Hash,
}

impl InclusionProof {
    /// Verify that `leaf_hash` is the leaf this proof describes
    ///
    /// `root_hash` must have come from a trusted source; the proof hashes need not.
    pub fn verify<H: Hasher + ?Sized>(&self, hasher: &H, leaf_hash: &Hash) -> Result<()> {
        verify_inclusion(
            hasher,
            self.leaf_index,
            self.tree_size,
            leaf_hash,
            &self.hashes,
            &self.root_hash,
        )
    }
}

/// Claim that the tree of `last_size` leaves extends the tree of `first_size` leaves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyProof {
    pub first_size: u64,
    pub last_size: u64,
    pub hashes: Vec<Hash>,
    pub first_root: Hash,
    pub last_root: Hash,
}

impl ConsistencyProof {
    pub fn verify<H: Hasher + ?Sized>(&self, hasher: &H) -> Result<()> {
        verify_consistency(
            hasher,
            self.first_size,
            self.last_size,
            &self.hashes,
            &self.first_root,
            &self.last_root,
        )
    }
}

fn check_proof_widths<H: Hasher + ?Sized>(hasher: &H, proof: &[Hash]) -> Result<()> {
    proof
        .iter()
        .try_for_each(|hash| hasher.check_width("proof hash", hash))
}

/// Compute the root hash implied by an inclusion proof
///
/// # Arguments
/// * `hasher` - The log's hashing convention
/// * `leaf_index` - Index of the leaf in the tree (0-based)
/// * `tree_size` - Total number of leaves in the tree
/// * `leaf_hash` - The hash of the leaf entry
/// * `proof_hashes` - The hashes in the inclusion proof path
///
/// # Returns
/// * `Ok(root)` if the proof is well-formed
/// * `Err(...)` with a structural error otherwise
pub fn root_from_inclusion_proof<H: Hasher + ?Sized>(
    hasher: &H,
    leaf_index: u64,
    tree_size: u64,
    leaf_hash: &Hash,
    proof_hashes: &[Hash],
) -> Result<Hash> {
    if tree_size == 0 {
        return Err(Error::InvalidTreeSize(
            "tree size cannot be zero".to_string(),
        ));
    }

    if leaf_index >= tree_size {
        return Err(Error::InvalidLeafIndex {
            index: leaf_index,
            tree_size,
        });
    }

    hasher.check_width("leaf hash", leaf_hash)?;
    check_proof_widths(hasher, proof_hashes)?;

    let shape = decompose_inclusion_proof(leaf_index, tree_size);
    if proof_hashes.len() != shape.len() {
        return Err(Error::InvalidProofLength {
            expected: shape.len(),
            actual: proof_hashes.len(),
        });
    }

    let (inner, border) = proof_hashes.split_at(shape.inner);
    let hash = chain_inner(hasher, leaf_hash, inner, leaf_index);
    Ok(chain_border_right(hasher, hash, border))
}

/// Verify an inclusion proof for a leaf in a Merkle tree
///
/// # Arguments
/// * `hasher` - The log's hashing convention
/// * `leaf_index` - Index of the leaf in the tree (0-based)
/// * `tree_size` - Total number of leaves in the tree
/// * `leaf_hash` - The hash of the leaf entry
/// * `proof_hashes` - The hashes in the inclusion proof path
/// * `expected_root` - The expected root hash to verify against
///
/// # Returns
/// * `Ok(())` if the proof is valid
/// * `Err(...)` if the proof is invalid
pub fn verify_inclusion<H: Hasher + ?Sized>(
    hasher: &H,
    leaf_index: u64,
    tree_size: u64,
    leaf_hash: &Hash,
    proof_hashes: &[Hash],
    expected_root: &Hash,
) -> Result<()> {
    hasher.check_width("expected root", expected_root)?;
    let hash = root_from_inclusion_proof(hasher, leaf_index, tree_size, leaf_hash, proof_hashes)?;

    if &hash != expected_root {
        return Err(Error::RootMismatch {
            expected: expected_root.to_hex(),
            actual: hash.to_hex(),
        });
    }

    tracing::debug!(leaf_index, tree_size, "inclusion proof verified");
    Ok(())
}

/// Verify a consistency proof between two tree states
///
/// # Arguments
/// * `hasher` - The log's hashing convention
/// * `first_size` - Size of the older tree, at least 1
/// * `last_size` - Size of the newer tree
/// * `proof_hashes` - The hashes in the consistency proof
/// * `first_root` - Root hash of the older tree
/// * `last_root` - Root hash of the newer tree
///
/// # Returns
/// * `Ok(())` if the proof is valid
/// * `Err(...)` if the proof is invalid
pub fn verify_consistency<H: Hasher + ?Sized>(
    hasher: &H,
    first_size: u64,
    last_size: u64,
    proof_hashes: &[Hash],
    first_root: &Hash,
    last_root: &Hash,
) -> Result<()> {
    if first_size > last_size {
        return Err(Error::InvalidTreeSize(format!(
            "first size {} > last size {}",
            first_size, last_size
        )));
    }

    if first_size == 0 {
        return Err(Error::InvalidTreeSize(
            "first size cannot be zero in a consistency claim".to_string(),
        ));
    }

    hasher.check_width("first root", first_root)?;
    hasher.check_width("last root", last_root)?;
    check_proof_widths(hasher, proof_hashes)?;

    if first_size == last_size {
        if !proof_hashes.is_empty() {
            return Err(Error::InvalidProofLength {
                expected: 0,
                actual: proof_hashes.len(),
            });
        }
        if first_root != last_root {
            return Err(Error::RootMismatch {
                expected: first_root.to_hex(),
                actual: last_root.to_hex(),
            });
        }
        tracing::debug!(first_size, "consistency verified for identical snapshots");
        return Ok(());
    }

    let shape = decompose_consistency_proof(first_size, last_size)?;
    if proof_hashes.len() != shape.len() {
        return Err(Error::InvalidProofLength {
            expected: shape.len(),
            actual: proof_hashes.len(),
        });
    }

    // The seed is the root of the largest complete subtree ending at the
    // old tree's last leaf. It is the old root itself when the old size is a
    // power of two.
    let (seed, proof) = if shape.seed_in_proof {
        (&proof_hashes[0], &proof_hashes[1..])
    } else {
        (first_root, proof_hashes)
    };
    let (inner, border) = proof.split_at(shape.inner);

    // The old tree only contains the left siblings
    let hash1 = chain_inner_right(hasher, seed, inner, shape.mask);
    let calc_first_root = chain_border_right(hasher, hash1, border);
    if &calc_first_root != first_root {
        return Err(Error::ConsistencyMismatch {
            which: Snapshot::First,
            expected: first_root.to_hex(),
            actual: calc_first_root.to_hex(),
        });
    }

    let hash2 = chain_inner(hasher, seed, inner, shape.mask);
    let calc_last_root = chain_border_right(hasher, hash2, border);
    if &calc_last_root != last_root {
        return Err(Error::ConsistencyMismatch {
            which: Snapshot::Last,
            expected: last_root.to_hex(),
            actual: calc_last_root.to_hex(),
        });
    }

    tracing::debug!(first_size, last_size, "consistency proof verified");
    Ok(())
}

/// Chain hashes along the inner proof path
///
/// Bit `i` of `index` says whether the running hash is a right child at level `i`.
fn chain_inner<H: Hasher + ?Sized>(hasher: &H, seed: &Hash, proof: &[Hash], index: u64) -> Hash {
    let mut hash = seed.clone();
    for (i, p) in proof.iter().enumerate() {
        hash = if (index >> i) & 1 == 0 {
            hasher.node_digest(hash.as_bytes(), p.as_bytes())
        } else {
            hasher.node_digest(p.as_bytes(), hash.as_bytes())
        };
    }
    hash
}

/// Chain only the left siblings along the inner proof path
///
/// Right siblings are leaves appended after the old tree, so they are skipped.
fn chain_inner_right<H: Hasher + ?Sized>(
    hasher: &H,
    seed: &Hash,
    proof: &[Hash],
    index: u64,
) -> Hash {
    let mut hash = seed.clone();
    for (i, p) in proof.iter().enumerate() {
        if (index >> i) & 1 == 1 {
            hash = hasher.node_digest(p.as_bytes(), hash.as_bytes());
        }
    }
    hash
}

/// Chain hashes along the right border (all proof hashes go on the left)
fn chain_border_right<H: Hasher + ?Sized>(hasher: &H, seed: Hash, proof: &[Hash]) -> Hash {
    proof.iter().fold(seed, |hash, p| {
        hasher.node_digest(p.as_bytes(), hash.as_bytes())
    })
}
