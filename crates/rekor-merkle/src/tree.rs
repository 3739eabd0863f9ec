//! Merkle tree shape arithmetic
//!
//! Pure functions over leaf indices and tree sizes. They fix how many hashes a
//! proof must carry and which way each one is combined, without looking at
//! any hash.
//!
//! An inclusion proof for leaf `index` in a tree of `size` leaves splits into
//! two parts. The *inner* part covers the levels where the leaf's path and the
//! path of the last leaf (`size - 1`) are still in different subtrees, so each
//! level contributes a sibling whose side is given by the corresponding bit of
//! `index`. Above that the path runs along the right border of the tree, where
//! a node has a left sibling only at levels whose bit is set.

use crate::error::{Error, Result};

/// Number of bits needed to write `n`, zero for zero
pub fn bit_length(n: u64) -> u32 {
    u64::BITS - n.leading_zeros()
}

/// Largest power of two strictly less than `n`
///
/// This is the RFC 6962 split point `k` between the left (complete) and right
/// subtrees of a tree with `n >= 2` leaves.
///
/// # Panics
///
/// Panics if `n < 2`, where no split exists.
pub fn split_point(n: u64) -> u64 {
    assert!(n >= 2, "split point is defined for n >= 2, got {}", n);
    1 << (bit_length(n - 1) - 1)
}

/// Shape of an inclusion proof
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InclusionShape {
    /// Hashes below the right border, oriented by the bits of the index
    pub inner: usize,
    /// Hashes on the right border, always left siblings
    pub border: usize,
}

impl InclusionShape {
    /// Total number of proof hashes
    pub fn len(&self) -> usize {
        self.inner + self.border
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Levels where the paths of `index` and of the last leaf still differ
fn inner_proof_size(index: u64, tree_size: u64) -> u32 {
    bit_length(index ^ (tree_size - 1))
}

/// Decompose an inclusion proof into inner and border path lengths
///
/// Requires `index < tree_size`.
pub fn decompose_inclusion_proof(index: u64, tree_size: u64) -> InclusionShape {
    debug_assert!(index < tree_size);
    let inner = inner_proof_size(index, tree_size);
    // inner reaches 64 once tree_size exceeds 2^63
    let border = index.checked_shr(inner).map_or(0, u64::count_ones) as usize;
    let inner = inner as usize;
    InclusionShape { inner, border }
}

/// Shape of a consistency proof between two tree sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsistencyShape {
    /// Whether the proof starts with the root of the largest complete subtree
    /// that ends at the old tree's last leaf. When the old size is a power of
    /// two that subtree is the old tree itself, and the hash is omitted.
    pub seed_in_proof: bool,
    /// Hashes below the right border of the new tree
    pub inner: usize,
    /// Hashes on the right border of the new tree
    pub border: usize,
    /// Orientation bits for the inner hashes, starting from the seed's level
    pub mask: u64,
}

impl ConsistencyShape {
    /// Total number of proof hashes
    pub fn len(&self) -> usize {
        usize::from(self.seed_in_proof) + self.inner + self.border
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decompose a consistency proof for `0 < first_size < last_size`
///
/// The proof is the suffix of the inclusion proof for leaf `first_size - 1`
/// in the new tree, starting at the level of the largest complete subtree
/// that ends at that leaf.
pub fn decompose_consistency_proof(first_size: u64, last_size: u64) -> Result<ConsistencyShape> {
    if first_size == 0 || first_size >= last_size {
        return Err(Error::InvalidTreeSize(format!(
            "consistency shape needs 0 < first size < last size, got {} and {}",
            first_size, last_size
        )));
    }

    let shift = first_size.trailing_zeros() as usize;
    let full = decompose_inclusion_proof(first_size - 1, last_size);
    // shift < full.inner whenever first_size < last_size
    let inner = full.inner - shift;

    Ok(ConsistencyShape {
        seed_in_proof: first_size != 1 << shift,
        inner,
        border: full.border,
        mask: (first_size - 1) >> shift,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_length_extremes() {
        assert_eq!(bit_length(0), 0);
        assert_eq!(bit_length(1 << 63), 64);
        assert_eq!(bit_length(u64::MAX), 64);
    }

    #[test]
    fn test_split_point() {
        assert_eq!(split_point(2), 1);
        assert_eq!(split_point(3), 2);
        assert_eq!(split_point(4), 2);
        assert_eq!(split_point(5), 4);
        assert_eq!(split_point(8), 4);
        assert_eq!(split_point(9), 8);
        assert_eq!(split_point(130), 128);
        assert_eq!(split_point(u64::MAX), 1 << 63);
    }

    #[test]
    #[should_panic(expected = "split point is defined for n >= 2")]
    fn test_split_point_of_single_leaf_panics() {
        split_point(1);
    }

    #[test]
    fn test_decompose_inclusion_proof() {
        // Single leaf: no proof needed
        assert_eq!(
            decompose_inclusion_proof(0, 1),
            InclusionShape { inner: 0, border: 0 }
        );

        // Two leaves, left: one inner sibling
        assert_eq!(
            decompose_inclusion_proof(0, 2),
            InclusionShape { inner: 1, border: 0 }
        );

        // Two leaves, right: 1 ^ 1 = 0 inner, the left leaf sits on the border
        assert_eq!(
            decompose_inclusion_proof(1, 2),
            InclusionShape { inner: 0, border: 1 }
        );

        // Last leaf of a 7-leaf tree: it has no sibling at the bottom level
        // and is promoted, so only two border hashes remain.
        assert_eq!(
            decompose_inclusion_proof(6, 7),
            InclusionShape { inner: 0, border: 2 }
        );

        // Leaf 4 of 5 is promoted all the way to the root's right child
        assert_eq!(decompose_inclusion_proof(4, 5).len(), 1);
    }

    #[test]
    fn test_decompose_inclusion_proof_full_width_sizes() {
        // Paths of 1 and the last leaf split at the root: 64 inner levels
        assert_eq!(
            decompose_inclusion_proof(1, u64::MAX),
            InclusionShape { inner: 64, border: 0 }
        );
        assert_eq!(
            decompose_inclusion_proof(1, (1 << 63) + 1),
            InclusionShape { inner: 64, border: 0 }
        );
        // Last leaf of the largest tree: one left sibling per set bit
        assert_eq!(
            decompose_inclusion_proof(u64::MAX - 1, u64::MAX),
            InclusionShape { inner: 0, border: 63 }
        );
        assert_eq!(
            decompose_inclusion_proof(1 << 63, (1 << 63) + 1),
            InclusionShape { inner: 0, border: 1 }
        );

        let shape = decompose_consistency_proof(1, (1 << 63) + 1).unwrap();
        assert!(!shape.seed_in_proof);
        assert_eq!(shape.len(), 64);
        let shape = decompose_consistency_proof(3, u64::MAX).unwrap();
        assert!(shape.seed_in_proof);
        assert_eq!(shape.len(), 65);
    }

    /// Proof length by walking the tree level by level
    fn walked_inclusion_length(mut index: u64, mut size: u64) -> usize {
        let mut count = 0;
        while size > 1 {
            // The rightmost node of an odd level has no sibling
            if !(size % 2 == 1 && index == size - 1) {
                count += 1;
            }
            index /= 2;
            size = size.div_ceil(2);
        }
        count
    }

    #[test]
    fn test_decomposition_matches_level_walk() {
        for size in 1..=130u64 {
            for index in 0..size {
                assert_eq!(
                    decompose_inclusion_proof(index, size).len(),
                    walked_inclusion_length(index, size),
                    "index {} size {}",
                    index,
                    size
                );
            }
        }
    }

    #[test]
    fn test_decompose_consistency_proof() {
        // Power of two old size: seed omitted
        let shape = decompose_consistency_proof(4, 8).unwrap();
        assert!(!shape.seed_in_proof);
        assert_eq!(shape.len(), 1);

        let shape = decompose_consistency_proof(1, 2).unwrap();
        assert!(!shape.seed_in_proof);
        assert_eq!(shape.len(), 1);

        // Non power of two: seed is the first proof hash
        let shape = decompose_consistency_proof(3, 7).unwrap();
        assert!(shape.seed_in_proof);
        assert_eq!(shape.len(), 4);

        let shape = decompose_consistency_proof(6, 8).unwrap();
        assert!(shape.seed_in_proof);
        assert_eq!(shape.mask, 0b10);
        assert_eq!(shape.len(), 3);
    }

    #[test]
    fn test_decompose_consistency_proof_rejects_bad_sizes() {
        assert!(decompose_consistency_proof(0, 4).is_err());
        assert!(decompose_consistency_proof(4, 4).is_err());
        assert!(decompose_consistency_proof(5, 4).is_err());
    }
}
