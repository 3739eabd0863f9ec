//! Property tests: any single-bit change to a valid proof must be rejected

use proptest::prelude::*;
use rekor_merkle::{verify_consistency, verify_inclusion, DefaultHasher, Hash, Hasher, MerkleTree};

fn leaf_data(i: u64) -> Vec<u8> {
    format!("entry {}", i).into_bytes()
}

fn build(size: u64) -> MerkleTree<DefaultHasher> {
    MerkleTree::from_leaves(DefaultHasher::new(), (0..size).map(leaf_data))
}

fn flip(hash: &Hash, bit: usize) -> Hash {
    let mut bytes = hash.as_bytes().to_vec();
    let bit = bit % (bytes.len() * 8);
    bytes[bit / 8] ^= 1 << (bit % 8);
    Hash::from_bytes(bytes)
}

// Strategy for a tree size and a leaf index inside it
fn size_and_index() -> impl Strategy<Value = (u64, u64)> {
    (1u64..=96).prop_flat_map(|size| (Just(size), 0..size))
}

// Strategy for two tree sizes with first <= last
fn size_pair() -> impl Strategy<Value = (u64, u64)> {
    (2u64..=96).prop_flat_map(|last| (1..last, Just(last)))
}

proptest! {
    #[test]
    fn valid_inclusion_proofs_verify((size, index) in size_and_index()) {
        let tree = build(size);
        let proof = tree.inclusion_proof(index, size).unwrap();
        let leaf = tree.leaf_hash(index).unwrap();
        prop_assert!(verify_inclusion(tree.hasher(), index, size, leaf, &proof, &tree.root()).is_ok());
    }

    #[test]
    fn flipped_proof_hash_fails(
        (size, index) in size_and_index(),
        which in any::<prop::sample::Index>(),
        bit in 0usize..256,
    ) {
        let tree = build(size);
        let mut proof = tree.inclusion_proof(index, size).unwrap();
        prop_assume!(!proof.is_empty());

        let i = which.index(proof.len());
        proof[i] = flip(&proof[i], bit);
        let leaf = tree.leaf_hash(index).unwrap();
        let err = verify_inclusion(tree.hasher(), index, size, leaf, &proof, &tree.root()).unwrap_err();
        prop_assert!(err.is_mismatch());
    }

    #[test]
    fn flipped_leaf_data_fails((size, index) in size_and_index(), bit in 0usize..64) {
        let tree = build(size);
        let proof = tree.inclusion_proof(index, size).unwrap();

        let mut data = leaf_data(index);
        let bit = bit % (data.len() * 8);
        data[bit / 8] ^= 1 << (bit % 8);
        let leaf = tree.hasher().hash_leaf(&data);

        let err = verify_inclusion(tree.hasher(), index, size, &leaf, &proof, &tree.root()).unwrap_err();
        prop_assert!(err.is_mismatch());
    }

    #[test]
    fn flipped_root_fails((size, index) in size_and_index(), bit in 0usize..256) {
        let tree = build(size);
        let proof = tree.inclusion_proof(index, size).unwrap();
        let leaf = tree.leaf_hash(index).unwrap();
        let root = flip(&tree.root(), bit);

        let err = verify_inclusion(tree.hasher(), index, size, leaf, &proof, &root).unwrap_err();
        prop_assert!(err.is_mismatch());
    }

    #[test]
    fn flipped_index_fails((size, index) in size_and_index(), bit in 0u32..8) {
        let tree = build(size);
        let proof = tree.inclusion_proof(index, size).unwrap();
        let leaf = tree.leaf_hash(index).unwrap();
        let claimed = index ^ (1 << bit);

        // Either the index leaves the tree, the proof length no longer fits,
        // or the orientation changes and the root differs.
        let result = verify_inclusion(tree.hasher(), claimed, size, leaf, &proof, &tree.root());
        prop_assert!(result.is_err());
    }

    #[test]
    fn valid_consistency_proofs_verify((first, last) in size_pair()) {
        let tree = build(last);
        let proof = tree.consistency_proof(first, last).unwrap();
        let first_root = tree.root_at(first).unwrap();
        prop_assert!(verify_consistency(tree.hasher(), first, last, &proof, &first_root, &tree.root()).is_ok());
    }

    #[test]
    fn flipped_consistency_hash_fails(
        (first, last) in size_pair(),
        which in any::<prop::sample::Index>(),
        bit in 0usize..256,
    ) {
        let tree = build(last);
        let mut proof = tree.consistency_proof(first, last).unwrap();
        let i = which.index(proof.len());
        proof[i] = flip(&proof[i], bit);

        let first_root = tree.root_at(first).unwrap();
        let err = verify_consistency(tree.hasher(), first, last, &proof, &first_root, &tree.root()).unwrap_err();
        prop_assert!(err.is_mismatch());
    }

    #[test]
    fn consistency_length_off_by_one_is_structural((first, last) in size_pair(), extend in any::<bool>()) {
        let tree = build(last);
        let mut proof = tree.consistency_proof(first, last).unwrap();
        if extend {
            proof.push(tree.root());
        } else {
            proof.pop();
        }

        let first_root = tree.root_at(first).unwrap();
        let err = verify_consistency(tree.hasher(), first, last, &proof, &first_root, &tree.root()).unwrap_err();
        prop_assert!(err.is_structural());
    }
}
