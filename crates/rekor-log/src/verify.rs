//! Offline verification of Rekor responses
//!
//! Each check decodes and cross-checks the untrusted response fields first,
//! then hands the resulting records to the `rekor-merkle` verifiers.

use crate::checkpoint::Checkpoint;
use crate::entry::{ConsistencyProofResponse, LogEntry, LogInfo};
use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use rekor_merkle::{ConsistencyProof, Hash, Hasher};

/// A previously trusted view of the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviousCheckpoint {
    /// Tree ID of the shard the checkpoint was taken from
    pub tree_id: String,
    pub tree_size: u64,
    pub root_hash: Hash,
}

/// Compute the leaf hash of a log entry from its base64 canonical body
pub fn leaf_hash_from_body<H: Hasher + ?Sized>(hasher: &H, body_b64: &str) -> Result<Hash> {
    let body = STANDARD.decode(body_b64).map_err(|e| Error::InvalidField {
        field: "body",
        reason: format!("invalid base64: {}", e),
    })?;
    Ok(hasher.hash_leaf(&body))
}

/// Verify that a log entry is included in the tree its inclusion proof names
///
/// The proof's checkpoint, when present, must commit to the same tree size
/// and root hash as the proof itself.
pub fn verify_entry_inclusion<H: Hasher + ?Sized>(hasher: &H, entry: &LogEntry) -> Result<()> {
    let rekor_proof = entry
        .verification
        .as_ref()
        .and_then(|v| v.inclusion_proof.as_ref())
        .ok_or_else(|| Error::MissingField("verification.inclusionProof".to_string()))?;

    let proof = rekor_proof.to_proof()?;
    let checkpoint = rekor_proof
        .checkpoint
        .as_deref()
        .map(Checkpoint::from_text)
        .transpose()?;
    let leaf_hash = leaf_hash_from_body(hasher, &entry.body)?;

    if entry.log_index != rekor_proof.log_index {
        // Expected once the log has been sharded
        tracing::debug!(
            global_index = entry.log_index,
            shard_index = rekor_proof.log_index,
            "entry log index differs from inclusion proof index"
        );
    }

    match checkpoint {
        Some(checkpoint) => checkpoint.check_matches(proof.tree_size, &proof.root_hash)?,
        None => tracing::warn!(uuid = %entry.uuid, "inclusion proof has no checkpoint"),
    }

    proof.verify(hasher, &leaf_hash)?;
    tracing::debug!(
        uuid = %entry.uuid,
        leaf_index = proof.leaf_index,
        tree_size = proof.tree_size,
        "log entry inclusion verified"
    );
    Ok(())
}

/// Cross-check a log info response against its own signed tree head
pub fn verify_log_info(info: &LogInfo) -> Result<Checkpoint> {
    let checkpoint = Checkpoint::from_text(&info.signed_tree_head)?;
    let (tree_size, root_hash) = info
        .tree_state(&info.tree_id)?
        .ok_or_else(|| Error::MissingField("treeID".to_string()))?;
    checkpoint.check_matches(tree_size, &root_hash)?;
    Ok(checkpoint)
}

/// Verify that the log described by `latest` is an append-only extension of
/// `previous`
///
/// `response` is the consistency proof the server returned for the two tree
/// sizes. The previous checkpoint may belong to an inactive shard, in which
/// case the proof is checked against that shard's final state. Either way the
/// shard's signed tree head must agree with its reported size and root.
pub fn verify_log_consistency<H: Hasher + ?Sized>(
    hasher: &H,
    previous: &PreviousCheckpoint,
    latest: &LogInfo,
    response: &ConsistencyProofResponse,
) -> Result<()> {
    let proof_root = Hash::from_hex(&response.root_hash)?;
    let hashes = response.decoded_hashes()?;

    let (last_size, last_root) = latest.tree_state(&previous.tree_id)?.ok_or_else(|| {
        Error::LogStateMismatch(format!(
            "tree ID {} is neither the active shard {} nor an inactive shard",
            previous.tree_id, latest.tree_id
        ))
    })?;

    if previous.tree_id == latest.tree_id {
        verify_log_info(latest)?;
    } else {
        tracing::warn!(
            tree_id = %previous.tree_id,
            active_tree_id = %latest.tree_id,
            "previous checkpoint belongs to an inactive shard"
        );
        let shard = latest
            .inactive_shards
            .iter()
            .find(|shard| shard.tree_id == previous.tree_id)
            .ok_or_else(|| Error::MissingField("inactiveShards.treeID".to_string()))?;
        Checkpoint::from_text(&shard.signed_tree_head)?.check_matches(last_size, &last_root)?;
    }

    if proof_root != last_root {
        return Err(Error::LogStateMismatch(format!(
            "consistency proof is for root {}, latest root is {}",
            proof_root.to_hex(),
            last_root.to_hex()
        )));
    }

    ConsistencyProof {
        first_size: previous.tree_size,
        last_size,
        hashes,
        first_root: previous.root_hash.clone(),
        last_root,
    }
    .verify(hasher)?;

    tracing::debug!(
        first_size = previous.tree_size,
        last_size,
        "log consistency verified"
    );
    Ok(())
}
