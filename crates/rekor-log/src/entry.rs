//! Rekor V1 API response types
//!
//! These mirror the JSON returned by the log server. Hashes and integers are
//! kept as the server sent them; the `to_*` conversions are the only way to
//! get engine records out of them, and they validate every field.

use crate::error::{Error, Result};
use rekor_merkle::{Hash, InclusionProof};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A log entry from Rekor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// UUID of the entry (the key in the response map)
    #[serde(skip)]
    pub uuid: String,
    /// Body of the entry (base64 encoded canonicalized body)
    pub body: String,
    /// Integrated time (Unix timestamp)
    pub integrated_time: i64,
    /// Log ID (hex-encoded SHA-256 of the log's public key)
    #[serde(rename = "logID")]
    pub log_id: String,
    /// Global log index across all shards
    pub log_index: i64,
    /// Verification data
    #[serde(default)]
    pub verification: Option<Verification>,
}

/// Verification data for a log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
    /// Inclusion proof
    #[serde(default)]
    pub inclusion_proof: Option<RekorInclusionProof>,
    /// Signed entry timestamp (SET), carried but not verified here
    #[serde(default)]
    pub signed_entry_timestamp: Option<String>,
}

/// Inclusion proof from Rekor V1 API.
///
/// Hashes are hex-encoded and the index is relative to the shard the entry
/// lives in, which can differ from [`LogEntry::log_index`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RekorInclusionProof {
    /// Checkpoint (signed tree head)
    #[serde(default)]
    pub checkpoint: Option<String>,
    /// Hashes in the proof path (hex-encoded in V1 API)
    pub hashes: Vec<String>,
    /// Log index within the shard
    pub log_index: i64,
    /// Root hash (hex-encoded in V1 API)
    pub root_hash: String,
    /// Tree size
    pub tree_size: i64,
}

impl RekorInclusionProof {
    /// Convert into a checked engine record
    pub fn to_proof(&self) -> Result<InclusionProof> {
        Ok(InclusionProof {
            leaf_index: non_negative("inclusionProof.logIndex", self.log_index)?,
            tree_size: non_negative("inclusionProof.treeSize", self.tree_size)?,
            hashes: decode_hashes(&self.hashes)?,
            root_hash: Hash::from_hex(&self.root_hash)?,
        })
    }
}

/// Log info response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogInfo {
    /// Root hash of the tree
    pub root_hash: String,
    /// Signed tree head (checkpoint)
    pub signed_tree_head: String,
    /// Tree ID
    #[serde(rename = "treeID")]
    pub tree_id: String,
    /// Tree size
    pub tree_size: i64,
    /// Inactive shards
    #[serde(default)]
    pub inactive_shards: Vec<InactiveShard>,
}

/// Inactive shard info
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InactiveShard {
    /// Root hash
    pub root_hash: String,
    /// Signed tree head
    pub signed_tree_head: String,
    /// Tree ID
    #[serde(rename = "treeID")]
    pub tree_id: String,
    /// Tree size
    pub tree_size: i64,
}

impl LogInfo {
    /// Tree size and root hash of the shard with the given tree ID
    ///
    /// Looks at the active shard first, then the inactive ones.
    pub fn tree_state(&self, tree_id: &str) -> Result<Option<(u64, Hash)>> {
        if self.tree_id == tree_id {
            return Ok(Some((
                non_negative("treeSize", self.tree_size)?,
                Hash::from_hex(&self.root_hash)?,
            )));
        }
        self.inactive_shards
            .iter()
            .find(|shard| shard.tree_id == tree_id)
            .map(|shard| -> Result<(u64, Hash)> {
                Ok((
                    non_negative("inactiveShards.treeSize", shard.tree_size)?,
                    Hash::from_hex(&shard.root_hash)?,
                ))
            })
            .transpose()
    }
}

/// Response of `GET /api/v1/log/proof`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyProofResponse {
    /// Root hash of the tree at `lastSize` (hex)
    pub root_hash: String,
    /// Proof hashes (hex)
    #[serde(default)]
    pub hashes: Vec<String>,
}

impl ConsistencyProofResponse {
    pub fn decoded_hashes(&self) -> Result<Vec<Hash>> {
        decode_hashes(&self.hashes)
    }
}

/// Response from fetching log entries (map of UUID to LogEntry)
pub type LogEntryResponse = HashMap<String, LogEntry>;

/// Parse a single-entry response from `GET /api/v1/log/entries`
pub fn parse_entry_response(json: &str) -> Result<LogEntry> {
    let entries: LogEntryResponse = serde_json::from_str(json)?;
    if entries.len() > 1 {
        return Err(Error::InvalidField {
            field: "entries",
            reason: format!("expected one entry, got {}", entries.len()),
        });
    }

    let (uuid, mut entry) = entries
        .into_iter()
        .next()
        .ok_or_else(|| Error::MissingField("log entry".to_string()))?;
    entry.uuid = uuid;
    Ok(entry)
}

fn non_negative(field: &'static str, value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| Error::InvalidField {
        field,
        reason: format!("{} is negative", value),
    })
}

fn decode_hashes(hashes: &[String]) -> Result<Vec<Hash>> {
    hashes
        .iter()
        .map(|h| Hash::from_hex(h).map_err(Error::from))
        .collect()
}
