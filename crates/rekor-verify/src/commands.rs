//! Subcommand implementations

use anyhow::Context;
use rekor_log::{
    parse_entry_response, verify_entry_inclusion, verify_log_consistency, verify_log_info,
    ConsistencyProofResponse, LogEntry, LogInfo, PreviousCheckpoint,
};
use rekor_merkle::{DefaultHasher, ErrorKind, Hash};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

pub fn read_entry(path: &Path) -> anyhow::Result<LogEntry> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_entry_response(&text).with_context(|| format!("failed to parse {}", path.display()))
}

pub fn previous_checkpoint(
    tree_id: String,
    tree_size: u64,
    root_hash: &str,
) -> rekor_log::Result<PreviousCheckpoint> {
    Ok(PreviousCheckpoint {
        tree_id,
        tree_size,
        root_hash: Hash::from_hex(root_hash)?,
    })
}

pub fn inclusion(entry: &LogEntry) -> rekor_log::Result<()> {
    verify_entry_inclusion(&DefaultHasher::new(), entry)
}

pub fn consistency(
    previous: &PreviousCheckpoint,
    latest: &LogInfo,
    proof: &ConsistencyProofResponse,
) -> rekor_log::Result<()> {
    verify_log_consistency(&DefaultHasher::new(), previous, latest, proof)
}

/// Check the log info against its signed tree head and render it
pub fn checkpoint(info: &LogInfo) -> rekor_log::Result<String> {
    let checkpoint = verify_log_info(info)?;
    tracing::debug!(
        origin = %checkpoint.origin,
        tree_size = checkpoint.tree_size,
        signatures = checkpoint.signatures.len(),
        "signed tree head matches log info"
    );
    Ok(serde_json::to_string_pretty(info)?)
}

/// Classify a failure by the first proof error in its chain
///
/// Unreadable or unparsable input counts as structural.
pub fn failure_kind(error: &anyhow::Error) -> Option<ErrorKind> {
    error.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<rekor_log::Error>() {
            Some(e.kind())
        } else if let Some(e) = cause.downcast_ref::<rekor_merkle::Error>() {
            Some(e.kind())
        } else if cause.is::<serde_json::Error>() {
            Some(ErrorKind::Structural)
        } else {
            None
        }
    })
}
