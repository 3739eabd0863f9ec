//! Rekor transparency log records and offline proof checks
//!
//! This crate models the responses of the Rekor V1 API, turns them into
//! checked `rekor-merkle` proof records, and cross-checks the checkpoints
//! that accompany them. It never talks to a log server; callers supply the
//! responses.

pub mod checkpoint;
pub mod entry;
pub mod error;
pub mod verify;

pub use checkpoint::{Checkpoint, CheckpointSignature};
pub use entry::{
    parse_entry_response, ConsistencyProofResponse, InactiveShard, LogEntry, LogEntryResponse,
    LogInfo, RekorInclusionProof, Verification,
};
pub use error::{Error, Result};
pub use verify::{
    leaf_hash_from_body, verify_entry_inclusion, verify_log_consistency, verify_log_info,
    PreviousCheckpoint,
};
