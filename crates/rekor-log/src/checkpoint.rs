//! Checkpoint (signed tree head) parsing
//!
//! A checkpoint is a signed note committing to a tree size and root hash.
//! Format specified in: https://github.com/transparency-dev/formats/blob/main/log/README.md
//!
//! Signatures are parsed and kept but not verified here.

use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use rekor_merkle::Hash;

/// Prefix of a signature line in a signed note (em dash and a space)
const SIGNATURE_PREFIX: &str = "\u{2014} ";

/// A checkpoint (signed tree head) from a transparency log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    /// The origin string identifying the log
    pub origin: String,
    /// Tree size (number of leaves)
    pub tree_size: u64,
    /// Root hash of the Merkle tree
    pub root_hash: Hash,
    /// Other data lines (optional extension data)
    pub other_content: Vec<String>,
    /// Signatures over the checkpoint
    pub signatures: Vec<CheckpointSignature>,
}

/// A signature on a checkpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointSignature {
    /// Name of the signer
    pub name: String,
    /// Key hint (first 4 bytes of the key hash)
    pub key_hint: [u8; 4],
    /// Signature bytes
    pub signature: Vec<u8>,
}

impl Checkpoint {
    /// Parse a checkpoint from its text representation
    ///
    /// Format:
    /// ```text
    /// <origin>
    /// <tree_size>
    /// <root_hash_base64>
    /// [other_content...]
    ///
    /// — <name> <base64(key_hint || signature)>
    /// [additional signatures...]
    /// ```
    pub fn from_text(text: &str) -> Result<Self> {
        let (body, signature_block) = match text.split_once("\n\n") {
            Some((body, signatures)) => (body, signatures),
            None => (text, ""),
        };
        let mut lines = body.lines();

        let origin = lines
            .next()
            .filter(|line| !line.is_empty())
            .ok_or_else(|| Error::InvalidCheckpoint("missing origin".to_string()))?
            .to_string();

        let tree_size = lines
            .next()
            .ok_or_else(|| Error::InvalidCheckpoint("missing tree size".to_string()))?
            .parse()
            .map_err(|_| Error::InvalidCheckpoint("invalid tree size".to_string()))?;

        let root_hash_b64 = lines
            .next()
            .ok_or_else(|| Error::InvalidCheckpoint("missing root hash".to_string()))?;
        let root_hash = Hash::from_base64(root_hash_b64)
            .map_err(|e| Error::InvalidCheckpoint(format!("invalid root hash: {}", e)))?;

        let other_content = lines.map(str::to_string).collect();

        let signatures = signature_block
            .lines()
            .filter(|line| !line.is_empty())
            .map(parse_signature_line)
            .collect::<Result<Vec<_>>>()?;

        Ok(Checkpoint {
            origin,
            tree_size,
            root_hash,
            other_content,
            signatures,
        })
    }

    /// Ensure the checkpoint commits to the given tree size and root hash
    pub fn check_matches(&self, tree_size: u64, root_hash: &Hash) -> Result<()> {
        if self.tree_size != tree_size {
            return Err(Error::CheckpointMismatch(format!(
                "checkpoint tree size {} does not match {}",
                self.tree_size, tree_size
            )));
        }
        if &self.root_hash != root_hash {
            return Err(Error::CheckpointMismatch(format!(
                "checkpoint root hash {} does not match {}",
                self.root_hash.to_hex(),
                root_hash.to_hex()
            )));
        }
        Ok(())
    }
}

fn parse_signature_line(line: &str) -> Result<CheckpointSignature> {
    let content = line.strip_prefix(SIGNATURE_PREFIX).ok_or_else(|| {
        Error::InvalidCheckpoint(format!("unexpected line in signature block: {:?}", line))
    })?;

    // The signer name may contain spaces; the encoded signature never does
    let (name, key_and_sig) = content
        .rsplit_once(' ')
        .ok_or_else(|| Error::InvalidCheckpoint("invalid signature line format".to_string()))?;

    let decoded = STANDARD
        .decode(key_and_sig)
        .map_err(|_| Error::InvalidCheckpoint("invalid signature base64".to_string()))?;
    if decoded.len() <= 4 {
        return Err(Error::InvalidCheckpoint(
            "signature too short for key hint".to_string(),
        ));
    }

    let (hint, signature) = decoded.split_at(4);
    let mut key_hint = [0u8; 4];
    key_hint.copy_from_slice(hint);

    Ok(CheckpointSignature {
        name: name.to_string(),
        key_hint,
        signature: signature.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECKPOINT: &str = "rekor.sigstore.dev - 1193050959916656506
42591958
npv1T/m9N8zX0jPlbh4rB51zL6GpnV9bQaXSOdzAV+s=

— rekor.sigstore.dev wNI9ajBFAiEA0OP4Pv5ks5MoTTwcM0kS6HMn8gZ5fFPjT9s6vVqXgHkCIDCe5qWSdM4OXpCQ1YNP2KpLo1r/2dRfFHXkPR5h3ywe
";

    #[test]
    fn test_parse_checkpoint() {
        let checkpoint = Checkpoint::from_text(CHECKPOINT).unwrap();
        assert_eq!(
            checkpoint.origin,
            "rekor.sigstore.dev - 1193050959916656506"
        );
        assert_eq!(checkpoint.tree_size, 42591958);
        assert_eq!(
            checkpoint.root_hash.to_hex(),
            "9e9bf54ff9bd37ccd7d233e56e1e2b079d732fa1a99d5f5b41a5d239dcc057eb"
        );
        assert!(checkpoint.other_content.is_empty());

        assert_eq!(checkpoint.signatures.len(), 1);
        let signature = &checkpoint.signatures[0];
        assert_eq!(signature.name, "rekor.sigstore.dev");
        assert_eq!(signature.key_hint, [0xc0, 0xd2, 0x3d, 0x6a]);
        assert_eq!(signature.signature.len(), 71);
    }

    #[test]
    fn test_other_content_kept() {
        let text = "example.com/log\n7\nnpv1T/m9N8zX0jPlbh4rB51zL6GpnV9bQaXSOdzAV+s=\nTimestamp: 1689748607742585419\n";
        let checkpoint = Checkpoint::from_text(text).unwrap();
        assert_eq!(
            checkpoint.other_content,
            vec!["Timestamp: 1689748607742585419".to_string()]
        );
        assert!(checkpoint.signatures.is_empty());
    }

    #[test]
    fn test_invalid_checkpoints() {
        assert!(matches!(
            Checkpoint::from_text(""),
            Err(Error::InvalidCheckpoint(_))
        ));
        assert!(matches!(
            Checkpoint::from_text("origin\nnot-a-number\nAAAA\n"),
            Err(Error::InvalidCheckpoint(_))
        ));
        assert!(matches!(
            Checkpoint::from_text("origin\n1\n!!!\n"),
            Err(Error::InvalidCheckpoint(_))
        ));
        assert!(matches!(
            Checkpoint::from_text("origin\n1\nAAAA\n\nnot a signature\n"),
            Err(Error::InvalidCheckpoint(_))
        ));
    }

    #[test]
    fn test_check_matches() {
        let checkpoint = Checkpoint::from_text(CHECKPOINT).unwrap();
        let root = checkpoint.root_hash.clone();
        assert!(checkpoint.check_matches(42591958, &root).is_ok());
        assert!(matches!(
            checkpoint.check_matches(42591957, &root),
            Err(Error::CheckpointMismatch(_))
        ));
        assert!(matches!(
            checkpoint.check_matches(42591958, &Hash::from([0u8; 32])),
            Err(Error::CheckpointMismatch(_))
        ));
    }
}
